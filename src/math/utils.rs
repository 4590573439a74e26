/// Scalar helpers: clamping, smoothstep and 8-bit color packing.

/// Clamp to [0, 1]. NaN collapses to 0.
#[inline(always)]
pub fn clamp01(v: f32) -> f32 {
    if v > 0.0 { if v < 1.0 { v } else { 1.0 } } else { 0.0 }
}

/// Smooth step (Hermite interpolation). Equal edges act as a hard step.
#[inline(always)]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < 1e-12 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = clamp01((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// Pack a float to a byte [0, 255], rounding to nearest.
#[inline(always)]
pub fn float_to_byte(v: f32) -> u8 {
    (clamp01(v) * 255.0 + 0.5) as u8
}

/// Unpack a byte [0, 255] to a float [0, 1].
#[inline(always)]
pub fn byte_to_float(v: u8) -> f32 {
    v as f32 / 255.0
}

/// Parse a CSS hex color string "#RRGGBB" to (r, g, b) as f32 in [0, 1].
pub fn parse_hex_color(hex: &str) -> (f32, f32, f32) {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() < 6 || !hex.is_char_boundary(6) { return (0.0, 0.0, 0.0); }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    (byte_to_float(r), byte_to_float(g), byte_to_float(b))
}
