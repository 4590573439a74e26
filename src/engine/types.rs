/// Core value types shared by the compositor and the light session.
///
/// Everything here is plain `Copy` data. Math is carried out in `f32` so the
/// CPU path evaluates the same precision as a fragment shader would.

use serde::{Deserialize, Serialize};

use crate::math::utils;

/// 3D vector / point in the image's normalized coordinate space.
///
/// x and y run over [-1, 1] (right and up), z is the distance from the
/// image plane.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    /// Straight out of the image plane, towards the viewer.
    pub const OUT_OF_PLANE: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    #[inline(always)]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }
}

/// Normalized RGB color, every channel in [0, 1].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    #[inline(always)]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    #[inline(always)]
    pub const fn splat(v: f32) -> Self {
        Color { r: v, g: v, b: v }
    }

    /// Lossless conversion from 8-bit channels.
    #[inline]
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Color {
            r: utils::byte_to_float(r),
            g: utils::byte_to_float(g),
            b: utils::byte_to_float(b),
        }
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            utils::float_to_byte(self.r),
            utils::float_to_byte(self.g),
            utils::float_to_byte(self.b),
        ]
    }

    /// Parse "#RRGGBB" (leading '#' optional). Malformed input yields black.
    pub fn from_hex(hex: &str) -> Self {
        let (r, g, b) = utils::parse_hex_color(hex);
        Color { r, g, b }
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    #[inline(always)]
    pub fn scale(self, s: f32) -> Color {
        Color { r: self.r * s, g: self.g * s, b: self.b * s }
    }

    #[inline(always)]
    pub fn mul(self, o: Color) -> Color {
        Color { r: self.r * o.r, g: self.g * o.g, b: self.b * o.b }
    }

    #[inline(always)]
    pub fn add(self, o: Color) -> Color {
        Color { r: self.r + o.r, g: self.g + o.g, b: self.b + o.b }
    }

    #[inline(always)]
    pub fn clamp01(self) -> Color {
        Color {
            r: utils::clamp01(self.r),
            g: utils::clamp01(self.g),
            b: utils::clamp01(self.b),
        }
    }

    /// Component-wise `a * (1 - t) + b * t`; exact at t = 0 and t = 1.
    #[inline(always)]
    pub fn mix(a: Color, b: Color, t: f32) -> Color {
        let s = 1.0 - t;
        Color {
            r: a.r * s + b.r * t,
            g: a.g * s + b.g * t,
            b: a.b * s + b.b * t,
        }
    }
}

// Colors are stored as `[r, g, b]` floats so arbitrary tints survive a save.
// "#rrggbb" strings, as written by the host's color pickers, are accepted on
// load.
impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.r, self.g, self.b].serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Rgb([f32; 3]),
    Hex(String),
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ColorRepr::deserialize(deserializer)? {
            ColorRepr::Rgb([r, g, b]) => Color { r, g, b },
            ColorRepr::Hex(hex) => Color::from_hex(&hex),
        })
    }
}

/// Tangent-space surface normal decoded from a normal-map texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalSample(pub Vec3);

impl NormalSample {
    /// Below this length the texel carries no usable direction.
    pub const DEGENERATE_LENGTH: f32 = 1e-6;

    /// Decode an 8-bit texel: each channel maps [0, 255] → [-1, 1] via
    /// `v / 127.5 - 1`. Near-zero vectors fall back to (0, 0, 1).
    pub fn decode(r: u8, g: u8, b: u8) -> Self {
        NormalSample::from_vec(Vec3 {
            x: r as f32 / 127.5 - 1.0,
            y: g as f32 / 127.5 - 1.0,
            z: b as f32 / 127.5 - 1.0,
        })
    }

    /// Normalize an arbitrary vector, substituting the out-of-plane
    /// direction for degenerate input.
    pub fn from_vec(v: Vec3) -> Self {
        let len = crate::math::math3d::vec3_length(&v);
        if len < Self::DEGENERATE_LENGTH {
            return NormalSample(Vec3::OUT_OF_PLANE);
        }
        NormalSample(crate::math::math3d::vec3_scale(&v, 1.0 / len))
    }

    /// Scale the tangent-plane components, as a material's normal
    /// strength does, and re-normalize.
    pub fn with_strength(self, strength: f32) -> Self {
        NormalSample::from_vec(Vec3 {
            x: self.0.x * strength,
            y: self.0.y * strength,
            z: self.0.z,
        })
    }

    #[inline(always)]
    pub fn vec(&self) -> &Vec3 {
        &self.0
    }
}
