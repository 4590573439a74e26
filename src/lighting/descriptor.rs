/// Light descriptors, the unit of work the compositor consumes.
///
/// A descriptor carries everything needed to shade one pixel under one
/// light: where the light is, what kind it is, and the shadow/highlight
/// response curve. The light session owns descriptors; the compositor only
/// reads them.

use serde::{Deserialize, Serialize};

use crate::engine::types::{Color, Vec3};
use crate::math::math3d;

/// Floor applied to band ranges before dividing by them.
pub const RANGE_EPSILON: f32 = 1e-6;

/// Default falloff distance of positional lights.
pub const DEFAULT_LIGHT_DISTANCE: f32 = 10.0;

/// Light type with the fields only that type uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Only the direction matters. Used by the standalone compositor path.
    Directional { direction: Vec3 },
    /// Omni light with a windowed falloff; `radius <= 0` disables the cutoff.
    Point { radius: f32 },
    /// Cone light aimed at `target`. `angle` is the half-cone in radians,
    /// `penumbra` the softness in [0, 1]. A spot without a target aims one
    /// unit below its position, on the image plane.
    Spot { angle: f32, penumbra: f32, distance: f32, target: Option<Vec3> },
}

impl LightKind {
    pub fn is_positional(&self) -> bool {
        !matches!(self, LightKind::Directional { .. })
    }

    fn tag(&self) -> f32 {
        match self {
            LightKind::Directional { .. } => 0.0,
            LightKind::Point { .. } => 1.0,
            LightKind::Spot { .. } => 2.0,
        }
    }
}

/// Shadow/highlight response of a light.
///
/// Strengths of 1.0 are neutral; white highlight tint with black shadow
/// tint is the neutral tint pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadingBands {
    pub shadow_range: f32,
    pub shadow_strength: f32,
    pub highlight_range: f32,
    pub highlight_strength: f32,
    pub highlight_color: Color,
    pub shadow_color: Color,
}

impl Default for ShadingBands {
    fn default() -> Self {
        Self {
            shadow_range: 1.0,
            shadow_strength: 1.0,
            highlight_range: 1.0,
            highlight_strength: 1.0,
            highlight_color: Color::WHITE,
            shadow_color: Color::BLACK,
        }
    }
}

impl ShadingBands {
    #[inline]
    pub fn has_neutral_tint(&self) -> bool {
        self.highlight_color == Color::WHITE && self.shadow_color == Color::BLACK
    }
}

/// Surface material shared by every light of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialParams {
    /// Scale of the normal map's tangent-plane components (0 = flat).
    #[serde(rename = "normalScale")]
    pub normal_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            normal_strength: 0.0,
            specular_strength: 0.0,
            shininess: 0.0,
        }
    }
}

/// One light as seen by the compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightDescriptor {
    pub kind: LightKind,
    /// Light position; ignored by directional lights.
    pub position: Vec3,
    pub color: Color,
    /// Non-negative multiplier, also called brightness on the directional path.
    pub intensity: f32,
    pub bands: ShadingBands,
}

impl LightDescriptor {
    /// Directional light. The direction is normalized here; a zero vector
    /// stays zero and lights nothing.
    pub fn directional(direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional { direction: math3d::vec3_normalized(&direction) },
            position: Vec3::ZERO,
            color: Color::WHITE,
            intensity: 1.0,
            bands: ShadingBands::default(),
        }
    }

    pub fn point(position: Vec3, radius: f32) -> Self {
        Self {
            kind: LightKind::Point { radius },
            position,
            color: Color::WHITE,
            intensity: 1.0,
            bands: ShadingBands::default(),
        }
    }

    pub fn spot(position: Vec3, target: Option<Vec3>, angle: f32, penumbra: f32) -> Self {
        Self {
            kind: LightKind::Spot {
                angle,
                penumbra,
                distance: DEFAULT_LIGHT_DISTANCE,
                target,
            },
            position,
            color: Color::WHITE,
            intensity: 1.0,
            bands: ShadingBands::default(),
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_bands(mut self, bands: ShadingBands) -> Self {
        self.bands = bands;
        self
    }

    /// Brightness is the directional path's name for intensity.
    #[inline]
    pub fn brightness(&self) -> f32 {
        self.intensity
    }

    /// Where a spot light points: its explicit target, or one unit below it
    /// on the image plane.
    pub fn spot_target(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Spot { target, .. } => {
                Some(target.unwrap_or_else(|| default_spot_target(&self.position)))
            }
            _ => None,
        }
    }

    /// Pack into a flat uniform block for a GPU collaborator.
    ///
    /// Layout (`UNIFORM_BLOCK_LEN` floats):
    /// [kind, pos_x, pos_y, pos_z, vec_x, vec_y, vec_z,
    ///  color_r, color_g, color_b, intensity, distance, angle, penumbra,
    ///  shadow_range, shadow_strength, highlight_range, highlight_strength,
    ///  hl_r, hl_g, hl_b, sh_r, sh_g, sh_b, has_target, pad, pad, pad]
    ///
    /// `vec` is the direction for directional lights and the aim target for
    /// spots (already resolved through `spot_target`).
    pub fn to_uniform_block(&self) -> [f32; UNIFORM_BLOCK_LEN] {
        let mut block = [0.0f32; UNIFORM_BLOCK_LEN];
        block[0] = self.kind.tag();
        block[1] = self.position.x;
        block[2] = self.position.y;
        block[3] = self.position.z;
        let (vec, distance, angle, penumbra, has_target) = match self.kind {
            LightKind::Directional { direction } => (direction, 0.0, 0.0, 0.0, 0.0),
            LightKind::Point { radius } => (Vec3::ZERO, radius, 0.0, 0.0, 0.0),
            LightKind::Spot { angle, penumbra, distance, target } => (
                target.unwrap_or_else(|| default_spot_target(&self.position)),
                distance,
                angle,
                penumbra,
                if target.is_some() { 1.0 } else { 0.0 },
            ),
        };
        block[4] = vec.x;
        block[5] = vec.y;
        block[6] = vec.z;
        block[7] = self.color.r;
        block[8] = self.color.g;
        block[9] = self.color.b;
        block[10] = self.intensity;
        block[11] = distance;
        block[12] = angle;
        block[13] = penumbra;
        block[14] = self.bands.shadow_range;
        block[15] = self.bands.shadow_strength;
        block[16] = self.bands.highlight_range;
        block[17] = self.bands.highlight_strength;
        block[18] = self.bands.highlight_color.r;
        block[19] = self.bands.highlight_color.g;
        block[20] = self.bands.highlight_color.b;
        block[21] = self.bands.shadow_color.r;
        block[22] = self.bands.shadow_color.g;
        block[23] = self.bands.shadow_color.b;
        block[24] = has_target;
        block
    }

    /// Inverse of `to_uniform_block`. Returns `None` when the slice is too
    /// short or the kind tag is unknown.
    pub fn from_uniform_block(data: &[f32]) -> Option<Self> {
        if data.len() < UNIFORM_BLOCK_LEN {
            return None;
        }
        let position = Vec3::new(data[1], data[2], data[3]);
        let vec = Vec3::new(data[4], data[5], data[6]);
        let kind = match data[0] as i32 {
            0 => LightKind::Directional { direction: vec },
            1 => LightKind::Point { radius: data[11] },
            2 => LightKind::Spot {
                angle: data[12],
                penumbra: data[13],
                distance: data[11],
                target: if data[24] > 0.5 { Some(vec) } else { None },
            },
            _ => return None,
        };
        Some(Self {
            kind,
            position,
            color: Color::new(data[7], data[8], data[9]),
            intensity: data[10],
            bands: ShadingBands {
                shadow_range: data[14],
                shadow_strength: data[15],
                highlight_range: data[16],
                highlight_strength: data[17],
                highlight_color: Color::new(data[18], data[19], data[20]),
                shadow_color: Color::new(data[21], data[22], data[23]),
            },
        })
    }
}

pub const UNIFORM_BLOCK_LEN: usize = 28;

/// Aim point used by spots that were never given an explicit target.
#[inline]
pub fn default_spot_target(position: &Vec3) -> Vec3 {
    Vec3::new(position.x, position.y - 1.0, 0.0)
}

/// Parameters of the standalone single-light path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalParams {
    pub light: LightDescriptor,
    pub ambient: f32,
}

impl Default for DirectionalParams {
    fn default() -> Self {
        Self {
            light: LightDescriptor::directional(Vec3::OUT_OF_PLANE),
            ambient: 0.0,
        }
    }
}

/// Build ShadingBands from a flat f64 parameter array.
/// Layout: [shadow_range, shadow_strength, highlight_range, highlight_strength,
///   hl_r, hl_g, hl_b, sh_r, sh_g, sh_b]
///
/// Short buffers keep the defaults for the missing tail.
pub fn shading_bands_from_buffer(data: &[f64]) -> ShadingBands {
    let mut bands = ShadingBands::default();
    let get = |i: usize| data.get(i).map(|v| *v as f32);

    if let Some(v) = get(0) { bands.shadow_range = v; }
    if let Some(v) = get(1) { bands.shadow_strength = v; }
    if let Some(v) = get(2) { bands.highlight_range = v; }
    if let Some(v) = get(3) { bands.highlight_strength = v; }
    if data.len() >= 7 {
        bands.highlight_color = Color::new(data[4] as f32, data[5] as f32, data[6] as f32);
    }
    if data.len() >= 10 {
        bands.shadow_color = Color::new(data[7] as f32, data[8] as f32, data[9] as f32);
    }

    bands
}

/// Build DirectionalParams from a flat f64 parameter array.
/// Layout: [dir_x, dir_y, dir_z, brightness, ambient, <shading bands>]
///
/// The tail from index 5 follows `shading_bands_from_buffer`. Short buffers
/// keep the defaults for the missing tail.
pub fn directional_params_from_buffer(data: &[f64]) -> DirectionalParams {
    let mut params = DirectionalParams::default();

    if data.len() >= 3 {
        params.light = LightDescriptor::directional(Vec3::new(data[0] as f32, data[1] as f32, data[2] as f32));
    }
    if let Some(v) = data.get(3) { params.light.intensity = (*v as f32).max(0.0); }
    if let Some(v) = data.get(4) { params.ambient = (*v as f32).max(0.0); }
    params.light.bands = shading_bands_from_buffer(data.get(5..).unwrap_or(&[]));

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_is_normalized() {
        let l = LightDescriptor::directional(Vec3::new(0.0, 0.0, 5.0));
        match l.kind {
            LightKind::Directional { direction } => assert!((direction.z - 1.0).abs() < 1e-6),
            _ => panic!("expected directional"),
        }
    }

    #[test]
    fn test_spot_target_defaults_below() {
        let l = LightDescriptor::spot(Vec3::new(0.25, 0.5, 1.5), None, 0.5, 0.2);
        assert_eq!(l.spot_target(), Some(Vec3::new(0.25, -0.5, 0.0)));
        assert_eq!(LightDescriptor::point(Vec3::ZERO, 10.0).spot_target(), None);
    }

    #[test]
    fn test_uniform_block_preserves_fields() {
        let bands = ShadingBands {
            shadow_range: 0.4,
            shadow_strength: 0.3,
            highlight_range: 0.7,
            highlight_strength: 1.6,
            highlight_color: Color::new(1.0, 0.9, 0.8),
            shadow_color: Color::new(0.1, 0.0, 0.2),
        };
        let spot = LightDescriptor::spot(Vec3::new(0.1, 0.2, 1.3), Some(Vec3::new(0.0, -0.5, 0.0)), 1.2, 0.3)
            .with_intensity(2.5)
            .with_color(Color::new(1.0, 0.5, 0.25))
            .with_bands(bands);
        let back = LightDescriptor::from_uniform_block(&spot.to_uniform_block()).unwrap();
        assert_eq!(back, spot);

        let point = LightDescriptor::point(Vec3::new(-0.3, 0.3, 1.0), 7.5);
        assert_eq!(LightDescriptor::from_uniform_block(&point.to_uniform_block()), Some(point));
    }

    #[test]
    fn test_uniform_block_rejects_short_or_unknown() {
        assert!(LightDescriptor::from_uniform_block(&[1.0; 4]).is_none());
        let mut block = [0.0f32; UNIFORM_BLOCK_LEN];
        block[0] = 9.0;
        assert!(LightDescriptor::from_uniform_block(&block).is_none());
    }

    #[test]
    fn test_directional_params_from_buffer() {
        let p = directional_params_from_buffer(&[
            0.0, 0.0, 1.0, 0.15, 0.85, 0.5, 0.8, 0.6, 1.4, 1.0, 0.5, 0.0, 0.0, 0.0, 0.5,
        ]);
        assert!((p.light.brightness() - 0.15).abs() < 1e-6);
        assert!((p.ambient - 0.85).abs() < 1e-6);
        assert!((p.light.bands.shadow_range - 0.5).abs() < 1e-6);
        assert!((p.light.bands.highlight_strength - 1.4).abs() < 1e-6);
        assert_eq!(p.light.bands.highlight_color, Color::new(1.0, 0.5, 0.0));
        assert_eq!(p.light.bands.shadow_color, Color::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn test_shading_bands_from_buffer() {
        let bands = shading_bands_from_buffer(&[0.5, 0.2]);
        assert!((bands.shadow_range - 0.5).abs() < 1e-6);
        assert!((bands.shadow_strength - 0.2).abs() < 1e-6);
        assert_eq!(bands.highlight_range, 1.0);
        assert!(bands.has_neutral_tint());
    }

    #[test]
    fn test_directional_params_short_buffer_keeps_defaults() {
        assert_eq!(directional_params_from_buffer(&[]), DirectionalParams::default());
        let p = directional_params_from_buffer(&[1.0, 0.0, 0.0, 2.0]);
        assert!((p.light.intensity - 2.0).abs() < 1e-6);
        assert_eq!(p.light.bands, ShadingBands::default());
    }
}
