/// Per-pixel relighting math.
///
/// Canonical diffuse formula, shared by every path:
///
///   d       = max(dot(n, L), 0)
///   diffuse = d * intensity * attenuation + ambient
///
/// The diffuse term feeds two bounded masks (shadow and highlight bands),
/// which reshape the light's intensity and blend a tint between the shadow
/// and highlight colors. Multi-light scenes sum the per-light contributions
/// before multiplying the base color once.

use crate::engine::types::{Color, NormalSample, Vec3};
use crate::math::{math3d, utils};
use super::descriptor::{LightDescriptor, LightKind, MaterialParams, ShadingBands, RANGE_EPSILON};

/// View vector used by the specular term (orthographic, facing the image).
const VIEW_DIR: Vec3 = Vec3::OUT_OF_PLANE;

/// Position of a pixel in the normalized image space, on the image plane.
///
/// `u`, `v` are texture coordinates with v growing downwards.
#[inline]
pub fn surface_point(u: f32, v: f32) -> Vec3 {
    Vec3 {
        x: u * 2.0 - 1.0,
        y: (1.0 - v) * 2.0 - 1.0,
        z: 0.0,
    }
}

/// Unit vector from the surface towards the light.
#[inline]
pub fn light_direction(light: &LightDescriptor, surface: &Vec3) -> Vec3 {
    match light.kind {
        LightKind::Directional { direction } => direction,
        LightKind::Point { .. } | LightKind::Spot { .. } => math3d::vec3_direction(surface, &light.position),
    }
}

/// Range window shared by point and spot lights.
#[inline]
fn range_window(dist: f32, cutoff: f32) -> f32 {
    if cutoff <= 0.0 {
        return 1.0;
    }
    let r = dist / cutoff;
    let w = utils::clamp01(1.0 - r * r * r * r);
    w * w
}

/// Distance and cone falloff of positional lights; 1.0 for directional.
pub fn attenuation(light: &LightDescriptor, surface: &Vec3, l: &Vec3) -> f32 {
    match light.kind {
        LightKind::Directional { .. } => 1.0,
        LightKind::Point { radius } => {
            let dist = math3d::vec3_length(&math3d::vec3_sub(&light.position, surface));
            range_window(dist, radius)
        }
        LightKind::Spot { angle, penumbra, distance, .. } => {
            let dist = math3d::vec3_length(&math3d::vec3_sub(&light.position, surface));
            let target = light.spot_target().unwrap_or(*surface);
            let axis = math3d::vec3_direction(&light.position, &target);
            let cos_to_pixel = -math3d::vec3_dot(l, &axis);
            let cone_cos = angle.cos();
            let penumbra_cos = (angle * (1.0 - utils::clamp01(penumbra))).cos();
            range_window(dist, distance) * utils::smoothstep(cone_cos, penumbra_cos, cos_to_pixel)
        }
    }
}

/// Intermediate results of the band response; exposed for tests and for
/// collaborators that visualize the bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandResponse {
    pub shadow_mask: f32,
    pub highlight_mask: f32,
    pub light_intensity: f32,
    pub tint: Color,
}

/// Evaluate the shadow/highlight response for a diffuse value.
pub fn band_response(diffuse: f32, bands: &ShadingBands) -> BandResponse {
    let shadow_threshold = 1.0 - bands.shadow_range;
    let highlight_threshold = 1.0 - bands.highlight_range;
    let shadow_mask = utils::clamp01((diffuse - shadow_threshold) / bands.shadow_range.max(RANGE_EPSILON));
    let highlight_mask =
        utils::clamp01((diffuse - highlight_threshold) / bands.highlight_range.max(RANGE_EPSILON));

    let mut light_intensity = 1.0;
    if bands.shadow_strength != 1.0 {
        light_intensity *= shadow_mask + (1.0 - shadow_mask) * (2.0 - bands.shadow_strength);
    }
    if bands.highlight_strength != 1.0 {
        light_intensity += highlight_mask * (bands.highlight_strength - 1.0);
    }

    // The neutral pair (white highlight, black shadow) passes color through.
    let tint = if bands.has_neutral_tint() {
        Color::WHITE
    } else {
        Color::mix(bands.shadow_color, bands.highlight_color, shadow_mask)
    };

    BandResponse { shadow_mask, highlight_mask, light_intensity, tint }
}

/// Diffuse scalar of one light at one pixel, ambient included.
#[inline]
pub fn diffuse_term(normal: &NormalSample, light: &LightDescriptor, surface: &Vec3, ambient: f32) -> f32 {
    let l = light_direction(light, surface);
    let d = math3d::vec3_dot(normal.vec(), &l).max(0.0);
    d * light.intensity * attenuation(light, surface, &l) + ambient
}

/// Lighting multiplier contributed by one light, before the base color is
/// applied: `diffuse * lightIntensity * tint * light.color`.
pub fn contribution(normal: &NormalSample, light: &LightDescriptor, surface: &Vec3, ambient: f32) -> Color {
    let diffuse = diffuse_term(normal, light, surface, ambient);
    let response = band_response(diffuse, &light.bands);
    response
        .tint
        .mul(light.color)
        .scale(diffuse * response.light_intensity)
}

/// Shade one pixel under a single light.
pub fn shade(base: Color, normal: &NormalSample, light: &LightDescriptor, ambient: f32, surface: &Vec3) -> Color {
    base.mul(contribution(normal, light, surface, ambient)).clamp01()
}

/// Blinn-Phong highlight of one light, added after the base multiply.
pub fn specular(normal: &NormalSample, light: &LightDescriptor, surface: &Vec3, material: &MaterialParams) -> Color {
    if material.specular_strength <= 0.0 {
        return Color::BLACK;
    }
    let l = light_direction(light, surface);
    if math3d::vec3_dot(normal.vec(), &l) <= 0.0 {
        return Color::BLACK;
    }
    let half = math3d::vec3_normalized(&math3d::vec3_add(&l, &VIEW_DIR));
    let n_dot_h = math3d::vec3_dot(normal.vec(), &half).max(0.0);
    let amount = n_dot_h.powf(material.shininess.max(0.0))
        * material.specular_strength
        * light.intensity
        * attenuation(light, surface, &l);
    light.color.scale(amount)
}

/// Shade one pixel under any number of lights.
///
/// Contributions are summed in linear space and multiplied onto the base
/// color once; ambient is a single global term. With no lights the result
/// is ambient-only shading.
pub fn shade_many<'a, I>(
    base: Color,
    normal: &NormalSample,
    lights: I,
    ambient: f32,
    material: &MaterialParams,
    surface: &Vec3,
) -> Color
where
    I: IntoIterator<Item = &'a LightDescriptor>,
{
    let mut lighting = Color::splat(ambient);
    let mut highlight = Color::BLACK;
    for light in lights {
        lighting = lighting.add(contribution(normal, light, surface, 0.0));
        highlight = highlight.add(specular(normal, light, surface, material));
    }
    base.mul(lighting).add(highlight).clamp01()
}

/// Blend the relit color over the base color by the mask value
/// (0 = unlit base, 1 = fully relit).
#[inline]
pub fn apply_mask(base: Color, relit: Color, mask: f32) -> Color {
    Color::mix(base, relit, mask)
}
