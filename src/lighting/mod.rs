/// Lighting model of the relight compositor.
///
/// - Light descriptors (directional, point, spot) with shadow/highlight bands
/// - Per-pixel diffuse, band response, tint and specular
/// - Multi-light summation and mask blending

pub mod descriptor;
pub mod shade;
