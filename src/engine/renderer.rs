/// Frame producers.
///
/// The session never talks to a rendering API. It hands a `SceneLighting`
/// and the decoded surface to a `Renderer`, which produces a displayable
/// frame. `CpuRenderer` evaluates the compositor once per pixel; a GPU
/// renderer on the JS side evaluates the same math per fragment from the
/// descriptors' uniform blocks.

use image::{Rgba, RgbaImage};

use crate::engine::surface::SurfaceMaps;
use crate::error::{RelightError, Result};
use crate::lighting::descriptor::{DirectionalParams, LightDescriptor, MaterialParams};
use crate::lighting::shade;

/// Everything a renderer needs to light a surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLighting {
    /// Visible lights only.
    pub lights: Vec<LightDescriptor>,
    pub ambient: f32,
    pub material: MaterialParams,
}

/// Capability that turns lighting plus a surface into a frame.
pub trait Renderer {
    type Frame;

    fn render(&mut self, surface: &SurfaceMaps, lighting: &SceneLighting) -> Result<Self::Frame>;
}

/// Per-pixel software renderer producing an RGBA8 image at base resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRenderer;

impl Renderer for CpuRenderer {
    type Frame = RgbaImage;

    fn render(&mut self, surface: &SurfaceMaps, lighting: &SceneLighting) -> Result<RgbaImage> {
        Ok(render_scene(surface, lighting))
    }
}

/// Multi-light composite of the whole surface.
pub fn render_scene(surface: &SurfaceMaps, lighting: &SceneLighting) -> RgbaImage {
    let strength = lighting.material.normal_strength;
    RgbaImage::from_fn(surface.width(), surface.height(), |x, y| {
        let (u, v) = surface.uv(x, y);
        let base = surface.base_color(x, y);
        let normal = surface.normal.sample_normal(u, v).with_strength(strength);
        let point = shade::surface_point(u, v);
        let relit = shade::shade_many(
            base,
            &normal,
            lighting.lights.iter(),
            lighting.ambient,
            &lighting.material,
            &point,
        );
        let out = shade::apply_mask(base, relit, surface.mask_at(u, v));
        let [r, g, b] = out.to_bytes();
        Rgba([r, g, b, surface.base.get_pixel(x, y).0[3]])
    })
}

/// Standalone single-light composite. Normals are used as decoded.
pub fn relight_directional(surface: &SurfaceMaps, params: &DirectionalParams) -> RgbaImage {
    RgbaImage::from_fn(surface.width(), surface.height(), |x, y| {
        let (u, v) = surface.uv(x, y);
        let base = surface.base_color(x, y);
        let normal = surface.normal.sample_normal(u, v);
        let point = shade::surface_point(u, v);
        let relit = shade::shade(base, &normal, &params.light, params.ambient, &point);
        let out = shade::apply_mask(base, relit, surface.mask_at(u, v));
        let [r, g, b] = out.to_bytes();
        Rgba([r, g, b, surface.base.get_pixel(x, y).0[3]])
    })
}

/// Copy a frame into a caller-owned RGBA buffer of matching size.
pub fn copy_into(frame: &RgbaImage, rgba_out: &mut [u8]) -> Result<()> {
    let raw = frame.as_raw();
    if rgba_out.len() != raw.len() {
        return Err(RelightError::BufferSize { expected: raw.len(), actual: rgba_out.len() });
    }
    rgba_out.copy_from_slice(raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Vec3;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    fn flat_surface(mask: Option<RgbaImage>) -> SurfaceMaps {
        SurfaceMaps::from_images(
            solid(4, 3, [200, 150, 100, 255]),
            // 127.5 is the exact zero; use a flat map that decodes to (0, 0, 1)
            RgbaImage::from_fn(4, 3, |_, _| Rgba([128, 128, 255, 255])),
            None,
            mask,
        )
        .unwrap()
    }

    #[test]
    fn test_directional_front_light_identity() {
        let surface = flat_surface(None);
        let params = DirectionalParams::default();
        let out = relight_directional(&surface, &params);
        for px in out.pixels() {
            assert_eq!(px.0, [200, 150, 100, 255]);
        }
    }

    #[test]
    fn test_directional_ambient_clamps() {
        let surface = flat_surface(None);
        let params = DirectionalParams { ambient: 0.5, ..DirectionalParams::default() };
        let out = relight_directional(&surface, &params);
        assert_eq!(out.get_pixel(1, 1).0, [255, 225, 150, 255]);
    }

    #[test]
    fn test_full_mask_matches_no_mask() {
        let lighting = SceneLighting {
            lights: vec![LightDescriptor::point(Vec3::new(0.3, -0.2, 1.0), 10.0).with_intensity(0.6)],
            ambient: 0.2,
            material: MaterialParams::default(),
        };
        let plain = render_scene(&flat_surface(None), &lighting);
        let masked = render_scene(&flat_surface(Some(solid(4, 3, [255, 255, 255, 255]))), &lighting);
        assert_eq!(plain, masked);
    }

    #[test]
    fn test_zero_mask_returns_base() {
        let lighting = SceneLighting {
            lights: vec![LightDescriptor::point(Vec3::new(0.0, 0.0, 1.0), 10.0).with_intensity(3.0)],
            ambient: 0.0,
            material: MaterialParams::default(),
        };
        let out = render_scene(&flat_surface(Some(solid(2, 2, [0, 0, 0, 255]))), &lighting);
        for px in out.pixels() {
            assert_eq!(px.0, [200, 150, 100, 255]);
        }
    }

    #[test]
    fn test_cpu_renderer_and_copy_into() {
        let surface = flat_surface(None);
        let lighting = SceneLighting { ambient: 1.0, ..SceneLighting::default() };
        let frame = CpuRenderer.render(&surface, &lighting).unwrap();
        let mut buf = vec![0u8; 4 * 3 * 4];
        copy_into(&frame, &mut buf).unwrap();
        assert_eq!(&buf[0..4], &[200, 150, 100, 255]);
        assert!(copy_into(&frame, &mut [0u8; 5]).is_err());
    }
}
