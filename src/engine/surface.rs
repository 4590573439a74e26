/// Decoded input images and UV sampling.
///
/// The base color image defines the output resolution. Normal, depth and
/// mask maps share its UV space but not necessarily its pixel size, so they
/// are sampled by UV with nearest-texel lookup.

use image::{ImageEncoder, RgbaImage};
use log::{debug, warn};

use crate::engine::types::{Color, NormalSample};
use crate::error::{AssetKind, RelightError, Result};
use crate::math::utils;

/// An RGBA8 map sampled by UV.
#[derive(Clone, Debug)]
pub struct TextureMap {
    image: RgbaImage,
}

impl TextureMap {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Nearest texel at (u, v); both coordinates are clamped to [0, 1].
    #[inline]
    pub fn texel(&self, u: f32, v: f32) -> [u8; 4] {
        let (w, h) = (self.image.width(), self.image.height());
        let x = ((utils::clamp01(u) * w as f32) as u32).min(w.saturating_sub(1));
        let y = ((utils::clamp01(v) * h as f32) as u32).min(h.saturating_sub(1));
        self.image.get_pixel(x, y).0
    }

    /// Red channel at (u, v) mapped to [0, 1]. Depth and mask maps are
    /// read this way.
    #[inline]
    pub fn sample_red(&self, u: f32, v: f32) -> f32 {
        utils::byte_to_float(self.texel(u, v)[0])
    }

    #[inline]
    pub fn sample_normal(&self, u: f32, v: f32) -> NormalSample {
        let [r, g, b, _] = self.texel(u, v);
        NormalSample::decode(r, g, b)
    }
}

/// Encoded input images as received from the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetBytes<'a> {
    pub base: &'a [u8],
    pub normal: &'a [u8],
    pub depth: Option<&'a [u8]>,
    pub mask: Option<&'a [u8]>,
}

/// Every decoded input the compositor reads.
#[derive(Clone, Debug)]
pub struct SurfaceMaps {
    pub base: RgbaImage,
    pub normal: TextureMap,
    pub depth: Option<TextureMap>,
    pub mask: Option<TextureMap>,
}

impl SurfaceMaps {
    /// Decode all assets. The first failing image aborts the whole set.
    pub fn decode(assets: &AssetBytes<'_>) -> Result<Self> {
        let base = decode_image(assets.base, AssetKind::BaseColor)?;
        let normal = decode_image(assets.normal, AssetKind::NormalMap)?;
        let depth = assets
            .depth
            .map(|bytes| decode_image(bytes, AssetKind::DepthMap))
            .transpose()?;
        let mask = assets
            .mask
            .map(|bytes| decode_image(bytes, AssetKind::Mask))
            .transpose()?;
        Self::from_images(base, normal, depth, mask)
    }

    /// Build from decoded images. Zero-sized images are rejected.
    pub fn from_images(
        base: RgbaImage,
        normal: RgbaImage,
        depth: Option<RgbaImage>,
        mask: Option<RgbaImage>,
    ) -> Result<Self> {
        ensure_non_empty(&base, AssetKind::BaseColor)?;
        ensure_non_empty(&normal, AssetKind::NormalMap)?;
        if let Some(d) = &depth {
            ensure_non_empty(d, AssetKind::DepthMap)?;
        }
        if let Some(m) = &mask {
            ensure_non_empty(m, AssetKind::Mask)?;
        }
        debug!(
            "surface maps ready: {}x{} base, depth={}, mask={}",
            base.width(),
            base.height(),
            depth.is_some(),
            mask.is_some()
        );
        Ok(Self {
            base,
            normal: TextureMap::new(normal),
            depth: depth.map(TextureMap::new),
            mask: mask.map(TextureMap::new),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.base.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.base.height()
    }

    /// UV of the center of output pixel (x, y).
    #[inline]
    pub fn uv(&self, x: u32, y: u32) -> (f32, f32) {
        (
            (x as f32 + 0.5) / self.width() as f32,
            (y as f32 + 0.5) / self.height() as f32,
        )
    }

    #[inline]
    pub fn base_color(&self, x: u32, y: u32) -> Color {
        let [r, g, b, _] = self.base.get_pixel(x, y).0;
        Color::from_bytes(r, g, b)
    }

    /// Mask value at (u, v); 1.0 everywhere when no mask is loaded.
    #[inline]
    pub fn mask_at(&self, u: f32, v: f32) -> f32 {
        self.mask.as_ref().map_or(1.0, |m| m.sample_red(u, v))
    }

}

/// Wrap a raw RGBA8 buffer (row-major, top row first) of the given size.
pub fn image_from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    let actual = data.len();
    RgbaImage::from_raw(width, height, data).ok_or(RelightError::BufferSize { expected, actual })
}

fn ensure_non_empty(image: &RgbaImage, asset: AssetKind) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(RelightError::EmptyAsset { asset });
    }
    Ok(())
}

/// Decode one encoded image into RGBA8.
pub fn decode_image(bytes: &[u8], asset: AssetKind) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| {
            warn!("could not decode {} image: {}", asset, source);
            RelightError::AssetDecode { asset, source }
        })
}

/// Encode an RGBA8 buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(out)
}
