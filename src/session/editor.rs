/// Modal editing session around one image.
///
/// Opening decodes the assets and restores any saved scene. Preview renders
/// the current session; apply renders the final image and hands back the
/// PNG together with the config to persist; cancel discards everything.

use image::RgbaImage;
use log::info;

use crate::engine::renderer::{CpuRenderer, Renderer};
use crate::engine::surface::{encode_png, AssetBytes, SurfaceMaps, TextureMap};
use crate::error::Result;
use super::config::SceneConfig;
use super::light_session::LightSession;

/// How an editing session ended.
#[derive(Debug)]
pub enum Outcome {
    /// Final composite as PNG plus the scene to persist next to it.
    Applied { png: Vec<u8>, config: SceneConfig },
    Cancelled,
}

pub struct EditorSession {
    maps: SurfaceMaps,
    session: LightSession,
    renderer: CpuRenderer,
}

impl EditorSession {
    /// Decode the assets and restore `saved` if present. Without a saved
    /// scene the session starts empty and previews the unlit image.
    pub fn open(assets: &AssetBytes<'_>, saved: Option<&SceneConfig>) -> Result<Self> {
        let maps = SurfaceMaps::decode(assets)?;
        Ok(Self::with_maps(maps, saved))
    }

    pub fn with_maps(maps: SurfaceMaps, saved: Option<&SceneConfig>) -> Self {
        let mut session = LightSession::new();
        session.restore(saved);
        info!(
            "editor opened on {}x{} image with {} light(s)",
            maps.width(),
            maps.height(),
            session.len()
        );
        Self { maps, session, renderer: CpuRenderer }
    }

    pub fn session(&self) -> &LightSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut LightSession {
        &mut self.session
    }

    pub fn maps(&self) -> &SurfaceMaps {
        &self.maps
    }

    /// Split borrow for pointer updates, which need the depth map while
    /// mutating the session.
    pub fn session_and_depth(&mut self) -> (&mut LightSession, Option<&TextureMap>) {
        (&mut self.session, self.maps.depth.as_ref())
    }

    pub fn preview(&mut self) -> Result<RgbaImage> {
        let lighting = self.session.scene_lighting();
        self.renderer.render(&self.maps, &lighting)
    }

    pub fn apply(mut self) -> Result<Outcome> {
        let frame = self.preview()?;
        let png = encode_png(&frame)?;
        let config = self.session.serialize();
        info!("editor applied: {} light(s), {} byte png", config.lights.len(), png.len());
        Ok(Outcome::Applied { png, config })
    }

    pub fn cancel(self) -> Outcome {
        info!("editor cancelled");
        Outcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Color;
    use crate::session::config::EditorDefaults;
    use crate::session::light::LightType;
    use crate::session::light_session::ViewportRect;
    use image::Rgba;

    fn assets() -> (Vec<u8>, Vec<u8>) {
        let base = encode_png(&RgbaImage::from_pixel(4, 4, Rgba([200, 150, 100, 255]))).unwrap();
        let normal = encode_png(&RgbaImage::from_pixel(4, 4, Rgba([128, 128, 255, 255]))).unwrap();
        (base, normal)
    }

    #[test]
    fn test_open_without_config_previews_unlit() {
        let (base, normal) = assets();
        let mut editor = EditorSession::open(&AssetBytes { base: &base, normal: &normal, ..AssetBytes::default() }, None).unwrap();
        assert!(editor.session().is_empty());
        let frame = editor.preview().unwrap();
        assert_eq!(frame.get_pixel(0, 0).0, [200, 150, 100, 255]);
    }

    #[test]
    fn test_open_rejects_bad_asset() {
        let (base, _) = assets();
        let result = EditorSession::open(&AssetBytes { base: &base, normal: b"junk", ..AssetBytes::default() }, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_returns_png_and_config() {
        let (base, normal) = assets();
        let mut editor = EditorSession::open(&AssetBytes { base: &base, normal: &normal, ..AssetBytes::default() }, None).unwrap();
        {
            let (session, depth) = editor.session_and_depth();
            session.create_light(LightType::Point, &EditorDefaults::default());
            session.set_color(0, Color::new(1.0, 0.0, 0.0));
            session.update_position_from_pointer(50.0, 50.0, &ViewportRect::new(0.0, 0.0, 100.0, 100.0), depth);
        }
        match editor.apply().unwrap() {
            Outcome::Applied { png, config } => {
                let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
                assert_eq!(decoded.dimensions(), (4, 4));
                // red light over ambient 0.2: red channel brightens, blue is ambient only
                let px = decoded.get_pixel(1, 1).0;
                assert!(px[0] > 200);
                assert_eq!(px[2], 20);
                assert_eq!(config.lights.len(), 1);
                assert_eq!(config.lights[0].color, Color::new(1.0, 0.0, 0.0));
            }
            Outcome::Cancelled => panic!("expected applied"),
        }
    }

    #[test]
    fn test_reopen_restores_saved_scene() {
        let (base, normal) = assets();
        let bytes = AssetBytes { base: &base, normal: &normal, ..AssetBytes::default() };
        let mut editor = EditorSession::open(&bytes, None).unwrap();
        editor.session_mut().create_light(LightType::Spot, &EditorDefaults::default());
        editor.session_mut().create_light(LightType::Point, &EditorDefaults::default());
        let first = editor.preview().unwrap();
        let config = match editor.apply().unwrap() {
            Outcome::Applied { config, .. } => config,
            Outcome::Cancelled => panic!("expected applied"),
        };

        let mut reopened = EditorSession::open(&bytes, Some(&config)).unwrap();
        assert_eq!(reopened.session().len(), 2);
        assert_eq!(reopened.preview().unwrap(), first);
    }

    #[test]
    fn test_hidden_light_contributes_nothing() {
        let (base, normal) = assets();
        let bytes = AssetBytes { base: &base, normal: &normal, ..AssetBytes::default() };
        let rect = ViewportRect::new(0.0, 0.0, 4.0, 4.0);
        let defaults = EditorDefaults { intensity: 0.5, ..EditorDefaults::default() };

        let mut both = EditorSession::open(&bytes, None).unwrap();
        let mut single = EditorSession::open(&bytes, None).unwrap();
        for editor in [&mut both, &mut single] {
            let session = editor.session_mut();
            session.create_light(LightType::Point, &defaults);
            session.update_position_from_pointer(1.0, 1.0, &rect, None);
        }
        both.session_mut().create_light(LightType::Point, &defaults);
        both.session_mut().update_position_from_pointer(3.0, 3.0, &rect, None);

        let summed = both.preview().unwrap();
        both.session_mut().toggle_visibility(1);
        assert_eq!(both.preview().unwrap(), single.preview().unwrap());
        assert_ne!(summed, single.preview().unwrap());
        both.session_mut().toggle_visibility(1);
        assert_eq!(both.preview().unwrap(), summed);
    }

    #[test]
    fn test_cancel_discards() {
        let (base, normal) = assets();
        let mut editor = EditorSession::open(&AssetBytes { base: &base, normal: &normal, ..AssetBytes::default() }, None).unwrap();
        editor.session_mut().create_light(LightType::Point, &EditorDefaults::default());
        assert!(matches!(editor.cancel(), Outcome::Cancelled));
    }
}
