use wasm_bindgen::prelude::*;

pub mod engine;
pub mod error;
pub mod lighting;
pub mod logger;
pub mod math;
pub mod session;

use engine::renderer::{self, CpuRenderer, Renderer};
use engine::surface::{self, AssetBytes, SurfaceMaps};
use engine::types::Color;
use lighting::descriptor;
use session::{EditorDefaults, EditorSession, LightSession, LightType, Outcome, SceneConfig, ViewportRect};

/// Initialize the WASM module (called once by the JS glue).
#[wasm_bindgen(start)]
pub fn init() {
    logger::start_logger(logger::LoggerConfig::default());
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// JS passes -1 for "no light".
fn index_arg(index: i32) -> Option<usize> {
    usize::try_from(index).ok()
}

fn parse_config(json: Option<String>) -> Result<Option<SceneConfig>, JsValue> {
    json.filter(|s| !s.trim().is_empty())
        .map(|s| SceneConfig::from_json(&s))
        .transpose()
        .map_err(js_error)
}

/// Standalone single-light composite over raw RGBA buffers.
///
/// `base_rgba`, `normal_rgba` and `mask_rgba`: Uint8Arrays of
/// width * height * 4 bytes
/// `params`: Float64Array, see `directional_params_from_buffer`
/// `rgba_out`: Uint8Array receiving the result (width * height * 4 bytes)
#[wasm_bindgen]
pub fn relight_directional(
    base_rgba: &[u8],
    normal_rgba: &[u8],
    mask_rgba: Option<Vec<u8>>,
    width: u32,
    height: u32,
    params: &[f64],
    rgba_out: &mut [u8],
) -> Result<(), JsValue> {
    let maps = SurfaceMaps::from_images(
        surface::image_from_rgba(width, height, base_rgba.to_vec()).map_err(js_error)?,
        surface::image_from_rgba(width, height, normal_rgba.to_vec()).map_err(js_error)?,
        None,
        mask_rgba.map(|m| surface::image_from_rgba(width, height, m)).transpose().map_err(js_error)?,
    )
    .map_err(js_error)?;
    let params = descriptor::directional_params_from_buffer(params);
    let frame = renderer::relight_directional(&maps, &params);
    renderer::copy_into(&frame, rgba_out).map_err(js_error)
}

/// Render a saved scene without opening the editor.
///
/// Takes encoded images and returns the composite as PNG. Without a saved
/// config a single default point light is used.
#[wasm_bindgen]
pub fn relight_image(
    base: &[u8],
    normal: &[u8],
    depth: Option<Vec<u8>>,
    mask: Option<Vec<u8>>,
    config_json: Option<String>,
) -> Result<Vec<u8>, JsValue> {
    let maps = SurfaceMaps::decode(&AssetBytes {
        base,
        normal,
        depth: depth.as_deref(),
        mask: mask.as_deref(),
    })
    .map_err(js_error)?;
    let config = parse_config(config_json)?;
    let mut session = LightSession::new();
    session.restore_or_default(config.as_ref());
    let frame = CpuRenderer.render(&maps, &session.scene_lighting()).map_err(js_error)?;
    surface::encode_png(&frame).map_err(js_error)
}

/// Result of `RelightEditor::apply`.
#[wasm_bindgen]
pub struct AppliedEdit {
    png: Vec<u8>,
    config: String,
}

#[wasm_bindgen]
impl AppliedEdit {
    /// Final composite, PNG encoded.
    pub fn png(&self) -> Vec<u8> {
        self.png.clone()
    }

    /// Scene config JSON to store alongside the image.
    pub fn config(&self) -> String {
        self.config.clone()
    }
}

/// Modal relight editor bound to one image.
///
/// Light indices are positions in the current light list; -1 means none.
/// Indices that no longer refer to a light are ignored.
#[wasm_bindgen]
pub struct RelightEditor {
    inner: EditorSession,
    defaults: EditorDefaults,
}

#[wasm_bindgen]
impl RelightEditor {
    /// Decode the images and restore `saved_config` (JSON) if given.
    #[wasm_bindgen(constructor)]
    pub fn new(
        base: &[u8],
        normal: &[u8],
        depth: Option<Vec<u8>>,
        mask: Option<Vec<u8>>,
        saved_config: Option<String>,
    ) -> Result<RelightEditor, JsValue> {
        let config = parse_config(saved_config)?;
        let inner = EditorSession::open(
            &AssetBytes {
                base,
                normal,
                depth: depth.as_deref(),
                mask: mask.as_deref(),
            },
            config.as_ref(),
        )
        .map_err(js_error)?;
        Ok(RelightEditor { inner, defaults: EditorDefaults::default() })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.maps().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.maps().height()
    }

    /// Replace the slider defaults new lights start from (EditorDefaults JSON).
    pub fn set_defaults(&mut self, json: &str) -> Result<(), JsValue> {
        self.defaults = serde_json::from_str(json).map_err(js_error)?;
        Ok(())
    }

    // ─── Lights ──────────────────────────────────────────────────

    pub fn light_count(&self) -> u32 {
        self.inner.session().len() as u32
    }

    pub fn active_index(&self) -> i32 {
        self.inner.session().active_index().map_or(-1, |i| i as i32)
    }

    pub fn set_active(&mut self, index: i32) -> bool {
        self.inner.session_mut().set_active(index_arg(index))
    }

    /// Create a "point" or "spot" light; returns its index.
    pub fn create_light(&mut self, light_type: &str) -> Result<u32, JsValue> {
        let light_type: LightType = light_type.parse().map_err(js_error)?;
        let session = self.inner.session_mut();
        session.create_light(light_type, &self.defaults);
        Ok(session.len() as u32 - 1)
    }

    pub fn delete_light(&mut self, index: i32) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().delete_light(i).is_some())
    }

    pub fn convert_type(&mut self, index: i32, light_type: &str) -> Result<bool, JsValue> {
        let light_type: LightType = light_type.parse().map_err(js_error)?;
        Ok(index_arg(index).map_or(false, |i| {
            self.inner.session_mut().convert_type(i, light_type, &self.defaults)
        }))
    }

    pub fn light_name(&self, index: i32) -> Option<String> {
        self.light(index).map(|l| l.name().to_string())
    }

    pub fn light_type(&self, index: i32) -> Option<String> {
        self.light(index).map(|l| l.light_type().to_string())
    }

    pub fn light_visible(&self, index: i32) -> bool {
        self.light(index).map_or(false, |l| l.is_visible())
    }

    /// [x, y, z] of the light.
    pub fn light_position(&self, index: i32) -> Option<Vec<f32>> {
        self.light(index).map(|l| {
            let p = l.position();
            vec![p.x, p.y, p.z]
        })
    }

    /// [x, y, z] of a spot's aim point.
    pub fn light_target(&self, index: i32) -> Option<Vec<f32>> {
        self.light(index)
            .and_then(|l| l.target_position())
            .map(|t| vec![t.x, t.y, t.z])
    }

    /// Marker position as [u, v] viewport fractions.
    pub fn light_anchor(&self, index: i32) -> Option<Vec<f32>> {
        self.light(index).and_then(|l| l.anchor()).map(|a| vec![a.u, a.v])
    }

    // ─── Pointer ─────────────────────────────────────────────────

    /// Move the active light (or its aim while editing a spot target) to
    /// the pointer. Returns false without an active light.
    pub fn pointer_move(&mut self, screen_x: f32, screen_y: f32, left: f32, top: f32, width: f32, height: f32) -> bool {
        let rect = ViewportRect::new(left, top, width, height);
        let (session, depth) = self.inner.session_and_depth();
        session.update_position_from_pointer(screen_x, screen_y, &rect, depth).is_some()
    }

    pub fn begin_light_drag(&mut self) {
        self.inner.session_mut().begin_light_drag();
    }

    pub fn begin_target_edit(&mut self) -> bool {
        self.inner.session_mut().begin_target_edit()
    }

    pub fn end_target_edit(&mut self) {
        self.inner.session_mut().end_target_edit();
    }

    // ─── Per-light parameters ────────────────────────────────────

    pub fn set_intensity(&mut self, index: i32, intensity: f32) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_intensity(i, intensity))
    }

    /// `color` is "#rrggbb".
    pub fn set_color(&mut self, index: i32, color: &str) -> bool {
        let color = Color::from_hex(color);
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_color(i, color))
    }

    pub fn toggle_visibility(&mut self, index: i32) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().toggle_visibility(i))
    }

    pub fn set_visible(&mut self, index: i32, visible: bool) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_visible(i, visible))
    }

    pub fn set_point_radius(&mut self, index: i32, radius: f32) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_point_radius(i, radius))
    }

    pub fn set_spot_angle(&mut self, index: i32, angle: f32) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_spot_angle(i, angle))
    }

    pub fn set_spot_penumbra(&mut self, index: i32, penumbra: f32) -> bool {
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_spot_penumbra(i, penumbra))
    }

    /// `params`: Float64Array, see `shading_bands_from_buffer`.
    pub fn set_shading(&mut self, index: i32, params: &[f64]) -> bool {
        let bands = descriptor::shading_bands_from_buffer(params);
        index_arg(index).map_or(false, |i| self.inner.session_mut().set_shading(i, bands))
    }

    // ─── Globals ─────────────────────────────────────────────────

    pub fn set_ambient(&mut self, ambient: f32) {
        self.inner.session_mut().set_ambient(ambient);
    }

    pub fn set_normal_strength(&mut self, strength: f32) {
        self.inner.session_mut().set_normal_strength(strength);
    }

    pub fn set_specular(&mut self, strength: f32, shininess: f32) {
        self.inner.session_mut().set_specular(strength, shininess);
    }

    pub fn set_z_offset(&mut self, offset: f32) {
        let (session, depth) = self.inner.session_and_depth();
        session.set_z_offset(offset, depth);
    }

    /// Flat uniform blocks of the visible lights, concatenated, for a GPU
    /// preview. See `LightDescriptor::to_uniform_block`.
    pub fn light_uniforms(&self) -> Vec<f32> {
        self.inner
            .session()
            .scene_lighting()
            .lights
            .iter()
            .flat_map(|l| l.to_uniform_block())
            .collect()
    }

    // ─── Frames & persistence ────────────────────────────────────

    /// Render the current scene into `rgba_out` (width * height * 4 bytes).
    pub fn render(&mut self, rgba_out: &mut [u8]) -> Result<(), JsValue> {
        let frame = self.inner.preview().map_err(js_error)?;
        renderer::copy_into(&frame, rgba_out).map_err(js_error)
    }

    pub fn save_config(&self) -> Result<String, JsValue> {
        self.inner.session().serialize().to_json().map_err(js_error)
    }

    /// Returns false when `json` is absent or empty; the session is then
    /// left unchanged.
    pub fn restore_config(&mut self, json: Option<String>) -> Result<bool, JsValue> {
        let config = parse_config(json)?;
        Ok(self.inner.session_mut().restore(config.as_ref()))
    }

    /// Finish editing. Consumes the editor.
    pub fn apply(self) -> Result<AppliedEdit, JsValue> {
        match self.inner.apply().map_err(js_error)? {
            Outcome::Applied { png, config } => Ok(AppliedEdit {
                png,
                config: config.to_json().map_err(js_error)?,
            }),
            Outcome::Cancelled => Err(js_error("edit was cancelled")),
        }
    }

    /// Discard all edits. Consumes the editor.
    pub fn cancel(self) {
        self.inner.cancel();
    }
}

impl RelightEditor {
    fn light(&self, index: i32) -> Option<&session::LightSource> {
        index_arg(index).and_then(|i| self.inner.session().get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png(px: [u8; 4]) -> Vec<u8> {
        surface::encode_png(&RgbaImage::from_pixel(3, 3, Rgba(px))).unwrap()
    }

    #[test]
    fn test_relight_image_empty_config_uses_default_light() {
        let (base, normal) = (png([200, 150, 100, 255]), png([128, 128, 255, 255]));
        let default_scene = relight_image(&base, &normal, None, None, None).unwrap();
        let from_empty = relight_image(&base, &normal, None, None, Some("{}".to_string())).unwrap();
        assert_eq!(from_empty, default_scene);
        let blank = relight_image(&base, &normal, None, None, Some("  ".to_string())).unwrap();
        assert_eq!(blank, default_scene);
    }
}
