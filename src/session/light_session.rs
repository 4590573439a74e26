/// The light session: an ordered set of lights, the active selection, and
/// the mapping from pointer input to 3D light positions.
///
/// Every operation is total: an index with no light behind it is logged and
/// ignored.

use log::{debug, info};

use crate::engine::renderer::SceneLighting;
use crate::engine::surface::TextureMap;
use crate::engine::types::{Color, Vec3};
use crate::math::utils;
use crate::lighting::descriptor::{
    default_spot_target, LightDescriptor, LightKind, MaterialParams, ShadingBands, DEFAULT_LIGHT_DISTANCE,
};
use super::config::{AmbientConfig, EditorDefaults, LightConfig, PointParams, SceneConfig, SpotParams};
use super::light::{LightSource, LightType, ScreenAnchor};

/// Where new lights are placed: image center, nominal depth.
pub const INITIAL_LIGHT_POSITION: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

/// Light height used when no depth map is available.
pub const DEFAULT_DEPTH_Z: f32 = 1.0;

/// Ambient of a session with no lights: the image shows unlit.
pub const UNLIT_AMBIENT: f32 = 1.0;

/// Ambient used by the default scene of a headless run.
pub const DEFAULT_SCENE_AMBIENT: f32 = 0.2;

/// Screen rectangle the pointer coordinates refer to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Pointer position as clamped viewport fractions (0,0 = top-left).
    pub fn normalize(&self, screen_x: f32, screen_y: f32) -> ScreenAnchor {
        ScreenAnchor {
            u: utils::clamp01((screen_x - self.left) / self.width),
            v: utils::clamp01((screen_y - self.top) / self.height),
        }
    }
}

/// Light height above the image plane at (u, v): `1 + depth` from the
/// depth map's red channel, or `DEFAULT_DEPTH_Z` without a depth map.
pub fn depth_lookup(depth: Option<&TextureMap>, u: f32, v: f32) -> f32 {
    match depth {
        Some(map) => 1.0 + map.sample_red(u, v),
        None => DEFAULT_DEPTH_Z,
    }
}

/// Normalized image-space x, y for a viewport anchor; screen y is flipped.
#[inline]
fn anchor_to_plane(anchor: ScreenAnchor) -> (f32, f32) {
    (anchor.u * 2.0 - 1.0, (1.0 - anchor.v) * 2.0 - 1.0)
}

#[derive(Clone, Debug)]
pub struct LightSession {
    lights: Vec<LightSource>,
    active: Option<usize>,
    next_id: u64,
    ambient: f32,
    material: MaterialParams,
    z_offset: f32,
}

impl Default for LightSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSession {
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            active: None,
            next_id: 1,
            ambient: UNLIT_AMBIENT,
            material: MaterialParams::default(),
            z_offset: 0.0,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────

    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LightSource> {
        self.lights.get(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&LightSource> {
        self.active.and_then(|i| self.lights.get(i))
    }

    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    pub fn material(&self) -> &MaterialParams {
        &self.material
    }

    pub fn z_offset(&self) -> f32 {
        self.z_offset
    }

    /// Visible lights plus the global terms, ready for a renderer.
    pub fn scene_lighting(&self) -> SceneLighting {
        SceneLighting {
            lights: self
                .lights
                .iter()
                .filter(|l| l.visible)
                .map(|l| l.descriptor)
                .collect(),
            ambient: self.ambient,
            material: self.material,
        }
    }

    // ─── Collection ──────────────────────────────────────────────

    /// Append a light built from the current defaults and make it active.
    ///
    /// The defaults' ambient and normal strength become the session's, as
    /// the editor's sliders drive both at once.
    pub fn create_light(&mut self, light_type: LightType, defaults: &EditorDefaults) -> &LightSource {
        let descriptor = match light_type {
            LightType::Point => LightDescriptor::point(INITIAL_LIGHT_POSITION, defaults.point_radius),
            LightType::Spot => LightDescriptor::spot(
                INITIAL_LIGHT_POSITION,
                Some(default_spot_target(&INITIAL_LIGHT_POSITION)),
                defaults.spot_angle,
                defaults.spot_penumbra,
            ),
        }
        .with_intensity(defaults.intensity.max(0.0));

        let id = self.next_id;
        self.next_id += 1;
        let name = format!("Light {}", self.lights.len() + 1);
        self.lights.push(LightSource::new(id, name, descriptor));
        self.ambient = defaults.ambient.max(0.0);
        self.material.normal_strength = defaults.normal_strength;

        let index = self.lights.len() - 1;
        self.active = Some(index);
        debug!("created {} light #{} at index {}", light_type, id, index);
        &self.lights[index]
    }

    /// Remove the light at `index`, returning it. Out-of-range indices are
    /// ignored.
    ///
    /// The active selection follows the previously active light if it
    /// survives, otherwise falls to the last remaining light.
    pub fn delete_light(&mut self, index: usize) -> Option<LightSource> {
        if index >= self.lights.len() {
            debug!("delete ignored: no light at index {}", index);
            return None;
        }
        let removed = self.lights.remove(index);
        self.active = match self.active {
            Some(a) if a == index => self.lights.len().checked_sub(1),
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
        if self.lights.is_empty() {
            self.active = None;
            self.ambient = UNLIT_AMBIENT;
        }
        debug!("deleted light #{}; active is now {:?}", removed.id(), self.active);
        Some(removed)
    }

    /// Select the light edits apply to; `None` clears the selection.
    /// Returns false (and changes nothing) for an out-of-range index.
    pub fn set_active(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.lights.len() => {
                debug!("set_active ignored: no light at index {}", i);
                false
            }
            _ => {
                if let Some(previous) = self.active.and_then(|a| self.lights.get_mut(a)) {
                    previous.editing_target = false;
                }
                self.active = index;
                true
            }
        }
    }

    /// Change a light's type, keeping position, intensity, color,
    /// visibility and shading.
    ///
    /// Becoming a spot keeps an existing aim point or aims one unit below
    /// the light; becoming a point drops the spot-only fields.
    pub fn convert_type(&mut self, index: usize, new_type: LightType, defaults: &EditorDefaults) -> bool {
        let Some(light) = self.lights.get_mut(index) else {
            debug!("convert ignored: no light at index {}", index);
            return false;
        };
        let position = light.descriptor.position;
        light.descriptor.kind = match (new_type, light.descriptor.kind) {
            (LightType::Spot, LightKind::Spot { angle, penumbra, distance, target }) => LightKind::Spot {
                angle,
                penumbra,
                distance,
                target: Some(target.unwrap_or_else(|| default_spot_target(&position))),
            },
            (LightType::Spot, _) => LightKind::Spot {
                angle: defaults.spot_angle,
                penumbra: defaults.spot_penumbra,
                distance: DEFAULT_LIGHT_DISTANCE,
                target: Some(default_spot_target(&position)),
            },
            (LightType::Point, LightKind::Point { radius }) => LightKind::Point { radius },
            (LightType::Point, _) => {
                light.editing_target = false;
                LightKind::Point { radius: defaults.point_radius }
            }
        };
        debug!("light #{} is now a {} light", light.id(), new_type);
        true
    }

    /// Remove every light and reset the globals to an empty session.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.active = None;
        self.ambient = UNLIT_AMBIENT;
        self.material = MaterialParams::default();
        self.z_offset = 0.0;
    }

    // ─── Pointer mapping ─────────────────────────────────────────

    /// Move the active light (or, while editing a spot's aim, its target)
    /// to the pointer. Returns the point that was set, or `None` without an
    /// active light.
    ///
    /// The light's z comes from the depth map under the pointer plus the
    /// session's z offset; targets always sit on the image plane. A spot
    /// that has no aim yet gets one below its new position.
    pub fn update_position_from_pointer(
        &mut self,
        screen_x: f32,
        screen_y: f32,
        rect: &ViewportRect,
        depth: Option<&TextureMap>,
    ) -> Option<Vec3> {
        let z_offset = self.z_offset;
        let light = self.active.and_then(|i| self.lights.get_mut(i))?;
        let anchor = rect.normalize(screen_x, screen_y);
        let (x, y) = anchor_to_plane(anchor);

        if light.editing_target {
            if let LightKind::Spot { target, .. } = &mut light.descriptor.kind {
                let aim = Vec3::new(x, y, 0.0);
                *target = Some(aim);
                return Some(aim);
            }
        }

        let position = Vec3::new(x, y, depth_lookup(depth, anchor.u, anchor.v) + z_offset);
        light.descriptor.position = position;
        light.anchor = Some(anchor);
        if let LightKind::Spot { target, .. } = &mut light.descriptor.kind {
            if target.is_none() {
                *target = Some(default_spot_target(&position));
            }
        }
        Some(position)
    }

    /// Set the z offset and re-derive the active light's height from the
    /// depth under its marker.
    pub fn set_z_offset(&mut self, offset: f32, depth: Option<&TextureMap>) {
        self.z_offset = offset;
        if let Some(light) = self.active.and_then(|i| self.lights.get_mut(i)) {
            if let Some(anchor) = light.anchor {
                light.descriptor.position.z = depth_lookup(depth, anchor.u, anchor.v) + offset;
            }
        }
    }

    // ─── Spot aim editing ────────────────────────────────────────

    /// Secondary interaction started: the active spot enters
    /// target-editing. Returns false if the active light is not a spot.
    pub fn begin_target_edit(&mut self) -> bool {
        match self.active.and_then(|i| self.lights.get_mut(i)) {
            Some(light) if light.light_type() == LightType::Spot => {
                light.editing_target = true;
                true
            }
            _ => false,
        }
    }

    /// Interaction ended: back to idle.
    pub fn end_target_edit(&mut self) {
        if let Some(light) = self.active.and_then(|i| self.lights.get_mut(i)) {
            light.editing_target = false;
        }
    }

    /// Primary drag started: moves the light itself, never the aim.
    pub fn begin_light_drag(&mut self) {
        self.end_target_edit();
    }

    // ─── Per-light parameters ────────────────────────────────────

    fn with_light(&mut self, index: usize, what: &str, f: impl FnOnce(&mut LightSource) -> bool) -> bool {
        match self.lights.get_mut(index) {
            Some(light) => f(light),
            None => {
                debug!("{} ignored: no light at index {}", what, index);
                false
            }
        }
    }

    pub fn set_intensity(&mut self, index: usize, intensity: f32) -> bool {
        self.with_light(index, "set_intensity", |l| {
            l.descriptor.intensity = intensity.max(0.0);
            true
        })
    }

    pub fn set_color(&mut self, index: usize, color: Color) -> bool {
        self.with_light(index, "set_color", |l| {
            l.descriptor.color = color;
            true
        })
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        self.with_light(index, "set_visible", |l| {
            l.visible = visible;
            true
        })
    }

    pub fn toggle_visibility(&mut self, index: usize) -> bool {
        self.with_light(index, "toggle_visibility", |l| {
            l.visible = !l.visible;
            true
        })
    }

    pub fn set_shading(&mut self, index: usize, bands: ShadingBands) -> bool {
        self.with_light(index, "set_shading", |l| {
            l.descriptor.bands = bands;
            true
        })
    }

    /// Point lights only.
    pub fn set_point_radius(&mut self, index: usize, value: f32) -> bool {
        self.with_light(index, "set_point_radius", |l| match &mut l.descriptor.kind {
            LightKind::Point { radius } => {
                *radius = value;
                true
            }
            _ => false,
        })
    }

    /// Spot lights only; `value` is the half-cone in radians.
    pub fn set_spot_angle(&mut self, index: usize, value: f32) -> bool {
        self.with_light(index, "set_spot_angle", |l| match &mut l.descriptor.kind {
            LightKind::Spot { angle, .. } => {
                *angle = value;
                true
            }
            _ => false,
        })
    }

    /// Spot lights only.
    pub fn set_spot_penumbra(&mut self, index: usize, value: f32) -> bool {
        self.with_light(index, "set_spot_penumbra", |l| match &mut l.descriptor.kind {
            LightKind::Spot { penumbra, .. } => {
                *penumbra = utils::clamp01(value);
                true
            }
            _ => false,
        })
    }

    // ─── Globals ─────────────────────────────────────────────────

    pub fn set_ambient(&mut self, ambient: f32) {
        self.ambient = ambient.max(0.0);
    }

    pub fn set_normal_strength(&mut self, strength: f32) {
        self.material.normal_strength = strength;
    }

    pub fn set_specular(&mut self, strength: f32, shininess: f32) {
        self.material.specular_strength = strength.max(0.0);
        self.material.shininess = shininess.max(0.0);
    }

    // ─── Persistence ─────────────────────────────────────────────

    /// Snapshot the session. Aim editing is transient and not included.
    pub fn serialize(&self) -> SceneConfig {
        SceneConfig {
            lights: self.lights.iter().map(light_to_config).collect(),
            ambient_light: AmbientConfig { intensity: self.ambient },
            material: self.material,
            z_offset: self.z_offset,
        }
    }

    /// Replace the session's contents with a saved config.
    ///
    /// Returns false and leaves the session untouched when there is nothing
    /// to restore: no config, or an empty one such as `{}`. The last
    /// restored light becomes active.
    pub fn restore(&mut self, config: Option<&SceneConfig>) -> bool {
        let Some(config) = config.filter(|c| !c.is_empty()) else {
            debug!("no saved scene config; session left as is");
            return false;
        };
        self.lights.clear();
        self.active = None;
        for light in &config.lights {
            let id = self.next_id;
            self.next_id += 1;
            let name = format!("Light {}", self.lights.len() + 1);
            let mut source = LightSource::new(id, name, config_to_descriptor(light));
            source.visible = light.visible;
            source.anchor = light.anchor();
            self.lights.push(source);
        }
        self.active = self.lights.len().checked_sub(1);
        self.ambient = config.ambient_light.intensity.max(0.0);
        self.material = config.material;
        self.z_offset = config.z_offset;
        info!("restored scene with {} light(s)", self.lights.len());
        true
    }

    /// Restore a saved config, or fall back to a single default point light
    /// when none exists. Used when rendering without opening the editor.
    pub fn restore_or_default(&mut self, config: Option<&SceneConfig>) {
        if self.restore(config) {
            return;
        }
        self.clear();
        let defaults = EditorDefaults {
            intensity: 1.0,
            ambient: DEFAULT_SCENE_AMBIENT,
            point_radius: DEFAULT_LIGHT_DISTANCE,
            ..EditorDefaults::default()
        };
        self.create_light(LightType::Point, &defaults);
        info!("no saved scene; using the default point light");
    }
}

fn light_to_config(light: &LightSource) -> LightConfig {
    let d = light.descriptor();
    let (spot_params, point_params, target_position) = match d.kind {
        LightKind::Spot { angle, penumbra, distance, target } => {
            (Some(SpotParams { angle, penumbra, distance }), None, target)
        }
        LightKind::Point { radius } => (None, Some(PointParams { radius }), None),
        LightKind::Directional { .. } => (None, None, None),
    };
    LightConfig {
        screen_x: light.anchor.map(|a| a.u),
        screen_y: light.anchor.map(|a| a.v),
        position: d.position,
        target_position,
        intensity: d.intensity,
        color: d.color,
        visible: light.visible,
        light_type: light.light_type(),
        spot_params,
        point_params,
        shading: d.bands,
    }
}

fn config_to_descriptor(light: &LightConfig) -> LightDescriptor {
    let defaults = EditorDefaults::default();
    let descriptor = match light.light_type {
        LightType::Point => LightDescriptor::point(
            light.position,
            light.point_params.map_or(defaults.point_radius, |p| p.radius),
        ),
        LightType::Spot => {
            let params = light.spot_params.unwrap_or(SpotParams {
                angle: defaults.spot_angle,
                penumbra: defaults.spot_penumbra,
                distance: DEFAULT_LIGHT_DISTANCE,
            });
            let mut d = LightDescriptor::spot(light.position, light.target_position, params.angle, params.penumbra);
            if let LightKind::Spot { distance, .. } = &mut d.kind {
                *distance = params.distance;
            }
            d
        }
    };
    descriptor
        .with_intensity(light.intensity.max(0.0))
        .with_color(light.color)
        .with_bands(light.shading)
}
