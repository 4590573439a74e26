/// Persistent scene configuration and editor defaults.
///
/// `SceneConfig` is plain JSON data so a host can store it under whatever
/// key identifies the target image and hand it back verbatim. Keys are
/// camelCase and every optional field has a default, so configs written by
/// older editors still load.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::engine::types::{Color, Vec3};
use crate::error::Result;
use crate::lighting::descriptor::{MaterialParams, ShadingBands, DEFAULT_LIGHT_DISTANCE};
use super::light::{LightType, ScreenAnchor};

/// Parameter values a new light starts from (the editor's current slider
/// positions).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorDefaults {
    pub intensity: f32,
    pub ambient: f32,
    pub normal_strength: f32,
    pub point_radius: f32,
    /// Half-cone in radians.
    pub spot_angle: f32,
    pub spot_penumbra: f32,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            ambient: 0.2,
            normal_strength: 0.0,
            point_radius: DEFAULT_LIGHT_DISTANCE,
            spot_angle: 0.5 * PI,
            spot_penumbra: 0.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpotParams {
    pub angle: f32,
    pub penumbra: f32,
    #[serde(default = "default_distance")]
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointParams {
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbientConfig {
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self { intensity: EditorDefaults::default().ambient }
    }
}

/// One light as stored in a scene config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightConfig {
    /// Marker anchor as viewport fractions in [0, 1]. Older configs stored
    /// pixel offsets here; those do not map to a viewport fraction and are
    /// dropped on load.
    #[serde(default)]
    pub screen_x: Option<f32>,
    #[serde(default)]
    pub screen_y: Option<f32>,
    pub position: Vec3,
    #[serde(default)]
    pub target_position: Option<Vec3>,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub light_type: LightType,
    #[serde(default)]
    pub spot_params: Option<SpotParams>,
    #[serde(default)]
    pub point_params: Option<PointParams>,
    #[serde(default)]
    pub shading: ShadingBands,
}

impl LightConfig {
    /// Marker anchor, if one was stored as viewport fractions.
    pub fn anchor(&self) -> Option<ScreenAnchor> {
        let fraction = |x: f32| (0.0..=1.0).contains(&x);
        match (self.screen_x, self.screen_y) {
            (Some(u), Some(v)) if fraction(u) && fraction(v) => Some(ScreenAnchor { u, v }),
            _ => None,
        }
    }
}

/// Serializable snapshot of a light session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    #[serde(default)]
    pub lights: Vec<LightConfig>,
    #[serde(default)]
    pub ambient_light: AmbientConfig,
    #[serde(default)]
    pub material: MaterialParams,
    #[serde(default)]
    pub z_offset: f32,
}

impl SceneConfig {
    /// True for a config that carries nothing to restore, such as `{}`.
    pub fn is_empty(&self) -> bool {
        *self == SceneConfig::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn default_distance() -> f32 {
    DEFAULT_LIGHT_DISTANCE
}

fn default_intensity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_light_config_uses_defaults() {
        let config = SceneConfig::from_json(
            r#"{"lights":[{"position":{"x":0.1,"y":0.2,"z":1.5}}]}"#,
        )
        .unwrap();
        let light = &config.lights[0];
        assert_eq!(light.light_type, LightType::Point);
        assert_eq!(light.intensity, 1.0);
        assert!(light.visible);
        assert_eq!(light.color, Color::WHITE);
        assert_eq!(light.shading, ShadingBands::default());
        assert_eq!(light.anchor(), None);
        assert_eq!(config.ambient_light.intensity, 0.2);
        assert_eq!(config.material, MaterialParams::default());
    }

    #[test]
    fn test_reads_editor_style_config() {
        let json = r##"{
            "lights": [{
                "screenX": 0.25, "screenY": 0.75,
                "position": {"x": -0.5, "y": -0.5, "z": 1.2},
                "targetPosition": null,
                "intensity": 2.0,
                "color": "#ff0000",
                "visible": false,
                "lightType": "spot",
                "spotParams": {"angle": 1.0, "penumbra": 0.3},
                "pointParams": null
            }],
            "ambientLight": {"intensity": 0.4},
            "material": {"normalScale": 1.5, "shininess": 0, "specularStrength": 0},
            "zOffset": 0.25
        }"##;
        let config = SceneConfig::from_json(json).unwrap();
        let light = &config.lights[0];
        assert_eq!(light.light_type, LightType::Spot);
        assert_eq!(light.color, Color::new(1.0, 0.0, 0.0));
        assert!(!light.visible);
        assert_eq!(light.spot_params.unwrap().distance, DEFAULT_LIGHT_DISTANCE);
        assert_eq!(light.anchor(), Some(ScreenAnchor { u: 0.25, v: 0.75 }));
        assert_eq!(config.material.normal_strength, 1.5);
        assert_eq!(config.z_offset, 0.25);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SceneConfig {
            lights: vec![LightConfig {
                screen_x: Some(0.5),
                screen_y: Some(0.5),
                position: Vec3::new(0.0, 0.0, 1.0),
                target_position: Some(Vec3::new(0.0, -1.0, 0.0)),
                intensity: 1.5,
                color: Color::from_bytes(10, 20, 30),
                visible: true,
                light_type: LightType::Spot,
                spot_params: Some(SpotParams { angle: 0.8, penumbra: 0.2, distance: 10.0 }),
                point_params: None,
                shading: ShadingBands { shadow_strength: 0.5, ..ShadingBands::default() },
            }],
            ambient_light: AmbientConfig { intensity: 0.3 },
            material: MaterialParams { normal_strength: 1.0, specular_strength: 0.0, shininess: 0.0 },
            z_offset: -0.5,
        };
        let back = SceneConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_pixel_anchor_is_dropped() {
        let config = SceneConfig::from_json(
            r#"{"lights":[{"screenX":240,"screenY":120,"position":{"x":0,"y":0,"z":1}}]}"#,
        )
        .unwrap();
        assert_eq!(config.lights[0].anchor(), None);
        let config = SceneConfig::from_json(
            r#"{"lights":[{"screenX":1,"screenY":0,"position":{"x":0,"y":0,"z":1}}]}"#,
        )
        .unwrap();
        assert_eq!(config.lights[0].anchor(), Some(ScreenAnchor { u: 1.0, v: 0.0 }));
    }

    #[test]
    fn test_empty_object_is_empty_config() {
        assert!(SceneConfig::from_json("{}").unwrap().is_empty());
        assert!(!SceneConfig::from_json(r#"{"zOffset":0.5}"#).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(SceneConfig::from_json("{lights: nope").is_err());
    }
}
