/// Session-owned light sources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::types::Vec3;
use crate::lighting::descriptor::{LightDescriptor, LightKind};

/// Light types the session can create.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    Point,
    Spot,
}

impl Default for LightType {
    fn default() -> Self {
        LightType::Point
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LightType::Point => "point",
            LightType::Spot => "spot",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown light type `{0}`")]
pub struct UnknownLightType(pub String);

impl FromStr for LightType {
    type Err = UnknownLightType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(LightType::Point),
            "spot" => Ok(LightType::Spot),
            other => Err(UnknownLightType(other.to_string())),
        }
    }
}

/// Where a light's on-screen marker sits, as viewport fractions
/// (0,0 = top-left). Presentation only; never read by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenAnchor {
    pub u: f32,
    pub v: f32,
}

/// One light in a session.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    id: u64,
    name: String,
    pub(crate) descriptor: LightDescriptor,
    pub(crate) visible: bool,
    pub(crate) editing_target: bool,
    pub(crate) anchor: Option<ScreenAnchor>,
}

impl LightSource {
    /// `descriptor` must be a point or spot light.
    pub(crate) fn new(id: u64, name: String, descriptor: LightDescriptor) -> Self {
        debug_assert!(descriptor.kind.is_positional());
        Self {
            id,
            name,
            descriptor,
            visible: true,
            editing_target: false,
            anchor: None,
        }
    }

    /// Stable identifier, unique within the session.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &LightDescriptor {
        &self.descriptor
    }

    pub fn position(&self) -> Vec3 {
        self.descriptor.position
    }

    pub fn light_type(&self) -> LightType {
        match self.descriptor.kind {
            LightKind::Spot { .. } => LightType::Spot,
            LightKind::Point { .. } | LightKind::Directional { .. } => LightType::Point,
        }
    }

    /// Explicit aim point of a spot light.
    pub fn target_position(&self) -> Option<Vec3> {
        match self.descriptor.kind {
            LightKind::Spot { target, .. } => target,
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True while the secondary interaction is repositioning a spot's aim.
    pub fn is_editing_target(&self) -> bool {
        self.editing_target
    }

    pub fn anchor(&self) -> Option<ScreenAnchor> {
        self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_type_parse() {
        assert_eq!("spot".parse::<LightType>(), Ok(LightType::Spot));
        assert_eq!(" Point ".parse::<LightType>(), Ok(LightType::Point));
        assert!("area".parse::<LightType>().is_err());
        assert_eq!(LightType::Spot.to_string(), "spot");
    }

    #[test]
    fn test_light_type_serde() {
        assert_eq!(serde_json::to_string(&LightType::Spot).unwrap(), "\"spot\"");
        let t: LightType = serde_json::from_str("\"point\"").unwrap();
        assert_eq!(t, LightType::Point);
    }

    #[test]
    fn test_new_source_is_idle_and_visible() {
        let s = LightSource::new(7, "Light 1".into(), LightDescriptor::point(Vec3::OUT_OF_PLANE, 10.0));
        assert_eq!(s.id(), 7);
        assert!(s.is_visible());
        assert!(!s.is_editing_target());
        assert_eq!(s.light_type(), LightType::Point);
        assert_eq!(s.target_position(), None);
    }
}
