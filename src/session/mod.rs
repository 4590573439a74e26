/// Interactive light session and the modal editor built on it.

pub mod config;
pub mod editor;
pub mod light;
pub mod light_session;

pub use config::{EditorDefaults, SceneConfig};
pub use editor::{EditorSession, Outcome};
pub use light::{LightSource, LightType};
pub use light_session::{LightSession, ViewportRect};
