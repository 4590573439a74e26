/// Image-side engine: value types, decoded surfaces and frame renderers.

pub mod renderer;
pub mod surface;
pub mod types;
