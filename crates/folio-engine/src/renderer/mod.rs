pub mod instance;

pub use instance::{RenderBuffer, ShapeInstance, SpriteInstance};
