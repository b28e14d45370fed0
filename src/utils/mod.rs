//! Utility modules shared across the engine

pub mod math;
pub mod text;

pub use math::*;
pub use text::remove_formatting_code;
