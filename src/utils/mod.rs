//! Utility modules shared across the engine.

pub mod html;
pub mod path;
