//! Core value types.
//!
//! Plain-data primitives shared by every physics module.

pub mod vec2;
pub mod rect;

// Re-export core types
pub use vec2::Vector2;
pub use rect::Rect;
