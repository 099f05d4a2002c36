//! Offset generation and rendering.

pub mod offsets;
pub mod render;

pub use offsets::{generate, generate_for, GridSize, Offset, OffsetError};
pub use render::{render, OutputFormat, RenderError};
