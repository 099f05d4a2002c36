//! Utility tooling for the GPU clustering experiment.
//!
//! This crate provides tools for:
//! - Generating jittered sampling offsets by recursive quadrant subdivision
//! - Rendering offsets as C#, CSV or JSON for embedding in other codebases
//! - Normalizing `key:value|key:value.csv` log file names
//! - Truncating variance logs at a repeated header line
//! - Plotting the traversal order of an offset pattern
//!
//! # Example
//!
//! ```
//! use clustering_tools::core::{generate, render, OutputFormat};
//!
//! let offsets = generate(4).unwrap();
//! let literal = render(&offsets, OutputFormat::Csharp, "offsets").unwrap();
//! assert!(literal.starts_with("int[][] offsets = new int[][] {"));
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{LogConfig, OffsetConfig, PlotConfig, ToolsConfig};
pub use core::offsets::{GridSize, Offset};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
