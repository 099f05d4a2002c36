//! Text renderings of an offset sequence.
//!
//! This module provides serializers for embedding offsets in other codebases:
//! - C# jagged array literal (the format the Unity shaders' dispatchers consume)
//! - CSV with `x,y` columns
//! - JSON array of `[x, y]` pairs

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::offsets::Offset;

/// Default variable name for the C# literal.
pub const DEFAULT_VARIABLE_NAME: &str = "offsets";

/// Errors that can occur while rendering offsets.
#[derive(Error, Debug)]
pub enum RenderError {
    /// CSV serialization error.
    #[error("CSV render error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON render error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to flush the in-memory writer.
    #[error("failed to flush rendered output: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered bytes were not valid UTF-8.
    #[error("rendered output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Variable name is not a valid C# identifier.
    #[error("invalid variable name '{0}': expected a C# identifier")]
    InvalidName(String),
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Output format for an offset sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `int[][] offsets = new int[][] { ... };`
    #[default]
    Csharp,
    /// `x,y` header followed by one row per offset
    Csv,
    /// `[[x,y],...]`
    Json,
}

/// Render offsets in the requested format.
///
/// `name` is only used by [`OutputFormat::Csharp`].
pub fn render(offsets: &[Offset], format: OutputFormat, name: &str) -> Result<String> {
    match format {
        OutputFormat::Csharp => render_csharp(offsets, name),
        OutputFormat::Csv => render_csv(offsets),
        OutputFormat::Json => render_json(offsets),
    }
}

/// Render offsets as a single-line C# jagged array declaration.
///
/// Every element is followed by `", "`, trailing one included, and the
/// statement is closed with `};`.
pub fn render_csharp(offsets: &[Offset], name: &str) -> Result<String> {
    if !is_identifier(name) {
        return Err(RenderError::InvalidName(name.to_string()));
    }

    // "new int[] { 12, 34 }, " is 22 bytes for two-digit coordinates
    let mut out = String::with_capacity(32 + offsets.len() * 24);
    out.push_str("int[][] ");
    out.push_str(name);
    out.push_str(" = new int[][] { ");
    for offset in offsets {
        out.push_str(&format!("new int[] {{ {}, {} }}, ", offset.x, offset.y));
    }
    out.push_str("};");
    Ok(out)
}

/// Render offsets as CSV with an `x,y` header. No trailing newline.
pub fn render_csv(offsets: &[Offset]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(offsets.len() * 6 + 4));
    for offset in offsets {
        writer.serialize(offset)?;
    }
    if offsets.is_empty() {
        writer.write_record(["x", "y"])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(bytes)?;
    text.truncate(text.trim_end().len());
    Ok(text)
}

/// Render offsets as a compact JSON array of pairs.
pub fn render_json(offsets: &[Offset]) -> Result<String> {
    let pairs: Vec<[u32; 2]> = offsets.iter().map(|&o| o.into()).collect();
    Ok(serde_json::to_string(&pairs)?)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
