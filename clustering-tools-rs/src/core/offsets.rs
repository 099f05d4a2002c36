//! Jittered sample offsets built by recursive quadrant subdivision.
//!
//! An `n×n` pattern is made of four interleaved copies of the `(n/2)×(n/2)`
//! pattern, one per quadrant. Every emitted position of the smaller pattern is
//! immediately followed by its three siblings in the other quadrants, so any
//! prefix of the sequence is spread across the whole grid instead of filling
//! it row by row.
//!
//! The pattern is fully deterministic: "jitter" refers to the traversal order,
//! not to randomness.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a grid size does not satisfy the generator's preconditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetError {
    #[error("grid size must be greater than 1, got {0}")]
    TooSmall(u32),

    #[error("grid size must be a power of two, got {0}")]
    NotPowerOfTwo(u32),

    #[error("grid size {0} is too large: {0}x{0} offsets cannot be addressed")]
    TooLarge(u32),
}

/// Result type for offset generation.
pub type Result<T> = std::result::Result<T, OffsetError>;

/// Traversal of a single 2×2 cell: bottom-left, bottom-right, top-right, top-left.
const BASE_PATTERN: [Offset; 4] = [
    Offset::new(0, 0),
    Offset::new(1, 0),
    Offset::new(1, 1),
    Offset::new(0, 1),
];

/// Side length of a square sample grid.
///
/// Always a power of two strictly greater than 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridSize(u32);

impl GridSize {
    /// Validate a raw grid size.
    ///
    /// # Errors
    ///
    /// Returns an error if `n <= 1`, if `n` is not a power of two, or if
    /// `n * n` does not fit in `usize`.
    pub fn new(n: u32) -> Result<Self> {
        if n <= 1 {
            return Err(OffsetError::TooSmall(n));
        }
        if n & (n - 1) != 0 {
            return Err(OffsetError::NotPowerOfTwo(n));
        }
        (n as usize)
            .checked_mul(n as usize)
            .ok_or(OffsetError::TooLarge(n))?;
        Ok(Self(n))
    }

    /// Raw side length.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of cells in the grid (`n * n`).
    #[inline]
    pub fn cell_count(self) -> usize {
        self.0 as usize * self.0 as usize
    }

    /// Size of one quadrant, or `None` for the 2×2 base grid.
    pub fn half(self) -> Option<GridSize> {
        if self.0 == 2 {
            None
        } else {
            Some(GridSize(self.0 / 2))
        }
    }

    /// Recursion depth of the subdivision (`log2(n)`).
    pub fn depth(self) -> u32 {
        self.0.trailing_zeros()
    }
}

impl TryFrom<u32> for GridSize {
    type Error = OffsetError;

    fn try_from(n: u32) -> Result<Self> {
        Self::new(n)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.0)
    }
}

/// One sample position inside an `n×n` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

impl Offset {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<Offset> for [u32; 2] {
    fn from(offset: Offset) -> Self {
        [offset.x, offset.y]
    }
}

/// Generate the jittered offset sequence for an `n×n` grid.
///
/// The size is validated before any work is done, so an invalid size never
/// produces partial output.
///
/// # Errors
///
/// Returns an [`OffsetError`] if `n` is not a power of two greater than 1.
///
/// # Example
///
/// ```
/// use clustering_tools::core::offsets::{generate, Offset};
///
/// let offsets = generate(2).unwrap();
/// assert_eq!(offsets[1], Offset::new(1, 0));
/// ```
pub fn generate(n: u32) -> Result<Vec<Offset>> {
    let size = GridSize::new(n)?;
    Ok(generate_for(size))
}

/// Generate the offset sequence for an already validated grid size.
pub fn generate_for(size: GridSize) -> Vec<Offset> {
    let Some(half) = size.half() else {
        return BASE_PATTERN.to_vec();
    };

    let step = half.get();
    let inner = generate_for(half);
    let mut offsets = Vec::with_capacity(size.cell_count());

    for pos in &inner {
        for offset_y in 0..2 {
            for offset_x in 0..2 {
                offsets.push(Offset::new(pos.x + offset_x * step, pos.y + offset_y * step));
            }
        }
    }

    offsets
}
