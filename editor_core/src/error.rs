//! Error types for edits and configuration loading.

use std::io;
use std::ops::Range;
use thiserror::Error;

/// Errors raised when an edit cannot be applied to a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The range reaches past the end of the buffer or is reversed.
    #[error("range {}..{} is out of bounds for buffer of length {len}", .range.start, .range.end)]
    RangeOutOfBounds { range: Range<usize>, len: usize },
}

/// Errors raised while loading a [`FormatterConfig`](crate::config::FormatterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read formatter config: {0}")]
    Io(#[from] io::Error),
    #[error("invalid formatter config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Validates that `range` lies within a buffer of `len` characters.
pub(crate) fn check_range(range: &Range<usize>, len: usize) -> Result<(), EditError> {
    if range.start > range.end || range.end > len {
        return Err(EditError::RangeOutOfBounds {
            range: range.clone(),
            len,
        });
    }
    Ok(())
}
