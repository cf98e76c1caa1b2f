//! Errors returned by collection and canvas operations.
//!
//! Every variant is recoverable: the operation that returns it has not
//! mutated anything. Decode failures are per file and live in
//! [`crate::decode::DecodeError`].

use thiserror::Error;

/// Why an editing operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Insert or replace was requested without a selected page to anchor on.
    #[error("No insertion point: select a page first")]
    NoInsertionPoint,

    /// The operation needs at least one selected page.
    #[error("No pages selected")]
    EmptySelection,

    /// A rubber band or selection region has zero area.
    #[error("Region has zero width or height")]
    EmptyGeometry,

    /// The canvas has no page to edit.
    #[error("No active page")]
    NoActivePage,

    /// Rotation must be one, two or three quarter turns.
    #[error("Invalid rotation: {0} quarter turns")]
    InvalidQuarterTurns(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(EditError::NoActivePage.to_string(), "No active page");
        assert_eq!(
            EditError::InvalidQuarterTurns(5).to_string(),
            "Invalid rotation: 5 quarter turns"
        );
    }
}
