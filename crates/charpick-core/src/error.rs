//! Error type for reveal sessions.
//!
//! Every failure is local and recoverable: the presentation layer decides
//! whether to re-prompt, the core never retries.

use thiserror::Error;

use crate::traits::ClipboardError;

/// Errors surfaced by [`SecretField`](crate::SecretField),
/// [`RevealController`](crate::RevealController) and
/// [`ClipboardExporter`](crate::ClipboardExporter).
#[derive(Debug, Error)]
pub enum RevealError {
    /// A character position outside `1..=length` was requested.
    #[error("character position {position} is outside 1..={length}")]
    OutOfRange { position: usize, length: usize },

    /// The chosen index is not in the row's current candidate list.
    #[error("index {index} is not a candidate for row {row}")]
    InvalidSelection { row: usize, index: usize },

    /// The row does not exist in this selection set.
    #[error("row {row} does not exist (rows: {rows})")]
    UnknownRow { row: usize, rows: usize },

    /// The mask toggle was used while reveal is not enabled.
    #[error("revealing is not permitted: no character selected or field is not protected")]
    NotPermitted,

    /// Export was attempted with no character selected.
    #[error("no characters selected")]
    EmptySelection,

    /// An operation needing a field ran before any field was selected.
    #[error("no field selected")]
    NoFieldSelected,

    /// A sealed field value failed authentication when opened.
    #[error("protected value of field '{0}' could not be opened")]
    Corrupted(String),

    /// The clipboard sink rejected the export.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            RevealError::OutOfRange {
                position: 12,
                length: 11
            }
            .to_string(),
            "character position 12 is outside 1..=11"
        );
        assert_eq!(
            RevealError::InvalidSelection { row: 0, index: 5 }.to_string(),
            "index 5 is not a candidate for row 0"
        );
        assert_eq!(RevealError::EmptySelection.to_string(), "no characters selected");
    }

    #[test]
    fn clipboard_error_converts() {
        let err: RevealError = ClipboardError::Unavailable("no display".into()).into();
        assert!(matches!(err, RevealError::Clipboard(_)));
        assert_eq!(err.to_string(), "clipboard unavailable: no display");
    }
}
