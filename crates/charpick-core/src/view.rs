//! Snapshot of a reveal session for presentation layers.
//!
//! After every mutation a host asks the controller for a [`SessionView`]
//! and renders it. Revealed characters are only reachable through
//! [`RowView::cell`], which honours the mask toggle; `Debug` output never
//! contains them and `Serialize` output only contains them when unmasked.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use zeroize::Zeroize;

use crate::types::CharClass;

/// What a row's character slot should show.
#[derive(Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Cell {
    /// No character selected.
    Blank,
    /// A character is selected but the session is masked.
    Masked,
    /// The character in clear.
    Clear {
        ch: char,
        class: CharClass,
        /// Set for characters that are easily confused (uppercase letters).
        emphasize: bool,
    },
}

impl Cell {
    fn new(revealed: Option<char>, masked: bool) -> Self {
        match revealed {
            None => Cell::Blank,
            Some(_) if masked => Cell::Masked,
            Some(ch) => {
                let class = CharClass::of(ch);
                Cell::Clear {
                    ch,
                    class,
                    emphasize: class.is_lookalike_risk(),
                }
            }
        }
    }

    /// Category description for a tooltip; `None` unless in clear.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Cell::Clear { class, .. } => Some(class.description()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Blank => f.write_str("Blank"),
            Cell::Masked => f.write_str("Masked"),
            Cell::Clear {
                class, emphasize, ..
            } => f
                .debug_struct("Clear")
                .field("ch", &"[REDACTED]")
                .field("class", class)
                .field("emphasize", emphasize)
                .finish(),
        }
    }
}

/// State of one selector row.
pub struct RowView {
    /// Row number.
    pub row: usize,
    /// Selectable indices, starting with 0 for "none".
    pub candidates: Vec<usize>,
    /// Chosen index, 0 for none.
    pub chosen: usize,
    /// Whether anything beyond "none" can be chosen.
    pub enabled: bool,
    revealed: Option<char>,
    masked: bool,
}

impl RowView {
    pub(crate) fn new(
        row: usize,
        candidates: Vec<usize>,
        chosen: usize,
        enabled: bool,
        revealed: Option<char>,
        masked: bool,
    ) -> Self {
        Self {
            row,
            candidates,
            chosen,
            enabled,
            revealed,
            masked,
        }
    }

    /// What to display for this row.
    pub fn cell(&self) -> Cell {
        Cell::new(self.revealed, self.masked)
    }

    /// Whether a character is selected on this row.
    pub fn has_character(&self) -> bool {
        self.revealed.is_some()
    }
}

impl Drop for RowView {
    fn drop(&mut self) {
        self.revealed.zeroize();
    }
}

impl std::fmt::Debug for RowView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowView")
            .field("row", &self.row)
            .field("candidates", &self.candidates.len())
            .field("chosen", &self.chosen)
            .field("enabled", &self.enabled)
            .field("revealed", &self.revealed.map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Serialize for RowView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RowView", 5)?;
        state.serialize_field("row", &self.row)?;
        state.serialize_field("candidates", &self.candidates)?;
        state.serialize_field("chosen", &self.chosen)?;
        state.serialize_field("enabled", &self.enabled)?;
        state.serialize_field("cell", &self.cell())?;
        state.end()
    }
}

/// Everything a presentation layer needs to render a session.
#[derive(Debug, serde::Serialize)]
pub struct SessionView {
    /// Display name of the active field.
    pub field: Option<String>,
    /// Length of the active field.
    pub field_length: usize,
    /// Whether characters are shown masked.
    pub masked: bool,
    /// Whether the mask toggle is usable.
    pub reveal_enabled: bool,
    /// Rows in order.
    pub rows: Vec<RowView>,
}

impl SessionView {
    /// Number of rows showing or hiding a character.
    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.has_character()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(revealed: Option<char>, masked: bool) -> RowView {
        RowView::new(0, vec![0, 1, 2], if revealed.is_some() { 1 } else { 0 }, true, revealed, masked)
    }

    #[test]
    fn cell_follows_mask() {
        assert_eq!(row(None, true).cell(), Cell::Blank);
        assert_eq!(row(None, false).cell(), Cell::Blank);
        assert_eq!(row(Some('r'), true).cell(), Cell::Masked);
        assert_eq!(
            row(Some('r'), false).cell(),
            Cell::Clear {
                ch: 'r',
                class: CharClass::LowercaseLetter,
                emphasize: false
            }
        );
    }

    #[test]
    fn uppercase_is_emphasized_when_clear() {
        match row(Some('O'), false).cell() {
            Cell::Clear { emphasize, .. } => assert!(emphasize),
            other => panic!("unexpected cell {:?}", other),
        }
    }

    #[test]
    fn description_only_in_clear() {
        assert_eq!(row(Some('0'), true).cell().description(), None);
        assert_eq!(
            row(Some('0'), false).cell().description(),
            Some("Decimal digit")
        );
    }

    #[test]
    fn debug_redacts_characters() {
        let clear = row(Some('q'), false);
        let debug_output = format!("{:?} {:?}", clear, clear.cell());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains('q'));
    }

    #[test]
    fn serialization_hides_masked_characters() {
        let masked = serde_json::to_value(row(Some('z'), true)).unwrap();
        assert_eq!(masked["cell"]["state"], "masked");
        assert!(masked["cell"].get("ch").is_none());

        let clear = serde_json::to_value(row(Some('z'), false)).unwrap();
        assert_eq!(clear["cell"]["state"], "clear");
        assert_eq!(clear["cell"]["ch"], "z");
        assert_eq!(clear["cell"]["class"], "lowercase_letter");
    }

    #[test]
    fn session_counts_selected_rows() {
        let view = SessionView {
            field: Some("Password".into()),
            field_length: 11,
            masked: true,
            reveal_enabled: true,
            rows: vec![row(Some('a'), true), row(None, true), row(Some('b'), true)],
        };
        assert_eq!(view.selected_count(), 2);
    }
}
