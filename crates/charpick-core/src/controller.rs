//! Session state for revealing chosen characters of one field.
//!
//! [`RevealController`] binds a [`SelectionSet`] to the active
//! [`SecretField`], keeps the characters behind the selected rows and the
//! mask toggle, and produces a [`SessionView`] for the presentation layer.
//!
//! # State machine
//!
//! ```text
//! NoField --select_field--> FieldSelected { masked, selection }
//!            set_row_index:  selection advances through the cascade
//!            toggle_mask:    masked flips while reveal is enabled
//!            select_field:   new field, rows cleared, mask reset
//! ```

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::RevealError;
use crate::secret::SecretField;
use crate::selection::{SelectionSet, NONE};
use crate::view::{RowView, SessionView};

/// Orchestrates one reveal session.
///
/// The controller borrows the field it reveals from; the field set must
/// outlive the session.
///
/// # Example
///
/// ```
/// use charpick_core::{RevealController, SecretField};
/// use secrecy::SecretString;
///
/// let field = SecretField::sealed("Password", SecretString::from("Tr0ub4dor&3"), true);
/// let mut session = RevealController::new(4);
/// session.select_field(&field);
/// session.set_row_index(0, 2).unwrap();
/// session.set_row_index(1, 4).unwrap();
///
/// assert_eq!(session.revealed(0), Some('r'));
/// assert_eq!(session.revealed(1), Some('u'));
/// assert!(session.is_masked());
/// assert!(!session.toggle_mask().unwrap());
/// ```
pub struct RevealController<'f> {
    field: Option<&'f SecretField>,
    selection: SelectionSet,
    revealed: Zeroizing<Vec<Option<char>>>,
    masked: bool,
    rows: usize,
}

impl<'f> RevealController<'f> {
    /// Create a session with `rows` selector rows and no active field.
    pub fn new(rows: usize) -> Self {
        Self {
            field: None,
            selection: SelectionSet::new(rows, 0),
            revealed: Zeroizing::new(vec![None; rows]),
            masked: true,
            rows,
        }
    }

    /// Make `field` the active field.
    ///
    /// Every row is cleared and the mask follows the field's protection.
    pub fn select_field(&mut self, field: &'f SecretField) {
        self.field = Some(field);
        self.selection = SelectionSet::new(self.rows, field.len());
        self.revealed = Zeroizing::new(vec![None; self.rows]);
        self.masked = field.is_masked();
        debug!(field = %field.name(), length = field.len(), "Field selected");
    }

    /// The active field, if any.
    pub fn active_field(&self) -> Option<&'f SecretField> {
        self.field
    }

    /// Current selector rows.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Number of selector rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Choose `index` on `row` (0 clears the row).
    ///
    /// Later rows cascade as described in [`SelectionSet::with_choice`] and
    /// every selected row's character is read again from the field.
    ///
    /// # Errors
    ///
    /// - `NoFieldSelected` if no field is active
    /// - `UnknownRow` / `InvalidSelection` from the cascade
    /// - any error from reading the field
    ///
    /// The session is unchanged when an error is returned.
    pub fn set_row_index(&mut self, row: usize, index: usize) -> Result<(), RevealError> {
        let field = self.field.ok_or(RevealError::NoFieldSelected)?;
        let next = self.selection.with_choice(row, index)?;

        let mut revealed = Zeroizing::new(Vec::with_capacity(self.rows));
        for r in next.rows() {
            let ch = if r.is_selected() {
                Some(field.character_at(r.chosen())?)
            } else {
                None
            };
            revealed.push(ch);
        }

        self.selection = next;
        self.revealed = revealed;
        debug!(
            row,
            cleared = index == NONE,
            selected = self.selection.selected().count(),
            "Selection changed"
        );
        Ok(())
    }

    /// Reset `row` to none. Same as `set_row_index(row, 0)`.
    pub fn clear_row(&mut self, row: usize) -> Result<(), RevealError> {
        self.set_row_index(row, NONE)
    }

    /// Whether the mask toggle may be used.
    ///
    /// True when the active field is protected and at least one row holds
    /// a character.
    pub fn reveal_enabled(&self) -> bool {
        self.field.is_some_and(SecretField::is_masked) && self.selection.has_selection()
    }

    /// Flip between masked and clear display, returning the new state.
    ///
    /// # Errors
    ///
    /// `NotPermitted` unless [`reveal_enabled`](Self::reveal_enabled).
    pub fn toggle_mask(&mut self) -> Result<bool, RevealError> {
        if !self.reveal_enabled() {
            return Err(RevealError::NotPermitted);
        }
        self.masked = !self.masked;
        debug!(masked = self.masked, "Mask toggled");
        Ok(self.masked)
    }

    /// Whether revealed characters are shown masked.
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// The character behind `row`, if one is selected.
    pub fn revealed(&self, row: usize) -> Option<char> {
        self.revealed.get(row).copied().flatten()
    }

    /// Revealed characters of the selected rows, in row order.
    pub fn revealed_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.revealed.iter().filter_map(|ch| *ch)
    }

    /// Snapshot of the session for rendering.
    pub fn view(&self) -> SessionView {
        let rows = self
            .selection
            .rows()
            .iter()
            .map(|r| {
                let candidates = self.selection.candidates(r.row()).unwrap_or_default();
                RowView::new(
                    r.row(),
                    candidates,
                    r.chosen(),
                    self.selection.is_enabled(r.row()),
                    self.revealed(r.row()),
                    self.masked,
                )
            })
            .collect();

        SessionView {
            field: self.field.map(|f| f.name().to_string()),
            field_length: self.selection.field_length(),
            masked: self.masked,
            reveal_enabled: self.reveal_enabled(),
            rows,
        }
    }

    /// End the session: drop the field and zero every revealed character.
    pub fn close(&mut self) {
        self.field = None;
        self.selection = SelectionSet::new(self.rows, 0);
        self.revealed = Zeroizing::new(vec![None; self.rows]);
        self.masked = true;
        debug!("Session closed");
    }
}

impl std::fmt::Debug for RevealController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealController")
            .field("field", &self.field.map(SecretField::name))
            .field("selection", &self.selection)
            .field("masked", &self.masked)
            .field("revealed", &"[REDACTED]")
            .finish()
    }
}
