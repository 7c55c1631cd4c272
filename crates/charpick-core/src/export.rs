//! Copying revealed characters to a clipboard sink.

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::controller::RevealController;
use crate::error::RevealError;
use crate::traits::ClipboardSink;

/// Assembles the revealed characters of a session and hands them to a sink.
///
/// The exporter holds no text between calls and never schedules clearing;
/// both are up to the sink.
///
/// # Example
///
/// ```ignore
/// let exporter = ClipboardExporter::new(sink);
/// let copied = exporter.export(&session)?;
/// ```
#[derive(Debug)]
pub struct ClipboardExporter<S> {
    sink: S,
}

impl<S: ClipboardSink> ClipboardExporter<S> {
    /// Create an exporter writing to `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// The sink exports go to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Concatenate the revealed characters of the selected rows in row
    /// order.
    ///
    /// The buffer is sized for the result before the first character is
    /// written, so no partial copy is left behind by a reallocation.
    ///
    /// # Errors
    ///
    /// `NoFieldSelected` without an active field, `EmptySelection` when no
    /// row holds a character.
    pub fn assemble(&self, session: &RevealController<'_>) -> Result<SecretString, RevealError> {
        if session.active_field().is_none() {
            return Err(RevealError::NoFieldSelected);
        }
        if !session.selection().has_selection() {
            return Err(RevealError::EmptySelection);
        }

        let capacity = session.revealed_chars().map(char::len_utf8).sum();
        let mut text = String::with_capacity(capacity);
        text.extend(session.revealed_chars());
        Ok(SecretString::from(text))
    }

    /// Submit the assembled characters to the sink.
    ///
    /// The text is flagged sensitive when the active field is protected.
    /// Returns the number of characters exported.
    ///
    /// # Errors
    ///
    /// Everything [`assemble`](Self::assemble) returns, plus
    /// `RevealError::Clipboard` when the sink fails.
    pub fn export(&self, session: &RevealController<'_>) -> Result<usize, RevealError> {
        let text = self.assemble(session)?;
        let count = session.revealed_chars().count();
        let sensitive = session.active_field().is_some_and(|f| f.is_masked());

        if let Err(e) = self.sink.submit(&text, sensitive) {
            warn!(error = %e, "Clipboard export failed");
            return Err(e.into());
        }

        debug!(count, sensitive, "Exported characters");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SecretField;
    use crate::traits::ClipboardError;
    use secrecy::ExposeSecret;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        submitted: RefCell<Vec<(String, bool)>>,
        fail: bool,
    }

    impl ClipboardSink for Recorder {
        fn submit(&self, text: &SecretString, sensitive: bool) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::WriteFailed("read-only".into()));
            }
            self.submitted
                .borrow_mut()
                .push((text.expose_secret().to_string(), sensitive));
            Ok(())
        }
    }

    fn password() -> SecretField {
        SecretField::sealed("Password", SecretString::from("Tr0ub4dor&3"), true)
    }

    #[test]
    fn exports_selected_characters_in_row_order() {
        let field = password();
        let mut session = RevealController::new(4);
        session.select_field(&field);
        session.set_row_index(0, 2).unwrap();
        session.set_row_index(1, 4).unwrap();

        let exporter = ClipboardExporter::new(Recorder::default());
        assert_eq!(exporter.export(&session).unwrap(), 2);
        assert_eq!(
            exporter.sink().submitted.borrow().as_slice(),
            &[("ru".to_string(), true)]
        );
    }

    #[test]
    fn export_works_while_unmasked() {
        let field = password();
        let mut session = RevealController::new(4);
        session.select_field(&field);
        session.set_row_index(0, 1).unwrap();
        session.toggle_mask().unwrap();

        let exporter = ClipboardExporter::new(Recorder::default());
        assert_eq!(exporter.export(&session).unwrap(), 1);
        // Sensitivity follows the field, not the toggle
        assert!(exporter.sink().submitted.borrow()[0].1);
    }

    #[test]
    fn skips_cleared_rows() {
        let field = SecretField::unsealed("memorable word", SecretString::from("otter"), false);
        let mut session = RevealController::new(4);
        session.select_field(&field);
        session.set_row_index(0, 1).unwrap();
        session.set_row_index(2, 5).unwrap();

        let exporter = ClipboardExporter::new(Recorder::default());
        let text = exporter.assemble(&session).unwrap();
        assert_eq!(text.expose_secret(), "or");

        exporter.export(&session).unwrap();
        assert!(!exporter.sink().submitted.borrow()[0].1);
    }

    #[test]
    fn multibyte_characters_assemble() {
        let field = SecretField::sealed("Password", SecretString::from("pässwörd€"), true);
        let mut session = RevealController::new(4);
        session.select_field(&field);
        session.set_row_index(0, 2).unwrap();
        session.set_row_index(1, 9).unwrap();

        let exporter = ClipboardExporter::new(Recorder::default());
        assert_eq!(exporter.assemble(&session).unwrap().expose_secret(), "ä€");
        assert_eq!(exporter.export(&session).unwrap(), 2);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let field = password();
        let mut session = RevealController::new(4);
        let exporter = ClipboardExporter::new(Recorder::default());

        assert!(matches!(
            exporter.export(&session),
            Err(RevealError::NoFieldSelected)
        ));

        session.select_field(&field);
        assert!(matches!(
            exporter.export(&session),
            Err(RevealError::EmptySelection)
        ));
        assert!(exporter.sink().submitted.borrow().is_empty());
    }

    #[test]
    fn sink_failure_is_reported() {
        let field = password();
        let mut session = RevealController::new(4);
        session.select_field(&field);
        session.set_row_index(0, 3).unwrap();

        let exporter = ClipboardExporter::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let err = exporter.export(&session).unwrap_err();
        assert!(matches!(
            err,
            RevealError::Clipboard(ClipboardError::WriteFailed(_))
        ));
    }
}
