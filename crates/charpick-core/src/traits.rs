//! Trait definitions for the collaborators of a reveal session.
//!
//! These traits define the interfaces for:
//! - Clipboard export (the sink owns timing of the auto-clear)
//! - Host field enumeration
//!
//! Keeping them as traits lets the core be tested without a display server
//! and lets different hosts plug in their own clipboard and field storage.

use secrecy::SecretString;

use crate::types::HostField;

/// Error type for clipboard sink operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard could be opened (no display, permission denied, ...).
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The clipboard was opened but refused the text.
    #[error("failed to set clipboard text: {0}")]
    WriteFailed(String),
}

/// Destination for exported characters.
///
/// Implementations decide how long the text stays on the clipboard. The
/// exporter hands over the text and forgets it; scheduling the clear is the
/// sink's job.
///
/// # Example (Mock Implementation)
///
/// ```ignore
/// struct NullSink;
///
/// impl ClipboardSink for NullSink {
///     fn submit(&self, _text: &SecretString, _sensitive: bool) -> Result<(), ClipboardError> {
///         Ok(())
///     }
/// }
/// ```
pub trait ClipboardSink {
    /// Place `text` on the clipboard.
    ///
    /// `sensitive` is set when the text comes from a protected field; sinks
    /// may use it to pick a clearing policy or hide the entry from
    /// clipboard history.
    fn submit(&self, text: &SecretString, sensitive: bool) -> Result<(), ClipboardError>;
}

impl<S: ClipboardSink + ?Sized> ClipboardSink for &S {
    fn submit(&self, text: &SecretString, sensitive: bool) -> Result<(), ClipboardError> {
        (**self).submit(text, sensitive)
    }
}

/// Supplier of the named fields of the currently selected record.
///
/// Fields are returned in source order. Ordering for display and filtering
/// of irrelevant keys happen in [`FieldSet::collect`](crate::FieldSet::collect).
pub trait FieldSource {
    /// Return every field of the record, in source order.
    fn fields(&self) -> Vec<HostField>;
}

impl FieldSource for Vec<HostField> {
    fn fields(&self) -> Vec<HostField> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::cell::RefCell;

    struct Recording(RefCell<Vec<(String, bool)>>);

    impl ClipboardSink for Recording {
        fn submit(&self, text: &SecretString, sensitive: bool) -> Result<(), ClipboardError> {
            self.0
                .borrow_mut()
                .push((text.expose_secret().to_string(), sensitive));
            Ok(())
        }
    }

    #[test]
    fn clipboard_error_display() {
        assert_eq!(
            ClipboardError::WriteFailed("busy".into()).to_string(),
            "failed to set clipboard text: busy"
        );
    }

    #[test]
    fn sink_reference_forwards() {
        let sink = Recording(RefCell::new(Vec::new()));
        let by_ref = &sink;
        by_ref
            .submit(&SecretString::from("ab"), true)
            .expect("submit should succeed");
        assert_eq!(sink.0.borrow().as_slice(), &[("ab".to_string(), true)]);
    }

    #[test]
    fn vec_is_a_field_source() {
        let source = vec![HostField::new("Password", "hunter2", true)];
        let fields = source.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "Password");
    }
}
