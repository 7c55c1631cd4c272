//! Mock clipboard sink for testing.
//!
//! This module provides a recording implementation of [`ClipboardSink`]
//! that can be used in tests without a display server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use charpick_core::{ClipboardError, ClipboardSink};
use secrecy::{ExposeSecret, SecretString};

/// A mock clipboard sink for testing.
///
/// Records every submission, can simulate failures and tracks how many
/// times it was called.
///
/// # Example
///
/// ```
/// use charpick::sink::MockClipboardSink;
/// use charpick_core::ClipboardSink;
/// use secrecy::SecretString;
///
/// let sink = MockClipboardSink::new();
/// sink.submit(&SecretString::from("ru"), true).unwrap();
/// assert_eq!(sink.last_text().as_deref(), Some("ru"));
///
/// // Or one that behaves as if no display were available
/// let broken = MockClipboardSink::unavailable("no display");
/// assert!(broken.submit(&SecretString::from("ru"), true).is_err());
/// ```
#[derive(Clone, Default)]
pub struct MockClipboardSink {
    /// Submitted texts and their sensitivity flags.
    submissions: Arc<Mutex<Vec<(SecretString, bool)>>>,
    /// Reason reported as `ClipboardError::Unavailable`.
    unavailable: Option<String>,
    /// Number of times submit was called.
    call_count: Arc<AtomicUsize>,
}

impl MockClipboardSink {
    /// Create a mock that accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails every submission.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Get the number of times submit was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Text of the most recent successful submission.
    pub fn last_text(&self) -> Option<String> {
        self.submissions
            .lock()
            .ok()?
            .last()
            .map(|(text, _)| text.expose_secret().to_string())
    }

    /// Sensitivity flag of the most recent successful submission.
    pub fn last_sensitive(&self) -> Option<bool> {
        self.submissions.lock().ok()?.last().map(|(_, s)| *s)
    }

    /// Number of successful submissions.
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl ClipboardSink for MockClipboardSink {
    fn submit(&self, text: &SecretString, sensitive: bool) -> Result<(), ClipboardError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.unavailable {
            return Err(ClipboardError::Unavailable(reason.clone()));
        }

        self.submissions
            .lock()
            .map_err(|_| ClipboardError::WriteFailed("mock poisoned".to_string()))?
            .push((SecretString::from(text.expose_secret()), sensitive));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_records_submissions() {
        let mock = MockClipboardSink::new();
        mock.submit(&SecretString::from("ab"), true).unwrap();
        mock.submit(&SecretString::from("c"), false).unwrap();

        assert_eq!(mock.submission_count(), 2);
        assert_eq!(mock.last_text().as_deref(), Some("c"));
        assert_eq!(mock.last_sensitive(), Some(false));
    }

    #[test]
    fn mock_unavailable_fails() {
        let mock = MockClipboardSink::unavailable("no display");
        let err = mock.submit(&SecretString::from("ab"), true).unwrap_err();
        assert!(matches!(err, ClipboardError::Unavailable(ref r) if r == "no display"));
        assert_eq!(mock.submission_count(), 0);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn mock_tracks_call_count_across_clones() {
        let mock = MockClipboardSink::new();
        let clone = mock.clone();

        assert_eq!(mock.call_count(), 0);
        clone.submit(&SecretString::from("x"), true).unwrap();
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.last_text().as_deref(), Some("x"));
    }

    #[test]
    fn empty_mock_has_no_last_text() {
        let mock = MockClipboardSink::new();
        assert!(mock.last_text().is_none());
        assert!(mock.last_sensitive().is_none());
    }
}
