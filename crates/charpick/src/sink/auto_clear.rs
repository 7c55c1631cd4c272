//! Clipboard sink that clears exported text after a delay.
//!
//! After each export a tokio task waits for the configured delay and then
//! clears the clipboard, but only if it still holds exactly the exported
//! text; anything the user copied in the meantime is left alone. A new
//! export replaces the pending clear. Dropping the sink runs a pending
//! clear immediately.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use charpick_core::{ClipboardError, ClipboardSink, Config};
use secrecy::{ExposeSecret, SecretString};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Raw clipboard access used by [`AutoClearSink`].
pub trait ClipboardBackend: Send + 'static {
    /// Replace the clipboard contents.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Current clipboard text (empty if there is none).
    fn get_text(&mut self) -> Result<String, ClipboardError>;

    /// Empty the clipboard.
    fn clear(&mut self) -> Result<(), ClipboardError>;
}

/// System clipboard through `arboard`, opened on first use.
///
/// On X11 the process owns the selection, so exported text is available
/// to other applications while charpick runs.
#[derive(Default)]
pub struct ArboardBackend {
    clipboard: Option<arboard::Clipboard>,
}

impl ArboardBackend {
    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            debug!("Opened system clipboard");
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("clipboard not open".to_string()))
    }
}

impl ClipboardBackend for ArboardBackend {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard()?
            .set_text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }

    fn get_text(&mut self) -> Result<String, ClipboardError> {
        match self.clipboard()?.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }

    fn clear(&mut self) -> Result<(), ClipboardError> {
        self.clipboard()?
            .clear()
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}

/// How long exports stay on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearPolicy {
    /// Delay for exports from protected fields (`None` = never cleared).
    pub sensitive: Option<Duration>,
    /// Delay for other exports.
    pub plain: Option<Duration>,
}

impl ClearPolicy {
    /// Policy from the `[clipboard]` section of the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            sensitive: config.clear_after_for(true),
            plain: config.clear_after_for(false),
        }
    }

    /// Delay that applies to an export.
    pub fn delay_for(&self, sensitive: bool) -> Option<Duration> {
        if sensitive {
            self.sensitive
        } else {
            self.plain
        }
    }
}

struct PendingClear {
    expected: Arc<SecretString>,
    task: JoinHandle<()>,
}

/// Clipboard sink with timed clearing.
pub struct AutoClearSink<B: ClipboardBackend> {
    backend: Arc<Mutex<B>>,
    handle: Handle,
    policy: ClearPolicy,
    pending: Mutex<Option<PendingClear>>,
}

/// The production sink.
pub type ArboardSink = AutoClearSink<ArboardBackend>;

impl<B: ClipboardBackend> AutoClearSink<B> {
    /// Create a sink that schedules clears on `handle`.
    pub fn new(backend: B, handle: Handle, policy: ClearPolicy) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            handle,
            policy,
            pending: Mutex::new(None),
        }
    }

    /// The clearing policy.
    pub fn policy(&self) -> ClearPolicy {
        self.policy
    }

    /// Whether a clear is scheduled.
    pub fn has_pending_clear(&self) -> bool {
        lock(&self.pending).is_ok_and(|pending| {
            pending
                .as_ref()
                .is_some_and(|p| !p.task.is_finished())
        })
    }

    /// Run a pending clear now.
    ///
    /// Returns whether the clipboard was cleared; `false` when nothing was
    /// pending or the clipboard no longer holds the exported text.
    pub fn flush(&self) -> Result<bool, ClipboardError> {
        let Some(pending) = lock(&self.pending)?.take() else {
            return Ok(false);
        };
        pending.task.abort();
        clear_if_unchanged(&self.backend, &pending.expected)
    }
}

impl<B: ClipboardBackend> ClipboardSink for AutoClearSink<B> {
    fn submit(&self, text: &SecretString, sensitive: bool) -> Result<(), ClipboardError> {
        lock(&self.backend)?.set_text(text.expose_secret())?;

        if let Some(previous) = lock(&self.pending)?.take() {
            previous.task.abort();
            debug!("Replaced pending clipboard clear");
        }

        let Some(delay) = self.policy.delay_for(sensitive) else {
            debug!(sensitive, "Clipboard export will not be cleared");
            return Ok(());
        };

        let expected = Arc::new(SecretString::from(text.expose_secret()));
        let backend = Arc::clone(&self.backend);
        let task_expected = Arc::clone(&expected);
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let result =
                tokio::task::spawn_blocking(move || clear_if_unchanged(&backend, &task_expected))
                    .await;
            match result {
                Ok(Ok(true)) => info!("Clipboard cleared"),
                Ok(Ok(false)) => debug!("Clipboard changed since export, left alone"),
                Ok(Err(e)) => warn!(error = %e, "Failed to clear clipboard"),
                Err(e) => warn!(error = %e, "Clipboard clear task failed"),
            }
        });

        *lock(&self.pending)? = Some(PendingClear { expected, task });
        debug!(delay_secs = delay.as_secs_f64(), sensitive, "Scheduled clipboard clear");
        Ok(())
    }
}

impl<B: ClipboardBackend> Drop for AutoClearSink<B> {
    fn drop(&mut self) {
        match self.flush() {
            Ok(true) => info!("Clipboard cleared on exit"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to clear clipboard on exit"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ClipboardError> {
    mutex
        .lock()
        .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".to_string()))
}

/// Clear the clipboard if it still holds `expected`.
fn clear_if_unchanged<B: ClipboardBackend>(
    backend: &Mutex<B>,
    expected: &SecretString,
) -> Result<bool, ClipboardError> {
    let mut backend = lock(backend)?;
    let current = Zeroizing::new(backend.get_text()?);
    if current.as_str() != expected.expose_secret() {
        return Ok(false);
    }
    backend.clear()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory clipboard shared with the test.
    #[derive(Clone, Default)]
    struct MemoryClipboard {
        text: Arc<Mutex<String>>,
        broken: bool,
    }

    impl MemoryClipboard {
        fn contents(&self) -> String {
            self.text.lock().unwrap().clone()
        }

        fn overwrite(&self, text: &str) {
            *self.text.lock().unwrap() = text.to_string();
        }
    }

    impl ClipboardBackend for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::Unavailable("no display".into()));
            }
            self.overwrite(text);
            Ok(())
        }

        fn get_text(&mut self) -> Result<String, ClipboardError> {
            Ok(self.contents())
        }

        fn clear(&mut self) -> Result<(), ClipboardError> {
            self.overwrite("");
            Ok(())
        }
    }

    fn policy(millis: u64) -> ClearPolicy {
        ClearPolicy {
            sensitive: Some(Duration::from_millis(millis)),
            plain: None,
        }
    }

    fn secret(text: &str) -> SecretString {
        SecretString::from(text)
    }

    #[test]
    fn policy_from_config() {
        let mut config = Config::default();
        config.clipboard.always_clear = false;
        let policy = ClearPolicy::from_config(&config);
        assert_eq!(policy.delay_for(true), Some(Duration::from_secs(12)));
        assert_eq!(policy.delay_for(false), None);
    }

    #[tokio::test]
    async fn clears_sensitive_export_after_delay() {
        let clipboard = MemoryClipboard::default();
        let sink = AutoClearSink::new(clipboard.clone(), Handle::current(), policy(30));

        sink.submit(&secret("ru"), true).unwrap();
        assert_eq!(clipboard.contents(), "ru");
        assert!(sink.has_pending_clear());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(clipboard.contents(), "");
        assert!(!sink.has_pending_clear());
    }

    #[tokio::test]
    async fn plain_export_is_kept_without_policy() {
        let clipboard = MemoryClipboard::default();
        let sink = AutoClearSink::new(clipboard.clone(), Handle::current(), policy(30));

        sink.submit(&secret("al"), false).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(clipboard.contents(), "al");
        assert!(!sink.flush().unwrap());
    }

    #[tokio::test]
    async fn leaves_clipboard_alone_when_user_copied_something_else() {
        let clipboard = MemoryClipboard::default();
        let sink = AutoClearSink::new(clipboard.clone(), Handle::current(), policy(30));

        sink.submit(&secret("ru"), true).unwrap();
        clipboard.overwrite("meeting notes");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(clipboard.contents(), "meeting notes");
    }

    #[tokio::test]
    async fn new_export_restarts_the_timer() {
        let clipboard = MemoryClipboard::default();
        let sink = AutoClearSink::new(clipboard.clone(), Handle::current(), policy(300));

        sink.submit(&secret("ru"), true).unwrap();
        tokio::time::sleep(Duration::from_millis(180)).await;
        sink.submit(&secret("ru"), true).unwrap();

        // The first clear would have fired by now
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(clipboard.contents(), "ru");

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(clipboard.contents(), "");
    }

    #[tokio::test]
    async fn flush_clears_immediately() {
        let clipboard = MemoryClipboard::default();
        let sink = AutoClearSink::new(clipboard.clone(), Handle::current(), policy(60_000));

        sink.submit(&secret("b4"), true).unwrap();
        assert!(sink.flush().unwrap());
        assert_eq!(clipboard.contents(), "");
        assert!(!sink.flush().unwrap());
    }

    #[tokio::test]
    async fn drop_runs_pending_clear() {
        let clipboard = MemoryClipboard::default();
        {
            let sink = AutoClearSink::new(clipboard.clone(), Handle::current(), policy(60_000));
            sink.submit(&secret("b4"), true).unwrap();
        }
        assert_eq!(clipboard.contents(), "");
    }

    #[tokio::test]
    async fn backend_failure_is_reported() {
        let clipboard = MemoryClipboard {
            broken: true,
            ..Default::default()
        };
        let sink = AutoClearSink::new(clipboard, Handle::current(), policy(30));

        let err = sink.submit(&secret("x"), true).unwrap_err();
        assert!(matches!(err, ClipboardError::Unavailable(_)));
        assert!(!sink.has_pending_clear());
    }
}
