//! Terminal host for charpick.
//!
//! This crate provides the pieces the `charpick` binary wires together:
//! field entry at the terminal, clipboard sinks and the interactive
//! session loop. The reveal logic itself lives in `charpick-core`.

pub mod prompt;
pub mod session;
pub mod sink;

// Re-export main components
pub use prompt::{FieldSpec, PromptError, PromptedFields};
pub use session::{render, Command, CommandError, Session};
pub use sink::{ArboardSink, ClearPolicy, MockClipboardSink};
