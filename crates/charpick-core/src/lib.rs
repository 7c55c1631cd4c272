//! Core types and logic for charpick.
//!
//! This crate reveals chosen characters of a stored secret ("the 2nd, 4th
//! and 7th character of your memorable word") without ever showing or
//! copying the whole value. It is intentionally UI-agnostic to allow:
//!
//! - Security audits to focus on the extraction path
//! - Unit tests without a terminal or display server
//! - Different hosts for field storage and clipboard access
//!
//! # Modules
//!
//! - [`secret`]: Protected field values with single-character reads (`SecretField`)
//! - [`selection`]: Selector rows and the ascending cascade (`SelectionSet`)
//! - [`controller`]: Session state and mask toggle (`RevealController`)
//! - [`export`]: Copying revealed characters to a sink (`ClipboardExporter`)
//! - [`fields`]: Field filtering and display order (`FieldSet`)
//! - [`view`]: Render snapshots (`SessionView`, `Cell`)
//! - [`traits`]: Pluggable collaborators (`ClipboardSink`, `FieldSource`)
//! - [`crypto`], [`scratch`]: In-memory sealing and the locked scratch region
//! - [`config`]: TOML configuration
//!
//! # Example
//!
//! ```
//! use charpick_core::{FieldSet, HostField, RevealController};
//!
//! let record = vec![
//!     HostField::new("UserName", "alice", false),
//!     HostField::new("Password", "Tr0ub4dor&3", true),
//! ];
//! let fields = FieldSet::collect(&record, |_| true, true);
//!
//! let mut session = RevealController::new(4);
//! session.select_field(fields.get(0).unwrap());
//! session.set_row_index(0, 1).unwrap();
//! assert_eq!(session.revealed(0), Some('T'));
//! ```

pub mod config;
pub mod controller;
pub mod crypto;
pub mod error;
pub mod export;
pub mod fields;
pub mod scratch;
pub mod secret;
pub mod selection;
pub mod traits;
pub mod types;
pub mod view;

// Re-export commonly used types at the crate root for convenience
pub use config::{Config, ConfigError};
pub use controller::RevealController;
pub use error::RevealError;
pub use export::ClipboardExporter;
pub use fields::FieldSet;
pub use secret::SecretField;
pub use selection::{SelectionSet, SelectorRow, NONE};
pub use traits::{ClipboardError, ClipboardSink, FieldSource};
pub use types::{CharClass, HostField};
pub use view::{Cell, RowView, SessionView};
