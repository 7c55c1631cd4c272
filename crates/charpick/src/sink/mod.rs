//! Clipboard sink implementations.
//!
//! This module provides implementations of the [`ClipboardSink`] trait:
//!
//! - [`ArboardSink`]: System clipboard with timed clearing (production)
//! - [`MockClipboardSink`]: Recording mock for testing
//!
//! [`ClipboardSink`]: charpick_core::ClipboardSink

mod auto_clear;
mod mock;

pub use auto_clear::{ArboardBackend, ArboardSink, AutoClearSink, ClearPolicy, ClipboardBackend};
pub use mock::MockClipboardSink;
