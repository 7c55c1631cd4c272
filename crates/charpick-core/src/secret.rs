//! Protected field values with single-character reads.
//!
//! A [`SecretField`] owns one named value. The value is either sealed with
//! AES-256-GCM under a per-field key or, when sealing is disabled, held in a
//! `SecretString`. In both cases a character read materializes the value in
//! the field's locked [`ScratchRegion`] through a guard, copies out one
//! `char`, and the guard zeroes the region on every exit path.

use std::cell::RefCell;

use aes_gcm::aead::Buffer;
use secrecy::{ExposeSecret, SecretString};
use tracing::trace;

use crate::crypto::{SealedValue, SealingKey, TAG_SIZE};
use crate::error::RevealError;
use crate::scratch::ScratchRegion;

enum Storage {
    Sealed { key: SealingKey, value: SealedValue },
    Clear(SecretString),
}

/// One named sensitive value for the duration of a reveal session.
///
/// Length and positions count Unicode scalar values, so `"pässwörd"` has
/// length 8 and position 2 is `'ä'`.
///
/// # Thread Safety
///
/// Reads share a single scratch region through a `RefCell`, so the type is
/// not `Sync`. Each session owns its fields exclusively.
///
/// # Example
///
/// ```
/// use charpick_core::SecretField;
/// use secrecy::SecretString;
///
/// let field = SecretField::sealed("Password", SecretString::from("Tr0ub4dor&3"), true);
/// assert_eq!(field.len(), 11);
/// assert_eq!(field.character_at(2).unwrap(), 'r');
/// assert!(field.character_at(12).is_err());
/// assert!(field.is_scratch_zeroed());
/// ```
pub struct SecretField {
    name: String,
    length: usize,
    is_masked: bool,
    storage: Storage,
    scratch: RefCell<ScratchRegion>,
}

impl SecretField {
    /// Create a field, sealing the value when `seal` is set.
    pub fn new(name: impl Into<String>, value: SecretString, is_masked: bool, seal: bool) -> Self {
        if seal {
            Self::sealed(name, value, is_masked)
        } else {
            Self::unsealed(name, value, is_masked)
        }
    }

    /// Create a field whose value is encrypted in memory.
    ///
    /// The clear `value` is consumed and zeroed once sealed.
    pub fn sealed(name: impl Into<String>, value: SecretString, is_masked: bool) -> Self {
        let key = SealingKey::generate();
        let (length, sealed) = {
            let clear = value.expose_secret();
            (clear.chars().count(), key.seal(clear.as_bytes()))
        };
        drop(value);

        let capacity = sealed.plaintext_len() + TAG_SIZE;
        Self {
            name: name.into(),
            length,
            is_masked,
            storage: Storage::Sealed { key, value: sealed },
            scratch: RefCell::new(ScratchRegion::new(capacity)),
        }
    }

    /// Create a field that keeps its value in a `SecretString`.
    pub fn unsealed(name: impl Into<String>, value: SecretString, is_masked: bool) -> Self {
        let (length, capacity) = {
            let clear = value.expose_secret();
            (clear.chars().count(), clear.len())
        };

        Self {
            name: name.into(),
            length,
            is_masked,
            storage: Storage::Clear(value),
            scratch: RefCell::new(ScratchRegion::new(capacity)),
        }
    }

    /// Display identifier of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of characters in the value.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check if the value is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether the host marked the value as protected.
    pub fn is_masked(&self) -> bool {
        self.is_masked
    }

    /// Whether the value is encrypted in memory.
    pub fn is_sealed(&self) -> bool {
        matches!(self.storage, Storage::Sealed { .. })
    }

    /// Read the character at 1-based `position`.
    ///
    /// # Errors
    ///
    /// Returns `RevealError::OutOfRange` if `position` is outside
    /// `1..=len()`, and `RevealError::Corrupted` if a sealed value fails
    /// authentication. The scratch region is zeroed in every case.
    pub fn character_at(&self, position: usize) -> Result<char, RevealError> {
        let length = self.length;
        let result = self.with_plaintext(|text| {
            position
                .checked_sub(1)
                .and_then(|offset| text.chars().nth(offset))
                .ok_or(RevealError::OutOfRange { position, length })
        });
        trace!(field = %self.name, position, ok = result.is_ok(), "Character read");
        result
    }

    /// Run `read` over the plaintext held in the scratch region.
    ///
    /// The guard owning the plaintext is dropped, and the region zeroed,
    /// before this returns or unwinds.
    fn with_plaintext<T>(
        &self,
        read: impl FnOnce(&str) -> Result<T, RevealError>,
    ) -> Result<T, RevealError> {
        let mut region = self.scratch.borrow_mut();
        let mut guard = region.acquire();

        let opened = match &self.storage {
            Storage::Sealed { key, value } => key.open_into(value, &mut guard),
            Storage::Clear(value) => guard
                .extend_from_slice(value.expose_secret().as_bytes())
                .is_ok(),
        };
        if !opened {
            return Err(RevealError::Corrupted(self.name.clone()));
        }

        let text = std::str::from_utf8(guard.as_slice())
            .map_err(|_| RevealError::Corrupted(self.name.clone()))?;
        read(text)
    }

    /// Check that the scratch region holds no plaintext.
    ///
    /// Always true between calls; exposed so hosts and tests can verify
    /// the erasure guarantee directly.
    pub fn is_scratch_zeroed(&self) -> bool {
        self.scratch.borrow().as_bytes().iter().all(|&b| b == 0)
    }

    /// A sealed field whose key no longer matches its ciphertext, so every
    /// read fails authentication.
    #[cfg(test)]
    pub(crate) fn tampered(name: &str, value: &str, is_masked: bool) -> Self {
        let mut field = Self::sealed(name, SecretString::from(value), is_masked);
        if let Storage::Sealed { key, .. } = &mut field.storage {
            *key = SealingKey::generate();
        }
        field
    }
}

// Manual Debug implementation to avoid exposing secrets
impl std::fmt::Debug for SecretField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretField")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("is_masked", &self.is_masked)
            .field("sealed", &self.is_sealed())
            .field("value", &"[REDACTED]")
            .finish()
    }
}
