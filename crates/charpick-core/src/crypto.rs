//! AES-256-GCM sealing of field values held in memory.
//!
//! A host hands over field values in clear. When sealing is enabled each
//! [`SecretField`](crate::SecretField) encrypts its value immediately under
//! its own random key and drops the clear copy, so the whole value only
//! exists as plaintext inside a locked scratch region for the duration of a
//! single character read.
//!
//! # Security Properties
//!
//! - **Swap Protection**: The key is stored in memory-locked (`mlock`)
//!   memory and zeroed on drop.
//! - **Integrity**: The GCM tag is checked on every open; a tampered value
//!   is reported instead of yielding wrong characters.
//! - **No stray copies**: Opening decrypts in place inside a caller supplied
//!   [`ScratchGuard`](crate::scratch::ScratchGuard); no heap buffer is
//!   allocated for plaintext.
//!
//! # Example
//!
//! ```
//! use charpick_core::crypto::SealingKey;
//! use charpick_core::scratch::ScratchRegion;
//!
//! let key = SealingKey::generate();
//! let sealed = key.seal(b"correct horse");
//!
//! let mut region = ScratchRegion::new(sealed.ciphertext_with_tag().len());
//! {
//!     let mut guard = region.acquire();
//!     assert!(key.open_into(&sealed, &mut guard));
//!     assert_eq!(guard.as_slice(), b"correct horse");
//! }
//! assert!(region.as_bytes().iter().all(|&b| b == 0));
//! ```

use std::fmt;

use aes_gcm::aead::{Aead, AeadInPlace, Buffer, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use tracing::warn;
use zeroize::Zeroize;

use crate::scratch::ScratchGuard;

/// Size of the AES-256 key in bytes.
const KEY_SIZE: usize = 32;

/// Size of the GCM nonce in bytes (96 bits).
const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// A per-field AES-256-GCM key with secure memory handling.
///
/// The key lives in a heap box that is memory-locked when possible and
/// zeroed before it is unlocked on drop.
pub struct SealingKey {
    key: Box<[u8; KEY_SIZE]>,
    memory_locked: bool,
}

impl SealingKey {
    /// Generate a new random key and try to lock its memory.
    ///
    /// If memory locking fails a warning is logged and the key keeps
    /// working, though it may be swapped.
    pub fn generate() -> Self {
        let mut key = Box::new([0u8; KEY_SIZE]);
        rand::rng().fill_bytes(key.as_mut());

        let mut sealing_key = Self {
            key,
            memory_locked: false,
        };
        sealing_key.try_lock_memory();
        sealing_key
    }

    fn try_lock_memory(&mut self) {
        let ptr = self.key.as_mut_ptr();

        // Safety: We're locking memory we own and will unlock on drop
        let result = unsafe { memsec::mlock(ptr, KEY_SIZE) };

        if result {
            self.memory_locked = true;
        } else {
            warn!(
                "Failed to lock sealing key memory - key may be swapped to disk. \
                 Grant CAP_IPC_LOCK capability or increase RLIMIT_MEMLOCK to fix."
            );
        }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_ref()))
    }

    /// Encrypt a value under a fresh random nonce.
    ///
    /// # Panics
    ///
    /// Panics if AES-GCM refuses the input, which only happens for
    /// plaintexts larger than 64 GiB.
    pub fn seal(&self, plaintext: &[u8]) -> SealedValue {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext_with_tag = self
            .cipher()
            .encrypt(nonce, plaintext)
            .expect("encryption should not fail with valid inputs");

        SealedValue::from_parts(&nonce_bytes, ciphertext_with_tag)
    }

    /// Decrypt `sealed` in place into `scratch`.
    ///
    /// The guard must be empty and large enough for the ciphertext plus
    /// tag. Returns `false` when the value fails authentication (wrong key,
    /// corruption or tampering); the guard is left empty in that case.
    pub fn open_into(&self, sealed: &SealedValue, scratch: &mut ScratchGuard<'_>) -> bool {
        if scratch
            .extend_from_slice(sealed.ciphertext_with_tag())
            .is_err()
        {
            warn!(
                needed = sealed.ciphertext_with_tag().len(),
                "Scratch region too small for sealed value"
            );
            return false;
        }

        let nonce = Nonce::from_slice(sealed.nonce());
        match self.cipher().decrypt_in_place(nonce, b"", &mut *scratch) {
            Ok(()) => true,
            Err(_) => {
                scratch.truncate(0);
                warn!("Opening sealed value failed - ciphertext may be corrupted or tampered");
                false
            }
        }
    }
}

impl Drop for SealingKey {
    fn drop(&mut self) {
        self.key.zeroize();

        if self.memory_locked {
            // Safety: We're unlocking memory we previously locked
            unsafe {
                memsec::munlock(self.key.as_mut_ptr(), KEY_SIZE);
            }
        }
    }
}

impl fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealingKey")
            .field("key", &"[REDACTED]")
            .field("memory_locked", &self.memory_locked)
            .finish()
    }
}

/// An encrypted value with its nonce.
///
/// Layout: `[12-byte nonce][ciphertext][16-byte auth tag]`.
#[derive(Clone)]
pub struct SealedValue {
    data: Vec<u8>,
}

impl SealedValue {
    fn from_parts(nonce: &[u8], ciphertext_with_tag: Vec<u8>) -> Self {
        debug_assert_eq!(nonce.len(), NONCE_SIZE);

        let mut data = Vec::with_capacity(NONCE_SIZE + ciphertext_with_tag.len());
        data.extend_from_slice(nonce);
        data.extend(ciphertext_with_tag);

        Self { data }
    }

    /// The nonce portion.
    pub fn nonce(&self) -> &[u8] {
        &self.data[..NONCE_SIZE]
    }

    /// The ciphertext and authentication tag.
    pub fn ciphertext_with_tag(&self) -> &[u8] {
        &self.data[NONCE_SIZE..]
    }

    /// Length of the plaintext this value opens to.
    pub fn plaintext_len(&self) -> usize {
        self.data.len() - NONCE_SIZE - TAG_SIZE
    }
}

impl fmt::Debug for SealedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedValue")
            .field("len", &self.data.len())
            .field("nonce_len", &NONCE_SIZE)
            .finish()
    }
}
