//! Locked scratch memory for transient plaintext.
//!
//! A [`ScratchRegion`] is a fixed-size heap block sized for one field value
//! (plus the AEAD tag while a sealed value is being opened). It never grows,
//! so plaintext is never copied by a reallocation. It is memory-locked with
//! `memsec::mlock` when the process is allowed to, and zeroed on drop.
//!
//! Plaintext only ever lives in the region while a [`ScratchGuard`] is
//! alive; dropping the guard zeroes the whole region, whichever way the
//! scope is left.

use aes_gcm::aead;
use tracing::debug;
use zeroize::Zeroize;

/// Fixed-capacity, memory-locked byte region.
pub struct ScratchRegion {
    bytes: Box<[u8]>,
    memory_locked: bool,
}

impl ScratchRegion {
    /// Allocate a zeroed region of `capacity` bytes and try to lock it.
    pub fn new(capacity: usize) -> Self {
        let mut region = Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            memory_locked: false,
        };
        region.try_lock_memory();
        region
    }

    fn try_lock_memory(&mut self) {
        if self.bytes.is_empty() {
            return;
        }

        // Safety: We're locking memory we own and will unlock on drop
        let result = unsafe { memsec::mlock(self.bytes.as_mut_ptr(), self.bytes.len()) };

        if result {
            self.memory_locked = true;
        } else {
            // Common for unprivileged processes (RLIMIT_MEMLOCK)
            debug!(
                capacity = self.bytes.len(),
                "Failed to lock scratch memory (this is normal for unprivileged processes)"
            );
        }
    }

    /// Total size of the region.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Check if memory locking is active.
    pub fn is_memory_locked(&self) -> bool {
        self.memory_locked
    }

    /// Start using the region. The returned guard zeroes it when dropped.
    pub fn acquire(&mut self) -> ScratchGuard<'_> {
        ScratchGuard {
            bytes: &mut self.bytes,
            len: 0,
        }
    }

    /// Raw view of the whole region, used to verify it holds no plaintext.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for ScratchRegion {
    fn drop(&mut self) {
        self.bytes.zeroize();

        if self.memory_locked {
            // Safety: We're unlocking memory we previously locked
            unsafe {
                memsec::munlock(self.bytes.as_mut_ptr(), self.bytes.len());
            }
        }
    }
}

impl std::fmt::Debug for ScratchRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchRegion")
            .field("capacity", &self.bytes.len())
            .field("memory_locked", &self.memory_locked)
            .finish()
    }
}

/// Scoped use of a [`ScratchRegion`].
///
/// Behaves like a bounded `Vec<u8>`: bytes are appended up to the region's
/// capacity and the AEAD cipher can decrypt in place through the
/// [`aead::Buffer`] implementation.
pub struct ScratchGuard<'a> {
    bytes: &'a mut [u8],
    len: usize,
}

impl ScratchGuard<'_> {
    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for ScratchGuard<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsMut<[u8]> for ScratchGuard<'_> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }
}

impl aead::Buffer for ScratchGuard<'_> {
    fn extend_from_slice(&mut self, other: &[u8]) -> aead::Result<()> {
        let end = self.len.checked_add(other.len()).ok_or(aead::Error)?;
        if end > self.bytes.len() {
            return Err(aead::Error);
        }
        self.bytes[self.len..end].copy_from_slice(other);
        self.len = end;
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.bytes[len..self.len].zeroize();
            self.len = len;
        }
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        // The whole region, not just `len`: a truncated AEAD tag sits past it
        self.bytes.zeroize();
        self.len = 0;
    }
}
