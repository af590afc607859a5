//! # Name Hashing
//!
//! Tuple types are identified on the wire by 32-bit FNV-1a hashes of their
//! namespace and name. FNV-1a is stable, cheap, and has no dependency on
//! process state, which makes the hash pair a durable identity that
//! producers and consumers can agree on without exchanging schemas.
//!
//! The hasher state is reused between calls, so the shared instances wrap
//! it in a mutex. The contract is simply "compute the hash safely under
//! concurrent callers"; two names are considered equal in header
//! comparisons when their hashes are equal, and the registry holds the
//! canonical type so that collisions are resolved at registration time.

use parking_lot::Mutex;

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// Incremental FNV-1a 32-bit hasher.
#[derive(Debug, Clone)]
pub struct Fnv32a {
    state: u32,
}

impl Fnv32a {
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Restores the initial state so the instance can be reused.
    pub fn reset(&mut self) {
        self.state = FNV_OFFSET_BASIS;
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u32::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn finish(&self) -> u32 {
        self.state
    }
}

impl Default for Fnv32a {
    fn default() -> Self {
        Self::new()
    }
}

/// A mutex-guarded [`Fnv32a`] that is safe to share between threads.
#[derive(Debug)]
pub struct SyncFnv32 {
    inner: Mutex<Fnv32a>,
}

impl SyncFnv32 {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Fnv32a::new()),
        }
    }

    /// Hashes `bytes` in one shot. The underlying state is reset first, so
    /// the result depends only on the input.
    pub fn hash(&self, bytes: &[u8]) -> u32 {
        let mut hasher = self.inner.lock();
        hasher.reset();
        hasher.write(bytes);
        hasher.finish()
    }
}

impl Default for SyncFnv32 {
    fn default() -> Self {
        Self::new()
    }
}

static NAME_HASHER: SyncFnv32 = SyncFnv32::new();

/// Hashes a namespace or type name with the process-wide hasher.
pub fn hash_name(name: &str) -> u32 {
    NAME_HASHER.hash(name.as_bytes())
}
