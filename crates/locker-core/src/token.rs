//! Lock tokens.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{LockError, LockResult};

/// Source of the random bytes behind a token.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> LockResult<()>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> LockResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| LockError::Random(Box::new(e)))
    }
}

/// Secret proving ownership of one lock acquisition.
///
/// Base64 of `size` random bytes. `Debug` output hides the value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Generates a token from `size` bytes of `source`.
    pub fn generate(source: &dyn RandomSource, size: usize) -> LockResult<Self> {
        let mut buf = vec![0u8; size];
        source.fill_bytes(&mut buf)?;
        Ok(Self(STANDARD.encode(&buf)))
    }

    /// The encoded token as sent to the store.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}
