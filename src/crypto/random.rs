//! Operating-system randomness for salts, nonces and one-time keys.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{PmVaultError, Result};

/// Fill `buf` with bytes from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| PmVaultError::RandomFailure(e.to_string()))
}
