//! Password stretching with iterated SHA-256.
//!
//! `H0 = SHA-256(password || salt)`, then `H(i+1) = SHA-256(H(i))` for the
//! stored iteration count.  The result keys the ECB wrapper around the key
//! blocks, and its own SHA-256 is stored in the file as a quick password
//! check.  See Kelsey, Schneier, Hall & Wagner, "Secure Applications of
//! Low-Entropy Keys", section 4.1.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of the stretching salt in bytes.
pub const SALT_LEN: usize = 32;

/// Length of a SHA-256 digest.
pub const DIGEST_LEN: usize = 32;

/// Iteration count used for new vaults unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 2048;

/// Stretch `password` with `salt` over `iterations` extra rounds.
pub fn stretch(password: &[u8], salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest: [u8; DIGEST_LEN] = Sha256::new()
        .chain_update(password)
        .chain_update(salt)
        .finalize()
        .into();
    for _ in 0..iterations {
        digest = Sha256::digest(digest).into();
    }
    digest
}

/// SHA-256 of the stretched password, as stored in the vault preamble.
pub fn password_check(stretched: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(stretched).into()
}

/// Compare a computed password check against the stored one in constant time.
pub fn verify_password_check(stretched: &[u8], stored: &[u8]) -> bool {
    password_check(stretched)[..].ct_eq(stored).into()
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    random_bytes()
}

/// Fill a fixed-size array from the OS RNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Fill an existing buffer from the OS RNG.
pub fn fill_random(buf: &mut [u8]) {
    rand::rngs::OsRng.fill_bytes(buf);
}
