//! Twofish block primitive.
//!
//! A thin wrapper around the RustCrypto `twofish` crate exposing raw
//! single-block encryption and decryption.  The expanded key schedule is
//! built once in [`Twofish::new`] and reused for every block.

use ::twofish::cipher::generic_array::GenericArray;
use ::twofish::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::errors::{VaultError, Result};

/// Twofish block size in bytes (128 bits).
pub const BLOCK_LEN: usize = 16;

/// A single 128-bit block.
pub type Block = [u8; BLOCK_LEN];

/// Keyed Twofish cipher.
pub struct Twofish {
    inner: ::twofish::Twofish,
}

impl Twofish {
    /// Expand a 128, 192 or 256-bit key.
    pub fn new(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(VaultError::InvalidFormat(format!(
                "Twofish key must be 16, 24 or 32 bytes, got {}",
                key.len()
            )));
        }
        let inner = ::twofish::Twofish::new_from_slice(key)
            .map_err(|e| VaultError::InvalidFormat(format!("invalid Twofish key: {e}")))?;
        Ok(Self { inner })
    }

    /// Encrypt one block.
    pub fn encrypt_block(&self, block: &Block) -> Block {
        let mut buf = GenericArray::clone_from_slice(block);
        self.inner.encrypt_block(&mut buf);
        let mut out = [0u8; BLOCK_LEN];
        out.copy_from_slice(&buf);
        out
    }

    /// Decrypt one block.
    pub fn decrypt_block(&self, block: &Block) -> Block {
        let mut buf = GenericArray::clone_from_slice(block);
        self.inner.decrypt_block(&mut buf);
        let mut out = [0u8; BLOCK_LEN];
        out.copy_from_slice(&buf);
        out
    }
}

/// Reject buffers that are not a whole number of blocks.
pub(crate) fn check_block_multiple(len: usize) -> Result<()> {
    if len % BLOCK_LEN != 0 {
        return Err(VaultError::InvalidFormat(format!(
            "Twofish buffer length must be a multiple of {BLOCK_LEN}, got {len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn zero_key_256_known_answer() {
        let cipher = Twofish::new(&[0u8; 32]).unwrap();
        let ct = cipher.encrypt_block(&[0u8; 16]);
        assert_eq!(ct.to_vec(), hex("57FF739D4DC92C1BD7FC01700CC8216F"));
        assert_eq!(cipher.decrypt_block(&ct), [0u8; 16]);
    }

    #[test]
    fn zero_key_128_known_answer() {
        let cipher = Twofish::new(&[0u8; 16]).unwrap();
        let ct = cipher.encrypt_block(&[0u8; 16]);
        assert_eq!(ct.to_vec(), hex("9F589F5CF6122C32B6BFEC2F2AE8C35A"));
    }

    #[test]
    fn rejects_bad_key_length() {
        assert!(Twofish::new(&[0u8; 20]).is_err());
        assert!(Twofish::new(&[]).is_err());
    }

    #[test]
    fn block_multiple_check() {
        assert!(check_block_multiple(0).is_ok());
        assert!(check_block_multiple(48).is_ok());
        assert!(check_block_multiple(17).is_err());
    }
}
