//! Key material recovered from the password.
//!
//! The stretched password never encrypts vault data directly.  It keys a
//! Twofish ECB wrapper that unwraps four stored 16-byte key blocks:
//! `K = D(B1) || D(B2)` keys the CBC field stream and
//! `L = D(B3) || D(B4)` keys the HMAC.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::ecb::TwofishEcb;
use super::stretch::{password_check, stretch, DIGEST_LEN};
use super::twofish::Block;
use crate::errors::Result;

/// Length of the CBC and HMAC keys (256 bits).
pub const KEY_LEN: usize = 32;

/// The four ECB-wrapped key blocks stored on disk.
pub type KeyBlocks = [Block; 4];

/// A stretched password that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct StretchedKey {
    bytes: [u8; DIGEST_LEN],
}

impl StretchedKey {
    /// Stretch `password` with the stored salt and iteration count.
    pub fn derive(password: &[u8], salt: &[u8], iterations: u32) -> Self {
        Self {
            bytes: stretch(password, salt, iterations),
        }
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }

    /// The digest stored in the file to check the password quickly.
    pub fn password_check(&self) -> [u8; DIGEST_LEN] {
        password_check(&self.bytes)
    }

    /// Wrap freshly generated raw key material into on-disk key blocks.
    pub fn wrap_key_blocks(&self, raw: &KeyBlocks) -> Result<KeyBlocks> {
        let ecb = TwofishEcb::new(&self.bytes)?;
        Ok(raw.map(|b| ecb.encrypt_block(&b)))
    }

    /// Unwrap the on-disk key blocks into the session keys.
    pub fn unwrap_key_blocks(&self, blocks: &KeyBlocks) -> Result<SessionKeys> {
        let ecb = TwofishEcb::new(&self.bytes)?;
        let mut raw = blocks.map(|b| ecb.decrypt_block(&b));

        let mut keys = SessionKeys {
            cbc_key: Zeroizing::new([0u8; KEY_LEN]),
            hmac_key: Zeroizing::new([0u8; KEY_LEN]),
        };
        keys.cbc_key[..16].copy_from_slice(&raw[0]);
        keys.cbc_key[16..].copy_from_slice(&raw[1]);
        keys.hmac_key[..16].copy_from_slice(&raw[2]);
        keys.hmac_key[16..].copy_from_slice(&raw[3]);
        raw.zeroize();
        Ok(keys)
    }
}

/// The CBC key `K` and HMAC key `L`, zeroized on drop.
pub struct SessionKeys {
    cbc_key: Zeroizing<[u8; KEY_LEN]>,
    hmac_key: Zeroizing<[u8; KEY_LEN]>,
}

impl SessionKeys {
    pub fn cbc_key(&self) -> &[u8; KEY_LEN] {
        &self.cbc_key
    }

    pub fn hmac_key(&self) -> &[u8; KEY_LEN] {
        &self.hmac_key
    }
}
