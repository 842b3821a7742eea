//! Cipher-block chaining (CBC) mode.
//!
//! The chaining state survives between calls, so a single `TwofishCbc`
//! can stream the whole header and record region one field at a time.

use super::ecb::to_block;
use super::twofish::{check_block_multiple, Block, Twofish, BLOCK_LEN};
use crate::errors::Result;

/// Twofish in CBC mode with a persistent chaining state.
pub struct TwofishCbc {
    cipher: Twofish,
    state: Block,
}

impl TwofishCbc {
    /// Key the cipher and seed the chaining state with `iv`.
    pub fn new(key: &[u8], iv: &Block) -> Result<Self> {
        Ok(Self {
            cipher: Twofish::new(key)?,
            state: *iv,
        })
    }

    /// Key the cipher with an all-zero initial state.
    pub fn without_iv(key: &[u8]) -> Result<Self> {
        Self::new(key, &[0u8; BLOCK_LEN])
    }

    /// Encrypt a buffer whose length is a multiple of 16.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_block_multiple(plaintext.len())?;
        let mut out = Vec::with_capacity(plaintext.len());
        for chunk in plaintext.chunks_exact(BLOCK_LEN) {
            let ct = self.cipher.encrypt_block(&xor_block(&to_block(chunk), &self.state));
            out.extend_from_slice(&ct);
            self.state = ct;
        }
        Ok(out)
    }

    /// Decrypt a buffer whose length is a multiple of 16.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_block_multiple(ciphertext.len())?;
        let mut out = Vec::with_capacity(ciphertext.len());
        for chunk in ciphertext.chunks_exact(BLOCK_LEN) {
            let ct = to_block(chunk);
            out.extend_from_slice(&xor_block(&self.cipher.decrypt_block(&ct), &self.state));
            self.state = ct;
        }
        Ok(out)
    }
}

fn xor_block(a: &Block, b: &Block) -> Block {
    let mut out = [0u8; BLOCK_LEN];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}
