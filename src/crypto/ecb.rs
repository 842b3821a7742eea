//! Electronic codebook (ECB) mode.
//!
//! Only used to wrap and unwrap the four 16-byte key blocks (B1..B4)
//! stored in the vault preamble.

use super::twofish::{check_block_multiple, Block, Twofish, BLOCK_LEN};
use crate::errors::Result;

/// Twofish in ECB mode: every block is processed independently.
pub struct TwofishEcb {
    cipher: Twofish,
}

impl TwofishEcb {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            cipher: Twofish::new(key)?,
        })
    }

    /// Encrypt a buffer whose length is a multiple of 16.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_block_multiple(plaintext.len())?;
        Ok(plaintext
            .chunks_exact(BLOCK_LEN)
            .flat_map(|chunk| self.cipher.encrypt_block(&to_block(chunk)))
            .collect())
    }

    /// Decrypt a buffer whose length is a multiple of 16.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_block_multiple(ciphertext.len())?;
        Ok(ciphertext
            .chunks_exact(BLOCK_LEN)
            .flat_map(|chunk| self.cipher.decrypt_block(&to_block(chunk)))
            .collect())
    }

    /// Encrypt exactly one block.
    pub fn encrypt_block(&self, block: &Block) -> Block {
        self.cipher.encrypt_block(block)
    }

    /// Decrypt exactly one block.
    pub fn decrypt_block(&self, block: &Block) -> Block {
        self.cipher.decrypt_block(block)
    }
}

pub(crate) fn to_block(chunk: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_LEN];
    block.copy_from_slice(chunk);
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_independent() {
        let ecb = TwofishEcb::new(&[7u8; 32]).unwrap();
        let ct = ecb.encrypt(&[0x41u8; 32]).unwrap();
        // Identical plaintext blocks give identical ciphertext blocks.
        assert_eq!(ct[..16], ct[16..]);
        assert_eq!(ecb.decrypt(&ct).unwrap(), vec![0x41u8; 32]);
    }

    #[test]
    fn rejects_partial_blocks() {
        let ecb = TwofishEcb::new(&[7u8; 32]).unwrap();
        assert!(ecb.encrypt(&[0u8; 15]).is_err());
        assert!(ecb.decrypt(&[0u8; 33]).is_err());
    }

    #[test]
    fn empty_buffer_is_empty() {
        let ecb = TwofishEcb::new(&[7u8; 16]).unwrap();
        assert!(ecb.encrypt(&[]).unwrap().is_empty());
    }
}
