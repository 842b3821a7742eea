//! Cryptographic primitives for pwsvault.
//!
//! This module provides:
//! - The Twofish block primitive (`twofish`)
//! - ECB and CBC modes of operation (`ecb`, `cbc`)
//! - Iterated SHA-256 password stretching (`stretch`)
//! - Stretched-key and session-key handling (`keys`)

pub mod cbc;
pub mod ecb;
pub mod keys;
pub mod stretch;
pub mod twofish;

pub use cbc::TwofishCbc;
pub use ecb::TwofishEcb;
pub use keys::{KeyBlocks, SessionKeys, StretchedKey};
pub use stretch::{generate_salt, stretch, DEFAULT_ITERATIONS};
pub use self::twofish::{Block, Twofish, BLOCK_LEN};
