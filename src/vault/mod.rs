//! Vault module: the Password Safe V3 container.
//!
//! This module provides:
//! - Raw fields and the encrypted TLV field stream (`field`)
//! - Header metadata (`header`) and password records (`record`)
//! - The binary file layout with HMAC integrity (`format`)
//! - The high-level `Vault` for creating, opening and saving (`store`)
//! - Record merging between two vaults (`merge`)

pub mod field;
pub mod format;
pub mod header;
pub mod merge;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use field::{Field, FieldMap};
pub use format::FormatVersion;
pub use header::Header;
pub use merge::{MergeCandidate, MergeReason};
pub use record::Record;
pub use store::Vault;
