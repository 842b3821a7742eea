//! High-level vault operations.
//!
//! `Vault` wraps the binary format layer and the crypto layer so that
//! callers can work with simple method calls: open a file, add or edit
//! records, save it back.

use std::fs;
use std::io::Write;
use std::path::Path;

use uuid::Uuid;

use crate::crypto::keys::{KeyBlocks, StretchedKey};
use crate::crypto::stretch::{generate_salt, random_bytes, DEFAULT_ITERATIONS};
use crate::errors::{Result, VaultError};

use super::format::{self, FormatVersion, Preamble, HMAC_LEN};
use super::header::Header;
use super::record::{self, Record};

/// Application identifier written into the header on every save.
pub const APP_NAME: &str = concat!("pwsvault ", env!("CARGO_PKG_VERSION"));

/// An open password vault: preamble, header and an ordered list of records.
pub struct Vault {
    preamble: Preamble,
    header: Header,
    records: Vec<Record>,
    hmac: [u8; HMAC_LEN],
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty vault protected by `password`.
    pub fn create(password: &[u8]) -> Result<Self> {
        Self::create_with_iterations(password, DEFAULT_ITERATIONS)
    }

    /// Create an empty vault with an explicit stretching iteration count.
    ///
    /// Generates a random salt, IV and key material.  The key material is
    /// stored wrapped under the stretched password as B1..B4.
    pub fn create_with_iterations(password: &[u8], iterations: u32) -> Result<Self> {
        let salt = generate_salt();
        let stretched = StretchedKey::derive(password, &salt, iterations);

        let raw: KeyBlocks = [random_bytes(), random_bytes(), random_bytes(), random_bytes()];
        let key_blocks = stretched.wrap_key_blocks(&raw)?;

        let keys = stretched.unwrap_key_blocks(&key_blocks)?;
        let hmac = format::empty_hmac(keys.hmac_key())?;

        tracing::debug!(iterations, "created empty vault");

        Ok(Self {
            preamble: Preamble {
                version: FormatVersion::V3,
                salt,
                iterations,
                password_check: stretched.password_check(),
                key_blocks,
                iv: random_bytes(),
            },
            header: Header::new(),
            records: Vec::new(),
            hmac,
        })
    }

    /// Parse and verify a vault image held in memory.
    pub fn from_bytes(data: &[u8], password: &[u8]) -> Result<Self> {
        let parsed = format::parse(data, password)?;
        Ok(Self {
            preamble: parsed.preamble,
            header: parsed.header,
            records: parsed.records,
            hmac: parsed.hmac,
        })
    }

    /// Open an existing vault file.
    pub fn open(path: &Path, password: &[u8]) -> Result<Self> {
        if !path.exists() {
            return Err(VaultError::VaultNotFound(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        let vault = Self::from_bytes(&data, password)?;
        tracing::debug!(path = %path.display(), records = vault.records.len(), "opened vault");
        Ok(vault)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the vault under `password`.
    ///
    /// Stamps the header with the save time and application name, and
    /// re-derives the password check from `password`, so saving under a
    /// new password changes the master password.
    pub fn to_bytes(&mut self, password: &[u8]) -> Result<Vec<u8>> {
        let encoded = self.encode(password)?;
        Ok(self.commit(encoded))
    }

    /// Write the vault to `path`.
    ///
    /// The in-memory save stamp and password check are only updated once
    /// the file has been written and verified.
    pub fn save(&mut self, path: &Path, password: &[u8]) -> Result<()> {
        let encoded = self.encode(password)?;
        write_verified(path, &encoded.bytes, password)?;
        self.commit(encoded);
        tracing::debug!(path = %path.display(), records = self.records.len(), "saved vault");
        Ok(())
    }

    /// Serialize into a stamped copy of the preamble and header, leaving
    /// `self` untouched.
    fn encode(&self, password: &[u8]) -> Result<Encoded> {
        let mut header = self.header.clone();
        header.stamp_save(record::now(), APP_NAME);

        let stretched =
            StretchedKey::derive(password, &self.preamble.salt, self.preamble.iterations);
        let mut preamble = self.preamble.clone();
        preamble.password_check = stretched.password_check();

        let (bytes, hmac) = format::serialize(&preamble, &stretched, &header, &self.records)?;
        Ok(Encoded {
            preamble,
            header,
            bytes,
            hmac,
        })
    }

    fn commit(&mut self, encoded: Encoded) -> Vec<u8> {
        self.preamble = encoded.preamble;
        self.header = encoded.header;
        self.hmac = encoded.hmac;
        encoded.bytes
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Records in their current order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to the ordered record collection.
    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    pub fn add_record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Remove and return the record at `index`.
    pub fn remove_record(&mut self, index: usize) -> Option<Record> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Index of the first record with the given title.
    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|r| r.title() == title)
    }

    /// Index of the record with the given UUID.
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<usize> {
        self.records.iter().position(|r| r.uuid() == Some(uuid))
    }

    /// Re-apply the group + title presentation order.
    pub fn sort_records(&mut self) {
        self.records.sort_by(|a, b| a.display_order(b));
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> FormatVersion {
        self.preamble.version
    }

    /// Stretching iteration count stored in the file.
    pub fn iterations(&self) -> u32 {
        self.preamble.iterations
    }

    /// HMAC from the last parse or serialization.
    pub fn hmac(&self) -> &[u8; HMAC_LEN] {
        &self.hmac
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// A serialized image together with the metadata it was written with.
struct Encoded {
    preamble: Preamble,
    header: Header,
    bytes: Vec<u8>,
    hmac: [u8; HMAC_LEN],
}

/// Write `bytes` to `path` through a verified temp file.
///
/// 1. Write and sync a temp file in the target's directory.
/// 2. Re-read the temp file and parse it with `password`.
/// 3. Rename the temp file over `path`.
///
/// If the re-parse fails the temp file is removed, the original file
/// is left as it was, and `SelfCheckFailed` is returned.
fn write_verified(path: &Path, bytes: &[u8], password: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| VaultError::CommandFailed(format!("{} is not a file path", path.display())))?
        .to_string_lossy();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{file_name}."))
        .suffix(".part")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    let written = fs::read(tmp.path())?;
    if let Err(e) = Vault::from_bytes(&written, password) {
        tracing::warn!(
            temp = %tmp.path().display(),
            error = %e,
            "saved vault failed verification, removing temp file"
        );
        tmp.close()?;
        return Err(VaultError::SelfCheckFailed(e.to_string()));
    }

    // Replaces any existing file in a single rename.
    tmp.persist(path).map_err(|e| VaultError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::vault::format::PREAMBLE_LEN;
    use tempfile::TempDir;

    fn part_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".part")
            })
            .count()
    }

    #[test]
    fn create_uses_requested_iterations() {
        let vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        assert_eq!(vault.iterations(), 10);
        assert_eq!(vault.record_count(), 0);
        assert!(vault.header().is_empty());
        assert_eq!(Vault::create(b"pw").unwrap().iterations(), DEFAULT_ITERATIONS);
    }

    #[test]
    fn to_bytes_stamps_header() {
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        let bytes = vault.to_bytes(b"pw").unwrap();
        let reopened = Vault::from_bytes(&bytes, b"pw").unwrap();
        assert_eq!(reopened.header().last_save_app().as_deref(), Some(APP_NAME));
        assert!(reopened.header().last_save_time().is_some());
        assert_eq!(reopened.hmac(), vault.hmac());
    }

    #[test]
    fn remove_record_out_of_range_is_none() {
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        vault.add_record(Record::create());
        assert!(vault.remove_record(5).is_none());
        assert!(vault.remove_record(0).is_some());
        assert_eq!(vault.record_count(), 0);
    }

    #[test]
    fn find_helpers() {
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        let mut record = Record::create();
        record.set_title("Mail");
        let uuid = record.uuid().unwrap();
        vault.add_record(record);

        assert_eq!(vault.find_by_title("Mail"), Some(0));
        assert_eq!(vault.find_by_title("Bank"), None);
        assert_eq!(vault.find_by_uuid(uuid), Some(0));
    }

    #[test]
    fn sort_records_orders_by_group_and_title() {
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        for title in ["b", "a"] {
            let mut record = Record::create();
            record.set_title(title);
            vault.add_record(record);
        }
        vault.sort_records();
        assert_eq!(vault.records()[0].title(), "a");
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.psafe3");
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        vault.save(&path, b"pw").unwrap();
        vault.save(&path, b"pw").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_verification_keeps_original_and_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.psafe3");
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        vault.add_record(Record::create());
        vault.save(&path, b"pw").unwrap();
        let original = fs::read(&path).unwrap();

        let mut corrupted = vault.to_bytes(b"pw").unwrap();
        corrupted[PREAMBLE_LEN + 3] ^= 0x10;

        let err = write_verified(&path, &corrupted, b"pw").err().unwrap();
        assert!(matches!(err, VaultError::SelfCheckFailed(_)));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(part_files(dir.path()), 0);
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn write_verified_replaces_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.psafe3");
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        let bytes = vault.to_bytes(b"pw").unwrap();

        write_verified(&path, &bytes, b"pw").unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(part_files(dir.path()), 0);
    }

    #[test]
    fn failed_save_leaves_vault_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("db.psafe3");
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        let check = vault.preamble.password_check;
        let hmac = *vault.hmac();

        assert!(vault.save(&path, b"new password").is_err());
        assert!(vault.header().is_empty());
        assert_eq!(vault.preamble.password_check, check);
        assert_eq!(vault.hmac(), &hmac);
    }

    #[test]
    fn successful_save_updates_stamp_and_check() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.psafe3");
        let mut vault = Vault::create_with_iterations(b"pw", 10).unwrap();
        let check = vault.preamble.password_check;

        vault.save(&path, b"new password").unwrap();
        assert_eq!(vault.header().len(), 2);
        assert_ne!(vault.preamble.password_check, check);
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = Vault::open(&dir.path().join("missing.psafe3"), b"pw");
        assert!(matches!(result, Err(VaultError::VaultNotFound(_))));
    }
}
