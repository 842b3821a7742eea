//! Vault-level metadata fields.
//!
//! Only the two "last save" fields are interpreted; every other header
//! field is carried through a read/write cycle untouched.

use super::field::{Field, FieldMap};

/// Header field type: time of last save (u32 LE, unix seconds).
pub const LAST_SAVE_TIME: u8 = 0x04;

/// Header field type: name and version of the application that last saved.
pub const LAST_SAVE_APP: u8 = 0x06;

/// The fields preceding the first record separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: FieldMap,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw field, replacing any earlier field of the same type.
    pub fn add_raw_field(&mut self, field: Field) {
        self.fields.insert(field.field_type(), field);
    }

    pub fn raw_field(&self, field_type: u8) -> Option<&Field> {
        self.fields.get(&field_type)
    }

    pub fn raw_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Unix time of the last save, if recorded.
    pub fn last_save_time(&self) -> Option<u32> {
        let value = self.raw_field(LAST_SAVE_TIME)?.value();
        let bytes: [u8; 4] = value.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// Application that last saved the vault, if recorded.
    pub fn last_save_app(&self) -> Option<String> {
        self.raw_field(LAST_SAVE_APP)
            .map(|f| String::from_utf8_lossy(f.value()).into_owned())
    }

    /// Overwrite both save-stamp fields.
    pub fn stamp_save(&mut self, time: u32, app: &str) {
        self.add_raw_field(Field::new(LAST_SAVE_TIME, time.to_le_bytes().to_vec()));
        self.add_raw_field(Field::new(LAST_SAVE_APP, app.as_bytes().to_vec()));
    }
}
