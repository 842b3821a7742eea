//! Password records.
//!
//! A `Record` keeps the raw fields it was read from (so unknown field types
//! survive a save) alongside decoded copies of the well-known ones.
//!
//! Every setter rewrites the matching raw field and then marks the record
//! modified: `last_mod` becomes the current time, or stays put if it is
//! already later.  `set_last_mod` is the only setter that does not touch
//! the timestamp a second time.

use std::cmp::Ordering;

use chrono::Utc;
use uuid::Uuid;
use zeroize::Zeroize;

use super::field::{Field, FieldMap};

/// Record field types.
pub mod field_type {
    pub const UUID: u8 = 0x01;
    pub const GROUP: u8 = 0x02;
    pub const TITLE: u8 = 0x03;
    pub const USER: u8 = 0x04;
    pub const NOTES: u8 = 0x05;
    pub const PASSWORD: u8 = 0x06;
    pub const LAST_MODIFIED: u8 = 0x0c;
    pub const URL: u8 = 0x0d;
}

/// A single password entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: FieldMap,
    uuid: Option<Uuid>,
    group: String,
    title: String,
    user: String,
    notes: String,
    passwd: String,
    last_mod: u32,
    url: String,
}

impl Record {
    /// An empty record with no UUID, used while decoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh record with a random UUID, stamped with the current time.
    pub fn create() -> Self {
        let mut record = Self::new();
        record.set_uuid(Uuid::new_v4());
        record.set_last_mod(now());
        record
    }

    /// Build a record from raw fields, decoding the well-known ones.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Self {
        let mut record = Self::new();
        for field in fields {
            record.add_raw_field(field.clone());
        }
        record
    }

    /// Store a raw field (last one wins) and refresh its decoded value.
    ///
    /// Does not change `last_mod` unless the field is itself the
    /// last-modified field.
    pub fn add_raw_field(&mut self, field: Field) {
        let value = field.value();
        match field.field_type() {
            field_type::UUID => {
                self.uuid = <[u8; 16]>::try_from(value).ok().map(Uuid::from_bytes_le);
            }
            field_type::GROUP => self.group = decode_text(value),
            field_type::TITLE => self.title = decode_text(value),
            field_type::USER => self.user = decode_text(value),
            field_type::NOTES => self.notes = decode_text(value),
            field_type::PASSWORD => {
                self.passwd.zeroize();
                self.passwd = decode_text(value);
            }
            field_type::LAST_MODIFIED => {
                if let Ok(bytes) = <[u8; 4]>::try_from(value) {
                    self.last_mod = u32::from_le_bytes(bytes);
                }
            }
            field_type::URL => self.url = decode_text(value),
            _ => {}
        }
        self.fields.insert(field.field_type(), field);
    }

    pub fn raw_field(&self, field_type: u8) -> Option<&Field> {
        self.fields.get(&field_type)
    }

    /// Raw fields in type-code order.
    pub fn raw_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn passwd(&self) -> &str {
        &self.passwd
    }

    /// Last modification time in unix seconds (0 if never recorded).
    pub fn last_mod(&self) -> u32 {
        self.last_mod
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // ------------------------------------------------------------------
    // Setters (all but set_last_mod mark the record modified)
    // ------------------------------------------------------------------

    pub fn set_uuid(&mut self, uuid: Uuid) {
        self.add_raw_field(Field::new(field_type::UUID, uuid.to_bytes_le().to_vec()));
        self.mark_modified();
    }

    pub fn set_group(&mut self, group: &str) {
        self.set_text(field_type::GROUP, group);
    }

    pub fn set_title(&mut self, title: &str) {
        self.set_text(field_type::TITLE, title);
    }

    pub fn set_user(&mut self, user: &str) {
        self.set_text(field_type::USER, user);
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.set_text(field_type::NOTES, notes);
    }

    pub fn set_passwd(&mut self, passwd: &str) {
        self.set_text(field_type::PASSWORD, passwd);
    }

    pub fn set_url(&mut self, url: &str) {
        self.set_text(field_type::URL, url);
    }

    pub fn set_last_mod(&mut self, last_mod: u32) {
        self.add_raw_field(Field::new(
            field_type::LAST_MODIFIED,
            last_mod.to_le_bytes().to_vec(),
        ));
    }

    /// Stamp `last_mod` with the current time, never moving it backwards.
    pub fn mark_modified(&mut self) {
        let stamp = now().max(self.last_mod);
        self.set_last_mod(stamp);
    }

    fn set_text(&mut self, field_type: u8, value: &str) {
        self.add_raw_field(Field::new(field_type, value.as_bytes().to_vec()));
        self.mark_modified();
    }

    // ------------------------------------------------------------------
    // Comparison helpers
    // ------------------------------------------------------------------

    /// Whether `other` is the same entry: matching UUIDs when both have one,
    /// otherwise matching titles.
    pub fn is_corresponding(&self, other: &Record) -> bool {
        match (self.uuid, other.uuid) {
            (Some(a), Some(b)) => a == b,
            _ => self.title == other.title,
        }
    }

    /// Whether this record was modified strictly later than `other`.
    pub fn is_newer_than(&self, other: &Record) -> bool {
        self.last_mod > other.last_mod
    }

    /// Replace every field of this record with those of `other`.
    pub fn merge_from(&mut self, other: &Record) {
        *self = Record::from_fields(other.raw_fields());
    }

    /// Presentation order: group followed by title, byte-wise ascending.
    pub fn display_order(&self, other: &Record) -> Ordering {
        self.group
            .bytes()
            .chain(self.title.bytes())
            .cmp(other.group.bytes().chain(other.title.bytes()))
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        self.passwd.zeroize();
    }
}

fn decode_text(value: &[u8]) -> String {
    String::from_utf8_lossy(value).into_owned()
}

/// Current unix time, clamped to the u32 range used on disk.
pub(crate) fn now() -> u32 {
    u32::try_from(Utc::now().timestamp().max(0)).unwrap_or(u32::MAX)
}
