//! Raw fields and the encrypted TLV field stream.
//!
//! Once decrypted, every field is laid out as
//!
//! ```text
//! [length: 4 bytes LE][type: 1 byte][value: length bytes][random padding to 16]
//! ```
//!
//! and the padded buffer is encrypted with the stream's shared CBC state.
//! A zero-length field of type `0xFF` separates the header from the first
//! record and each record from the next.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::stretch::fill_random;
use crate::crypto::{Block, TwofishCbc, BLOCK_LEN};
use crate::errors::{Result, VaultError};

/// Type code of the separator field that ends the header and each record.
pub const END_OF_ENTRY: u8 = 0xFF;

/// Bytes taken by the length and type prefix of an encoded field.
const PREFIX_LEN: usize = 5;

/// Fields of a header or record, keyed by type code.
///
/// Ordered by type code so that serialization is deterministic.
pub type FieldMap = BTreeMap<u8, Field>;

/// The raw, on-disk representation of a single field.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Field {
    field_type: u8,
    value: Vec<u8>,
}

impl Field {
    pub fn new(field_type: u8, value: impl Into<Vec<u8>>) -> Self {
        Self {
            field_type,
            value: value.into(),
        }
    }

    /// The `0xFF` record separator.
    pub fn end_of_entry() -> Self {
        Self::new(END_OF_ENTRY, Vec::new())
    }

    pub fn field_type(&self) -> u8 {
        self.field_type
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Length of the value in bytes.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_end_of_entry(&self) -> bool {
        self.field_type == END_OF_ENTRY
    }
}

// Values may hold passwords; only show type and length.
impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("type", &format_args!("{:#04x}", self.field_type))
            .field("len", &self.value.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Sequential reader over an in-memory vault image.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the next `len` bytes, or fail with a truncation error naming `what`.
    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(VaultError::InvalidFormat(format!(
                "unexpected end of file while reading {what}"
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    pub fn read_u32_le(&mut self, what: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array(what)?))
    }
}

// ---------------------------------------------------------------------------
// FieldReader / FieldWriter
// ---------------------------------------------------------------------------

/// Decodes fields from the encrypted stream until the end-of-stream marker.
pub struct FieldReader {
    cipher: TwofishCbc,
    end_marker: Block,
}

impl FieldReader {
    pub fn new(cipher: TwofishCbc, end_marker: Block) -> Self {
        Self { cipher, end_marker }
    }

    /// Read the next field.
    ///
    /// Returns `Ok(None)` once the plaintext end-of-stream marker is reached.
    pub fn read_field(&mut self, input: &mut ByteReader<'_>) -> Result<Option<Field>> {
        let first = input.take(BLOCK_LEN, "record field")?;
        if first == &self.end_marker[..] {
            return Ok(None);
        }

        let mut plain = Zeroizing::new(self.cipher.decrypt(first)?);
        let raw_len = u32::from_le_bytes([plain[0], plain[1], plain[2], plain[3]]);
        let field_type = plain[4];
        let len = usize::try_from(raw_len).map_err(|_| {
            VaultError::InvalidFormat(format!(
                "field length {raw_len} exceeds platform address space"
            ))
        })?;

        if len > BLOCK_LEN - PREFIX_LEN {
            // floor((len + 4) / 16) == ceil((len + 5) / 16) - 1
            let extra_blocks = len
                .checked_add(PREFIX_LEN - 1)
                .map(|n| n / BLOCK_LEN)
                .ok_or_else(|| VaultError::InvalidFormat("field length overflow".into()))?;
            let extra_len = extra_blocks
                .checked_mul(BLOCK_LEN)
                .ok_or_else(|| VaultError::InvalidFormat("field length overflow".into()))?;
            let rest = input.take(extra_len, "record field")?;
            plain.extend_from_slice(&Zeroizing::new(self.cipher.decrypt(rest)?));
        }

        let value = plain[PREFIX_LEN..PREFIX_LEN + len].to_vec();
        let field = Field::new(field_type, value);

        if field.is_end_of_entry() && !field.is_empty() {
            return Err(VaultError::InvalidFormat(format!(
                "end-of-entry field carries {} bytes of data",
                field.len()
            )));
        }
        Ok(Some(field))
    }
}

/// Encodes fields into the encrypted stream.
pub struct FieldWriter {
    cipher: TwofishCbc,
}

impl FieldWriter {
    pub fn new(cipher: TwofishCbc) -> Self {
        Self { cipher }
    }

    /// Append one encrypted, randomly padded field to `out`.
    pub fn write_field(&mut self, out: &mut Vec<u8>, field: &Field) -> Result<()> {
        let raw_len = u32::try_from(field.len()).map_err(|_| {
            VaultError::SerializationError(format!(
                "field value of {} bytes exceeds u32::MAX",
                field.len()
            ))
        })?;

        let mut data = Zeroizing::new(Vec::with_capacity(PREFIX_LEN + field.len() + BLOCK_LEN));
        data.extend_from_slice(&raw_len.to_le_bytes());
        data.push(field.field_type());
        data.extend_from_slice(field.value());

        let partial = data.len() % BLOCK_LEN;
        if partial != 0 {
            let start = data.len();
            data.resize(start + BLOCK_LEN - partial, 0);
            fill_random(&mut data[start..]);
        }

        out.extend_from_slice(&self.cipher.encrypt(&data)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x33; 32];
    const IV: Block = [0x44; 16];
    const EOF_MARKER: &Block = b"TEST-EOFTEST-EOF";

    fn encode(fields: &[Field]) -> Vec<u8> {
        let mut writer = FieldWriter::new(TwofishCbc::new(&KEY, &IV).unwrap());
        let mut out = Vec::new();
        for f in fields {
            writer.write_field(&mut out, f).unwrap();
        }
        out.extend_from_slice(EOF_MARKER);
        out
    }

    fn decode(data: &[u8]) -> Result<Vec<Field>> {
        let mut reader = FieldReader::new(TwofishCbc::new(&KEY, &IV).unwrap(), *EOF_MARKER);
        let mut input = ByteReader::new(data);
        let mut fields = Vec::new();
        while let Some(f) = reader.read_field(&mut input)? {
            fields.push(f);
        }
        Ok(fields)
    }

    #[test]
    fn encoded_fields_are_block_aligned() {
        // 5 + 0 -> 16, 5 + 11 -> 16, 5 + 12 -> 32, 5 + 27 -> 32, 5 + 28 -> 48
        for (len, blocks) in [(0usize, 1usize), (11, 1), (12, 2), (27, 2), (28, 3)] {
            let data = encode(&[Field::new(0x05, vec![b'x'; len])]);
            assert_eq!(data.len(), blocks * BLOCK_LEN + EOF_MARKER.len(), "len {len}");
        }
    }

    #[test]
    fn decodes_fields_across_block_boundaries() {
        let fields = vec![
            Field::new(0x03, b"short".to_vec()),
            Field::new(0x05, vec![0xAB; 11]),
            Field::new(0x05, vec![0xCD; 12]),
            Field::new(0x05, vec![0xEF; 27]),
            Field::new(0x05, vec![0x01; 300]),
            Field::end_of_entry(),
        ];
        assert_eq!(decode(&encode(&fields)).unwrap(), fields);
    }

    #[test]
    fn padding_is_random() {
        let field = Field::new(0x03, b"abc".to_vec());
        assert_ne!(encode(&[field.clone()]), encode(&[field]));
    }

    #[test]
    fn truncated_stream_is_format_error() {
        let data = encode(&[Field::new(0x05, vec![1u8; 40])]);
        // Drop the end marker and the last block of the field.
        let cut = &data[..data.len() - EOF_MARKER.len() - BLOCK_LEN];
        assert!(matches!(decode(cut), Err(VaultError::InvalidFormat(_))));
    }

    #[test]
    fn partial_block_is_format_error() {
        assert!(matches!(decode(&[0u8; 10]), Err(VaultError::InvalidFormat(_))));
    }

    #[test]
    fn separator_with_payload_is_rejected() {
        let data = encode(&[Field::new(END_OF_ENTRY, b"oops".to_vec())]);
        assert!(matches!(decode(&data), Err(VaultError::InvalidFormat(_))));
    }

    #[test]
    fn debug_output_hides_value() {
        let field = Field::new(0x06, b"s3cret".to_vec());
        let shown = format!("{field:?}");
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("0x06"));
    }

    #[test]
    fn byte_reader_tracks_position() {
        let mut r = ByteReader::new(&[1, 0, 0, 0, 9]);
        assert_eq!(r.read_u32_le("n").unwrap(), 1);
        assert_eq!(r.position(), 4);
        assert_eq!(r.remaining(), 1);
        assert!(r.take(2, "tail").is_err());
    }
}
