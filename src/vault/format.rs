//! Binary vault file format and HMAC integrity verification.
//!
//! A vault file has this layout (all integers little-endian):
//!
//! ```text
//! [TAG: 4][SALT: 32][ITER: 4][H(P'): 32][B1..B4: 4 x 16][IV: 16]
//! [encrypted fields: header... 0xFF record... 0xFF record... 0xFF]
//! [EOF marker: 16][HMAC-SHA256: 32]
//! ```
//!
//! - **TAG** (`PWS3`): identifies the format version.
//! - **SALT / ITER**: inputs to password stretching.
//! - **H(P')**: SHA-256 of the stretched password, checked before any
//!   decryption is attempted.
//! - **B1..B4**: ECB-wrapped CBC key `K` and HMAC key `L`.
//! - **IV**: initial CBC state for the field stream.
//! - **EOF marker**: a plaintext constant ending the field stream.
//! - **HMAC**: keyed with `L` over the plaintext value of every field.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::field::{ByteReader, Field, FieldReader, FieldWriter};
use super::header::Header;
use super::record::Record;
use crate::crypto::keys::{KeyBlocks, StretchedKey};
use crate::crypto::stretch::{verify_password_check, DIGEST_LEN, SALT_LEN};
use crate::crypto::{Block, TwofishCbc, BLOCK_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Size of the HMAC tag appended to the file (SHA-256 = 32 bytes).
pub const HMAC_LEN: usize = 32;

/// Fixed-size preamble: tag + salt + iter + H(P') + B1..B4 + IV.
pub const PREAMBLE_LEN: usize = 4 + SALT_LEN + 4 + DIGEST_LEN + 4 * BLOCK_LEN + BLOCK_LEN;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// FormatVersion
// ---------------------------------------------------------------------------

/// On-disk format variants this crate can read and write.
///
/// Multi-password (`PWS4`) files are recognised but rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatVersion {
    #[default]
    V3,
}

impl FormatVersion {
    /// Magic bytes at the start of the file.
    pub fn tag(self) -> &'static [u8; 4] {
        match self {
            Self::V3 => b"PWS3",
        }
    }

    /// Plaintext block that terminates the encrypted field stream.
    pub fn end_marker(self) -> &'static Block {
        match self {
            Self::V3 => b"PWS3-EOFPWS3-EOF",
        }
    }

    /// Identify the format from the leading magic bytes.
    pub fn from_tag(tag: &[u8; 4]) -> Result<Self> {
        match tag {
            b"PWS3" => Ok(Self::V3),
            b"PWS4" => Err(VaultError::UnsupportedVersion(
                "multi-password (PWS4) vaults are not supported".into(),
            )),
            _ => Err(VaultError::UnsupportedVersion(
                "not a Password Safe V3 file".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Preamble
// ---------------------------------------------------------------------------

/// The unencrypted fields at the start of a vault file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub version: FormatVersion,
    pub salt: [u8; SALT_LEN],
    pub iterations: u32,
    /// SHA-256 of the stretched password.
    pub password_check: [u8; DIGEST_LEN],
    pub key_blocks: KeyBlocks,
    pub iv: Block,
}

impl Preamble {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.version.tag());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iterations.to_le_bytes());
        out.extend_from_slice(&self.password_check);
        for block in &self.key_blocks {
            out.extend_from_slice(block);
        }
        out.extend_from_slice(&self.iv);
    }
}

/// Everything recovered from a successfully verified vault image.
pub struct ParsedVault {
    pub preamble: Preamble,
    pub header: Header,
    pub records: Vec<Record>,
    pub hmac: [u8; HMAC_LEN],
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse and verify a vault image.
///
/// Steps are strictly ordered: the magic tag, then the password check
/// (before anything is decrypted), then the field stream, then the HMAC.
/// Records are sorted for presentation only after integrity is confirmed.
pub fn parse(data: &[u8], password: &[u8]) -> Result<ParsedVault> {
    let mut input = ByteReader::new(data);

    // --- Unencrypted preamble ---

    let tag = input.take_array::<4>("version tag")?;
    let version = FormatVersion::from_tag(&tag)?;
    let salt = input.take_array::<SALT_LEN>("salt")?;
    let iterations = input.read_u32_le("iteration count")?;
    let password_check = input.take_array::<DIGEST_LEN>("password check")?;

    let stretched = StretchedKey::derive(password, &salt, iterations);
    if !verify_password_check(stretched.as_bytes(), &password_check) {
        return Err(VaultError::BadPassword);
    }

    let mut key_blocks: KeyBlocks = [[0u8; BLOCK_LEN]; 4];
    for block in key_blocks.iter_mut() {
        *block = input.take_array::<BLOCK_LEN>("key block")?;
    }
    let iv = input.take_array::<BLOCK_LEN>("initialization vector")?;

    let keys = stretched.unwrap_key_blocks(&key_blocks)?;
    let mut mac = new_mac(keys.hmac_key())?;
    let mut fields = FieldReader::new(
        TwofishCbc::new(keys.cbc_key(), &iv)?,
        *version.end_marker(),
    );

    // --- Header fields, up to the first separator ---

    let mut header = Header::new();
    loop {
        match fields.read_field(&mut input)? {
            None => {
                return Err(VaultError::InvalidFormat(
                    "end of data reached inside the header".into(),
                ))
            }
            Some(field) if field.is_end_of_entry() => break,
            Some(field) => {
                mac.update(field.value());
                header.add_raw_field(field);
            }
        }
    }

    // --- Records, each terminated by a separator ---

    let mut records = Vec::new();
    let mut current = Record::new();
    let mut pending = false;
    while let Some(field) = fields.read_field(&mut input)? {
        if field.is_end_of_entry() {
            records.push(std::mem::take(&mut current));
            pending = false;
        } else {
            mac.update(field.value());
            current.add_raw_field(field);
            pending = true;
        }
    }
    if pending {
        return Err(VaultError::InvalidFormat(
            "last record is not terminated".into(),
        ));
    }

    // --- Integrity ---

    let hmac = input.take_array::<HMAC_LEN>("HMAC")?;
    mac.verify_slice(&hmac)
        .map_err(|_| VaultError::HmacMismatch)?;

    if input.remaining() > 0 {
        tracing::warn!(
            trailing = input.remaining(),
            "ignoring data after the vault HMAC"
        );
    }

    records.sort_by(|a, b| a.display_order(b));
    tracing::debug!(
        records = records.len(),
        header_fields = header.len(),
        "vault parsed and verified"
    );

    Ok(ParsedVault {
        preamble: Preamble {
            version,
            salt,
            iterations,
            password_check,
            key_blocks,
            iv,
        },
        header,
        records,
        hmac,
    })
}

/// Serialize a vault image.
///
/// `stretched` must be derived from the password being saved with, and
/// `preamble.password_check` must already match it.  The key blocks are
/// unwrapped with `stretched` exactly as `parse` will unwrap them.
pub fn serialize(
    preamble: &Preamble,
    stretched: &StretchedKey,
    header: &Header,
    records: &[Record],
) -> Result<(Vec<u8>, [u8; HMAC_LEN])> {
    let mut out = Vec::with_capacity(PREAMBLE_LEN + 64 * (records.len() + 2));
    preamble.write_to(&mut out);

    let keys = stretched.unwrap_key_blocks(&preamble.key_blocks)?;
    let mut mac = new_mac(keys.hmac_key())?;
    let mut writer = FieldWriter::new(TwofishCbc::new(keys.cbc_key(), &preamble.iv)?);
    let separator = Field::end_of_entry();

    for field in header.raw_fields() {
        writer.write_field(&mut out, field)?;
        mac.update(field.value());
    }
    writer.write_field(&mut out, &separator)?;
    mac.update(separator.value());

    for record in records {
        for field in record.raw_fields() {
            writer.write_field(&mut out, field)?;
            mac.update(field.value());
        }
        writer.write_field(&mut out, &separator)?;
        mac.update(separator.value());
    }

    out.extend_from_slice(preamble.version.end_marker());

    let hmac: [u8; HMAC_LEN] = mac.finalize().into_bytes().into();
    out.extend_from_slice(&hmac);

    Ok((out, hmac))
}

/// HMAC-SHA256 of an empty message under `hmac_key`.
pub fn empty_hmac(hmac_key: &[u8]) -> Result<[u8; HMAC_LEN]> {
    Ok(new_mac(hmac_key)?.finalize().into_bytes().into())
}

fn new_mac(hmac_key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(hmac_key)
        .map_err(|e| VaultError::InvalidFormat(format!("invalid HMAC key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::stretch::random_bytes;

    fn preamble_for(password: &[u8]) -> (Preamble, StretchedKey) {
        let salt = random_bytes::<SALT_LEN>();
        let stretched = StretchedKey::derive(password, &salt, 8);
        let raw: KeyBlocks = [random_bytes(), random_bytes(), random_bytes(), random_bytes()];
        let preamble = Preamble {
            version: FormatVersion::V3,
            salt,
            iterations: 8,
            password_check: stretched.password_check(),
            key_blocks: stretched.wrap_key_blocks(&raw).unwrap(),
            iv: random_bytes(),
        };
        (preamble, stretched)
    }

    fn sample_record(title: &str) -> Record {
        let mut record = Record::create();
        record.set_title(title);
        record.set_passwd("pw");
        record
    }

    #[test]
    fn preamble_length_matches_layout() {
        let (preamble, _) = preamble_for(b"pw");
        let mut out = Vec::new();
        preamble.write_to(&mut out);
        assert_eq!(out.len(), PREAMBLE_LEN);
        assert_eq!(PREAMBLE_LEN, 152);
    }

    #[test]
    fn serialize_then_parse() {
        let (preamble, stretched) = preamble_for(b"pw");
        let mut header = Header::new();
        header.stamp_save(1_700_000_000, "test");
        let records = vec![sample_record("b"), sample_record("a")];

        let (bytes, hmac) = serialize(&preamble, &stretched, &header, &records).unwrap();
        assert_eq!(&bytes[bytes.len() - HMAC_LEN..], &hmac);

        let parsed = parse(&bytes, b"pw").unwrap();
        assert_eq!(parsed.preamble, preamble);
        assert_eq!(parsed.header, header);
        assert_eq!(parsed.hmac, hmac);
        // Sorted by group + title after parsing.
        assert_eq!(parsed.records[0], records[1]);
        assert_eq!(parsed.records[1], records[0]);
    }

    #[test]
    fn end_marker_precedes_hmac() {
        let (preamble, stretched) = preamble_for(b"pw");
        let (bytes, _) = serialize(&preamble, &stretched, &Header::new(), &[]).unwrap();
        let marker_at = bytes.len() - HMAC_LEN - BLOCK_LEN;
        assert_eq!(&bytes[marker_at..marker_at + BLOCK_LEN], b"PWS3-EOFPWS3-EOF");
        // Preamble, one header separator block, marker, HMAC.
        assert_eq!(bytes.len(), PREAMBLE_LEN + BLOCK_LEN + BLOCK_LEN + HMAC_LEN);
    }

    #[test]
    fn wrong_tag_is_version_error() {
        let (preamble, stretched) = preamble_for(b"pw");
        let (mut bytes, _) = serialize(&preamble, &stretched, &Header::new(), &[]).unwrap();
        bytes[..4].copy_from_slice(b"ABCD");
        assert!(matches!(
            parse(&bytes, b"pw"),
            Err(VaultError::UnsupportedVersion(_))
        ));
        bytes[..4].copy_from_slice(b"PWS4");
        assert!(matches!(
            parse(&bytes, b"pw"),
            Err(VaultError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn password_is_checked_before_key_blocks_are_read() {
        let (preamble, stretched) = preamble_for(b"pw");
        let (bytes, _) = serialize(&preamble, &stretched, &Header::new(), &[]).unwrap();
        // Only tag, salt, iter and H(P') present.
        let cut = &bytes[..4 + SALT_LEN + 4 + DIGEST_LEN];
        assert!(matches!(parse(cut, b"other"), Err(VaultError::BadPassword)));
        assert!(matches!(parse(cut, b"pw"), Err(VaultError::InvalidFormat(_))));
    }

    #[test]
    fn unterminated_record_is_rejected() {
        let (preamble, stretched) = preamble_for(b"pw");
        let keys = stretched.unwrap_key_blocks(&preamble.key_blocks).unwrap();
        let mut out = Vec::new();
        preamble.write_to(&mut out);
        let mut writer = FieldWriter::new(TwofishCbc::new(keys.cbc_key(), &preamble.iv).unwrap());
        writer.write_field(&mut out, &Field::end_of_entry()).unwrap();
        writer
            .write_field(&mut out, &Field::new(0x03, b"dangling".to_vec()))
            .unwrap();
        out.extend_from_slice(FormatVersion::V3.end_marker());
        out.extend_from_slice(&[0u8; HMAC_LEN]);

        assert!(matches!(parse(&out, b"pw"), Err(VaultError::InvalidFormat(_))));
    }

    #[test]
    fn unknown_record_fields_survive() {
        let (preamble, stretched) = preamble_for(b"pw");
        let mut record = sample_record("x");
        record.add_raw_field(Field::new(0x14, b"custom".to_vec()));
        let (bytes, _) = serialize(&preamble, &stretched, &Header::new(), &[record]).unwrap();

        let parsed = parse(&bytes, b"pw").unwrap();
        assert_eq!(parsed.records[0].raw_field(0x14).unwrap().value(), b"custom");
    }

    #[test]
    fn empty_hmac_matches_serialized_empty_stream() {
        let (preamble, stretched) = preamble_for(b"pw");
        let keys = stretched.unwrap_key_blocks(&preamble.key_blocks).unwrap();
        let (_, hmac) = serialize(&preamble, &stretched, &Header::new(), &[]).unwrap();
        assert_eq!(empty_hmac(keys.hmac_key()).unwrap(), hmac);
    }
}
