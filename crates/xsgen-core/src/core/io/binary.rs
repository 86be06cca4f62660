//! Framed binary container for cross-section libraries.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! [magic "XSLB": 4][version: 1][name len: 2][name: N]
//! [entry count: 4]
//! repeated: [id len: 1][id: N][payload len: 4][payload: N]
//! [crc32 of everything above: 4]
//! ```

use super::traits::LibraryFile;
use crate::core::library::xs_library::{XsData, XsLibrary};
use crate::core::models::ids::XsId;
use crc32fast::Hasher;
use std::io::{self, Read, Write};
use thiserror::Error;

pub const MAGIC: [u8; 4] = *b"XSLB";
const FORMAT_VERSION: u8 = 1;
const MAX_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Name of the library file kept for a given cycle.
pub fn cycle_library_file_name(cycle: u32) -> String {
    format!("ISOTXS-c{}", cycle)
}

/// Name of the library file a lattice physics run produces for one identifier.
pub fn xs_id_library_file_name(xs_id: &XsId) -> String {
    format!("ISO{}", xs_id)
}

#[derive(Debug, Error)]
pub enum LibraryIoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Not a cross-section library: expected magic {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: Vec<u8> },
    #[error("Unsupported library format version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },
    #[error("Library is truncated while reading {context}")]
    Truncated { context: &'static str },
    #[error("Invalid XS ID '{0}' in library")]
    InvalidXsId(String),
    #[error("XS ID '{0}' appears more than once in library")]
    DuplicateXsId(String),
    #[error("Payload of {size} bytes for XS ID '{xs_id}' exceeds the {max} byte limit")]
    PayloadTooLarge { xs_id: String, size: usize, max: usize },
    #[error("Library checksum mismatch: stored={stored:08x}, computed={computed:08x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("Library has {count} unexpected byte(s) after the last entry")]
    TrailingBytes { count: usize },
    #[error("Cannot encode library: {0}")]
    Encoding(String),
}

pub struct BinaryLibraryFile;

impl LibraryFile for BinaryLibraryFile {
    type Error = LibraryIoError;

    fn read_from(reader: &mut impl Read) -> Result<XsLibrary, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        decode(&bytes)
    }

    fn write_to(library: &XsLibrary, writer: &mut impl Write) -> Result<(), Self::Error> {
        let bytes = encode(library)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

/// Serializes a library into the framed container, checksum included.
pub fn encode(library: &XsLibrary) -> Result<Vec<u8>, LibraryIoError> {
    let name = library.name().as_bytes();
    let name_len = u16::try_from(name.len())
        .map_err(|_| LibraryIoError::Encoding(format!("name of {} bytes is too long", name.len())))?;
    let count = u32::try_from(library.len())
        .map_err(|_| LibraryIoError::Encoding("too many entries".to_string()))?;

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&name_len.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&count.to_le_bytes());

    for (xs_id, data) in library.entries() {
        let id = xs_id.as_str().as_bytes();
        let id_len = u8::try_from(id.len())
            .map_err(|_| LibraryIoError::Encoding(format!("XS ID '{}' is too long", xs_id)))?;
        if data.len() > MAX_PAYLOAD_BYTES {
            return Err(LibraryIoError::PayloadTooLarge {
                xs_id: xs_id.to_string(),
                size: data.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }
        out.push(id_len);
        out.extend_from_slice(id);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&data.payload);
    }

    let mut hasher = Hasher::new();
    hasher.update(&out);
    out.extend_from_slice(&hasher.finalize().to_le_bytes());
    Ok(out)
}

/// Parses a framed container, verifying the checksum before anything else.
pub fn decode(bytes: &[u8]) -> Result<XsLibrary, LibraryIoError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Err(LibraryIoError::BadMagic {
            expected: MAGIC,
            found: bytes.iter().take(MAGIC.len()).copied().collect(),
        });
    }
    if bytes.len() < MAGIC.len() + 1 + 4 {
        return Err(LibraryIoError::Truncated { context: "header" });
    }

    let (body, crc_bytes) = bytes.split_at(bytes.len() - 4);
    let stored = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let mut hasher = Hasher::new();
    hasher.update(body);
    let computed = hasher.finalize();
    if stored != computed {
        return Err(LibraryIoError::ChecksumMismatch { stored, computed });
    }

    let mut cursor = Cursor::new(&body[MAGIC.len()..]);
    let version = cursor.u8("version")?;
    if version != FORMAT_VERSION {
        return Err(LibraryIoError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let name_len = cursor.u16("name length")? as usize;
    let name = String::from_utf8_lossy(cursor.take(name_len, "name")?).into_owned();
    let count = cursor.u32("entry count")?;

    let mut library = XsLibrary::new(&name);
    for _ in 0..count {
        let id_len = cursor.u8("XS ID length")? as usize;
        let raw_id = String::from_utf8_lossy(cursor.take(id_len, "XS ID")?).into_owned();
        let xs_id: XsId = raw_id
            .parse()
            .map_err(|_| LibraryIoError::InvalidXsId(raw_id.clone()))?;
        let payload_len = cursor.u32("payload length")? as usize;
        if payload_len > MAX_PAYLOAD_BYTES {
            return Err(LibraryIoError::PayloadTooLarge {
                xs_id: raw_id,
                size: payload_len,
                max: MAX_PAYLOAD_BYTES,
            });
        }
        let payload = cursor.take(payload_len, "payload")?.to_vec();
        if library.insert(xs_id, XsData::new(payload)).is_some() {
            return Err(LibraryIoError::DuplicateXsId(raw_id));
        }
    }

    let count = cursor.remaining();
    if count > 0 {
        return Err(LibraryIoError::TrailingBytes { count });
    }
    Ok(library)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], LibraryIoError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(LibraryIoError::Truncated { context })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self, context: &'static str) -> Result<u8, LibraryIoError> {
        Ok(self.take(1, context)?[0])
    }

    fn u16(&mut self, context: &'static str) -> Result<u16, LibraryIoError> {
        let b = self.take(2, context)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, context: &'static str) -> Result<u32, LibraryIoError> {
        let b = self.take(4, context)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}
