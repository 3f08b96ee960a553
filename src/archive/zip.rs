/*!
 * Minimal ZIP writer.
 *
 * Entries are stored uncompressed with zeroed timestamps, so the same
 * entries always produce the same archive bytes. Names are UTF-8 (flag bit
 * 11) and are repeated in an Info-ZIP Unicode Path extra field for older
 * extractors. ZIP64 is not supported.
 */

use std::collections::HashSet;
use std::io::Write;

use crate::errors::ArchiveError;

const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_FILE_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;

const VERSION_MADE_BY: u16 = 0x003F; // 6.3, MS-DOS attributes
const VERSION_NEEDED: u16 = 10; // 1.0, stored entries
const FLAG_UTF8_NAMES: u16 = 1 << 11;
const METHOD_STORED: u16 = 0;
const INTERNAL_ATTR_TEXT: u16 = 0x0001;

const UNICODE_PATH_EXTRA_ID: u16 = 0x7075;
const UNICODE_PATH_VERSION: u8 = 1;

/// Largest entry count a classic end of central directory record can hold
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// Central directory bookkeeping for one written entry
struct EntryRecord {
    name: String,
    offset: u32,
    size: u32,
    crc32: u32,
}

impl EntryRecord {
    /// Info-ZIP Unicode Path extra field for this entry's name
    fn unicode_path_field(&self) -> Vec<u8> {
        let name = self.name.as_bytes();
        let mut field = Vec::with_capacity(name.len() + 9);
        field.extend_from_slice(&UNICODE_PATH_EXTRA_ID.to_le_bytes());
        field.extend_from_slice(&((name.len() + 5) as u16).to_le_bytes());
        field.push(UNICODE_PATH_VERSION);
        field.extend_from_slice(&crc32fast::hash(name).to_le_bytes());
        field.extend_from_slice(name);
        field
    }

    /// Fields shared by the local and central headers, from "version needed" to the extra length
    fn common_fields(&self, out: &mut Vec<u8>, extra_len: u16) {
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        out.extend_from_slice(&FLAG_UTF8_NAMES.to_le_bytes());
        out.extend_from_slice(&METHOD_STORED.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // mod time
        out.extend_from_slice(&0u16.to_le_bytes()); // mod date
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes()); // compressed
        out.extend_from_slice(&self.size.to_le_bytes()); // uncompressed
        out.extend_from_slice(&(self.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&extra_len.to_le_bytes());
    }

    fn local_header(&self) -> Vec<u8> {
        let extra = self.unicode_path_field();
        let mut out = Vec::with_capacity(30 + self.name.len() + extra.len());
        out.extend_from_slice(&LOCAL_FILE_HEADER_SIGNATURE.to_le_bytes());
        self.common_fields(&mut out, extra.len() as u16);
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(&extra);
        out
    }

    fn central_header(&self) -> Vec<u8> {
        let extra = self.unicode_path_field();
        let mut out = Vec::with_capacity(46 + self.name.len() + extra.len());
        out.extend_from_slice(&CENTRAL_FILE_HEADER_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&VERSION_MADE_BY.to_le_bytes());
        self.common_fields(&mut out, extra.len() as u16);
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number start
        out.extend_from_slice(&INTERNAL_ATTR_TEXT.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // external attributes
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(&extra);
        out
    }
}

/// Streams stored entries into any writer
pub struct ZipWriter<W: Write> {
    writer: W,
    entries: Vec<EntryRecord>,
    names: HashSet<String>,
    cursor: u64,
}

impl<W: Write> ZipWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries: Vec::new(),
            names: HashSet::new(),
            cursor: 0,
        }
    }

    /// Number of entries written so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one stored entry
    pub fn add_entry(&mut self, name: &str, content: &[u8]) -> Result<(), ArchiveError> {
        if self.names.contains(name) {
            return Err(ArchiveError::NameCollision(name.to_string()));
        }
        if self.entries.len() >= MAX_ENTRIES {
            return Err(ArchiveError::TooManyEntries(self.entries.len() + 1));
        }
        if name.len() > u16::MAX as usize - 9 {
            return Err(ArchiveError::TooLarge(name.to_string()));
        }
        let size = u32::try_from(content.len()).map_err(|_| ArchiveError::TooLarge(name.to_string()))?;
        let offset = u32::try_from(self.cursor).map_err(|_| ArchiveError::TooLarge(name.to_string()))?;

        let record = EntryRecord {
            name: name.to_string(),
            offset,
            size,
            crc32: crc32fast::hash(content),
        };

        let header = record.local_header();
        self.writer.write_all(&header)?;
        self.writer.write_all(content)?;
        self.cursor += (header.len() + content.len()) as u64;

        self.names.insert(record.name.clone());
        self.entries.push(record);
        Ok(())
    }

    /// Write the central directory and return the underlying writer
    pub fn finish(mut self) -> Result<W, ArchiveError> {
        let central_offset = u32::try_from(self.cursor)
            .map_err(|_| ArchiveError::TooLarge("central directory".to_string()))?;

        let mut central_size: u64 = 0;
        for entry in &self.entries {
            let header = entry.central_header();
            self.writer.write_all(&header)?;
            central_size += header.len() as u64;
        }
        let central_size = u32::try_from(central_size)
            .map_err(|_| ArchiveError::TooLarge("central directory".to_string()))?;

        let count = (self.entries.len() as u16).to_le_bytes();
        let mut eocd = Vec::with_capacity(22);
        eocd.extend_from_slice(&END_OF_CENTRAL_DIR_SIGNATURE.to_le_bytes());
        eocd.extend_from_slice(&0u16.to_le_bytes()); // this disk
        eocd.extend_from_slice(&0u16.to_le_bytes()); // disk with central directory
        eocd.extend_from_slice(&count); // entries on this disk
        eocd.extend_from_slice(&count); // entries total
        eocd.extend_from_slice(&central_size.to_le_bytes());
        eocd.extend_from_slice(&central_offset.to_le_bytes());
        eocd.extend_from_slice(&0u16.to_le_bytes()); // comment length
        self.writer.write_all(&eocd)?;
        self.writer.flush()?;

        Ok(self.writer)
    }
}
