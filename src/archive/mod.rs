/*!
 * Packaging of bulk conversion results.
 *
 * - `zip`: stored-entry ZIP writer
 *
 * Output names are derived from input names and made unique in input order,
 * so the same batch always yields the same archive layout.
 */

use std::collections::HashSet;
use log::debug;

use crate::errors::ArchiveError;

pub mod zip;

pub use self::zip::ZipWriter;

const SCRIPT_EXTENSIONS: [&str; 2] = [".ass", ".ssa"];

/// Stem of an input name: last path component without a script extension
fn entry_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let stem = SCRIPT_EXTENSIONS
        .iter()
        .find_map(|ext| {
            let split = base.len().checked_sub(ext.len())?;
            let tail = base.get(split..)?;
            tail.eq_ignore_ascii_case(ext).then(|| &base[..split])
        })
        .unwrap_or(base);

    if stem.trim().is_empty() { "untitled" } else { stem }
}

/// Output name for one input: `episode01.ass` becomes `episode01.srt`.
///
/// Any directory part is dropped; names without a script extension get
/// `.srt` appended.
pub fn archive_entry_name(name: &str) -> String {
    format!("{}.srt", entry_stem(name))
}

/// Assigns unique entry names in the order inputs are offered
#[derive(Debug, Default)]
pub struct EntryNamer {
    /// Lowercased names already handed out
    used: HashSet<String>,
}

impl EntryNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique name for `input_name`: `a.srt`, then `a_1.srt`, `a_2.srt`, ...
    ///
    /// Names compare case-insensitively since many extractors run on
    /// case-insensitive filesystems.
    pub fn assign(&mut self, input_name: &str) -> String {
        let stem = entry_stem(input_name);
        let mut candidate = format!("{}.srt", stem);
        let mut suffix = 1;

        while self.used.contains(&candidate.to_lowercase()) {
            candidate = format!("{}_{}.srt", stem, suffix);
            suffix += 1;
        }

        if suffix > 1 {
            debug!("Renamed output of '{}' to '{}' to avoid a collision", input_name, candidate);
        }
        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

/// Collects converted files into one in-memory ZIP archive
pub struct BulkArchiver {
    namer: EntryNamer,
    writer: ZipWriter<Vec<u8>>,
}

impl BulkArchiver {
    pub fn new() -> Self {
        Self {
            namer: EntryNamer::new(),
            writer: ZipWriter::new(Vec::new()),
        }
    }

    /// Add the output of `input_name`, returning the entry name used
    pub fn add(&mut self, input_name: &str, content: &[u8]) -> Result<String, ArchiveError> {
        let entry_name = self.namer.assign(input_name);
        self.writer.add_entry(&entry_name, content)?;
        Ok(entry_name)
    }

    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    /// Finish the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        self.writer.finish()
    }
}

impl Default for BulkArchiver {
    fn default() -> Self {
        Self::new()
    }
}
