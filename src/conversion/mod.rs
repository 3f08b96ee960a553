/*!
 * ASS/SSA to SRT conversion engine.
 *
 * The engine is synchronous and free of I/O: callers hand in bytes and get
 * bytes back. It is split into several submodules:
 *
 * - `normalizer`: override tag stripping and line-break handling
 * - `dictionary`: conversion dictionary loading and longest-match substitution
 * - `cache`: reuse of parsed dictionaries across jobs
 * - `batch`: parallel bulk conversion on the tokio blocking pool
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::archive::{BulkArchiver, EntryNamer};
use crate::errors::{ConvertError, FileFailure, ParseWarning};
use crate::script::{self, Script, StyleResolver, TextEncoding};
use crate::srt::{Cue, CueList};

// Re-export main types for easier usage
pub use self::batch::BulkConverter;
pub use self::cache::DictionaryCache;
pub use self::dictionary::{ConversionDictionary, DictionaryFormat, DictionaryHandle};
pub use self::normalizer::{NormalizedText, normalize_text};

// Submodules
pub mod batch;
pub mod cache;
pub mod dictionary;
pub mod normalizer;

/// Shape of a job's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One SRT document per input
    #[default]
    Srt,
    /// All successful outputs packed into one ZIP archive
    BulkArchive,
}

/// Per-job conversion settings
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Optional substitution dictionary, shared read-only
    pub dictionary: Option<DictionaryHandle>,

    /// Whether `Comment:` events are skipped
    pub drop_comments: bool,

    /// Result shape for `convert_files`
    pub output_format: OutputFormat,

    /// How input bytes are decoded
    pub encoding: TextEncoding,

    /// Prefix top-aligned cues with `{\anN}`, which many players honour
    pub keep_position_tags: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            dictionary: None,
            drop_comments: true,
            output_format: OutputFormat::Srt,
            encoding: TextEncoding::Auto,
            keep_position_tags: false,
        }
    }
}

/// A named input of a multi-file job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Name as known to the caller, usually a file name or path
    pub name: String,
    /// Raw script bytes
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Result of converting one script
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    /// UTF-8 SRT document
    pub bytes: Vec<u8>,
    /// Number of cues written
    pub cue_count: usize,
    /// Recoverable problems met while parsing
    pub warnings: Vec<ParseWarning>,
}

/// One successful file of a multi-file job
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFile {
    pub source_name: String,
    /// Output file name derived from the source name, unique within the job
    pub output_name: String,
    pub output: ConversionOutput,
}

/// Archive member produced by a bulk job
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub source_name: String,
    /// Unique name inside the archive
    pub entry_name: String,
    pub cue_count: usize,
    pub warnings: Vec<ParseWarning>,
}

/// Result of a bulk job: the archive plus what went into it and what did not
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutput {
    /// ZIP archive bytes
    pub archive: Vec<u8>,
    /// Successful inputs in input order
    pub entries: Vec<ArchiveEntry>,
    /// Failed inputs in input order
    pub failures: Vec<FileFailure>,
}

/// Result of `convert_files`, shaped by `ConversionOptions::output_format`
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutput {
    Files {
        converted: Vec<ConvertedFile>,
        failures: Vec<FileFailure>,
    },
    Archive(BulkOutput),
}

/// Convert one ASS/SSA script to SRT
pub fn convert(bytes: &[u8], options: &ConversionOptions) -> Result<ConversionOutput, ConvertError> {
    let script = script::parse_script(bytes, options.encoding)?;
    let cues = render_cues(&script, options);

    if cues.is_empty() {
        return Err(ConvertError::EmptyOutput {
            events: script.events().len(),
            comments: script.comment_count(),
            dropped: script.dropped_count(),
        });
    }

    let list = CueList::from_cues(cues);
    debug!("Converted {} events into {} cues", script.events().len(), list.len());

    Ok(ConversionOutput {
        bytes: list.to_srt_string().into_bytes(),
        cue_count: list.len(),
        warnings: script.warnings().to_vec(),
    })
}

/// Turn the script's events into unsorted cues in file order
fn render_cues(script: &Script, options: &ConversionOptions) -> Vec<Cue> {
    let resolver = StyleResolver::new(script);
    let dictionary = options.dictionary.as_deref();

    script
        .events()
        .iter()
        .filter(|event| !(event.is_comment && options.drop_comments))
        .filter_map(|event| {
            let ctx = resolver.context_for(event);
            let NormalizedText { mut lines, alignment } = normalize_text(&event.text, &ctx, dictionary);
            if lines.is_empty() {
                return None;
            }

            if options.keep_position_tags && matches!(alignment, 7..=9) {
                lines[0] = format!("{{\\an{}}}{}", alignment, lines[0]);
            }

            Some(Cue::new(0, event.start_ms, event.end_ms, lines))
        })
        .collect()
}

/// Convert several scripts into one ZIP archive, sequentially and in input order
pub fn convert_bulk(files: &[InputFile], options: &ConversionOptions) -> Result<BulkOutput, ConvertError> {
    if files.is_empty() {
        return Err(ConvertError::InvalidRequest("no input files".to_string()));
    }

    let results = files
        .iter()
        .map(|file| (file.name.clone(), convert(&file.bytes, options)))
        .collect();

    assemble_archive(results)
}

/// Convert several scripts, producing either separate SRT files or an archive
pub fn convert_files(files: &[InputFile], options: &ConversionOptions) -> Result<JobOutput, ConvertError> {
    match options.output_format {
        OutputFormat::BulkArchive => convert_bulk(files, options).map(JobOutput::Archive),
        OutputFormat::Srt => {
            if files.is_empty() {
                return Err(ConvertError::InvalidRequest("no input files".to_string()));
            }

            // Names are unique across the job, as they would be inside an archive
            let mut namer = EntryNamer::new();
            let mut converted = Vec::new();
            let mut failures = Vec::new();
            for file in files {
                match convert(&file.bytes, options) {
                    Ok(output) => converted.push(ConvertedFile {
                        source_name: file.name.clone(),
                        output_name: namer.assign(&file.name),
                        output,
                    }),
                    Err(error) => failures.push(FileFailure {
                        name: file.name.clone(),
                        error,
                    }),
                }
            }

            if converted.is_empty() {
                return Err(ConvertError::AllFilesFailed(failures));
            }
            Ok(JobOutput::Files { converted, failures })
        }
    }
}

/// Pack per-file results, already in input order, into an archive
pub(crate) fn assemble_archive(
    results: Vec<(String, Result<ConversionOutput, ConvertError>)>,
) -> Result<BulkOutput, ConvertError> {
    let mut archiver = BulkArchiver::new();
    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for (name, result) in results {
        match result {
            Ok(output) => {
                let entry_name = archiver.add(&name, &output.bytes)?;
                entries.push(ArchiveEntry {
                    source_name: name,
                    entry_name,
                    cue_count: output.cue_count,
                    warnings: output.warnings,
                });
            }
            Err(error) => {
                warn!("Failed to convert {}: {}", name, error);
                failures.push(FileFailure { name, error });
            }
        }
    }

    if entries.is_empty() {
        return Err(ConvertError::AllFilesFailed(failures));
    }

    Ok(BulkOutput {
        archive: archiver.finish()?,
        entries,
        failures,
    })
}
