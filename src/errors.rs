/*!
 * Error types for the ass2srt application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Engine errors are
 * plain data (`Clone`, `PartialEq`) so they can be collected per file in bulk jobs.
 */

use std::fmt;
use thiserror::Error;

/// Reason a script could not be parsed at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The input contained no bytes (or only whitespace)
    #[error("script is empty")]
    EmptyInput,

    /// The bytes could not be decoded with the requested encoding
    #[error("cannot decode script as {0}")]
    InvalidEncoding(String),

    /// No section header was found anywhere in the input
    #[error("no section header found, input is not an ASS/SSA script")]
    NotAScript,

    /// The script ended without an [Events] section
    #[error("missing [Events] section (truncated file?)")]
    MissingEvents,

    /// An [Events] Format line lacks a required column
    #[error("Format line has no '{0}' column")]
    MissingColumn(String),
}

/// File-fatal script parse error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number (0 when the error is not tied to a line)
    pub line: usize,
    /// What went wrong
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Line-recoverable time code problem; the affected event is dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeCodeError {
    /// Not of the form H:MM:SS.CC
    #[error("malformed time code '{0}'")]
    Malformed(String),

    /// The event ends before it starts
    #[error("end time {end_ms}ms is before start time {start_ms}ms")]
    EndBeforeStart {
        start_ms: u64,
        end_ms: u64,
    },
}

/// Kind of a recoverable problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A dialogue line carried a bad time code
    TimeCode(TimeCodeError),
    /// A Style/Dialogue line had fewer fields than its Format declares
    MalformedLine(String),
    /// A section header that is not understood was skipped
    UnknownSection(String),
    /// A Style/Dialogue line appeared before any Format line
    MissingFormat,
    /// Content appeared before the first section header
    OrphanLine,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeCode(e) => write!(f, "{}", e),
            Self::MalformedLine(reason) => write!(f, "malformed line: {}", reason),
            Self::UnknownSection(name) => write!(f, "skipped unknown section [{}]", name),
            Self::MissingFormat => write!(f, "no Format line, assuming the standard column layout"),
            Self::OrphanLine => write!(f, "line outside of any section ignored"),
        }
    }
}

/// Recoverable parse problem attached to a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number
    pub line: usize,
    /// What was wrong with it
    pub kind: WarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Error raised when loading a conversion dictionary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dictionary format error at line {line}: {reason}")]
pub struct DictionaryFormatError {
    /// 1-based line number of the offending mapping
    pub line: usize,
    /// Why the line was rejected
    pub reason: String,
}

/// Errors that can occur while building an archive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Two entries ended up with the same name
    #[error("archive already contains an entry named '{0}'")]
    NameCollision(String),

    /// Entry or archive exceeds the classic ZIP limits
    #[error("'{0}' is too large for a ZIP archive without ZIP64")]
    TooLarge(String),

    /// More entries than a classic ZIP directory can hold
    #[error("too many archive entries: {0}")]
    TooManyEntries(usize),

    /// Writing to the underlying sink failed
    #[error("archive write failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for ArchiveError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Errors returned by the conversion engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The script is structurally unusable
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The supplied dictionary text is malformed
    #[error("{0}")]
    Dictionary(#[from] DictionaryFormatError),

    /// The archive could not be produced
    #[error("{0}")]
    Archive(#[from] ArchiveError),

    /// No renderable cue survived parsing and normalization
    #[error("no renderable dialogue: {events} events parsed, {comments} comments, {dropped} dropped")]
    EmptyOutput {
        events: usize,
        comments: usize,
        dropped: usize,
    },

    /// Every file of a bulk job failed
    #[error("all {} files failed to convert", .0.len())]
    AllFilesFailed(Vec<FileFailure>),

    /// The request itself is inconsistent
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// A single failed file of a bulk job
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    /// Input name as supplied by the caller
    pub name: String,
    /// Why it failed
    pub error: ConvertError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}

/// Errors that can occur when acquiring dictionary text
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request could not be completed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with an error status
    #[error("Server responded with error: {status_code} - {message}")]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The source string is neither a usable path nor an http(s) URL
    #[error("Invalid dictionary source: {0}")]
    InvalidSource(String),

    /// Reading a local file failed
    #[error("File error: {0}")]
    File(String),

    /// The downloaded body is not UTF-8 text
    #[error("Dictionary is not valid UTF-8: {0}")]
    NotText(String),
}
