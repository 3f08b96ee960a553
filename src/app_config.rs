use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use url::Url;

use crate::conversion::{ConversionOptions, DictionaryFormat, OutputFormat};
use crate::script::TextEncoding;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Conversion behaviour
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Dictionary source and format
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Multi-file job settings
    #[serde(default)]
    pub bulk: BulkConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings passed through to the conversion engine
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConversionConfig {
    // @field: Skip Comment: events
    #[serde(default = "default_true")]
    pub drop_comments: bool,

    // @field: Emit {\anN} for top-aligned cues
    #[serde(default)]
    pub keep_position_tags: bool,

    // @field: Input decoding
    #[serde(default)]
    pub encoding: TextEncoding,

    // @field: Separate SRT files or one archive
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            drop_comments: default_true(),
            keep_position_tags: false,
            encoding: TextEncoding::default(),
            output_format: OutputFormat::default(),
        }
    }
}

/// Conversion dictionary configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DictionaryConfig {
    /// Local path or http(s) URL; empty means no dictionary
    #[serde(default)]
    pub source: Option<String>,

    /// Separator between source and target phrase
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Leading character of comment lines
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,

    /// Keep only the first of several space separated targets
    #[serde(default)]
    pub first_candidate_only: bool,

    /// Keep downloaded dictionaries in the user cache directory
    #[serde(default = "default_true")]
    pub cache_downloads: bool,

    /// Download timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            source: None,
            delimiter: default_delimiter(),
            comment_marker: default_comment_marker(),
            first_candidate_only: false,
            cache_downloads: default_true(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DictionaryConfig {
    /// Line format described by this configuration
    pub fn format(&self) -> Result<DictionaryFormat> {
        Ok(DictionaryFormat {
            delimiter: single_char(&self.delimiter, "dictionary.delimiter")?,
            comment_marker: single_char(&self.comment_marker, "dictionary.comment_marker")?,
            first_candidate_only: self.first_candidate_only,
        })
    }
}

/// Configuration for multi-file jobs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BulkConfig {
    /// Maximum number of files converted at once
    #[serde(default = "default_concurrent_jobs")]
    pub concurrent_jobs: usize,

    /// Archive file name used when no explicit output path is given
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            concurrent_jobs: default_concurrent_jobs(),
            archive_name: default_archive_name(),
        }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> String {
    "\t".to_string()
}

fn default_comment_marker() -> String {
    "#".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrent_jobs() -> usize {
    4
}

fn default_archive_name() -> String {
    "subtitles.zip".to_string()
}

fn single_char(value: &str, field: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(anyhow!("{} must be exactly one character, got {:?}", field, value)),
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration as pretty printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        // Validate dictionary format
        let format = self.dictionary.format()?;
        if format.delimiter == format.comment_marker {
            return Err(anyhow!("dictionary.delimiter and dictionary.comment_marker must differ"));
        }
        if format.delimiter == '\n' || format.delimiter == '\r' {
            return Err(anyhow!("dictionary.delimiter cannot be a line break"));
        }

        // Validate dictionary source
        if let Some(source) = self.dictionary.source.as_deref().filter(|s| !s.trim().is_empty()) {
            if source.contains("://") {
                let url = Url::parse(source)
                    .with_context(|| format!("Invalid dictionary URL: {}", source))?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(anyhow!("Dictionary URL must use http or https: {}", source));
                }
            }
        }

        if self.dictionary.timeout_secs == 0 {
            return Err(anyhow!("dictionary.timeout_secs must be greater than zero"));
        }

        // Validate bulk settings
        if self.bulk.concurrent_jobs == 0 {
            return Err(anyhow!("bulk.concurrent_jobs must be greater than zero"));
        }
        if self.bulk.archive_name.trim().is_empty() {
            return Err(anyhow!("bulk.archive_name cannot be empty"));
        }

        Ok(())
    }

    /// Engine options for this configuration, without a dictionary
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            dictionary: None,
            drop_comments: self.conversion.drop_comments,
            output_format: self.conversion.output_format,
            encoding: self.conversion.encoding,
            keep_position_tags: self.conversion.keep_position_tags,
        }
    }
}
