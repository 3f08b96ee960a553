/*!
 * # ass2srt - ASS/SSA to SRT subtitle conversion
 *
 * A Rust library for converting Advanced SubStation Alpha scripts into
 * SubRip subtitles.
 *
 * ## Features
 *
 * - Format-driven ASS/SSA parsing with per-line recovery and warnings
 * - Style resolution with fallback to a default style
 * - Override tag, drawing and line-break handling
 * - Optional phrase conversion dictionaries (longest match first)
 * - Deterministic ZIP archives for bulk jobs
 * - Parallel bulk conversion with input-order output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `script`: script model, decoding, time codes, parser and style lookup
 * - `conversion`: the conversion engine:
 *   - `conversion::normalizer`: event text to display lines
 *   - `conversion::dictionary`: conversion dictionary loading and application
 *   - `conversion::cache`: reuse of parsed dictionaries
 *   - `conversion::batch`: parallel bulk conversion
 * - `srt`: cue list ordering and SRT rendering
 * - `archive`: entry naming and the ZIP writer
 * - `fetch`: dictionary acquisition from files and URLs
 * - `app_config`: configuration management
 * - `app_controller`: task dispatch, file I/O and reporting
 * - `file_utils`: file system operations
 * - `errors`: custom error types for the application
 *
 * ## Example
 *
 * ```
 * use ass2srt::{convert, ConversionOptions};
 *
 * let script = "[Script Info]\nScriptType: v4.00+\n\n[Events]\n\
 *               Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
 *               Dialogue: 0,0:00:01.00,0:00:02.50,Default,,0,0,0,,Hello\\NWorld\n";
 * let output = convert(script.as_bytes(), &ConversionOptions::default()).unwrap();
 * assert_eq!(
 *     String::from_utf8(output.bytes).unwrap(),
 *     "1\n00:00:01,000 --> 00:00:02,500\nHello\nWorld\n\n"
 * );
 * ```
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod archive;
pub mod conversion;
pub mod errors;
pub mod fetch;
pub mod file_utils;
pub mod script;
pub mod srt;

// Re-export main types for easier usage
pub use app_config::Config;
pub use conversion::{
    ConversionDictionary, ConversionOptions, ConversionOutput, BulkOutput, DictionaryFormat,
    DictionaryHandle, InputFile, JobOutput, OutputFormat, convert, convert_bulk, convert_files,
};
pub use errors::{ArchiveError, ConvertError, DictionaryFormatError, ParseError, TimeCodeError};
pub use script::{Script, TextEncoding, parse_script};
pub use srt::{Cue, CueList};
