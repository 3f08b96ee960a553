/*!
 * ASS/SSA script model and parsing.
 *
 * - `encoding`: byte decoding with BOM sniffing
 * - `timecode`: `H:MM:SS.CC` time code parsing
 * - `parser`: line oriented section/Format driven parser
 * - `styles`: style lookup with fallback
 */

use std::collections::BTreeMap;

use crate::errors::ParseWarning;

pub mod encoding;
pub mod parser;
pub mod styles;
pub mod timecode;

pub use self::encoding::TextEncoding;
pub use self::parser::parse_script;
pub use self::styles::{RenderContext, StyleResolver};

/// Script-wide metadata from the [Script Info] section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptInfo {
    /// Title field
    pub title: Option<String>,
    /// ScriptType, e.g. "v4.00+" for ASS or "v4.00" for SSA
    pub script_type: Option<String>,
    /// Rendering resolution
    pub play_res_x: Option<u32>,
    pub play_res_y: Option<u32>,
    /// Line wrapping mode (0-3); 2 means no smart wrapping, `\n` breaks too
    pub wrap_style: u8,
    /// Every other key/value pair, keyed as written
    pub extra: BTreeMap<String, String>,
}

impl ScriptInfo {
    /// Whether the script declares the SSA (v4) dialect
    pub fn is_ssa(&self) -> bool {
        self.script_type
            .as_deref()
            .is_some_and(|t| !t.trim().ends_with('+') && t.trim().to_lowercase().starts_with("v4"))
    }
}

/// Named formatting record from a styles section
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub font_name: String,
    pub font_size: f32,
    /// Colour as written in the script (`&H00FFFFFF`)
    pub primary_colour: String,
    pub bold: bool,
    pub italic: bool,
    /// Numpad alignment 1-9 (SSA legacy values are converted)
    pub alignment: u8,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font_name: "Arial".to_string(),
            font_size: 20.0,
            primary_colour: "&H00FFFFFF".to_string(),
            bold: false,
            italic: false,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
        }
    }
}

/// A timed line from the [Events] section
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEvent {
    /// Position among all events in file order (0-based)
    pub order: usize,
    /// 1-based source line, for diagnostics
    pub line: usize,
    pub layer: i32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub style: String,
    pub actor: String,
    pub effect: String,
    /// Raw text including override blocks
    pub text: String,
    /// Declared with `Comment:` instead of `Dialogue:`
    pub is_comment: bool,
}

impl DialogueEvent {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// A parsed script. Immutable once built by the parser.
#[derive(Debug, Clone)]
pub struct Script {
    info: ScriptInfo,
    styles: Vec<Style>,
    events: Vec<DialogueEvent>,
    warnings: Vec<ParseWarning>,
}

impl Script {
    pub(crate) fn from_parts(
        info: ScriptInfo,
        styles: Vec<Style>,
        events: Vec<DialogueEvent>,
        warnings: Vec<ParseWarning>,
    ) -> Self {
        Self {
            info,
            styles,
            events,
            warnings,
        }
    }

    pub fn info(&self) -> &ScriptInfo {
        &self.info
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Events that survived parsing, in file order
    pub fn events(&self) -> &[DialogueEvent] {
        &self.events
    }

    /// Recoverable problems found while parsing
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn comment_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_comment).count()
    }

    /// Events dropped because of bad time codes
    pub fn dropped_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w.kind, crate::errors::WarningKind::TimeCode(_)))
            .count()
    }
}
