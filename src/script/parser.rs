/*!
 * Line oriented ASS/SSA parser.
 *
 * Section headers switch the parsing mode and `Format:` lines define the
 * column order of the `Style:`, `Dialogue:` and `Comment:` lines that follow.
 * Problems confined to one line become warnings; only structural problems
 * (no sections, no [Events], no usable Format) fail the whole file.
 */

use log::{debug, warn};

use crate::errors::{ParseError, ParseErrorKind, ParseWarning, WarningKind};
use super::encoding::{self, TextEncoding};
use super::styles::ssa_to_numpad;
use super::timecode::parse_time_range;
use super::{DialogueEvent, Script, ScriptInfo, Style};

const ASS_STYLE_FORMAT: &[&str] = &[
    "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour", "OutlineColour",
    "BackColour", "Bold", "Italic", "Underline", "StrikeOut", "ScaleX", "ScaleY", "Spacing",
    "Angle", "BorderStyle", "Outline", "Shadow", "Alignment", "MarginL", "MarginR", "MarginV",
    "Encoding",
];

const SSA_STYLE_FORMAT: &[&str] = &[
    "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour", "TertiaryColour",
    "BackColour", "Bold", "Italic", "BorderStyle", "Outline", "Shadow", "Alignment", "MarginL",
    "MarginR", "MarginV", "AlphaLevel", "Encoding",
];

const ASS_EVENT_FORMAT: &[&str] = &[
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

const SSA_EVENT_FORMAT: &[&str] = &[
    "Marked", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Info,
    Styles { ssa: bool },
    Events,
    Skipped,
}

/// Column order declared by a `Format:` line
#[derive(Debug, Clone)]
struct ColumnLayout {
    columns: Vec<String>,
}

impl ColumnLayout {
    fn from_declaration(value: &str) -> Self {
        Self {
            columns: value
                .split(',')
                .map(|c| c.trim().to_lowercase())
                .collect(),
        }
    }

    fn standard(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_lowercase()).collect(),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    // @returns: Field values in column order; the last column absorbs extra commas
    fn split<'a>(&self, value: &'a str) -> Option<Vec<&'a str>> {
        let fields: Vec<&str> = value.splitn(self.columns.len(), ',').collect();
        if fields.len() < self.columns.len() {
            return None;
        }
        Some(fields)
    }
}

/// Accumulates parse state while walking the lines
struct ScriptBuilder {
    info: ScriptInfo,
    styles: Vec<Style>,
    events: Vec<DialogueEvent>,
    warnings: Vec<ParseWarning>,
    section: Section,
    style_layout: Option<ColumnLayout>,
    event_layout: Option<ColumnLayout>,
    saw_header: bool,
    saw_events: bool,
    event_order: usize,
}

/// Parse raw script bytes into a [`Script`].
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is empty, cannot be decoded, has no
/// section header, lacks an `[Events]` section, or declares an events Format
/// without Start/End/Text columns. Line-level problems are recorded as
/// warnings on the returned script instead.
pub fn parse_script(bytes: &[u8], encoding: TextEncoding) -> Result<Script, ParseError> {
    let text = encoding::decode(bytes, encoding)?;
    parse_str(&text)
}

/// Parse already decoded script text
pub fn parse_str(text: &str) -> Result<Script, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::new(0, ParseErrorKind::EmptyInput));
    }

    let mut builder = ScriptBuilder::new();
    let mut line_count = 0;

    // Old SSA tools still write bare \r line endings
    let normalized = text.replace("\r\n", "\n");
    for raw in normalized.split(['\n', '\r']) {
        line_count += 1;
        builder.feed(line_count, raw)?;
    }

    builder.finish(line_count)
}

impl ScriptBuilder {
    fn new() -> Self {
        Self {
            info: ScriptInfo::default(),
            styles: Vec::new(),
            events: Vec::new(),
            warnings: Vec::new(),
            section: Section::Preamble,
            style_layout: None,
            event_layout: None,
            saw_header: false,
            saw_events: false,
            event_order: 0,
        }
    }

    fn warn(&mut self, line: usize, kind: WarningKind) {
        match &kind {
            WarningKind::UnknownSection(_) | WarningKind::OrphanLine => debug!("Line {}: {}", line, kind),
            _ => warn!("Line {}: {}", line, kind),
        }
        self.warnings.push(ParseWarning { line, kind });
    }

    fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with("!:") {
            return Ok(());
        }

        if line.starts_with('[') && line.ends_with(']') {
            self.enter_section(line_no, &line[1..line.len() - 1]);
            return Ok(());
        }

        let Some((key, value)) = line.split_once(':') else {
            if self.section == Section::Preamble {
                self.warn(line_no, WarningKind::OrphanLine);
            } else {
                debug!("Line {}: ignoring line without a key", line_no);
            }
            return Ok(());
        };
        let key = key.trim();
        let value = value.trim_start();

        match self.section {
            Section::Preamble => self.warn(line_no, WarningKind::OrphanLine),
            Section::Skipped => {}
            Section::Info => self.info_line(key, value),
            Section::Styles { ssa } => self.style_line(line_no, key, value, ssa),
            Section::Events => self.event_line(line_no, key, value)?,
        }
        Ok(())
    }

    fn enter_section(&mut self, line_no: usize, name: &str) {
        self.saw_header = true;
        let normalized = name.trim().to_lowercase();
        self.section = match normalized.as_str() {
            "script info" => Section::Info,
            "v4+ styles" | "v4 styles+" => Section::Styles { ssa: false },
            "v4 styles" => Section::Styles { ssa: true },
            "events" => {
                self.saw_events = true;
                Section::Events
            }
            "fonts" | "graphics" | "aegisub project garbage" | "aegisub extradata" => Section::Skipped,
            _ => {
                self.warn(line_no, WarningKind::UnknownSection(name.trim().to_string()));
                Section::Skipped
            }
        };
    }

    fn info_line(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key.to_lowercase().as_str() {
            "title" => self.info.title = Some(value.to_string()),
            "scripttype" => self.info.script_type = Some(value.to_string()),
            "playresx" => self.info.play_res_x = value.parse().ok(),
            "playresy" => self.info.play_res_y = value.parse().ok(),
            "wrapstyle" => self.info.wrap_style = value.parse().unwrap_or(0),
            _ => {
                self.info.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    fn style_line(&mut self, line_no: usize, key: &str, value: &str, ssa: bool) {
        if key.eq_ignore_ascii_case("format") {
            self.style_layout = Some(ColumnLayout::from_declaration(value));
            return;
        }
        if !key.eq_ignore_ascii_case("style") {
            return;
        }

        if self.style_layout.is_none() {
            self.warn(line_no, WarningKind::MissingFormat);
            let standard = if ssa { SSA_STYLE_FORMAT } else { ASS_STYLE_FORMAT };
            self.style_layout = Some(ColumnLayout::standard(standard));
        }
        let Some(layout) = self.style_layout.clone() else {
            return;
        };

        let Some(fields) = layout.split(value) else {
            let reason = format!("style has fewer than {} fields", layout.columns.len());
            self.warn(line_no, WarningKind::MalformedLine(reason));
            return;
        };

        let get = |name: &str| layout.index_of(name).map(|i| fields[i].trim());
        let flag = |name: &str| get(name).is_some_and(|v| v != "0" && !v.is_empty());
        let number = |name: &str| get(name).and_then(|v| v.parse::<i32>().ok());

        let defaults = Style::default();
        let alignment = number("alignment")
            .and_then(|a| u8::try_from(a).ok())
            .and_then(|a| if ssa { ssa_to_numpad(a) } else { Some(a) })
            .filter(|a| (1..=9).contains(a))
            .unwrap_or(defaults.alignment);

        let style = Style {
            name: get("name").unwrap_or("Default").to_string(),
            font_name: get("fontname").map(str::to_string).unwrap_or(defaults.font_name),
            font_size: get("fontsize").and_then(|v| v.parse().ok()).unwrap_or(defaults.font_size),
            primary_colour: get("primarycolour").map(str::to_string).unwrap_or(defaults.primary_colour),
            bold: flag("bold"),
            italic: flag("italic"),
            alignment,
            margin_l: number("marginl").unwrap_or(defaults.margin_l),
            margin_r: number("marginr").unwrap_or(defaults.margin_r),
            margin_v: number("marginv").unwrap_or(defaults.margin_v),
        };
        self.styles.push(style);
    }

    fn event_line(&mut self, line_no: usize, key: &str, value: &str) -> Result<(), ParseError> {
        if key.eq_ignore_ascii_case("format") {
            let layout = ColumnLayout::from_declaration(value);
            for required in ["start", "end", "text"] {
                if layout.index_of(required).is_none() {
                    return Err(ParseError::new(
                        line_no,
                        ParseErrorKind::MissingColumn(required.to_string()),
                    ));
                }
            }
            self.event_layout = Some(layout);
            return Ok(());
        }

        let is_comment = if key.eq_ignore_ascii_case("dialogue") {
            false
        } else if key.eq_ignore_ascii_case("comment") {
            true
        } else {
            // Picture, Sound, Movie and Command events carry no text
            debug!("Line {}: ignoring '{}' event", line_no, key);
            return Ok(());
        };

        if self.event_layout.is_none() {
            self.warn(line_no, WarningKind::MissingFormat);
            let standard = if self.info.is_ssa() { SSA_EVENT_FORMAT } else { ASS_EVENT_FORMAT };
            self.event_layout = Some(ColumnLayout::standard(standard));
        }
        let Some(layout) = self.event_layout.clone() else {
            return Ok(());
        };

        let Some(fields) = layout.split(value) else {
            let reason = format!("event has fewer than {} fields", layout.columns.len());
            self.warn(line_no, WarningKind::MalformedLine(reason));
            return Ok(());
        };

        let get = |name: &str| layout.index_of(name).map(|i| fields[i]).unwrap_or("");
        let (start_ms, end_ms) = match parse_time_range(get("start"), get("end")) {
            Ok(range) => range,
            Err(e) => {
                self.warn(line_no, WarningKind::TimeCode(e));
                return Ok(());
            }
        };

        let layer = get("layer").trim().parse().unwrap_or(0);
        let event = DialogueEvent {
            order: self.event_order,
            line: line_no,
            layer,
            start_ms,
            end_ms,
            style: get("style").trim().to_string(),
            actor: get("name").trim().to_string(),
            effect: get("effect").trim().to_string(),
            text: get("text").to_string(),
            is_comment,
        };
        self.event_order += 1;
        self.events.push(event);
        Ok(())
    }

    fn finish(self, line_count: usize) -> Result<Script, ParseError> {
        if !self.saw_header {
            return Err(ParseError::new(1, ParseErrorKind::NotAScript));
        }
        if !self.saw_events {
            return Err(ParseError::new(line_count, ParseErrorKind::MissingEvents));
        }

        debug!(
            "Parsed script: {} styles, {} events, {} warnings",
            self.styles.len(),
            self.events.len(),
            self.warnings.len()
        );

        Ok(Script::from_parts(self.info, self.styles, self.events, self.warnings))
    }
}
