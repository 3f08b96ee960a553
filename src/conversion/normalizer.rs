/*!
 * Plain-text rendering of ASS event text.
 *
 * Removes override blocks and drawing commands, turns the ASS line-break
 * escapes into real line breaks, picks up inline alignment overrides and
 * finally runs the optional conversion dictionary over each line.
 */

use regex::Regex;
use once_cell::sync::Lazy;

use crate::script::RenderContext;
use crate::script::styles::ssa_to_numpad;
use super::dictionary::ConversionDictionary;

/// Override tags that change how the text itself is rendered
static RENDER_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(an|a|p|q)(\d+)").unwrap()
});

/// Normalized text of one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Trimmed, non-empty display lines
    pub lines: Vec<String>,
    /// Effective numpad alignment after inline overrides
    pub alignment: u8,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Tag state carried while scanning one event's text
struct TagState {
    drawing: bool,
    hard_soft_breaks: bool,
    alignment: Option<u8>,
}

impl TagState {
    fn new(ctx: &RenderContext) -> Self {
        Self {
            drawing: false,
            hard_soft_breaks: ctx.wrap_style == 2,
            alignment: None,
        }
    }

    fn apply_block(&mut self, block: &str) {
        for cap in RENDER_TAG_REGEX.captures_iter(block) {
            let Ok(value) = cap[2].parse::<u32>() else {
                continue;
            };
            match &cap[1] {
                "an" => {
                    if self.alignment.is_none() && (1..=9).contains(&value) {
                        self.alignment = Some(value as u8);
                    }
                }
                "a" => {
                    if self.alignment.is_none() {
                        self.alignment = u8::try_from(value).ok().and_then(ssa_to_numpad);
                    }
                }
                "p" => self.drawing = value > 0,
                "q" => self.hard_soft_breaks = value == 2,
                _ => {}
            }
        }
    }
}

/// Render raw event text to display lines
pub fn normalize_text(
    text: &str,
    ctx: &RenderContext,
    dictionary: Option<&ConversionDictionary>,
) -> NormalizedText {
    let mut state = TagState::new(ctx);
    let mut rendered = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '{' => {
                if let Some(close) = rest.find('}') {
                    state.apply_block(&rest[1..close]);
                    rest = &rest[close + 1..];
                    continue;
                }
                // Unterminated block stays as literal text
                if !state.drawing {
                    rendered.push('{');
                }
                rest = &rest[1..];
            }
            '\\' => {
                let escape = match rest[1..].chars().next() {
                    Some('N') => Some('\n'),
                    Some('n') => Some(if state.hard_soft_breaks { '\n' } else { ' ' }),
                    Some('h') => Some(' '),
                    _ => None,
                };
                match escape {
                    Some(replacement) => {
                        if !state.drawing {
                            rendered.push(replacement);
                        }
                        rest = &rest[2..];
                    }
                    None => {
                        if !state.drawing {
                            rendered.push('\\');
                        }
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                if !state.drawing {
                    rendered.push(ch);
                }
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    let lines = rendered
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match dictionary {
            Some(dict) => dict.apply(line),
            None => line.to_string(),
        })
        .collect();

    NormalizedText {
        lines,
        alignment: state.alignment.unwrap_or(ctx.alignment),
    }
}
