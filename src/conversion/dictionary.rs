/*!
 * Conversion dictionary loading and application.
 *
 * A dictionary maps source phrases to target phrases (for example Simplified
 * to Traditional Chinese). Text is rewritten in one left-to-right pass that
 * always takes the longest key matching at the current position, so the
 * cost stays linear in the text length for a given dictionary.
 */

use std::collections::HashMap;
use std::sync::Arc;
use log::debug;

use crate::errors::DictionaryFormatError;

/// Shared read-only dictionary handle
pub type DictionaryHandle = Arc<ConversionDictionary>;

/// Line format of dictionary source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DictionaryFormat {
    /// Separator between source and target
    pub delimiter: char,
    /// Lines starting with this character are ignored
    pub comment_marker: char,
    /// Keep only the first space-separated target candidate (OpenCC style)
    pub first_candidate_only: bool,
}

impl Default for DictionaryFormat {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            comment_marker: '#',
            first_candidate_only: false,
        }
    }
}

/// Immutable phrase substitution table
#[derive(Debug, Clone, Default)]
pub struct ConversionDictionary {
    entries: HashMap<String, String>,
    /// Longest key length in chars, per first character of the key
    max_key_chars: HashMap<char, usize>,
}

impl ConversionDictionary {
    /// Parse dictionary text, one `source<delimiter>target` mapping per line.
    ///
    /// Blank lines and comment lines are skipped. Duplicate keys keep the last
    /// mapping.
    ///
    /// # Errors
    ///
    /// Returns a [`DictionaryFormatError`] naming the first line that has no
    /// delimiter or an empty side.
    pub fn parse(text: &str, format: &DictionaryFormat) -> Result<Self, DictionaryFormatError> {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let mut pairs = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with(format.comment_marker) {
                continue;
            }

            let (source, target) = line.split_once(format.delimiter).ok_or_else(|| DictionaryFormatError {
                line: line_no,
                reason: format!("missing delimiter {:?}", format.delimiter),
            })?;

            let source = source.trim();
            let mut target = target.trim();
            if format.first_candidate_only {
                target = target.split(' ').find(|c| !c.is_empty()).unwrap_or("");
            }

            if source.is_empty() {
                return Err(DictionaryFormatError {
                    line: line_no,
                    reason: "empty source phrase".to_string(),
                });
            }
            if target.is_empty() {
                return Err(DictionaryFormatError {
                    line: line_no,
                    reason: format!("empty target for '{}'", source),
                });
            }

            pairs.push((source.to_string(), target.to_string()));
        }

        let dictionary = Self::from_pairs(pairs);
        debug!("Loaded conversion dictionary with {} entries", dictionary.len());
        Ok(dictionary)
    }

    /// Build a dictionary from already split pairs; later pairs override earlier ones
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut dictionary = Self::default();
        for (source, target) in pairs {
            let source = source.into();
            let Some(first) = source.chars().next() else {
                continue;
            };
            let chars = source.chars().count();
            let longest = dictionary.max_key_chars.entry(first).or_insert(0);
            *longest = (*longest).max(chars);
            dictionary.entries.insert(source, target.into());
        }
        dictionary
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite `text`, substituting the longest matching key at each position.
    ///
    /// Matches never overlap and substituted output is not rescanned.
    pub fn apply(&self, text: &str) -> String {
        if self.entries.is_empty() || text.is_empty() {
            return text.to_string();
        }

        let boundaries: Vec<(usize, char)> = text.char_indices().collect();
        let char_count = boundaries.len();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < char_count {
            let (start, ch) = boundaries[i];
            let longest = self
                .max_key_chars
                .get(&ch)
                .map_or(0, |max| (*max).min(char_count - i));

            let mut matched = false;
            for len in (1..=longest).rev() {
                let end = boundaries.get(i + len).map_or(text.len(), |(offset, _)| *offset);
                if let Some(target) = self.entries.get(&text[start..end]) {
                    out.push_str(target);
                    i += len;
                    matched = true;
                    break;
                }
            }

            if !matched {
                out.push(ch);
                i += 1;
            }
        }

        out
    }
}
