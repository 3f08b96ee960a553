/*!
 * Text decoding for script bytes.
 *
 * Scripts in the wild are mostly UTF-8, but Aegisub and older SSA tools also
 * save UTF-16 with or without a byte order mark.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ParseError, ParseErrorKind};

/// Encoding hint passed alongside the raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Sniff a BOM, then guess between UTF-16 and UTF-8
    #[default]
    Auto,
    /// UTF-8; invalid sequences are replaced
    Utf8,
    /// UTF-16 little endian
    Utf16Le,
    /// UTF-16 big endian
    Utf16Be,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "auto" => Ok(Self::Auto),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "utf16le" | "utf-16le" | "utf-16" => Ok(Self::Utf16Le),
            "utf16be" | "utf-16be" => Ok(Self::Utf16Be),
            _ => Err(anyhow::anyhow!("Unsupported encoding: {}", s)),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16BE_BOM: &[u8] = b"\xFE\xFF";

/// Decode script bytes into text, dropping any byte order mark
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, ParseError> {
    let resolved = match encoding {
        TextEncoding::Auto => sniff(bytes),
        other => other,
    };

    let text = match resolved {
        TextEncoding::Utf16Le => decode_utf16(strip_prefix(bytes, UTF16LE_BOM), u16::from_le_bytes)?,
        TextEncoding::Utf16Be => decode_utf16(strip_prefix(bytes, UTF16BE_BOM), u16::from_be_bytes)?,
        _ => String::from_utf8_lossy(strip_prefix(bytes, UTF8_BOM)).into_owned(),
    };

    // A BOM can survive as U+FEFF when the caller forced an encoding
    Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
}

fn strip_prefix<'a>(bytes: &'a [u8], prefix: &[u8]) -> &'a [u8] {
    bytes.strip_prefix(prefix).unwrap_or(bytes)
}

// @returns: Concrete encoding guessed from BOM or NUL byte distribution
fn sniff(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(UTF8_BOM) {
        return TextEncoding::Utf8;
    }
    if bytes.starts_with(UTF16LE_BOM) {
        return TextEncoding::Utf16Le;
    }
    if bytes.starts_with(UTF16BE_BOM) {
        return TextEncoding::Utf16Be;
    }

    // ASS scripts are ASCII-heavy, so BOM-less UTF-16 shows NULs on one side
    let sample = &bytes[..bytes.len().min(512)];
    let even_nuls = sample.iter().step_by(2).filter(|b| **b == 0).count();
    let odd_nuls = sample.iter().skip(1).step_by(2).filter(|b| **b == 0).count();
    let pairs = sample.len() / 2;
    if pairs > 0 && odd_nuls * 2 > pairs && even_nuls == 0 {
        TextEncoding::Utf16Le
    } else if pairs > 0 && even_nuls * 2 > pairs && odd_nuls == 0 {
        TextEncoding::Utf16Be
    } else {
        TextEncoding::Utf8
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, ParseError> {
    if bytes.len() % 2 != 0 {
        return Err(ParseError::new(
            0,
            ParseErrorKind::InvalidEncoding("UTF-16 (odd number of bytes)".to_string()),
        ));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units)
        .map_err(|_| ParseError::new(0, ParseErrorKind::InvalidEncoding("UTF-16".to_string())))
}
