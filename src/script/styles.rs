use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use super::{DialogueEvent, Script, Style};

// @module: Style lookup with graceful fallback

static BUILTIN_DEFAULT: Lazy<Style> = Lazy::new(Style::default);

/// Convert a legacy SSA alignment (1-3 bottom, 5-7 top, 9-11 middle) to numpad layout.
///
/// 4, 8 and anything above 11 are not SSA alignments and yield `None`.
pub fn ssa_to_numpad(alignment: u8) -> Option<u8> {
    match alignment {
        1..=3 => Some(alignment),
        5..=7 => Some(alignment + 2),
        9..=11 => Some(alignment - 5),
        _ => None,
    }
}

/// Resolves style names referenced by events against a script's style table
pub struct StyleResolver<'a> {
    by_name: HashMap<&'a str, &'a Style>,
    by_lowercase: HashMap<String, &'a Style>,
    fallback: &'a Style,
    wrap_style: u8,
    // Names already reported as missing, so each is logged once
    reported: Mutex<HashSet<String>>,
}

impl<'a> StyleResolver<'a> {
    /// Build a resolver for the given script
    pub fn new(script: &'a Script) -> Self {
        let mut by_name = HashMap::new();
        let mut by_lowercase = HashMap::new();
        // Later definitions win, as in renderers
        for style in script.styles() {
            by_name.insert(style.name.as_str(), style);
            by_lowercase.insert(style.name.to_lowercase(), style);
        }

        let fallback = by_name
            .get("Default")
            .copied()
            .or_else(|| by_lowercase.get("default").copied())
            .unwrap_or(&*BUILTIN_DEFAULT);

        Self {
            by_name,
            by_lowercase,
            fallback,
            wrap_style: script.info().wrap_style,
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Return the style for `name`, or the documented fallback: the script's
    /// `Default` style if present, otherwise the built-in default.
    pub fn resolve(&self, name: &str) -> &'a Style {
        let name = name.trim();
        if let Some(style) = self.by_name.get(name).copied() {
            return style;
        }

        // Some tools write "*Default" for styles they generated
        let unstarred = name.trim_start_matches('*');
        if let Some(style) = self
            .by_name
            .get(unstarred)
            .copied()
            .or_else(|| self.by_lowercase.get(&unstarred.to_lowercase()).copied())
        {
            return style;
        }

        if self.reported.lock().insert(name.to_string()) {
            debug!("Style '{}' not found, using '{}'", name, self.fallback.name);
        }
        self.fallback
    }

    /// Rendering context for one event: its resolved style plus script-wide wrapping
    pub fn context_for(&self, event: &DialogueEvent) -> RenderContext {
        let style = self.resolve(&event.style);
        RenderContext {
            alignment: style.alignment,
            wrap_style: self.wrap_style,
        }
    }
}

/// Formatting facts that influence plain-text output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Numpad alignment of the resolved style
    pub alignment: u8,
    /// Script WrapStyle; 2 turns `\n` into a hard break
    pub wrap_style: u8,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            alignment: BUILTIN_DEFAULT.alignment,
            wrap_style: 0,
        }
    }
}
