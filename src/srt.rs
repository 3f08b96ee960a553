use std::fmt;
use log::debug;

// @module: SRT cue model and emitter

// @struct: Single SRT cue
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    // @field: Sequence number (1-based once placed in a CueList)
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Display lines, never empty
    pub lines: Vec<String>,
}

impl Cue {
    /// Creates a new cue
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Self {
        Cue {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines,
        }
    }

    /// Cue text with lines joined by newlines
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Ordered, numbered cues for one output file
#[derive(Debug, Clone, Default)]
pub struct CueList {
    /// Cues in non-decreasing start order, numbered from 1
    pub entries: Vec<Cue>,
}

impl CueList {
    /// Build the list from cues given in original event order.
    ///
    /// The sort is stable, so cues that start together keep the order in which
    /// their events appeared in the script. Sequence numbers are reassigned
    /// from 1. Overlaps are allowed in SRT and left untouched.
    pub fn from_cues(mut cues: Vec<Cue>) -> Self {
        cues.sort_by_key(|cue| cue.start_time_ms);

        // Check for overlapping entries
        let overlap_count = cues
            .windows(2)
            .filter(|pair| pair[0].end_time_ms > pair[1].start_time_ms)
            .count();
        if overlap_count > 0 {
            debug!("Found {} overlapping cues", overlap_count);
        }

        // Renumber entries to ensure sequential order
        for (i, cue) in cues.iter_mut().enumerate() {
            cue.seq_num = i + 1;
        }

        CueList { entries: cues }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the whole list as SRT text
    pub fn to_srt_string(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * 64);
        for cue in &self.entries {
            out.push_str(&cue.to_string());
        }
        out
    }
}

impl fmt::Display for CueList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cue in &self.entries {
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}
