//! Signal window extraction.
//!
//! CI failures are reported near the end of the output, so only the trailing
//! lines are classified and a shorter tail is kept for humans.

/// Lines examined by the classifier by default.
pub const DEFAULT_WINDOW_LINES: usize = 300;

/// Lines shown to the user by default.
pub const DEFAULT_EXCERPT_LINES: usize = 40;

/// Trailing slice of log text, borrowed from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisWindow<'a> {
    lines: Vec<&'a str>,
}

impl<'a> AnalysisWindow<'a> {
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Window lines joined back into one blob for pattern matching.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    /// Trailing `n` lines of the window.
    pub fn tail(&self, n: usize) -> &[&'a str] {
        &self.lines[self.lines.len().saturating_sub(n)..]
    }
}

/// Analysis window plus the excerpt taken from its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalWindow<'a> {
    pub window: AnalysisWindow<'a>,
    pub excerpt: Vec<String>,
}

/// Take the trailing `window_lines` of `text` and the trailing
/// `excerpt_lines` of that window.
///
/// `excerpt_lines` larger than `window_lines` is clamped, so the excerpt is
/// always a suffix of the window.
pub fn extract_signal(text: &str, window_lines: usize, excerpt_lines: usize) -> SignalWindow<'_> {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(window_lines);
    let window = AnalysisWindow {
        lines: all[start..].to_vec(),
    };
    let excerpt = window
        .tail(excerpt_lines.min(window_lines))
        .iter()
        .map(|line| line.to_string())
        .collect();
    SignalWindow { window, excerpt }
}
