//! Percentage scraping and progress windows.

use std::sync::OnceLock;

use regex::Regex;

/// Matches `45%`, `45.3%`, `100%`. The fractional part is discarded.
const PERCENT_PATTERN: &str = r"(\d{1,3})(?:\.\d+)?%";

fn percent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PERCENT_PATTERN).expect("percent pattern is a valid regex"))
}

/// Extract the first percentage marker from a line of tool output.
///
/// Values above 100 are clamped to 100.
pub fn scrape_percent(line: &str) -> Option<u8> {
    let caps = percent_regex().captures(line)?;
    let value: u32 = caps.get(1)?.as_str().parse().ok()?;
    Some(value.min(100) as u8)
}

/// Sub-range of the overall 0..=100 scale that a command's own 0..=100%
/// progress is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressWindow {
    pub offset: u8,
    pub span: u8,
}

impl ProgressWindow {
    pub fn new(offset: u8, span: u8) -> Self {
        Self { offset, span }
    }

    /// Map a tool-local percentage into the overall scale.
    pub fn map(&self, percent: u8) -> u8 {
        let pct = u32::from(percent.min(100));
        let mapped = u32::from(self.offset) + pct * u32::from(self.span) / 100;
        mapped.min(100) as u8
    }

    /// Whether scraping is enabled for this window.
    pub fn is_active(&self) -> bool {
        self.span > 0
    }

    /// Upper bound of the window.
    pub fn end(&self) -> u8 {
        self.offset.saturating_add(self.span).min(100)
    }
}
