use crate::config::{COMMENT_MARKER, PREAMBLE_PREFIX, ROW_ID_MARKER};
use memchr::memmem;
use once_cell::sync::Lazy;

static ROW_ID_FINDER: Lazy<memmem::Finder<'static>> =
    Lazy::new(|| memmem::Finder::new(ROW_ID_MARKER));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Preamble,
    Data,
    /// Anything else: stray syntax, decorative lines, rows without the id placeholder
    Noise,
}

/// Classifies one raw input line. Surrounding whitespace is ignored.
pub fn classify(line: &str) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        LineKind::Blank
    } else if line.starts_with(COMMENT_MARKER) {
        LineKind::Comment
    } else if line.starts_with(PREAMBLE_PREFIX) {
        LineKind::Preamble
    } else if line.starts_with('(') && ROW_ID_FINDER.find(line.as_bytes()).is_some() {
        LineKind::Data
    } else {
        LineKind::Noise
    }
}

pub fn is_data_line(line: &str) -> bool {
    classify(line) == LineKind::Data
}

/// Lazily keeps only the data lines, trimmed.
pub fn data_lines<I, S>(lines: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().filter_map(|line| {
        let line = line.as_ref();
        is_data_line(line).then(|| line.trim().to_string())
    })
}
