use crate::config::RECORD_FIELDS;
use crate::escape::unescape_sql;
use crate::models::RawRecord;
use once_cell::sync::Lazy;
use regex::Regex;

/// One single-quoted literal; `''` inside it is content, not a delimiter.
static QUOTED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"'((?:[^']|'')*)'").unwrap());

/// Drops the trailing statement terminator and row separator (`)`, `;`, `,`).
pub fn strip_terminator(line: &str) -> &str {
    line.trim()
        .trim_end_matches([')', ';', ','])
        .trim_end()
}

fn segments(line: &str) -> impl Iterator<Item = String> + '_ {
    QUOTED_REGEX
        .captures_iter(line)
        .map(|c| unescape_sql(&c[1]))
}

/// Every quoted segment in order of appearance, unescaped.
pub fn quoted_segments(line: &str) -> Vec<String> {
    segments(line).collect()
}

/// Takes the first five quoted segments as (code, name, description,
/// fine category, color). Extra segments are ignored; fewer than five yields `None`.
pub fn extract_record(line: &str) -> Option<RawRecord> {
    let line = strip_terminator(line);
    let mut fields = segments(line).take(RECORD_FIELDS);

    let code = fields.next()?;
    let name = fields.next()?;
    let description = fields.next()?;
    let fine_category = fields.next()?;
    let color = fields.next()?;

    Some(RawRecord {
        code,
        name,
        description,
        fine_category,
        color,
    })
}
