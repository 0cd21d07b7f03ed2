/// Doubles every single quote so the text can sit inside a SQL string literal.
///
/// Not idempotent: apply exactly once, right after extraction.
pub fn escape_sql(s: &str) -> String {
    if s.contains('\'') {
        s.replace('\'', "''")
    } else {
        s.to_string()
    }
}

/// Collapses each `''` pair back into one quote.
pub fn unescape_sql(s: &str) -> String {
    if s.contains("''") {
        s.replace("''", "'")
    } else {
        s.to_string()
    }
}
