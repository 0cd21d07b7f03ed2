use crate::config::{DEFAULT_COLUMNS, DEFAULT_TABLE, RECORD_FIELDS};
use crate::escape::escape_sql;
use crate::taxonomy::CategoryTaxonomy;
use anyhow::{bail, Result};

/// One catalog row as it appears in the dump, with `''` already collapsed to `'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub code: String,
    pub name: String,
    pub description: String,
    pub fine_category: String,
    pub color: String,
}

/// A record ready for rendering: every field escaped, category coarsened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub color: String,
}

impl NormalizedRecord {
    /// Escapes each field exactly once. The category is looked up on the raw
    /// label so taxonomy keys never need to be written in escaped form.
    pub fn from_raw(raw: RawRecord, taxonomy: &CategoryTaxonomy) -> Self {
        let category = taxonomy.normalize(&raw.fine_category);
        Self {
            code: escape_sql(&raw.code),
            name: escape_sql(&raw.name),
            description: escape_sql(&raw.description),
            category: escape_sql(category),
            color: escape_sql(&raw.color),
        }
    }

    pub fn fields(&self) -> [&str; RECORD_FIELDS] {
        [
            self.code.as_str(),
            self.name.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.color.as_str(),
        ]
    }
}

/// Destination table of the generated statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub name: String,
    pub columns: [String; RECORD_FIELDS],
    pub conflict_column: String,
}

impl TargetTable {
    /// Conflict key defaults to the first (code) column.
    pub fn new(name: &str, columns: &[String], conflict_column: Option<&str>) -> Result<Self> {
        if name.trim().is_empty() {
            bail!("Table name must not be empty");
        }
        let columns: [String; RECORD_FIELDS] = match columns.to_vec().try_into() {
            Ok(cols) => cols,
            Err(cols) => bail!(
                "Expected exactly {} columns, got {}",
                RECORD_FIELDS,
                cols.len()
            ),
        };
        if let Some(empty) = columns.iter().position(|c| c.trim().is_empty()) {
            bail!("Column {} has an empty name", empty + 1);
        }
        let conflict_column = conflict_column.unwrap_or(columns[0].as_str()).to_string();
        Ok(Self {
            name: name.to_string(),
            columns,
            conflict_column,
        })
    }
}

impl Default for TargetTable {
    fn default() -> Self {
        Self {
            name: DEFAULT_TABLE.to_string(),
            columns: DEFAULT_COLUMNS.map(String::from),
            conflict_column: DEFAULT_COLUMNS[0].to_string(),
        }
    }
}
