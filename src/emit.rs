use crate::models::{NormalizedRecord, TargetTable};
use anyhow::{bail, Result};
use std::io::Write;
use tracing::{debug, trace};

/// Single row literal: `('code', 'name', 'description', 'category', 'color')`.
pub fn render_row(record: &NormalizedRecord) -> String {
    let [code, name, description, category, color] = record.fields();
    let mut row = String::with_capacity(
        code.len() + name.len() + description.len() + category.len() + color.len() + 20,
    );
    row.push_str("('");
    row.push_str(code);
    row.push_str("', '");
    row.push_str(name);
    row.push_str("', '");
    row.push_str(description);
    row.push_str("', '");
    row.push_str(category);
    row.push_str("', '");
    row.push_str(color);
    row.push_str("')");
    row
}

/// One INSERT statement for `batch`, ending in the conflict-skip clause and a blank line.
pub fn render_batch(batch: &[NormalizedRecord], table: &TargetTable) -> String {
    let values = batch
        .iter()
        .map(render_row)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({})\nVALUES\n{}\nON CONFLICT ({}) DO NOTHING;\n\n",
        table.name,
        table.columns.join(", "),
        values,
        table.conflict_column
    )
}

/// Number of statements `records` rows produce at `batch_size`.
pub fn batch_count(records: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    records.div_ceil(batch_size)
}

/// Writes the fixed header, one statement per batch, and the trailing summary.
pub struct Emitter<W: Write> {
    writer: W,
    table: TargetTable,
    batch_size: usize,
    batches_written: usize,
    records_written: usize,
}

impl<W: Write> Emitter<W> {
    pub fn new(writer: W, table: TargetTable, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            bail!("Batch size must be at least 1");
        }
        Ok(Self {
            writer,
            table,
            batch_size,
            batches_written: 0,
            records_written: 0,
        })
    }

    /// Three comment lines describing the transformation, then a blank line.
    pub fn write_header(&mut self, categories: &[&str]) -> Result<()> {
        writeln!(
            self.writer,
            "-- Batched INSERT of catalog codes for {}",
            self.table.name
        )?;
        writeln!(
            self.writer,
            "-- Categories grouped into: {}",
            categories.join(", ")
        )?;
        writeln!(
            self.writer,
            "-- Rows whose {} already exists (in the table or in this file) are skipped (DO NOTHING).",
            self.table.conflict_column
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    /// Chunks `records` in input order; only the last batch may be short.
    pub fn write_batches(&mut self, records: &[NormalizedRecord]) -> Result<()> {
        for batch in records.chunks(self.batch_size) {
            self.writer
                .write_all(render_batch(batch, &self.table).as_bytes())?;
            self.batches_written += 1;
            self.records_written += batch.len();
            trace!(
                batch = self.batches_written,
                rows = batch.len(),
                "Batch written"
            );
        }
        debug!(
            batches = self.batches_written,
            records = self.records_written,
            "Batches written"
        );
        Ok(())
    }

    pub fn write_summary(&mut self, destination: &str) -> Result<()> {
        writeln!(
            self.writer,
            "-- Generated {} rows in {}",
            self.records_written, destination
        )?;
        Ok(())
    }

    pub fn batches_written(&self) -> usize {
        self.batches_written
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flushes and hands back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
