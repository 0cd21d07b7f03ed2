use crate::config::{DEFAULT_BATCH_SIZE, PROGRESS_INTERVAL, READ_BUFFER_SIZE, WRITE_BUFFER_SIZE};
use crate::emit::{batch_count, Emitter};
use crate::filter::{classify, LineKind};
use crate::models::{NormalizedRecord, TargetTable};
use crate::parser::extract_record;
use crate::stats::ConversionStats;
use crate::taxonomy::CategoryTaxonomy;
use anyhow::{bail, Context, Result};
use bzip2::read::BzDecoder;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Everything one conversion run needs. The CLI is just one way of filling it in.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub batch_size: usize,
    pub taxonomy: CategoryTaxonomy,
    pub table: TargetTable,
    /// Stop after this many accepted records
    pub limit: Option<u64>,
    pub dry_run: bool,
    /// Extract and normalize data lines on the rayon pool
    pub parallel: bool,
}

impl ConvertConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            taxonomy: CategoryTaxonomy::builtin(),
            table: TargetTable::default(),
            limit: None,
            dry_run: false,
            parallel: false,
        }
    }
}

/// Opens the dump, decompressing `.bz2` files on the fly.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open input file: {:?}", path))?;

    let is_bz2 = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bz2"));

    if is_bz2 {
        debug!(path = ?path, "Reading bzip2-compressed input");
        Ok(Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            BzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

/// Extract, escape and normalize one data line. Lines with fewer than five
/// quoted fields are dropped here and never reach the emitter.
fn process_line(
    line: &str,
    taxonomy: &CategoryTaxonomy,
    stats: &ConversionStats,
) -> Option<NormalizedRecord> {
    let Some(raw) = extract_record(line) else {
        stats.inc_dropped();
        trace!(line = line, "Data line has fewer than five quoted fields");
        return None;
    };

    if !taxonomy.is_known(&raw.fine_category) {
        stats.inc_unknown_categories();
    }
    stats.inc_records();
    Some(NormalizedRecord::from_raw(raw, taxonomy))
}

/// Reads the whole dump and returns normalized records in input order.
pub fn read_records<R: BufRead>(
    reader: R,
    config: &ConvertConfig,
    stats: &ConversionStats,
) -> Result<Vec<NormalizedRecord>> {
    let pb = ProgressBar::new_spinner();
    let mut records = Vec::new();
    let mut pending = Vec::new();

    for line in reader.lines() {
        let line =
            line.with_context(|| format!("Failed to read input file: {:?}", config.input))?;
        stats.inc_lines();
        if stats.lines() % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }

        match classify(&line) {
            LineKind::Data => {}
            LineKind::Noise => {
                trace!(line = line.trim(), "Skipping non-data line");
                continue;
            }
            _ => continue,
        }
        stats.inc_data_lines();

        if config.parallel {
            pending.push(line);
            continue;
        }

        if config.limit.is_some_and(|limit| records.len() as u64 >= limit) {
            debug!(limit = ?config.limit, "Record limit reached");
            break;
        }
        if let Some(record) = process_line(&line, &config.taxonomy, stats) {
            records.push(record);
        }
    }

    if config.parallel {
        // collect() keeps input order, so dropped lines never shift later records
        records = pending
            .par_iter()
            .filter_map(|line| process_line(line, &config.taxonomy, stats))
            .collect();
        if let Some(limit) = config.limit {
            records.truncate(limit as usize);
        }
    }

    pb.finish_and_clear();

    info!(
        lines = stats.lines(),
        data_lines = stats.data(),
        records = records.len(),
        dropped = stats.dropped(),
        unknown_categories = stats.unknown_categories(),
        "Input parsed"
    );

    Ok(records)
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes header, batches and summary to a temp file, then renames it over the output.
pub fn write_output(
    records: &[NormalizedRecord],
    config: &ConvertConfig,
    stats: &ConversionStats,
) -> Result<()> {
    let tmp_path = temp_path(&config.output);
    let file = File::create(&tmp_path)
        .with_context(|| format!("Failed to create output file: {:?}", config.output))?;

    let writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    let result = write_statements(writer, records, config, stats)
        .with_context(|| format!("Failed to write output file: {:?}", config.output))
        .and_then(|()| {
            fs::rename(&tmp_path, &config.output).with_context(|| {
                format!("Failed to rename temp output file to: {:?}", config.output)
            })
        });

    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!(error = %e, path = ?tmp_path, "Failed to remove temp output file");
        }
    }
    result
}

fn write_statements(
    writer: BufWriter<File>,
    records: &[NormalizedRecord],
    config: &ConvertConfig,
    stats: &ConversionStats,
) -> Result<()> {
    let mut emitter = Emitter::new(writer, config.table.clone(), config.batch_size)?;
    emitter.write_header(&config.taxonomy.output_labels())?;
    emitter.write_batches(records)?;
    emitter.write_summary(&config.output.display().to_string())?;
    stats.add_batches(emitter.batches_written() as u64);

    let writer = emitter.finish()?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .sync_all()?;
    Ok(())
}

/// What a finished run produced.
pub struct ConversionOutcome {
    /// Rows rendered into the output (after any limit)
    pub records: usize,
    pub stats: ConversionStats,
}

/// Runs the whole pipeline: read, normalize, batch, write.
pub fn run_conversion(config: &ConvertConfig) -> Result<ConversionOutcome> {
    info!(
        input = ?config.input,
        output = ?config.output,
        batch_size = config.batch_size,
        table = %config.table.name,
        "Starting conversion"
    );

    // Fail on bad settings before touching any file
    if config.batch_size == 0 {
        bail!("Batch size must be at least 1");
    }

    let stats = ConversionStats::new();
    let reader = open_input(&config.input)?;
    let records = read_records(reader, config, &stats)?;

    if config.dry_run {
        stats.add_batches(batch_count(records.len(), config.batch_size) as u64);
        info!(
            records = records.len(),
            batches = stats.batches(),
            "Dry run, no output written"
        );
        return Ok(ConversionOutcome {
            records: records.len(),
            stats,
        });
    }

    write_output(&records, config, &stats)?;

    info!(
        records = records.len(),
        batches = stats.batches(),
        path = ?config.output,
        "Output written"
    );

    Ok(ConversionOutcome {
        records: records.len(),
        stats,
    })
}
