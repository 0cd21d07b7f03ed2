use anyhow::{Context, Result};
use catalog_seed::config::{DEFAULT_BATCH_SIZE, DEFAULT_COLUMNS, DEFAULT_TABLE};
use catalog_seed::convert::{run_conversion, ConvertConfig};
use catalog_seed::models::TargetTable;
use catalog_seed::taxonomy::CategoryTaxonomy;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "catalog-seed")]
#[command(about = "Turn catalog dumps into batched, conflict-safe SQL inserts")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a dump into batched INSERT statements
    Convert(ConvertArgs),
    /// Print the built-in category taxonomy as JSON
    Taxonomy(TaxonomyArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to the dump file (.sql or .sql.bz2)
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the generated SQL file
    #[arg(short, long)]
    output: PathBuf,

    /// Rows per INSERT statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// JSON taxonomy file (defaults to the built-in taxonomy)
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Destination table
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Destination columns: code, name, description, category, color
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_COLUMNS.map(String::from))]
    columns: Vec<String>,

    /// Unique key column for ON CONFLICT (defaults to the first column)
    #[arg(long)]
    conflict_column: Option<String>,

    /// Limit number of records to convert (for testing)
    #[arg(long)]
    limit: Option<u64>,

    /// Dry run - don't write the output file
    #[arg(long)]
    dry_run: bool,

    /// Extract data lines in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct TaxonomyArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let taxonomy = match &args.taxonomy {
        Some(path) => CategoryTaxonomy::load(path)?,
        None => CategoryTaxonomy::builtin(),
    };
    let table = TargetTable::new(&args.table, &args.columns, args.conflict_column.as_deref())?;

    let config = ConvertConfig {
        input: args.input,
        output: args.output,
        batch_size: args.batch_size,
        taxonomy,
        table,
        limit: args.limit,
        dry_run: args.dry_run,
        parallel: args.parallel,
    };

    let start = Instant::now();
    let outcome = run_conversion(&config)?;
    let stats = &outcome.stats;
    let duration = start.elapsed();

    println!();
    println!("=== Summary ===");
    println!("Total time:         {:.2}s", duration.as_secs_f64());
    println!("Lines read:         {}", stats.lines());
    println!("Data lines:         {}", stats.data());
    println!("Lines dropped:      {}", stats.dropped());
    println!("Unknown categories: {}", stats.unknown_categories());
    println!("Batches:            {}", stats.batches());
    println!();
    if config.dry_run {
        println!("Dry run: {} rows, nothing written", outcome.records);
    } else {
        println!(
            "Generated {} rows in {}",
            outcome.records,
            config.output.display()
        );
    }

    Ok(())
}

fn run_taxonomy(args: TaxonomyArgs) -> Result<()> {
    let taxonomy = CategoryTaxonomy::builtin();
    match args.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create taxonomy file: {:?}", path))?;
            taxonomy.write_json(file)?;
            info!(path = ?path, "Taxonomy written");
        }
        None => taxonomy.write_json(io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Taxonomy(args) => run_taxonomy(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
