//! End-to-end tests for the catalog dump conversion pipeline.
//!
//! Each test writes a small dump into its own `TempDir`, runs
//! `convert::run_conversion()` and inspects the generated SQL file.
//!
//! - **Scenario tests** -- escaped quotes, short rows, unknown categories
//! - **Batching tests** -- statement count, sizes and ordering
//! - **I/O tests** -- missing input, missing output directory, bz2 input
//! - **Configuration tests** -- custom taxonomy and destination table

use anyhow::Result;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use catalog_seed::convert::{run_conversion, ConvertConfig};
use catalog_seed::models::TargetTable;
use catalog_seed::taxonomy::CategoryTaxonomy;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREAMBLE: &str =
    "INSERT INTO codigos (n, id, codigo, nombre, descripcion, categoria, color) VALUES";

fn data_line(n: usize, code: &str, category: &str) -> String {
    format!(
        "({}, gen_random_uuid(), '{}', 'Name {}', 'Description {}', '{}', '#FF0000'),",
        n, code, n, n, category
    )
}

/// Dump with a comment header, the preamble and `n` valid rows.
fn dump_with_rows(n: usize) -> String {
    let mut out = String::from("-- generated catalog\n");
    out.push_str(PREAMBLE);
    out.push('\n');
    for i in 0..n {
        out.push_str(&data_line(i + 1, &format!("{:04}", i), "Tumores"));
        out.push('\n');
    }
    out
}

fn write_input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn statements(output: &str) -> Vec<&str> {
    output
        .split("INSERT INTO")
        .skip(1)
        .collect()
}

fn row_count(statement: &str) -> usize {
    statement.matches("('").count()
}

fn run(input: &Path, output: &Path) -> Result<(usize, String)> {
    let outcome = run_conversion(&ConvertConfig::new(input, output))?;
    Ok((outcome.records, fs::read_to_string(output)?))
}

#[test]
fn escaped_quote_scenario() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "dump.sql",
        &format!(
            "{}\n(1, gen_random_uuid(), '111', 'Test Code', 'A code''s description', 'Tumores', '#FF0000'),\n",
            PREAMBLE
        ),
    );
    let output = dir.path().join("seed.sql");

    let (records, sql) = run(&input, &output)?;
    assert_eq!(records, 1);
    assert!(sql.contains("('111', 'Test Code', 'A code''s description', 'Salud', '#FF0000')"));
    assert!(!sql.contains("Tumores"));
    Ok(())
}

#[test]
fn short_row_is_dropped_silently() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "dump.sql",
        &format!(
            "{}\n(1, gen_random_uuid(), '111', 'Short', 'Row'),\n{}\n",
            PREAMBLE,
            data_line(2, "222", "Piel")
        ),
    );
    let output = dir.path().join("seed.sql");

    let (records, sql) = run(&input, &output)?;
    assert_eq!(records, 1);
    assert!(!sql.contains("'111'"));
    assert!(sql.contains("('222', "));
    Ok(())
}

#[test]
fn only_short_rows_produce_header_and_zero_summary() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "dump.sql",
        &format!("{}\n(1, gen_random_uuid(), 'a', 'b', 'c');\n", PREAMBLE),
    );
    let output = dir.path().join("seed.sql");

    let (records, sql) = run(&input, &output)?;
    assert_eq!(records, 0);
    assert!(statements(&sql).is_empty());
    assert_eq!(sql.lines().filter(|l| l.starts_with("-- ")).count(), 4);
    assert!(sql.trim_end().ends_with(&format!("-- Generated 0 rows in {}", output.display())));
    Ok(())
}

#[test]
fn eighty_five_rows_make_two_batches() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(&dir, "dump.sql", &dump_with_rows(85));
    let output = dir.path().join("seed.sql");

    let outcome = run_conversion(&ConvertConfig::new(&input, &output))?;
    assert_eq!(outcome.records, 85);
    assert_eq!(outcome.stats.batches(), 2);

    let sql = fs::read_to_string(&output)?;
    let stmts = statements(&sql);
    assert_eq!(stmts.len(), 2);
    assert_eq!(row_count(stmts[0]), 80);
    assert_eq!(row_count(stmts[1]), 5);
    for stmt in &stmts {
        assert!(stmt.contains("ON CONFLICT (codigo) DO NOTHING;"));
    }
    assert!(sql.contains("-- Generated 85 rows in"));
    Ok(())
}

#[test]
fn output_header_is_three_comment_lines() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(&dir, "dump.sql", &dump_with_rows(1));
    let output = dir.path().join("seed.sql");

    let (_, sql) = run(&input, &output)?;
    let lines: Vec<&str> = sql.lines().collect();
    assert!(lines[..3].iter().all(|l| l.starts_with("-- ")));
    assert_eq!(
        lines[1],
        "-- Categories grouped into: Crecimiento personal, Energía y vitalidad, Otros, Salud"
    );
    assert_eq!(lines[3], "");
    assert_eq!(
        lines[4],
        "INSERT INTO public.codigos_grabovoi (codigo, nombre, descripcion, categoria, color)"
    );
    assert_eq!(lines[5], "VALUES");
    Ok(())
}

#[test]
fn order_is_preserved_with_drops_and_noise() -> Result<()> {
    let dir = TempDir::new()?;
    let mut dump = format!("-- header\n{}\n", PREAMBLE);
    for i in 0..30 {
        match i % 5 {
            0 => dump.push_str("(0, gen_random_uuid(), 'bad'),\n"),
            1 => dump.push_str("  -- commented out row\n\n"),
            _ => {}
        }
        dump.push_str(&data_line(i, &format!("C{:02}", i), "Piel"));
        dump.push('\n');
    }
    let input = write_input(&dir, "dump.sql", &dump);

    for parallel in [false, true] {
        let output = dir.path().join(format!("seed_{}.sql", parallel));
        let mut config = ConvertConfig::new(&input, &output);
        config.batch_size = 7;
        config.parallel = parallel;

        let outcome = run_conversion(&config)?;
        assert_eq!(outcome.records, 30);
        assert_eq!(outcome.stats.dropped(), 6);

        let sql = fs::read_to_string(&output)?;
        let codes: Vec<String> = sql
            .match_indices("('C")
            .map(|(i, _)| sql[i + 2..i + 5].to_string())
            .collect();
        let expected: Vec<String> = (0..30).map(|i| format!("C{:02}", i)).collect();
        assert_eq!(codes, expected);
        assert_eq!(statements(&sql).len(), 5);
    }
    Ok(())
}

#[test]
fn duplicate_codes_are_all_emitted() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "dump.sql",
        &format!(
            "{}\n{}\n{}\n",
            PREAMBLE,
            data_line(1, "111", "Piel"),
            data_line(2, "111", "Nervioso")
        ),
    );
    let output = dir.path().join("seed.sql");

    let (records, sql) = run(&input, &output)?;
    assert_eq!(records, 2);
    assert_eq!(sql.matches("('111', ").count(), 2);
    assert_eq!(sql.matches("ON CONFLICT (codigo) DO NOTHING;").count(), 1);
    Ok(())
}

#[test]
fn unknown_category_uses_default_bucket() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "dump.sql",
        &format!(
            "{}\n{}\n{}\n",
            PREAMBLE,
            data_line(1, "1", "Astrología"),
            data_line(2, "2", "")
        ),
    );
    let output = dir.path().join("seed.sql");

    let outcome = run_conversion(&ConvertConfig::new(&input, &output))?;
    assert_eq!(outcome.stats.unknown_categories(), 2);

    let sql = fs::read_to_string(&output)?;
    assert_eq!(sql.matches("'Otros', '#FF0000')").count(), 2);
    Ok(())
}

#[test]
fn missing_input_fails_with_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.sql");
    let output = dir.path().join("seed.sql");

    let err = match run_conversion(&ConvertConfig::new(&input, &output)) {
        Ok(_) => panic!("expected failure"),
        Err(e) => e,
    };
    assert!(format!("{:#}", err).contains("missing.sql"));
    assert!(!output.exists());
}

#[test]
fn missing_output_directory_fails_with_path() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "dump.sql", &dump_with_rows(3));
    let output = dir.path().join("no_such_dir").join("seed.sql");

    let err = match run_conversion(&ConvertConfig::new(&input, &output)) {
        Ok(_) => panic!("expected failure"),
        Err(e) => e,
    };
    let message = format!("{:#}", err);
    assert!(message.contains("no_such_dir"));
    assert!(!output.exists());
}

#[test]
fn existing_output_is_replaced() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(&dir, "dump.sql", &dump_with_rows(2));
    let output = write_input(&dir, "seed.sql", "stale contents");

    let (records, sql) = run(&input, &output)?;
    assert_eq!(records, 2);
    assert!(!sql.contains("stale contents"));
    Ok(())
}

#[test]
fn dry_run_writes_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(&dir, "dump.sql", &dump_with_rows(161));
    let output = dir.path().join("seed.sql");

    let mut config = ConvertConfig::new(&input, &output);
    config.dry_run = true;
    let outcome = run_conversion(&config)?;

    assert_eq!(outcome.records, 161);
    assert_eq!(outcome.stats.batches(), 3);
    assert!(!output.exists());
    Ok(())
}

#[test]
fn bz2_input_is_decompressed() -> Result<()> {
    let dir = TempDir::new()?;
    let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(dump_with_rows(12).as_bytes())?;
    let input = dir.path().join("dump.sql.bz2");
    fs::write(&input, encoder.finish()?)?;
    let output = dir.path().join("seed.sql");

    let (records, sql) = run(&input, &output)?;
    assert_eq!(records, 12);
    assert_eq!(statements(&sql).len(), 1);
    Ok(())
}

#[test]
fn custom_taxonomy_and_table() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(
        &dir,
        "dump.sql",
        &format!(
            "{}\n{}\n{}\n",
            PREAMBLE,
            data_line(1, "1", "Tumores"),
            data_line(2, "2", "Piel")
        ),
    );
    let taxonomy_path = write_input(
        &dir,
        "taxonomy.json",
        r#"{"default": "Misc", "mappings": {"Tumores": "Health"}}"#,
    );
    let output = dir.path().join("seed.sql");

    let columns: Vec<String> = ["code", "title", "body", "kind", "hue"]
        .map(String::from)
        .to_vec();
    let mut config = ConvertConfig::new(&input, &output);
    config.taxonomy = CategoryTaxonomy::load(&taxonomy_path)?;
    config.table = TargetTable::new("catalog.items", &columns, None)?;
    run_conversion(&config)?;

    let sql = fs::read_to_string(&output)?;
    assert!(sql.contains("INSERT INTO catalog.items (code, title, body, kind, hue)"));
    assert!(sql.contains("ON CONFLICT (code) DO NOTHING;"));
    assert!(sql.contains("'Health', '#FF0000')"));
    assert!(sql.contains("'Misc', '#FF0000')"));
    assert!(sql.contains("-- Categories grouped into: Health, Misc"));
    Ok(())
}

#[test]
fn limit_takes_first_records() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_input(&dir, "dump.sql", &dump_with_rows(20));
    let output = dir.path().join("seed.sql");

    let mut config = ConvertConfig::new(&input, &output);
    config.limit = Some(3);
    let outcome = run_conversion(&config)?;
    assert_eq!(outcome.records, 3);

    let sql = fs::read_to_string(&output)?;
    assert!(sql.contains("('0000', "));
    assert!(sql.contains("('0002', "));
    assert!(!sql.contains("('0003', "));
    Ok(())
}
