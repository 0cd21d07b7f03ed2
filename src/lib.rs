//! Catalog Seed: flat catalog dump to batched SQL insert pipeline
//!
//! This crate turns a hand-maintained dump of catalog rows, one parenthesized
//! tuple of quoted fields per line, into ready-to-run `INSERT` statements:
//!
//! 1. **Line filter** -- Drop blank lines, comments and the statement preamble;
//!    keep only tuples carrying the generated-id placeholder
//! 2. **Tuple extraction** -- Take the first five quoted literals of a row as
//!    code, name, description, fine category and color
//! 3. **Escaping** -- Double single quotes exactly once per field
//! 4. **Category normalization** -- Map fine categories onto a small coarse
//!    taxonomy, with a catch-all bucket for unknown labels
//! 5. **Batching** -- Render fixed-size `INSERT ... ON CONFLICT DO NOTHING`
//!    statements so duplicate codes are skipped instead of failing the load
//!
//! # Key Modules
//!
//! - [`filter`] -- Line classification
//! - [`parser`] -- Quoted-literal tuple extraction
//! - [`escape`] -- SQL string escaping
//! - [`taxonomy`] -- Injectable fine-to-coarse category table (JSON on disk)
//! - [`emit`] -- Statement rendering and batching
//! - [`convert`] -- File handling and the end-to-end run
//! - [`models`] -- Record and target table types
//! - [`stats`] -- Atomic counters for the run summary
//! - [`config`] -- Defaults and constants
//!
//! # Example Usage
//!
//! ```bash
//! # Convert with the built-in taxonomy
//! catalog-seed convert -i codigos_dump.sql -o seed.sql
//!
//! # Dump the taxonomy, edit it, and use it
//! catalog-seed taxonomy -o taxonomy.json
//! catalog-seed convert -i codigos_dump.sql.bz2 -o seed.sql --taxonomy taxonomy.json
//! ```

pub mod config;
pub mod convert;
pub mod emit;
pub mod escape;
pub mod filter;
pub mod models;
pub mod parser;
pub mod stats;
pub mod taxonomy;
