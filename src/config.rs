/// Default number of rows rendered into a single INSERT statement
pub const DEFAULT_BATCH_SIZE: usize = 80;

/// Prefix marking a line comment in the input dump
pub const COMMENT_MARKER: &str = "--";

/// Prefix of the statement preamble line (`INSERT INTO ... VALUES`)
pub const PREAMBLE_PREFIX: &str = "INSERT INTO";

/// Generated-value placeholder that every genuine data row carries
pub const ROW_ID_MARKER: &str = "gen_random_uuid()";

/// Number of quoted fields that make up one record
pub const RECORD_FIELDS: usize = 5;

pub const DEFAULT_TABLE: &str = "public.codigos_grabovoi";

/// Destination columns in record order: code, name, description, category, color
pub const DEFAULT_COLUMNS: [&str; RECORD_FIELDS] =
    ["codigo", "nombre", "descripcion", "categoria", "color"];

/// Coarse bucket for fine categories the taxonomy does not know
pub const DEFAULT_CATEGORY: &str = "Otros";

/// Progress update interval (tick every N input lines)
pub const PROGRESS_INTERVAL: u64 = 1000;

pub const READ_BUFFER_SIZE: usize = 128 * 1024;
pub const WRITE_BUFFER_SIZE: usize = 256 * 1024;
