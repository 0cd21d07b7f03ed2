use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected while converting a dump
#[derive(Default)]
pub struct ConversionStats {
    pub lines_read: AtomicU64,
    pub data_lines: AtomicU64,
    pub records_extracted: AtomicU64,
    pub lines_dropped: AtomicU64,
    pub unknown_categories: AtomicU64,
    pub batches_written: AtomicU64,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_lines(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_data_lines(&self) {
        self.data_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_records(&self) {
        self.records_extracted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dropped(&self) {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_unknown_categories(&self) {
        self.unknown_categories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_batches(&self, count: u64) {
        self.batches_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn lines(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn data(&self) -> u64 {
        self.data_lines.load(Ordering::Relaxed)
    }

    pub fn records(&self) -> u64 {
        self.records_extracted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.lines_dropped.load(Ordering::Relaxed)
    }

    pub fn unknown_categories(&self) -> u64 {
        self.unknown_categories.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }
}
