use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected while a job runs
#[derive(Default, Debug)]
pub struct JobStats {
    pub rows_read: AtomicU64,
    pub records_written: AtomicU64,
    pub invalid_zips: AtomicU64,
    pub names_parsed: AtomicU64,
    pub blank_date_drops: AtomicU64,
    pub beyond_radius: AtomicU64,
    pub do_not_mail_hits: AtomicU64,
    pub suppressed_name_hits: AtomicU64,
    pub suppressed_address_hits: AtomicU64,
}

impl JobStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_rows_read(&self) {
        self.rows_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_records_written(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_invalid_zips(&self) {
        self.invalid_zips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_names_parsed(&self) {
        self.names_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_blank_date_drops(&self) {
        self.blank_date_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_beyond_radius(&self) {
        self.beyond_radius.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_do_not_mail(&self) {
        self.do_not_mail_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_suppressed_name(&self) {
        self.suppressed_name_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_suppressed_address(&self) {
        self.suppressed_address_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read.load(Ordering::Relaxed)
    }

    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn invalid_zips(&self) -> u64 {
        self.invalid_zips.load(Ordering::Relaxed)
    }

    pub fn names_parsed(&self) -> u64 {
        self.names_parsed.load(Ordering::Relaxed)
    }

    pub fn blank_date_drops(&self) -> u64 {
        self.blank_date_drops.load(Ordering::Relaxed)
    }

    pub fn beyond_radius(&self) -> u64 {
        self.beyond_radius.load(Ordering::Relaxed)
    }

    pub fn do_not_mail(&self) -> u64 {
        self.do_not_mail_hits.load(Ordering::Relaxed)
    }

    pub fn suppressed_names(&self) -> u64 {
        self.suppressed_name_hits.load(Ordering::Relaxed)
    }

    pub fn suppressed_addresses(&self) -> u64 {
        self.suppressed_address_hits.load(Ordering::Relaxed)
    }
}
