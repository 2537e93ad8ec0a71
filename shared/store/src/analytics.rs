//! Analytics persistence
//!
//! Counters live in memory and are written back to a JSON file after each
//! recorded event.

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use tendersheet_models::AnalyticsStats;
use tendersheet_utils::TenderResult;

use crate::persist::replace_file;

pub struct AnalyticsStore {
    path: PathBuf,
    stats: Mutex<AnalyticsStats>,
    /// Orders whole flushes so an older snapshot never replaces a newer one.
    flush_lock: Mutex<()>,
}

impl AnalyticsStore {
    /// Reads previous counters from `path`. Missing or corrupt files start
    /// from zero.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stats = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable analytics file");
                AnalyticsStats::default()
            }),
            Err(_) => AnalyticsStats::default(),
        };
        info!(path = %path.display(), total_uploads = stats.total_uploads, "Analytics loaded");

        Self {
            path,
            stats: Mutex::new(stats),
            flush_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, file_type: &str, success: bool, processing_time: Option<f64>) {
        self.stats.lock().record(file_type, success, processing_time);
    }

    pub fn snapshot(&self) -> AnalyticsStats {
        self.stats.lock().clone()
    }

    pub fn flush(&self) -> TenderResult<()> {
        let _flushing = self.flush_lock.lock();
        let contents = serde_json::to_string_pretty(&*self.stats.lock())?;
        replace_file(&self.path, &contents)
    }

    /// Records an event and persists it. Write failures are logged only.
    pub fn record_and_flush(&self, file_type: &str, success: bool, processing_time: Option<f64>) {
        self.record(file_type, success, processing_time);
        if let Err(e) = self.flush() {
            error!(path = %self.path.display(), error = %e, "Error saving analytics");
        }
    }
}
