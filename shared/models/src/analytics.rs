use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of processing-time samples kept.
pub const MAX_PROCESSING_SAMPLES: usize = 100;

/// Usage counters persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsStats {
    #[serde(default)]
    pub total_uploads: u64,
    #[serde(default)]
    pub successful_generations: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub file_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub processing_times: Vec<f64>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl AnalyticsStats {
    pub fn record(&mut self, file_type: &str, success: bool, processing_time: Option<f64>) {
        self.total_uploads += 1;
        *self.file_types.entry(file_type.to_string()).or_insert(0) += 1;
        self.last_activity = Some(Utc::now());

        if success {
            self.successful_generations += 1;
        } else {
            self.errors += 1;
        }

        if let Some(seconds) = processing_time.filter(|s| *s > 0.0) {
            self.processing_times.push(seconds);
            let overflow = self.processing_times.len().saturating_sub(MAX_PROCESSING_SAMPLES);
            self.processing_times.drain(..overflow);
        }
    }

    pub fn average_processing_time(&self) -> Option<f64> {
        if self.processing_times.is_empty() {
            return None;
        }
        Some(self.processing_times.iter().sum::<f64>() / self.processing_times.len() as f64)
    }
}
