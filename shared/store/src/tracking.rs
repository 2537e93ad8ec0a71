use std::sync::Arc;

use tendersheet_models::{AnalyticsStats, TaskProgress};
use tendersheet_utils::ProgressTracker;

use crate::analytics::AnalyticsStore;

/// Progress slots and usage analytics shared by request handlers.
#[derive(Clone)]
pub struct TrackingService {
    progress: ProgressTracker,
    analytics: Arc<AnalyticsStore>,
}

impl TrackingService {
    pub fn new(progress: ProgressTracker, analytics: AnalyticsStore) -> Self {
        Self {
            progress,
            analytics: Arc::new(analytics),
        }
    }

    pub fn progress_tracker(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn progress(&self, task_id: &str) -> Option<TaskProgress> {
        self.progress.get_progress(task_id)
    }

    pub fn record_event(&self, file_type: &str, success: bool, processing_time: Option<f64>) {
        self.analytics.record_and_flush(file_type, success, processing_time);
    }

    pub fn analytics(&self) -> AnalyticsStats {
        self.analytics.snapshot()
    }
}
