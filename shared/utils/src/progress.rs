//! In-memory progress tracker
//!
//! One slot per task id. Every read and write goes through the same mutex,
//! so concurrent requests see consistent snapshots.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tendersheet_models::TaskProgress;

/// Derives the progress slot for a parse of `path`. Depends on the path only,
/// not on file contents, so two parses of the same path share a slot.
pub fn task_id_for_path(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    format!("parse_{}", &hex::encode(digest)[..8])
}

#[derive(Clone, Default)]
pub struct ProgressTracker {
    tasks: Arc<Mutex<HashMap<String, TaskProgress>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a task.
    pub fn start_task(&self, task_id: &str, total_steps: u32) {
        self.tasks
            .lock()
            .insert(task_id.to_string(), TaskProgress::new(task_id, total_steps));
    }

    pub fn update_progress(&self, task_id: &str, step: u32, message: &str) {
        if let Some(task) = self.tasks.lock().get_mut(task_id) {
            task.advance(step, message);
        }
    }

    /// Finalizes a task. A second call for the same run is ignored.
    pub fn complete_task(&self, task_id: &str, success: bool) {
        if let Some(task) = self.tasks.lock().get_mut(task_id) {
            if !task.finish(success) {
                tracing::debug!(task_id, "Task already finalized");
            }
        }
    }

    pub fn get_progress(&self, task_id: &str) -> Option<TaskProgress> {
        self.tasks.lock().get(task_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tendersheet_models::TaskStatus;

    #[test]
    fn test_task_id_is_stable_per_path() {
        let a = task_id_for_path(Path::new("uploads/nit.xlsx"));
        let b = task_id_for_path(Path::new("uploads/nit.xlsx"));
        let c = task_id_for_path(Path::new("uploads/other.xlsx"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("parse_"));
        assert_eq!(a.len(), "parse_".len() + 8);
    }

    #[test]
    fn test_lifecycle() {
        let tracker = ProgressTracker::new();
        tracker.start_task("parse_x", 5);
        tracker.update_progress("parse_x", 1, "File found");
        tracker.update_progress("parse_x", 3, "Reading");
        tracker.complete_task("parse_x", true);
        tracker.complete_task("parse_x", false);

        let progress = tracker.get_progress("parse_x").unwrap();
        assert_eq!(progress.current_step, 3);
        assert_eq!(progress.status, TaskStatus::Completed);
        assert_eq!(progress.messages.len(), 2);
        assert!(progress.finished_at.is_some());
    }

    #[test]
    fn test_unknown_task_is_neutral() {
        let tracker = ProgressTracker::new();
        tracker.update_progress("nope", 2, "ignored");
        tracker.complete_task("nope", true);
        assert!(tracker.get_progress("nope").is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_concurrent_updates_keep_monotonic_steps() {
        let tracker = ProgressTracker::new();
        tracker.start_task("parse_shared", 5);

        let handles: Vec<_> = (1..=5)
            .map(|step| {
                let tracker = tracker.clone();
                thread::spawn(move || tracker.update_progress("parse_shared", step, "step"))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let progress = tracker.get_progress("parse_shared").unwrap();
        assert_eq!(progress.current_step, 5);
        assert_eq!(progress.messages.len(), 5);
    }
}
