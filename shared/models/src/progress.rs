use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

/// Step-wise status of one parse or generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub task_id: String,
    pub current_step: u32,
    pub total_steps: u32,
    pub status: TaskStatus,
    pub messages: Vec<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskProgress {
    pub fn new(task_id: impl Into<String>, total_steps: u32) -> Self {
        Self {
            task_id: task_id.into(),
            current_step: 0,
            total_steps,
            status: TaskStatus::Running,
            messages: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Moves to `step`. Steps never go backwards and finished tasks are frozen.
    pub fn advance(&mut self, step: u32, message: &str) {
        if self.is_finished() {
            return;
        }
        self.current_step = self.current_step.max(step.min(self.total_steps));
        if !message.is_empty() {
            self.messages.push(message.to_string());
        }
    }

    /// Finalizes the task. Returns `false` if it was already finalized.
    pub fn finish(&mut self, success: bool) -> bool {
        if self.is_finished() {
            return false;
        }
        self.status = if success {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        self.finished_at = Some(Utc::now());
        true
    }

    pub fn is_finished(&self) -> bool {
        self.status != TaskStatus::Running
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
