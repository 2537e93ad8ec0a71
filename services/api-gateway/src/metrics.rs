//! Prometheus counters for the upload and generation flows.

use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    uploads: IntCounterVec,
    generations: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("tendersheet".to_string()), None)?;

        let uploads = IntCounterVec::new(
            Opts::new("uploads_total", "Tender sheets uploaded and parsed"),
            &["outcome"],
        )?;
        let generations = IntCounterVec::new(
            Opts::new("generations_total", "Template batches generated"),
            &["outcome"],
        )?;

        registry.register(Box::new(uploads.clone()))?;
        registry.register(Box::new(generations.clone()))?;

        Ok(Self {
            registry,
            uploads,
            generations,
        })
    }

    pub fn record_upload(&self, success: bool) {
        self.uploads.with_label_values(&[outcome(success)]).inc();
    }

    pub fn record_generation(&self, success: bool) {
        self.generations.with_label_values(&[outcome(success)]).inc();
    }

    pub fn render(&self) -> String {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .unwrap_or_else(|_| "Error encoding metrics".to_string())
    }
}

fn outcome(success: bool) -> &'static str {
    if success {
        OUTCOME_SUCCESS
    } else {
        OUTCOME_FAILURE
    }
}
