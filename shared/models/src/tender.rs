use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Lowest bid percentile accepted by the validation gate.
pub const PERCENTILE_MIN: f64 = -99.99;
/// Highest bid percentile accepted by the validation gate.
pub const PERCENTILE_MAX: f64 = 99.99;

/// Identifying metadata recovered from the tender sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NitInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nit_number: Option<String>,
}

/// Parsed tender: NIT metadata plus the ordered list of works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderRecord {
    #[serde(default)]
    pub nit_info: NitInfo,
    pub works: Vec<WorkItem>,
    #[serde(rename = "filename", default)]
    pub source_filename: String,
    /// Seconds spent parsing. Diagnostic only.
    #[serde(rename = "processing_time", default)]
    pub parse_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bidders: Vec<BidderEntry>,
}

/// A validated bid on one work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BidderEntry {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[validate(custom = "validate_percentile_range")]
    pub percentile: f64,
}

fn validate_percentile_range(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (PERCENTILE_MIN..=PERCENTILE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("range"))
    }
}

impl TenderRecord {
    pub fn new(nit_number: Option<String>, works: Vec<WorkItem>) -> Self {
        Self {
            nit_info: NitInfo { nit_number },
            works,
            source_filename: String::new(),
            parse_duration: 0.0,
        }
    }

    pub fn nit_number(&self) -> Option<&str> {
        self.nit_info.nit_number.as_deref()
    }

    /// Compares everything except the diagnostic fields.
    pub fn same_structure(&self, other: &TenderRecord) -> bool {
        self.nit_info == other.nit_info && self.works == other.works
    }
}

impl WorkItem {
    pub fn new(name: impl Into<String>, row_index: usize) -> Self {
        Self {
            name: name.into(),
            row_index: Some(row_index),
            bidders: Vec::new(),
        }
    }
}

/// Body of a generation request: `{"data": {...}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub data: Option<TenderDraft>,
}

/// Tender record as submitted by the client, bidders not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenderDraft {
    #[serde(default)]
    pub nit_info: NitInfo,
    #[serde(default)]
    pub works: Vec<WorkDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkDraft {
    pub name: String,
    #[serde(default)]
    pub row_index: Option<usize>,
    #[serde(default)]
    pub bidders: Vec<BidderDraft>,
}

/// Raw bidder as typed into the form. The percentile may be a number, a
/// string, or missing altogether.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BidderDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub percentile: Option<serde_json::Value>,
}

impl BidderDraft {
    /// Display name, falling back to `Bidder {n}` for unnamed entries.
    pub fn display_name(&self, position: usize) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Bidder {}", position + 1),
        }
    }
}
