use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format written back when a bidder is used.
pub const LAST_USED_FORMAT: &str = "%d/%m/%Y";

/// On-disk value of one bidder directory entry, keyed by bidder name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderRecord {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub last_used: String,
}

impl BidderRecord {
    /// Parses `last_used`, accepting both `dd/mm/YYYY` and `YYYY-mm-dd`.
    pub fn last_used_date(&self) -> Option<NaiveDate> {
        let raw = self.last_used.trim();
        if raw.is_empty() {
            return None;
        }
        let format = if raw.contains('/') { LAST_USED_FORMAT } else { "%Y-%m-%d" };
        NaiveDate::parse_from_str(raw, format).ok()
    }

    /// Location used for statistics: the text after the last comma.
    pub fn location(&self) -> Option<&str> {
        let address = self.address.trim();
        if address.is_empty() {
            return None;
        }
        let city = address.rsplit(',').next().unwrap_or(address).trim();
        Some(if city.is_empty() { address } else { city })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Name,
    Address,
}

/// Bidder as returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderSummary {
    pub name: String,
    pub address: String,
    pub last_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_ago: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
}

impl BidderSummary {
    pub fn from_record(name: &str, record: &BidderRecord) -> Self {
        Self {
            name: name.to_string(),
            address: record.address.clone(),
            last_used: record.last_used.clone(),
            days_ago: None,
            match_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderStats {
    pub total_bidders: usize,
    pub recent_bidders: usize,
    pub top_locations: Vec<LocationCount>,
}
