//! Bidder Directory
//!
//! Keyed bidder table loaded from a JSON file. Lookups are read-only; the
//! generation flow stamps `last_used` on the bidders it saw and the file is
//! rewritten after each stamp.

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use tendersheet_models::{
    BidderRecord, BidderStats, BidderSummary, LocationCount, MatchType, LAST_USED_FORMAT,
};
use tendersheet_utils::TenderResult;

use crate::persist::replace_file;

/// Upper bound on entries returned by `recent`.
pub const RECENT_LIMIT: usize = 20;
/// Window used for `popular` and the stats counter.
pub const DEFAULT_RECENT_DAYS: i64 = 30;
const TOP_LOCATIONS: usize = 5;

pub struct BidderDirectory {
    path: PathBuf,
    bidders: RwLock<BTreeMap<String, BidderRecord>>,
    /// Held from snapshot to rename so file writes land in stamp order.
    write_lock: Mutex<()>,
}

impl BidderDirectory {
    /// Loads the directory. A missing or unreadable file gives an empty one.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let bidders = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, BidderRecord>>(&raw) {
                Ok(bidders) => {
                    info!(path = %path.display(), count = bidders.len(), "Bidder database loaded");
                    bidders
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Error loading bidder database");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Bidder database not found");
                BTreeMap::new()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error loading bidder database");
                BTreeMap::new()
            }
        };

        Self {
            path,
            bidders: RwLock::new(bidders),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_records(path: impl Into<PathBuf>, records: BTreeMap<String, BidderRecord>) -> Self {
        Self {
            path: path.into(),
            bidders: RwLock::new(records),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.bidders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<BidderRecord> {
        self.bidders.read().get(name).cloned()
    }

    /// Case-insensitive substring search over names and addresses. Name
    /// matches come first, then the most recently used.
    pub fn search(&self, query: &str, limit: usize) -> Vec<BidderSummary> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let bidders = self.bidders.read();
        let mut results: Vec<(BidderSummary, Option<NaiveDate>)> = bidders
            .iter()
            .filter_map(|(name, record)| {
                let match_type = if name.to_lowercase().contains(&query) {
                    MatchType::Name
                } else if record.address.to_lowercase().contains(&query) {
                    MatchType::Address
                } else {
                    return None;
                };
                let mut summary = BidderSummary::from_record(name, record);
                summary.match_type = Some(match_type);
                Some((summary, record.last_used_date()))
            })
            .collect();

        results.sort_by(|(a, a_date), (b, b_date)| {
            let a_rank = a.match_type != Some(MatchType::Name);
            let b_rank = b.match_type != Some(MatchType::Name);
            a_rank.cmp(&b_rank).then_with(|| b_date.cmp(a_date))
        });

        results.into_iter().take(limit).map(|(summary, _)| summary).collect()
    }

    /// Names starting with `partial`, for autocomplete.
    pub fn suggestions(&self, partial: &str, limit: usize) -> Vec<String> {
        let partial = partial.trim().to_lowercase();
        if partial.is_empty() {
            return Vec::new();
        }

        self.bidders
            .read()
            .keys()
            .filter(|name| name.to_lowercase().starts_with(&partial))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Bidders used within `days` of `today`, most recent first. Entries
    /// without a readable date are skipped.
    pub fn recent(&self, days: i64, today: NaiveDate) -> Vec<BidderSummary> {
        let bidders = self.bidders.read();
        let mut recent: Vec<BidderSummary> = bidders
            .iter()
            .filter_map(|(name, record)| {
                let last_used = record.last_used_date()?;
                let days_ago = (today - last_used).num_days();
                if days_ago > days {
                    return None;
                }
                let mut summary = BidderSummary::from_record(name, record);
                summary.days_ago = Some(days_ago);
                Some(summary)
            })
            .collect();

        recent.sort_by_key(|summary| summary.days_ago);
        recent.truncate(RECENT_LIMIT);
        recent
    }

    /// No usage counts are kept, so "popular" means recently used.
    pub fn popular(&self, limit: usize, today: NaiveDate) -> Vec<BidderSummary> {
        let mut popular = self.recent(DEFAULT_RECENT_DAYS, today);
        popular.truncate(limit);
        popular
    }

    pub fn by_location(&self, location: &str) -> Vec<BidderSummary> {
        let location = location.trim().to_lowercase();
        self.bidders
            .read()
            .iter()
            .filter(|(_, record)| record.address.to_lowercase().contains(&location))
            .map(|(name, record)| BidderSummary::from_record(name, record))
            .collect()
    }

    /// Every bidder, sorted by name.
    pub fn all(&self) -> Vec<BidderSummary> {
        self.bidders
            .read()
            .iter()
            .map(|(name, record)| BidderSummary::from_record(name, record))
            .collect()
    }

    pub fn stats(&self, today: NaiveDate) -> BidderStats {
        let recent_bidders = self.recent(DEFAULT_RECENT_DAYS, today).len();
        let bidders = self.bidders.read();

        let mut locations: HashMap<&str, usize> = HashMap::new();
        for record in bidders.values() {
            if let Some(location) = record.location() {
                *locations.entry(location).or_insert(0) += 1;
            }
        }

        let mut top_locations: Vec<LocationCount> = locations
            .into_iter()
            .map(|(location, count)| LocationCount {
                location: location.to_string(),
                count,
            })
            .collect();
        top_locations.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)));
        top_locations.truncate(TOP_LOCATIONS);

        BidderStats {
            total_bidders: bidders.len(),
            recent_bidders,
            top_locations,
        }
    }

    /// Stamps `last_used = today` on `name`, creating the entry if needed, and
    /// writes the directory back to disk.
    pub fn record_usage(&self, name: &str, address: Option<&str>, today: NaiveDate) -> TenderResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }

        let _writing = self.write_lock.lock();
        let snapshot = {
            let mut bidders = self.bidders.write();
            let record = bidders.entry(name.to_string()).or_default();
            record.last_used = today.format(LAST_USED_FORMAT).to_string();
            if let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) {
                record.address = address.to_string();
            }
            serde_json::to_string_pretty(&*bidders)?
        };

        replace_file(&self.path, &snapshot)
    }
}
