//! Parse Cache
//!
//! Bounded map from file path to parsed record. An entry is only reused while
//! the file's modification time and length are unchanged; the least recently
//! used entry is evicted when the cache is full. Failures are never cached.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tendersheet_models::TenderRecord;
use tracing::debug;

use super::parser::TenderParser;
use crate::error::TenderResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct CacheEntry {
    stamp: FileStamp,
    record: TenderRecord,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PathBuf, CacheEntry>,
    order: VecDeque<PathBuf>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn touch(&mut self, key: &Path) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            self.order.remove(position);
        }
        self.order.push_back(key.to_path_buf());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct ParseCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the cached record for `path` when the file is unchanged,
    /// otherwise parses it with `parser` and stores the result.
    pub fn get_or_parse(&self, path: &Path, parser: &TenderParser) -> TenderResult<TenderRecord> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let stamp = FileStamp::of(&key);

        if let Some(stamp) = stamp {
            let mut state = self.state.lock();
            let cached = state
                .entries
                .get(&key)
                .filter(|entry| entry.stamp == stamp)
                .map(|entry| entry.record.clone());
            if let Some(record) = cached {
                state.hits += 1;
                state.touch(&key);
                debug!(path = %key.display(), "Parse cache hit");
                return Ok(record);
            }
            state.misses += 1;
        }

        // Parse outside the lock; concurrent misses on one path both parse.
        let record = parser.parse_file(path)?;

        if let Some(stamp) = stamp {
            let mut state = self.state.lock();
            state.entries.insert(
                key.clone(),
                CacheEntry {
                    stamp,
                    record: record.clone(),
                },
            );
            state.touch(&key);
            while state.entries.len() > self.capacity {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                        debug!(path = %oldest.display(), "Parse cache eviction");
                    }
                    None => break,
                }
            }
        }

        Ok(record)
    }

    pub fn invalidate(&self, path: &Path) {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let mut state = self.state.lock();
        state.entries.remove(&key);
        state.order.retain(|k| k != &key);
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }
}
