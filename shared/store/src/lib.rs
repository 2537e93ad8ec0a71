//! File-backed state for the tender service: the bidder directory and the
//! usage analytics, plus the tracking handle that bundles analytics with
//! parse progress.

pub mod analytics;
pub mod bidders;
mod persist;
pub mod tracking;

pub use analytics::AnalyticsStore;
pub use bidders::{BidderDirectory, DEFAULT_RECENT_DAYS, RECENT_LIMIT};
pub use tracking::TrackingService;
