//! # Tendersheet Domain Models
//!
//! Data model shared by the parser, the template generator and the HTTP service.
//! Everything here is plain serde data with a few helper methods.
//!
//! ## Key Models
//!
//! - **TenderRecord**: NIT metadata plus the ordered works parsed from a tender sheet
//! - **WorkItem**: one line-item of work, carrying its bidders once a generation request arrives
//! - **BidderEntry**: a validated bid percentile for one work
//! - **TenderDraft**: the client-side record submitted for generation, before validation
//! - **TaskProgress**: step-wise status of a parse run
//! - **BidderRecord / BidderSummary**: bidder directory entries and lookup results
//! - **AnalyticsStats**: persisted usage counters
//!
//! ## Interchange format
//!
//! A parsed record serializes as
//! `{"nit_info": {"nit_number": ...}, "works": [{"name": ..., "row_index": ...}], "filename": ..., "processing_time": ...}`.

pub mod tender;
pub mod progress;
pub mod bidder;
pub mod analytics;


pub use tender::*;
pub use progress::*;
pub use bidder::*;
pub use analytics::*;
