//! Tender Sheet Processing Module
//!
//! Typed grid, two-pass NIT/works parser and the mtime-aware parse cache.

pub mod grid;
pub mod parser;
pub mod cache;

pub use grid::{Cell, Grid};
pub use parser::{extract_nit_number, extract_works, read_first_sheet, TenderParser, PARSE_STEPS};
pub use cache::{CacheStats, ParseCache};
