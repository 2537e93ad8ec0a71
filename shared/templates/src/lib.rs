//! Formatted xlsx templates generated from a validated tender record.
//!
//! Four fixed documents are produced per run (comparison, scrutiny,
//! evaluation, award). Each carries the NIT number and one blank row per work
//! for evaluators to complete.

pub mod archive;
pub mod bundle;
pub mod layout;
pub mod writer;

pub use archive::write_archive;
pub use bundle::{batch_name, GeneratedBundle};
pub use layout::{Orientation, TemplateKind};
pub use writer::TemplateGenerator;
