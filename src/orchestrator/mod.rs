//! Orchestrator.
//!
//! Ranks candidate URLs, captures the best one, retries with the next best and
//! finally falls back, for one project ([`Pipeline::generate_smart_screenshot`])
//! or many in sequence ([`Pipeline::generate_bulk`]).

mod bulk;
mod pipeline;

pub use bulk::{write_back, BulkReport, BulkSummary};
pub use pipeline::Pipeline;
