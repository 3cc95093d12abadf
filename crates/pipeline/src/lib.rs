//! Generation pipeline: model call, extraction, validation and report
//! persistence for each report section.

pub mod prompts;
pub mod sync;

pub use sync::{EditRequest, GenerateRequest, ReportSynchronizer, SyncError, SyncOutcome};
