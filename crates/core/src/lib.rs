//! Domain logic shared by the Forgekit API server and background worker.
//!
//! Nothing in this crate performs I/O. Persistence lives in `forgekit-db`,
//! model calls in `forgekit-llm`.

pub mod error;
pub mod job;
pub mod json_extract;
pub mod report;
pub mod schema;
pub mod tracker;
pub mod types;
pub mod upsert;
