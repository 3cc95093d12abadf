//! Background processing of queued generation and edit jobs.

pub mod config;
pub mod processor;

pub use config::WorkerConfig;
pub use processor::JobProcessor;
