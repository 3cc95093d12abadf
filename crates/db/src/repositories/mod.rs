//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept a pool (or, where a call must join a transaction, any
//! [`sqlx::PgExecutor`]) as the first argument.

pub mod chat_message_repo;
pub mod credit_repo;
pub mod job_repo;
pub mod project_repo;
pub mod report_repo;

pub use chat_message_repo::ChatMessageRepo;
pub use credit_repo::CreditRepo;
pub use job_repo::JobRepo;
pub use project_repo::ProjectRepo;
pub use report_repo::ReportRepo;
