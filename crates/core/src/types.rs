/// Database primary keys for BIGSERIAL tables (jobs, chat messages).
pub type DbId = i64;

/// Report identity. UUID v7, so ids sort by creation time.
pub type ReportId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
