use std::time::Duration;

/// Job processor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum jobs claimed per poll.
    pub batch_size: i64,
    pub poll_interval: Duration,
}

/// Default number of jobs claimed per poll.
const DEFAULT_BATCH_SIZE: i64 = 5;

/// Default seconds between polls.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var                     | Default |
    /// |-----------------------------|---------|
    /// | `WORKER_BATCH_SIZE`         | `5`     |
    /// | `WORKER_POLL_INTERVAL_SECS` | `10`    |
    pub fn from_env() -> Self {
        let batch_size: i64 = std::env::var("WORKER_BATCH_SIZE")
            .unwrap_or_else(|_| DEFAULT_BATCH_SIZE.to_string())
            .parse()
            .expect("WORKER_BATCH_SIZE must be a valid integer");
        assert!(batch_size > 0, "WORKER_BATCH_SIZE must be positive");

        let poll_interval_secs: u64 = std::env::var("WORKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
            .parse()
            .expect("WORKER_POLL_INTERVAL_SECS must be a valid u64");

        Self {
            batch_size,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}
