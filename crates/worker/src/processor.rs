//! Poll loop that claims pending jobs and runs them through the
//! [`ReportSynchronizer`].
//!
//! Jobs are claimed with `FOR UPDATE SKIP LOCKED`, so several workers can
//! share one queue. A job runs exactly once: failures are recorded on the
//! row and never retried.

use forgekit_core::error::CoreError;
use forgekit_core::job::{JobAction, JobKind, JobStatus};
use forgekit_db::models::job::Job;
use forgekit_db::repositories::JobRepo;
use forgekit_pipeline::{EditRequest, GenerateRequest, ReportSynchronizer, SyncError};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;

#[derive(Debug, thiserror::Error)]
enum JobError {
    #[error(transparent)]
    Kind(#[from] CoreError),

    #[error("Invalid job input: {0}")]
    Input(serde_json::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Failed to encode job result: {0}")]
    Output(serde_json::Error),
}

/// Claims and runs queued jobs.
pub struct JobProcessor {
    pool: PgPool,
    synchronizer: ReportSynchronizer,
    config: WorkerConfig,
}

impl JobProcessor {
    pub fn new(pool: PgPool, synchronizer: ReportSynchronizer, config: WorkerConfig) -> Self {
        Self {
            pool,
            synchronizer,
            config,
        }
    }

    /// Poll for jobs until `cancel` is triggered. The batch in flight when
    /// cancellation arrives is finished first.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            batch_size = self.config.batch_size,
            interval_secs = self.config.poll_interval.as_secs(),
            "Job processor started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job processor stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.process_batch().await {
                        Ok(0) => tracing::debug!("No pending jobs"),
                        Ok(processed) => tracing::info!(processed, "Processed job batch"),
                        Err(e) => tracing::error!(error = %e, "Failed to claim jobs"),
                    }
                }
            }
        }
    }

    /// Claim one batch of pending jobs and run each to a terminal status.
    /// Returns how many jobs were claimed.
    pub async fn process_batch(&self) -> Result<usize, sqlx::Error> {
        let jobs = JobRepo::claim_batch(&self.pool, self.config.batch_size).await?;

        for job in &jobs {
            self.process(job).await;
        }
        Ok(jobs.len())
    }

    async fn process(&self, job: &Job) {
        if let Err(e) = job.status().transition_to(JobStatus::Completed) {
            tracing::warn!(job_id = job.id, error = %e, "Skipping job that is not processing");
            return;
        }

        tracing::info!(job_id = job.id, job_type = %job.job_type, "Running job");

        let recorded = match self.execute(job).await {
            Ok(result) => {
                tracing::info!(job_id = job.id, "Job completed");
                JobRepo::complete(&self.pool, job.id, &result).await
            }
            Err(e) => {
                tracing::warn!(job_id = job.id, error = %e, "Job failed");
                JobRepo::fail(&self.pool, job.id, &e.to_string()).await
            }
        };

        match recorded {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job_id = job.id, "Job was already terminal; result dropped");
            }
            Err(e) => {
                tracing::error!(job_id = job.id, error = %e, "Failed to record job outcome");
            }
        }
    }

    async fn execute(&self, job: &Job) -> Result<serde_json::Value, JobError> {
        let kind: JobKind = job.job_type.parse()?;
        let input = job.input.clone();

        let outcome = match kind.action {
            JobAction::Generate => {
                let req: GenerateRequest = serde_json::from_value(input).map_err(JobError::Input)?;
                self.synchronizer.generate(kind.report, &req).await?
            }
            JobAction::Edit => {
                let req: EditRequest = serde_json::from_value(input).map_err(JobError::Input)?;
                self.synchronizer.edit(kind.report, &req).await?
            }
        };

        serde_json::to_value(outcome).map_err(JobError::Output)
    }
}
