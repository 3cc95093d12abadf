//! Repository for the `jobs` table.
//!
//! Uses [`JobStatus`] for all status transitions. Every terminal update is
//! guarded on the current status so a finished job is never resurrected.

use forgekit_core::job::JobStatus;
use forgekit_core::types::DbId;
use sqlx::PgPool;

use crate::models::job::{Job, SubmitJob};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, job_type, status_id, input, result, error_message, \
    submitted_at, started_at, completed_at, updated_at";

/// Provides lifecycle operations for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new pending job.
    pub async fn submit(pool: &PgPool, input: &SubmitJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (job_type, status_id, input) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.job_type)
            .bind(JobStatus::Pending.id())
            .bind(&input.input)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim up to `limit` pending jobs, oldest first, marking
    /// them processing.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers never
    /// claim the same job.
    pub async fn claim_batch(pool: &PgPool, limit: i64) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $1, started_at = NOW(), updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM jobs \
                 WHERE status_id = $2 \
                 ORDER BY submitted_at ASC, id ASC \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        let mut jobs = sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Processing.id())
            .bind(JobStatus::Pending.id())
            .bind(limit)
            .fetch_all(pool)
            .await?;
        jobs.sort_by_key(|j| (j.submitted_at, j.id));
        Ok(jobs)
    }

    /// Mark a processing job as completed with its result payload.
    ///
    /// Returns `false` if the job was not processing.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, result = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Mark a non-terminal job as failed with an error message.
    ///
    /// No automatic retry is performed. Returns `false` if the job was
    /// already terminal.
    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($4, $5)",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(JobStatus::Pending.id())
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Number of jobs waiting for a worker.
    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status_id = $1")
            .bind(JobStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
