//! Repository for the `reports` table.
//!
//! Section writes name exactly one JSONB column (from
//! [`ReportKind::column`]) so a write to one section never touches the
//! others. Lookups that take part in upsert resolution accept any
//! [`PgExecutor`] so they can run inside the resolving transaction.

use forgekit_core::report::ReportKind;
use forgekit_core::types::ReportId;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::report::Report;

const COLUMNS: &str = "id, project_id, components, assembly, firmware, created_at, updated_at";

/// Provides section reads and writes for report records.
pub struct ReportRepo;

impl ReportRepo {
    /// Find a report by id.
    pub async fn find_by_id(pool: &PgPool, id: ReportId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a report by id, only if it belongs to `project_id`.
    pub async fn find_for_project<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: &str,
        id: ReportId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(executor)
            .await
    }

    /// The most recently created report of a project.
    pub async fn find_latest_for_project<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports WHERE project_id = $1
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(project_id)
            .fetch_optional(executor)
            .await
    }

    /// All reports of a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Serialize report resolution for one project until the surrounding
    /// transaction ends, so concurrent first generations cannot both
    /// insert.
    pub async fn lock_project<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(project_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Insert a new report with one section populated.
    pub async fn insert_section<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: &str,
        kind: ReportKind,
        payload: &serde_json::Value,
    ) -> Result<Report, sqlx::Error> {
        let column = kind.column();
        let query = format!(
            "INSERT INTO reports (id, project_id, {column})
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(Uuid::now_v7())
            .bind(project_id)
            .bind(payload)
            .fetch_one(executor)
            .await
    }

    /// Overwrite one section of an existing report.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_section<'e, E: PgExecutor<'e>>(
        executor: E,
        id: ReportId,
        kind: ReportKind,
        payload: &serde_json::Value,
    ) -> Result<Option<Report>, sqlx::Error> {
        let column = kind.column();
        let query = format!(
            "UPDATE reports SET {column} = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(payload)
            .fetch_optional(executor)
            .await
    }
}
