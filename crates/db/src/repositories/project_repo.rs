//! Repository for the `projects` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::project::{EnsureProject, Project};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

/// Provides lookup and registration for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert the project if missing, otherwise fill in title/description
    /// when provided. An existing owner is never replaced.
    pub async fn ensure<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &EnsureProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (id, user_id, title, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                user_id = COALESCE(projects.user_id, EXCLUDED.user_id),
                title = COALESCE(EXCLUDED.title, projects.title),
                description = COALESCE(EXCLUDED.description, projects.description),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.id)
            .bind(&input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(executor)
            .await
    }

    /// Find a project by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
