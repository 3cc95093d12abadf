//! Repository for the `chat_messages` table.

use sqlx::PgPool;

use crate::models::chat_message::{ChatMessage, CreateChatMessage};

const COLUMNS: &str = "id, project_id, report_id, role, content, created_at";

/// Provides append and listing for project chat history.
pub struct ChatMessageRepo;

impl ChatMessageRepo {
    /// Append a message, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateChatMessage<'_>,
    ) -> Result<ChatMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO chat_messages (project_id, report_id, role, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(input.project_id)
            .bind(input.report_id)
            .bind(input.role)
            .bind(input.content)
            .fetch_one(pool)
            .await
    }

    /// All messages of a project, oldest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: &str,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chat_messages WHERE project_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
