//! Chat message model.

use forgekit_core::types::{DbId, ReportId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// A row from the `chat_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: DbId,
    pub project_id: String,
    pub report_id: Option<ReportId>,
    pub role: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for appending a message.
#[derive(Debug, Clone)]
pub struct CreateChatMessage<'a> {
    pub project_id: &'a str,
    pub report_id: Option<ReportId>,
    pub role: &'static str,
    pub content: &'a str,
}
