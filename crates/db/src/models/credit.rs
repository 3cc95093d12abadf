//! Credit balance model for metered generations.

use forgekit_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_credits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredits {
    pub user_id: String,
    pub balance: i32,
    pub updated_at: Timestamp,
}
