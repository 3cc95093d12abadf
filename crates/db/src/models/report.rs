//! Report record model.

use forgekit_core::report::ReportKind;
use forgekit_core::types::{ReportId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reports` table. Each section is an optional JSONB column.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub project_id: String,
    pub components: Option<serde_json::Value>,
    pub assembly: Option<serde_json::Value>,
    pub firmware: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Report {
    /// The stored value of one section, if written.
    pub fn section(&self, kind: ReportKind) -> Option<&serde_json::Value> {
        match kind {
            ReportKind::Components => self.components.as_ref(),
            ReportKind::Assembly => self.assembly.as_ref(),
            ReportKind::Firmware => self.firmware.as_ref(),
        }
    }
}
