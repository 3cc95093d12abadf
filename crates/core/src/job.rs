//! Job status machine and job type naming for background generation work.
//!
//! Status ids match the seed order of the `job_statuses` lookup table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::report::ReportKind;

/// A job status change the lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid job transition from {from} to {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Lifecycle of a background job.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Processing),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed and failed jobs are never resurrected.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a job may move from `self` to `next`.
    ///
    /// A pending job may also fail directly (e.g. unparseable input found
    /// while claiming).
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Checked form of [`can_transition_to`](Self::can_transition_to).
    pub fn transition_to(self, next: JobStatus) -> Result<JobStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job types
// ---------------------------------------------------------------------------

/// Whether a job generates a section from scratch or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Generate,
    Edit,
}

/// A parsed `job_type` column, e.g. `hardware-3d-components` or
/// `edit-firmware-code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobKind {
    pub action: JobAction,
    pub report: ReportKind,
}

impl JobKind {
    pub fn generate(report: ReportKind) -> Self {
        Self {
            action: JobAction::Generate,
            report,
        }
    }

    pub fn edit(report: ReportKind) -> Self {
        Self {
            action: JobAction::Edit,
            report,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.action {
            JobAction::Generate => "hardware",
            JobAction::Edit => "edit",
        };
        write!(f, "{prefix}-{}", self.report.section_name())
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, section) = if let Some(rest) = s.strip_prefix("hardware-") {
            (JobAction::Generate, rest)
        } else if let Some(rest) = s.strip_prefix("edit-") {
            (JobAction::Edit, rest)
        } else {
            return Err(CoreError::Validation(format!("Unknown job type '{s}'")));
        };

        let report = section
            .parse::<ReportKind>()
            .map_err(|_| CoreError::Validation(format!("Unknown job type '{s}'")))?;
        Ok(Self { action, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(JobStatus::from_id(9), None);
    }

    #[test]
    fn terminal_states_cannot_be_left() {
        for next in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert!(!JobStatus::Completed.can_transition_to(next));
            assert!(!JobStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn pending_moves_to_processing() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn checked_transition_reports_both_ends() {
        let err = JobStatus::Completed
            .transition_to(JobStatus::Processing)
            .unwrap_err();
        assert_eq!(err.from, JobStatus::Completed);
        assert_eq!(err.to, JobStatus::Processing);
        assert_eq!(
            err.to_string(),
            "Invalid job transition from completed to processing"
        );
        assert_eq!(
            JobStatus::Processing.transition_to(JobStatus::Failed),
            Ok(JobStatus::Failed)
        );
    }

    #[test]
    fn job_kind_parses_both_prefixes() {
        let kind: JobKind = "hardware-3d-components".parse().unwrap();
        assert_eq!(kind, JobKind::generate(ReportKind::Components));

        let kind: JobKind = "edit-firmware-code".parse().unwrap();
        assert_eq!(kind, JobKind::edit(ReportKind::Firmware));
        assert_eq!(kind.to_string(), "edit-firmware-code");
    }

    #[test]
    fn job_kind_rejects_unknown_types() {
        assert!("hardware-wiring".parse::<JobKind>().is_err());
        assert!("render-3d-components".parse::<JobKind>().is_err());
    }
}
