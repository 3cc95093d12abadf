//! Choosing which report record a generation result is written to.
//!
//! Every report-writing path (generate, edit, placeholder) goes through
//! [`resolve_upsert_target`] so the fallback chain lives in one place:
//! pinned report id, else the latest report for the project, else a new row.

use serde::Serialize;

use crate::types::ReportId;

/// Which tier of the fallback chain produced the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// The caller supplied the report id.
    Pinned,
    /// The most recently created report of the project.
    LatestForProject,
    /// No report exists yet.
    New,
}

/// Where a section write goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertTarget {
    Update {
        report_id: ReportId,
        tier: ResolutionTier,
    },
    Insert,
}

impl UpsertTarget {
    pub fn tier(&self) -> ResolutionTier {
        match self {
            Self::Update { tier, .. } => *tier,
            Self::Insert => ResolutionTier::New,
        }
    }
}

/// Pick the most specific available handle.
///
/// `pinned` must already be confirmed to exist for the project; the caller
/// owns that lookup because a missing pinned report is an error, not a
/// reason to fall through.
pub fn resolve_upsert_target(
    pinned: Option<ReportId>,
    latest_for_project: Option<ReportId>,
) -> UpsertTarget {
    match (pinned, latest_for_project) {
        (Some(report_id), _) => UpsertTarget::Update {
            report_id,
            tier: ResolutionTier::Pinned,
        },
        (None, Some(report_id)) => UpsertTarget::Update {
            report_id,
            tier: ResolutionTier::LatestForProject,
        },
        (None, None) => UpsertTarget::Insert,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn pinned_wins_over_latest() {
        let pinned = Uuid::now_v7();
        let latest = Uuid::now_v7();
        assert_eq!(
            resolve_upsert_target(Some(pinned), Some(latest)),
            UpsertTarget::Update {
                report_id: pinned,
                tier: ResolutionTier::Pinned
            }
        );
    }

    #[test]
    fn latest_used_without_pin() {
        let latest = Uuid::now_v7();
        let target = resolve_upsert_target(None, Some(latest));
        assert_eq!(target.tier(), ResolutionTier::LatestForProject);
        assert_eq!(
            target,
            UpsertTarget::Update {
                report_id: latest,
                tier: ResolutionTier::LatestForProject
            }
        );
    }

    #[test]
    fn insert_when_nothing_exists() {
        let target = resolve_upsert_target(None, None);
        assert_eq!(target, UpsertTarget::Insert);
        assert_eq!(target.tier(), ResolutionTier::New);
    }
}
