//! Project ownership and credit metering shared by the hardware and job
//! handlers.

use forgekit_core::error::CoreError;
use forgekit_db::models::project::{EnsureProject, Project};
use forgekit_db::repositories::{CreditRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Reject callers that are not the project's owner.
pub(crate) fn authorize(project: &Project, user_id: Option<&str>) -> AppResult<()> {
    match user_id {
        Some(user) if !project.is_owned_by(user) => Err(AppError::Core(CoreError::Forbidden(
            format!("Project {} belongs to another user", project.id),
        ))),
        _ => Ok(()),
    }
}

/// Register the project on first use, after checking an existing one is
/// accessible to the caller.
pub(crate) async fn claim_project(state: &AppState, input: EnsureProject) -> AppResult<Project> {
    if let Some(existing) = ProjectRepo::find_by_id(&state.pool, &input.id).await? {
        authorize(&existing, input.user_id.as_deref())?;
    }
    Ok(ProjectRepo::ensure(&state.pool, &input).await?)
}

/// Deduct the configured generation cost from the caller's balance.
/// Anonymous callers and a zero cost are not metered.
pub(crate) async fn charge_generation(state: &AppState, user_id: Option<&str>) -> AppResult<()> {
    let cost = state.config.generation_credit_cost;
    let Some(user) = user_id.filter(|_| cost > 0) else {
        return Ok(());
    };

    match CreditRepo::try_deduct(&state.pool, user, cost).await? {
        Some(balance) => {
            tracing::info!(user_id = user, cost, balance, "Generation credits deducted");
            Ok(())
        }
        None => Err(AppError::Core(CoreError::InsufficientCredits { required: cost })),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn project(owner: Option<&str>) -> Project {
        Project {
            id: "p1".into(),
            user_id: owner.map(str::to_string),
            title: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_and_anonymous_callers_pass() {
        assert!(authorize(&project(Some("alice")), Some("alice")).is_ok());
        assert!(authorize(&project(Some("alice")), None).is_ok());
        assert!(authorize(&project(None), Some("bob")).is_ok());
    }

    #[test]
    fn other_users_are_forbidden() {
        let err = authorize(&project(Some("alice")), Some("bob")).unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Forbidden(_))));
    }
}
