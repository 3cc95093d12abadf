use forgekit_core::job::JobStatus;
use forgekit_core::report::ReportKind;
use forgekit_db::models::job::SubmitJob;
use forgekit_db::models::project::EnsureProject;
use forgekit_db::repositories::{CreditRepo, JobRepo, ProjectRepo, ReportRepo};
use serde_json::json;
use sqlx::PgPool;

fn project(id: &str, owner: Option<&str>) -> EnsureProject {
    EnsureProject {
        id: id.to_string(),
        user_id: owner.map(str::to_string),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_never_replaces_owner(pool: PgPool) {
    ProjectRepo::ensure(&pool, &project("p1", Some("alice")))
        .await
        .unwrap();

    let mut second = project("p1", Some("bob"));
    second.title = Some("Plant Waterer".into());
    let stored = ProjectRepo::ensure(&pool, &second).await.unwrap();

    assert_eq!(stored.user_id.as_deref(), Some("alice"));
    assert_eq!(stored.title.as_deref(), Some("Plant Waterer"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ensure_claims_unowned_project(pool: PgPool) {
    ProjectRepo::ensure(&pool, &project("p1", None)).await.unwrap();
    let stored = ProjectRepo::ensure(&pool, &project("p1", Some("alice")))
        .await
        .unwrap();

    assert_eq!(stored.user_id.as_deref(), Some("alice"));
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn latest_report_is_most_recent(pool: PgPool) {
    ProjectRepo::ensure(&pool, &project("p1", None)).await.unwrap();
    ReportRepo::insert_section(&pool, "p1", ReportKind::Components, &json!({ "a": 1 }))
        .await
        .unwrap();
    let newer = ReportRepo::insert_section(&pool, "p1", ReportKind::Firmware, &json!({ "b": 2 }))
        .await
        .unwrap();

    let latest = ReportRepo::find_latest_for_project(&pool, "p1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, newer.id);
    assert!(latest.components.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_section_leaves_other_sections(pool: PgPool) {
    ProjectRepo::ensure(&pool, &project("p1", None)).await.unwrap();
    let report =
        ReportRepo::insert_section(&pool, "p1", ReportKind::Components, &json!({ "a": 1 }))
            .await
            .unwrap();

    let updated =
        ReportRepo::update_section(&pool, report.id, ReportKind::Assembly, &json!({ "b": 2 }))
            .await
            .unwrap()
            .unwrap();

    assert_eq!(updated.components, Some(json!({ "a": 1 })));
    assert_eq!(updated.assembly, Some(json!({ "b": 2 })));
    assert!(updated.updated_at >= report.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_unknown_report_is_none(pool: PgPool) {
    let missing = ReportRepo::update_section(
        &pool,
        uuid::Uuid::now_v7(),
        ReportKind::Assembly,
        &json!({}),
    )
    .await
    .unwrap();

    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

async fn submit(pool: &PgPool) -> i64 {
    JobRepo::submit(
        pool,
        &SubmitJob {
            job_type: "hardware-firmware-code".into(),
            input: json!({}),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_batch_takes_oldest_pending(pool: PgPool) {
    let first = submit(&pool).await;
    let second = submit(&pool).await;
    let third = submit(&pool).await;

    let claimed = JobRepo::claim_batch(&pool, 2).await.unwrap();

    let ids: Vec<i64> = claimed.iter().map(|j| j.id).collect();
    assert_eq!(ids, [first, second]);
    assert!(claimed.iter().all(|j| j.status() == JobStatus::Processing));

    let rest = JobRepo::claim_batch(&pool, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, third);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_jobs_stay_terminal(pool: PgPool) {
    let id = submit(&pool).await;
    JobRepo::claim_batch(&pool, 1).await.unwrap();

    assert!(JobRepo::complete(&pool, id, &json!({ "ok": true })).await.unwrap());
    assert!(!JobRepo::fail(&pool, id, "late failure").await.unwrap());
    assert!(!JobRepo::complete(&pool, id, &json!({})).await.unwrap());

    let job = JobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert!(job.error_message.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_job_cannot_complete(pool: PgPool) {
    let id = submit(&pool).await;

    assert!(!JobRepo::complete(&pool, id, &json!({})).await.unwrap());
    assert!(JobRepo::fail(&pool, id, "bad input").await.unwrap());
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deduct_never_goes_negative(pool: PgPool) {
    assert_eq!(CreditRepo::try_deduct(&pool, "alice", 1).await.unwrap(), None);

    CreditRepo::grant(&pool, "alice", 3).await.unwrap();
    assert_eq!(CreditRepo::grant(&pool, "alice", 2).await.unwrap(), 5);

    assert_eq!(CreditRepo::try_deduct(&pool, "alice", 4).await.unwrap(), Some(1));
    assert_eq!(CreditRepo::try_deduct(&pool, "alice", 2).await.unwrap(), None);

    let credits = CreditRepo::find(&pool, "alice").await.unwrap().unwrap();
    assert_eq!(credits.balance, 1);
}
