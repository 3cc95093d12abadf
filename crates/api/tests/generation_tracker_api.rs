//! Integration tests for the per-component generation tracking endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json};
use serde_json::json;
use sqlx::PgPool;

const ENTRY: &str = "/api/creations/c1/components/base/generation";

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_entry_is_404(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, ENTRY).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn events_advance_state_and_version(pool: PgPool) {
    let app = build_test_app(pool);

    let steps = [
        (json!({ "event": "awaitingJob" }), "awaitingJob"),
        (
            json!({ "event": "scadAvailable", "sourceCode": "cube(10);" }),
            "scadAvailable",
        ),
        (json!({ "event": "compiling" }), "compiling"),
        (
            json!({ "event": "previewReady", "previewArtifact": "mesh-bytes", "origin": "computed" }),
            "previewReady",
        ),
    ];

    for (i, (event, expected)) in steps.into_iter().enumerate() {
        let response = post_json(app.clone(), ENTRY, event).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["state"], expected);
        assert_eq!(json["data"]["version"], i as u64 + 1);
    }

    let json = body_json(get(app, ENTRY).await).await;
    assert_eq!(json["data"]["sourceCode"], "cube(10);");
    assert_eq!(json["data"]["previewArtifact"]["origin"], "computed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn computed_preview_survives_server_updates(pool: PgPool) {
    let app = build_test_app(pool);

    post_json(
        app.clone(),
        ENTRY,
        json!({ "event": "previewReady", "previewArtifact": "local", "origin": "computed" }),
    )
    .await;
    post_json(
        app.clone(),
        ENTRY,
        json!({ "event": "scadAvailable", "sourceCode": "sphere(5);", "previewArtifact": "remote" }),
    )
    .await;
    let response = post_json(
        app.clone(),
        &format!("{ENTRY}/hydrate"),
        json!({ "previewArtifact": "remote-2", "externalStatus": "failed" }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "previewReady");
    assert_eq!(json["data"]["previewArtifact"]["payload"], "local");
    assert_eq!(json["data"]["sourceCode"], "sphere(5);");
    assert_eq!(json["data"]["version"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hydrate_with_failed_status_marks_error(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app,
        &format!("{ENTRY}/hydrate"),
        json!({ "sourceCode": "cube(1);", "externalStatus": "failed" }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "error");
    assert_eq!(json["data"]["error"], "Remote generation failed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn error_event_keeps_message(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app,
        ENTRY,
        json!({ "event": "error", "message": "OpenSCAD syntax error" }),
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "error");
    assert_eq!(json["data"]["error"], "OpenSCAD syntax error");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_event_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(app, ENTRY, json!({ "event": "exploded" })).await;

    assert!(response.status().is_client_error());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_removes_only_that_creation(pool: PgPool) {
    let app = build_test_app(pool);

    for uri in [
        "/api/creations/c1/components/a/generation",
        "/api/creations/c1/components/b/generation",
        "/api/creations/c2/components/a/generation",
    ] {
        post_json(app.clone(), uri, json!({ "event": "awaitingJob" })).await;
    }

    let response = delete(app.clone(), "/api/creations/c1/generation").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["removed"], 2);

    let c1 = body_json(get(app.clone(), "/api/creations/c1/generation").await).await;
    assert_eq!(c1["data"], json!([]));

    let c2 = body_json(get(app, "/api/creations/c2/generation").await).await;
    assert_eq!(c2["data"].as_array().unwrap().len(), 1);
    assert_eq!(c2["data"][0]["componentId"], "a");
    assert_eq!(c2["data"][0]["state"], "awaitingJob");
}
