use sqlx::PgPool;

/// Connect, migrate, verify the job status lookup table is seeded.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    forgekit_db::health_check(&pool).await.unwrap();

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM job_statuses ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(names, ["pending", "processing", "completed", "failed"]);
}

/// Every table the repositories use exists.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tables_exist(pool: PgPool) {
    for table in ["projects", "reports", "chat_messages", "jobs", "user_credits"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
