use std::sync::Arc;

use forgekit_llm::{LlmConfig, OpenAiClient};
use forgekit_pipeline::ReportSynchronizer;
use forgekit_worker::{JobProcessor, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forgekit_worker=debug,forgekit_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    let llm_config = LlmConfig::from_env();
    tracing::info!(model = %llm_config.model, "Loaded model configuration");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = forgekit_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    forgekit_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    forgekit_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let model = OpenAiClient::new(llm_config).expect("Failed to build model client");
    let synchronizer = ReportSynchronizer::new(pool.clone(), Arc::new(model));
    let processor = JobProcessor::new(pool, synchronizer, config);

    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let worker = tokio::spawn(async move { processor.run(worker_cancel).await });

    shutdown_signal().await;
    cancel.cancel();

    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Job processor task failed");
    }
    tracing::info!("Worker stopped");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, stopping worker"),
        () = terminate => tracing::info!("Received SIGTERM, stopping worker"),
    }
}
