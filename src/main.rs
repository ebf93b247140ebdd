
use anyhow::Context;
use letterbox::config::AppConfig;
use letterbox::service::task_service::start_jobs;
use letterbox::{create_app, AppState};
use tokio::net::TcpListener;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    config.validate()?;
    debug!("Config:\n {:#?}", config);

    let app_state = AppState::new(config).await?;
    let config = &app_state.config;

    // This integrates database migrations into the application binary
    // to ensure the database is properly migrated during startup.
    if config.db.auto_migrate {
        debug!("Migrating database...");
        app_state.db.migrate().await.context("Cannot migrate database")?;
    }

    let state_clone = app_state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_jobs(state_clone).await {
            tracing::error!("Failed to start background jobs: {}", e);
        }
    });

    let addr = format!("{}:{}", &config.http.ip, &config.http.port);
    let app = create_app(app_state.clone());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
