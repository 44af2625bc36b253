use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gramcare::api::{api_router, AppState};
use gramcare::config::Config;
use gramcare::db;

/// Entry point: load configuration, migrate the database, serve the API.
///
/// # Environment Variables
/// - `GRAMCARE_ADDR`: bind address (default "0.0.0.0:4000")
/// - `GRAMCARE_DB`: SQLite path (default ~/.gramcare/gramcare.db)
/// - `GEMINI_API_KEY`: enables the remote triage classifier
/// - `DOCTOR_PHONE` / `DOCTOR_EMAIL`: on-call alert contacts
/// - `MEET_BASE_URL`: video meeting base (default https://meet.jit.si)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gramcare=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    db::open_database(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), "database ready");

    if config.classifier.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, triage will use the keyword fallback");
    }

    let app = api_router(AppState::from_config(&config));

    tracing::info!("++ Starting GramCare API on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
