use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use bosscars::config::AppConfig;
use bosscars::db;
use bosscars::routes;
use bosscars::services::messaging::LogSmsProvider;
use bosscars::services::sheets::SheetsMirror;
use bosscars::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let mirror = SheetsMirror::new(
        config.sheets_spreadsheet_id.clone(),
        config.sheets_client_email.clone(),
        config.sheets_private_key.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        sms: Box::new(LogSmsProvider),
        mirror: Box::new(mirror),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
