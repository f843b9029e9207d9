use std::{sync::Arc, time::Duration};

use jz_api::{
    config::ApiConfig, jobs::spawn_session_sweeper, metrics::init_metrics, router::router,
    session::SessionStore, state::ApiState, store::PgStore, tracing::init_tracing,
};
use tower_http::cors::CorsLayer;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    init_tracing(&config.env);

    // Without a database there is nothing to serve
    let pool = jz_db::create_pool(&config.database_url, config.db_max_connections).await?;
    jz_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let metrics = if config.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
    let state = ApiState::new(
        &config,
        Arc::new(PgStore::new(pool)),
        sessions.clone(),
        metrics,
    )?;

    spawn_session_sweeper(sessions, SESSION_SWEEP_INTERVAL);

    let app = router(state).layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
