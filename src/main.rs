use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ipguessr::{
    api,
    config::GameConfig,
    geo::{IpinfoClient, NominatimClient},
    state::AppState,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipguessr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting IP Guessr...");

    let config = GameConfig::from_env();
    tracing::info!(
        "{} rounds, discovery budget {}×{}, {} excluded ASNs",
        config.rounds,
        config.batch_size,
        config.batch_count,
        config.excluded_asns.len()
    );

    let lookup = Arc::new(IpinfoClient::new(config.ipinfo_base_url.clone()));
    let reverse = Arc::new(NominatimClient::new(config.nominatim_base_url.clone()));
    let state = Arc::new(AppState::new(config, lookup, reverse));

    let app = Router::new()
        .route("/api/session", get(api::get_session))
        .route("/api/mode", post(api::post_mode))
        .route("/api/start", post(api::post_start))
        .route("/api/guess", post(api::post_guess))
        .route("/api/advance", post(api::post_advance))
        .route("/api/summary", get(api::get_summary))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 4380));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
