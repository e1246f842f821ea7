mod api_doc;
mod auth;
mod config;
mod notification;
mod routes;
mod state;
mod websocket;

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::config::AppConfig;
use crate::notification::clock::SystemClock;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    tracing_subscriber::fmt::init();

    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    if config.seed_demo_notifications {
        info!("New operator sessions will be seeded with demo notifications");
    }

    let state = AppState::new(&config, Arc::new(SystemClock));

    // Build the router
    let app = Router::new()
        // API documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health routes
        .merge(routes::health::routes(state.clone()))
        // Notification center and push channel
        .merge(routes::notifications::routes(state))
        // Add welcome route
        .route("/", get(|| async { "Welcome to the Daily Burst Coach Notification API" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Try different ports
    let mut port = config.port;
    let max_tries = config.port_attempts.max(1);
    for attempt in 1..=max_tries {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        match axum::Server::try_bind(&addr) {
            Ok(server) => {
                info!("Server started successfully at http://localhost:{}", port);
                info!("API Documentation: http://localhost:{}/docs", port);
                info!(
                    "Push channel: ws://localhost:{}/api/notifications/ws?token=<JWT>",
                    port
                );
                return server
                    .serve(app.into_make_service())
                    .await
                    .map_err(|e| e.into());
            }
            Err(e) => {
                warn!("Port {} unavailable (attempt {}/{}): {}", port, attempt, max_tries, e);
                if attempt == max_tries {
                    return Err("Failed to bind to any port".into());
                }
                port = port.saturating_add(1);
            }
        }
    }

    Err("Failed to bind to any port".into())
}
