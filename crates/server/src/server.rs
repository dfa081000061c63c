//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, compression, etc.)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id, resolve_staff, staff_auth};
use crate::routes::{api_info, not_found};
use crate::routes::{health, system, user};
use crate::state::ServerState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: /, /health, /ready, /metrics, field listing and the
///   invite endpoint (staff context resolved when a key is present, never
///   required)
/// - Staff routes: custom field administration and server metadata (staff
///   API key required; per-endpoint privilege levels checked in handlers)
///
/// Middleware stack (applied in reverse order):
/// 1. Request ID tracking
/// 2. Request logging and metrics
/// 3. Timeout handling
/// 4. Compression
/// 5. CORS
/// 6. Staff key authentication (staff routes only)
pub fn router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    // Probes and metadata (no auth, no staff context)
    let mut probe_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));
    if state.config.metrics_enabled {
        probe_routes = probe_routes.route("/metrics", get(health::metrics));
    }

    // Public API (staff context resolved if a key is present)
    let public_routes = Router::new()
        .route("/api/v1/user/invite", post(user::invite_user))
        .route("/api/v1/system/custom-fields", get(system::list_custom_fields))
        .layer(from_fn_with_state(state.clone(), resolve_staff));

    // Staff API (key required)
    let staff_routes = Router::new()
        .route(
            "/api/v1/system/add-custom-field",
            post(system::add_custom_field),
        )
        .route("/api/v1/metadata", get(health::server_metadata))
        .layer(from_fn_with_state(state.clone(), staff_auth));

    // Combine routes
    Router::new()
        .merge(probe_routes)
        .merge(public_routes)
        .merge(staff_routes)
        .fallback(not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::new(state.config.timeout()))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the OpenDesk HTTP server
///
/// Initializes logging, metrics, and shared state from the provided
/// configuration, then listens for incoming HTTP requests until the process
/// receives SIGTERM or Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with_target(false)
        .json()
        .init();

    // Install the metrics recorder before the first request lands
    health::init_metrics();

    // Create server state
    let state = Arc::new(ServerState::new(config.clone()));

    // Build router
    let app = router(state);

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting OpenDesk server on {} with {} staff keys",
        addr,
        config.staff_keys.len()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Rate limit: {} requests/minute",
        config.timeout_secs,
        config.max_body_size_mb,
        config.rate_limit_per_minute
    );
    tracing::info!(
        "Registration: {}, User system: {}, Mail: {}",
        config.registration_enabled,
        config.user_system_enabled,
        config.mail_connected
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
