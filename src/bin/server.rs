//! Atelier Server
//!
//! Hosts the document store, the admin sign-in and the two site pages.
//!
//! # Configuration
//!
//! Environment variables:
//! - `ATELIER_PORT`: Port to listen on (default: 8080)
//! - `ATELIER_DATA_DIR`: Directory to store collections (default: ~/.local/share/atelier-server)
//! - `ATELIER_CONFIG`: Path to the admin file (default: ~/.config/atelier-server/config.yaml)
//! - `ATELIER_SESSION_MINUTES`: Session lifetime (default: 720)
//!
//! # Config File Format
//!
//! ```yaml
//! admins:
//!   - email: "owner@example.com"
//!     password_sha256: "<hex sha256 of the password>"
//! ```
//!
//! Manage the file with `atelier-admin`.
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint (no auth required)
//! - `POST /api/auth/sign-in`, `POST /api/auth/sign-out`
//! - `/api/collections/{collection}[/{id}]`: document CRUD
//! - `GET /api/collections/{collection}/subscribe`: WebSocket snapshots
//! - `GET /`, `GET /admin`: site pages

use std::net::SocketAddr;
use std::time::Duration;

use atelier::auth::{AdminDirectory, LocalAuth};
use atelier::config::ServerConfig;
use atelier::server::{router, AppState};
use atelier::store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired session tokens are dropped
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env();

    // Ensure data directory exists
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Config file: {}", config.config_path.display());

    let store = match MemoryStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to load collections: {}", e);
            std::process::exit(1);
        }
    };

    let directory = AdminDirectory::load(&config.config_path);
    let auth = LocalAuth::new(directory, config.session_minutes);

    let state = match AppState::new(store, auth).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to start site: {}", e);
            std::process::exit(1);
        }
    };

    let auth = state.auth.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = auth.tokens().cleanup_expired();
            if removed > 0 {
                tracing::debug!("Dropped {} expired session(s)", removed);
            }
        }
    });

    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
