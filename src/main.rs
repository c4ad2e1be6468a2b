// Main entry point for the image-vault-server application.
// Creates the uploads directory, wires the in-memory image store into the
// Axum router, and serves the image API until a shutdown signal arrives.

mod models;
mod shutdown_signal;
mod store;
mod uploads;
mod web;

use axum::http::HeaderValue;
use clap::Parser;
use shutdown_signal::shutdown_signal;
use std::sync::Arc;
use store::MemoryImageStore;
use tracing::Level;
use uploads::UploadsDir;
use web::AppState;

/// Command line arguments for image-vault-server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct AppConfig {
    /// Hostname/IP to bind the server to.
    /// If this option is specified without value, it will default to "*", meaning the server will listen on all interfaces.
    #[arg(long, env = "IMAGE_VAULT_HOST", default_value = "localhost", num_args = 0..=1, default_missing_value = "*")]
    host: String,

    /// Port number to listen on.
    #[arg(short, long, env = "IMAGE_VAULT_PORT", default_value_t = 8080)]
    port: u16,

    /// Directory uploaded files are stored in and served from.
    #[arg(long, env = "IMAGE_VAULT_UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: String,

    /// The single origin allowed to make cross-origin requests.
    #[arg(long, env = "IMAGE_VAULT_CORS_ORIGIN", default_value = "http://localhost:5000")]
    cors_origin: String,

    /// Maximum log level (error, warn, info, debug, trace).
    #[arg(long, env = "IMAGE_VAULT_LOG_LEVEL", default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main]
async fn main() {
    let config = AppConfig::parse();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting image-vault-server...");

    let uploads = UploadsDir::new(&config.uploads_dir);
    if let Err(e) = uploads.ensure_exists() {
        tracing::error!(
            "FATAL: Failed to create uploads directory {}: {}",
            uploads.root().display(),
            e
        );
        eprintln!("FATAL: Could not create uploads directory. Error: {}. Exiting.", e);
        std::process::exit(1);
    }
    tracing::info!("Uploads directory set to: {}", uploads.root().display());

    let cors_origin = match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => origin,
        Err(e) => {
            tracing::error!("FATAL: Invalid CORS origin {:?}: {}", config.cors_origin, e);
            eprintln!("FATAL: Invalid CORS origin. Error: {}. Exiting.", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Allowing cross-origin requests from {}", config.cors_origin);

    let state = AppState::new(Arc::new(MemoryImageStore::new()), uploads);
    let app = web::create_app(state, cors_origin);

    tracing::info!("Axum router configured.");

    let listener = match web::create_listener(&config.host, config.port).await {
        Ok((addr, l)) => {
            tracing::info!("Server successfully bound. Listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("FATAL: Failed to bind server: {}", e);
            eprintln!("FATAL: Could not bind server. Error: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server run error: {}", e);
        eprintln!("ERROR: Server shut down unexpectedly. Error: {}", e);
    }

    tracing::info!("image-vault-server has shut down.");
}
