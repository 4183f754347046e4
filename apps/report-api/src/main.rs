//! Report template backend
//!
//! Serves the stateless half of the report generator:
//!
//! - Number formatting (significant figures, decimal places)
//! - PDF text replacement, reading templates from and writing reports to
//!   object storage through pre-signed URLs
//!
//! All session state (variables, bindings, display values) lives in the
//! client; every request here is self-contained.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod storage;

use api::{handle_health, handle_replace_text, handle_rounding, handle_sig_figs};
use storage::{ObjectStore, PresignedUrlStore};

/// Command-line arguments for the report server
#[derive(Parser, Debug)]
#[command(name = "report-api")]
#[command(about = "Report template backend for number formatting and PDF text replacement")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Endpoint issuing pre-signed object storage URLs
    #[arg(long, env = "S3_PRESIGNED_URL_API_ENDPOINT")]
    presigned_url_endpoint: String,

    /// Comma-separated CORS origins; any origin is allowed when empty
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
}

/// Routes without middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/format/sig-figs", post(handle_sig_figs))
        .route("/api/format/rounding", post(handle_rounding))
        .route("/api/pdf/replace-text", post(handle_replace_text))
        .with_state(state)
}

/// CORS policy: permissive unless origins are listed
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid origin '{}'", o)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cors = cors_layer(&args.allowed_origins)?;
    let state = AppState {
        store: Arc::new(PresignedUrlStore::new(args.presigned_url_endpoint.clone())),
    };

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Pre-signed URL endpoint: {}", args.presigned_url_endpoint);
    if args.allowed_origins.is_empty() {
        info!("CORS: any origin");
    } else {
        info!("CORS: {}", args.allowed_origins.join(", "));
    }

    axum::serve(listener, app).await?;

    Ok(())
}
