//! Legal Document Explainer Server
//!
//! Accepts PDF uploads, extracts their text and asks a generative model for a
//! plain-language breakdown. REST endpoints:
//!
//! - `POST /upload-document` - upload, extract, store and analyze a PDF
//! - `POST /chat` - ask a question about a stored or inline document
//! - `GET /document/{id}` - metadata and preview for a stored document
//! - `GET /` and `GET /health` - liveness
//!
//! ## Architecture
//!
//! Documents are kept in an in-memory [`store::DocumentStore`] for the
//! lifetime of the process. Model access goes through the
//! [`analysis_engine::GenerativeModel`] trait so the server runs with or
//! without a Gemini key; without one, upload and chat answer 500.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use analysis_engine::{GeminiClient, GeminiConfig, GenerativeModel};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod state;
mod store;

use api::{
    handle_chat, handle_get_document, handle_health, handle_root, handle_upload_document,
    MAX_UPLOAD_BYTES,
};
use state::AppState;
use store::IdScheme;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Command-line arguments for the explainer server
#[derive(Parser, Debug)]
#[command(name = "explainer-server")]
#[command(about = "AI legal document explainer API")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Gemini API key; upload and chat answer 500 without one
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = analysis_engine::gemini::DEFAULT_MODEL)]
    gemini_model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = analysis_engine::gemini::DEFAULT_BASE_URL)]
    gemini_base_url: String,

    /// Timeout for a single model request, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value = "60")]
    llm_timeout_secs: u64,

    /// Comma-separated origins allowed by CORS
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://127.0.0.1:3000"
    )]
    allowed_origins: Vec<String>,

    /// Document id scheme
    #[arg(long, env = "ID_SCHEME", value_enum, default_value_t = IdScheme::Uuid)]
    id_scheme: IdScheme,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting explainer server on {}:{}", args.host, args.port);

    let model = build_model(&args)?;
    let state = AppState::new(model, args.id_scheme);
    let app = build_router(state, cors_layer(&args.allowed_origins));

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Document ids: {:?}", args.id_scheme);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Gemini client, or `None` when no key was supplied
fn build_model(args: &Args) -> anyhow::Result<Option<Arc<dyn GenerativeModel>>> {
    let Some(api_key) = args
        .gemini_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    else {
        warn!("GEMINI_API_KEY not set; upload and chat will fail until it is configured");
        return Ok(None);
    };

    let config = GeminiConfig::new(api_key)
        .with_model(&args.gemini_model)
        .with_base_url(&args.gemini_base_url)
        .with_timeout(Duration::from_secs(args.llm_timeout_secs));
    let client = GeminiClient::new(config)?;

    info!(
        model = %args.gemini_model,
        timeout_secs = args.llm_timeout_secs,
        "Gemini API configured"
    );
    Ok(Some(Arc::new(client)))
}

/// CORS for the configured origins, with credentials
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|origin| {
            if origin == "*" {
                warn!("Wildcard origin cannot be combined with credentials, skipping");
                return None;
            }
            match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(origin, error = %e, "Skipping invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    info!(count = origins.len(), "CORS origins configured");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Liveness
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        // API endpoints
        .route("/upload-document", post(handle_upload_document))
        .route("/chat", post(handle_chat))
        .route("/document/:document_id", get(handle_get_document))
        // Apply middleware
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
