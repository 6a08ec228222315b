//! Image captioner web front end.
//!
//! Serves an upload form, forwards the uploaded image to a remote
//! captioning service and renders the captions it returns.
//!
//! ```text
//! browser --multipart--> POST /describe --multipart--> {service}/caption
//!                                       <----JSON------
//!         <----HTML page (captions + preview | error)
//! ```

pub mod captioner;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod upload;
pub mod view;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use captioner::{CaptionOutcome, CaptionResult, CaptionService};
pub use config::Config;
pub use error::{CaptionError, ConfigError};
pub use upload::UploadedImage;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub captioner: CaptionService,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the state from a loaded configuration, sharing one HTTP client.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self {
            captioner: CaptionService::new(client, config.captioning_service_url()),
            max_upload_bytes: config.limits.max_upload_bytes,
        }
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(routes::index))
        .route(
            "/describe",
            post(routes::describe).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(app: Router, bind_address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
