//! Image captioner web front end.
//!
//! ```bash
//! # Point at a running captioning service and start on port 3000
//! CAPTIONING_SERVICE_URL=http://localhost:8000 captioner-web
//!
//! # Use a config file and JSON logs
//! captioner-web --config /etc/captioner.toml --json-logs
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use captioner_web::{build_app, logging, run_server, AppState, Config, VERSION};

/// Upload an image, get captions back from the captioning service.
#[derive(Parser, Debug)]
#[command(name = "captioner-web")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(short, long, env = "CAPTIONER_CONFIG", default_value = "captioner.toml")]
    config: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::info!(
        version = VERSION,
        captioning_service = config.captioning_service_url(),
        "Starting image captioner"
    );

    let state = Arc::new(AppState::from_config(&config, reqwest::Client::new()));
    let app = build_app(state);

    run_server(app, &config.bind_address()).await
}
