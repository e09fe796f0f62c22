//! HLS hosting tool
//!
//! Reads a parsed master playlist (JSON), renders the hosting tree and
//! copies the referenced segments:
//!
//! `hls-hosting <master.json> <source-dir> <out-dir> [config.toml]`

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hls_hosting::config::LoggingConfig;
use hls_hosting::{write_tree, HostingConfig, HostingError, Loader, MasterPlaylist, Result};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-hosting";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!(
            "usage: {} <master.json> <source-dir> <out-dir> [config.toml]",
            APP_NAME
        );
        std::process::exit(2);
    }
    let model_path = PathBuf::from(&args[0]);
    let source_dir = PathBuf::from(&args[1]);
    let out_dir = PathBuf::from(&args[2]);
    let config_path = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| "hls-hosting.toml".to_string());

    let config = HostingConfig::load_or_default(&config_path);
    init_logging(&config.logging);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::info!("Configuration loaded: {:?}", config);

    let content = tokio::fs::read_to_string(&model_path).await?;
    let master: MasterPlaylist = serde_json::from_str(&content)?;
    tracing::info!(
        "Loaded {} with {} media playlist(s)",
        master.path,
        master.media_playlists.len()
    );

    let loader = Loader::with_settings(master, &config.hosting);
    match write_tree(&loader, &source_dir, &out_dir).await {
        Ok(tree) => {
            tracing::info!(
                "Hosted {} playlist(s) and {} segment file(s), {} bytes",
                tree.playlists.len(),
                tree.segments.len(),
                tree.bytes_written
            );
            Ok(())
        }
        Err(HostingError::Validation(e)) => {
            for violation in &e.violations {
                tracing::error!("{}", violation);
            }
            Err(HostingError::Validation(e))
        }
        Err(e) => {
            tracing::error!("Hosting failed: {}", e);
            Err(e)
        }
    }
}

/// Initialize logging with tracing
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hls_hosting={}", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
