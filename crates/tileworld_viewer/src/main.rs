mod config;
mod input;
mod loop_runner;
mod renderer;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::ViewerConfig;

fn main() {
    init_tracing();
    info!("=== Tile World Viewer Startup ===");

    let config = match ViewerConfig::resolve(std::env::args().nth(1), |key| {
        std::env::var(key).ok()
    }) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "config_invalid");
            std::process::exit(2);
        }
    };

    if let Err(err) = loop_runner::run_viewer(config) {
        error!(error = %err, "viewer_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
