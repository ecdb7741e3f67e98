use anyhow::Result;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use chama_server::app;
use chama_server::config;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  chama-server [config.toml]    Start the rule engine (default: config/server.toml)");
    eprintln!("  chama-server --help           Show this message");
}

#[tokio::main]
async fn main() -> Result<()> {
    chama_common::id::init(1, 1)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chama=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = config::ServerConfig::load(config_path)?;

    tracing::info!(
        config = config_path,
        autostart = config.engine.autostart,
        default_interval_secs = config.engine.default_interval_secs,
        "chama-server starting"
    );

    let state = app::build_app_state(config)?;

    if state.config.engine.autostart {
        state.engine.start_scheduled_rules();
    } else {
        tracing::info!("Autostart disabled, rules run only when triggered");
    }

    tracing::info!(
        rules = state.engine.len(),
        scheduled = state.engine.live_timer_count(),
        "Server started"
    );

    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down gracefully");

    state.engine.stop_scheduled_rules();
    tracing::info!("Server stopped");

    Ok(())
}
