mod extractor;
mod handlers;
mod mcp;
mod prompt;

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcp::server::McpServer;

const CONFIG_DIR_NAME: &str = "unit-test-prompt-mcp";

/// Load .env files from multiple locations with priority order:
/// 1. Current working directory (project-specific config)
/// 2. XDG config directory ~/.config/unit-test-prompt-mcp/.env (global default config)
///
/// Environment variables set directly in the shell always take highest priority.
/// Runs before logging is set up (the file may carry RUST_LOG), so the loaded
/// path is returned for the caller to log.
fn load_env_files() -> Option<PathBuf> {
    let candidates = [
        std::env::current_dir().ok().map(|p| p.join(".env")),
        get_xdg_config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(".env")),
    ];
    load_first_env_file(candidates.into_iter().flatten())
}

/// Load the first existing candidate and return its path
fn load_first_env_file(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|path| path.exists() && dotenv::from_path(path).is_ok())
}

/// Get XDG config directory, fallback to ~/.config
fn get_xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_files();

    // Logs go to stderr; stdout carries the MCP protocol.
    // Default to "error" level, override with RUST_LOG (e.g. RUST_LOG=debug)
    let env_filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    match env_file {
        Some(path) => tracing::debug!("Loaded .env from: {}", path.display()),
        None => tracing::debug!("No .env file found, using environment variables only"),
    }

    tracing::info!("Starting unit test prompt MCP server...");

    let server = McpServer::new()?;
    server.start().await?;

    Ok(())
}
