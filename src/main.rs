//! Post Navigator - Main Entry Point
//!
//! Serves the category catalog to the Telegram mini app and the
//! admin operations used by the admin page.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use post_navigator::auth::AdminGate;
use post_navigator::config::ServerSettings;
use post_navigator::server::{self, AppState};
use post_navigator::store::{Catalog, CategoryStore, JsonFilePersistence};

/// Backend for the channel post navigator mini app.
#[derive(Parser, Debug)]
#[command(name = "post_navigator")]
#[command(about = "Serve channel posts by category to a Telegram mini app")]
#[command(version)]
struct Args {
    /// Path to the categories JSON file (overrides `DATA_PATH`).
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Port to listen on (overrides `PORT`).
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write an example catalog to the given path and exit.
    #[arg(long)]
    generate_data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    if let Some(path) = args.generate_data {
        return generate_example_data(&path);
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let mut settings =
        ServerSettings::from_env().context("Failed to load server configuration from environment")?;
    if let Some(path) = args.data_file {
        settings.data_path = path;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    info!(
        "Admins: {}, lockout after {} failures for {}s",
        settings.allowed_admin_ids.len(),
        settings.max_login_attempts,
        settings.lockout_secs
    );

    let store = CategoryStore::open(JsonFilePersistence::new(&settings.data_path))
        .with_context(|| format!("Failed to open catalog at {}", settings.data_path.display()))?;

    let gate = AdminGate::from_settings(&settings);
    let state = AppState::new(store, gate);

    info!("Starting post navigator...");
    server::serve(state, settings.port)
        .await
        .context("HTTP server failed")?;

    info!("Shutting down...");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Writes the built-in example catalog.
fn generate_example_data(path: &Path) -> Result<()> {
    let example = Catalog::example();
    example
        .save_to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✓ Example catalog written to: {}", path.display());
    println!("\nTo use this backend:");
    println!("1. Point DATA_PATH (or --data-file) at the generated file");
    println!("2. Create a .env file with ADMIN_PASSWORD and ALLOWED_ADMIN_IDS");
    println!("3. Run: post_navigator");

    Ok(())
}
