use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn filter() -> EnvFilter {
    // RUST_LOG wins over the default level.
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Logging for the full-screen app. The terminal belongs to the renderer,
/// so events only go somewhere when a log file was requested.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter()),
        )
        .try_init()
        .context("install tracing subscriber")?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

/// Logging for command-line tools whose stdout carries output.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter()),
        )
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}
