//! Diagnostics log under the XDG state dir, with stderr as fallback.

use anyhow::Result;
use std::fs;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,pl2audio=debug,pl2audio_core=debug,pl2audio_cli=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to `~/.local/state/pl2audio/pl2audio.log`, appending.
///
/// User-facing status lines are printed by the CLI, not logged. Returns Err
/// when the state dir or file is unusable so the caller can fall back to
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let log_path = xdg::BaseDirectories::with_prefix("pl2audio")?.place_state_file("pl2audio.log")?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Lane threads log concurrently; one lock per event keeps lines whole.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(path = %log_path.display(), "logging started");
    Ok(())
}

pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_thread_names(true)
        .try_init();
}
