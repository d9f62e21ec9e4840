use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use relay_core::Config;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RELAY_LOG";
const LOG_FILE: &str = "relay.log";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the non-interactive commands.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log to a file so nothing is written over the alternate screen.
/// Returns the log path.
pub fn init_file() -> Result<PathBuf> {
    let dir = Config::config_dir().unwrap_or_else(|_| std::env::temp_dir().join("relay"));
    fs::create_dir_all(&dir)?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(path)
}
