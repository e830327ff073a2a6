// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::APP_NAME;
use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FNBAR_LOG";
const DEFAULT_FILTER: &str = "warn";

pub fn log_path() -> Result<PathBuf> {
    let cache_root =
        dirs::cache_dir().ok_or_else(|| anyhow!("cannot resolve cache directory for logs"))?;
    Ok(cache_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
}

/// Sends tracing output to the log file. Stdout belongs to the shell.
pub fn init() -> Result<()> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::log_path;
    use anyhow::Result;

    #[test]
    fn log_file_lives_under_app_cache_dir() -> Result<()> {
        let path = log_path()?;
        assert!(path.ends_with("fnbar/fnbar.log"));
        Ok(())
    }
}
