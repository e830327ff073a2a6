// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

use crate::runner::{CommandRunner, run_checked};

pub const TASK_CACHE_FILE: &str = ".rake_tasks";
const RAKELIB_DIR: &str = "rakelib";

/// Task names for `rakefile`, served from the on-disk cache beside it when still fresh.
pub fn rake_tasks<R: CommandRunner>(runner: &R, rakefile: &Path) -> Result<Vec<String>> {
    let dir = rakefile
        .parent()
        .ok_or_else(|| anyhow!("rakefile {} has no parent directory", rakefile.display()))?;
    let cache = dir.join(TASK_CACHE_FILE);

    if !cache_is_stale(rakefile, &cache)? {
        return read_task_cache(&cache);
    }

    tracing::debug!(rakefile = %rakefile.display(), "regenerating rake task cache");
    let listing = run_checked(runner, "rake", &["--silent", "--tasks", "--all"], dir)?;
    let tasks = parse_task_listing(&listing);
    if let Err(error) = write_task_cache(&cache, &tasks) {
        tracing::warn!(cache = %cache.display(), error = %error, "rake task cache not saved");
    }
    Ok(tasks)
}

/// True when the cache is missing or older than the rakefile or any `rakelib/*.rake`.
pub fn cache_is_stale(rakefile: &Path, cache: &Path) -> Result<bool> {
    let Some(cached_at) = modified(cache)? else {
        return Ok(true);
    };
    Ok(newest_source(rakefile)?.is_some_and(|changed_at| changed_at > cached_at))
}

/// Latest modification among the rakefile and the `rakelib/*.rake` files beside it.
pub fn newest_source(rakefile: &Path) -> Result<Option<OffsetDateTime>> {
    let mut sources = vec![rakefile.to_path_buf()];
    if let Some(dir) = rakefile.parent() {
        sources.extend(rakelib_sources(&dir.join(RAKELIB_DIR))?);
    }

    let mut newest = None;
    for source in sources {
        newest = newest.max(modified(&source)?);
    }
    Ok(newest)
}

/// Task names from `rake --tasks` output, argument lists stripped.
pub fn parse_task_listing(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            if words.next()? != "rake" {
                return None;
            }
            let task = words.next()?;
            let name = task.split('[').next().unwrap_or(task);
            Some(name.to_owned()).filter(|name| !name.is_empty())
        })
        .collect()
}

pub fn read_task_cache(cache: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(cache)
        .with_context(|| format!("read rake task cache {}", cache.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Rewrites the whole cache file, one task per line.
pub fn write_task_cache(cache: &Path, tasks: &[String]) -> Result<()> {
    let mut content = tasks.join("\n");
    content.push('\n');
    fs::write(cache, content)
        .with_context(|| format!("write rake task cache {}", cache.display()))
}

fn rakelib_sources(rakelib: &Path) -> Result<Vec<PathBuf>> {
    if !rakelib.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(rakelib)
        .with_context(|| format!("list rake sources in {}", rakelib.display()))?;
    let mut sources = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("list rake sources in {}", rakelib.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "rake") {
            sources.push(path);
        }
    }
    Ok(sources)
}

pub(crate) fn modified(path: &Path) -> Result<Option<OffsetDateTime>> {
    if !path.exists() {
        return Ok(None);
    }
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .with_context(|| format!("read modification time of {}", path.display()))?;
    Ok(Some(OffsetDateTime::from(modified)))
}
