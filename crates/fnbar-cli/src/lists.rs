// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::APP_NAME;
use anyhow::{Context, Result, anyhow};
use fnbar_app::{CachedList, ListCaches};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

const STORE_FILE: &str = "lists.json";

type SourceStamp = Box<dyn Fn(&Path) -> Option<OffsetDateTime>>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredLists {
    scripts: Option<StoredList>,
    tasks: Option<StoredList>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredList {
    list: CachedList,
    source_modified: Option<OffsetDateTime>,
}

/// Keeps the toolbar's script and task lists between `fnbar` runs.
///
/// A stored list is dropped once its source file has changed.
pub struct ListStore {
    path: PathBuf,
    stamp: SourceStamp,
}

impl ListStore {
    pub fn default_path() -> Result<PathBuf> {
        let cache_root = dirs::cache_dir()
            .ok_or_else(|| anyhow!("cannot resolve cache directory for list cache"))?;
        Ok(cache_root.join(APP_NAME).join(STORE_FILE))
    }

    pub fn open(path: PathBuf) -> Self {
        Self::with_stamp(path, fnbar_project::list_source_modified)
    }

    pub fn with_stamp<F>(path: PathBuf, stamp: F) -> Self
    where
        F: Fn(&Path) -> Option<OffsetDateTime> + 'static,
    {
        Self {
            path,
            stamp: Box::new(stamp),
        }
    }

    /// Stored lists whose sources are unchanged. A missing or unreadable file yields none.
    pub fn load(&self) -> ListCaches {
        let stored = match self.read() {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %format!("{error:#}"),
                    "list cache ignored"
                );
                StoredLists::default()
            }
        };
        ListCaches {
            scripts: stored.scripts.and_then(|entry| self.still_fresh(entry)),
            tasks: stored.tasks.and_then(|entry| self.still_fresh(entry)),
        }
    }

    pub fn save(&self, caches: &ListCaches) -> Result<()> {
        let stored = StoredLists {
            scripts: caches.scripts.clone().map(|list| self.stamped(list)),
            tasks: caches.tasks.clone().map(|list| self.stamped(list)),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create cache directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string(&stored).context("encode list cache")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("write list cache {}", self.path.display()))
    }

    fn read(&self) -> Result<StoredLists> {
        if !self.path.exists() {
            return Ok(StoredLists::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read list cache {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parse list cache {}", self.path.display()))
    }

    fn stamped(&self, list: CachedList) -> StoredList {
        StoredList {
            source_modified: (self.stamp)(&list.scope),
            list,
        }
    }

    fn still_fresh(&self, entry: StoredList) -> Option<CachedList> {
        let current = (self.stamp)(&entry.list.scope);
        if current != entry.source_modified {
            tracing::debug!(scope = %entry.list.scope.display(), "stored list is stale");
            return None;
        }
        Some(entry.list)
    }
}
