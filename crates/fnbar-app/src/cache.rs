// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A fetched list and the manifest or rakefile it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedList {
    pub scope: PathBuf,
    pub items: Vec<String>,
}

/// The toolbar's list caches, in a form that can outlive the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCaches {
    pub scripts: Option<CachedList>,
    pub tasks: Option<CachedList>,
}

/// Remembers the last fetched list together with the path it was fetched for.
///
/// A fetch only reaches the underlying source when the scope key differs from the
/// one stored. Failed fetches are not stored, so the next call retries.
#[derive(Debug, Default)]
pub struct ScopedCache {
    entry: Option<CachedList>,
}

impl ScopedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(entry: Option<CachedList>) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> Option<&CachedList> {
        self.entry.as_ref()
    }

    pub fn fetch<F>(&mut self, scope: &Path, load: F) -> Result<Vec<String>>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        if let Some(entry) = &self.entry
            && entry.scope == scope
        {
            tracing::debug!(scope = %scope.display(), "list cache hit");
            return Ok(entry.items.clone());
        }

        tracing::debug!(scope = %scope.display(), "list cache miss");
        let items = load()?;
        self.entry = Some(CachedList {
            scope: scope.to_path_buf(),
            items: items.clone(),
        });
        Ok(items)
    }

    pub fn scope(&self) -> Option<&Path> {
        self.entry.as_ref().map(|entry| entry.scope.as_path())
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{CachedList, ScopedCache};
    use anyhow::{Result, anyhow};
    use std::cell::Cell;
    use std::path::Path;

    #[test]
    fn unchanged_scope_loads_once() -> Result<()> {
        let mut cache = ScopedCache::new();
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(vec!["build".to_owned()])
        };

        let first = cache.fetch(Path::new("/work/app/package.json"), load)?;
        let second = cache.fetch(Path::new("/work/app/package.json"), load)?;
        assert_eq!(first, second);
        assert_eq!(loads.get(), 1);
        Ok(())
    }

    #[test]
    fn new_scope_reloads_exactly_once() -> Result<()> {
        let mut cache = ScopedCache::new();
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(vec![format!("load-{}", loads.get())])
        };

        cache.fetch(Path::new("/a/package.json"), load)?;
        let moved = cache.fetch(Path::new("/b/package.json"), load)?;
        cache.fetch(Path::new("/b/package.json"), load)?;
        assert_eq!(moved, vec!["load-2".to_owned()]);
        assert_eq!(loads.get(), 2);
        assert_eq!(cache.scope(), Some(Path::new("/b/package.json")));
        Ok(())
    }

    #[test]
    fn failed_load_is_not_remembered() -> Result<()> {
        let mut cache = ScopedCache::new();
        let failed = cache.fetch(Path::new("/a/Rakefile"), || Err(anyhow!("rake exited 1")));
        assert!(failed.is_err());
        assert_eq!(cache.scope(), None);

        let items = cache.fetch(Path::new("/a/Rakefile"), || Ok(vec!["spec".to_owned()]))?;
        assert_eq!(items, vec!["spec".to_owned()]);
        Ok(())
    }

    #[test]
    fn seeded_entry_serves_its_scope_without_loading() -> Result<()> {
        let mut cache = ScopedCache::seeded(Some(CachedList {
            scope: "/web/package.json".into(),
            items: vec!["lint".to_owned()],
        }));
        let items = cache.fetch(Path::new("/web/package.json"), || {
            Err(anyhow!("seeded scope should not load"))
        })?;
        assert_eq!(items, vec!["lint".to_owned()]);

        cache.fetch(Path::new("/api/package.json"), || Ok(vec!["serve".to_owned()]))?;
        assert_eq!(
            cache.entry().map(|entry| entry.items.clone()),
            Some(vec!["serve".to_owned()])
        );
        Ok(())
    }

    #[test]
    fn invalidate_forces_reload() -> Result<()> {
        let mut cache = ScopedCache::new();
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok(Vec::new())
        };
        cache.fetch(Path::new("/a"), load)?;
        cache.invalidate();
        cache.fetch(Path::new("/a"), load)?;
        assert_eq!(loads.get(), 2);
        Ok(())
    }
}
