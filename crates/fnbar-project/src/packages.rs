// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    scripts: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    require: BTreeMap<String, Value>,
    #[serde(default, rename = "require-dev")]
    require_dev: BTreeMap<String, Value>,
}

/// Script names declared in a `package.json`, in name order.
pub fn package_scripts(manifest: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(manifest)
        .with_context(|| format!("read package manifest {}", manifest.display()))?;
    let parsed: PackageManifest = serde_json::from_str(&raw)
        .with_context(|| format!("parse package manifest {}", manifest.display()))?;
    Ok(parsed.scripts.into_keys().collect())
}

pub fn composer_packages(manifest: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(manifest)
        .with_context(|| format!("read composer manifest {}", manifest.display()))?;
    let parsed: ComposerManifest = serde_json::from_str(&raw)
        .with_context(|| format!("parse composer manifest {}", manifest.display()))?;
    Ok(parsed
        .require
        .into_keys()
        .chain(parsed.require_dev.into_keys())
        .collect())
}
