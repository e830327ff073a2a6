// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod git;
pub mod packages;
pub mod rake;
mod runner;

use anyhow::{Context, Result};
use fnbar_app::{DirtyState, Divergence, GitLocation, ProjectRuntime, RAKEFILES};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub use runner::{CommandRunner, ProcessCommandRunner};

/// A project on disk, queried through the real `git` and `rake` binaries.
///
/// Repository location and current branch are asked once per render; several probes
/// read them.
pub struct FsProject<R = ProcessCommandRunner> {
    working_dir: PathBuf,
    runner: R,
    location: Option<GitLocation>,
    branch: Option<Option<String>>,
}

impl FsProject<ProcessCommandRunner> {
    pub fn open(dir: &Path) -> Result<Self> {
        Self::with_runner(dir, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> FsProject<R> {
    pub fn with_runner(dir: &Path, runner: R) -> Result<Self> {
        let working_dir = dir
            .canonicalize()
            .with_context(|| format!("resolve working directory {}", dir.display()))?;
        Ok(Self {
            working_dir,
            runner,
            location: None,
            branch: None,
        })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> ProjectRuntime for FsProject<R> {
    fn begin_render(&mut self) {
        self.location = None;
        self.branch = None;
    }

    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn has_marker(&mut self, name: &str) -> bool {
        self.working_dir.join(name).exists()
    }

    fn find_up(&mut self, name: &str) -> Option<PathBuf> {
        find_up(&self.working_dir, name)
    }

    fn git_location(&mut self) -> Result<GitLocation> {
        if let Some(location) = self.location {
            return Ok(location);
        }
        let location = git::location(&self.runner, &self.working_dir)?;
        self.location = Some(location);
        Ok(location)
    }

    fn current_branch(&mut self) -> Result<Option<String>> {
        if let Some(branch) = &self.branch {
            return Ok(branch.clone());
        }
        let branch = git::current_branch(&self.runner, &self.working_dir)?;
        self.branch = Some(branch.clone());
        Ok(branch)
    }

    fn dirty_state(&mut self) -> Result<DirtyState> {
        git::dirty_state(&self.runner, &self.working_dir)
    }

    fn divergence(&mut self) -> Result<Option<Divergence>> {
        git::divergence(&self.runner, &self.working_dir)
    }

    fn branches(&mut self) -> Result<Vec<String>> {
        git::branches(&self.runner, &self.working_dir)
    }

    fn package_scripts(&mut self, manifest: &Path) -> Result<Vec<String>> {
        packages::package_scripts(manifest)
    }

    fn rake_tasks(&mut self, rakefile: &Path) -> Result<Vec<String>> {
        rake::rake_tasks(&self.runner, rakefile)
    }

    fn composer_packages(&mut self, manifest: &Path) -> Result<Vec<String>> {
        packages::composer_packages(manifest)
    }
}

/// Nearest file called `name` in `start` or one of its ancestors.
pub fn find_up(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Newest modification time of the files a cached list was read from.
///
/// Rakefiles also count their `rakelib/*.rake` sources. `None` when nothing can be read.
pub fn list_source_modified(scope: &Path) -> Option<OffsetDateTime> {
    let is_rakefile = scope
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| RAKEFILES.contains(&name));
    let newest = if is_rakefile {
        rake::newest_source(scope)
    } else {
        rake::modified(scope)
    };
    newest.unwrap_or_else(|error| {
        tracing::debug!(scope = %scope.display(), error = %error, "list source unreadable");
        None
    })
}
