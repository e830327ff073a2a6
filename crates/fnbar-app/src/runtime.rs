// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::{DirtyState, Divergence, GitLocation, Handler, Slot};

/// The terminal side of the toolbar: key labels and key bindings.
pub trait KeyRow {
    fn set_label(&mut self, slot: Slot, text: &str);
    fn clear_labels(&mut self);
    fn bind_command(&mut self, slot: Slot, command: &str);
    fn bind_handler(&mut self, slot: Slot, handler: Handler);
    fn clear_bindings(&mut self);
}

/// Everything the toolbar reads about the project the shell is sitting in.
pub trait ProjectRuntime {
    /// Called once before every render. Answers remembered for one render are dropped here.
    fn begin_render(&mut self) {}

    fn working_dir(&self) -> &Path;

    /// Whether `name` exists directly inside the working directory.
    fn has_marker(&mut self, name: &str) -> bool;

    /// Nearest `name` in the working directory or one of its ancestors.
    fn find_up(&mut self, name: &str) -> Option<PathBuf>;

    fn git_location(&mut self) -> Result<GitLocation>;
    fn current_branch(&mut self) -> Result<Option<String>>;
    fn dirty_state(&mut self) -> Result<DirtyState>;

    /// `None` when the branch has no upstream.
    fn divergence(&mut self) -> Result<Option<Divergence>>;
    fn branches(&mut self) -> Result<Vec<String>>;

    fn package_scripts(&mut self, manifest: &Path) -> Result<Vec<String>>;
    fn rake_tasks(&mut self, rakefile: &Path) -> Result<Vec<String>>;

    /// Package names required by a composer manifest, dev requirements included.
    fn composer_packages(&mut self, manifest: &Path) -> Result<Vec<String>>;

    fn has_any_marker(&mut self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_marker(name))
    }

    fn first_marker(&mut self, names: &[&str]) -> Option<PathBuf> {
        let found = names.iter().find(|name| self.has_marker(name))?;
        Some(self.working_dir().join(found))
    }
}
