// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use fnbar_app::{
    Action, DirtyState, Divergence, GitLocation, Handler, KeyRow, ProjectRuntime, Slot,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRowCall {
    SetLabel(Slot, String),
    ClearLabels,
    BindCommand(Slot, String),
    BindHandler(Slot, Handler),
    ClearBindings,
}

/// Key row that remembers every call in order.
#[derive(Debug, Default)]
pub struct RecordingKeyRow {
    pub calls: Vec<KeyRowCall>,
}

impl RecordingKeyRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_calls(&mut self) -> Vec<KeyRowCall> {
        std::mem::take(&mut self.calls)
    }

    /// Labels on the row after replaying every call.
    pub fn labels(&self) -> BTreeMap<Slot, String> {
        let mut labels = BTreeMap::new();
        for call in &self.calls {
            match call {
                KeyRowCall::SetLabel(slot, text) => {
                    labels.insert(*slot, text.clone());
                }
                KeyRowCall::ClearLabels => labels.clear(),
                _ => {}
            }
        }
        labels
    }

    /// Bindings on the row after replaying every call.
    pub fn bindings(&self) -> BTreeMap<Slot, Action> {
        let mut bindings = BTreeMap::new();
        for call in &self.calls {
            match call {
                KeyRowCall::BindCommand(slot, command) => {
                    bindings.insert(*slot, Action::RunCommand(command.clone()));
                }
                KeyRowCall::BindHandler(slot, handler) => {
                    bindings.insert(*slot, Action::Invoke(*handler));
                }
                KeyRowCall::ClearBindings => bindings.clear(),
                _ => {}
            }
        }
        bindings
    }

    pub fn label(&self, slot: u8) -> Option<String> {
        let slot = Slot::new(slot)?;
        self.labels().remove(&slot)
    }

    pub fn action(&self, slot: u8) -> Option<Action> {
        let slot = Slot::new(slot)?;
        self.bindings().remove(&slot)
    }
}

impl KeyRow for RecordingKeyRow {
    fn set_label(&mut self, slot: Slot, text: &str) {
        self.calls.push(KeyRowCall::SetLabel(slot, text.to_owned()));
    }

    fn clear_labels(&mut self) {
        self.calls.push(KeyRowCall::ClearLabels);
    }

    fn bind_command(&mut self, slot: Slot, command: &str) {
        self.calls
            .push(KeyRowCall::BindCommand(slot, command.to_owned()));
    }

    fn bind_handler(&mut self, slot: Slot, handler: Handler) {
        self.calls.push(KeyRowCall::BindHandler(slot, handler));
    }

    fn clear_bindings(&mut self) {
        self.calls.push(KeyRowCall::ClearBindings);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeGit {
    pub location: GitLocation,
    pub branch: Option<String>,
    pub dirty: DirtyState,
    pub divergence: Option<Divergence>,
    pub branches: Vec<String>,
}

impl FakeGit {
    pub fn clean(branch: &str) -> Self {
        Self {
            location: GitLocation::WorkTree,
            branch: Some(branch.to_owned()),
            dirty: DirtyState::default(),
            divergence: Some(Divergence::default()),
            branches: vec![branch.to_owned()],
        }
    }
}

/// In-memory project: a set of files, optional git state and scripted enumeration results.
#[derive(Debug)]
pub struct FakeProject {
    working_dir: PathBuf,
    files: BTreeSet<PathBuf>,
    git: Option<FakeGit>,
    scripts: HashMap<PathBuf, Vec<String>>,
    tasks: HashMap<PathBuf, Vec<String>>,
    composer: HashMap<PathBuf, Vec<String>>,
    failing: BTreeSet<&'static str>,
    pub script_loads: usize,
    pub task_loads: usize,
    pub branch_loads: usize,
    pub status_loads: usize,
}

impl FakeProject {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            files: BTreeSet::new(),
            git: None,
            scripts: HashMap::new(),
            tasks: HashMap::new(),
            composer: HashMap::new(),
            failing: BTreeSet::new(),
            script_loads: 0,
            task_loads: 0,
            branch_loads: 0,
            status_loads: 0,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn with_git(mut self, git: FakeGit) -> Self {
        self.git = Some(git);
        self
    }

    pub fn with_scripts(mut self, manifest: impl Into<PathBuf>, scripts: &[&str]) -> Self {
        let manifest = manifest.into();
        self.files.insert(manifest.clone());
        self.scripts.insert(manifest, owned(scripts));
        self
    }

    pub fn with_tasks(mut self, rakefile: impl Into<PathBuf>, tasks: &[&str]) -> Self {
        let rakefile = rakefile.into();
        self.files.insert(rakefile.clone());
        self.tasks.insert(rakefile, owned(tasks));
        self
    }

    pub fn with_composer(mut self, manifest: impl Into<PathBuf>, packages: &[&str]) -> Self {
        let manifest = manifest.into();
        self.files.insert(manifest.clone());
        self.composer.insert(manifest, owned(packages));
        self
    }

    /// Makes the named query fail, e.g. `"dirty_state"` or `"package_scripts"`.
    pub fn failing(mut self, query: &'static str) -> Self {
        self.failing.insert(query);
        self
    }

    pub fn cd(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = dir.into();
    }

    pub fn git_mut(&mut self) -> Option<&mut FakeGit> {
        self.git.as_mut()
    }

    fn check(&self, query: &'static str) -> Result<()> {
        if self.failing.contains(query) {
            return Err(anyhow!("{query} failed"));
        }
        Ok(())
    }

    fn git(&self, query: &'static str) -> Result<&FakeGit> {
        self.check(query)?;
        self.git
            .as_ref()
            .ok_or_else(|| anyhow!("not a git repository"))
    }
}

impl ProjectRuntime for FakeProject {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn has_marker(&mut self, name: &str) -> bool {
        self.files.contains(&self.working_dir.join(name))
    }

    fn find_up(&mut self, name: &str) -> Option<PathBuf> {
        self.working_dir
            .ancestors()
            .map(|dir| dir.join(name))
            .find(|candidate| self.files.contains(candidate))
    }

    fn git_location(&mut self) -> Result<GitLocation> {
        self.check("git_location")?;
        Ok(self
            .git
            .as_ref()
            .map_or(GitLocation::NotARepository, |git| git.location))
    }

    fn current_branch(&mut self) -> Result<Option<String>> {
        Ok(self.git("current_branch")?.branch.clone())
    }

    fn dirty_state(&mut self) -> Result<DirtyState> {
        self.status_loads += 1;
        Ok(self.git("dirty_state")?.dirty)
    }

    fn divergence(&mut self) -> Result<Option<Divergence>> {
        Ok(self.git("divergence")?.divergence)
    }

    fn branches(&mut self) -> Result<Vec<String>> {
        self.branch_loads += 1;
        Ok(self.git("branches")?.branches.clone())
    }

    fn package_scripts(&mut self, manifest: &Path) -> Result<Vec<String>> {
        self.script_loads += 1;
        self.check("package_scripts")?;
        self.scripts
            .get(manifest)
            .cloned()
            .ok_or_else(|| anyhow!("no scripts recorded for {}", manifest.display()))
    }

    fn rake_tasks(&mut self, rakefile: &Path) -> Result<Vec<String>> {
        self.task_loads += 1;
        self.check("rake_tasks")?;
        self.tasks
            .get(rakefile)
            .cloned()
            .ok_or_else(|| anyhow!("no tasks recorded for {}", rakefile.display()))
    }

    fn composer_packages(&mut self, manifest: &Path) -> Result<Vec<String>> {
        self.check("composer_packages")?;
        Ok(self.composer.get(manifest).cloned().unwrap_or_default())
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

/// A real project directory on disk for filesystem-backed tests.
pub struct ProjectFixture {
    dir: tempfile::TempDir,
}

impl ProjectFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create project fixture directory")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create fixture directory {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("write fixture {}", path.display()))?;
        Ok(path)
    }

    pub fn mkdir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path)
            .with_context(|| format!("create fixture directory {}", path.display()))?;
        Ok(path)
    }

    pub fn package_json(&self, relative_dir: &str, scripts: &[&str]) -> Result<PathBuf> {
        let scripts: serde_json::Map<String, serde_json::Value> = scripts
            .iter()
            .map(|name| ((*name).to_owned(), serde_json::Value::from(format!("echo {name}"))))
            .collect();
        let manifest = serde_json::json!({
            "name": "fixture",
            "version": "1.0.0",
            "scripts": scripts,
        });
        self.write(
            &join_relative(relative_dir, "package.json"),
            &serde_json::to_string_pretty(&manifest)?,
        )
    }

    pub fn composer_json(&self, require: &[&str], require_dev: &[&str]) -> Result<PathBuf> {
        let constraint = |names: &[&str]| -> serde_json::Map<String, serde_json::Value> {
            names
                .iter()
                .map(|name| ((*name).to_owned(), serde_json::Value::from("*")))
                .collect()
        };
        let manifest = serde_json::json!({
            "name": "fixture/app",
            "require": constraint(require),
            "require-dev": constraint(require_dev),
        });
        self.write("composer.json", &serde_json::to_string_pretty(&manifest)?)
    }
}

fn join_relative(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir == "." {
        file.to_owned()
    } else {
        format!("{}/{file}", dir.trim_end_matches('/'))
    }
}
