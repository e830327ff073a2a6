// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::{
    GitLocation, Handler, KeyBinding, PackageManager, ProjectRuntime, Slot, SubmenuKind,
    ToolbarSettings, WidgetKind, shell_word, status_indicator,
};

pub const PACKAGE_MANIFEST: &str = "package.json";
pub const YARN_LOCK: &str = "yarn.lock";
pub const NPM_LOCK: &str = "package-lock.json";
pub const COMPOSER_MANIFEST: &str = "composer.json";
pub const COMPOSER_LOCK: &str = "composer.lock";
pub const LARAVEL_PACKAGE: &str = "laravel/framework";
pub const RAKEFILES: [&str; 3] = ["Rakefile", "rakefile", "Rakefile.rb"];
pub const COMPOSE_FILES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];
pub const PHPUNIT_CONFIGS: [&str; 2] = ["phpunit.xml", "phpunit.xml.dist"];

/// A unit of default-mode rendering that decides for itself whether it gets a key.
pub trait Probe {
    fn name(&self) -> &str;

    /// Marker checks only; an `Ok(false)` leaves the slot for the next probe.
    fn applicable(&self, project: &mut dyn ProjectRuntime) -> Result<bool>;

    /// `Ok(None)` when the probe turns out to have nothing to show.
    fn render(
        &self,
        project: &mut dyn ProjectRuntime,
        settings: &ToolbarSettings,
    ) -> Result<Option<KeyBinding>>;
}

/// Ordered probes for the default layout.
pub struct ProbeRegistry {
    probes: Vec<Box<dyn Probe>>,
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::from_kinds(&WidgetKind::ALL)
    }
}

impl ProbeRegistry {
    pub fn empty() -> Self {
        Self { probes: Vec::new() }
    }

    pub fn from_kinds(kinds: &[WidgetKind]) -> Self {
        Self {
            probes: kinds.iter().map(|kind| builtin(*kind)).collect(),
        }
    }

    /// Resolves configured widget names, failing on the first unknown or repeated one.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let Some(kind) = WidgetKind::parse(name) else {
                bail!(
                    "unknown widget {name:?}; supported widgets: {}",
                    supported_widget_names().join(", ")
                );
            };
            if !seen.insert(kind) {
                bail!("widget {name:?} is listed more than once");
            }
            kinds.push(kind);
        }
        Ok(Self::from_kinds(&kinds))
    }

    pub fn push(&mut self, probe: Box<dyn Probe>) {
        self.probes.push(probe);
    }

    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    /// Gives each applicable probe the next free slot, starting at `start`.
    ///
    /// Probes that are not applicable or fail keep the slot free. Once the row is
    /// full the remaining probes are skipped.
    pub fn render_pass(
        &self,
        start: Slot,
        key_count: u8,
        project: &mut dyn ProjectRuntime,
        settings: &ToolbarSettings,
    ) -> Vec<(Slot, KeyBinding)> {
        let mut layout = Vec::new();
        let mut next = Some(start);

        for probe in &self.probes {
            let Some(slot) = next.filter(|slot| slot.get() <= key_count) else {
                tracing::debug!(widget = probe.name(), "key row full; skipping widget");
                continue;
            };

            match probe.applicable(project) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    tracing::warn!(widget = probe.name(), error = %error, "widget check failed");
                    continue;
                }
            }

            match probe.render(project, settings) {
                Ok(Some(binding)) => {
                    layout.push((slot, binding));
                    next = slot.next();
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(widget = probe.name(), error = %error, "widget render failed");
                }
            }
        }

        layout
    }
}

pub fn supported_widget_names() -> Vec<&'static str> {
    WidgetKind::ALL.iter().map(|kind| kind.as_str()).collect()
}

fn builtin(kind: WidgetKind) -> Box<dyn Probe> {
    Box::new(Builtin(kind))
}

struct Builtin(WidgetKind);

impl Probe for Builtin {
    fn name(&self) -> &str {
        self.0.as_str()
    }

    fn applicable(&self, project: &mut dyn ProjectRuntime) -> Result<bool> {
        let applicable = match self.0 {
            WidgetKind::CurrentDir => true,
            WidgetKind::GitBranch
            | WidgetKind::GitStatus
            | WidgetKind::GitPull
            | WidgetKind::GitPush => project.git_location()? == GitLocation::WorkTree,
            WidgetKind::PackageScripts => project.find_up(PACKAGE_MANIFEST).is_some(),
            WidgetKind::Framework => uses_laravel(project)?,
            WidgetKind::RakeTasks => project.has_any_marker(&RAKEFILES),
            WidgetKind::Compose => project.has_any_marker(&COMPOSE_FILES),
            WidgetKind::DependencyInstall => project.has_marker(COMPOSER_MANIFEST),
            WidgetKind::TestRunner => project.has_any_marker(&PHPUNIT_CONFIGS),
        };
        Ok(applicable)
    }

    fn render(
        &self,
        project: &mut dyn ProjectRuntime,
        settings: &ToolbarSettings,
    ) -> Result<Option<KeyBinding>> {
        let binding = match self.0 {
            WidgetKind::CurrentDir => KeyBinding::command(
                format!("👉 {}", short_dir(project.working_dir())),
                &settings.current_dir_command,
            ),
            WidgetKind::GitBranch => {
                let branch = project.current_branch()?;
                let name = branch.as_deref().unwrap_or("detached");
                KeyBinding::handler(
                    format!("🎋 {name}"),
                    Handler::Open(SubmenuKind::Branches),
                )
            }
            WidgetKind::GitStatus => {
                let dirty = project.dirty_state()?;
                let divergence = project.divergence().unwrap_or_else(|error| {
                    tracing::warn!(error = %error, "upstream comparison failed");
                    None
                });
                KeyBinding::command(
                    status_indicator(dirty, divergence, &settings.glyphs),
                    "git status",
                )
            }
            WidgetKind::GitPull => {
                let Some(branch) = project.current_branch()? else {
                    return Ok(None);
                };
                KeyBinding::command(
                    "🔽 pull",
                    format!("git pull origin {}", shell_word(&branch)),
                )
            }
            WidgetKind::GitPush => {
                let Some(branch) = project.current_branch()? else {
                    return Ok(None);
                };
                KeyBinding::command(
                    "🔼 push",
                    format!("git push origin {}", shell_word(&branch)),
                )
            }
            WidgetKind::PackageScripts => {
                let Some((_, manager)) = package_manager(project, settings) else {
                    return Ok(None);
                };
                KeyBinding::handler(
                    format!("⚡️ {}-run", manager.as_str()),
                    Handler::Open(SubmenuKind::Scripts),
                )
            }
            WidgetKind::Framework => {
                KeyBinding::handler("🎨 artisan", Handler::Open(SubmenuKind::Framework))
            }
            WidgetKind::RakeTasks => {
                KeyBinding::handler("📋 rake", Handler::Open(SubmenuKind::Tasks))
            }
            WidgetKind::Compose => {
                KeyBinding::handler("🐳 compose", Handler::Open(SubmenuKind::Compose))
            }
            WidgetKind::DependencyInstall => {
                let command = if project.has_marker(COMPOSER_LOCK) {
                    "composer install"
                } else {
                    "composer update"
                };
                KeyBinding::command("📦 install", command)
            }
            WidgetKind::TestRunner => KeyBinding::command("🧪 phpunit", "vendor/bin/phpunit"),
        };
        Ok(Some(binding))
    }
}

/// Resolves the governing `package.json` and which tool runs its scripts.
pub fn package_manager(
    project: &mut dyn ProjectRuntime,
    settings: &ToolbarSettings,
) -> Option<(PathBuf, PackageManager)> {
    let manifest = project.find_up(PACKAGE_MANIFEST)?;
    let root = manifest.parent().map(Path::to_path_buf);
    let mut beside_manifest = |name: &str| {
        project
            .find_up(name)
            .is_some_and(|lock| lock.parent().map(Path::to_path_buf) == root)
    };
    let has_yarn_lock = beside_manifest(YARN_LOCK);
    let has_npm_lock = beside_manifest(NPM_LOCK);
    let manager = PackageManager::resolve(settings.prefer_yarn, has_yarn_lock, has_npm_lock);
    Some((manifest, manager))
}

fn uses_laravel(project: &mut dyn ProjectRuntime) -> Result<bool> {
    if !project.has_marker(COMPOSER_MANIFEST) {
        return Ok(false);
    }
    let manifest = project.working_dir().join(COMPOSER_MANIFEST);
    let packages = project.composer_packages(&manifest)?;
    Ok(packages.iter().any(|name| name == LARAVEL_PACKAGE))
}

/// The last two components of `path`, the way the key label shows it.
pub fn short_dir(path: &Path) -> String {
    let names: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match names.as_slice() {
        [] => "/".to_owned(),
        [only] => format!("/{only}"),
        [.., parent, name] => format!("{parent}/{name}"),
    }
}
