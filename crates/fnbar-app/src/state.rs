// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    Action, GitLocation, Handler, KeyBinding, KeyRow, ListCaches, ListItem, Mode, ProbeRegistry,
    ProjectRuntime, RAKEFILES, ScopedCache, Slot, SubmenuKind, ToolbarSettings, bounded_sorted,
    package_manager, paginate, shell_word,
};

pub const COMPOSE_OPTIONS: [&str; 7] = ["build", "down", "logs", "ps", "restart", "up", "up -d"];
pub const ARTISAN_OPTIONS: [&str; 7] = [
    "cache:clear",
    "migrate",
    "migrate:fresh",
    "route:list",
    "serve",
    "test",
    "tinker",
];
pub const CURRENT_BRANCH_MARK: &str = "✔ ";

/// What pressing a key did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    /// The command was typed into the shell. The toolbar is back in default mode.
    Ran(String),
    Entered(Mode),
    Unbound,
}

/// The toolbar controller: one current mode and the key layout rendered for it.
pub struct Toolbar {
    mode: Mode,
    settings: ToolbarSettings,
    registry: ProbeRegistry,
    scripts: ScopedCache,
    tasks: ScopedCache,
    layout: Vec<(Slot, KeyBinding)>,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new(ToolbarSettings::default(), ProbeRegistry::default())
    }
}

impl Toolbar {
    pub fn new(settings: ToolbarSettings, registry: ProbeRegistry) -> Self {
        Self {
            mode: Mode::Default,
            settings,
            registry,
            scripts: ScopedCache::new(),
            tasks: ScopedCache::new(),
            layout: Vec::new(),
        }
    }

    /// Starts from lists fetched by an earlier toolbar.
    pub fn with_list_caches(mut self, caches: ListCaches) -> Self {
        self.scripts = ScopedCache::seeded(caches.scripts);
        self.tasks = ScopedCache::seeded(caches.tasks);
        self
    }

    pub fn list_caches(&self) -> ListCaches {
        ListCaches {
            scripts: self.scripts.entry().cloned(),
            tasks: self.tasks.entry().cloned(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn settings(&self) -> &ToolbarSettings {
        &self.settings
    }

    /// The layout most recently sent to the key row.
    pub fn layout(&self) -> &[(Slot, KeyBinding)] {
        &self.layout
    }

    pub fn binding(&self, slot: Slot) -> Option<&KeyBinding> {
        self.layout
            .iter()
            .find(|(bound, _)| *bound == slot)
            .map(|(_, binding)| binding)
    }

    /// Clears the key row and renders the current mode from scratch.
    pub fn refresh<P: ProjectRuntime, K: KeyRow>(&mut self, project: &mut P, keys: &mut K) {
        project.begin_render();
        keys.clear_labels();
        keys.clear_bindings();

        let key_count = self.settings.key_count;
        self.layout = match self.mode {
            Mode::Default => {
                self.registry
                    .render_pass(Slot::FIRST, key_count, project, &self.settings)
            }
            Mode::Submenu(kind) => {
                let items = self.submenu_items(kind, project).unwrap_or_else(|error| {
                    tracing::warn!(
                        submenu = kind.as_str(),
                        error = %error,
                        "submenu data unavailable"
                    );
                    Vec::new()
                });
                paginate(&items, Handler::Back, key_count)
            }
        };

        for (slot, binding) in &self.layout {
            keys.set_label(*slot, &binding.label);
            match &binding.action {
                Action::RunCommand(command) => keys.bind_command(*slot, command),
                Action::Invoke(handler) => keys.bind_handler(*slot, *handler),
            }
        }
    }

    /// Switches mode and renders it right away.
    pub fn enter<P: ProjectRuntime, K: KeyRow>(
        &mut self,
        mode: Mode,
        project: &mut P,
        keys: &mut K,
    ) {
        tracing::debug!(from = self.mode.as_str(), to = mode.as_str(), "toolbar mode change");
        self.mode = mode;
        self.refresh(project, keys);
    }

    /// Acts on a key of the current layout.
    ///
    /// Handler keys enter their mode. Command keys leave the toolbar in default mode
    /// without re-rendering; the next prompt refresh shows it.
    pub fn press<P: ProjectRuntime, K: KeyRow>(
        &mut self,
        slot: Slot,
        project: &mut P,
        keys: &mut K,
    ) -> KeyPress {
        let Some(binding) = self.binding(slot) else {
            return KeyPress::Unbound;
        };

        match binding.action.clone() {
            Action::RunCommand(command) => {
                self.mode = Mode::Default;
                KeyPress::Ran(command)
            }
            Action::Invoke(handler) => {
                let target = handler.target();
                self.enter(target, project, keys);
                KeyPress::Entered(target)
            }
        }
    }

    fn submenu_items<P: ProjectRuntime>(
        &mut self,
        kind: SubmenuKind,
        project: &mut P,
    ) -> Result<Vec<ListItem>> {
        let limit = self.settings.list_capacity();
        let items = match kind {
            SubmenuKind::Branches => {
                if project.git_location()? != GitLocation::WorkTree {
                    return Ok(Vec::new());
                }
                let current = project.current_branch().unwrap_or_default();
                bounded_sorted(project.branches()?, limit)
                    .into_iter()
                    .map(|name| {
                        let label = if current.as_deref() == Some(name.as_str()) {
                            format!("{CURRENT_BRANCH_MARK}{name}")
                        } else {
                            name.clone()
                        };
                        let command = format!("git checkout {}", shell_word(&name));
                        ListItem::new(label, command)
                    })
                    .collect()
            }
            SubmenuKind::Scripts => {
                let Some((manifest, manager)) = package_manager(project, &self.settings) else {
                    return Ok(Vec::new());
                };
                let scripts = self
                    .scripts
                    .fetch(&manifest, || project.package_scripts(&manifest))?;
                bounded_sorted(scripts, limit)
                    .into_iter()
                    .map(|script| {
                        let command = manager.run_command(&script);
                        ListItem::new(script, command)
                    })
                    .collect()
            }
            SubmenuKind::Tasks => {
                let Some(rakefile) = project.first_marker(&RAKEFILES) else {
                    return Ok(Vec::new());
                };
                let tasks = self
                    .tasks
                    .fetch(&rakefile, || project.rake_tasks(&rakefile))?;
                bounded_sorted(tasks, limit)
                    .into_iter()
                    .map(|task| {
                        let command = format!("rake {}", shell_word(&task));
                        ListItem::new(task, command)
                    })
                    .collect()
            }
            SubmenuKind::Compose => fixed_items(&COMPOSE_OPTIONS, "docker-compose", limit),
            SubmenuKind::Framework => fixed_items(&ARTISAN_OPTIONS, "php artisan", limit),
        };
        Ok(items)
    }
}

fn fixed_items(options: &[&str], program: &str, limit: usize) -> Vec<ListItem> {
    let names = options.iter().map(|option| (*option).to_owned()).collect();
    bounded_sorted(names, limit)
        .into_iter()
        .map(|option| {
            let command = format!("{program} {option}");
            ListItem::new(option, command)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ARTISAN_OPTIONS, COMPOSE_OPTIONS, fixed_items};

    #[test]
    fn fixed_option_lists_are_already_sorted() {
        let mut compose = COMPOSE_OPTIONS.to_vec();
        compose.sort();
        assert_eq!(compose, COMPOSE_OPTIONS.to_vec());

        let mut artisan = ARTISAN_OPTIONS.to_vec();
        artisan.sort();
        assert_eq!(artisan, ARTISAN_OPTIONS.to_vec());
    }

    #[test]
    fn fixed_items_prefix_the_program() {
        let items = fixed_items(&COMPOSE_OPTIONS, "docker-compose", 2);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "build");
        assert_eq!(items[0].command, "docker-compose build");
        assert_eq!(items[1].command, "docker-compose down");
    }
}
