// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;

use crate::slot::KEY_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmenuKind {
    Branches,
    Scripts,
    Tasks,
    Compose,
    Framework,
}

impl SubmenuKind {
    pub const ALL: [Self; 5] = [
        Self::Branches,
        Self::Scripts,
        Self::Tasks,
        Self::Compose,
        Self::Framework,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::Scripts => "scripts",
            Self::Tasks => "tasks",
            Self::Compose => "compose",
            Self::Framework => "framework",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "branches" => Some(Self::Branches),
            "scripts" => Some(Self::Scripts),
            "tasks" => Some(Self::Tasks),
            "compose" => Some(Self::Compose),
            "framework" => Some(Self::Framework),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Default,
    Submenu(SubmenuKind),
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Submenu(kind) => kind.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value == "default" {
            return Some(Self::Default);
        }
        SubmenuKind::parse(value).map(Self::Submenu)
    }
}

/// A key that switches the toolbar instead of typing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    Back,
    Open(SubmenuKind),
}

impl Handler {
    pub const ALL: [Self; 6] = [
        Self::Back,
        Self::Open(SubmenuKind::Branches),
        Self::Open(SubmenuKind::Scripts),
        Self::Open(SubmenuKind::Tasks),
        Self::Open(SubmenuKind::Compose),
        Self::Open(SubmenuKind::Framework),
    ];

    pub const fn target(self) -> Mode {
        match self {
            Self::Back => Mode::Default,
            Self::Open(kind) => Mode::Submenu(kind),
        }
    }

    /// Stable identifier the shell glue uses to name the widget for this handler.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Open(kind) => kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    RunCommand(String),
    Invoke(Handler),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub label: String,
    pub action: Action,
}

impl KeyBinding {
    pub fn command(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: Action::RunCommand(command.into()),
        }
    }

    pub fn handler(label: impl Into<String>, handler: Handler) -> Self {
        Self {
            label: label.into(),
            action: Action::Invoke(handler),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    CurrentDir,
    GitBranch,
    GitStatus,
    GitPull,
    GitPush,
    PackageScripts,
    Framework,
    RakeTasks,
    Compose,
    DependencyInstall,
    TestRunner,
}

impl WidgetKind {
    pub const ALL: [Self; 11] = [
        Self::CurrentDir,
        Self::GitBranch,
        Self::GitStatus,
        Self::GitPull,
        Self::GitPush,
        Self::PackageScripts,
        Self::Framework,
        Self::RakeTasks,
        Self::Compose,
        Self::DependencyInstall,
        Self::TestRunner,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentDir => "current_dir",
            Self::GitBranch => "git_branch",
            Self::GitStatus => "git_status",
            Self::GitPull => "git_pull",
            Self::GitPush => "git_push",
            Self::PackageScripts => "package_scripts",
            Self::Framework => "framework",
            Self::RakeTasks => "rake_tasks",
            Self::Compose => "compose",
            Self::DependencyInstall => "dependency_install",
            Self::TestRunner => "test_runner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub const fn is_git(self) -> bool {
        matches!(
            self,
            Self::GitBranch | Self::GitStatus | Self::GitPull | Self::GitPush
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub uncommitted: String,
    pub unstaged: String,
    pub untracked: String,
    pub stashed: String,
    pub ahead: String,
    pub behind: String,
    pub clean: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            uncommitted: "+".to_owned(),
            unstaged: "!".to_owned(),
            untracked: "?".to_owned(),
            stashed: "$".to_owned(),
            ahead: "⇡".to_owned(),
            behind: "⇣".to_owned(),
            clean: "✔".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyState {
    pub uncommitted: bool,
    pub unstaged: bool,
    pub untracked: bool,
    pub stashed: bool,
}

impl DirtyState {
    pub const fn is_clean(self) -> bool {
        !(self.uncommitted || self.unstaged || self.untracked || self.stashed)
    }
}

/// Commits ahead of and behind the upstream branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Divergence {
    pub ahead: u32,
    pub behind: u32,
}

/// Builds the git status label. Order is fixed and each glyph appears at most once.
pub fn status_indicator(
    dirty: DirtyState,
    divergence: Option<Divergence>,
    glyphs: &Glyphs,
) -> String {
    let divergence = divergence.unwrap_or_default();
    let parts = [
        (dirty.uncommitted, &glyphs.uncommitted),
        (dirty.unstaged, &glyphs.unstaged),
        (dirty.untracked, &glyphs.untracked),
        (dirty.stashed, &glyphs.stashed),
        (divergence.ahead > 0, &glyphs.ahead),
        (divergence.behind > 0, &glyphs.behind),
    ];

    let indicator: String = parts
        .into_iter()
        .filter(|(set, _)| *set)
        .map(|(_, glyph)| glyph.as_str())
        .collect();
    if indicator.is_empty() {
        glyphs.clean.clone()
    } else {
        indicator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitLocation {
    NotARepository,
    InsideGitDir,
    WorkTree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    pub fn resolve(prefer_yarn: bool, has_yarn_lock: bool, has_npm_lock: bool) -> Self {
        match (has_yarn_lock, has_npm_lock) {
            (true, false) => Self::Yarn,
            (false, true) => Self::Npm,
            _ if prefer_yarn => Self::Yarn,
            _ => Self::Npm,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
        }
    }

    pub fn run_command(self, script: &str) -> String {
        format!("{} run {}", self.as_str(), shell_word(script))
    }
}

/// `raw` as a single shell word: unchanged when it is plain, single-quoted otherwise.
pub fn shell_word(raw: &str) -> Cow<'_, str> {
    let plain = !raw.is_empty()
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./:@%+,".contains(ch));
    if plain {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(format!("'{}'", raw.replace('\'', "'\\''")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarSettings {
    pub key_count: u8,
    pub glyphs: Glyphs,
    pub current_dir_command: String,
    pub prefer_yarn: bool,
}

impl Default for ToolbarSettings {
    fn default() -> Self {
        Self {
            key_count: KEY_COUNT,
            glyphs: Glyphs::default(),
            current_dir_command: "ls -la".to_owned(),
            prefer_yarn: false,
        }
    }
}

impl ToolbarSettings {
    /// Keys left for list items once the back key is placed.
    pub fn list_capacity(&self) -> usize {
        usize::from(self.key_count.clamp(1, KEY_COUNT)) - 1
    }
}
