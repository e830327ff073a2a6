// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fnbar_app::{Glyphs as GlyphSet, KEY_COUNT, ProbeRegistry, ToolbarSettings, WidgetKind};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "fnbar";
const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "FNBAR_CONFIG_PATH";
const DEFAULT_CURRENT_DIR_COMMAND: &str = "ls -la";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub toolbar: Toolbar,
    #[serde(default)]
    pub glyphs: Glyphs,
    #[serde(default)]
    pub packages: Packages,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            toolbar: Toolbar::default(),
            glyphs: Glyphs::default(),
            packages: Packages::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Toolbar {
    pub widgets: Option<Vec<String>>,
    pub key_count: Option<i64>,
    pub current_dir_command: Option<String>,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self {
            widgets: Some(default_widgets()),
            key_count: Some(i64::from(KEY_COUNT)),
            current_dir_command: Some(DEFAULT_CURRENT_DIR_COMMAND.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Glyphs {
    pub uncommitted: Option<String>,
    pub unstaged: Option<String>,
    pub untracked: Option<String>,
    pub stashed: Option<String>,
    pub ahead: Option<String>,
    pub behind: Option<String>,
    pub clean: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Packages {
    pub prefer_yarn: Option<bool>,
}

impl Default for Packages {
    fn default() -> Self {
        Self {
            prefer_yarn: Some(false),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put settings under [toolbar], [glyphs], and [packages]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        self.registry()
            .with_context(|| format!("invalid toolbar.widgets in {}", path.display()))?;

        if let Some(key_count) = self.toolbar.key_count
            && !(2..=i64::from(KEY_COUNT)).contains(&key_count)
        {
            bail!(
                "toolbar.key_count in {} must be between 2 and {KEY_COUNT}, got {key_count}",
                path.display()
            );
        }

        if let Some(command) = &self.toolbar.current_dir_command
            && command.trim().is_empty()
        {
            bail!(
                "toolbar.current_dir_command in {} must not be empty",
                path.display()
            );
        }

        for (name, glyph) in self.glyphs.entries() {
            if let Some(glyph) = glyph
                && glyph.is_empty()
            {
                bail!("glyphs.{name} in {} must not be empty", path.display());
            }
        }

        Ok(())
    }

    pub fn widget_names(&self) -> Vec<String> {
        self.toolbar.widgets.clone().unwrap_or_else(default_widgets)
    }

    pub fn registry(&self) -> Result<ProbeRegistry> {
        ProbeRegistry::from_names(&self.widget_names())
    }

    pub fn key_count(&self) -> u8 {
        self.toolbar
            .key_count
            .and_then(|count| u8::try_from(count).ok())
            .unwrap_or(KEY_COUNT)
            .clamp(2, KEY_COUNT)
    }

    pub fn current_dir_command(&self) -> &str {
        self.toolbar
            .current_dir_command
            .as_deref()
            .unwrap_or(DEFAULT_CURRENT_DIR_COMMAND)
    }

    pub fn prefer_yarn(&self) -> bool {
        self.packages.prefer_yarn.unwrap_or(false)
    }

    pub fn glyphs(&self) -> GlyphSet {
        let defaults = GlyphSet::default();
        let pick = |value: &Option<String>, fallback: String| value.clone().unwrap_or(fallback);
        GlyphSet {
            uncommitted: pick(&self.glyphs.uncommitted, defaults.uncommitted),
            unstaged: pick(&self.glyphs.unstaged, defaults.unstaged),
            untracked: pick(&self.glyphs.untracked, defaults.untracked),
            stashed: pick(&self.glyphs.stashed, defaults.stashed),
            ahead: pick(&self.glyphs.ahead, defaults.ahead),
            behind: pick(&self.glyphs.behind, defaults.behind),
            clean: pick(&self.glyphs.clean, defaults.clean),
        }
    }

    pub fn settings(&self) -> ToolbarSettings {
        ToolbarSettings {
            key_count: self.key_count(),
            glyphs: self.glyphs(),
            current_dir_command: self.current_dir_command().to_owned(),
            prefer_yarn: self.prefer_yarn(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        let widgets = default_widgets()
            .iter()
            .map(|name| format!("  \"{name}\","))
            .collect::<Vec<_>>()
            .join("\n");
        let glyphs = GlyphSet::default();
        format!(
            "# fnbar config\n# Place this file at: {}\n\nversion = 1\n\n[toolbar]\n# Widgets render left to right; ones that do not apply to the current directory are skipped.\nwidgets = [\n{widgets}\n]\nkey_count = {KEY_COUNT}\ncurrent_dir_command = \"{DEFAULT_CURRENT_DIR_COMMAND}\"\n\n[glyphs]\nuncommitted = \"{}\"\nunstaged = \"{}\"\nuntracked = \"{}\"\nstashed = \"{}\"\nahead = \"{}\"\nbehind = \"{}\"\nclean = \"{}\"\n\n[packages]\n# Used when both or neither of yarn.lock and package-lock.json exist.\nprefer_yarn = false\n",
            path.display(),
            glyphs.uncommitted,
            glyphs.unstaged,
            glyphs.untracked,
            glyphs.stashed,
            glyphs.ahead,
            glyphs.behind,
            glyphs.clean,
        )
    }
}

impl Glyphs {
    fn entries(&self) -> [(&'static str, &Option<String>); 7] {
        [
            ("uncommitted", &self.uncommitted),
            ("unstaged", &self.unstaged),
            ("untracked", &self.untracked),
            ("stashed", &self.stashed),
            ("ahead", &self.ahead),
            ("behind", &self.behind),
            ("clean", &self.clean),
        ]
    }
}

fn default_widgets() -> Vec<String> {
    WidgetKind::ALL
        .iter()
        .map(|kind| kind.as_str().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.key_count(), 20);
        assert_eq!(config.current_dir_command(), "ls -la");
        assert!(!config.prefer_yarn());
        assert_eq!(config.widget_names()[0], "current_dir");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[toolbar]\nkey_count = 12\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[toolbar], [glyphs], and [packages]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[toolbar]\nwidgets = [\"git_branch\", \"current_dir\"]\nkey_count = 12\ncurrent_dir_command = \"ls\"\n[glyphs]\nclean = \"ok\"\nahead = \"^\"\n[packages]\nprefer_yarn = true\n",
        )?;
        let config = Config::load(&path)?;
        let settings = config.settings();
        assert_eq!(settings.key_count, 12);
        assert_eq!(settings.current_dir_command, "ls");
        assert!(settings.prefer_yarn);
        assert_eq!(settings.glyphs.clean, "ok");
        assert_eq!(settings.glyphs.ahead, "^");
        assert_eq!(settings.glyphs.behind, "⇣");
        assert_eq!(config.registry()?.names(), vec!["git_branch", "current_dir"]);
        Ok(())
    }

    #[test]
    fn unknown_widget_fails_at_load_time() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[toolbar]\nwidgets = [\"current_dir\", \"weather\"]\n")?;
        let error = Config::load(&path).expect_err("unknown widget should fail");
        let message = format!("{error:#}");
        assert!(message.contains("invalid toolbar.widgets"));
        assert!(message.contains("unknown widget \"weather\""));
        Ok(())
    }

    #[test]
    fn duplicate_widget_fails_at_load_time() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[toolbar]\nwidgets = [\"git_pull\", \"git_pull\"]\n")?;
        let error = Config::load(&path).expect_err("duplicate widget should fail");
        assert!(format!("{error:#}").contains("more than once"));
        Ok(())
    }

    #[test]
    fn key_count_is_range_checked() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[toolbar]\nkey_count = 40\n")?;
        let error = Config::load(&path).expect_err("oversized key row should fail");
        assert!(error.to_string().contains("must be between 2 and 20"));

        let (_temp, path) = write_config("version = 1\n[toolbar]\nkey_count = 1\n")?;
        assert!(Config::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn empty_glyph_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[glyphs]\nstashed = \"\"\n")?;
        let error = Config::load(&path).expect_err("empty glyph should fail");
        assert!(error.to_string().contains("glyphs.stashed"));
        Ok(())
    }

    #[test]
    fn empty_current_dir_command_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[toolbar]\ncurrent_dir_command = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank command should fail");
        assert!(error.to_string().contains("current_dir_command"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("FNBAR_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("FNBAR_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("FNBAR_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("fnbar/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.widget_names().len(), 11);
        assert_eq!(config.glyphs().uncommitted, "+");
        Ok(())
    }
}
