use crate::config::Config;
use crate::lists::ListStore;
use anyhow::Result;
use fnbar_app::{KeyPress, ListCaches, Mode, ProjectRuntime, Slot, Toolbar};
use fnbar_term::{ZshKeyRow, quote};
use std::path::Path;

/// A toolbar for `config`, seeded with the lists `store` kept from earlier runs.
pub fn build_toolbar(config: &Config, store: Option<&ListStore>) -> Result<Toolbar> {
    let toolbar = Toolbar::new(config.settings(), config.registry()?);
    Ok(match store {
        Some(store) => toolbar.with_list_caches(store.load()),
        None => toolbar,
    })
}

/// Renders `mode` for `project` as a script the shell evaluates.
pub fn render_script<P: ProjectRuntime>(
    toolbar: &mut Toolbar,
    mode: Mode,
    project: &mut P,
    store: Option<&ListStore>,
) -> String {
    tracing::debug!(mode = mode.as_str(), dir = %project.working_dir().display(), "render");
    let before = toolbar.list_caches();
    let mut keys = ZshKeyRow::new(toolbar.settings().key_count);
    toolbar.enter(mode, project, &mut keys);
    keep_lists(toolbar, before, store);
    keys.script()
}

/// Renders `mode`, presses `slot`, and reports what happened in one line.
pub fn describe_press<P: ProjectRuntime>(
    toolbar: &mut Toolbar,
    mode: Mode,
    slot: Slot,
    project: &mut P,
    store: Option<&ListStore>,
) -> String {
    let before = toolbar.list_caches();
    let mut keys = ZshKeyRow::new(toolbar.settings().key_count);
    toolbar.enter(mode, project, &mut keys);
    let pressed = toolbar.press(slot, project, &mut keys);
    tracing::debug!(mode = mode.as_str(), %slot, ?pressed, "press");
    keep_lists(toolbar, before, store);
    match pressed {
        KeyPress::Ran(command) => format!("run: {command}"),
        KeyPress::Entered(mode) => format!("enter: {}", mode.as_str()),
        KeyPress::Unbound => format!("unbound: {slot}"),
    }
}

fn keep_lists(toolbar: &Toolbar, before: ListCaches, store: Option<&ListStore>) {
    let Some(store) = store else {
        return;
    };
    let after = toolbar.list_caches();
    if after == before {
        return;
    }
    if let Err(error) = store.save(&after) {
        tracing::warn!(error = %format!("{error:#}"), "list cache not saved");
    }
}

/// The command the shell glue uses to call back into this binary.
pub fn shell_invocation(exe: &Path, config_path: Option<&Path>) -> String {
    let mut invocation = quote(&exe.to_string_lossy());
    if let Some(path) = config_path {
        invocation.push_str(" --config ");
        invocation.push_str(&quote(&path.to_string_lossy()));
    }
    invocation
}

#[cfg(test)]
mod tests {
    use super::{build_toolbar, describe_press, render_script, shell_invocation};
    use crate::config::Config;
    use crate::lists::ListStore;
    use anyhow::Result;
    use fnbar_app::{KEY_COUNT, Mode, Slot, SubmenuKind};
    use fnbar_testkit::{FakeGit, FakeProject};
    use std::path::Path;
    use time::macros::datetime;

    fn slot(value: u8) -> Slot {
        Slot::new(value).expect("valid slot")
    }

    #[test]
    fn default_render_resets_labels_and_bindings_first() -> Result<()> {
        let mut toolbar = build_toolbar(&Config::default(), None)?;
        let mut project = FakeProject::new("/home/dev/scratch");

        let script = render_script(&mut toolbar, Mode::Default, &mut project, None);
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[0], "print -n $'\\x1b]1337;PopKeyLabels\\x07'");
        assert_eq!(
            lines.iter().filter(|line| line.starts_with("bindkey -r ")).count(),
            usize::from(KEY_COUNT)
        );
        assert!(script.contains("SetKeyLabel=F1=👉 dev/scratch"));
        assert!(script.contains("bindkey -s $'^[OP' $'ls -la\\\\n'"));
        Ok(())
    }

    #[test]
    fn configured_key_count_limits_cleared_keys() -> Result<()> {
        let mut config = Config::default();
        config.toolbar.key_count = Some(4);
        let mut toolbar = build_toolbar(&config, None)?;
        let mut project = FakeProject::new("/tmp/x");

        let script = render_script(&mut toolbar, Mode::Default, &mut project, None);
        assert_eq!(
            script.lines().filter(|line| line.starts_with("bindkey -r ")).count(),
            4
        );
        Ok(())
    }

    #[test]
    fn submenu_render_binds_back_widget() -> Result<()> {
        let mut toolbar = build_toolbar(&Config::default(), None)?;
        let mut project = FakeProject::new("/repo").with_git(FakeGit::clean("main"));

        let mode = Mode::Submenu(SubmenuKind::Branches);
        let script = render_script(&mut toolbar, mode, &mut project, None);
        assert!(script.contains("bindkey $'^[OP' _fnbar_back"));
        assert!(script.contains("SetKeyLabel=F2=✔ main"));
        assert!(script.contains("bindkey -s $'^[OQ' $'git checkout main\\\\n'"));
        Ok(())
    }

    #[test]
    fn press_reports_command_submenu_and_unbound_keys() -> Result<()> {
        let mut toolbar = build_toolbar(&Config::default(), None)?;
        let mut project = FakeProject::new("/repo").with_git(FakeGit::clean("main"));

        assert_eq!(
            describe_press(&mut toolbar, Mode::Default, slot(1), &mut project, None),
            "run: ls -la"
        );
        assert_eq!(
            describe_press(&mut toolbar, Mode::Default, slot(2), &mut project, None),
            "enter: branches"
        );
        assert_eq!(
            describe_press(&mut toolbar, Mode::Default, slot(20), &mut project, None),
            "unbound: F20"
        );
        Ok(())
    }

    #[test]
    fn script_list_is_read_once_across_runs() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let store_path = temp.path().join("lists.json");
        let stamp = |_: &Path| Some(datetime!(2026-03-01 12:00 UTC));
        let mut project =
            FakeProject::new("/code/web").with_scripts("/code/web/package.json", &["build"]);
        let mode = Mode::Submenu(SubmenuKind::Scripts);

        for _ in 0..2 {
            let store = ListStore::with_stamp(store_path.clone(), stamp);
            let mut toolbar = build_toolbar(&Config::default(), Some(&store))?;
            let script = render_script(&mut toolbar, mode, &mut project, Some(&store));
            assert!(script.contains("bindkey -s $'^[OQ' $'npm run build\\\\n'"));
        }

        assert_eq!(project.script_loads, 1);
        Ok(())
    }

    #[test]
    fn moving_to_another_manifest_reloads() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let store_path = temp.path().join("lists.json");
        let stamp = |_: &Path| Some(datetime!(2026-03-01 12:00 UTC));
        let mut project = FakeProject::new("/code/web")
            .with_scripts("/code/web/package.json", &["build"])
            .with_scripts("/code/api/package.json", &["serve"]);
        let mode = Mode::Submenu(SubmenuKind::Scripts);

        for dir in ["/code/web", "/code/api", "/code/api"] {
            project.cd(dir);
            let store = ListStore::with_stamp(store_path.clone(), stamp);
            let mut toolbar = build_toolbar(&Config::default(), Some(&store))?;
            render_script(&mut toolbar, mode, &mut project, Some(&store));
        }

        assert_eq!(project.script_loads, 2);
        Ok(())
    }

    #[test]
    fn shell_invocation_quotes_binary_and_config() {
        assert_eq!(
            shell_invocation(Path::new("/usr/local/bin/fnbar"), None),
            "$'/usr/local/bin/fnbar'"
        );
        assert_eq!(
            shell_invocation(
                Path::new("/opt/fn bar/fnbar"),
                Some(Path::new("/home/me/it's.toml"))
            ),
            "$'/opt/fn bar/fnbar' --config $'/home/me/it\\'s.toml'"
        );
    }
}
