// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod lists;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use lists::ListStore;
use fnbar_app::{Mode, Slot, supported_widget_names};
use fnbar_project::FsProject;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    // Logging is best effort; a read-only cache dir must not break the prompt.
    let _ = logging::init();

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `fnbar --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    if options.check_only {
        config.registry()?;
        return Ok(());
    }

    match options.command {
        None => {
            print_help();
            Ok(())
        }
        Some(CliCommand::Widgets) => {
            let enabled = config.widget_names();
            for name in supported_widget_names() {
                let marker = if enabled.iter().any(|n| n == name) { "*" } else { " " };
                println!("{marker} {name}");
            }
            Ok(())
        }
        Some(CliCommand::Init) => {
            let exe = env::current_exe().context("resolve path of the fnbar binary")?;
            let config_path = options.custom_config.then_some(options.config_path.as_path());
            print!(
                "{}",
                fnbar_term::init_script(&runtime::shell_invocation(&exe, config_path))
            );
            Ok(())
        }
        Some(CliCommand::Render) => {
            let mut project = open_project(options.dir)?;
            let store = open_list_store();
            let mut toolbar = runtime::build_toolbar(&config, store.as_ref())?;
            print!(
                "{}",
                runtime::render_script(&mut toolbar, options.mode, &mut project, store.as_ref())
            );
            Ok(())
        }
        Some(CliCommand::Press(slot)) => {
            let mut project = open_project(options.dir)?;
            let store = open_list_store();
            let mut toolbar = runtime::build_toolbar(&config, store.as_ref())?;
            println!(
                "{}",
                runtime::describe_press(
                    &mut toolbar,
                    options.mode,
                    slot,
                    &mut project,
                    store.as_ref()
                )
            );
            Ok(())
        }
    }
}

/// `None` when there is no cache directory; lists are then read on every run.
fn open_list_store() -> Option<ListStore> {
    match ListStore::default_path() {
        Ok(path) => Some(ListStore::open(path)),
        Err(error) => {
            tracing::warn!(error = %error, "list cache disabled");
            None
        }
    }
}

fn open_project(dir: Option<PathBuf>) -> Result<FsProject> {
    let dir = match dir {
        Some(dir) => dir,
        None => env::current_dir().context("resolve current directory")?,
    };
    FsProject::open(&dir)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliCommand {
    Init,
    Render,
    Press(Slot),
    Widgets,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    custom_config: bool,
    command: Option<CliCommand>,
    mode: Mode,
    dir: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        custom_config: false,
        command: None,
        mode: Mode::Default,
        dir: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
                options.custom_config = true;
            }
            "--mode" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--mode requires a mode name"))?;
                options.mode = Mode::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown mode {:?}; expected default, branches, scripts, tasks, compose, or framework",
                        value.as_ref()
                    )
                })?;
            }
            "--dir" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--dir requires a directory"))?;
                options.dir = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            "init" | "render" | "widgets" | "press" if options.command.is_some() => {
                return Err(anyhow!(
                    "only one command may be given; got {:?} after another command",
                    arg.as_ref()
                ));
            }
            "init" => options.command = Some(CliCommand::Init),
            "render" => options.command = Some(CliCommand::Render),
            "widgets" => options.command = Some(CliCommand::Widgets),
            "press" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("press requires a key number between 1 and 20"))?;
                let slot = value
                    .as_ref()
                    .parse::<u8>()
                    .ok()
                    .and_then(Slot::new)
                    .ok_or_else(|| {
                        anyhow!(
                            "invalid key {:?}; expected a number between 1 and 20",
                            value.as_ref()
                        )
                    })?;
                options.command = Some(CliCommand::Press(slot));
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("fnbar: context-sensitive function key toolbar for zsh");
    println!("usage: fnbar [options] <command>");
    println!();
    println!("commands:");
    println!("  init                     Print zsh glue; add `eval \"$(fnbar init)\"` to .zshrc");
    println!("  render                   Print the script that draws the toolbar");
    println!("  press <key>              Show what pressing F<key> does");
    println!("  widgets                  List widgets (* marks enabled ones)");
    println!();
    println!("options:");
    println!("  --config <path>          Use a specific config path");
    println!("  --mode <mode>            Toolbar mode for render/press (default: default)");
    println!("  --dir <path>             Directory to inspect (default: current directory)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
}
