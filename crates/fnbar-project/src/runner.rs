// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Runs external tools. Tests swap in a scripted runner.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString], dir: &Path) -> io::Result<Output>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString], dir: &Path) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
    }
}

pub(crate) fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

/// Runs `program` and returns its stdout, or an error naming the command when it fails.
pub(crate) fn run_checked<R: CommandRunner>(
    runner: &R,
    program: &str,
    args: &[&str],
    dir: &Path,
) -> Result<String> {
    let output = runner
        .run(program, &os_args(args), dir)
        .map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => anyhow!("`{program}` was not found on PATH"),
            _ => anyhow!("failed to execute `{program}`: {error}"),
        })?;
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    Err(command_failed(program, args, &output))
}

fn command_failed(program: &str, args: &[&str], output: &Output) -> anyhow::Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    let detail = if stderr.is_empty() {
        format!("exit status {}", output.status)
    } else {
        stderr
    };
    anyhow!("command failed (`{program} {}`): {detail}", args.join(" "))
}
