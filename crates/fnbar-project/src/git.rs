// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fnbar_app::{DirtyState, Divergence, GitLocation};
use std::path::Path;

use crate::runner::{CommandRunner, os_args, run_checked};

const GIT: &str = "git";

pub fn location<R: CommandRunner>(runner: &R, dir: &Path) -> Result<GitLocation> {
    let output = runner
        .run(GIT, &os_args(&["rev-parse", "--is-inside-work-tree"]), dir)
        .context("run git rev-parse")?;
    if !output.status.success() {
        return Ok(GitLocation::NotARepository);
    }
    parse_location(&String::from_utf8_lossy(&output.stdout))
}

/// `None` on a detached HEAD.
pub fn current_branch<R: CommandRunner>(runner: &R, dir: &Path) -> Result<Option<String>> {
    let output = runner
        .run(GIT, &os_args(&["symbolic-ref", "--short", "-q", "HEAD"]), dir)
        .context("run git symbolic-ref")?;
    if !output.status.success() {
        return Ok(None);
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    Ok(Some(branch).filter(|name| !name.is_empty()))
}

pub fn dirty_state<R: CommandRunner>(runner: &R, dir: &Path) -> Result<DirtyState> {
    let porcelain = run_checked(runner, GIT, &["status", "--porcelain"], dir)?;
    let mut state = parse_porcelain(&porcelain);
    state.stashed = runner
        .run(
            GIT,
            &os_args(&["rev-parse", "--verify", "--quiet", "refs/stash"]),
            dir,
        )
        .context("run git rev-parse refs/stash")?
        .status
        .success();
    Ok(state)
}

/// `None` when the current branch has no upstream configured.
pub fn divergence<R: CommandRunner>(runner: &R, dir: &Path) -> Result<Option<Divergence>> {
    let output = runner
        .run(
            GIT,
            &os_args(&["rev-list", "--left-right", "--count", "HEAD...@{upstream}"]),
            dir,
        )
        .context("run git rev-list")?;
    if !output.status.success() {
        return Ok(None);
    }
    parse_divergence(&String::from_utf8_lossy(&output.stdout)).map(Some)
}

pub fn branches<R: CommandRunner>(runner: &R, dir: &Path) -> Result<Vec<String>> {
    let listing = run_checked(
        runner,
        GIT,
        &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
        dir,
    )?;
    Ok(listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

pub fn parse_location(raw: &str) -> Result<GitLocation> {
    match raw.trim() {
        "true" => Ok(GitLocation::WorkTree),
        "false" => Ok(GitLocation::InsideGitDir),
        other => Err(anyhow!("unexpected git rev-parse output {other:?}")),
    }
}

/// Reads `git status --porcelain`. Stash state is not part of this output.
pub fn parse_porcelain(raw: &str) -> DirtyState {
    let mut state = DirtyState::default();
    for line in raw.lines() {
        let mut codes = line.chars();
        let (Some(index), Some(worktree)) = (codes.next(), codes.next()) else {
            continue;
        };
        if index == '?' && worktree == '?' {
            state.untracked = true;
            continue;
        }
        if index != ' ' && index != '!' {
            state.uncommitted = true;
        }
        if worktree != ' ' && worktree != '!' {
            state.unstaged = true;
        }
    }
    state
}

pub fn parse_divergence(raw: &str) -> Result<Divergence> {
    let mut counts = raw.split_whitespace();
    let (Some(ahead), Some(behind), None) = (counts.next(), counts.next(), counts.next()) else {
        bail!("unexpected git rev-list output {raw:?}");
    };
    Ok(Divergence {
        ahead: ahead
            .parse()
            .with_context(|| format!("invalid ahead count {ahead:?}"))?,
        behind: behind
            .parse()
            .with_context(|| format!("invalid behind count {behind:?}"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        branches, current_branch, dirty_state, divergence, location, parse_divergence,
        parse_location, parse_porcelain,
    };
    use crate::runner::CommandRunner;
    use anyhow::Result;
    use fnbar_app::{DirtyState, Divergence, GitLocation};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::ffi::OsString;
    use std::io;
    use std::path::Path;
    use std::process::Output;

    struct StubRunner {
        calls: RefCell<Vec<Vec<OsString>>>,
        results: RefCell<VecDeque<io::Result<Output>>>,
    }

    impl StubRunner {
        fn with_results(results: Vec<io::Result<Output>>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                results: RefCell::new(VecDeque::from(results)),
            }
        }
    }

    impl CommandRunner for StubRunner {
        fn run(&self, program: &str, args: &[OsString], _dir: &Path) -> io::Result<Output> {
            assert_eq!(program, "git");
            self.calls.borrow_mut().push(args.to_vec());
            self.results.borrow_mut().pop_front().unwrap_or_else(|| {
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "missing stubbed command output",
                ))
            })
        }
    }

    fn output(code: i32, stdout: &str) -> io::Result<Output> {
        use std::os::unix::process::ExitStatusExt;
        Ok(Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    #[test]
    fn porcelain_flags_each_kind_once() {
        let state = parse_porcelain("M  src/lib.rs\nA  src/new.rs\n?? notes.txt\n");
        assert_eq!(
            state,
            DirtyState {
                uncommitted: true,
                untracked: true,
                ..DirtyState::default()
            }
        );

        let unstaged = parse_porcelain(" M README.md\n");
        assert!(unstaged.unstaged);
        assert!(!unstaged.uncommitted);

        let both = parse_porcelain("MM Cargo.toml\n");
        assert!(both.uncommitted && both.unstaged);
        assert!(parse_porcelain("").is_clean());
    }

    #[test]
    fn location_parses_rev_parse_answers() -> Result<()> {
        assert_eq!(parse_location("true\n")?, GitLocation::WorkTree);
        assert_eq!(parse_location("false\n")?, GitLocation::InsideGitDir);
        assert!(parse_location("maybe").is_err());
        Ok(())
    }

    #[test]
    fn divergence_parses_left_right_counts() -> Result<()> {
        assert_eq!(
            parse_divergence("3\t1\n")?,
            Divergence {
                ahead: 3,
                behind: 1
            }
        );
        assert!(parse_divergence("3").is_err());
        assert!(parse_divergence("x 1").is_err());
        Ok(())
    }

    #[test]
    fn failed_rev_parse_means_no_repository() -> Result<()> {
        let runner = StubRunner::with_results(vec![output(128, "")]);
        assert_eq!(location(&runner, Path::new("/tmp"))?, GitLocation::NotARepository);
        Ok(())
    }

    #[test]
    fn detached_head_has_no_branch() -> Result<()> {
        let runner = StubRunner::with_results(vec![output(1, ""), output(0, "main\n")]);
        assert_eq!(current_branch(&runner, Path::new("/repo"))?, None);
        assert_eq!(
            current_branch(&runner, Path::new("/repo"))?,
            Some("main".to_owned())
        );
        Ok(())
    }

    #[test]
    fn dirty_state_checks_the_stash_ref() -> Result<()> {
        let runner = StubRunner::with_results(vec![output(0, "?? tmp.log\n"), output(0, "abc123\n")]);
        let state = dirty_state(&runner, Path::new("/repo"))?;
        assert!(state.untracked);
        assert!(state.stashed);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0], vec![OsString::from("status"), OsString::from("--porcelain")]);
        assert_eq!(calls[1].last(), Some(&OsString::from("refs/stash")));
        Ok(())
    }

    #[test]
    fn failing_status_is_an_error() {
        let runner = StubRunner::with_results(vec![output(128, "")]);
        let error = dirty_state(&runner, Path::new("/repo")).expect_err("status should fail");
        assert!(error.to_string().contains("git status --porcelain"));
    }

    #[test]
    fn missing_upstream_is_not_an_error() -> Result<()> {
        let runner = StubRunner::with_results(vec![output(128, "")]);
        assert_eq!(divergence(&runner, Path::new("/repo"))?, None);
        Ok(())
    }

    #[test]
    fn branch_listing_skips_blank_lines() -> Result<()> {
        let runner = StubRunner::with_results(vec![output(0, "develop\nmain\n\n")]);
        assert_eq!(
            branches(&runner, Path::new("/repo"))?,
            vec!["develop".to_owned(), "main".to_owned()]
        );
        Ok(())
    }
}
