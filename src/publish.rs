//! Publishing the rendered archive with git.
//!
//! `git add` the changed paths, `git commit`, `git push {remote} {branch}`.
//! A commit with nothing staged is not an error: the push still runs so a
//! previously failed push gets another chance.
//!
//! Every git invocation runs under a deadline. A command still running when
//! it expires (a push waiting on credentials, a hung remote) is killed and
//! reported as [`PublishError::Timeout`].

use crate::ledger::TIMESTAMP_FORMAT;
use crate::types::{Difficulty, Entry};
use chrono::NaiveDateTime;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

pub const COMMIT_TRAILER: &str = "🤖 Auto-generated by LeetCode Daily Script";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to run git: {0}")]
    Io(#[from] io::Error),
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),
    #[error("`git {command}` failed: {stderr}")]
    Command { command: String, stderr: String },
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Committed,
    /// Nothing changed; the push was still attempted.
    NothingToCommit,
}

/// Pushes changed files to the hosting remote.
pub trait Publisher {
    fn publish(&self, paths: &[PathBuf], message: &str) -> Result<PublishOutcome, PublishError>;
}

/// Shells out to the `git` binary in a working tree.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
    timeout: Duration,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
            branch: branch.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    /// Deadline applied to each git command.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when `repo_dir` is inside a git working tree.
    pub fn is_repository(&self) -> bool {
        self.git(&["rev-parse", "--git-dir"])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(&self, args: &[&str]) -> Result<Output, PublishError> {
        debug!(command = %args.join(" "), "running git");
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.repo_dir);
        run_with_timeout(cmd, self.timeout)
    }

    fn check(&self, args: &[&str], output: Output) -> Result<(), PublishError> {
        if output.status.success() {
            return Ok(());
        }
        Err(PublishError::Command {
            command: args.first().copied().unwrap_or_default().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, paths: &[PathBuf], message: &str) -> Result<PublishOutcome, PublishError> {
        if !self.is_repository() {
            return Err(PublishError::NotARepository(self.repo_dir.clone()));
        }

        let existing: Vec<String> = paths
            .iter()
            .filter(|p| self.repo_dir.join(p).exists())
            .map(|p| relative_to(p, &self.repo_dir).to_string_lossy().into_owned())
            .collect();
        if !existing.is_empty() {
            let mut args = vec!["add", "--"];
            args.extend(existing.iter().map(String::as_str));
            let output = self.git(&args)?;
            self.check(&args, output)?;
        }

        let commit_args = ["commit", "-m", message];
        let output = self.git(&commit_args)?;
        let outcome = if output.status.success() {
            PublishOutcome::Committed
        } else if is_nothing_to_commit(&output) {
            info!("nothing to commit");
            PublishOutcome::NothingToCommit
        } else {
            self.check(&commit_args, output)?;
            PublishOutcome::Committed
        };

        let push_args = ["push", self.remote.as_str(), self.branch.as_str()];
        let output = self.git(&push_args)?;
        self.check(&push_args, output)?;
        info!(remote = %self.remote, branch = %self.branch, "pushed");
        Ok(outcome)
    }
}

/// Run a command to completion, killing it once `timeout` has elapsed.
///
/// stdout and stderr are drained on their own threads while the child runs.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<Output, PublishError> {
    let command = std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            warn!(%command, timeout_secs = timeout.as_secs(), "command timed out, killing");
            child.kill()?;
            child.wait()?;
            return Err(PublishError::Timeout { command, timeout });
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        // A read error only truncates captured output.
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}

fn is_nothing_to_commit(output: &Output) -> bool {
    let needle = "nothing to commit";
    String::from_utf8_lossy(&output.stdout).contains(needle)
        || String::from_utf8_lossy(&output.stderr).contains(needle)
}

// ============================================================================
// Commit messages
// ============================================================================

/// `1E+2M+1H`; difficulties with no entries are left out.
pub fn difficulty_summary<'a>(difficulties: impl IntoIterator<Item = &'a Difficulty>) -> String {
    let mut counts = [0usize; 3];
    for d in difficulties {
        counts[*d as usize] += 1;
    }
    Difficulty::ALL
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(d, n)| format!("{}{}", n, &d.label()[..1]))
        .collect::<Vec<_>>()
        .join("+")
}

/// Commit message for a daily run.
pub fn daily_commit_message(now: NaiveDateTime, entries: &[Entry]) -> String {
    let stamp = now.format(TIMESTAMP_FORMAT);
    if entries.is_empty() {
        return format!("📝 {stamp} | Add LeetCode questions\n\n{COMMIT_TRAILER}");
    }
    let summary = difficulty_summary(entries.iter().map(|e| &e.difficulty));
    let bullets = entries
        .iter()
        .map(|e| format!("• {}. {}", e.frontend_id, e.title))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("📝 {stamp} | {summary}\n\n{bullets}\n\n{COMMIT_TRAILER}")
}

/// Commit message for a full rebuild.
pub fn rebuild_commit_message(now: NaiveDateTime, records: usize, questions: usize) -> String {
    format!(
        "🔄 重建网站 | {records} 条记录 · {questions} 道题目\n\n更新时间: {}",
        now.format(TIMESTAMP_FORMAT)
    )
}
