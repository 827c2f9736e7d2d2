use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::errors::HostError;
use crate::util::absolutize;

/// Run a git command with optional -C <repo>. Returns Output on invocation success.
///
/// Terminal prompts are disabled: the host has no terminal and a credential
/// prompt would stall the request loop.
pub fn git(repo: Option<&Path>, args: &[&str]) -> io::Result<Output> {
    let mut cmd = Command::new("git");
    if let Some(r) = repo {
        cmd.arg("-C").arg(r);
    }
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd.output()
}

/// Run a git command and capture trimmed stdout as UTF-8 String on success.
pub fn git_stdout_str(repo: Option<&Path>, args: &[&str]) -> Option<String> {
    git(repo, args).ok().and_then(|o| {
        if o.status.success() {
            Some(String::from_utf8_lossy(&o.stdout).trim().to_string())
        } else {
            None
        }
    })
}

/// Is git available on PATH?
pub fn git_available() -> bool {
    git(None, &["--version"])
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A pinned commit is exactly 40 hexadecimal characters. Abbreviated hashes are
/// treated as branch names.
pub fn is_commit_sha(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Current branch name (`HEAD` when detached). None if git cannot answer.
pub fn current_branch(repo: &Path) -> Option<String> {
    git_stdout_str(Some(repo), &["rev-parse", "--abbrev-ref", "HEAD"]).filter(|s| !s.is_empty())
}

fn diagnostic(out: &Output, what: &str) -> String {
    let stderr = String::from_utf8_lossy(&out.stderr).trim_end().to_string();
    if stderr.is_empty() {
        match out.status.code() {
            Some(code) => format!("{what} failed (exit {code})"),
            None => format!("{what} failed"),
        }
    } else {
        stderr
    }
}

fn run_checked(repo: Option<&Path>, args: &[&str], what: &str) -> Result<Output, HostError> {
    let out = git(repo, args)
        .map_err(|e| HostError::Message(format!("failed to run git: {e}")))?;
    if out.status.success() {
        Ok(out)
    } else {
        tracing::warn!(
            cwd = ?repo,
            args = ?args,
            stderr = %String::from_utf8_lossy(&out.stderr).trim(),
            "git command failed"
        );
        Err(HostError::Message(diagnostic(&out, what)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStatus {
    Cloned,
    AlreadyPresent,
}

/// Clone `remote` into exactly `local_path`.
///
/// An existing path counts as already cloned; the remote is not verified.
pub fn ensure_cloned(
    remote: &str,
    local_path: &Path,
    remote_name: &str,
) -> Result<CloneStatus, HostError> {
    if local_path.exists() {
        return Ok(CloneStatus::AlreadyPresent);
    }
    // git runs in the parent; a relative target must not resolve against it again.
    let local_path = &absolutize(local_path);
    if let Some(parent) = local_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let local = local_path.to_string_lossy();
    let mut args = vec!["clone"];
    if !remote_name.is_empty() {
        args.extend(["--origin", remote_name]);
    }
    args.extend([remote, &*local]);
    run_checked(local_path.parent(), &args, "git clone")?;
    Ok(CloneStatus::Cloned)
}

/// Fetch all remotes with pruning, then switch to `branch`.
///
/// No stash or rebase is attempted; uncommitted changes make the switch fail
/// with git's own diagnostic.
pub fn switch_branch(local_path: &Path, branch: &str) -> Result<(), HostError> {
    if !local_path.exists() {
        return Err(HostError::Message(format!(
            "Local repo path not found: {}",
            local_path.display()
        )));
    }
    run_checked(Some(local_path), &["fetch", "--all", "--prune"], "git fetch")?;
    run_checked(Some(local_path), &["switch", branch], "git switch")?;
    Ok(())
}
