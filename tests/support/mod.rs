/*!
Test support helpers shared across integration tests.

- have_git(): check git availability on PATH
- init_repo_with_default_user(dir): initialize a git repo with one commit on `main`
- RecordingSpawner: scripted editor spawner that records every attempt
- frames(..)/decode_frames(..): build and split framed byte streams

These helpers do not print skip messages themselves so tests can keep their
own "skipping: ..." outputs.
*/

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use gh2ide::launcher::{SpawnOutcome, Spawner};
use gh2ide::protocol::{read_frame, write_frame};
use serde_json::Value;

/// Return true if `git` is available on PATH.
#[allow(dead_code)]
pub fn have_git() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run git in `dir` and assert success.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) {
    let st = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .expect("spawn git");
    assert!(st.success(), "git {:?} failed in {}", args, dir.display());
}

/// Initialize a repository on branch `main` with a local identity and one commit
/// containing `README.md`.
#[allow(dead_code)]
pub fn init_repo_with_default_user(dir: &Path) {
    std::fs::create_dir_all(dir).expect("create repo dir");
    git(dir, &["init"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "user.name", "GH2IDE Test"]);
    git(dir, &["config", "user.email", "gh2ide@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    std::fs::write(dir.join("README.md"), "hello\n").expect("write readme");
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-m", "init"]);
}

/// One recorded spawn attempt.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Scripted spawner: programs without a scripted outcome are "not found".
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingSpawner {
    pub calls: Vec<SpawnCall>,
    pub outcomes: HashMap<PathBuf, SpawnOutcome>,
}

#[allow(dead_code)]
impl RecordingSpawner {
    pub fn with(mut self, program: &str, outcome: SpawnOutcome) -> Self {
        self.outcomes.insert(PathBuf::from(program), outcome);
        self
    }

    /// Every program succeeds.
    pub fn always_ok(programs: &[&str]) -> Self {
        programs
            .iter()
            .fold(Self::default(), |s, p| s.with(p, SpawnOutcome::Success))
    }
}

impl Spawner for RecordingSpawner {
    fn spawn(&mut self, program: &Path, args: &[String], cwd: Option<&Path>) -> SpawnOutcome {
        self.calls.push(SpawnCall {
            program: program.to_path_buf(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        });
        self.outcomes
            .get(program)
            .cloned()
            .unwrap_or_else(|| SpawnOutcome::NotFound(format!("{}: not found", program.display())))
    }
}

/// Concatenate messages into one framed byte stream.
#[allow(dead_code)]
pub fn frames(msgs: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for m in msgs {
        write_frame(&mut out, m).expect("encode frame");
    }
    out
}

/// Split a framed byte stream back into messages.
#[allow(dead_code)]
pub fn decode_frames(bytes: &[u8]) -> Vec<Value> {
    let mut r = Cursor::new(bytes);
    let mut out = Vec::new();
    while let Some(v) = read_frame(&mut r).expect("decode frame") {
        out.push(v);
    }
    out
}
