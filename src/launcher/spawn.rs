//! The process-spawning seam used by the launcher.

use std::path::Path;

use crate::util::exec::is_not_found;
use crate::util::{ExecRequest, ExecService};

/// Result of one editor spawn attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnOutcome {
    Success,
    /// The process could not be started at all.
    NotFound(String),
    /// The process ran and exited non-zero (or was killed).
    Exited { code: Option<i32>, stderr: String },
}

pub trait Spawner {
    fn spawn(&mut self, program: &Path, args: &[String], cwd: Option<&Path>) -> SpawnOutcome;
}

/// Runs editors as real child processes and waits for them.
///
/// No timeout: a hung editor command stalls the host until it exits.
#[derive(Debug, Default, Clone)]
pub struct ProcessSpawner {
    exec: ExecService,
}

impl ProcessSpawner {
    pub fn new(exec: ExecService) -> Self {
        Self { exec }
    }
}

impl Spawner for ProcessSpawner {
    fn spawn(&mut self, program: &Path, args: &[String], cwd: Option<&Path>) -> SpawnOutcome {
        let mut req = ExecRequest::new(program).args(args).capture_output(true);
        if let Some(dir) = cwd {
            req = req.cwd(dir);
        }
        match self.exec.run(req) {
            Ok(out) if out.success() => {
                tracing::debug!(program = %program.display(), elapsed = ?out.duration, "editor command returned");
                let stdout = out.stdout.trim();
                if !stdout.is_empty() {
                    tracing::debug!(program = %program.display(), output = stdout, "editor stdout");
                }
                SpawnOutcome::Success
            }
            Ok(out) => SpawnOutcome::Exited {
                code: out.status.code(),
                stderr: out.stderr.trim().to_string(),
            },
            Err(e) => {
                if is_not_found(&e) {
                    SpawnOutcome::NotFound(format!("{e:#}"))
                } else {
                    SpawnOutcome::Exited {
                        code: None,
                        stderr: format!("{e:#}"),
                    }
                }
            }
        }
    }
}
