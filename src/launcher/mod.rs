//! Editor launch resolution: turn "open this path in editor X" into exactly one
//! successful process invocation, trying the profile's candidates in order.

pub mod candidates;
pub mod spawn;
pub mod template;

pub use candidates::{lookup, CandidateCache};
pub use spawn::{ProcessSpawner, SpawnOutcome, Spawner};
pub use template::{default_template, render, select_template, TargetKind};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::EditorProfile;
use crate::errors::LaunchError;
use crate::util::first_ok;

/// One open intent.
#[derive(Debug, Clone, Copy)]
pub struct LaunchTarget<'a> {
    pub path: &'a Path,
    pub line: Option<u32>,
    pub kind: TargetKind,
    /// Working directory for the editor process (the repository root).
    pub cwd: Option<&'a Path>,
}

pub struct Launcher<S = ProcessSpawner> {
    spawner: S,
    candidates: CandidateCache,
    /// Last executable that launched successfully, per editor id.
    preferred: HashMap<String, PathBuf>,
}

impl Default for Launcher<ProcessSpawner> {
    fn default() -> Self {
        Self::new(ProcessSpawner::default())
    }
}

fn attempt<S: Spawner>(
    spawner: &mut S,
    candidate: &str,
    program: &Path,
    args: &[String],
    cwd: Option<&Path>,
) -> Result<(), String> {
    tracing::info!(candidate, program = %program.display(), args = ?args, cwd = ?cwd, "launching editor");
    match spawner.spawn(program, args, cwd) {
        SpawnOutcome::Success => Ok(()),
        SpawnOutcome::NotFound(detail) => {
            tracing::warn!(candidate, error = %detail, "editor spawn failed");
            Err(format!("Editor command not found: {candidate}"))
        }
        SpawnOutcome::Exited { code, stderr } => {
            tracing::warn!(candidate, status = ?code, stderr = %stderr, "editor exited non-zero");
            if !stderr.is_empty() {
                Err(stderr)
            } else {
                match code {
                    Some(c) => Err(format!("Editor command exited with status {c}")),
                    None => Err("Editor command was terminated".to_string()),
                }
            }
        }
    }
}

impl<S: Spawner> Launcher<S> {
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            candidates: CandidateCache::new(),
            preferred: HashMap::new(),
        }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    pub fn preferred_path(&self, editor_id: &str) -> Option<&Path> {
        self.preferred.get(editor_id).map(PathBuf::as_path)
    }

    /// Launch `profile` for `target`. Returns the executable that succeeded.
    ///
    /// A previously successful executable is tried first. If it fails, the walk
    /// restarts from the first candidate and skips that executable. Not-found and
    /// non-zero exits both count as failures; the last one is reported.
    pub fn launch(
        &mut self,
        profile: &EditorProfile,
        target: LaunchTarget<'_>,
    ) -> Result<PathBuf, LaunchError> {
        let template = select_template(&profile.argument_templates, target.kind, target.line);
        let args = render(&template, target.path, target.line);

        let mut last_err: Option<String> = None;
        let mut failed_preferred: Option<PathBuf> = None;
        if let Some(p) = self.preferred.get(&profile.id).cloned() {
            let shown = p.to_string_lossy().into_owned();
            match attempt(&mut self.spawner, &shown, &p, &args, target.cwd) {
                Ok(()) => return Ok(p),
                Err(msg) => {
                    last_err = Some(msg);
                    failed_preferred = Some(p);
                }
            }
        }

        let candidates = profile.candidates();
        if candidates.is_empty() && last_err.is_none() {
            return Err(LaunchError::new(format!(
                "No command configured for editor {}",
                profile.id
            )));
        }

        let Self {
            spawner,
            candidates: cache,
            preferred,
        } = self;
        let resolved = candidates
            .iter()
            .map(|c| (c.as_str(), cache.resolve(&profile.id, c)))
            .filter(|(_, p)| failed_preferred.as_ref() != Some(p));
        match first_ok(resolved, |(cand, program)| {
            attempt(&mut *spawner, cand, &program, &args, target.cwd).map(|()| program)
        }) {
            Ok(program) => {
                preferred.insert(profile.id.clone(), program.clone());
                Ok(program)
            }
            Err(err) => Err(LaunchError::new(
                err.or(last_err)
                    .unwrap_or_else(|| format!("Editor command not found for {}", profile.id)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Scripted {
        calls: Vec<(PathBuf, Vec<String>)>,
        outcomes: HashMap<PathBuf, SpawnOutcome>,
    }

    impl Spawner for Scripted {
        fn spawn(&mut self, program: &Path, args: &[String], _cwd: Option<&Path>) -> SpawnOutcome {
            self.calls.push((program.to_path_buf(), args.to_vec()));
            self.outcomes
                .get(program)
                .cloned()
                .unwrap_or(SpawnOutcome::NotFound("missing".into()))
        }
    }

    fn profile() -> EditorProfile {
        crate::config::sanitize_editor(&json!({
            "id": "ed",
            "command": "/opt/a/ed",
            "alternates": ["/opt/b/ed"]
        }))
        .unwrap()
    }

    #[test]
    fn preferred_failure_restarts_from_top_without_retrying_it() {
        let mut s = Scripted::default();
        s.outcomes.insert("/opt/b/ed".into(), SpawnOutcome::Success);
        let mut l = Launcher::new(s);
        let target = LaunchTarget {
            path: Path::new("/r"),
            line: None,
            kind: TargetKind::Folder,
            cwd: None,
        };
        assert_eq!(l.launch(&profile(), target).unwrap(), PathBuf::from("/opt/b/ed"));
        assert_eq!(l.preferred_path("ed"), Some(Path::new("/opt/b/ed")));

        l.spawner.outcomes.insert(
            "/opt/b/ed".into(),
            SpawnOutcome::Exited {
                code: Some(2),
                stderr: String::new(),
            },
        );
        l.spawner.calls.clear();
        let err = l.launch(&profile(), target).unwrap_err();
        let tried: Vec<_> = l.spawner.calls.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(tried, vec![PathBuf::from("/opt/b/ed"), PathBuf::from("/opt/a/ed")]);
        assert_eq!(err.to_string(), "Editor command not found: /opt/a/ed");
    }
}
