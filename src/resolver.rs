//! Repository resolution: decide between NEEDS_CLONE, WRONG_BRANCH and an
//! immediate open, driven only by filesystem and git state.

use std::path::{Path, PathBuf};

use crate::config::{EditorProfile, OpenMode};
use crate::errors::{display_for_host_error, HostError};
use crate::git;
use crate::launcher::{LaunchTarget, Launcher, Spawner, TargetKind};
use crate::protocol::{HostRequest, HostResponse, OpenPayload, ResolveRequest};

/// What a successful open launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    pub editor_id: String,
    pub program: PathBuf,
    /// Whether the requested file (not just the folder) was opened.
    pub opened_file: bool,
}

/// Owner and repo names become path segments; reject anything that is not a
/// single plain segment.
fn valid_segment(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\'])
}

/// Build the deferred `open` request carried by NEEDS_CLONE and WRONG_BRANCH.
pub fn deferred_open(req: &ResolveRequest, local_path: &Path) -> OpenPayload {
    OpenPayload {
        local_path: local_path.to_path_buf(),
        file_path: req.file_path.clone(),
        line_number: req.line_number,
        editor_id: req.editor_id.clone(),
        open_mode: Some(req.effective_open_mode()),
        config: req.config.clone(),
    }
}

pub fn resolve<S: Spawner>(req: &ResolveRequest, launcher: &mut Launcher<S>) -> HostResponse {
    if !valid_segment(&req.owner) || !valid_segment(&req.repo) {
        return HostResponse::error(format!(
            "invalid repository name: {}/{}",
            req.owner, req.repo
        ));
    }
    let cfg = &req.config;
    let local_path = cfg.repo_location(&req.owner, &req.repo);
    let payload = deferred_open(req, &local_path);
    tracing::info!(
        owner = %req.owner,
        repo = %req.repo,
        git_ref = ?req.requested_ref(),
        file = ?req.file_path,
        local_path = %local_path.display(),
        "resolve"
    );

    if !local_path.exists() {
        let remote = cfg.remote_url(&req.owner, &req.repo);
        tracing::info!(remote = %remote, local_path = %local_path.display(), "needs clone");
        return HostResponse::NeedsClone {
            remote,
            local_path,
            open_payload: HostRequest::Open(payload),
        };
    }

    if let Some(expected) = req.requested_ref().filter(|r| !git::is_commit_sha(r)) {
        match git::current_branch(&local_path) {
            Some(current) if current != expected => {
                tracing::info!(current = %current, expected, "wrong branch");
                return HostResponse::WrongBranch {
                    current_branch: current,
                    expected_branch: expected.to_string(),
                    local_path,
                    open_payload: HostRequest::Open(payload),
                };
            }
            Some(_) => {}
            None => tracing::debug!(local_path = %local_path.display(), "current branch unavailable; skipping branch check"),
        }
    }

    opened_response(&payload, launcher)
}

/// Run an open and render the result as OPENED or ERROR.
pub fn opened_response<S: Spawner>(payload: &OpenPayload, launcher: &mut Launcher<S>) -> HostResponse {
    match open_payload(payload, launcher) {
        Ok(outcome) => HostResponse::Opened {
            local_path: Some(payload.local_path.clone()),
            editor_id: Some(outcome.editor_id),
        },
        Err(e) => {
            let message = display_for_host_error(&e);
            tracing::warn!(local_path = %payload.local_path.display(), error = %message, "open failed");
            HostResponse::error(message)
        }
    }
}

fn pick_editor<'a>(payload: &'a OpenPayload) -> Result<&'a EditorProfile, HostError> {
    let cfg = &payload.config;
    if let Some(id) = payload.editor_id.as_deref() {
        if !cfg.has_editor(id) {
            tracing::warn!(editor = id, fallback = %cfg.default_editor_id, "unknown editor id");
        }
    }
    cfg.editor(payload.editor_id.as_deref())
        .ok_or_else(|| HostError::Message("No editor configured".to_string()))
}

/// Open a local checkout per the payload's open mode.
///
/// Repo mode opens the folder first; that failure is fatal. The file is then
/// opened as a secondary step whose failure is only logged. File mode tries
/// the file first and falls back to the folder. A file that no longer exists
/// in the checkout always falls back to the folder.
pub fn open_payload<S: Spawner>(
    payload: &OpenPayload,
    launcher: &mut Launcher<S>,
) -> Result<OpenOutcome, HostError> {
    let local = payload.local_path.as_path();
    if !local.exists() {
        return Err(HostError::Message(format!(
            "Local repo path not found: {}",
            local.display()
        )));
    }
    let profile = pick_editor(payload)?;

    let file = payload
        .file_path
        .as_deref()
        .map(|f| f.trim_start_matches(['/', '\\']))
        .filter(|f| !f.is_empty())
        .map(|f| local.join(f));
    let file = match file {
        Some(f) if f.exists() => Some(f),
        Some(f) => {
            tracing::info!(file = %f.display(), "file not present in checkout; opening folder");
            None
        }
        None => None,
    };

    let folder = LaunchTarget {
        path: local,
        line: None,
        kind: TargetKind::Folder,
        cwd: Some(local),
    };
    let outcome = |program: PathBuf, opened_file: bool| OpenOutcome {
        editor_id: profile.id.clone(),
        program,
        opened_file,
    };

    match payload.effective_open_mode() {
        OpenMode::Repo => {
            let program = launcher.launch(profile, folder)?;
            let Some(file) = file else {
                return Ok(outcome(program, false));
            };
            let target = LaunchTarget {
                path: &file,
                line: payload.line_number,
                kind: TargetKind::FileInRepo,
                cwd: Some(local),
            };
            match launcher.launch(profile, target) {
                Ok(p) => Ok(outcome(p, true)),
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "secondary file open failed; workspace is open");
                    Ok(outcome(program, false))
                }
            }
        }
        OpenMode::File => {
            if let Some(file) = &file {
                let target = LaunchTarget {
                    path: file,
                    line: payload.line_number,
                    kind: TargetKind::File,
                    cwd: Some(local),
                };
                match launcher.launch(profile, target) {
                    Ok(p) => return Ok(outcome(p, true)),
                    Err(e) => {
                        tracing::warn!(file = %file.display(), error = %e, "file open failed; falling back to folder")
                    }
                }
            }
            let program = launcher.launch(profile, folder)?;
            Ok(outcome(program, false))
        }
    }
}
