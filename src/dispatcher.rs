//! Host dispatcher: read one framed request, route it by `action`, write one
//! framed response, repeat until the peer closes the stream.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{display_for_host_error, FrameError};
use crate::git::{self, CloneStatus};
use crate::launcher::{Launcher, ProcessSpawner, Spawner};
use crate::picker::{pick_response, DirectoryPicker, NativePicker};
use crate::protocol::messages::{
    ACTION_CHOOSE_CLONE_ROOT, ACTION_CLONE, ACTION_OPEN, ACTION_PING, ACTION_RESOLVE,
    ACTION_SWITCH_BRANCH,
};
use crate::protocol::{
    read_frame, write_frame, CloneRequest, HostResponse, OpenPayload, ResolveRequest,
    SwitchBranchRequest,
};
use crate::resolver;

/// Single-threaded request router. The only state kept between requests is
/// the launcher's executable cache.
pub struct Dispatcher<S = ProcessSpawner, P = NativePicker> {
    launcher: Launcher<S>,
    picker: P,
}

impl Default for Dispatcher<ProcessSpawner, NativePicker> {
    fn default() -> Self {
        Self::new(Launcher::default(), NativePicker::default())
    }
}

fn decode<T: DeserializeOwned>(action: &str, msg: Value) -> Result<T, HostResponse> {
    serde_json::from_value(msg)
        .map_err(|e| HostResponse::error(format!("invalid {action} request: {e}")))
}

pub fn clone_response(req: &CloneRequest) -> HostResponse {
    if req.remote.trim().is_empty() || req.local_path.as_os_str().is_empty() {
        return HostResponse::error("clone requires remote and localPath");
    }
    tracing::info!(remote = %req.remote, local_path = %req.local_path.display(), "clone");
    match git::ensure_cloned(
        &req.remote,
        &req.local_path,
        &req.config.default_remote_name,
    ) {
        Ok(status) => HostResponse::Cloned {
            local_path: Some(req.local_path.clone()),
            already_present: status == CloneStatus::AlreadyPresent,
        },
        Err(e) => HostResponse::error(display_for_host_error(&e)),
    }
}

pub fn switch_response(req: &SwitchBranchRequest) -> HostResponse {
    if req.branch.trim().is_empty() {
        return HostResponse::error("switchBranch requires a branch");
    }
    tracing::info!(local_path = %req.local_path.display(), branch = %req.branch, "switch branch");
    match git::switch_branch(&req.local_path, &req.branch) {
        Ok(()) => HostResponse::Switched {
            branch: Some(req.branch.clone()),
        },
        Err(e) => HostResponse::error(display_for_host_error(&e)),
    }
}

impl<S: Spawner, P: DirectoryPicker> Dispatcher<S, P> {
    pub fn new(launcher: Launcher<S>, picker: P) -> Self {
        Self { launcher, picker }
    }

    pub fn launcher(&self) -> &Launcher<S> {
        &self.launcher
    }

    /// Route one decoded frame. Never fails: every fault becomes an ERROR response.
    pub fn handle(&mut self, msg: Value) -> HostResponse {
        let action = msg
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        tracing::debug!(action = %action, "request");
        let response = match action.as_str() {
            ACTION_RESOLVE => match decode::<ResolveRequest>(&action, msg) {
                Ok(req) => resolver::resolve(&req, &mut self.launcher),
                Err(resp) => resp,
            },
            ACTION_CLONE => match decode::<CloneRequest>(&action, msg) {
                Ok(req) => clone_response(&req),
                Err(resp) => resp,
            },
            ACTION_SWITCH_BRANCH => match decode::<SwitchBranchRequest>(&action, msg) {
                Ok(req) => switch_response(&req),
                Err(resp) => resp,
            },
            ACTION_OPEN => match decode::<OpenPayload>(&action, msg) {
                Ok(req) => resolver::opened_response(&req, &mut self.launcher),
                Err(resp) => resp,
            },
            ACTION_CHOOSE_CLONE_ROOT => pick_response(&self.picker),
            ACTION_PING => HostResponse::Pong {
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            other => HostResponse::error(format!("unknown action: {other}")),
        };
        tracing::info!(action = %action, status = response.status(), "response");
        response
    }

    /// Run the receive→dispatch→send loop. Returns the number of requests
    /// handled when the peer closes between frames; transport faults end the
    /// loop with an error.
    pub fn serve<R: Read, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<u64, FrameError> {
        let mut handled = 0u64;
        loop {
            let msg = match read_frame(&mut reader) {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    tracing::info!(handled, "input closed; exiting");
                    return Ok(handled);
                }
                Err(e) => {
                    tracing::error!(error = %e, "malformed frame; exiting");
                    return Err(e);
                }
            };
            let response = self.handle(msg);
            write_frame(&mut writer, &response)?;
            handled += 1;
        }
    }
}
