//! The caller pipeline: gate a trigger, resolve it with the host, and carry
//! out any confirmed clone or branch switch before reopening.

use std::path::Path;

use crate::caller::confirm::{ConfirmationArbitrator, Prompt};
use crate::caller::gate::{Clock, RequestGate, SkipReason, SystemClock, Trigger};
use crate::caller::location::{parse_hosted_url, HostedLocation};
use crate::caller::HostTransport;
use crate::config::{CallerSettings, OpenMode};
use crate::protocol::{CloneRequest, HostRequest, HostResponse, ResolveRequest, SwitchBranchRequest};

pub const CLONE_OPEN_FAILED: &str = "Clone completed but opening failed.";
pub const SWITCH_OPEN_FAILED: &str = "Branch switched but opening failed.";
pub const NO_RESPONSE: &str = "The native host did not respond.";

/// Where user-visible messages go. Host error text is passed through verbatim.
pub trait NoticeSink {
    fn notice(&self, message: &str);

    fn error(&self, message: &str) {
        self.notice(message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptOptions {
    pub trigger: Trigger,
    pub tab: Option<String>,
    /// Explicit editor choice; ignored unless it names a configured editor.
    pub editor_id: Option<String>,
    pub open_mode: Option<OpenMode>,
    /// Store `editor_id` as this repository's preferred editor.
    pub remember_editor: bool,
}

impl Default for InterceptOptions {
    fn default() -> Self {
        Self {
            trigger: Trigger::Automatic,
            tab: None,
            editor_id: None,
            open_mode: None,
            remember_editor: false,
        }
    }
}

impl InterceptOptions {
    pub fn forced() -> Self {
        Self {
            trigger: Trigger::Forced,
            ..Self::default()
        }
    }
}

/// Result of the clone or switch step that follows a NEEDS_CLONE or WRONG_BRANCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Declined,
    Completed,
    /// The repository step worked but the deferred open did not.
    OpenFailed,
    Failed(String),
    NoResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Opened,
    NeedsClone(FollowUp),
    WrongBranch(FollowUp),
    Error(String),
    NoResponse,
    /// A status the resolve step never produces.
    Unexpected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptOutcome {
    Skipped(SkipReason),
    Handled {
        result: Handled,
        editor_id: String,
        open_mode: OpenMode,
    },
}

pub struct Interceptor<T, N, C = SystemClock> {
    settings: CallerSettings,
    settings_dirty: bool,
    gate: RequestGate<C>,
    arbitrator: ConfirmationArbitrator,
    transport: T,
    notices: N,
}

impl<T: HostTransport, N: NoticeSink> Interceptor<T, N, SystemClock> {
    pub fn new(
        settings: CallerSettings,
        arbitrator: ConfirmationArbitrator,
        transport: T,
        notices: N,
    ) -> Self {
        let gate = RequestGate::new(settings.auto_open);
        Self::with_gate(settings, gate, arbitrator, transport, notices)
    }
}

impl<T: HostTransport, N: NoticeSink, C: Clock> Interceptor<T, N, C> {
    pub fn with_gate(
        settings: CallerSettings,
        gate: RequestGate<C>,
        arbitrator: ConfirmationArbitrator,
        transport: T,
        notices: N,
    ) -> Self {
        Self {
            settings,
            settings_dirty: false,
            gate,
            arbitrator,
            transport,
            notices,
        }
    }

    pub fn settings(&self) -> &CallerSettings {
        &self.settings
    }

    /// True once after a remembered editor changed the settings.
    pub fn take_settings_dirty(&mut self) -> bool {
        std::mem::take(&mut self.settings_dirty)
    }

    pub fn gate(&self) -> &RequestGate<C> {
        &self.gate
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn choose_editor(&mut self, loc: &HostedLocation, opts: &InterceptOptions) -> String {
        let explicit = opts
            .editor_id
            .as_deref()
            .filter(|id| self.settings.host.has_editor(id));
        if let Some(id) = explicit {
            if opts.remember_editor && self.settings.set_repo_editor(&loc.owner, &loc.repo, id) {
                tracing::info!(owner = %loc.owner, repo = %loc.repo, editor = id, "remembered editor");
                self.settings_dirty = true;
            }
            return id.to_string();
        }
        self.settings
            .editor_for_repo(&loc.owner, &loc.repo)
            .unwrap_or_else(|| self.settings.host.default_editor_id.clone())
    }

    pub fn intercept(&mut self, url: &str, opts: &InterceptOptions) -> InterceptOutcome {
        let loc = match parse_hosted_url(url, &self.settings.host.remote_host) {
            Ok(loc) => loc,
            Err(e) => {
                tracing::debug!(url, error = %e, "not intercepted");
                return InterceptOutcome::Skipped(SkipReason::NotHosted);
            }
        };
        if let Err(reason) = self.gate.admit(opts.tab.as_deref(), url, opts.trigger) {
            return InterceptOutcome::Skipped(reason);
        }
        if !loc.has_repo() {
            return InterceptOutcome::Skipped(SkipReason::MissingRepo);
        }

        let editor_id = self.choose_editor(&loc, opts);
        let open_mode = opts.open_mode.unwrap_or(self.settings.host.open_mode);
        let request = ResolveRequest {
            owner: loc.owner.clone(),
            repo: loc.repo.clone(),
            git_ref: loc.branch.clone(),
            commit: loc.commit.clone(),
            file_path: loc.file_path.clone(),
            line_number: loc.line,
            editor_id: Some(editor_id.clone()),
            open_mode: Some(open_mode),
            config: self.settings.host.clone(),
        };
        tracing::info!(url, editor = %editor_id, mode = open_mode.as_str(), "resolving");

        let result = match self.transport.send(&HostRequest::Resolve(request)) {
            None => {
                self.notices.error(NO_RESPONSE);
                Handled::NoResponse
            }
            Some(HostResponse::Opened { .. }) => Handled::Opened,
            Some(HostResponse::NeedsClone {
                remote,
                local_path,
                open_payload,
            }) => Handled::NeedsClone(self.confirm_and_clone(&remote, &local_path, &open_payload)),
            Some(HostResponse::WrongBranch {
                current_branch,
                expected_branch,
                local_path,
                open_payload,
            }) => Handled::WrongBranch(self.warn_and_switch(
                &current_branch,
                &expected_branch,
                &local_path,
                &open_payload,
            )),
            Some(HostResponse::Error { message }) => {
                self.notices.error(&message);
                Handled::Error(message)
            }
            Some(other) => Handled::Unexpected(other.status().to_string()),
        };
        InterceptOutcome::Handled {
            result,
            editor_id,
            open_mode,
        }
    }

    fn reopen(&self, open_payload: &HostRequest, failure: &str) -> FollowUp {
        match self.transport.send(open_payload) {
            Some(HostResponse::Opened { .. }) => FollowUp::Completed,
            other => {
                if let Some(HostResponse::Error { message }) = &other {
                    tracing::warn!(error = %message, "deferred open failed");
                }
                self.notices.error(failure);
                FollowUp::OpenFailed
            }
        }
    }

    pub fn confirm_and_clone(
        &self,
        remote: &str,
        local_path: &Path,
        open_payload: &HostRequest,
    ) -> FollowUp {
        let prompt = Prompt::new(
            "Clone repository?",
            format!("Clone {remote} to {}?", local_path.display()),
            "Clone",
            "Cancel",
        );
        if !self.arbitrator.decide(&prompt) {
            return FollowUp::Declined;
        }
        let request = HostRequest::Clone(CloneRequest {
            remote: remote.to_string(),
            local_path: local_path.to_path_buf(),
            config: self.settings.host.clone(),
        });
        match self.transport.send(&request) {
            Some(HostResponse::Cloned { .. }) => self.reopen(open_payload, CLONE_OPEN_FAILED),
            Some(HostResponse::Error { message }) => {
                self.notices.error(&format!("Clone failed: {message}"));
                FollowUp::Failed(message)
            }
            Some(other) => {
                let message = format!("unexpected status {}", other.status());
                self.notices.error(&format!("Clone failed: {message}"));
                FollowUp::Failed(message)
            }
            None => {
                self.notices.error(NO_RESPONSE);
                FollowUp::NoResponse
            }
        }
    }

    pub fn warn_and_switch(
        &self,
        current_branch: &str,
        expected_branch: &str,
        local_path: &Path,
        open_payload: &HostRequest,
    ) -> FollowUp {
        let prompt = Prompt::new(
            "Switch branches?",
            format!(
                "Repo is on \"{current_branch}\" but URL requests \"{expected_branch}\". Switch branches?"
            ),
            "Switch",
            "Stay",
        );
        if !self.arbitrator.decide(&prompt) {
            return FollowUp::Declined;
        }
        let request = HostRequest::SwitchBranch(SwitchBranchRequest {
            local_path: local_path.to_path_buf(),
            branch: expected_branch.to_string(),
        });
        match self.transport.send(&request) {
            Some(HostResponse::Switched { .. }) => self.reopen(open_payload, SWITCH_OPEN_FAILED),
            Some(HostResponse::Error { message }) => {
                self.notices.error(&format!("Branch switch failed: {message}"));
                FollowUp::Failed(message)
            }
            Some(other) => {
                let message = format!("unexpected status {}", other.status());
                self.notices.error(&format!("Branch switch failed: {message}"));
                FollowUp::Failed(message)
            }
            None => {
                self.notices.error(NO_RESPONSE);
                FollowUp::NoResponse
            }
        }
    }
}
