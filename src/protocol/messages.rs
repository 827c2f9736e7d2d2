//! Wire messages exchanged between the caller and the host.
//!
//! Requests carry an `action` tag, responses a `status` tag. Every response
//! carries what the caller needs to proceed without recomputing derived values
//! (remote URL, local path, a ready-to-resend `open` request).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{HostConfig, OpenMode};

pub const ACTION_RESOLVE: &str = "resolve";
pub const ACTION_CLONE: &str = "clone";
pub const ACTION_SWITCH_BRANCH: &str = "switchBranch";
pub const ACTION_OPEN: &str = "open";
pub const ACTION_CHOOSE_CLONE_ROOT: &str = "chooseCloneRoot";
pub const ACTION_PING: &str = "ping";

/// Ask the host what it takes to open `owner/repo` (at `ref`, optionally a file and line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub owner: String,
    pub repo: String,
    /// Branch name or 40-hex commit sha.
    #[serde(
        rename = "ref",
        alias = "branch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(alias = "filepath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(alias = "line", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_mode: Option<OpenMode>,
    #[serde(default)]
    pub config: HostConfig,
}

impl ResolveRequest {
    /// The ref to check out, preferring an explicit ref over a commit.
    pub fn requested_ref(&self) -> Option<&str> {
        self.git_ref
            .as_deref()
            .or(self.commit.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn effective_open_mode(&self) -> OpenMode {
        self.open_mode.unwrap_or(self.config.open_mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    pub remote: String,
    pub local_path: PathBuf,
    #[serde(default)]
    pub config: HostConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchBranchRequest {
    pub local_path: PathBuf,
    pub branch: String,
}

/// Open a local checkout (and optionally a file inside it) in an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPayload {
    pub local_path: PathBuf,
    #[serde(alias = "filepath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(alias = "line", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_mode: Option<OpenMode>,
    #[serde(default)]
    pub config: HostConfig,
}

impl OpenPayload {
    pub fn effective_open_mode(&self) -> OpenMode {
        self.open_mode.unwrap_or(self.config.open_mode)
    }
}

/// Every request the host accepts, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum HostRequest {
    #[serde(rename = "resolve")]
    Resolve(ResolveRequest),
    #[serde(rename = "clone")]
    Clone(CloneRequest),
    #[serde(rename = "switchBranch")]
    SwitchBranch(SwitchBranchRequest),
    #[serde(rename = "open")]
    Open(OpenPayload),
    #[serde(rename = "chooseCloneRoot")]
    ChooseCloneRoot,
    #[serde(rename = "ping")]
    Ping,
}

impl HostRequest {
    pub fn action(&self) -> &'static str {
        match self {
            HostRequest::Resolve(_) => ACTION_RESOLVE,
            HostRequest::Clone(_) => ACTION_CLONE,
            HostRequest::SwitchBranch(_) => ACTION_SWITCH_BRANCH,
            HostRequest::Open(_) => ACTION_OPEN,
            HostRequest::ChooseCloneRoot => ACTION_CHOOSE_CLONE_ROOT,
            HostRequest::Ping => ACTION_PING,
        }
    }
}

/// Every response the host produces, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostResponse {
    #[serde(rename_all = "camelCase")]
    Opened {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        local_path: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        editor_id: Option<String>,
    },
    /// `open_payload` is always an `open` request, ready to resend after cloning.
    #[serde(rename_all = "camelCase")]
    NeedsClone {
        remote: String,
        local_path: PathBuf,
        open_payload: HostRequest,
    },
    #[serde(rename_all = "camelCase")]
    WrongBranch {
        current_branch: String,
        expected_branch: String,
        local_path: PathBuf,
        open_payload: HostRequest,
    },
    Error {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Cloned {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        local_path: Option<PathBuf>,
        #[serde(default)]
        already_present: bool,
    },
    Switched {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
    Chosen {
        path: PathBuf,
    },
    Cancelled,
}

impl HostResponse {
    pub fn error(message: impl Into<String>) -> Self {
        HostResponse::Error {
            message: message.into(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            HostResponse::Opened { .. } => "OPENED",
            HostResponse::NeedsClone { .. } => "NEEDS_CLONE",
            HostResponse::WrongBranch { .. } => "WRONG_BRANCH",
            HostResponse::Error { .. } => "ERROR",
            HostResponse::Cloned { .. } => "CLONED",
            HostResponse::Switched { .. } => "SWITCHED",
            HostResponse::Pong { .. } => "PONG",
            HostResponse::Chosen { .. } => "CHOSEN",
            HostResponse::Cancelled => "CANCELLED",
        }
    }
}
