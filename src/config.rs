//! Host configuration, editor profiles, and caller settings.
//!
//! The host is stateless: a `HostConfig` arrives with every request and is
//! sanitized on receipt. Sanitization is lenient (it takes raw JSON/YAML values)
//! so a partially broken config degrades to defaults instead of failing the
//! request.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::{expand_tilde, trim_trailing_separators};

pub const DEFAULT_CLONE_ROOT: &str = "~/Documents/Code";
pub const DEFAULT_REMOTE_NAME: &str = "origin";
pub const DEFAULT_REMOTE_HOST: &str = "github.com";
pub const DEFAULT_EDITOR_ID: &str = "code";

pub const SETTINGS_ENV: &str = "GH2IDE_CONFIG";
pub const HOST_ENV_FILE_ENV: &str = "GH2IDE_ENV_FILE";

/// Whether an open targets the repository workspace or the single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum OpenMode {
    #[default]
    Repo,
    File,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::Repo => "repo",
            OpenMode::File => "file",
        }
    }

    /// Anything other than `"file"` means repo mode.
    pub fn parse_lenient(s: &str) -> OpenMode {
        if s.trim() == "file" {
            OpenMode::File
        } else {
            OpenMode::Repo
        }
    }
}

impl From<Value> for OpenMode {
    fn from(v: Value) -> Self {
        v.as_str().map(OpenMode::parse_lenient).unwrap_or_default()
    }
}

/// Per-target argument templates. Tokens may contain `{path}`, `{line}`, `{folder}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgTemplates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_with_line: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_in_repo: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<Vec<String>>,
}

/// How to invoke one local editor application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct EditorProfile {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_command: Option<String>,
    pub alternate_commands: Vec<String>,
    pub argument_templates: ArgTemplates,
}

impl EditorProfile {
    /// Primary first, then alternates in declared order.
    pub fn candidates(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(1 + self.alternate_commands.len());
        if let Some(p) = &self.primary_command {
            out.push(p.clone());
        }
        out.extend(self.alternate_commands.iter().cloned());
        out
    }
}

impl TryFrom<Value> for EditorProfile {
    type Error = String;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        sanitize_editor(&v).ok_or_else(|| "invalid editor profile".to_string())
    }
}

/// Everything the host needs to act on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct HostConfig {
    pub clone_root: String,
    pub default_remote_name: String,
    pub group_by_owner: bool,
    pub open_mode: OpenMode,
    pub default_editor_id: String,
    pub remote_host: String,
    pub editors: Vec<EditorProfile>,
}

impl Default for HostConfig {
    fn default() -> Self {
        sanitize_config(&Value::Null)
    }
}

impl From<Value> for HostConfig {
    fn from(v: Value) -> Self {
        sanitize_config(&v)
    }
}

impl HostConfig {
    /// Local checkout location: `cloneRoot/[owner/]repo`.
    pub fn repo_location(&self, owner: &str, repo: &str) -> PathBuf {
        let mut p = expand_tilde(&self.clone_root);
        if self.group_by_owner {
            p.push(owner);
        }
        p.push(repo);
        p
    }

    pub fn remote_url(&self, owner: &str, repo: &str) -> String {
        format!("https://{}/{}/{}.git", self.remote_host, owner, repo)
    }

    pub fn has_editor(&self, id: &str) -> bool {
        self.editors.iter().any(|e| e.id == id)
    }

    /// Requested editor if known, else the default editor, else the first entry.
    pub fn editor(&self, requested: Option<&str>) -> Option<&EditorProfile> {
        requested
            .and_then(|id| self.editors.iter().find(|e| e.id == id))
            .or_else(|| self.editors.iter().find(|e| e.id == self.default_editor_id))
            .or_else(|| self.editors.first())
    }
}

fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find(|v| !v.is_null())
}

fn trimmed_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn token_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sanitize one editor entry. Returns None for entries without an id or without
/// any command.
pub fn sanitize_editor(raw: &Value) -> Option<EditorProfile> {
    if !raw.is_object() {
        return None;
    }
    let id = trimmed_str(raw.get("id"))?;
    let display_name =
        trimmed_str(field(raw, &["displayName", "name"])).unwrap_or_else(|| id.clone());
    let primary_command = trimmed_str(field(raw, &["primaryCommand", "command"]));
    let alternate_commands: Vec<String> = field(raw, &["alternateCommands", "alternates"])
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if primary_command.is_none() && alternate_commands.is_empty() {
        return None;
    }

    let templates = field(raw, &["argumentTemplates", "args"]);
    let pick = |key: &str| -> Option<Vec<String>> {
        templates
            .and_then(|t| t.get(key))
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(token_string).collect())
    };
    let argument_templates = ArgTemplates {
        file_with_line: pick("fileWithLine"),
        file: pick("file"),
        file_in_repo: pick("fileInRepo"),
        folder: pick("folder"),
    };

    Some(EditorProfile {
        id,
        display_name,
        primary_command,
        alternate_commands,
        argument_templates,
    })
}

/// Sanitize a list of editors: drop invalid entries and duplicate ids (first wins).
/// Falls back to the built-in editors when nothing survives.
pub fn sanitize_editors(raw: Option<&Value>) -> Vec<EditorProfile> {
    let mut seen = std::collections::HashSet::new();
    let cleaned: Vec<EditorProfile> = raw
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(sanitize_editor)
                .filter(|e| seen.insert(e.id.clone()))
                .collect()
        })
        .unwrap_or_default();
    if cleaned.is_empty() {
        default_editors()
    } else {
        cleaned
    }
}

pub fn sanitize_config(raw: &Value) -> HostConfig {
    let clone_root = raw
        .get("cloneRoot")
        .and_then(Value::as_str)
        .map(|s| trim_trailing_separators(s.trim()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CLONE_ROOT.to_string());
    let default_remote_name = trimmed_str(field(raw, &["defaultRemoteName", "defaultRemote"]))
        .unwrap_or_else(|| DEFAULT_REMOTE_NAME.to_string());
    let group_by_owner = raw.get("groupByOwner").and_then(Value::as_bool) == Some(true);
    let open_mode = raw
        .get("openMode")
        .and_then(Value::as_str)
        .map(OpenMode::parse_lenient)
        .unwrap_or_default();
    let remote_host = trimmed_str(raw.get("remoteHost"))
        .map(|h| h.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_REMOTE_HOST.to_string());
    let editors = sanitize_editors(raw.get("editors"));
    let requested_default = trimmed_str(field(raw, &["defaultEditorId", "defaultEditor"]));
    let default_editor_id = match requested_default {
        Some(id) if editors.iter().any(|e| e.id == id) => id,
        _ => editors
            .first()
            .map(|e| e.id.clone())
            .unwrap_or_else(|| DEFAULT_EDITOR_ID.to_string()),
    };

    HostConfig {
        clone_root,
        default_remote_name,
        group_by_owner,
        open_mode,
        default_editor_id,
        remote_host,
        editors,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in profiles for VS Code, JetBrains Rider, and Cursor.
pub fn default_editors() -> Vec<EditorProfile> {
    vec![
        EditorProfile {
            id: "code".to_string(),
            display_name: "VS Code".to_string(),
            primary_command: Some("code".to_string()),
            alternate_commands: strings(&[
                "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code",
                "/Applications/Visual Studio Code - Insiders.app/Contents/Resources/app/bin/code",
                "code.cmd",
            ]),
            argument_templates: ArgTemplates {
                file_with_line: Some(strings(&["--reuse-window", "-g", "{path}:{line}"])),
                file: Some(strings(&["--reuse-window", "-g", "{path}"])),
                file_in_repo: Some(strings(&["--reuse-window", "-g", "{path}:{line}"])),
                folder: Some(strings(&["-n", "{path}"])),
            },
        },
        EditorProfile {
            id: "rider".to_string(),
            display_name: "JetBrains Rider".to_string(),
            primary_command: Some("open".to_string()),
            alternate_commands: strings(&[
                "/Applications/Rider.app/Contents/MacOS/rider",
                "/Applications/JetBrains Toolbox/Rider.app/Contents/MacOS/rider",
                "C:/Program Files/JetBrains/Rider/bin/rider64.exe",
            ]),
            argument_templates: ArgTemplates {
                file_with_line: Some(strings(&[
                    "-na", "Rider.app", "--args", "--line", "{line}", "{path}",
                ])),
                file: Some(strings(&["-na", "Rider.app", "--args", "{path}"])),
                file_in_repo: Some(strings(&[
                    "-a", "Rider.app", "--args", "--line", "{line}", "{path}",
                ])),
                folder: Some(strings(&["-na", "Rider.app", "--args", "{path}"])),
            },
        },
        EditorProfile {
            id: "cursor".to_string(),
            display_name: "Cursor".to_string(),
            primary_command: Some("cursor".to_string()),
            alternate_commands: strings(&[
                "/Applications/Cursor.app/Contents/MacOS/Cursor",
                "C:/Users/%USERNAME%/AppData/Local/Programs/cursor-app/cursor.exe",
            ]),
            argument_templates: ArgTemplates {
                file_with_line: Some(strings(&["{path}:{line}"])),
                file: Some(strings(&["{path}"])),
                file_in_repo: Some(strings(&["{path}:{line}"])),
                folder: Some(strings(&["{path}"])),
            },
        },
    ]
}

/// Load `~/.github-to-ide/host.env` (or `GH2IDE_ENV_FILE`) into the process
/// environment without overriding variables that are already set.
///
/// Browsers launch native hosts with a minimal environment; this is where users
/// put PATH additions and the log file override.
pub fn load_host_env_file() -> Option<PathBuf> {
    let path = std::env::var_os(HOST_ENV_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".github-to-ide").join("host.env")))?;
    if !path.is_file() {
        return None;
    }
    match dotenvy::from_path(&path) {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load host env file");
            None
        }
    }
}

/// Caller-owned persisted settings: the host config plus caller-only toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerSettings {
    #[serde(flatten)]
    pub host: HostConfig,
    /// Global auto-intercept toggle for automatic (non-forced) triggers.
    pub auto_open: bool,
    /// `owner/repo` (lower-cased) to preferred editor id.
    pub repo_editors: BTreeMap<String, String>,
}

pub fn repo_key(owner: &str, repo: &str) -> Option<String> {
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("{owner}/{repo}").to_lowercase())
}

impl CallerSettings {
    pub fn from_value(raw: &Value) -> Self {
        let repo_editors = raw
            .get("repoEditors")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.to_lowercase(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        CallerSettings {
            host: sanitize_config(raw),
            auto_open: raw.get("autoOpen").and_then(Value::as_bool) == Some(true),
            repo_editors,
        }
    }

    /// Explicit path, else `GH2IDE_CONFIG`, else `~/.config/gh2ide/config.yaml`.
    pub fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(p) = explicit {
            return Some(p.to_path_buf());
        }
        if let Some(v) = std::env::var_os(SETTINGS_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(v));
        }
        home::home_dir().map(|h| h.join(".config").join("gh2ide").join("config.yaml"))
    }

    /// Read settings from YAML (JSON is accepted too). A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Value = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse settings {}", path.display()))?;
        Ok(Self::from_value(&raw))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_yaml::to_string(self).context("failed to serialize settings")?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Per-repo preference if still valid, else the effective default editor.
    pub fn editor_for_repo(&self, owner: &str, repo: &str) -> Option<String> {
        repo_key(owner, repo)
            .and_then(|k| self.repo_editors.get(&k))
            .filter(|id| self.host.has_editor(id))
            .cloned()
            .or_else(|| self.host.editor(None).map(|e| e.id.clone()))
    }

    /// Remember an editor for a repository. Unknown editors are ignored.
    /// Returns true when the stored preference changed.
    pub fn set_repo_editor(&mut self, owner: &str, repo: &str, editor_id: &str) -> bool {
        let Some(key) = repo_key(owner, repo) else {
            return false;
        };
        if !self.host.has_editor(editor_id) {
            return false;
        }
        if self.repo_editors.get(&key).map(String::as_str) == Some(editor_id) {
            return false;
        }
        self.repo_editors.insert(key, editor_id.to_string());
        true
    }
}
