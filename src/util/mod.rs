#![allow(clippy::module_name_repetitions)]
//! Small utilities: process execution, ordered fallbacks, ids, path helpers.

pub mod exec;
pub mod fallback;
pub mod id;

pub use exec::{ExecOutput, ExecRequest, ExecService};
pub use fallback::{first_ok, first_some};

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(p: &str) -> PathBuf {
    if p == "~" {
        if let Some(home) = home::home_dir() {
            return home;
        }
    } else if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        if let Some(home) = home::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(p)
}

/// Strip trailing `/` and `\` separators; a bare root is kept as-is.
pub fn trim_trailing_separators(p: &str) -> String {
    let trimmed = p.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !p.is_empty() {
        p[..1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Does the candidate look like a path rather than a bare command name?
pub fn is_path_like(candidate: &str) -> bool {
    candidate.contains('/') || candidate.contains('\\')
}

/// Make a path absolute against the current directory without touching the filesystem.
pub fn absolutize(p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(p))
            .unwrap_or_else(|_| p.to_path_buf())
    }
}
