//! Executable discovery for editor command candidates.

use std::collections::HashMap;
use std::path::PathBuf;

use which::which;

use crate::util::{absolutize, expand_tilde, is_path_like};

/// Resolve one candidate without caching.
///
/// Path-like candidates are made absolute without checking existence (spawn
/// reports that). Bare names go through PATH lookup; `None` when not found.
pub fn lookup(candidate: &str) -> Option<PathBuf> {
    if is_path_like(candidate) {
        return Some(absolutize(&expand_tilde(candidate)));
    }
    which(candidate).ok()
}

/// Per-process cache of resolved candidates, keyed by (editor id, candidate).
///
/// Entries are never invalidated.
#[derive(Debug, Default)]
pub struct CandidateCache {
    resolved: HashMap<(String, String), PathBuf>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved path for `candidate`. A bare name PATH lookup could not find is
    /// returned unchanged so the spawn attempt reports it as not found.
    pub fn resolve(&mut self, editor_id: &str, candidate: &str) -> PathBuf {
        let key = (editor_id.to_string(), candidate.to_string());
        if let Some(p) = self.resolved.get(&key) {
            return p.clone();
        }
        let path = lookup(candidate).unwrap_or_else(|| PathBuf::from(candidate));
        tracing::debug!(editor = editor_id, candidate, resolved = %path.display(), "resolved editor candidate");
        self.resolved.insert(key, path.clone());
        path
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
