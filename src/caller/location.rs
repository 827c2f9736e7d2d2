//! Hosted page URL → repository location.
//!
//! Understands `https://<host>/<owner>/<repo>[/(blob|tree)/<ref>/<path...>][#L<n>]`.

use std::fmt;

use url::Url;

use crate::git::is_commit_sha;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewKind {
    #[default]
    Repo,
    /// A file view.
    Blob,
    /// A directory view.
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostedLocation {
    pub owner: String,
    pub repo: String,
    pub kind: ViewKind,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub file_path: Option<String>,
    pub line: Option<u32>,
}

impl HostedLocation {
    /// Interception only proceeds when both owner and repo are known.
    pub fn has_repo(&self) -> bool {
        !self.owner.is_empty() && !self.repo.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    Invalid(String),
    NotHosted(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::Invalid(m) => write!(f, "invalid URL: {m}"),
            LocationError::NotHosted(h) => write!(f, "not a hosted repository URL: {h}"),
        }
    }
}

impl std::error::Error for LocationError {}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// First `L<digits>` anywhere in the fragment (`L10`, `L10C5`, `L10-L20`).
/// Values past `u32::MAX` saturate.
fn line_from_fragment(fragment: &str) -> Option<u32> {
    let digits = fragment.match_indices('L').find_map(|(i, _)| {
        let rest = &fragment[i + 1..];
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })?;
    Some(digits.parse().unwrap_or(u32::MAX))
}

pub fn parse_hosted_url(raw: &str, remote_host: &str) -> Result<HostedLocation, LocationError> {
    let u = Url::parse(raw.trim()).map_err(|e| LocationError::Invalid(e.to_string()))?;
    let host = u.host_str().unwrap_or_default();
    if u.scheme() != "https" || !host.eq_ignore_ascii_case(remote_host) {
        return Err(LocationError::NotHosted(format!("{}://{}", u.scheme(), host)));
    }

    let parts: Vec<String> = u
        .path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).map(decode).collect())
        .unwrap_or_default();
    let mut loc = HostedLocation::default();
    let mut it = parts.into_iter();
    loc.owner = it.next().unwrap_or_default();
    loc.repo = it.next().unwrap_or_default();
    if !loc.has_repo() {
        return Ok(loc);
    }

    match it.next().as_deref() {
        Some(kind @ ("blob" | "tree")) => {
            loc.kind = if kind == "blob" {
                ViewKind::Blob
            } else {
                ViewKind::Tree
            };
            if let Some(r) = it.next() {
                if is_commit_sha(&r) {
                    loc.commit = Some(r);
                } else {
                    loc.branch = Some(r);
                }
            }
            let rest: Vec<String> = it.collect();
            if !rest.is_empty() {
                loc.file_path = Some(rest.join("/"));
            }
        }
        _ => loc.kind = ViewKind::Repo,
    }
    loc.line = u.fragment().and_then(line_from_fragment);
    Ok(loc)
}
