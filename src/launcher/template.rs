//! Argument template selection and rendering.

use std::path::Path;

use crate::config::ArgTemplates;

/// What an editor invocation should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Folder,
    File,
    /// Open a file and treat its containing repository as the workspace.
    FileInRepo,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Folder => "folder",
            TargetKind::File => "file",
            TargetKind::FileInRepo => "fileInRepo",
        }
    }
}

fn non_empty(t: Option<&Vec<String>>) -> Option<&Vec<String>> {
    t.filter(|v| !v.is_empty())
}

/// Fallback used when a profile has no template for the requested kind.
pub fn default_template(kind: TargetKind, line: Option<u32>) -> Vec<String> {
    match (kind, line) {
        (TargetKind::Folder, _) | (_, None) => vec!["{path}".to_string()],
        (_, Some(_)) => vec!["-g".to_string(), "{path}:{line}".to_string()],
    }
}

/// Pick the template for `kind`:
/// `fileWithLine` when a line is given, then `fileInRepo`/`file`, then the default.
pub fn select_template(templates: &ArgTemplates, kind: TargetKind, line: Option<u32>) -> Vec<String> {
    let chosen = match kind {
        TargetKind::Folder => non_empty(templates.folder.as_ref()),
        TargetKind::File => line
            .and(non_empty(templates.file_with_line.as_ref()))
            .or_else(|| non_empty(templates.file.as_ref())),
        TargetKind::FileInRepo => line
            .and(non_empty(templates.file_with_line.as_ref()))
            .or_else(|| non_empty(templates.file_in_repo.as_ref()))
            .or_else(|| non_empty(templates.file.as_ref())),
    };
    chosen
        .cloned()
        .unwrap_or_else(|| default_template(kind, line))
}

/// Substitute `{path}`, `{line}` and `{folder}` in every token.
///
/// Tokens that render to the empty string are dropped; partially empty tokens
/// such as `"{path}:{line}"` without a line are kept (`"/a/b.txt:"`).
pub fn render(template: &[String], path: &Path, line: Option<u32>) -> Vec<String> {
    let path = path.to_string_lossy();
    let line = line.map(|n| n.to_string()).unwrap_or_default();
    template
        .iter()
        .map(|tok| {
            tok.replace("{path}", &path)
                .replace("{line}", &line)
                .replace("{folder}", &path)
        })
        .filter(|tok| !tok.is_empty())
        .collect()
}
