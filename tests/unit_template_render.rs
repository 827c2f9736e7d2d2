use std::path::Path;

use gh2ide::config::ArgTemplates;
use gh2ide::launcher::{render, select_template, TargetKind};

fn toks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn vscode_like() -> ArgTemplates {
    ArgTemplates {
        file_with_line: Some(toks(&["--reuse-window", "-g", "{path}:{line}"])),
        file: Some(toks(&["--reuse-window", "{path}"])),
        file_in_repo: None,
        folder: Some(toks(&["-n", "{folder}"])),
    }
}

#[test]
fn unit_file_with_line_renders_goto_argument() {
    let t = select_template(&vscode_like(), TargetKind::File, Some(42));
    let args = render(&t, Path::new("/a/b.txt"), Some(42));
    assert_eq!(args, toks(&["--reuse-window", "-g", "/a/b.txt:42"]));
}

#[test]
fn unit_missing_line_leaves_trailing_colon() {
    let t = toks(&["{path}:{line}"]);
    assert_eq!(render(&t, Path::new("/a/b.txt"), None), toks(&["/a/b.txt:"]));
}

#[test]
fn unit_empty_tokens_are_dropped() {
    let t = toks(&["--line", "{line}", "{path}"]);
    assert_eq!(
        render(&t, Path::new("/r/x.rs"), None),
        toks(&["--line", "/r/x.rs"])
    );
}

#[test]
fn unit_file_without_line_uses_file_template() {
    let t = select_template(&vscode_like(), TargetKind::File, None);
    assert_eq!(t, toks(&["--reuse-window", "{path}"]));
}

#[test]
fn unit_file_in_repo_falls_back_to_file_template() {
    let t = select_template(&vscode_like(), TargetKind::FileInRepo, None);
    assert_eq!(t, toks(&["--reuse-window", "{path}"]));
}

#[test]
fn unit_folder_template_substitutes_folder_token() {
    let t = select_template(&vscode_like(), TargetKind::Folder, Some(3));
    assert_eq!(render(&t, Path::new("/repo"), Some(3)), toks(&["-n", "/repo"]));
}

#[test]
fn unit_defaults_apply_without_templates() {
    let none = ArgTemplates::default();
    assert_eq!(
        select_template(&none, TargetKind::Folder, Some(1)),
        toks(&["{path}"])
    );
    assert_eq!(select_template(&none, TargetKind::File, None), toks(&["{path}"]));
    assert_eq!(
        select_template(&none, TargetKind::FileInRepo, Some(9)),
        toks(&["-g", "{path}:{line}"])
    );
    let empty = ArgTemplates {
        folder: Some(Vec::new()),
        ..ArgTemplates::default()
    };
    assert_eq!(
        select_template(&empty, TargetKind::Folder, None),
        toks(&["{path}"])
    );
}
