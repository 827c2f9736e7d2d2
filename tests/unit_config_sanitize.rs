use std::path::PathBuf;

use gh2ide::config::{sanitize_config, DEFAULT_CLONE_ROOT};
use gh2ide::{CallerSettings, HostConfig, OpenMode};
use serde_json::json;

#[test]
fn unit_empty_config_uses_builtin_defaults() {
    let cfg = sanitize_config(&json!({}));
    assert_eq!(cfg.clone_root, DEFAULT_CLONE_ROOT);
    assert_eq!(cfg.default_remote_name, "origin");
    assert!(!cfg.group_by_owner);
    assert_eq!(cfg.open_mode, OpenMode::Repo);
    assert_eq!(cfg.remote_host, "github.com");
    let ids: Vec<_> = cfg.editors.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["code", "rider", "cursor"]);
    assert_eq!(cfg.default_editor_id, "code");
    assert_eq!(cfg, HostConfig::default());
}

#[test]
fn unit_invalid_and_duplicate_editors_are_dropped() {
    let cfg = sanitize_config(&json!({
        "editors": [
            {"id": "vim", "command": "vim", "args": {"fileWithLine": ["+{line}", "{path}"]}},
            {"id": "vim", "command": "nvim"},
            {"id": "", "command": "x"},
            {"name": "no id", "command": "x"},
            {"id": "nocmd"},
            "garbage"
        ],
        "defaultEditorId": "nocmd",
        "openMode": "file"
    }));
    assert_eq!(cfg.editors.len(), 1);
    assert_eq!(cfg.editors[0].primary_command.as_deref(), Some("vim"));
    assert_eq!(cfg.default_editor_id, "vim", "unknown default falls back to first editor");
    assert_eq!(cfg.open_mode, OpenMode::File);
}

#[test]
fn unit_all_invalid_editors_restore_builtins() {
    let cfg = sanitize_config(&json!({"editors": [{"id": "x"}]}));
    assert_eq!(cfg.editors.len(), 3);
}

#[test]
fn unit_editor_lookup_falls_back_to_default() {
    let cfg = sanitize_config(&json!({"defaultEditorId": "cursor"}));
    assert_eq!(cfg.editor(Some("rider")).map(|e| e.id.as_str()), Some("rider"));
    assert_eq!(cfg.editor(Some("emacs")).map(|e| e.id.as_str()), Some("cursor"));
    assert_eq!(cfg.editor(None).map(|e| e.id.as_str()), Some("cursor"));
}

#[test]
fn unit_repo_location_and_remote() {
    let cfg = sanitize_config(&json!({
        "cloneRoot": "/work/src//",
        "groupByOwner": true,
        "remoteHost": "git.example.com/"
    }));
    assert_eq!(
        cfg.repo_location("acme", "widgets"),
        PathBuf::from("/work/src/acme/widgets")
    );
    assert_eq!(
        cfg.remote_url("acme", "widgets"),
        "https://git.example.com/acme/widgets.git"
    );
}

#[test]
fn unit_clone_root_is_whitespace_trimmed() {
    let cfg = sanitize_config(&json!({"cloneRoot": "  /src/ "}));
    assert_eq!(cfg.clone_root, "/src");
    assert_eq!(cfg.repo_location("acme", "widgets"), PathBuf::from("/src/widgets"));
    let blank = sanitize_config(&json!({"cloneRoot": "   "}));
    assert_eq!(blank.clone_root, DEFAULT_CLONE_ROOT);
}

#[test]
fn unit_caller_settings_roundtrip_through_yaml() {
    let td = tempfile::tempdir().expect("tmpdir");
    let path = td.path().join("nested").join("config.yaml");
    assert_eq!(
        CallerSettings::load(Some(&path)).expect("missing file"),
        CallerSettings::default()
    );

    let mut s = CallerSettings::from_value(&json!({
        "cloneRoot": "/src",
        "autoOpen": true,
        "repoEditors": {"Acme/Widgets": "rider"}
    }));
    assert!(s.auto_open);
    assert_eq!(s.editor_for_repo("acme", "widgets").as_deref(), Some("rider"));
    assert_eq!(s.editor_for_repo("acme", "other").as_deref(), Some("code"));

    assert!(s.set_repo_editor("acme", "other", "cursor"));
    assert!(!s.set_repo_editor("acme", "other", "cursor"), "unchanged");
    assert!(!s.set_repo_editor("acme", "other", "emacs"), "unknown editor");
    s.save(&path).expect("save");

    let back = CallerSettings::load(Some(&path)).expect("load");
    assert_eq!(back.host.clone_root, "/src");
    assert!(back.auto_open);
    assert_eq!(back.editor_for_repo("ACME", "OTHER").as_deref(), Some("cursor"));
    assert_eq!(back, s);
}

#[test]
fn unit_settings_accept_json_content() {
    let td = tempfile::tempdir().expect("tmpdir");
    let path = td.path().join("config.json");
    std::fs::write(&path, r#"{"openMode": "file", "groupByOwner": true}"#).unwrap();
    let s = CallerSettings::load(Some(&path)).expect("json is yaml");
    assert_eq!(s.host.open_mode, OpenMode::File);
    assert!(s.host.group_by_owner);
    assert!(!s.auto_open);
}
