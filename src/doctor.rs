use std::path::Path;

use gh2ide::config::{load_host_env_file, CallerSettings};
use gh2ide::launcher::lookup;
use gh2ide::{color_enabled_stderr, git, log_file_path, paint};

fn status(use_err: bool, ok: bool, text: &str) -> String {
    if ok {
        paint(use_err, "\x1b[32;1m", text)
    } else {
        paint(use_err, "\x1b[31;1m", text)
    }
}

pub(crate) fn run_doctor(config: Option<&Path>) -> bool {
    let use_err = color_enabled_stderr();
    eprintln!("gh2ide doctor");
    eprintln!();
    for (key, value) in gh2ide::build_info() {
        eprintln!("  {key:<11} {value}");
    }
    eprintln!(
        "  {:<11} {} / {}",
        "host",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    eprintln!();

    let env_file = load_host_env_file();
    eprintln!(
        "  host env file: {}",
        env_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    eprintln!(
        "  log file:      {}",
        log_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(disabled)".to_string())
    );

    let git_ok = git::git_available();
    let git_version = git::git_stdout_str(None, &["--version"]).unwrap_or_default();
    eprintln!(
        "  git:           {} {}",
        status(use_err, git_ok, if git_ok { "found" } else { "not found" }),
        git_version
    );
    eprintln!();

    let path = CallerSettings::settings_path(config);
    let settings = match CallerSettings::load(path.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("  settings: {}", status(use_err, false, &format!("{e:#}")));
            CallerSettings::default()
        }
    };
    if let Some(p) = &path {
        let state = if p.exists() { "" } else { " (missing; defaults)" };
        eprintln!("  settings:      {}{}", p.display(), state);
    }
    let host = &settings.host;
    eprintln!("  clone root:    {}", host.clone_root);
    eprintln!("  group by owner: {}", host.group_by_owner);
    eprintln!("  open mode:     {}", host.open_mode.as_str());
    eprintln!("  auto open:     {}", settings.auto_open);
    eprintln!();

    let mut any_editor = false;
    for editor in &host.editors {
        let marker = if editor.id == host.default_editor_id {
            " (default)"
        } else {
            ""
        };
        eprintln!("  editor {} [{}]{}", editor.id, editor.display_name, marker);
        for candidate in editor.candidates() {
            let found = lookup(&candidate).filter(|p| p.exists());
            any_editor |= found.is_some();
            match found {
                Some(p) => eprintln!(
                    "    {} {} -> {}",
                    status(use_err, true, "ok"),
                    candidate,
                    p.display()
                ),
                None => eprintln!("    {} {}", status(use_err, false, "--"), candidate),
            }
        }
    }
    eprintln!();
    eprintln!("doctor: completed diagnostics.");
    git_ok && any_editor
}
