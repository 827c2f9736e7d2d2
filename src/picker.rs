//! Native directory picker behind the `chooseCloneRoot` action.

use std::path::PathBuf;

use crate::errors::HostError;
use crate::protocol::HostResponse;
use crate::util::exec::is_not_found;
use crate::util::{trim_trailing_separators, ExecRequest, ExecService};

pub const PICKER_TITLE: &str = "Choose clone root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Chosen(PathBuf),
    Cancelled,
}

pub trait DirectoryPicker {
    fn pick(&self) -> Result<PickOutcome, HostError>;
}

/// Render a pick result as CHOSEN, CANCELLED or ERROR.
pub fn pick_response<P: DirectoryPicker + ?Sized>(picker: &P) -> HostResponse {
    match picker.pick() {
        Ok(PickOutcome::Chosen(path)) => HostResponse::Chosen { path },
        Ok(PickOutcome::Cancelled) => HostResponse::Cancelled,
        Err(e) => {
            tracing::warn!(error = %e, "directory picker failed");
            HostResponse::error(e.to_string())
        }
    }
}

/// Platform dialog: osascript on macOS, zenity or kdialog on Linux, a
/// WinForms dialog through PowerShell on Windows.
#[derive(Debug, Default, Clone)]
pub struct NativePicker {
    exec: ExecService,
}

struct PickerCommand {
    program: &'static str,
    args: Vec<String>,
    /// Exit code that means the user dismissed the dialog.
    cancel_code: Option<i32>,
}

impl NativePicker {
    pub fn new(exec: ExecService) -> Self {
        Self { exec }
    }

    /// `Ok(None)` when the picker program is not installed.
    fn run(&self, cmd: &PickerCommand) -> Result<Option<PickOutcome>, HostError> {
        let req = ExecRequest::new(cmd.program)
            .args(&cmd.args)
            .capture_output(true);
        let out = match self.exec.run(req) {
            Ok(out) => out,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(HostError::Message(format!("{e:#}"))),
        };
        let chosen = trim_trailing_separators(out.stdout.trim());
        if out.success() {
            if chosen.is_empty() {
                return Ok(Some(PickOutcome::Cancelled));
            }
            return Ok(Some(PickOutcome::Chosen(PathBuf::from(chosen))));
        }
        let stderr = out.stderr.trim();
        // osascript reports a user cancel as error -128.
        if out.status.code() == cmd.cancel_code || stderr.contains("(-128)") {
            return Ok(Some(PickOutcome::Cancelled));
        }
        Err(HostError::Message(if stderr.is_empty() {
            format!("{} failed", cmd.program)
        } else {
            stderr.to_string()
        }))
    }
}

fn commands() -> Vec<PickerCommand> {
    if cfg!(target_os = "macos") {
        vec![PickerCommand {
            program: "osascript",
            args: vec![
                "-e".to_string(),
                format!("POSIX path of (choose folder with prompt \"{PICKER_TITLE}\")"),
            ],
            cancel_code: None,
        }]
    } else if cfg!(windows) {
        vec![PickerCommand {
            program: "powershell",
            args: vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!(
                    "Add-Type -AssemblyName System.Windows.Forms; \
                     $d = New-Object System.Windows.Forms.FolderBrowserDialog; \
                     $d.Description = '{PICKER_TITLE}'; \
                     if ($d.ShowDialog() -eq 'OK') {{ $d.SelectedPath }}"
                ),
            ],
            cancel_code: None,
        }]
    } else if cfg!(target_os = "linux") {
        vec![
            PickerCommand {
                program: "zenity",
                args: vec![
                    "--file-selection".to_string(),
                    "--directory".to_string(),
                    format!("--title={PICKER_TITLE}"),
                ],
                cancel_code: Some(1),
            },
            PickerCommand {
                program: "kdialog",
                args: vec![
                    "--getexistingdirectory".to_string(),
                    home::home_dir()
                        .map(|h| h.to_string_lossy().into_owned())
                        .unwrap_or_else(|| ".".to_string()),
                    "--title".to_string(),
                    PICKER_TITLE.to_string(),
                ],
                cancel_code: Some(1),
            },
        ]
    } else {
        Vec::new()
    }
}

impl DirectoryPicker for NativePicker {
    fn pick(&self) -> Result<PickOutcome, HostError> {
        let cmds = commands();
        if cmds.is_empty() {
            return Err(HostError::Message(
                "chooseCloneRoot is not supported on this platform".to_string(),
            ));
        }
        for cmd in &cmds {
            if let Some(outcome) = self.run(cmd)? {
                return Ok(outcome);
            }
        }
        let names: Vec<&str> = cmds.iter().map(|c| c.program).collect();
        Err(HostError::Message(format!(
            "no directory picker available (tried: {})",
            names.join(", ")
        )))
    }
}
