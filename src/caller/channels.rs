//! Concrete confirmation channels and notice sinks for a desktop session.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::caller::confirm::{
    ConfirmChannel, ConfirmationArbitrator, NotificationChannel, Notifier, Prompt, PromptEvents,
    PROMPT_TIMEOUT,
};
use crate::caller::intercept::NoticeSink;
use crate::color::{color_enabled_stderr, log_error_stderr, log_info_stderr, paint};
use crate::util::exec::{is_not_found, is_timeout};
use crate::util::{ExecOutput, ExecRequest, ExecService};

pub const APP_NAME: &str = "gh2ide";

/// Ask on the controlling terminal. Unavailable unless stdin and stderr are TTYs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl ConfirmChannel for TerminalConfirm {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn confirm(&self, prompt: &Prompt) -> Option<bool> {
        if !(atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stderr)) {
            return None;
        }
        let use_err = color_enabled_stderr();
        eprintln!("{}", paint(use_err, "\x1b[33;1m", &prompt.title));
        eprintln!("{}", prompt.message);
        eprint!(
            "{}",
            paint(
                use_err,
                "\x1b[90m",
                &format!("{} [y/N]: ", prompt.confirm_text)
            )
        );
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let answer = line.trim().to_ascii_lowercase();
                Some(
                    answer == "y"
                        || answer == "yes"
                        || answer == prompt.confirm_text.to_ascii_lowercase(),
                )
            }
        }
    }
}

fn applescript_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Blocking desktop dialog: `zenity --question` on Linux, `osascript` on macOS.
///
/// Exit 0 is yes and exit 1 is no; anything else means the channel is
/// unavailable. A dialog left unanswered past the timeout is a no.
#[derive(Debug, Clone)]
pub struct CommandConfirm {
    exec: ExecService,
}

impl Default for CommandConfirm {
    fn default() -> Self {
        Self::new(PROMPT_TIMEOUT)
    }
}

impl CommandConfirm {
    pub fn new(timeout: Duration) -> Self {
        Self {
            exec: ExecService::new(timeout),
        }
    }

    fn request(prompt: &Prompt) -> Option<ExecRequest> {
        if cfg!(target_os = "macos") {
            let script = format!(
                "display dialog {} with title {} buttons {{{}, {}}} default button {} cancel button {}",
                applescript_quote(&prompt.message),
                applescript_quote(&prompt.title),
                applescript_quote(&prompt.cancel_text),
                applescript_quote(&prompt.confirm_text),
                applescript_quote(&prompt.confirm_text),
                applescript_quote(&prompt.cancel_text),
            );
            Some(ExecRequest::new("osascript").args(["-e", script.as_str()]))
        } else if cfg!(target_os = "linux") {
            let has_display = ["DISPLAY", "WAYLAND_DISPLAY"]
                .iter()
                .any(|k| std::env::var_os(k).is_some_and(|v| !v.is_empty()));
            if !has_display {
                return None;
            }
            Some(ExecRequest::new("zenity").args([
                "--question".to_string(),
                format!("--title={}", prompt.title),
                format!("--text={}", prompt.message),
                format!("--ok-label={}", prompt.confirm_text),
                format!("--cancel-label={}", prompt.cancel_text),
            ]))
        } else {
            None
        }
    }
}

impl ConfirmChannel for CommandConfirm {
    fn name(&self) -> &'static str {
        "dialog"
    }

    fn confirm(&self, prompt: &Prompt) -> Option<bool> {
        let req = Self::request(prompt)?.capture_output(true);
        dialog_answer(self.exec.run(req))
    }
}

/// Map a dialog run to an answer: exit 0 is yes, 1 is no, and an unanswered
/// dialog that hit the prompt timeout is no. Any other fault leaves the
/// channel unavailable so the cascade moves on.
fn dialog_answer(result: anyhow::Result<ExecOutput>) -> Option<bool> {
    match result {
        Ok(out) => match out.status.code() {
            Some(0) => Some(true),
            Some(1) => Some(false),
            code => {
                tracing::debug!(status = ?code, stderr = %out.stderr.trim(), "dialog unavailable");
                None
            }
        },
        Err(e) if is_timeout(&e) => {
            tracing::info!("dialog timed out; treating as declined");
            Some(false)
        }
        Err(e) => {
            if !is_not_found(&e) {
                tracing::warn!(error = %format!("{e:#}"), "dialog failed; trying next channel");
            }
            None
        }
    }
}

/// Desktop notifications through `notify-send --wait` with two actions.
///
/// A helper thread waits for notify-send to print the chosen action key and
/// reports it. Clearing a prompt terminates the waiting notify-send.
#[derive(Debug, Default, Clone)]
pub struct NotifySendNotifier {
    children: Arc<Mutex<HashMap<String, u32>>>,
}

const ACTION_CONFIRM: &str = "confirm";
const ACTION_CANCEL: &str = "cancel";

impl NotifySendNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for NotifySendNotifier {
    fn show_prompt(&self, id: &str, prompt: &Prompt, events: PromptEvents) -> Result<(), String> {
        let mut child = Command::new("notify-send")
            .arg(format!("--app-name={APP_NAME}"))
            .arg("--urgency=critical")
            .arg("--wait")
            .arg("-A")
            .arg(format!("{ACTION_CONFIRM}={}", prompt.confirm_text))
            .arg("-A")
            .arg(format!("{ACTION_CANCEL}={}", prompt.cancel_text))
            .arg(&prompt.title)
            .arg(&prompt.message)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to run notify-send: {e}"))?;
        let stdout = child.stdout.take();
        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), child.id());

        let children = Arc::clone(&self.children);
        let id = id.to_string();
        thread::spawn(move || {
            let mut action = String::new();
            if let Some(out) = stdout {
                let _ = io::BufReader::new(out).read_line(&mut action);
            }
            let _ = child.wait();
            children
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&id);
            match action.trim() {
                ACTION_CONFIRM => events.button_clicked(0),
                ACTION_CANCEL => events.button_clicked(1),
                _ => events.closed(),
            };
        });
        Ok(())
    }

    fn clear(&self, id: &str) {
        let pid = self
            .children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            if let Some(raw) = pid.and_then(|p| i32::try_from(p).ok()) {
                let _ = kill(Pid::from_raw(raw), Signal::SIGTERM);
            }
        }
        #[cfg(not(unix))]
        let _ = pid;
    }
}

/// User-facing notices on stderr, color-aware.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotices;

impl NoticeSink for StderrNotices {
    fn notice(&self, message: &str) {
        log_info_stderr(color_enabled_stderr(), message);
    }

    fn error(&self, message: &str) {
        log_error_stderr(color_enabled_stderr(), message);
    }
}

/// Terminal prompt, then desktop dialog, then notification.
pub fn desktop_cascade() -> ConfirmationArbitrator {
    ConfirmationArbitrator::new(vec![
        Box::new(TerminalConfirm),
        Box::new(CommandConfirm::default()),
        Box::new(NotificationChannel::new(NotifySendNotifier::new())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::exec::TimedOut;

    #[test]
    fn applescript_strings_are_escaped() {
        assert_eq!(applescript_quote(r#"a "b" \c"#), r#""a \"b\" \\c""#);
    }

    #[test]
    fn dialog_spawn_faults_fall_through() {
        let denied = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied))
            .context("failed to spawn zenity");
        assert_eq!(dialog_answer(Err(denied)), None);
        let missing = anyhow::Error::new(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(dialog_answer(Err(missing)), None);
    }

    #[test]
    fn dialog_timeout_declines() {
        let timed_out = anyhow::Error::new(TimedOut {
            program: "zenity".into(),
            after: PROMPT_TIMEOUT,
        });
        assert_eq!(dialog_answer(Err(timed_out)), Some(false));
    }
}
