mod cli;
mod doctor;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use gh2ide::caller::channels::{desktop_cascade, StderrNotices};
use gh2ide::caller::{
    FollowUp, Handled, HostTransport, InterceptOptions, InterceptOutcome, Interceptor,
    NativeHostClient, SkipReason, Trigger,
};
use gh2ide::config::load_host_env_file;
use gh2ide::{
    color_enabled_stderr, log_error_stderr, log_info_stderr, log_warn_stderr, log_file_path,
    exit_code_for_io_error, set_color_mode, telemetry_init, CallerSettings, Dispatcher, FrameError,
    OpenMode,
};

fn run_serve(origin: &[String], verbose: bool) -> ExitCode {
    // The env file may set GH2IDE_LOG_FILE, so it is read before logging starts.
    let env_file = load_host_env_file();
    let log_file = telemetry_init(log_file_path(), if verbose { "debug" } else { "info" });
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        origin = ?origin,
        log_file = ?log_file,
        env_file = ?env_file,
        "native host started"
    );

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut dispatcher: Dispatcher = Dispatcher::default();
    match dispatcher.serve(stdin, stdout) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "native host stopped");
            match &e {
                FrameError::Io(ioe) => ExitCode::from(exit_code_for_io_error(ioe)),
                _ => ExitCode::from(1),
            }
        }
    }
}

fn host_client(host_bin: Option<PathBuf>, verbose: bool) -> anyhow::Result<NativeHostClient> {
    let client = match host_bin {
        Some(p) => NativeHostClient::new(p),
        None => NativeHostClient::current_exe()?,
    };
    Ok(client.inherit_stderr(verbose))
}

fn describe_follow_up(what: &str, f: &FollowUp) -> (bool, String) {
    match f {
        FollowUp::Completed => (true, format!("{what} completed and opened")),
        FollowUp::Declined => (false, format!("{what} declined; nothing opened")),
        FollowUp::OpenFailed => (false, format!("{what} completed but opening failed")),
        FollowUp::Failed(m) => (false, format!("{what} failed: {m}")),
        FollowUp::NoResponse => (false, "native host did not respond".to_string()),
    }
}

struct OpenArgs {
    url: String,
    editor: Option<String>,
    mode: Option<String>,
    force: bool,
    config: Option<PathBuf>,
    remember_editor: bool,
    host_bin: Option<PathBuf>,
}

fn run_open(args: OpenArgs, verbose: bool) -> ExitCode {
    let use_err = color_enabled_stderr();
    let settings_path = CallerSettings::settings_path(args.config.as_deref());
    let settings = match CallerSettings::load(settings_path.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            log_error_stderr(use_err, &format!("{e:#}"));
            return ExitCode::from(1);
        }
    };
    let client = match host_client(args.host_bin, verbose) {
        Ok(c) => c,
        Err(e) => {
            log_error_stderr(use_err, &format!("{e:#}"));
            return ExitCode::from(1);
        }
    };

    let mut interceptor = Interceptor::new(settings, desktop_cascade(), client, StderrNotices);
    let opts = InterceptOptions {
        trigger: if args.force {
            Trigger::Forced
        } else {
            Trigger::Automatic
        },
        tab: Some("cli".to_string()),
        editor_id: args.editor,
        open_mode: args.mode.as_deref().map(OpenMode::parse_lenient),
        remember_editor: args.remember_editor,
    };
    let outcome = interceptor.intercept(&args.url, &opts);

    if interceptor.take_settings_dirty() {
        if let Some(p) = &settings_path {
            if let Err(e) = interceptor.settings().save(p) {
                log_warn_stderr(use_err, &format!("failed to save editor preference: {e:#}"));
            }
        }
    }

    match outcome {
        InterceptOutcome::Skipped(reason) => {
            let hint = match reason {
                SkipReason::AutoOpenDisabled => " (auto open is disabled; pass --force)",
                SkipReason::NotHosted => " (URL is not on the configured remote host)",
                _ => "",
            };
            log_warn_stderr(use_err, &format!("not opened: {reason}{hint}"));
            ExitCode::from(2)
        }
        InterceptOutcome::Handled {
            result, editor_id, ..
        } => {
            let (ok, message) = match &result {
                Handled::Opened => (true, format!("opened in {editor_id}")),
                Handled::NeedsClone(f) => describe_follow_up("clone", f),
                Handled::WrongBranch(f) => describe_follow_up("branch switch", f),
                Handled::Error(m) => (false, m.clone()),
                Handled::NoResponse => (false, "native host did not respond".to_string()),
                Handled::Unexpected(s) => (false, format!("unexpected host status {s}")),
            };
            if ok {
                log_info_stderr(use_err, &message);
                ExitCode::SUCCESS
            } else {
                // Host errors and failed follow-ups were already reported as notices.
                if matches!(
                    result,
                    Handled::NeedsClone(FollowUp::Declined)
                        | Handled::WrongBranch(FollowUp::Declined)
                        | Handled::Unexpected(_)
                ) {
                    log_warn_stderr(use_err, &message);
                }
                tracing::debug!(result = ?result, "open did not complete");
                ExitCode::from(1)
            }
        }
    }
}

fn run_ping(host_bin: Option<PathBuf>, verbose: bool) -> ExitCode {
    let use_err = color_enabled_stderr();
    let client = match host_client(host_bin, verbose) {
        Ok(c) => c,
        Err(e) => {
            log_error_stderr(use_err, &format!("{e:#}"));
            return ExitCode::from(1);
        }
    };
    if client.is_connected() {
        log_info_stderr(use_err, &format!("host {} answered PONG", client.program().display()));
        ExitCode::SUCCESS
    } else {
        log_error_stderr(use_err, &format!("host {} did not answer", client.program().display()));
        ExitCode::from(1)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        set_color_mode(mode);
    }

    match cli.command {
        None | Some(Command::Serve) => run_serve(&cli.origin, cli.verbose),
        Some(cmd) => {
            telemetry_init(None, if cli.verbose { "debug" } else { "warn" });
            match cmd {
                Command::Open {
                    url,
                    editor,
                    mode,
                    force,
                    config,
                    remember_editor,
                    host_bin,
                } => run_open(
                    OpenArgs {
                        url,
                        editor,
                        mode,
                        force,
                        config,
                        remember_editor,
                        host_bin,
                    },
                    cli.verbose,
                ),
                Command::Ping { host_bin } => run_ping(host_bin, cli.verbose),
                Command::Doctor { config } => {
                    if doctor::run_doctor(config.as_deref()) {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(1)
                    }
                }
                Command::Serve => run_serve(&cli.origin, cli.verbose),
            }
        }
    }
}
