use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Accept only the two open modes the host understands.
fn validate_mode(s: &str) -> Result<String, String> {
    match s {
        "repo" | "file" => Ok(s.to_string()),
        _ => Err("must be one of repo, file".to_string()),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "gh2ide",
    version,
    about = "Open hosted repository links in a local editor (native messaging host and CLI)",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// Caller origin arguments passed by the browser (e.g. chrome-extension://<id>/); runs the host loop
    #[arg(value_name = "ORIGIN")]
    pub(crate) origin: Vec<String>,

    /// Window handle passed by Chrome on Windows; ignored
    #[arg(long = "parent-window", hide = true)]
    pub(crate) parent_window: Option<String>,

    /// Colorize CLI output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<gh2ide::ColorMode>,

    /// Verbose diagnostics (debug level logging)
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Run the native messaging host loop on stdin/stdout
    Serve,
    /// Resolve a hosted URL and open it, cloning or switching branches after confirmation
    Open {
        /// Hosted page URL (repository, tree or blob view)
        url: String,
        /// Editor id to use instead of the configured preference
        #[arg(long)]
        editor: Option<String>,
        /// Open mode override: repo|file
        #[arg(long, value_parser = validate_mode)]
        mode: Option<String>,
        /// Explicit user action: bypass the auto-open toggle and de-duplication
        #[arg(long)]
        force: bool,
        /// Caller settings file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Remember --editor as this repository's preferred editor
        #[arg(long = "remember-editor", requires = "editor")]
        remember_editor: bool,
        /// Host executable to talk to (defaults to this binary)
        #[arg(long = "host-bin")]
        host_bin: Option<PathBuf>,
    },
    /// Check that a host answers PONG
    Ping {
        /// Host executable to talk to (defaults to this binary)
        #[arg(long = "host-bin")]
        host_bin: Option<PathBuf>,
    },
    /// Run diagnostics to check environment and configuration
    Doctor {
        /// Caller settings file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
