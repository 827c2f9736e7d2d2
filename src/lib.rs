#![allow(clippy::module_name_repetitions)]
//! gh2ide: open hosted repository links in a local editor.
//!
//! Two halves share this crate:
//! - the native host (`serve`): a framed stdio loop that resolves repositories,
//!   clones or switches branches on request, and launches editors;
//! - the caller: request gating, confirmation prompts, and the intercept flow
//!   that talks to the host.

pub mod caller;
pub mod color;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod git;
pub mod launcher;
pub mod picker;
pub mod protocol;
pub mod resolver;
pub mod telemetry;
pub mod util;

pub use color::{
    color_enabled_stderr, log_error_stderr, log_info_stderr,
    log_warn_stderr, paint, set_color_mode, ColorMode,
};
pub use config::{CallerSettings, EditorProfile, HostConfig, OpenMode};
pub use dispatcher::Dispatcher;
pub use errors::{
    display_for_host_error, exit_code_for_host_error, exit_code_for_io_error, FrameError,
    HostError, LaunchError,
};
pub use launcher::{LaunchTarget, Launcher, TargetKind};
pub use protocol::{HostRequest, HostResponse};
pub use telemetry::{log_file_path, telemetry_init};

/// Build metadata baked in by build.rs.
pub fn build_info() -> [(&'static str, &'static str); 5] {
    [
        ("version", env!("CARGO_PKG_VERSION")),
        ("build date", env!("GH2IDE_BUILD_DATE")),
        ("target", env!("GH2IDE_BUILD_TARGET")),
        ("profile", env!("GH2IDE_BUILD_PROFILE")),
        ("rustc", env!("GH2IDE_BUILD_RUSTC")),
    ]
}
