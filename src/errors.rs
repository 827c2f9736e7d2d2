//! Error mapping guide:
//! - Map io::ErrorKind::NotFound to exit code 127; all others to 1.
//! - Resolution and launch faults never escape the dispatcher; they are rendered
//!   into `{status:"ERROR", message}` via the display_* helpers.
//! - Transport faults (FrameError) end the host loop.
use std::fmt;
use std::io;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Host-side failures surfaced to the caller as ERROR responses.
#[derive(Debug)]
pub enum HostError {
    Io(io::Error),
    Message(String),
}

impl From<io::Error> for HostError {
    fn from(e: io::Error) -> Self {
        HostError::Io(e)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_for_host_error(self))
    }
}

impl std::error::Error for HostError {}

/// Render the user-facing message for a HostError.
pub fn display_for_host_error(e: &HostError) -> String {
    match e {
        HostError::Io(ioe) => ioe.to_string(),
        HostError::Message(s) => s.clone(),
    }
}

/// Convert HostError to exit code (parity with io::Error mapping).
pub fn exit_code_for_host_error(e: &HostError) -> u8 {
    match e {
        HostError::Io(ioe) => exit_code_for_io_error(ioe),
        HostError::Message(_) => 1,
    }
}

/// Transport faults. Any of these terminates the host loop.
#[derive(Debug)]
pub enum FrameError {
    Io(io::Error),
    /// Peer closed after `got` of `expected` bytes of a frame.
    ShortRead { expected: usize, got: usize },
    TooLarge(usize),
    Json(serde_json::Error),
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        FrameError::Io(e)
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(e: serde_json::Error) -> Self {
        FrameError::Json(e)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Io(e) => write!(f, "frame i/o error: {e}"),
            FrameError::ShortRead { expected, got } => {
                write!(f, "short read: expected {expected} bytes, got {got}")
            }
            FrameError::TooLarge(len) => write!(f, "frame too large: {len} bytes"),
            FrameError::Json(e) => write!(f, "invalid frame JSON: {e}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Every launch candidate failed; carries the last observed diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchError {
    pub message: String,
}

impl LaunchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LaunchError {}

impl From<LaunchError> for HostError {
    fn from(e: LaunchError) -> Self {
        HostError::Message(e.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_127() {
        let e = io::Error::new(io::ErrorKind::NotFound, "x");
        assert_eq!(exit_code_for_io_error(&e), 127);
        assert_eq!(exit_code_for_host_error(&HostError::Io(e)), 127);
        let e = io::Error::other("y");
        assert_eq!(exit_code_for_io_error(&e), 1);
        assert_eq!(exit_code_for_host_error(&HostError::Message("m".into())), 1);
    }

    #[test]
    fn host_error_display_is_verbatim() {
        let e = HostError::Message("fatal: repository not found".to_string());
        assert_eq!(e.to_string(), "fatal: repository not found");
    }
}
