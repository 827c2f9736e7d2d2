//! Caller-side transport to the native host.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

use crate::protocol::{FramedStream, HostRequest, HostResponse};

/// One request, one response. `None` means the host could not be reached or
/// did not answer; callers treat it as a failed call and do not retry.
pub trait HostTransport {
    fn send(&self, request: &HostRequest) -> Option<HostResponse>;

    /// Presence check via `ping`.
    fn is_connected(&self) -> bool {
        matches!(self.send(&HostRequest::Ping), Some(HostResponse::Pong { .. }))
    }
}

/// Spawns the host executable per request, like a browser does for native
/// messaging, and performs a single framed round trip over its stdio.
#[derive(Debug, Clone)]
pub struct NativeHostClient {
    program: PathBuf,
    args: Vec<OsString>,
    inherit_stderr: bool,
}

impl NativeHostClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![OsString::from("serve")],
            inherit_stderr: false,
        }
    }

    /// Use this executable as the host.
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe().context("failed to locate current executable")?;
        Ok(Self::new(exe))
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Show the host's own diagnostics on our stderr.
    pub fn inherit_stderr(mut self, yes: bool) -> Self {
        self.inherit_stderr = yes;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn round_trip(&self, request: &HostRequest) -> Result<HostResponse> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if self.inherit_stderr {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .spawn()
            .with_context(|| format!("failed to start host {}", self.program.display()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("host stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("host stdout unavailable"))?;

        let mut stream = FramedStream::new(stdout, stdin);
        let result = stream
            .send(request)
            .context("failed to send request to host")
            .and_then(|()| {
                stream
                    .receive_as::<HostResponse>()
                    .context("failed to read host response")
            });
        // Closing stdin lets the host loop see end of stream and exit.
        drop(stream);
        let status = child.wait().context("failed to wait for host")?;
        tracing::debug!(action = request.action(), status = ?status.code(), "host exited");
        result?.ok_or_else(|| anyhow!("host closed the stream without responding"))
    }
}

impl HostTransport for NativeHostClient {
    fn send(&self, request: &HostRequest) -> Option<HostResponse> {
        match self.round_trip(request) {
            Ok(resp) => Some(resp),
            Err(e) => {
                tracing::warn!(action = request.action(), error = %format!("{e:#}"), "native host call failed");
                None
            }
        }
    }
}
