//! Diagnostic logging for the host and the CLI.
//!
//! Lines are newline-delimited and timestamped (RFC 3339, millisecond precision).
//! They always go to stderr; the host additionally appends them to a log file
//! chosen by `GH2IDE_LOG_FILE` (empty string disables the file sink).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use fs2::FileExt;
use once_cell::sync::OnceCell;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_ENV: &str = "GH2IDE_LOG_FILE";
pub const LOG_FILTER_ENV: &str = "GH2IDE_LOG";

static INIT: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Effective host log file: `None` when file logging is disabled.
pub fn log_file_path() -> Option<PathBuf> {
    match std::env::var_os(LOG_FILE_ENV) {
        Some(v) if v.is_empty() => None,
        Some(v) => Some(PathBuf::from(v)),
        None => home::home_dir().map(|h| h.join(".github-to-ide").join("native-host.log")),
    }
}

struct Rfc3339Millis;

impl FormatTime for Rfc3339Millis {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", humantime::format_rfc3339_millis(SystemTime::now()))
    }
}

/// Appends whole log lines to a file under an advisory exclusive lock.
///
/// Several host processes may share one log file, so each line is written
/// with a single locked append.
#[derive(Clone, Debug)]
pub struct AppendFileWriter {
    path: Arc<PathBuf>,
    dir_ready: Arc<AtomicBool>,
}

impl AppendFileWriter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
            dir_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn append(&self, bytes: &[u8]) -> io::Result<()> {
        if !self.dir_ready.load(Ordering::Relaxed) {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            self.dir_ready.store(true, Ordering::Relaxed);
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())?;
        f.lock_exclusive()?;
        let res = f.write_all(bytes);
        let _ = f.unlock();
        res
    }
}

/// One formatted event, flushed to the file when dropped.
pub struct LineBuffer {
    sink: AppendFileWriter,
    buf: Vec<u8>,
}

impl Write for LineBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineBuffer {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        if let Err(e) = self.sink.append(&self.buf) {
            eprintln!("gh2ide: failed to write log file: {e}");
        }
    }
}

impl<'a> MakeWriter<'a> for AppendFileWriter {
    type Writer = LineBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        LineBuffer {
            sink: self.clone(),
            buf: Vec::new(),
        }
    }
}

/// Install the global subscriber once. Later calls are no-ops and return the
/// file chosen by the first call. `GH2IDE_LOG` overrides `default_level`.
pub fn telemetry_init(file: Option<PathBuf>, default_level: &str) -> Option<PathBuf> {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_timer(Rfc3339Millis)
            .with_ansi(false)
            .with_target(false);

        let file_layer = file.clone().map(|p| {
            tracing_subscriber::fmt::layer()
                .with_writer(AppendFileWriter::new(p))
                .with_timer(Rfc3339Millis)
                .with_ansi(false)
                .with_target(false)
        });

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();
        file
    })
    .clone()
}
