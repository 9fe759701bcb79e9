//! Tracing setup: a daily-rolling log file plus an optional in-process tee whose lines the
//! dispatcher shows in its log page.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::Config;

pub const LOG_FILE_NAME: &str = "panekit.log";

pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
    log_rx: Option<Receiver<String>>,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Receiver of intercepted lines, when interception was requested. Usually handed over
    /// through `Dispatcher::attach_logging`.
    pub fn take_log_rx(&mut self) -> Option<Receiver<String>> {
        self.log_rx.take()
    }
}

/// Buffers one formatted event and sends it line by line when dropped.
struct LineSender {
    buf: Vec<u8>,
    tx: Sender<String>,
}

impl Write for LineSender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineSender {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let _ = self.tx.send(line.to_string());
        }
    }
}

#[derive(Clone)]
struct ChannelMakeWriter {
    tx: Sender<String>,
}

impl<'a> MakeWriter<'a> for ChannelMakeWriter {
    type Writer = LineSender;

    fn make_writer(&'a self) -> Self::Writer {
        LineSender {
            buf: Vec::with_capacity(256),
            tx: self.tx.clone(),
        }
    }
}

fn default_log_dir() -> io::Result<PathBuf> {
    let dir = std::env::temp_dir().join("panekit").join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Installs the global subscriber. Returns `None` if the log directory can't be created or a
/// subscriber is already installed.
///
/// With `config.intercept_tracing` set, events from outside this crate are also formatted into
/// plain lines and sent over a channel. The crate's own diagnostics stay in the file, so drawing
/// the log page can never feed itself.
pub fn init(log_dir: Option<&Path>, config: &Config) -> Option<LoggingGuard> {
    let intercept = config.intercept_tracing;
    let log_dir = match log_dir {
        Some(dir) => std::fs::create_dir_all(dir).map(|_| dir.to_path_buf()),
        None => default_log_dir(),
    }
    .or_else(|_| default_log_dir())
    .ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Host events have to pass the filter to reach the tee.
    let default_directive = if intercept { "info" } else { "panekit=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let (tee_layer, log_rx) = if intercept {
        let (tx, rx) = mpsc::channel::<String>();
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(ChannelMakeWriter { tx })
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_filter(filter_fn(|meta| !meta.target().starts_with("panekit")));
        (Some(layer), Some(rx))
    } else {
        (None, None)
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(tee_layer);

    if subscriber.try_init().is_err() {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), intercept, "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
        log_rx,
    })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
