use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait TerminalOps: Send + Sync + 'static {
    fn setup(&self) -> io::Result<()>;
    fn restore(&self) -> io::Result<()>;
}

/// Raw mode, alternate screen and a hidden cursor; mouse reporting when `mouse` is set.
#[derive(Debug, Default)]
pub struct CrosstermTerminalOps {
    pub mouse: bool,
}

impl TerminalOps for CrosstermTerminalOps {
    fn setup(&self) -> io::Result<()> {
        use crossterm::{
            cursor,
            event::EnableMouseCapture,
            queue,
            terminal::{enable_raw_mode, EnterAlternateScreen},
        };
        use std::io::Write;

        enable_raw_mode()?;
        let mut out = io::stdout();
        queue!(out, EnterAlternateScreen, cursor::Hide)?;
        if self.mouse {
            queue!(out, EnableMouseCapture)?;
        }
        out.flush()
    }

    fn restore(&self) -> io::Result<()> {
        use crossterm::{
            cursor,
            event::DisableMouseCapture,
            execute,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
        };

        // Try every step even if one fails.
        let mut first_err: Option<io::Error> = None;

        if self.mouse {
            if let Err(err) = execute!(io::stdout(), DisableMouseCapture) {
                first_err.get_or_insert(err);
            }
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
            first_err.get_or_insert(err);
        }
        if let Err(err) = disable_raw_mode() {
            first_err.get_or_insert(err);
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Restores the terminal at most once, from whichever owner gets there first.
#[derive(Clone)]
pub struct TerminalRestorer {
    restored: Arc<AtomicBool>,
    ops: Arc<dyn TerminalOps>,
}

impl TerminalRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.restore()
    }
}

pub struct TerminalGuard {
    restorer: TerminalRestorer,
}

impl TerminalGuard {
    pub fn new(mouse: bool) -> io::Result<Self> {
        Self::with_ops(Arc::new(CrosstermTerminalOps { mouse }))
    }

    pub fn with_ops(ops: Arc<dyn TerminalOps>) -> io::Result<Self> {
        ops.setup()?;
        Ok(Self {
            restorer: TerminalRestorer {
                restored: Arc::new(AtomicBool::new(false)),
                ops,
            },
        })
    }

    pub fn restorer(&self) -> TerminalRestorer {
        self.restorer.clone()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restorer.restore() {
            tracing::error!(error = %err, "terminal restore failed");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }
}

/// Restores the terminal and exits when SIGINT/SIGTERM arrive from outside the key stream
/// (in raw mode ctrl+c is a key, so these only come from `kill` and friends).
#[cfg(unix)]
pub fn install_termination_signals(
    restorer: TerminalRestorer,
) -> io::Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    Ok(std::thread::spawn(move || {
        for sig in signals.forever() {
            let signal = match sig {
                SIGINT => TerminationSignal::SigInt,
                SIGTERM => TerminationSignal::SigTerm,
                _ => continue,
            };
            let _ = restorer.restore();
            std::process::exit(signal.exit_code());
        }
    }))
}

/// A flag raised on every SIGWINCH; the event loop clears it and resyncs the screen size.
#[cfg(unix)]
pub fn install_resize_flag() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::signal::SIGWINCH, Arc::clone(&flag))?;
    Ok(flag)
}

#[cfg(test)]
#[path = "../../tests/unit/tui/terminal_guard.rs"]
mod tests;
