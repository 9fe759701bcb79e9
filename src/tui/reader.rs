use std::io;
use std::time::Duration;

use crate::input::{Input, InputSource};

/// Reads stdin with `libc::poll` + `read` so the timeout and the bytes seen stay in sync
/// (std's buffered stdin would hide bytes from `poll`).
#[derive(Debug)]
pub struct StdinSource {
    buf: Vec<u8>,
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            buf: vec![0; 4096],
        }
    }
}

impl InputSource for StdinSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Input> {
        let mut pollfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        // SAFETY: pollfd is a valid, initialized pollfd for the duration of the call.
        let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            // SIGWINCH lands here; report idle so the caller checks its resize flag.
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Input::Idle);
            }
            return Err(err);
        }
        if ready == 0 {
            return Ok(Input::Idle);
        }
        if pollfd.revents & libc::POLLIN == 0 {
            if pollfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
                tracing::error!(revents = pollfd.revents, "stdin poll error");
                return Ok(Input::Closed);
            }
            return Ok(Input::Idle);
        }

        // SAFETY: buf is a live, writable allocation of buf.len() bytes.
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                self.buf.as_mut_ptr() as *mut libc::c_void,
                self.buf.len(),
            )
        };
        match n {
            0 => Ok(Input::Closed),
            n if n < 0 => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(Input::Idle),
                    _ => Err(err),
                }
            }
            n => Ok(Input::Bytes(self.buf[..n as usize].to_vec())),
        }
    }
}
