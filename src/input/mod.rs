//! Input decoding: raw bytes to key records, and key records to mouse events.

pub mod crossterm;
pub mod decoder;
pub mod mouse;

pub use decoder::KeyDecoder;
pub use mouse::{MouseFrame, MouseParser};

use std::io;
use std::time::Duration;

/// What an [`InputSource`] produced within one poll interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Bytes(Vec<u8>),
    /// Nothing arrived before the timeout.
    Idle,
    /// The stream ended; no more input will come.
    Closed,
}

/// A source of raw terminal bytes, polled by the dispatcher's event loop.
pub trait InputSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Input>;
}
