#![forbid(unsafe_code)]

//! The terminal capability.
//!
//! Everything above this crate talks to a terminal only through [`Terminal`].
//! Backends keep all process-wide state (raw mode, alternate screen, mouse
//! capture) behind an explicit create/[`close`](Terminal::close) lifecycle.
//!
//! Drawing goes to a back buffer: [`clear`](Terminal::clear) resets it,
//! [`set_cell`](Terminal::set_cell) writes into it, and
//! [`flush`](Terminal::flush) makes it visible.

use std::fmt;
use std::io;

use trellis_core::event::Event;
use trellis_core::geometry::{Point, Size};
use trellis_core::stop_signal::StopSignal;

use crate::cell::Cell;

/// Errors raised by terminal backends.
#[derive(Debug)]
pub enum TerminalError {
    /// A cell write landed outside the terminal.
    OutOfBounds { point: Point, size: Size },
    /// The terminal was closed.
    Closed,
    /// An I/O failure talking to the device.
    Io(io::Error),
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { point, size } => write!(
                f,
                "cell ({}, {}) is outside the {}x{} terminal",
                point.x, point.y, size.width, size.height
            ),
            Self::Closed => write!(f, "terminal is closed"),
            Self::Io(err) => write!(f, "terminal I/O error: {err}"),
        }
    }
}

impl std::error::Error for TerminalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TerminalError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// A character-cell terminal.
///
/// Methods take `&self` so one terminal can be shared between the event
/// reader thread and the drawing thread; implementations synchronise
/// internally.
pub trait Terminal: Send + Sync {
    /// Current size in cells.
    fn size(&self) -> Size;

    /// Reset the back buffer to empty cells.
    fn clear(&self) -> Result<(), TerminalError>;

    /// Make the back buffer visible.
    fn flush(&self) -> Result<(), TerminalError>;

    /// Show the cursor at `p`.
    fn set_cursor(&self, p: Point);

    /// Hide the cursor.
    fn hide_cursor(&self);

    /// Write one cell into the back buffer, bit for bit.
    fn set_cell(&self, p: Point, cell: Cell) -> Result<(), TerminalError>;

    /// Block until the next input event.
    ///
    /// Returns `None` once `stop` fires or the terminal is closed. Read
    /// failures are reported as [`Event::Error`].
    fn event(&self, stop: &StopSignal) -> Option<Event>;

    /// Restore the device and release the backend. Idempotent.
    fn close(&self);
}
