#![forbid(unsafe_code)]
//! Crossterm terminal backend for Trellis.
//!
//! [`TtyTerminal`] implements [`Terminal`] on the process's own terminal:
//!
//! - [`TtyTerminal::open`] enters raw mode and, per [`TtyOptions`], the
//!   alternate screen and mouse capture, and hides the cursor.
//! - Drawing goes to an in-memory back buffer. [`Terminal::flush`] writes
//!   only the cells that changed since the previous flush, inside a
//!   synchronized update.
//! - [`Terminal::event`] polls crossterm with a short timeout so a stop
//!   signal unblocks it promptly. Resize events resize the back buffer and
//!   force a full repaint; read failures are reported as `Event::Error`.
//! - [`Terminal::close`] (or drop) restores every mode it entered.

mod present;
mod session;

use std::io::{self, BufWriter, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use trellis_core::event::Event;
use trellis_core::geometry::{Point, Size};
use trellis_core::stop_signal::StopSignal;
use trellis_render::buffer::Buffer;
use trellis_render::cell::Cell;
use trellis_render::terminal::{Terminal, TerminalError};

use crate::session::Session;

/// Configuration for opening the terminal.
#[derive(Debug, Clone)]
pub struct TtyOptions {
    /// Draw on the alternate screen, leaving the scrollback untouched.
    pub alternate_screen: bool,
    /// Report mouse presses, releases, drags and wheel events.
    pub mouse_capture: bool,
    /// Longest time `event` blocks before re-checking its stop signal.
    pub poll_interval: Duration,
}

impl Default for TtyOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
            poll_interval: Duration::from_millis(50),
        }
    }
}

#[derive(Debug)]
struct State {
    back: Buffer,
    front: Buffer,
    cursor: Option<Point>,
    /// Repaint every cell on the next flush.
    invalidated: bool,
    session: Option<Session>,
}

/// The process's controlling terminal.
#[derive(Debug)]
pub struct TtyTerminal {
    options: TtyOptions,
    state: Mutex<State>,
}

impl TtyTerminal {
    /// Take over the terminal.
    pub fn open(options: TtyOptions) -> Result<Self, TerminalError> {
        let session = Session::enter(&options)?;
        let (width, height) = crossterm::terminal::size()?;
        let size = Size::new(width, height);
        trellis_core::debug!(width, height, "terminal opened");
        Ok(Self {
            options,
            state: Mutex::new(State {
                back: Buffer::new(size),
                front: Buffer::new(size),
                cursor: None,
                invalidated: true,
                session: Some(session),
            }),
        })
    }

    /// The options the terminal was opened with.
    pub fn options(&self) -> &TtyOptions {
        &self.options
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_closed(&self) -> bool {
        self.state().session.is_none()
    }

    fn on_resize(&self, size: Size) {
        let mut state = self.state();
        state.back.resize(size);
        state.invalidated = true;
    }
}

impl Terminal for TtyTerminal {
    fn size(&self) -> Size {
        self.state().back.size()
    }

    fn clear(&self) -> Result<(), TerminalError> {
        let mut state = self.state();
        if state.session.is_none() {
            return Err(TerminalError::Closed);
        }
        state.back.clear();
        Ok(())
    }

    fn flush(&self) -> Result<(), TerminalError> {
        let mut state = self.state();
        if state.session.is_none() {
            return Err(TerminalError::Closed);
        }

        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        crossterm::queue!(out, crossterm::terminal::BeginSynchronizedUpdate)?;

        if state.invalidated {
            crossterm::queue!(
                out,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
            )?;
            // Blank the remembered frame so every drawn cell is rewritten.
            let size = state.back.size();
            state.front = Buffer::new(size);
            state.invalidated = false;
        }

        let written = present::present(&mut out, &state.front, &state.back)?;
        match state.cursor {
            Some(p) => crossterm::queue!(
                out,
                crossterm::cursor::MoveTo(p.x, p.y),
                crossterm::cursor::Show
            )?,
            None => crossterm::queue!(out, crossterm::cursor::Hide)?,
        }
        crossterm::queue!(out, crossterm::terminal::EndSynchronizedUpdate)?;
        out.flush()?;

        state.front = state.back.clone();
        if written > 0 {
            trellis_core::trace!(cells = written, "frame flushed");
        }
        Ok(())
    }

    fn set_cursor(&self, p: Point) {
        self.state().cursor = Some(p);
    }

    fn hide_cursor(&self) {
        self.state().cursor = None;
    }

    fn set_cell(&self, p: Point, cell: Cell) -> Result<(), TerminalError> {
        let mut state = self.state();
        if state.session.is_none() {
            return Err(TerminalError::Closed);
        }
        let size = state.back.size();
        if state.back.set(p, cell) {
            Ok(())
        } else {
            Err(TerminalError::OutOfBounds { point: p, size })
        }
    }

    fn event(&self, stop: &StopSignal) -> Option<Event> {
        loop {
            if stop.is_stopped() || self.is_closed() {
                return None;
            }
            match crossterm::event::poll(self.options.poll_interval) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => return Some(Event::error(format!("terminal poll failed: {err}"))),
            }
            let raw = match crossterm::event::read() {
                Ok(raw) => raw,
                Err(err) => return Some(Event::error(format!("terminal read failed: {err}"))),
            };
            // Unmodelled events (paste, focus) are skipped.
            let Some(event) = Event::from_crossterm(raw) else {
                continue;
            };
            if let Event::Resize(size) = event {
                self.on_resize(size);
            }
            return Some(event);
        }
    }

    fn close(&self) {
        let session = self.state().session.take();
        if let Some(mut session) = session {
            session.cleanup();
            trellis_core::debug!("terminal closed");
        }
    }
}

impl Drop for TtyTerminal {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_take_over_the_screen() {
        let options = TtyOptions::default();
        assert!(options.alternate_screen);
        assert!(options.mouse_capture);
        assert!(options.poll_interval <= Duration::from_millis(100));
    }
}
