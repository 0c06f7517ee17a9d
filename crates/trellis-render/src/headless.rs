#![forbid(unsafe_code)]

//! In-memory terminal for tests and snapshots.
//!
//! [`HeadlessTerminal`] implements [`Terminal`] without a device: cells are
//! written to a back buffer, [`flush`](Terminal::flush) copies it to a front
//! buffer, and input events are injected with [`HeadlessTerminal::push_event`].
//!
//! ```
//! use trellis_core::geometry::{Point, Size};
//! use trellis_render::cell::Cell;
//! use trellis_render::headless::HeadlessTerminal;
//! use trellis_render::terminal::Terminal;
//!
//! let term = HeadlessTerminal::new(Size::new(3, 1));
//! term.set_cell(Point::new(1, 0), Cell::from_char('x')).unwrap();
//! assert_eq!(term.to_text(), "   ");
//! term.flush().unwrap();
//! assert_eq!(term.to_text(), " x ");
//! ```

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use trellis_core::event::Event;
use trellis_core::geometry::{Point, Size};
use trellis_core::stop_signal::StopSignal;

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::terminal::{Terminal, TerminalError};

/// How long `event` sleeps between stop-signal checks.
const STOP_POLL: Duration = Duration::from_millis(5);

#[derive(Debug)]
struct Screen {
    back: Buffer,
    front: Buffer,
    cursor: Option<Point>,
    flushes: u64,
    closed: bool,
}

/// A terminal backed by memory.
#[derive(Debug)]
pub struct HeadlessTerminal {
    screen: Mutex<Screen>,
    events: Mutex<VecDeque<Event>>,
    arrived: Condvar,
}

impl HeadlessTerminal {
    /// Create a terminal of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            screen: Mutex::new(Screen {
                back: Buffer::new(size),
                front: Buffer::new(size),
                cursor: None,
                flushes: 0,
                closed: false,
            }),
            events: Mutex::new(VecDeque::new()),
            arrived: Condvar::new(),
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an input event for [`Terminal::event`].
    pub fn push_event(&self, event: Event) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        events.push_back(event);
        self.arrived.notify_all();
    }

    /// Change the size and queue the matching resize event.
    pub fn resize(&self, size: Size) {
        {
            let mut screen = self.screen();
            screen.back.resize(size);
            screen.front.resize(size);
        }
        self.push_event(Event::Resize(size));
    }

    /// A cell of the last flushed frame.
    pub fn cell(&self, p: Point) -> Option<Cell> {
        self.screen().front.get(p).copied()
    }

    /// A cell of the back buffer (not yet flushed).
    pub fn back_cell(&self, p: Point) -> Option<Cell> {
        self.screen().back.get(p).copied()
    }

    /// The last flushed frame as text.
    pub fn to_text(&self) -> String {
        self.screen().front.to_text()
    }

    /// The back buffer as text.
    pub fn back_text(&self) -> String {
        self.screen().back.to_text()
    }

    /// A copy of the last flushed frame.
    pub fn front_buffer(&self) -> Buffer {
        self.screen().front.clone()
    }

    /// Number of flushes so far.
    pub fn flush_count(&self) -> u64 {
        self.screen().flushes
    }

    /// Cursor position, if shown.
    pub fn cursor(&self) -> Option<Point> {
        self.screen().cursor
    }

    /// Whether [`Terminal::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.screen().closed
    }
}

impl Terminal for HeadlessTerminal {
    fn size(&self) -> Size {
        self.screen().back.size()
    }

    fn clear(&self) -> Result<(), TerminalError> {
        let mut screen = self.screen();
        if screen.closed {
            return Err(TerminalError::Closed);
        }
        screen.back.clear();
        Ok(())
    }

    fn flush(&self) -> Result<(), TerminalError> {
        let mut screen = self.screen();
        if screen.closed {
            return Err(TerminalError::Closed);
        }
        screen.front = screen.back.clone();
        screen.flushes += 1;
        Ok(())
    }

    fn set_cursor(&self, p: Point) {
        self.screen().cursor = Some(p);
    }

    fn hide_cursor(&self) {
        self.screen().cursor = None;
    }

    fn set_cell(&self, p: Point, cell: Cell) -> Result<(), TerminalError> {
        let mut screen = self.screen();
        if screen.closed {
            return Err(TerminalError::Closed);
        }
        let size = screen.back.size();
        if screen.back.set(p, cell) {
            Ok(())
        } else {
            Err(TerminalError::OutOfBounds { point: p, size })
        }
    }

    fn event(&self, stop: &StopSignal) -> Option<Event> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if stop.is_stopped() || self.is_closed() {
                return None;
            }
            if let Some(event) = events.pop_front() {
                return Some(event);
            }
            let (guard, _) = self
                .arrived
                .wait_timeout(events, STOP_POLL)
                .unwrap_or_else(PoisonError::into_inner);
            events = guard;
        }
    }

    fn close(&self) {
        self.screen().closed = true;
        self.arrived.notify_all();
    }
}
