#![forbid(unsafe_code)]

//! A widget that records what it receives, for tests.
//!
//! `Mirror` draws an ASCII border around its whole canvas (so tests can see
//! exactly where it landed) and optional text inside it. Every keyboard and
//! mouse event is recorded together with its [`EventMeta`]; handlers can be
//! told to fail so error paths can be exercised.

use std::sync::{Mutex, MutexGuard, PoisonError};

use trellis_core::event::{KeyEvent, MouseEvent};
use trellis_core::geometry::{Point, Size};
use trellis_render::canvas::Canvas;
use trellis_render::cell::{Cell, CellOptions};
use trellis_render::drawing::{BorderChars, Draw};

use crate::{DrawMeta, EventMeta, Widget, WidgetError, WidgetOptions};

#[derive(Debug, Default)]
struct State {
    text: String,
    keys: Vec<(KeyEvent, EventMeta)>,
    mice: Vec<(MouseEvent, EventMeta)>,
    draws: Vec<(Size, DrawMeta)>,
    fail_draw: Option<String>,
    fail_input: Option<String>,
}

/// Records input and draws its own outline.
#[derive(Debug)]
pub struct Mirror {
    options: WidgetOptions,
    state: Mutex<State>,
}

impl Mirror {
    pub fn new(options: WidgetOptions) -> Self {
        Self {
            options,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Text printed inside the border from the next draw on.
    pub fn set_text(&self, text: impl Into<String>) {
        self.state().text = text.into();
    }

    /// Make `draw` fail with `message` (or succeed again with `None`).
    pub fn fail_draw(&self, message: Option<&str>) {
        self.state().fail_draw = message.map(str::to_owned);
    }

    /// Make `keyboard` and `mouse` fail with `message`.
    pub fn fail_input(&self, message: Option<&str>) {
        self.state().fail_input = message.map(str::to_owned);
    }

    /// Keys received so far.
    pub fn keys(&self) -> Vec<(KeyEvent, EventMeta)> {
        self.state().keys.clone()
    }

    /// Mouse events received so far, in canvas coordinates.
    pub fn mice(&self) -> Vec<(MouseEvent, EventMeta)> {
        self.state().mice.clone()
    }

    /// Canvas size and meta of each draw so far.
    pub fn draws(&self) -> Vec<(Size, DrawMeta)> {
        self.state().draws.clone()
    }

    /// Forget recorded input and draws.
    pub fn reset(&self) {
        let mut state = self.state();
        state.keys.clear();
        state.mice.clear();
        state.draws.clear();
    }
}

impl Widget for Mirror {
    fn draw(&self, canvas: &mut Canvas, meta: &DrawMeta) -> Result<(), WidgetError> {
        let mut state = self.state();
        if let Some(message) = &state.fail_draw {
            return Err(WidgetError::new(message.clone()));
        }
        state.draws.push((canvas.size(), *meta));

        canvas.draw_border(canvas.bounds(), BorderChars::ASCII, Cell::default());
        if canvas.size().width > 2 && canvas.size().height > 2 {
            let max_x = canvas.size().width - 1;
            canvas.print_text_clipped(Point::new(1, 1), &state.text, &CellOptions::new(), max_x);
        }
        Ok(())
    }

    fn keyboard(&self, event: &KeyEvent, meta: &EventMeta) -> Result<(), WidgetError> {
        let mut state = self.state();
        state.keys.push((*event, *meta));
        match &state.fail_input {
            Some(message) => Err(WidgetError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn mouse(&self, event: &MouseEvent, meta: &EventMeta) -> Result<(), WidgetError> {
        let mut state = self.state();
        state.mice.push((*event, *meta));
        match &state.fail_input {
            Some(message) => Err(WidgetError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn options(&self) -> WidgetOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::event::{KeyCode, MouseEventKind};
    use trellis_core::geometry::Rect;

    #[test]
    fn draws_outline_and_text() {
        let mirror = Mirror::new(WidgetOptions::new());
        mirror.set_text("hi");
        let mut canvas = Canvas::new(Rect::new(4, 4, 5, 3)).unwrap();
        mirror.draw(&mut canvas, &DrawMeta { focused: true }).unwrap();
        assert_eq!(canvas.buffer().to_text(), "+---+\n|hi |\n+---+");
        assert_eq!(mirror.draws(), vec![(Size::new(5, 3), DrawMeta { focused: true })]);
    }

    #[test]
    fn records_input_and_fails_on_request() {
        let mirror = Mirror::new(WidgetOptions::new());
        let key = KeyEvent::new(KeyCode::Enter);
        mirror.keyboard(&key, &EventMeta::default()).unwrap();
        mirror.fail_input(Some("nope"));
        let click = MouseEvent::new(MouseEventKind::Moved, 1, 1);
        let err = mirror.mouse(&click, &EventMeta::default()).unwrap_err();
        assert_eq!(err.message(), "nope");
        assert_eq!(mirror.keys().len(), 1);
        assert_eq!(mirror.mice().len(), 1);
        mirror.reset();
        assert!(mirror.keys().is_empty());
    }

    #[test]
    fn draw_failure() {
        let mirror = Mirror::new(WidgetOptions::new());
        mirror.fail_draw(Some("broken"));
        let mut canvas = Canvas::new(Rect::new(0, 0, 1, 1)).unwrap();
        assert!(mirror.draw(&mut canvas, &DrawMeta::default()).is_err());
        assert!(mirror.draws().is_empty());
    }
}
