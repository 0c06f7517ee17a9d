#![forbid(unsafe_code)]

//! Small widgets used by the demo dashboard.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use trellis::prelude::*;
use trellis::{MouseButton, MouseEventKind, OUTSIDE_CANVAS};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn highlight(meta_focused: bool) -> CellOptions {
    if meta_focused {
        CellOptions::new().bold()
    } else {
        CellOptions::new()
    }
}

// ── Gauge ────────────────────────────────────────────────────────────────

/// A horizontal bar filled to a percentage, with the value centred on it.
#[derive(Debug)]
pub struct Gauge {
    percent: Mutex<u8>,
    color: Color,
}

impl Gauge {
    pub fn new(color: Color) -> Self {
        Self {
            percent: Mutex::new(0),
            color,
        }
    }

    /// Set the fill, clamped to 100.
    pub fn set(&self, percent: u8) {
        *lock(&self.percent) = percent.min(100);
    }
}

impl Widget for Gauge {
    fn draw(&self, canvas: &mut Canvas, _meta: &DrawMeta) -> std::result::Result<(), WidgetError> {
        let percent = *lock(&self.percent);
        let size = canvas.size();
        let filled = (u32::from(size.width) * u32::from(percent) / 100) as u16;
        canvas.draw_rect_filled(
            Rect::new(0, 0, filled, size.height),
            Cell::from_char(' ').with_bg(self.color),
        );

        let label = format!("{percent}%");
        let x = HAlign::Center.offset(size.width, label.len() as u16);
        let y = VAlign::Middle.offset(size.height, 1);
        canvas.print_text(Point::new(x, y), &label, &CellOptions::new().bold());
        Ok(())
    }

    fn options(&self) -> WidgetOptions {
        WidgetOptions::new().min_size(Size::new(4, 1)).max_size(Size::new(0, 3))
    }
}

// ── Sparkline ────────────────────────────────────────────────────────────

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// The most recent values (0..=100) as one row of bar glyphs, newest on
/// the right.
#[derive(Debug)]
pub struct Sparkline {
    values: Mutex<VecDeque<u8>>,
    capacity: usize,
}

impl Sparkline {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, value: u8) {
        let mut values = lock(&self.values);
        if values.len() == self.capacity {
            values.pop_front();
        }
        values.push_back(value.min(100));
    }
}

impl Widget for Sparkline {
    fn draw(&self, canvas: &mut Canvas, _meta: &DrawMeta) -> std::result::Result<(), WidgetError> {
        let values = lock(&self.values);
        let size = canvas.size();
        let shown = values.len().min(usize::from(size.width));
        let start_x = size.width - shown as u16;
        let y = size.height - 1;
        for (i, v) in values.iter().skip(values.len() - shown).enumerate() {
            let glyph = BARS[usize::from(*v) * (BARS.len() - 1) / 100];
            canvas.set_cell(
                Point::new(start_x + i as u16, y),
                glyph,
                &CellOptions::new().fg(Color::GREEN),
            )?;
        }
        Ok(())
    }

    fn options(&self) -> WidgetOptions {
        WidgetOptions::new().max_size(Size::new(0, 1))
    }
}

// ── Key log ──────────────────────────────────────────────────────────────

/// The last keys typed while its container is focused.
#[derive(Debug)]
pub struct KeyLog {
    keys: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl KeyLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }
}

fn describe(key: &KeyEvent) -> String {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_owned(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    };
    if key.ctrl() { format!("Ctrl+{name}") } else { name }
}

impl Widget for KeyLog {
    fn draw(&self, canvas: &mut Canvas, meta: &DrawMeta) -> std::result::Result<(), WidgetError> {
        let keys = lock(&self.keys);
        let opts = highlight(meta.focused);
        if keys.is_empty() {
            canvas.print_text(Point::ORIGIN, "type something", &opts);
            return Ok(());
        }
        let rows = usize::from(canvas.size().height);
        for (y, key) in keys.iter().rev().take(rows).enumerate() {
            canvas.print_text(Point::new(0, y as u16), key, &opts);
        }
        Ok(())
    }

    fn keyboard(&self, event: &KeyEvent, _meta: &EventMeta) -> std::result::Result<(), WidgetError> {
        let mut keys = lock(&self.keys);
        if keys.len() == self.capacity {
            keys.pop_front();
        }
        keys.push_back(describe(event));
        Ok(())
    }

    fn options(&self) -> WidgetOptions {
        WidgetOptions::new().keyboard(KeyScope::Focused)
    }
}

// ── Click tracker ────────────────────────────────────────────────────────

/// Marks the last left click inside the widget.
#[derive(Debug, Default)]
pub struct ClickTracker {
    last: Mutex<Option<Point>>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for ClickTracker {
    fn draw(&self, canvas: &mut Canvas, meta: &DrawMeta) -> std::result::Result<(), WidgetError> {
        let opts = highlight(meta.focused);
        match *lock(&self.last) {
            Some(p) => {
                canvas.print_text(Point::ORIGIN, &format!("click at {},{}", p.x, p.y), &opts);
                if canvas.bounds().contains(p) {
                    canvas.set_cell(p, 'x', &CellOptions::new().fg(Color::RED))?;
                }
            }
            None => {
                canvas.print_text(Point::ORIGIN, "click here", &opts);
            }
        }
        Ok(())
    }

    fn mouse(&self, event: &MouseEvent, _meta: &EventMeta) -> std::result::Result<(), WidgetError> {
        if event.kind == MouseEventKind::Down(MouseButton::Left) && event.position != OUTSIDE_CANVAS {
            *lock(&self.last) = Some(event.position);
        }
        Ok(())
    }

    fn options(&self) -> WidgetOptions {
        WidgetOptions::new().mouse(MouseScope::Widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: u16, h: u16) -> Canvas {
        Canvas::new(Rect::new(0, 0, w, h)).unwrap()
    }

    fn row(c: &Canvas, y: u16) -> String {
        (0..c.size().width)
            .map(|x| c.cell(Point::new(x, y)).unwrap().display_char())
            .collect()
    }

    #[test]
    fn gauge_fills_proportionally() {
        let gauge = Gauge::new(Color::BLUE);
        gauge.set(50);
        let mut c = canvas(10, 1);
        gauge.draw(&mut c, &DrawMeta::default()).unwrap();
        assert_eq!(c.cell(Point::new(4, 0)).unwrap().bg, Color::BLUE);
        assert_eq!(c.cell(Point::new(5, 0)).unwrap().bg, Color::Default);
        assert_eq!(row(&c, 0), "   50%    ");
    }

    #[test]
    fn gauge_clamps() {
        let gauge = Gauge::new(Color::BLUE);
        gauge.set(250);
        let mut c = canvas(4, 1);
        gauge.draw(&mut c, &DrawMeta::default()).unwrap();
        assert_eq!(c.cell(Point::new(3, 0)).unwrap().bg, Color::BLUE);
    }

    #[test]
    fn sparkline_keeps_newest_on_the_right() {
        let spark = Sparkline::new(8);
        for v in [0, 100, 50] {
            spark.push(v);
        }
        let mut c = canvas(5, 1);
        spark.draw(&mut c, &DrawMeta::default()).unwrap();
        assert_eq!(row(&c, 0), "  ▁█▄");
    }

    #[test]
    fn sparkline_drops_oldest_values() {
        let spark = Sparkline::new(2);
        for v in [100, 0, 0] {
            spark.push(v);
        }
        let mut c = canvas(2, 1);
        spark.draw(&mut c, &DrawMeta::default()).unwrap();
        assert_eq!(row(&c, 0), "▁▁");
    }

    #[test]
    fn key_log_lists_newest_first() {
        let log = KeyLog::new(3);
        let meta = EventMeta { focused: true };
        for code in [KeyCode::Char('a'), KeyCode::Enter, KeyCode::F(2), KeyCode::Char(' ')] {
            log.keyboard(&KeyEvent::new(code), &meta).unwrap();
        }
        let mut c = canvas(6, 3);
        log.draw(&mut c, &DrawMeta { focused: true }).unwrap();
        assert_eq!(row(&c, 0), "Space ");
        assert_eq!(row(&c, 1), "F2    ");
        assert_eq!(row(&c, 2), "Enter ");
    }

    #[test]
    fn click_tracker_ignores_outside_positions() {
        let tracker = ClickTracker::new();
        let meta = EventMeta::default();
        let down = |x, y| MouseEvent::new(MouseEventKind::Down(MouseButton::Left), x, y);
        tracker.mouse(&down(2, 1), &meta).unwrap();
        tracker.mouse(&down(u16::MAX, u16::MAX), &meta).unwrap();
        let mut c = canvas(14, 2);
        tracker.draw(&mut c, &DrawMeta::default()).unwrap();
        assert_eq!(row(&c, 0), "click at 2,1  ");
        assert_eq!(c.cell(Point::new(2, 1)).unwrap().ch, 'x');
    }
}
