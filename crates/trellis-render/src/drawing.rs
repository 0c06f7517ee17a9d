#![forbid(unsafe_code)]

//! Drawing primitives for canvases.
//!
//! Helpers on top of [`Canvas`] cell writes so containers and widgets can draw
//! borders, titles, lines and text without repeating low-level loops. All
//! coordinates are canvas-local and every helper clips silently at the canvas
//! edge.

use trellis_core::geometry::{HAlign, Point, Rect};
use unicode_width::UnicodeWidthChar;

use crate::canvas::Canvas;
use crate::cell::{Cell, CellOptions};

/// Glyph drawn when an area is too small for its content.
pub const PLACEHOLDER: char = '⇄';

/// Glyph marking a truncated title.
pub const ELLIPSIS: char = '…';

/// Characters used to draw a border around a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    /// Simple box-drawing characters (U+250x).
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    /// Rounded corners.
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    /// Double-line border.
    pub const DOUBLE: Self = Self {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
    };

    /// Heavy (thick) border.
    pub const HEAVY: Self = Self {
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
        horizontal: '━',
        vertical: '┃',
    };

    /// ASCII-only border.
    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
    };
}

/// Named border styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    #[default]
    Light,
    Rounded,
    Double,
    Heavy,
    Ascii,
}

impl LineStyle {
    /// The glyph set for this style.
    pub const fn chars(self) -> BorderChars {
        match self {
            Self::Light => BorderChars::SQUARE,
            Self::Rounded => BorderChars::ROUNDED,
            Self::Double => BorderChars::DOUBLE,
            Self::Heavy => BorderChars::HEAVY,
            Self::Ascii => BorderChars::ASCII,
        }
    }
}

/// Extension trait for drawing on a canvas.
pub trait Draw {
    /// Draw a horizontal line of cells.
    fn draw_horizontal_line(&mut self, start: Point, width: u16, cell: Cell);

    /// Draw a vertical line of cells.
    fn draw_vertical_line(&mut self, start: Point, height: u16, cell: Cell);

    /// Draw a filled rectangle.
    fn draw_rect_filled(&mut self, rect: Rect, cell: Cell);

    /// Print text starting at `start`, merging `opts` into each cell.
    ///
    /// Zero-width characters are skipped and a wide character that would
    /// straddle `max_x` is not started. Returns the x position after the
    /// last character.
    fn print_text_clipped(&mut self, start: Point, text: &str, opts: &CellOptions, max_x: u16)
    -> u16;

    /// Print text up to the canvas edge.
    fn print_text(&mut self, start: Point, text: &str, opts: &CellOptions) -> u16;

    /// Draw a border on the outermost ring of `rect`.
    ///
    /// The cell's colors and flags are applied to every border glyph.
    fn draw_border(&mut self, rect: Rect, chars: BorderChars, base_cell: Cell);

    /// Print `title` on the top edge of a bordered `rect`, between the
    /// corners, truncated with an ellipsis when it does not fit.
    fn draw_border_title(&mut self, rect: Rect, title: &str, align: HAlign, opts: &CellOptions);

    /// Draw [`PLACEHOLDER`] at `p`.
    fn draw_placeholder(&mut self, p: Point, opts: &CellOptions);
}

fn text_width(text: &str) -> u16 {
    let width: usize = text
        .chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum();
    u16::try_from(width).unwrap_or(u16::MAX)
}

/// Cut `text` to at most `max` cells, ending in an ellipsis if shortened.
fn truncate(text: &str, max: u16) -> String {
    if text_width(text) <= max {
        return text.to_owned();
    }
    if max == 0 {
        return String::new();
    }
    let budget = max - 1;
    let mut used = 0u16;
    let mut out = String::new();
    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0) as u16;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    out
}

impl Draw for Canvas {
    fn draw_horizontal_line(&mut self, start: Point, width: u16, cell: Cell) {
        for i in 0..width {
            self.buffer_mut()
                .set(Point::new(start.x.saturating_add(i), start.y), cell);
        }
    }

    fn draw_vertical_line(&mut self, start: Point, height: u16, cell: Cell) {
        for i in 0..height {
            self.buffer_mut()
                .set(Point::new(start.x, start.y.saturating_add(i)), cell);
        }
    }

    fn draw_rect_filled(&mut self, rect: Rect, cell: Cell) {
        self.buffer_mut().fill(rect, cell);
    }

    fn print_text_clipped(
        &mut self,
        start: Point,
        text: &str,
        opts: &CellOptions,
        max_x: u16,
    ) -> u16 {
        let mut cx = start.x;
        for c in text.chars() {
            let width = UnicodeWidthChar::width(c).unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if cx >= max_x || cx.saturating_add(width) > max_x {
                break;
            }
            if let Some(cell) = self.buffer_mut().get_mut(Point::new(cx, start.y)) {
                cell.merge(c, opts);
            }
            cx = cx.saturating_add(width);
        }
        cx
    }

    fn print_text(&mut self, start: Point, text: &str, opts: &CellOptions) -> u16 {
        let max_x = self.size().width;
        self.print_text_clipped(start, text, opts, max_x)
    }

    fn draw_border(&mut self, rect: Rect, chars: BorderChars, base_cell: Cell) {
        if rect.is_empty() {
            return;
        }

        let h_cell = base_cell.with_char(chars.horizontal);
        let v_cell = base_cell.with_char(chars.vertical);
        let left = rect.x;
        let top = rect.y;
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;

        self.draw_horizontal_line(Point::new(left, top), rect.width, h_cell);
        if rect.height > 1 {
            self.draw_horizontal_line(Point::new(left, bottom), rect.width, h_cell);
        }
        if rect.height > 2 {
            self.draw_vertical_line(Point::new(left, top + 1), rect.height - 2, v_cell);
            if rect.width > 1 {
                self.draw_vertical_line(Point::new(right, top + 1), rect.height - 2, v_cell);
            }
        }

        // Corners last so they overwrite the edges.
        let buf = self.buffer_mut();
        buf.set(Point::new(left, top), base_cell.with_char(chars.top_left));
        if rect.width > 1 {
            buf.set(Point::new(right, top), base_cell.with_char(chars.top_right));
        }
        if rect.height > 1 {
            buf.set(Point::new(left, bottom), base_cell.with_char(chars.bottom_left));
        }
        if rect.width > 1 && rect.height > 1 {
            buf.set(Point::new(right, bottom), base_cell.with_char(chars.bottom_right));
        }
    }

    fn draw_border_title(&mut self, rect: Rect, title: &str, align: HAlign, opts: &CellOptions) {
        if title.is_empty() || rect.width <= 2 || rect.height == 0 {
            return;
        }
        let avail = rect.width - 2;
        let shown = truncate(title, avail);
        let x = rect.x + 1 + align.offset(avail, text_width(&shown));
        self.print_text_clipped(Point::new(x, rect.y), &shown, opts, rect.right() - 1);
    }

    fn draw_placeholder(&mut self, p: Point, opts: &CellOptions) {
        if let Some(cell) = self.buffer_mut().get_mut(p) {
            cell.merge(PLACEHOLDER, opts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Color;
    use trellis_core::geometry::Size;

    fn canvas(w: u16, h: u16) -> Canvas {
        Canvas::new(Rect::from_size(Size::new(w, h))).unwrap()
    }

    fn text(c: &Canvas) -> String {
        c.buffer().to_text()
    }

    #[test]
    fn border_square() {
        let mut c = canvas(4, 3);
        c.draw_border(c.bounds(), BorderChars::SQUARE, Cell::default());
        assert_eq!(text(&c), "┌──┐\n│  │\n└──┘");
    }

    #[test]
    fn border_1x1_and_2x2() {
        let mut c = canvas(1, 1);
        c.draw_border(c.bounds(), BorderChars::ROUNDED, Cell::default());
        assert_eq!(text(&c), "╭");

        let mut c = canvas(2, 2);
        c.draw_border(c.bounds(), BorderChars::ASCII, Cell::default());
        assert_eq!(text(&c), "++\n++");
    }

    #[test]
    fn border_preserves_style() {
        let mut c = canvas(3, 3);
        c.draw_border(c.bounds(), BorderChars::HEAVY, Cell::default().with_fg(Color::RED));
        assert!(
            c.buffer()
                .iter()
                .filter(|(_, cell)| !cell.is_empty())
                .all(|(_, cell)| cell.fg == Color::RED)
        );
        assert!(c.cell(Point::new(1, 1)).unwrap().is_empty());
    }

    #[test]
    fn border_clips_at_canvas_edge() {
        let mut c = canvas(3, 3);
        c.draw_border(Rect::new(1, 1, 5, 5), BorderChars::SQUARE, Cell::default());
        assert_eq!(text(&c), "   \n ┌─\n │ ");
    }

    #[test]
    fn title_alignment() {
        let mut c = canvas(8, 1);
        c.draw_border_title(c.bounds(), "ab", HAlign::Left, &CellOptions::new());
        assert_eq!(text(&c), " ab     ");

        let mut c = canvas(8, 1);
        c.draw_border_title(c.bounds(), "ab", HAlign::Center, &CellOptions::new());
        assert_eq!(text(&c), "   ab   ");

        let mut c = canvas(8, 1);
        c.draw_border_title(c.bounds(), "ab", HAlign::Right, &CellOptions::new());
        assert_eq!(text(&c), "     ab ");
    }

    #[test]
    fn title_truncates_with_ellipsis() {
        let mut c = canvas(6, 1);
        c.draw_border_title(c.bounds(), "abcdefg", HAlign::Left, &CellOptions::new());
        assert_eq!(text(&c), " abc… ");
    }

    #[test]
    fn print_text_clips_and_skips_wide_overflow() {
        let mut c = canvas(3, 1);
        let end = c.print_text(Point::ORIGIN, "a界b", &CellOptions::new());
        assert_eq!(end, 3);
        assert_eq!(c.cell(Point::new(1, 0)).unwrap().ch, '界');

        let mut c = canvas(3, 1);
        let end = c.print_text(Point::new(2, 0), "界", &CellOptions::new());
        assert_eq!(end, 2);
        assert!(c.cell(Point::new(2, 0)).unwrap().is_empty());
    }

    #[test]
    fn placeholder_is_drawn_in_bounds_only() {
        let mut c = canvas(2, 2);
        c.draw_placeholder(Point::ORIGIN, &CellOptions::new());
        c.draw_placeholder(Point::new(5, 5), &CellOptions::new());
        assert_eq!(c.cell(Point::ORIGIN).unwrap().ch, PLACEHOLDER);
    }

    #[test]
    fn line_styles_map_to_presets() {
        assert_eq!(LineStyle::default().chars(), BorderChars::SQUARE);
        assert_eq!(LineStyle::Double.chars(), BorderChars::DOUBLE);
    }
}
