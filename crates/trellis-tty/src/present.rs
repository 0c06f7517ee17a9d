#![forbid(unsafe_code)]

//! Writing buffer diffs as terminal commands.
//!
//! Only cells that differ between the last flushed frame and the new one are
//! written. The pen (colors and attributes) and the cursor position are
//! tracked so that consecutive cells with the same style cost one `Print`.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use trellis_core::geometry::Point;
use trellis_render::buffer::Buffer;
use trellis_render::cell::{Cell, Color, StyleFlags};
use trellis_render::diff::BufferDiff;
use unicode_width::UnicodeWidthChar;

const ATTRIBUTES: [(StyleFlags, Attribute); 8] = [
    (StyleFlags::BOLD, Attribute::Bold),
    (StyleFlags::DIM, Attribute::Dim),
    (StyleFlags::ITALIC, Attribute::Italic),
    (StyleFlags::UNDERLINE, Attribute::Underlined),
    (StyleFlags::BLINK, Attribute::SlowBlink),
    (StyleFlags::REVERSE, Attribute::Reverse),
    (StyleFlags::STRIKETHROUGH, Attribute::CrossedOut),
    (StyleFlags::HIDDEN, Attribute::Hidden),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pen {
    fg: Color,
    bg: Color,
    flags: StyleFlags,
}

impl Pen {
    const RESET: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        flags: StyleFlags::empty(),
    };
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Default => TermColor::Reset,
        Color::Indexed(i) => TermColor::AnsiValue(i),
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
    }
}

/// Queue the commands turning `front` into `back` on `out`.
///
/// Returns the number of cells written. Nothing is queued when the buffers
/// are equal.
pub(crate) fn present(out: &mut impl Write, front: &Buffer, back: &Buffer) -> io::Result<usize> {
    let diff = BufferDiff::compute(front, back);
    if diff.is_empty() {
        return Ok(0);
    }

    queue!(out, SetAttribute(Attribute::Reset))?;
    let mut pen = Pen::RESET;
    let mut cursor: Option<Point> = None;
    let mut written = 0;

    for run in diff.runs() {
        let mut x = run.x0;
        while x <= run.x1 {
            let p = Point::new(x, run.y);
            let cell = back.get(p).copied().unwrap_or_default();
            if cursor != Some(p) {
                queue!(out, MoveTo(p.x, p.y))?;
            }
            set_pen(out, &mut pen, &cell)?;

            let (ch, width) = match cell.display_char() {
                c if c.width().unwrap_or(0) == 0 => (' ', 1),
                c => (c, c.width().unwrap_or(1) as u16),
            };
            queue!(out, Print(ch))?;
            written += 1;

            // A wide rune covers the next cell too.
            x = x.saturating_add(width);
            cursor = Some(Point::new(x, run.y));
            if x == u16::MAX {
                break;
            }
        }
    }

    queue!(out, SetAttribute(Attribute::Reset))?;
    Ok(written)
}

fn set_pen(out: &mut impl Write, pen: &mut Pen, cell: &Cell) -> io::Result<()> {
    if cell.flags != pen.flags {
        queue!(out, SetAttribute(Attribute::Reset))?;
        *pen = Pen::RESET;
        for (flag, attribute) in ATTRIBUTES {
            if cell.flags.contains(flag) {
                queue!(out, SetAttribute(attribute))?;
            }
        }
        pen.flags = cell.flags;
    }
    if cell.fg != pen.fg {
        queue!(out, SetForegroundColor(term_color(cell.fg)))?;
        pen.fg = cell.fg;
    }
    if cell.bg != pen.bg {
        queue!(out, SetBackgroundColor(term_color(cell.bg)))?;
        pen.bg = cell.bg;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::geometry::Size;

    fn render(front: &Buffer, back: &Buffer) -> (usize, String) {
        let mut out = Vec::new();
        let written = present(&mut out, front, back).unwrap();
        (written, String::from_utf8(out).unwrap())
    }

    #[test]
    fn equal_buffers_write_nothing() {
        let a = Buffer::new(Size::new(4, 2));
        let (written, text) = render(&a, &a.clone());
        assert_eq!(written, 0);
        assert!(text.is_empty());
    }

    #[test]
    fn changed_cell_is_addressed_and_printed() {
        let front = Buffer::new(Size::new(8, 4));
        let mut back = front.clone();
        back.set(Point::new(4, 2), Cell::from_char('X'));
        let (written, text) = render(&front, &back);
        assert_eq!(written, 1);
        assert!(text.contains("\x1b[3;5H"), "{text:?}");
        assert!(text.contains('X'));
    }

    #[test]
    fn consecutive_cells_share_one_move() {
        let front = Buffer::new(Size::new(8, 1));
        let mut back = front.clone();
        for (i, c) in "abc".chars().enumerate() {
            back.set(Point::new(2 + i as u16, 0), Cell::from_char(c));
        }
        let (written, text) = render(&front, &back);
        assert_eq!(written, 3);
        assert!(text.contains("abc"), "{text:?}");
        assert_eq!(text.matches('H').count(), 1);
    }

    #[test]
    fn colors_are_set_once_per_change() {
        let front = Buffer::new(Size::new(3, 1));
        let mut back = front.clone();
        for x in 0..3 {
            back.set(Point::new(x, 0), Cell::from_char('#').with_fg(Color::RED));
        }
        let (_, text) = render(&front, &back);
        assert_eq!(text.matches("\x1b[38;5;1m").count(), 1);
    }

    #[test]
    fn wide_rune_skips_its_second_cell() {
        let front = Buffer::new(Size::new(4, 1));
        let mut back = front.clone();
        back.set(Point::new(0, 0), Cell::from_char('世'));
        back.set(Point::new(2, 0), Cell::from_char('x'));
        let (written, text) = render(&front, &back);
        assert_eq!(written, 2);
        assert!(text.contains("世x"), "{text:?}");
        assert!(!text.contains("\x1b[1;3H"));
    }

    #[test]
    fn cleared_cell_is_blanked() {
        let mut front = Buffer::new(Size::new(2, 1));
        front.set(Point::new(1, 0), Cell::from_char('z'));
        let back = Buffer::new(Size::new(2, 1));
        let (written, text) = render(&front, &back);
        assert_eq!(written, 1);
        assert!(text.contains("\x1b[1;2H "), "{text:?}");
    }
}
