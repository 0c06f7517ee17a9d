#![forbid(unsafe_code)]

//! Cell types.
//!
//! A [`Cell`] is one character position of the terminal grid: a rune plus
//! foreground/background [`Color`] and [`StyleFlags`].
//!
//! # Invariants
//!
//! - The default cell is *empty*: rune `'\0'`, default colors, no flags.
//! - Empty cells are never written through by [`Canvas::apply`] or
//!   [`Canvas::copy_to`], so an untouched canvas leaves its target as is.
//!
//! [`Canvas::apply`]: crate::canvas::Canvas::apply
//! [`Canvas::copy_to`]: crate::canvas::Canvas::copy_to

use bitflags::bitflags;

/// A terminal color.
///
/// Color-space conversion is left to the backend: indexed colors are passed
/// through as palette indices, RGB colors as truecolor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's own default foreground/background.
    #[default]
    Default,
    /// A 256-color palette index.
    Indexed(u8),
    /// A truecolor value.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed(0);
    pub const RED: Self = Self::Indexed(1);
    pub const GREEN: Self = Self::Indexed(2);
    pub const YELLOW: Self = Self::Indexed(3);
    pub const BLUE: Self = Self::Indexed(4);
    pub const MAGENTA: Self = Self::Indexed(5);
    pub const CYAN: Self = Self::Indexed(6);
    pub const WHITE: Self = Self::Indexed(7);

    /// Create a truecolor value.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(r, g, b)
    }

    /// Whether this is the terminal default.
    #[inline]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

bitflags! {
    /// 8-bit cell style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD          = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM           = 0b0000_0010;
        /// Italic text.
        const ITALIC        = 0b0000_0100;
        /// Underlined text.
        const UNDERLINE     = 0b0000_1000;
        /// Blinking text.
        const BLINK         = 0b0001_0000;
        /// Reverse video (swap fg/bg).
        const REVERSE       = 0b0010_0000;
        /// Strikethrough text.
        const STRIKETHROUGH = 0b0100_0000;
        /// Hidden / invisible text.
        const HIDDEN        = 0b1000_0000;
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Displayed character. `'\0'` means empty.
    pub ch: char,
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Style flags.
    pub flags: StyleFlags,
}

impl Cell {
    /// The empty cell.
    pub const EMPTY: Self = Self {
        ch: '\0',
        fg: Color::Default,
        bg: Color::Default,
        flags: StyleFlags::empty(),
    };

    /// Create a cell from a single character with default style.
    #[inline]
    pub const fn from_char(ch: char) -> Self {
        Self { ch, ..Self::EMPTY }
    }

    /// Check if this cell is the empty default.
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Set the cell content to a character, preserving style.
    #[inline]
    pub const fn with_char(mut self, ch: char) -> Self {
        self.ch = ch;
        self
    }

    /// Set the foreground color.
    #[inline]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color.
    #[inline]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Set the style flags.
    #[inline]
    pub const fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Write `ch` and merge the explicitly given attributes.
    ///
    /// Colors left unset in `opts` keep their prior value; flags are added to
    /// the existing ones.
    pub fn merge(&mut self, ch: char, opts: &CellOptions) {
        self.ch = ch;
        if let Some(fg) = opts.fg {
            self.fg = fg;
        }
        if let Some(bg) = opts.bg {
            self.bg = bg;
        }
        self.flags |= opts.flags;
    }

    /// The character to display, with empty shown as a space.
    #[inline]
    pub fn display_char(&self) -> char {
        if self.ch == '\0' { ' ' } else { self.ch }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Attributes to merge into a cell on write.
///
/// # Example
///
/// ```
/// use trellis_render::cell::{Cell, CellOptions, Color, StyleFlags};
///
/// let mut cell = Cell::default().with_bg(Color::BLUE);
/// cell.merge('x', &CellOptions::new().fg(Color::RED).bold());
/// assert_eq!(cell.fg, Color::RED);
/// assert_eq!(cell.bg, Color::BLUE);
/// assert!(cell.flags.contains(StyleFlags::BOLD));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellOptions {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub flags: StyleFlags,
}

impl CellOptions {
    /// No attributes; writes only the rune.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: StyleFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn bold(self) -> Self {
        self.flags(StyleFlags::BOLD)
    }

    #[must_use]
    pub fn underline(self) -> Self {
        self.flags(StyleFlags::UNDERLINE)
    }

    #[must_use]
    pub fn italic(self) -> Self {
        self.flags(StyleFlags::ITALIC)
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        self.flags(StyleFlags::REVERSE)
    }
}

impl From<&Cell> for CellOptions {
    /// Options reproducing every attribute of `cell`.
    fn from(cell: &Cell) -> Self {
        Self {
            fg: Some(cell.fg),
            bg: Some(cell.bg),
            flags: cell.flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_empty() {
        assert!(Cell::default().is_empty());
        assert!(!Cell::from_char('a').is_empty());
        assert!(!Cell::default().with_bg(Color::RED).is_empty());
    }

    #[test]
    fn merge_keeps_unset_attributes() {
        let mut cell = Cell::from_char('a')
            .with_fg(Color::GREEN)
            .with_bg(Color::BLUE)
            .with_flags(StyleFlags::ITALIC);
        cell.merge('b', &CellOptions::new().bg(Color::RED).bold());
        assert_eq!(cell.ch, 'b');
        assert_eq!(cell.fg, Color::GREEN);
        assert_eq!(cell.bg, Color::RED);
        assert_eq!(cell.flags, StyleFlags::ITALIC | StyleFlags::BOLD);
    }

    #[test]
    fn options_from_cell_reproduce_it() {
        let src = Cell::from_char('z')
            .with_fg(Color::rgb(1, 2, 3))
            .with_flags(StyleFlags::UNDERLINE);
        let mut dst = Cell::default();
        dst.merge(src.ch, &CellOptions::from(&src));
        assert_eq!(dst, src);
    }

    #[test]
    fn display_char_renders_empty_as_space() {
        assert_eq!(Cell::default().display_char(), ' ');
        assert_eq!(Cell::from_char('#').display_char(), '#');
    }

    #[test]
    fn color_helpers() {
        assert!(Color::default().is_default());
        assert!(!Color::YELLOW.is_default());
        assert_eq!(Color::rgb(1, 2, 3), Color::Rgb(1, 2, 3));
    }
}
