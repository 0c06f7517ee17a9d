#![forbid(unsafe_code)]

//! Canvas: a bounded drawing surface tied to a screen area.
//!
//! Widgets draw on a canvas in local coordinates starting at `(0, 0)`. The
//! canvas remembers the absolute terminal area it stands for, so it can later
//! be composited into a parent canvas ([`Canvas::copy_to`]) or written to the
//! terminal's back buffer ([`Canvas::apply`]).
//!
//! # Invariants
//!
//! - A canvas is never zero-sized.
//! - [`Canvas::set_cell`] rejects points outside `[0, width) x [0, height)`.
//! - Empty cells are never written through, so an untouched canvas leaves
//!   its target unchanged.

use std::fmt;

use trellis_core::geometry::{Point, Rect, Size};

use crate::buffer::Buffer;
use crate::cell::{Cell, CellOptions};
use crate::terminal::{Terminal, TerminalError};

/// Errors raised by canvas operations.
#[derive(Debug)]
pub enum CanvasError {
    /// A canvas cannot be created for an empty area.
    EmptyArea(Rect),
    /// A write or read outside the canvas.
    OutOfBounds { point: Point, size: Size },
    /// The canvas area does not fit the terminal.
    DoesNotFit { area: Rect, terminal: Size },
    /// The terminal rejected a write.
    Terminal(TerminalError),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyArea(area) => write!(
                f,
                "cannot create a canvas for the empty area {}x{} at ({}, {})",
                area.width, area.height, area.x, area.y
            ),
            Self::OutOfBounds { point, size } => write!(
                f,
                "point ({}, {}) is outside the {}x{} canvas",
                point.x, point.y, size.width, size.height
            ),
            Self::DoesNotFit { area, terminal } => write!(
                f,
                "canvas area {}x{} at ({}, {}) does not fit the {}x{} terminal",
                area.width, area.height, area.x, area.y, terminal.width, terminal.height
            ),
            Self::Terminal(err) => write!(f, "terminal rejected canvas cell: {err}"),
        }
    }
}

impl std::error::Error for CanvasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Terminal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TerminalError> for CanvasError {
    fn from(err: TerminalError) -> Self {
        Self::Terminal(err)
    }
}

/// A drawing surface for one screen area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    area: Rect,
    buffer: Buffer,
}

impl Canvas {
    /// Allocate an empty canvas standing for `area`.
    pub fn new(area: Rect) -> Result<Self, CanvasError> {
        if area.is_empty() {
            return Err(CanvasError::EmptyArea(area));
        }
        Ok(Self {
            area,
            buffer: Buffer::new(area.size()),
        })
    }

    /// The absolute area this canvas stands for.
    #[inline]
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// Width and height.
    #[inline]
    pub const fn size(&self) -> Size {
        self.area.size()
    }

    /// The canvas in its own coordinates: `(0, 0, width, height)`.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.area.size())
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Write `ch` at `p`, merging only the attributes given in `opts`.
    pub fn set_cell(&mut self, p: Point, ch: char, opts: &CellOptions) -> Result<(), CanvasError> {
        let size = self.size();
        let cell = self
            .buffer
            .get_mut(p)
            .ok_or(CanvasError::OutOfBounds { point: p, size })?;
        cell.merge(ch, opts);
        Ok(())
    }

    /// Overwrite the whole cell at `p`.
    pub fn put(&mut self, p: Point, cell: Cell) -> Result<(), CanvasError> {
        if self.buffer.set(p, cell) {
            Ok(())
        } else {
            Err(CanvasError::OutOfBounds {
                point: p,
                size: self.size(),
            })
        }
    }

    /// Read the cell at `p`.
    pub fn cell(&self, p: Point) -> Result<Cell, CanvasError> {
        self.buffer
            .get(p)
            .copied()
            .ok_or(CanvasError::OutOfBounds {
                point: p,
                size: self.size(),
            })
    }

    /// The underlying grid, in local coordinates.
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    /// Write every non-empty cell to the terminal at its absolute position.
    pub fn apply(&self, terminal: &dyn Terminal) -> Result<(), CanvasError> {
        let term = terminal.size();
        if !Rect::from_size(term).contains_rect(&self.area) {
            return Err(CanvasError::DoesNotFit {
                area: self.area,
                terminal: term,
            });
        }
        for (p, cell) in self.buffer.iter() {
            if cell.is_empty() {
                continue;
            }
            let abs = Point::new(self.area.x + p.x, self.area.y + p.y);
            terminal.set_cell(abs, *cell)?;
        }
        Ok(())
    }

    /// Copy the region where both canvases overlap on screen into `dst`.
    ///
    /// Empty cells are skipped. Canvases that do not overlap are left alone.
    pub fn copy_to(&self, dst: &mut Canvas) {
        let Some(overlap) = self.area.intersection(&dst.area) else {
            return;
        };
        for y in overlap.y..overlap.bottom() {
            for x in overlap.x..overlap.right() {
                let src_p = Point::new(x - self.area.x, y - self.area.y);
                let Some(cell) = self.buffer.get(src_p) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                let dst_p = Point::new(x - dst.area.x, y - dst.area.y);
                dst.buffer.set(dst_p, *cell);
            }
        }
    }
}
