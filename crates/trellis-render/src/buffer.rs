#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! A `Buffer` is a 2D grid of [`Cell`]s. Canvases own one for their drawing
//! surface; terminals own one (or two) as their back buffer.
//!
//! # Layout
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Out-of-bounds reads return `None`; out-of-bounds writes are rejected.

use trellis_core::geometry::{Point, Rect, Size};

use crate::cell::Cell;

/// A 2D grid of cells.
///
/// # Example
///
/// ```
/// use trellis_core::geometry::{Point, Size};
/// use trellis_render::buffer::Buffer;
/// use trellis_render::cell::Cell;
///
/// let mut buffer = Buffer::new(Size::new(80, 24));
/// assert!(buffer.set(Point::new(0, 0), Cell::from_char('H')));
/// assert!(!buffer.set(Point::new(80, 0), Cell::from_char('!')));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a buffer of empty cells. Zero sizes yield an empty grid.
    pub fn new(size: Size) -> Self {
        let len = size.width as usize * size.height as usize;
        Self {
            width: size.width,
            height: size.height,
            cells: vec![Cell::default(); len],
        }
    }

    /// Buffer width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Width and height.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding rect of the entire buffer.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if p.x < self.width && p.y < self.height {
            Some(p.y as usize * self.width as usize + p.x as usize)
        } else {
            None
        }
    }

    /// Get the cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Get the cell at `p` mutably, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, p: Point) -> Option<&mut Cell> {
        self.index(p).map(|i| &mut self.cells[i])
    }

    /// Overwrite the cell at `p`. Returns `false` if out of bounds.
    #[inline]
    pub fn set(&mut self, p: Point, cell: Cell) -> bool {
        match self.index(p) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Fill the part of `rect` inside the buffer with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let Some(clipped) = self.bounds().intersection(&rect) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set(Point::new(x, y), cell);
            }
        }
    }

    /// Clear all cells to the default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Raw access to the cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cells of row `y`, or an empty slice if out of bounds.
    #[inline]
    pub fn row_cells(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Iterate over `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let x = (i % width) as u16;
            let y = (i / width) as u16;
            (Point::new(x, y), cell)
        })
    }

    /// Change the size, keeping the overlapping top-left region.
    pub fn resize(&mut self, size: Size) {
        if size == self.size() {
            return;
        }
        let mut next = Buffer::new(size);
        let overlap = Rect::from_size(Size::new(
            self.width.min(size.width),
            self.height.min(size.height),
        ));
        next.copy_from(self, overlap, Point::ORIGIN);
        *self = next;
    }

    /// Copy `src_rect` of `src` into this buffer with its top-left at `dst`.
    ///
    /// Cells landing outside this buffer are skipped.
    pub fn copy_from(&mut self, src: &Buffer, src_rect: Rect, dst: Point) {
        for dy in 0..src_rect.height {
            for dx in 0..src_rect.width {
                let from = Point::new(src_rect.x.saturating_add(dx), src_rect.y.saturating_add(dy));
                if let Some(cell) = src.get(from) {
                    let to = Point::new(dst.x.saturating_add(dx), dst.y.saturating_add(dy));
                    self.set(to, *cell);
                }
            }
        }
    }

    /// Render the grid as text, one line per row, empty cells as spaces.
    ///
    /// Trailing spaces are kept so every line has `width` characters.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            out.extend(self.row_cells(y).iter().map(Cell::display_char));
        }
        out
    }
}

impl Default for Buffer {
    /// A 1x1 buffer.
    fn default() -> Self {
        Self::new(Size::new(1, 1))
    }
}
