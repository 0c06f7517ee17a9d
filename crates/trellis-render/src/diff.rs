#![forbid(unsafe_code)]

//! Diff computation between buffers.
//!
//! Backends that keep the previously flushed frame use `BufferDiff` to emit
//! only the cells that changed. The scan is row-major, so changes come out
//! sorted by `(y, x)` and coalesce directly into [`ChangeRun`]s.
//!
//! # Usage
//!
//! ```
//! use trellis_core::geometry::{Point, Size};
//! use trellis_render::buffer::Buffer;
//! use trellis_render::cell::Cell;
//! use trellis_render::diff::BufferDiff;
//!
//! let old = Buffer::new(Size::new(80, 24));
//! let mut new = Buffer::new(Size::new(80, 24));
//! new.set(Point::new(5, 5), Cell::from_char('X'));
//! new.set(Point::new(6, 5), Cell::from_char('Y'));
//!
//! let diff = BufferDiff::compute(&old, &new);
//! assert_eq!(diff.len(), 2);
//! assert_eq!(diff.runs().len(), 1);
//! ```

use trellis_core::geometry::Point;

use crate::buffer::Buffer;

/// A contiguous run of changed cells on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row index.
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

impl ChangeRun {
    /// Create a new change run.
    #[inline]
    pub const fn new(y: u16, x0: u16, x1: u16) -> Self {
        debug_assert!(x0 <= x1);
        Self { y, x0, x1 }
    }

    /// Number of cells in this run.
    #[inline]
    pub const fn len(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    /// Always `false`; a run holds at least one cell.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x1 < self.x0
    }
}

/// Positions where two buffers differ.
#[derive(Debug, Clone, Default)]
pub struct BufferDiff {
    changes: Vec<Point>,
}

impl BufferDiff {
    /// Compute the diff between two buffers.
    ///
    /// If the sizes differ every cell of `new` counts as changed.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("diff_compute", width = new.width(), height = new.height())
            .entered();

        let full = old.size() != new.size();
        let changes: Vec<Point> = new
            .iter()
            .filter(|(p, cell)| full || old.get(*p) != Some(*cell))
            .map(|(p, _)| p)
            .collect();

        #[cfg(feature = "tracing")]
        tracing::trace!(changes = changes.len(), full, "diff computed");

        Self { changes }
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if no cells changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed positions in row-major order.
    #[inline]
    pub fn changes(&self) -> &[Point] {
        &self.changes
    }

    /// Coalesce consecutive changed columns on the same row into runs.
    pub fn runs(&self) -> Vec<ChangeRun> {
        let mut runs: Vec<ChangeRun> = Vec::new();
        for p in &self.changes {
            match runs.last_mut() {
                Some(run) if run.y == p.y && run.x1.checked_add(1) == Some(p.x) => run.x1 = p.x,
                _ => runs.push(ChangeRun::new(p.y, p.x, p.x)),
            }
        }
        runs
    }
}
