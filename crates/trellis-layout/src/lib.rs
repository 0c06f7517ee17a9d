#![forbid(unsafe_code)]

//! Area arithmetic for the container tree.
//!
//! Everything here is pure: rectangles in, rectangles out. The container tree
//! calls into this crate once per node on every draw pass.
//!
//! - [`split`] - divide an area in two along an axis
//! - [`SpacingSides`] - margin and padding, in cells or percent
//! - [`usable_area`] - area minus margin, border, and padding
//! - [`fit_widget`] - apply a widget's size limits and alignment
//!
//! # Rounding
//!
//! Every percentage is floored: 20% of 20 cells is 4, 33% of 10 cells is 3.
//! The second half of a split always receives the exact remainder, so the two
//! halves sum to the input.

use std::fmt;

pub use trellis_core::geometry::{HAlign, Point, Rect, Sides, Size, VAlign};

/// Errors for out-of-range layout values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A split percentage must lie strictly between 0 and 100.
    InvalidSplitPercent { percent: u8 },
    /// A margin/padding percentage must lie in `0..=100`.
    InvalidSpacingPercent { percent: u8 },
    /// Both terms of an aspect ratio must be positive.
    InvalidRatio { width: u16, height: u16 },
    /// Maximum size below minimum size.
    MaxBelowMin { min: Size, max: Size },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSplitPercent { percent } => write!(
                f,
                "invalid split percentage {percent}: must be in the range 0 < p < 100"
            ),
            Self::InvalidSpacingPercent { percent } => write!(
                f,
                "invalid margin or padding percentage {percent}: must be in the range 0 <= p <= 100"
            ),
            Self::InvalidRatio { width, height } => write!(
                f,
                "invalid aspect ratio {width}:{height}: both terms must be > 0"
            ),
            Self::MaxBelowMin { min, max } => write!(
                f,
                "maximum size {}x{} is below minimum size {}x{}",
                max.width, max.height, min.width, min.height
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

// ── Split ───────────────────────────────────────────────────────────────

/// Direction of a split.
///
/// A vertical split places the halves side by side (left, right); a
/// horizontal split stacks them (top, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

/// How much of the split length the halves receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitSize {
    /// First half gets `floor(len * p / 100)`; `0 < p < 100`.
    Percent(u8),
    /// First half gets this many cells (capped at the length).
    Fixed(u16),
    /// Second half gets this many cells (capped at the length).
    FixedFromEnd(u16),
}

impl Default for SplitSize {
    fn default() -> Self {
        Self::Percent(50)
    }
}

impl SplitSize {
    /// Reject out-of-range percentages.
    pub const fn validate(self) -> Result<Self, LayoutError> {
        match self {
            Self::Percent(p) if p == 0 || p >= 100 => {
                Err(LayoutError::InvalidSplitPercent { percent: p })
            }
            other => Ok(other),
        }
    }

    /// Length of the first half when splitting `len` cells.
    pub fn first_len(self, len: u16) -> u16 {
        match self {
            Self::Percent(p) => percent_of(len, p),
            Self::Fixed(cells) => cells.min(len),
            Self::FixedFromEnd(cells) => len - cells.min(len),
        }
    }
}

/// Divide `area` in two. The halves tile `area` exactly.
pub fn split(area: Rect, axis: SplitAxis, size: SplitSize) -> (Rect, Rect) {
    match axis {
        SplitAxis::Vertical => {
            let first = size.first_len(area.width);
            (
                Rect::new(area.x, area.y, first, area.height),
                Rect::new(area.x + first, area.y, area.width - first, area.height),
            )
        }
        SplitAxis::Horizontal => {
            let first = size.first_len(area.height);
            (
                Rect::new(area.x, area.y, area.width, first),
                Rect::new(area.x, area.y + first, area.width, area.height - first),
            )
        }
    }
}

/// `floor(len * percent / 100)`, saturating at `len`.
#[inline]
pub fn percent_of(len: u16, percent: u8) -> u16 {
    let v = u32::from(len) * u32::from(percent.min(100)) / 100;
    v as u16
}

// ── Spacing ─────────────────────────────────────────────────────────────

/// One side of a margin or padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spacing {
    /// Absolute cells.
    Cells(u16),
    /// Percent of the node's full width (left/right) or height (top/bottom).
    Percent(u8),
}

impl Default for Spacing {
    fn default() -> Self {
        Self::Cells(0)
    }
}

impl Spacing {
    /// Reject percentages above 100.
    pub const fn validate(self) -> Result<Self, LayoutError> {
        match self {
            Self::Percent(p) if p > 100 => Err(LayoutError::InvalidSpacingPercent { percent: p }),
            other => Ok(other),
        }
    }

    /// Cells for a side whose axis measures `len`.
    #[inline]
    pub fn resolve(self, len: u16) -> u16 {
        match self {
            Self::Cells(c) => c,
            Self::Percent(p) => percent_of(len, p),
        }
    }
}

/// Margin or padding on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpacingSides {
    pub top: Spacing,
    pub right: Spacing,
    pub bottom: Spacing,
    pub left: Spacing,
}

impl SpacingSides {
    /// Same absolute spacing on every side.
    pub const fn cells(c: u16) -> Self {
        Self {
            top: Spacing::Cells(c),
            right: Spacing::Cells(c),
            bottom: Spacing::Cells(c),
            left: Spacing::Cells(c),
        }
    }

    /// Resolve percentages against `area`.
    pub fn resolve(&self, area: Rect) -> Sides {
        Sides::new(
            self.top.resolve(area.height),
            self.right.resolve(area.width),
            self.bottom.resolve(area.height),
            self.left.resolve(area.width),
        )
    }
}

// ── Usable area ─────────────────────────────────────────────────────────

/// Shrink by a one-cell border ring if `bordered`.
#[inline]
pub fn inside_border(area: Rect, bordered: bool) -> Rect {
    if bordered { area.inner(Sides::all(1)) } else { area }
}

/// The parts of a node's area, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAreas {
    /// The node's full area.
    pub area: Rect,
    /// Area after margin; the border (if any) is drawn on its outer ring.
    pub frame: Rect,
    /// Area inside the border, before padding. Children split this.
    pub inner: Rect,
    /// `inner` after padding. A widget is fitted into this.
    pub usable: Rect,
}

/// Compute a node's areas.
///
/// Margin is taken outside the border and padding inside it. Percentages
/// resolve against the node's full `area`. `padding` only applies to widget
/// leaves; pass `None` for split nodes.
pub fn usable_area(
    area: Rect,
    margin: &SpacingSides,
    bordered: bool,
    padding: Option<&SpacingSides>,
) -> NodeAreas {
    let frame = area.inner(margin.resolve(area));
    let inner = inside_border(frame, bordered);
    let usable = match padding {
        Some(padding) => inner.inner(padding.resolve(area)),
        None => inner,
    };
    NodeAreas {
        area,
        frame,
        inner,
        usable,
    }
}

// ── Widget fitting ──────────────────────────────────────────────────────

/// Size preferences a widget reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeLimits {
    /// Below this the widget is not drawn.
    pub min: Size,
    /// Upper bound; a zero component means unbounded on that axis.
    pub max: Size,
    /// Desired width:height ratio.
    pub ratio: Option<(u16, u16)>,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min: Size::new(1, 1),
            max: Size::ZERO,
            ratio: None,
        }
    }
}

impl SizeLimits {
    /// Reject inconsistent limits.
    pub fn validate(self) -> Result<Self, LayoutError> {
        if let Some((w, h)) = self.ratio
            && (w == 0 || h == 0)
        {
            return Err(LayoutError::InvalidRatio {
                width: w,
                height: h,
            });
        }
        let max_w_low = self.max.width != 0 && self.max.width < self.min.width;
        let max_h_low = self.max.height != 0 && self.max.height < self.min.height;
        if max_w_low || max_h_low {
            return Err(LayoutError::MaxBelowMin {
                min: self.min,
                max: self.max,
            });
        }
        Ok(self)
    }
}

/// Outcome of [`fit_widget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// The usable area cannot hold the widget; draw a placeholder.
    TooSmall,
    /// Draw the widget in this absolute rectangle.
    Fits(Rect),
}

fn gcd(mut a: u16, mut b: u16) -> u16 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Largest size with the given ratio that fits in `avail`.
fn with_ratio(avail: Size, (rw, rh): (u16, u16)) -> Size {
    let g = gcd(rw, rh).max(1);
    let (rw, rh) = (rw / g, rh / g);
    let fact = (avail.width / rw).min(avail.height / rh);
    Size::new(rw * fact, rh * fact)
}

/// Place a widget with `limits` inside `usable`.
pub fn fit_widget(usable: Rect, limits: &SizeLimits, halign: HAlign, valign: VAlign) -> Fit {
    if usable.is_empty() || !limits.min.fits_in(usable.size()) {
        return Fit::TooSmall;
    }

    let mut size = usable.size();
    if limits.max.width != 0 {
        size.width = size.width.min(limits.max.width);
    }
    if limits.max.height != 0 {
        size.height = size.height.min(limits.max.height);
    }
    if let Some(ratio) = limits.ratio {
        size = with_ratio(size, ratio);
    }
    if size.is_empty() || !limits.min.fits_in(size) {
        return Fit::TooSmall;
    }

    let x = usable.x + halign.offset(usable.width, size.width);
    let y = usable.y + valign.offset(usable.height, size.height);
    Fit::Fits(Rect::from_origin(Point::new(x, y), size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_split_floors() {
        let (l, r) = split(
            Rect::new(0, 0, 20, 10),
            SplitAxis::Vertical,
            SplitSize::Percent(20),
        );
        assert_eq!(l, Rect::new(0, 0, 4, 10));
        assert_eq!(r, Rect::new(4, 0, 16, 10));

        let (t, b) = split(
            Rect::new(2, 3, 5, 10),
            SplitAxis::Horizontal,
            SplitSize::Percent(33),
        );
        assert_eq!(t, Rect::new(2, 3, 5, 3));
        assert_eq!(b, Rect::new(2, 6, 5, 7));
    }

    #[test]
    fn fixed_splits_cap_at_length() {
        let area = Rect::new(0, 0, 10, 4);
        assert_eq!(
            split(area, SplitAxis::Vertical, SplitSize::Fixed(3)).0.width,
            3
        );
        assert_eq!(
            split(area, SplitAxis::Vertical, SplitSize::Fixed(30)).1.width,
            0
        );
        let (first, second) = split(area, SplitAxis::Vertical, SplitSize::FixedFromEnd(3));
        assert_eq!((first.width, second.width), (7, 3));
        assert_eq!(second.x, 7);
    }

    #[test]
    fn split_percent_validation() {
        assert!(SplitSize::Percent(0).validate().is_err());
        assert!(SplitSize::Percent(100).validate().is_err());
        assert!(SplitSize::Percent(1).validate().is_ok());
        assert!(SplitSize::Percent(99).validate().is_ok());
        assert!(SplitSize::Fixed(0).validate().is_ok());
    }

    #[test]
    fn spacing_validation_and_resolution() {
        assert!(Spacing::Percent(101).validate().is_err());
        assert!(Spacing::Percent(100).validate().is_ok());
        let sides = SpacingSides {
            top: Spacing::Percent(10),
            right: Spacing::Cells(2),
            bottom: Spacing::Cells(0),
            left: Spacing::Percent(50),
        };
        assert_eq!(sides.resolve(Rect::new(0, 0, 9, 25)), Sides::new(2, 2, 0, 4));
    }

    #[test]
    fn usable_area_layers() {
        let areas = usable_area(
            Rect::new(0, 0, 20, 10),
            &SpacingSides::cells(1),
            true,
            Some(&SpacingSides::cells(2)),
        );
        assert_eq!(areas.frame, Rect::new(1, 1, 18, 8));
        assert_eq!(areas.inner, Rect::new(2, 2, 16, 6));
        assert_eq!(areas.usable, Rect::new(4, 4, 12, 2));
    }

    #[test]
    fn usable_area_without_padding_for_splits() {
        let areas = usable_area(Rect::new(0, 0, 10, 10), &SpacingSides::default(), false, None);
        assert_eq!(areas.usable, areas.area);
    }

    #[test]
    fn fit_centers_by_default() {
        let limits = SizeLimits {
            max: Size::new(10, 10),
            ..SizeLimits::default()
        };
        let fit = fit_widget(
            Rect::new(0, 0, 20, 20),
            &limits,
            HAlign::default(),
            VAlign::default(),
        );
        assert_eq!(fit, Fit::Fits(Rect::new(5, 5, 10, 10)));
    }

    #[test]
    fn fit_alignment_edges() {
        let limits = SizeLimits {
            max: Size::new(4, 2),
            ..SizeLimits::default()
        };
        let usable = Rect::new(1, 1, 10, 6);
        assert_eq!(
            fit_widget(usable, &limits, HAlign::Right, VAlign::Bottom),
            Fit::Fits(Rect::new(7, 5, 4, 2))
        );
        assert_eq!(
            fit_widget(usable, &limits, HAlign::Left, VAlign::Top),
            Fit::Fits(Rect::new(1, 1, 4, 2))
        );
    }

    #[test]
    fn fit_respects_min_size() {
        let limits = SizeLimits {
            min: Size::new(5, 5),
            ..SizeLimits::default()
        };
        assert_eq!(
            fit_widget(Rect::new(0, 0, 4, 10), &limits, HAlign::Center, VAlign::Middle),
            Fit::TooSmall
        );
        assert_eq!(
            fit_widget(Rect::new(0, 0, 0, 10), &SizeLimits::default(), HAlign::Center, VAlign::Middle),
            Fit::TooSmall
        );
    }

    #[test]
    fn fit_applies_ratio() {
        let limits = SizeLimits {
            ratio: Some((4, 2)),
            ..SizeLimits::default()
        };
        // 2:1 inside 9x7 -> fact = min(9/2, 7/1) = 4 -> 8x4.
        assert_eq!(
            fit_widget(Rect::new(0, 0, 9, 7), &limits, HAlign::Left, VAlign::Top),
            Fit::Fits(Rect::new(0, 0, 8, 4))
        );
        let tall = SizeLimits {
            ratio: Some((1, 10)),
            ..SizeLimits::default()
        };
        assert_eq!(
            fit_widget(Rect::new(0, 0, 5, 5), &tall, HAlign::Left, VAlign::Top),
            Fit::TooSmall
        );
    }

    #[test]
    fn limits_validation() {
        let bad_ratio = SizeLimits {
            ratio: Some((0, 3)),
            ..SizeLimits::default()
        };
        assert!(bad_ratio.validate().is_err());
        let low_max = SizeLimits {
            min: Size::new(3, 3),
            max: Size::new(2, 0),
            ratio: None,
        };
        assert!(matches!(low_max.validate(), Err(LayoutError::MaxBelowMin { .. })));
        assert!(SizeLimits::default().validate().is_ok());
    }
}
