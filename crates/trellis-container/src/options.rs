#![forbid(unsafe_code)]

//! Declarative container options.
//!
//! A container is configured with an ordered list of [`Opt`] values built by
//! the free functions in this module. The list is folded into a
//! [`ContainerOptions`] one option at a time and each option is validated as
//! it is applied, so a bad value is reported by `Container::new` or
//! `Container::update` and never at draw time.
//!
//! ```ignore
//! use trellis_container::options::*;
//!
//! let opts = vec![
//!     border(LineStyle::Rounded),
//!     border_title("cpu"),
//!     split_vertical(
//!         vec![id("left"), place_widget(chart)],
//!         vec![id("right"), margin_left(1)],
//!         split_percent(30),
//!     ),
//! ];
//! ```

use std::fmt;
use std::sync::Arc;

use trellis_core::event::KeyEvent;
use trellis_layout::SpacingSides;
use trellis_widgets::Widget;

use crate::error::ContainerError;

pub use trellis_core::geometry::{HAlign, VAlign};
pub use trellis_layout::{Spacing, SplitAxis, SplitSize};
pub use trellis_render::cell::Color;
pub use trellis_render::drawing::LineStyle;

/// Default color of borders and titles.
pub const DEFAULT_BORDER_COLOR: Color = Color::Default;

/// Default color of the focused container's border.
pub const DEFAULT_FOCUSED_COLOR: Color = Color::YELLOW;

/// One side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Left => 3,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        })
    }
}

/// A single container option.
#[derive(Clone)]
pub enum Opt {
    Split {
        axis: SplitAxis,
        size: SplitSize,
        first: Vec<Opt>,
        second: Vec<Opt>,
    },
    Widget(Arc<dyn Widget>),
    ClearWidget,
    Border(LineStyle),
    ClearBorder,
    BorderTitle(String),
    BorderTitleAlign(HAlign),
    BorderColor(Color),
    FocusedColor(Color),
    Margin(Side, Spacing),
    Padding(Side, Spacing),
    AlignHorizontal(HAlign),
    AlignVertical(VAlign),
    Id(String),
    Focused,
    KeyFocusNext(KeyEvent),
    KeyFocusPrevious(KeyEvent),
    KeyFocusSkip,
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Split {
                axis,
                size,
                first,
                second,
            } => f
                .debug_struct("Split")
                .field("axis", axis)
                .field("size", size)
                .field("first", first)
                .field("second", second)
                .finish(),
            Self::Widget(_) => f.write_str("Widget(..)"),
            Self::ClearWidget => f.write_str("ClearWidget"),
            Self::Border(style) => f.debug_tuple("Border").field(style).finish(),
            Self::ClearBorder => f.write_str("ClearBorder"),
            Self::BorderTitle(title) => f.debug_tuple("BorderTitle").field(title).finish(),
            Self::BorderTitleAlign(a) => f.debug_tuple("BorderTitleAlign").field(a).finish(),
            Self::BorderColor(c) => f.debug_tuple("BorderColor").field(c).finish(),
            Self::FocusedColor(c) => f.debug_tuple("FocusedColor").field(c).finish(),
            Self::Margin(side, s) => f.debug_tuple("Margin").field(side).field(s).finish(),
            Self::Padding(side, s) => f.debug_tuple("Padding").field(side).field(s).finish(),
            Self::AlignHorizontal(a) => f.debug_tuple("AlignHorizontal").field(a).finish(),
            Self::AlignVertical(a) => f.debug_tuple("AlignVertical").field(a).finish(),
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Focused => f.write_str("Focused"),
            Self::KeyFocusNext(k) => f.debug_tuple("KeyFocusNext").field(k).finish(),
            Self::KeyFocusPrevious(k) => f.debug_tuple("KeyFocusPrevious").field(k).finish(),
            Self::KeyFocusSkip => f.write_str("KeyFocusSkip"),
        }
    }
}

// ── Constructors ────────────────────────────────────────────────────────

/// Split into a left and a right child.
pub fn split_vertical(left: Vec<Opt>, right: Vec<Opt>, size: SplitSize) -> Opt {
    Opt::Split {
        axis: SplitAxis::Vertical,
        size,
        first: left,
        second: right,
    }
}

/// Split into a top and a bottom child.
pub fn split_horizontal(top: Vec<Opt>, bottom: Vec<Opt>, size: SplitSize) -> Opt {
    Opt::Split {
        axis: SplitAxis::Horizontal,
        size,
        first: top,
        second: bottom,
    }
}

/// First child gets `percent` of the space, `0 < percent < 100`.
pub const fn split_percent(percent: u8) -> SplitSize {
    SplitSize::Percent(percent)
}

/// First child gets `cells`; the second gets the rest.
pub const fn split_fixed(cells: u16) -> SplitSize {
    SplitSize::Fixed(cells)
}

/// Second child gets `cells`; the first gets the rest.
pub const fn split_fixed_from_end(cells: u16) -> SplitSize {
    SplitSize::FixedFromEnd(cells)
}

/// Place a widget, replacing any children.
pub fn place_widget(widget: Arc<dyn Widget>) -> Opt {
    Opt::Widget(widget)
}

/// Remove the widget, if any.
pub fn clear_widget() -> Opt {
    Opt::ClearWidget
}

pub fn border(style: LineStyle) -> Opt {
    Opt::Border(style)
}

pub fn clear_border() -> Opt {
    Opt::ClearBorder
}

/// Title drawn on the top border line.
pub fn border_title(title: impl Into<String>) -> Opt {
    Opt::BorderTitle(title.into())
}

pub fn border_title_align(align: HAlign) -> Opt {
    Opt::BorderTitleAlign(align)
}

/// Border color, inherited by children.
pub fn border_color(color: Color) -> Opt {
    Opt::BorderColor(color)
}

/// Border color while focused, inherited by children.
pub fn focused_color(color: Color) -> Opt {
    Opt::FocusedColor(color)
}

macro_rules! spacing_opts {
    ($variant:ident, $side:ident, $cells:ident, $percent:ident) => {
        pub fn $cells(cells: u16) -> Opt {
            Opt::$variant(Side::$side, Spacing::Cells(cells))
        }

        pub fn $percent(percent: u8) -> Opt {
            Opt::$variant(Side::$side, Spacing::Percent(percent))
        }
    };
}

spacing_opts!(Margin, Top, margin_top, margin_top_percent);
spacing_opts!(Margin, Right, margin_right, margin_right_percent);
spacing_opts!(Margin, Bottom, margin_bottom, margin_bottom_percent);
spacing_opts!(Margin, Left, margin_left, margin_left_percent);
spacing_opts!(Padding, Top, padding_top, padding_top_percent);
spacing_opts!(Padding, Right, padding_right, padding_right_percent);
spacing_opts!(Padding, Bottom, padding_bottom, padding_bottom_percent);
spacing_opts!(Padding, Left, padding_left, padding_left_percent);

/// Horizontal placement of a widget smaller than its usable area.
pub fn align_horizontal(align: HAlign) -> Opt {
    Opt::AlignHorizontal(align)
}

/// Vertical placement of a widget smaller than its usable area.
pub fn align_vertical(align: VAlign) -> Opt {
    Opt::AlignVertical(align)
}

/// Identifier used by `Container::update`. Must be unique in the tree.
pub fn id(id: impl Into<String>) -> Opt {
    Opt::Id(id.into())
}

/// Start with this container focused.
pub fn focused() -> Opt {
    Opt::Focused
}

/// Key moving focus to the next widget container. Root only.
pub fn key_focus_next(key: impl Into<KeyEvent>) -> Opt {
    Opt::KeyFocusNext(key.into())
}

/// Key moving focus to the previous widget container. Root only.
pub fn key_focus_previous(key: impl Into<KeyEvent>) -> Opt {
    Opt::KeyFocusPrevious(key.into())
}

/// Leave this container out of keyboard focus cycling.
pub fn key_focus_skip() -> Opt {
    Opt::KeyFocusSkip
}

// ── Folded options ──────────────────────────────────────────────────────

/// Validated scalar options of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOptions {
    pub id: Option<String>,
    pub border: Option<LineStyle>,
    pub title: String,
    pub title_align: HAlign,
    pub border_color: Color,
    pub focused_color: Color,
    pub margin: SpacingSides,
    pub padding: SpacingSides,
    pub halign: HAlign,
    pub valign: VAlign,
    pub focused: bool,
    pub key_focus_next: Option<KeyEvent>,
    pub key_focus_previous: Option<KeyEvent>,
    pub key_focus_skip: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self::inheriting(DEFAULT_BORDER_COLOR, DEFAULT_FOCUSED_COLOR)
    }
}

impl ContainerOptions {
    /// Defaults for a child whose parent uses these colors.
    pub fn inheriting(border_color: Color, focused_color: Color) -> Self {
        Self {
            id: None,
            border: None,
            title: String::new(),
            title_align: HAlign::Left,
            border_color,
            focused_color,
            margin: SpacingSides::default(),
            padding: SpacingSides::default(),
            halign: HAlign::default(),
            valign: VAlign::default(),
            focused: false,
            key_focus_next: None,
            key_focus_previous: None,
            key_focus_skip: false,
        }
    }

    /// Defaults for a child of `self`.
    pub fn child_defaults(&self) -> Self {
        Self::inheriting(self.border_color, self.focused_color)
    }

    #[inline]
    pub fn bordered(&self) -> bool {
        self.border.is_some()
    }
}

/// What occupies a container after folding.
#[derive(Clone, Default)]
pub(crate) enum Content {
    #[default]
    Empty,
    Widget(Arc<dyn Widget>),
    Split {
        axis: SplitAxis,
        size: SplitSize,
        first: Vec<Opt>,
        second: Vec<Opt>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Cells,
    Percent,
}

impl Unit {
    const fn of(spacing: Spacing) -> Self {
        match spacing {
            Spacing::Cells(_) => Self::Cells,
            Spacing::Percent(_) => Self::Percent,
        }
    }
}

/// Tracks which unit each side was given in, to reject mixing.
#[derive(Debug, Default)]
struct Units {
    margin: [Option<Unit>; 4],
    padding: [Option<Unit>; 4],
}

fn set_side(sides: &mut SpacingSides, side: Side, spacing: Spacing) {
    match side {
        Side::Top => sides.top = spacing,
        Side::Right => sides.right = spacing,
        Side::Bottom => sides.bottom = spacing,
        Side::Left => sides.left = spacing,
    }
}

fn check_unit(
    seen: &mut [Option<Unit>; 4],
    what: &'static str,
    side: Side,
    spacing: Spacing,
) -> Result<(), ContainerError> {
    let unit = Unit::of(spacing);
    match seen[side.index()] {
        Some(prev) if prev != unit => Err(ContainerError::ConflictingSpacing { what, side }),
        _ => {
            seen[side.index()] = Some(unit);
            Ok(())
        }
    }
}

/// Fold `opts` over `base`, validating each option as it is applied.
pub(crate) fn fold(
    base: ContainerOptions,
    opts: Vec<Opt>,
) -> Result<(ContainerOptions, Content), ContainerError> {
    let mut options = base;
    let mut content = Content::Empty;
    let mut units = Units::default();

    for opt in opts {
        match opt {
            Opt::Split {
                axis,
                size,
                first,
                second,
            } => {
                size.validate()?;
                content = Content::Split {
                    axis,
                    size,
                    first,
                    second,
                };
            }
            Opt::Widget(widget) => {
                widget.options().validate()?;
                content = Content::Widget(widget);
            }
            Opt::ClearWidget => {
                if matches!(content, Content::Widget(_)) {
                    content = Content::Empty;
                }
            }
            Opt::Border(style) => options.border = Some(style),
            Opt::ClearBorder => options.border = None,
            Opt::BorderTitle(title) => options.title = title,
            Opt::BorderTitleAlign(align) => options.title_align = align,
            Opt::BorderColor(color) => options.border_color = color,
            Opt::FocusedColor(color) => options.focused_color = color,
            Opt::Margin(side, spacing) => {
                spacing.validate()?;
                check_unit(&mut units.margin, "margin", side, spacing)?;
                set_side(&mut options.margin, side, spacing);
            }
            Opt::Padding(side, spacing) => {
                spacing.validate()?;
                check_unit(&mut units.padding, "padding", side, spacing)?;
                set_side(&mut options.padding, side, spacing);
            }
            Opt::AlignHorizontal(align) => options.halign = align,
            Opt::AlignVertical(align) => options.valign = align,
            Opt::Id(id) => {
                if id.is_empty() {
                    return Err(ContainerError::EmptyId);
                }
                options.id = Some(id);
            }
            Opt::Focused => options.focused = true,
            Opt::KeyFocusNext(key) => options.key_focus_next = Some(key),
            Opt::KeyFocusPrevious(key) => options.key_focus_previous = Some(key),
            Opt::KeyFocusSkip => options.key_focus_skip = true,
        }
    }
    Ok((options, content))
}
