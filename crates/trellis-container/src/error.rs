#![forbid(unsafe_code)]

//! Container errors.

use std::fmt;

use trellis_layout::LayoutError;
use trellis_render::canvas::CanvasError;
use trellis_widgets::WidgetError;

use crate::options::Side;

/// Errors raised while configuring or drawing a container tree.
#[derive(Debug)]
pub enum ContainerError {
    /// A split, spacing, or widget size value is out of range.
    Layout(LayoutError),
    /// One side of a margin or padding was given both in cells and percent.
    ConflictingSpacing { what: &'static str, side: Side },
    /// An identifier was empty.
    EmptyId,
    /// Two containers share an identifier.
    DuplicateId(String),
    /// No container carries the identifier.
    UnknownId(String),
    /// More than one container asked for initial focus.
    MultipleFocused,
    /// The option may only be set on the root container.
    RootOnly { option: &'static str },
    /// A widget failed to draw.
    Widget { container: String, source: WidgetError },
    /// Writing a canvas to the terminal failed.
    Canvas(CanvasError),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "invalid container option: {err}"),
            Self::ConflictingSpacing { what, side } => write!(
                f,
                "{what} {side} given both in cells and in percent"
            ),
            Self::EmptyId => write!(f, "container identifier must not be empty"),
            Self::DuplicateId(id) => write!(f, "duplicate container identifier {id:?}"),
            Self::UnknownId(id) => write!(f, "no container with identifier {id:?}"),
            Self::MultipleFocused => write!(f, "at most one container may be marked focused"),
            Self::RootOnly { option } => {
                write!(f, "option {option} is only valid on the root container")
            }
            Self::Widget { container, source } => {
                write!(f, "widget in container {container} failed to draw: {source}")
            }
            Self::Canvas(err) => write!(f, "drawing to the terminal failed: {err}"),
        }
    }
}

impl std::error::Error for ContainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Widget { source, .. } => Some(source),
            Self::Canvas(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LayoutError> for ContainerError {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<CanvasError> for ContainerError {
    fn from(err: CanvasError) -> Self {
        Self::Canvas(err)
    }
}
