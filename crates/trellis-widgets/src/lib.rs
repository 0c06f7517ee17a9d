#![forbid(unsafe_code)]

//! The widget capability.
//!
//! A widget draws onto a [`Canvas`] sized to the rectangle its container
//! assigns it, and may ask for keyboard and mouse input. Containers only ever
//! see widgets as `Arc<dyn Widget>`: they never inspect concrete types.
//!
//! Widgets are shared between the draw loop and the input router, so every
//! method takes `&self` and implementations keep mutable state behind their
//! own lock.
//!
//! # Scopes
//!
//! | [`KeyScope`]   | receives keys when                                 |
//! |----------------|----------------------------------------------------|
//! | `None`         | never                                              |
//! | `Focused`      | its container is the focused one                   |
//! | `Global`       | always                                             |
//!
//! | [`MouseScope`] | receives mouse events when the pointer is          |
//! |----------------|----------------------------------------------------|
//! | `None`         | never                                              |
//! | `Widget`       | inside the widget's own rectangle                  |
//! | `Container`    | inside its container's usable area                 |
//! | `Global`       | anywhere                                           |

use std::fmt;
use std::sync::Arc;

use trellis_core::event::{KeyEvent, MouseEvent};
use trellis_core::geometry::{Point, Size};
use trellis_layout::{LayoutError, SizeLimits};
use trellis_render::canvas::{Canvas, CanvasError};

#[cfg(any(test, feature = "test-helpers"))]
pub mod mirror;

/// Mouse position reported for a pointer outside the widget's canvas.
///
/// Widgets with [`MouseScope::Container`] or [`MouseScope::Global`] receive
/// this instead of a canvas coordinate when the pointer is elsewhere.
pub const OUTSIDE_CANVAS: Point = Point::new(u16::MAX, u16::MAX);

/// Which keyboard events a widget receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyScope {
    #[default]
    None,
    Focused,
    Global,
}

/// Which mouse events a widget receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseScope {
    #[default]
    None,
    Widget,
    Container,
    Global,
}

/// What a widget reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WidgetOptions {
    /// Minimum/maximum size and aspect ratio.
    pub limits: SizeLimits,
    pub keyboard: KeyScope,
    pub mouse: MouseScope,
}

impl WidgetOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest canvas the widget can draw on. Defaults to 1x1.
    #[must_use]
    pub fn min_size(mut self, size: Size) -> Self {
        self.limits.min = size;
        self
    }

    /// Largest canvas the widget wants. A zero component is unbounded.
    #[must_use]
    pub fn max_size(mut self, size: Size) -> Self {
        self.limits.max = size;
        self
    }

    /// Desired width:height ratio.
    #[must_use]
    pub fn ratio(mut self, width: u16, height: u16) -> Self {
        self.limits.ratio = Some((width, height));
        self
    }

    #[must_use]
    pub fn keyboard(mut self, scope: KeyScope) -> Self {
        self.keyboard = scope;
        self
    }

    #[must_use]
    pub fn mouse(mut self, scope: MouseScope) -> Self {
        self.mouse = scope;
        self
    }

    /// Check the size limits for consistency.
    pub fn validate(self) -> Result<Self, LayoutError> {
        self.limits.validate()?;
        Ok(self)
    }
}

/// Context for [`Widget::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawMeta {
    /// Whether the widget's container holds focus.
    pub focused: bool,
}

/// Context for [`Widget::keyboard`] and [`Widget::mouse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMeta {
    /// Whether the widget's container holds focus.
    pub focused: bool,
}

/// Failure reported by a widget.
#[derive(Debug)]
pub struct WidgetError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl WidgetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for WidgetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<CanvasError> for WidgetError {
    fn from(err: CanvasError) -> Self {
        Self::with_source("canvas write failed", err)
    }
}

/// A visual component placed in a container.
pub trait Widget: Send + Sync {
    /// Draw onto `canvas`, which is sized to the widget's rectangle.
    fn draw(&self, canvas: &mut Canvas, meta: &DrawMeta) -> Result<(), WidgetError>;

    /// Handle a key. Only called when [`WidgetOptions::keyboard`] allows it.
    fn keyboard(&self, _event: &KeyEvent, _meta: &EventMeta) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Handle a mouse event in canvas coordinates. Only called when
    /// [`WidgetOptions::mouse`] allows it.
    fn mouse(&self, _event: &MouseEvent, _meta: &EventMeta) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Size limits and input scopes.
    fn options(&self) -> WidgetOptions;
}

impl<W: Widget + ?Sized> Widget for Arc<W> {
    fn draw(&self, canvas: &mut Canvas, meta: &DrawMeta) -> Result<(), WidgetError> {
        (**self).draw(canvas, meta)
    }

    fn keyboard(&self, event: &KeyEvent, meta: &EventMeta) -> Result<(), WidgetError> {
        (**self).keyboard(event, meta)
    }

    fn mouse(&self, event: &MouseEvent, meta: &EventMeta) -> Result<(), WidgetError> {
        (**self).mouse(event, meta)
    }

    fn options(&self) -> WidgetOptions {
        (**self).options()
    }
}
