#![forbid(unsafe_code)]

//! Trellis public facade crate.
//!
//! Re-exports the types a dashboard needs from the layer crates and offers a
//! prelude holding the option constructors.
//!
//! ```ignore
//! use trellis::prelude::*;
//!
//! let terminal = Arc::new(TtyTerminal::open(TtyOptions::default())?);
//! let (stop, trigger) = StopSignal::new();
//! let config = DashboardConfig::default().with_keyboard_subscriber(move |key| {
//!     if key.code == KeyCode::Escape {
//!         trigger.stop();
//!     }
//! });
//! let dashboard = Dashboard::new(
//!     terminal.clone(),
//!     [
//!         border(LineStyle::Light),
//!         border_title("press Esc to quit"),
//!         split_vertical(vec![place_widget(cpu)], vec![place_widget(mem)], split_percent(40)),
//!     ],
//!     config,
//! )?;
//! dashboard.run(&stop)?;
//! terminal.close();
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use trellis_core::distribution::{
    DistributionError, DistributionSystem, EventSink, SubscribeOptions, SubscriptionId,
};
pub use trellis_core::drop_policy::{DropPolicy, TailDrop};
pub use trellis_core::event::{
    ErrorEvent, Event, EventKind, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
pub use trellis_core::geometry::{HAlign, Point, Rect, Size, VAlign};
pub use trellis_core::stop_signal::{StopSignal, StopTrigger};

// --- Render re-exports -----------------------------------------------------

pub use trellis_render::buffer::Buffer;
pub use trellis_render::canvas::{Canvas, CanvasError};
pub use trellis_render::cell::{Cell, CellOptions, Color, StyleFlags};
pub use trellis_render::drawing::{BorderChars, Draw, LineStyle};
pub use trellis_render::headless::HeadlessTerminal;
pub use trellis_render::terminal::{Terminal, TerminalError};

// --- Widget and container re-exports ---------------------------------------

pub use trellis_container::{Container, ContainerError, ContainerOptions, Opt};
pub use trellis_widgets::{
    DrawMeta, EventMeta, KeyScope, MouseScope, OUTSIDE_CANVAS, Widget, WidgetError,
    WidgetOptions,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use trellis_runtime::{Controller, Dashboard, DashboardConfig, RuntimeError};

#[cfg(feature = "tty")]
pub use trellis_tty::{TtyOptions, TtyTerminal};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for trellis apps.
#[derive(Debug)]
pub enum Error {
    /// Opening, drawing to, or reading from the terminal failed.
    Terminal(TerminalError),
    /// The container tree was misconfigured or failed to draw.
    Container(ContainerError),
    /// The dashboard stopped on an error.
    #[cfg(feature = "runtime")]
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(err) => write!(f, "{err}"),
            Self::Container(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Terminal(err) => Some(err),
            Self::Container(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Runtime(err) => Some(err),
        }
    }
}

impl From<TerminalError> for Error {
    fn from(err: TerminalError) -> Self {
        Self::Terminal(err)
    }
}

impl From<ContainerError> for Error {
    fn from(err: ContainerError) -> Self {
        Self::Container(err)
    }
}

#[cfg(feature = "runtime")]
impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Self::Runtime(err)
    }
}

/// Standard result type for trellis APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use std::sync::Arc;

    pub use crate::{
        Canvas, Cell, CellOptions, Color, Container, Draw, DrawMeta, Error, Event, EventMeta,
        HAlign, KeyCode, KeyEvent, KeyScope, LineStyle, MouseEvent, MouseScope, Point, Rect,
        Result, Size, StopSignal, Terminal, VAlign, Widget, WidgetError, WidgetOptions,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Controller, Dashboard, DashboardConfig};

    #[cfg(feature = "tty")]
    pub use crate::{TtyOptions, TtyTerminal};

    pub use trellis_container::options::{
        SplitSize, align_horizontal, align_vertical, border, border_color, border_title,
        border_title_align, clear_border, clear_widget, focused, focused_color, id,
        key_focus_next, key_focus_previous, key_focus_skip, margin_bottom, margin_bottom_percent,
        margin_left, margin_left_percent, margin_right, margin_right_percent, margin_top,
        margin_top_percent, padding_bottom, padding_bottom_percent, padding_left,
        padding_left_percent, padding_right, padding_right_percent, padding_top,
        padding_top_percent, place_widget, split_fixed, split_fixed_from_end, split_horizontal,
        split_percent, split_vertical,
    };

    pub use crate::{container, core, layout, render, widgets};
}

pub use trellis_container as container;
pub use trellis_core as core;
pub use trellis_layout as layout;
pub use trellis_render as render;
#[cfg(feature = "runtime")]
pub use trellis_runtime as runtime;
#[cfg(feature = "tty")]
pub use trellis_tty as tty;
pub use trellis_widgets as widgets;
