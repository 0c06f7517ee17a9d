#![forbid(unsafe_code)]

//! Trellis Runtime
//!
//! Ties a terminal, a container tree, and the event distribution system into
//! a running dashboard.
//!
//! # Key Components
//!
//! - [`Dashboard`] - blocking run loop with a periodic redraw
//! - [`Controller`] - the same wiring, redrawn on request
//! - [`DashboardConfig`] - redraw interval, error policy, global subscribers
//!
//! # Error policy
//!
//! Widget handler failures, redraw failures, and backend read failures all
//! arrive as `Event::Error`. Without an error handler the first one stops
//! the dashboard and is returned as [`RuntimeError::Fatal`]. With a handler,
//! every error goes to the handler and the dashboard keeps running.

pub mod config;
pub mod dashboard;
pub mod error;
mod wiring;

pub use config::{
    DEFAULT_REDRAW_INTERVAL, DashboardConfig, ErrorHandler, KeyboardSubscriber, MouseSubscriber,
};
pub use dashboard::{Controller, Dashboard};
pub use error::RuntimeError;
