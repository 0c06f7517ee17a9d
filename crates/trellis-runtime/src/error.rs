#![forbid(unsafe_code)]

//! Runtime errors.

use std::fmt;
use std::io;

use trellis_container::ContainerError;
use trellis_core::distribution::DistributionError;
use trellis_core::event::ErrorEvent;
use trellis_render::terminal::TerminalError;

/// Errors that end a dashboard or fail a controller call.
#[derive(Debug)]
pub enum RuntimeError {
    /// An error event reached the default error policy.
    Fatal(ErrorEvent),
    /// Drawing the container tree failed.
    Container(ContainerError),
    /// Clearing or flushing the terminal failed.
    Terminal(TerminalError),
    /// Subscribing to the event distribution system failed.
    Distribution(DistributionError),
    /// A runtime thread could not be spawned.
    Spawn(io::Error),
    /// The controller was already closed.
    Closed,
    /// A configuration value is out of range.
    Config { field: &'static str, reason: &'static str },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal(event) => write!(f, "dashboard stopped on error: {event}"),
            Self::Container(err) => write!(f, "redraw failed: {err}"),
            Self::Terminal(err) => write!(f, "redraw failed: {err}"),
            Self::Distribution(err) => write!(f, "event subscription failed: {err}"),
            Self::Spawn(err) => write!(f, "failed to spawn runtime thread: {err}"),
            Self::Closed => write!(f, "controller is closed"),
            Self::Config { field, reason } => write!(f, "invalid dashboard {field}: {reason}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fatal(event) => Some(event),
            Self::Container(err) => Some(err),
            Self::Terminal(err) => Some(err),
            Self::Distribution(err) => Some(err),
            Self::Spawn(err) => Some(err),
            Self::Closed | Self::Config { .. } => None,
        }
    }
}

impl From<ContainerError> for RuntimeError {
    fn from(err: ContainerError) -> Self {
        Self::Container(err)
    }
}

impl From<TerminalError> for RuntimeError {
    fn from(err: TerminalError) -> Self {
        Self::Terminal(err)
    }
}

impl From<DistributionError> for RuntimeError {
    fn from(err: DistributionError) -> Self {
        Self::Distribution(err)
    }
}
