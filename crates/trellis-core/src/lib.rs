#![forbid(unsafe_code)]

//! Core: geometry, input events, cancellation, and event distribution.
//!
//! Everything above this crate (canvases, the container tree, the runtime)
//! speaks in terms of the types defined here:
//!
//! - [`geometry`] - `Point`, `Size`, `Rect`, `Sides`
//! - [`event`] - the canonical `Event` enum delivered by terminals
//! - [`stop_signal`] - cooperative cancellation for blocking reads and workers
//! - [`distribution`] - the Event Distribution System (EDS) fanning input out
//!   to independently scheduled subscribers
//! - [`drop_policy`] - bounded per-subscriber queues and their eviction rules

pub mod distribution;
pub mod drop_policy;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod stop_signal;

pub use distribution::{
    DistributionError, DistributionSystem, EventSink, SubscribeOptions, SubscriptionId,
};
pub use drop_policy::{DropPolicy, TailDrop};
pub use event::{Event, EventKind, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use geometry::{HAlign, Point, Rect, Sides, Size, VAlign};
pub use stop_signal::{StopSignal, StopTrigger};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
