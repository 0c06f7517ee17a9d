#![forbid(unsafe_code)]

//! Render: cells, canvases, drawing, and the terminal capability.
//!
//! A draw pass creates a [`Canvas`](canvas::Canvas) per container or widget,
//! composites child canvases into parents with `copy_to`, and finally writes
//! the result into the terminal's back buffer with `apply`.

pub mod buffer;
pub mod canvas;
pub mod cell;
pub mod diff;
pub mod drawing;
pub mod headless;
pub mod terminal;

pub use buffer::Buffer;
pub use canvas::{Canvas, CanvasError};
pub use cell::{Cell, CellOptions, Color, StyleFlags};
pub use drawing::{BorderChars, Draw, LineStyle, PLACEHOLDER};
pub use headless::HeadlessTerminal;
pub use terminal::{Terminal, TerminalError};
