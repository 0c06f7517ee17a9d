#![forbid(unsafe_code)]

//! Log setup for the demo.
//!
//! The dashboard owns stdout, so logs only go to the file named by
//! `TRELLIS_LOG_FILE`. Without it no subscriber is installed.

use std::fs::File;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const FILE_VAR: &str = "TRELLIS_LOG_FILE";
const FILTER_VAR: &str = "TRELLIS_LOG";

/// Install a file logger if `TRELLIS_LOG_FILE` is set.
///
/// Returns whether a logger was installed.
pub fn init() -> io::Result<bool> {
    let Some(path) = std::env::var_os(FILE_VAR) else {
        return Ok(false);
    };
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env(FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .is_ok();
    Ok(installed)
}
