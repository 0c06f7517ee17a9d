#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo dashboard.
//!
//! Arguments are parsed by hand. `TRELLIS_DEMO_*` environment variables set
//! defaults that explicit flags override.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Trellis demo dashboard

USAGE:
    trellis-demo [OPTIONS]

OPTIONS:
    --redraw-ms=N        Redraw every N milliseconds (default: 250)
    --feed-ms=N          Push a new sample every N milliseconds (default: 200)
    --exit-after-ms=N    Quit after N milliseconds, 0 disables (default: 0)
    --no-mouse           Disable mouse event capture
    --no-alt-screen      Draw on the main screen instead of the alternate one
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Tab / Shift-Tab      Move keyboard focus between panes
    click                Focus the pane under the pointer
    q / Ctrl+C           Quit

ENVIRONMENT VARIABLES:
    TRELLIS_DEMO_REDRAW_MS       Override --redraw-ms
    TRELLIS_DEMO_EXIT_AFTER_MS   Override --exit-after-ms
    TRELLIS_LOG_FILE             Write logs to this file
    TRELLIS_LOG                  Log filter, e.g. 'debug' (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Redraw interval in milliseconds.
    pub redraw_ms: u64,
    /// Interval between generated samples in milliseconds.
    pub feed_ms: u64,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    pub mouse: bool,
    pub alt_screen: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            redraw_ms: 250,
            feed_ms: 200,
            exit_after_ms: 0,
            mouse: true,
            alt_screen: true,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

fn number(flag: &str, val: &str) -> Result<u64, String> {
    val.parse()
        .map_err(|_| format!("Invalid {flag} value: {val}"))
}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version` or a bad argument.
    pub fn parse() -> Self {
        let env_opts = Self::from_env(|key| env::var(key).ok());
        match Self::parse_args(env_opts, env::args().skip(1)) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("trellis-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Defaults with environment overrides applied. Unparsable values are
    /// ignored.
    pub fn from_env(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(val) = var("TRELLIS_DEMO_REDRAW_MS")
            && let Ok(n) = val.parse()
        {
            opts.redraw_ms = n;
        }
        if let Some(val) = var("TRELLIS_DEMO_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            opts.exit_after_ms = n;
        }
        opts
    }

    /// Apply command-line flags on top of `base`.
    pub fn parse_args<I, S>(base: Self, args: I) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = base;
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-mouse" => opts.mouse = false,
                "--no-alt-screen" => opts.alt_screen = false,
                other => {
                    if let Some(val) = other.strip_prefix("--redraw-ms=") {
                        opts.redraw_ms = number("--redraw-ms", val)?;
                        if opts.redraw_ms == 0 {
                            return Err("--redraw-ms must be positive".to_owned());
                        }
                    } else if let Some(val) = other.strip_prefix("--feed-ms=") {
                        opts.feed_ms = number("--feed-ms", val)?.max(1);
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = number("--exit-after-ms", val)?;
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }
        Ok(Parsed::Run(opts))
    }
}
