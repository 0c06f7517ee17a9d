#![forbid(unsafe_code)]

//! Terminal mode lifecycle.
//!
//! A [`Session`] owns every process-wide terminal mode the backend turns on.
//! Modes are disabled in reverse order on [`Session::cleanup`] or drop, and a
//! panic hook restores the terminal before the panic message is printed.

use std::io::{self, Write};
use std::sync::OnceLock;

use crate::TtyOptions;

#[derive(Debug)]
pub(crate) struct Session {
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    cursor_hidden: bool,
    raw_mode_enabled: bool,
}

impl Session {
    /// Enter raw mode and the modes requested by `options`.
    ///
    /// If a later step fails the modes already entered are left again
    /// before the error is returned.
    pub(crate) fn enter(options: &TtyOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        trellis_core::info!("terminal raw mode enabled");

        let mut session = Self {
            alternate_screen_enabled: false,
            mouse_enabled: false,
            cursor_hidden: false,
            raw_mode_enabled: true,
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            trellis_core::info!("alternate screen enabled");
        }

        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            trellis_core::info!("mouse capture enabled");
        }

        crossterm::execute!(
            stdout,
            crossterm::cursor::Hide,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
        )?;
        session.cursor_hidden = true;

        Ok(session)
    }

    /// Leave every mode this session entered. Idempotent.
    pub(crate) fn cleanup(&mut self) {
        let mut stdout = io::stdout();

        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
            trellis_core::info!("mouse capture disabled");
        }

        if self.cursor_hidden {
            let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
            self.cursor_hidden = false;
        }

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            trellis_core::info!("alternate screen disabled");
        }

        if self.raw_mode_enabled {
            let _ = crossterm::terminal::disable_raw_mode();
            self.raw_mode_enabled = false;
            trellis_core::info!("terminal raw mode disabled");
        }

        let _ = stdout.flush();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}
