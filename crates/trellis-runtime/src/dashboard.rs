#![forbid(unsafe_code)]

//! The dashboard run loop and the manually driven controller.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, info_span};
use trellis_container::{Container, Opt};
use trellis_core::distribution::{DistributionSystem, EventSink};
use trellis_core::event::ErrorEvent;
use trellis_core::stop_signal::StopSignal;
use trellis_render::terminal::Terminal;

use crate::config::DashboardConfig;
use crate::error::RuntimeError;
use crate::wiring::{Screen, Wiring};

/// Upper bound on how long the run loop goes without checking its stop
/// signal.
const STOP_POLL: Duration = Duration::from_millis(25);

fn build(
    terminal: Arc<dyn Terminal>,
    root: impl IntoIterator<Item = Opt>,
    config: &DashboardConfig,
) -> Result<(Arc<DistributionSystem>, Arc<Screen>), RuntimeError> {
    config.validate()?;
    let eds = Arc::new(DistributionSystem::new());
    let container = Container::new(terminal.clone(), eds.sink(), root)?;
    let screen = Arc::new(Screen::new(terminal, Arc::new(container)));
    Ok((eds, screen))
}

/// A dashboard redrawn on a fixed interval.
///
/// ```ignore
/// let (stop, trigger) = StopSignal::new();
/// // Quit on 'q'.
/// let config = DashboardConfig::default().with_keyboard_subscriber(move |key| {
///     if key.is_char('q') {
///         trigger.stop();
///     }
/// });
/// let dashboard = Dashboard::new(terminal, [border(LineStyle::Light)], config)?;
/// dashboard.run(&stop)?;
/// ```
pub struct Dashboard {
    eds: Arc<DistributionSystem>,
    screen: Arc<Screen>,
    config: DashboardConfig,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("eds", &self.eds)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Build the container tree on `terminal`. Nothing runs until
    /// [`run`](Self::run).
    pub fn new(
        terminal: Arc<dyn Terminal>,
        root: impl IntoIterator<Item = Opt>,
        config: DashboardConfig,
    ) -> Result<Self, RuntimeError> {
        let (eds, screen) = build(terminal, root, &config)?;
        Ok(Self {
            eds,
            screen,
            config,
        })
    }

    /// The container tree, for [`Container::update`] while running.
    pub fn container(&self) -> &Arc<Container> {
        self.screen.container()
    }

    /// Producer handle for application events, such as errors raised by
    /// background data sources.
    pub fn sink(&self) -> EventSink {
        self.eds.sink()
    }

    /// Run until `stop` fires or the default error policy sees an error.
    ///
    /// Draws once up front, then on every redraw interval and on every
    /// terminal resize. The terminal itself is left open.
    pub fn run(self, stop: &StopSignal) -> Result<(), RuntimeError> {
        let _span = info_span!("trellis.dashboard.run").entered();
        let (fatal_tx, fatal_rx) = mpsc::channel::<ErrorEvent>();
        let policy_tx = fatal_tx.clone();
        let mut wiring = Wiring::start(self.eds.clone(), &self.screen, &self.config, move |err| {
            // The receiver is gone once the loop has returned.
            let _ = policy_tx.send(err.clone());
        })?;

        if let Err(err) = self.screen.redraw() {
            wiring.shutdown();
            return Err(err);
        }
        info!(interval_ms = self.config.redraw_interval.as_millis() as u64, "dashboard started");

        let sink = self.eds.sink();
        let interval = self.config.redraw_interval;
        let mut next_redraw = Instant::now() + interval;
        let result = loop {
            if stop.is_stopped() {
                info!("stop requested");
                break Ok(());
            }
            let now = Instant::now();
            if now >= next_redraw {
                self.screen.redraw_or_report(&sink);
                next_redraw = now + interval;
            }
            let wait = next_redraw
                .saturating_duration_since(Instant::now())
                .min(STOP_POLL);
            match fatal_rx.recv_timeout(wait) {
                Ok(event) => {
                    error!(message = %event.message, "fatal error event");
                    break Err(RuntimeError::Fatal(event));
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
            }
        };

        drop(fatal_tx);
        wiring.shutdown();
        info!(ok = result.is_ok(), "dashboard stopped");
        result
    }
}

/// A dashboard redrawn only on request (and on terminal resize).
///
/// Input keeps flowing to the container tree and the configured
/// subscribers in the background. Under the default error policy the first
/// error event closes the controller and is returned by the next
/// [`redraw`](Self::redraw).
pub struct Controller {
    eds: Arc<DistributionSystem>,
    screen: Arc<Screen>,
    fatal: Arc<Mutex<Option<ErrorEvent>>>,
    wiring: Mutex<Option<Wiring>>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("eds", &self.eds)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Build the tree, start routing input, and draw once.
    pub fn new(
        terminal: Arc<dyn Terminal>,
        root: impl IntoIterator<Item = Opt>,
        config: DashboardConfig,
    ) -> Result<Self, RuntimeError> {
        let (eds, screen) = build(terminal, root, &config)?;
        let fatal = Arc::new(Mutex::new(None));
        let first_error = fatal.clone();
        let wiring = Wiring::start(eds.clone(), &screen, &config, move |err: &ErrorEvent| {
            let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                error!(message = %err.message, "fatal error event");
                *slot = Some(err.clone());
            }
        })?;
        let controller = Self {
            eds,
            screen,
            fatal,
            wiring: Mutex::new(Some(wiring)),
        };
        controller.screen.redraw()?;
        debug!("controller started");
        Ok(controller)
    }

    /// The container tree.
    pub fn container(&self) -> &Arc<Container> {
        self.screen.container()
    }

    /// Producer handle for application events.
    pub fn sink(&self) -> EventSink {
        self.eds.sink()
    }

    /// Clear, draw, and flush.
    ///
    /// Fails with [`RuntimeError::Fatal`] (and closes the controller) if an
    /// error event reached the default policy since the last call.
    pub fn redraw(&self) -> Result<(), RuntimeError> {
        let fatal = self
            .fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(event) = fatal {
            self.close();
            return Err(RuntimeError::Fatal(event));
        }
        if self.is_closed() {
            return Err(RuntimeError::Closed);
        }
        self.screen.redraw()
    }

    /// Stop input routing. Idempotent. The terminal is left open.
    pub fn close(&self) {
        let wiring = self
            .wiring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut wiring) = wiring {
            wiring.shutdown();
            debug!("controller closed");
        }
    }

    /// Whether [`close`](Self::close) ran.
    pub fn is_closed(&self) -> bool {
        self.wiring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.close();
    }
}
