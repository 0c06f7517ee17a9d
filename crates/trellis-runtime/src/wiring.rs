#![forbid(unsafe_code)]

//! Event plumbing shared by the dashboard and the controller.
//!
//! ```text
//! terminal.event() ──reader thread──▶ EDS ──▶ container   (Key, Mouse)
//!                                        ├──▶ screen      (Resize → redraw)
//!                                        ├──▶ app keys / app mouse
//!                                        └──▶ error policy (Error)
//! ```
//!
//! Every subscriber runs on its own EDS worker. Redraws from the resize
//! worker and from the owner are serialised by the screen lock; the screen
//! lock is always taken before the container's tree lock.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, debug_span, warn};
use trellis_container::Container;
use trellis_core::distribution::{DistributionSystem, EventSink, SubscribeOptions};
use trellis_core::event::{ErrorEvent, Event, EventKind};
use trellis_core::stop_signal::{StopSignal, StopTrigger};
use trellis_render::terminal::Terminal;

use crate::config::DashboardConfig;
use crate::error::RuntimeError;

/// The terminal and the tree drawn on it.
pub(crate) struct Screen {
    terminal: Arc<dyn Terminal>,
    container: Arc<Container>,
    lock: Mutex<()>,
}

impl Screen {
    pub(crate) fn new(terminal: Arc<dyn Terminal>, container: Arc<Container>) -> Self {
        Self {
            terminal,
            container,
            lock: Mutex::new(()),
        }
    }

    pub(crate) fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Clear, draw, flush.
    pub(crate) fn redraw(&self) -> Result<(), RuntimeError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _span = debug_span!("trellis.redraw").entered();
        self.terminal.clear()?;
        self.container.draw()?;
        self.terminal.flush()?;
        Ok(())
    }

    /// Redraw, turning a failure into an error event for the error policy.
    pub(crate) fn redraw_or_report(&self, sink: &EventSink) {
        if let Err(err) = self.redraw() {
            warn!(error = %err, "redraw failed");
            sink.send(Event::error(err));
        }
    }
}

/// Live subscriptions plus the terminal reader thread. Dropping it stops
/// the reader and closes the distribution system.
pub(crate) struct Wiring {
    eds: Arc<DistributionSystem>,
    reader_stop: StopTrigger,
    reader: Option<JoinHandle<()>>,
}

impl Wiring {
    /// Subscribe everything and start reading the terminal. `on_error`
    /// implements the default error policy and is only used when `config`
    /// carries no error handler.
    pub(crate) fn start(
        eds: Arc<DistributionSystem>,
        screen: &Arc<Screen>,
        config: &DashboardConfig,
        on_error: impl FnMut(&ErrorEvent) + Send + 'static,
    ) -> Result<Self, RuntimeError> {
        let options = || SubscribeOptions::new().with_capacity(config.queue_capacity);

        let container = screen.container.clone();
        eds.subscribe(
            options().with_filter([EventKind::Key, EventKind::Mouse]),
            move |event| container.handle(event),
        )?;

        let resize_screen = screen.clone();
        let sink = eds.sink();
        eds.subscribe(options().with_filter([EventKind::Resize]), move |event| {
            if let Event::Resize(size) = event {
                debug!(width = size.width, height = size.height, "terminal resized");
                resize_screen.redraw_or_report(&sink);
            }
        })?;

        if let Some(subscriber) = config.keyboard_subscriber.clone() {
            eds.subscribe(options().with_filter([EventKind::Key]), move |event| {
                if let Event::Key(key) = event {
                    subscriber(key);
                }
            })?;
        }

        if let Some(subscriber) = config.mouse_subscriber.clone() {
            eds.subscribe(options().with_filter([EventKind::Mouse]), move |event| {
                if let Event::Mouse(mouse) = event {
                    subscriber(mouse);
                }
            })?;
        }

        match config.error_handler.clone() {
            Some(handler) => {
                eds.subscribe(options().with_filter([EventKind::Error]), move |event| {
                    if let Event::Error(err) = event {
                        handler(err);
                    }
                })?;
            }
            None => {
                let mut on_error = on_error;
                eds.subscribe(options().with_filter([EventKind::Error]), move |event| {
                    if let Event::Error(err) = event {
                        on_error(err);
                    }
                })?;
            }
        }

        let (reader_signal, reader_stop) = StopSignal::new();
        let terminal = screen.terminal.clone();
        let sink = eds.sink();
        let reader = thread::Builder::new()
            .name("trellis-input".into())
            .spawn(move || read_input(terminal.as_ref(), &reader_signal, &sink))
            .map_err(RuntimeError::Spawn)?;

        debug!(subscribers = eds.subscriber_count(), "event wiring started");
        Ok(Self {
            eds,
            reader_stop,
            reader: Some(reader),
        })
    }

    pub(crate) fn shutdown(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        self.reader_stop.stop();
        if reader.join().is_err() {
            warn!("terminal reader thread panicked");
        }
        self.eds.close();
        debug!("event wiring stopped");
    }
}

impl Drop for Wiring {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_input(terminal: &dyn Terminal, stop: &StopSignal, sink: &EventSink) {
    while let Some(event) = terminal.event(stop) {
        if !sink.send(event) {
            break;
        }
    }
}
