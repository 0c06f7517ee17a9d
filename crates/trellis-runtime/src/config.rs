#![forbid(unsafe_code)]

//! Dashboard configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use trellis_core::distribution::DEFAULT_QUEUE_CAPACITY;
use trellis_core::event::{ErrorEvent, KeyEvent, MouseEvent};

use crate::error::RuntimeError;

/// Default time between periodic redraws.
pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Receives every error event in place of the default (fatal) policy.
pub type ErrorHandler = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Receives every keyboard event, whatever the focus.
pub type KeyboardSubscriber = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Receives every mouse event in screen coordinates.
pub type MouseSubscriber = Arc<dyn Fn(&MouseEvent) + Send + Sync>;

/// Configuration shared by [`Dashboard`](crate::Dashboard) and
/// [`Controller`](crate::Controller).
#[derive(Clone)]
pub struct DashboardConfig {
    /// Time between periodic redraws. Ignored by the controller.
    pub redraw_interval: Duration,
    /// Replaces the default error policy when set.
    pub error_handler: Option<ErrorHandler>,
    /// Application-wide keyboard subscriber.
    pub keyboard_subscriber: Option<KeyboardSubscriber>,
    /// Application-wide mouse subscriber.
    pub mouse_subscriber: Option<MouseSubscriber>,
    /// Queue capacity of each event subscriber.
    pub queue_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            redraw_interval: DEFAULT_REDRAW_INTERVAL,
            error_handler: None,
            keyboard_subscriber: None,
            mouse_subscriber: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("redraw_interval", &self.redraw_interval)
            .field("error_handler", &self.error_handler.is_some())
            .field("keyboard_subscriber", &self.keyboard_subscriber.is_some())
            .field("mouse_subscriber", &self.mouse_subscriber.is_some())
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

impl DashboardConfig {
    /// Set the periodic redraw interval.
    #[must_use]
    pub fn with_redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }

    /// Handle error events instead of stopping on the first one.
    #[must_use]
    pub fn with_error_handler(mut self, handler: impl Fn(&ErrorEvent) + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Subscribe to every keyboard event.
    #[must_use]
    pub fn with_keyboard_subscriber(
        mut self,
        subscriber: impl Fn(&KeyEvent) + Send + Sync + 'static,
    ) -> Self {
        self.keyboard_subscriber = Some(Arc::new(subscriber));
        self
    }

    /// Subscribe to every mouse event.
    #[must_use]
    pub fn with_mouse_subscriber(
        mut self,
        subscriber: impl Fn(&MouseEvent) + Send + Sync + 'static,
    ) -> Self {
        self.mouse_subscriber = Some(Arc::new(subscriber));
        self
    }

    /// Set the per-subscriber queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), RuntimeError> {
        if self.redraw_interval.is_zero() {
            return Err(RuntimeError::Config {
                field: "redraw interval",
                reason: "must be greater than zero",
            });
        }
        if self.queue_capacity == 0 {
            return Err(RuntimeError::Config {
                field: "queue capacity",
                reason: "must be at least one",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert_eq!(config.redraw_interval, DEFAULT_REDRAW_INTERVAL);
        assert!(config.error_handler.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_set_fields() {
        let config = DashboardConfig::default()
            .with_redraw_interval(Duration::from_millis(10))
            .with_error_handler(|_| {})
            .with_keyboard_subscriber(|_| {})
            .with_queue_capacity(8);
        assert_eq!(config.redraw_interval, Duration::from_millis(10));
        assert!(config.error_handler.is_some());
        assert!(config.keyboard_subscriber.is_some());
        assert!(config.mouse_subscriber.is_none());
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn zero_values_are_rejected() {
        let zero_interval = DashboardConfig::default().with_redraw_interval(Duration::ZERO);
        assert!(matches!(
            zero_interval.validate(),
            Err(RuntimeError::Config { field: "redraw interval", .. })
        ));
        let zero_capacity = DashboardConfig::default().with_queue_capacity(0);
        assert!(matches!(
            zero_capacity.validate(),
            Err(RuntimeError::Config { field: "queue capacity", .. })
        ));
    }

    #[test]
    fn debug_hides_closures() {
        let config = DashboardConfig::default().with_mouse_subscriber(|_| {});
        let text = format!("{config:?}");
        assert!(text.contains("mouse_subscriber: true"));
        assert!(text.contains("error_handler: false"));
    }
}
