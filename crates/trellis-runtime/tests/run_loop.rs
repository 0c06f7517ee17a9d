//! Dashboard and controller behaviour against a headless terminal.
//!
//! 1. The run loop redraws periodically and stops on its signal.
//! 2. Resizes trigger a redraw with the new layout.
//! 3. The default error policy is fatal; a handler replaces it.
//! 4. The controller redraws on request and honours the same policy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use trellis_container::options::*;
use trellis_core::event::{Event, KeyCode, KeyEvent};
use trellis_core::geometry::{Rect, Size};
use trellis_core::stop_signal::StopSignal;
use trellis_render::headless::HeadlessTerminal;
use trellis_runtime::{Controller, Dashboard, DashboardConfig, RuntimeError};
use trellis_widgets::mirror::Mirror;
use trellis_widgets::{KeyScope, WidgetOptions};

// ── Helpers ─────────────────────────────────────────────────────────────

const PATIENCE: Duration = Duration::from_secs(5);

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + PATIENCE;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

fn terminal(w: u16, h: u16) -> Arc<HeadlessTerminal> {
    Arc::new(HeadlessTerminal::new(Size::new(w, h)))
}

fn keyed_mirror() -> Arc<Mirror> {
    Arc::new(Mirror::new(WidgetOptions::new().keyboard(KeyScope::Focused)))
}

fn slow() -> DashboardConfig {
    DashboardConfig::default().with_redraw_interval(Duration::from_secs(3600))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Run loop
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn dashboard_redraws_until_stopped() {
    let term = terminal(10, 3);
    let config = DashboardConfig::default().with_redraw_interval(Duration::from_millis(5));
    let dashboard = Dashboard::new(term.clone(), vec![border(LineStyle::Ascii)], config).unwrap();
    let (stop, trigger) = StopSignal::new();
    let runner = thread::spawn(move || dashboard.run(&stop));

    assert!(wait_until(|| term.flush_count() >= 3));
    trigger.stop();
    assert!(runner.join().unwrap().is_ok());
    assert_eq!(term.to_text(), "+--------+\n|        |\n+--------+");
}

#[test]
fn already_stopped_signal_draws_once() {
    let term = terminal(4, 1);
    let dashboard = Dashboard::new(term.clone(), vec![], slow()).unwrap();
    let (stop, trigger) = StopSignal::new();
    trigger.stop();
    dashboard.run(&stop).unwrap();
    assert_eq!(term.flush_count(), 1);
}

#[test]
fn keys_reach_widgets_and_global_subscriber() {
    let term = terminal(10, 3);
    let widget = keyed_mirror();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let config = {
        let seen = seen.clone();
        slow().with_keyboard_subscriber(move |key| seen.lock().unwrap().push(*key))
    };
    let dashboard = Dashboard::new(term.clone(), vec![place_widget(widget.clone())], config).unwrap();
    let (stop, trigger) = StopSignal::new();
    let runner = thread::spawn(move || dashboard.run(&stop));

    term.push_event(Event::Key(KeyEvent::new(KeyCode::Char('x'))));
    assert!(wait_until(|| widget.keys().len() == 1 && seen.lock().unwrap().len() == 1));
    trigger.stop();
    runner.join().unwrap().unwrap();
    assert!(widget.keys()[0].0.is_char('x'));
}

#[test]
fn zero_interval_is_rejected() {
    let config = DashboardConfig::default().with_redraw_interval(Duration::ZERO);
    let err = Dashboard::new(terminal(2, 2), vec![], config).unwrap_err();
    assert!(matches!(err, RuntimeError::Config { .. }));
}

#[test]
fn bad_tree_is_rejected_up_front() {
    let err = Dashboard::new(terminal(2, 2), vec![id("")], slow()).unwrap_err();
    assert!(matches!(err, RuntimeError::Container(_)));
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Resize
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn resize_triggers_redraw_with_new_layout() {
    let term = terminal(20, 4);
    let dashboard = Dashboard::new(
        term.clone(),
        vec![split_vertical(vec![id("l")], vec![id("r")], SplitSize::default())],
        slow(),
    )
    .unwrap();
    let container = dashboard.container().clone();
    let (stop, trigger) = StopSignal::new();
    let runner = thread::spawn(move || dashboard.run(&stop));

    assert!(wait_until(|| term.flush_count() >= 1));
    term.resize(Size::new(40, 4));
    assert!(wait_until(|| term.flush_count() >= 2));
    assert_eq!(container.area_of("r"), Some(Rect::new(20, 0, 20, 4)));
    trigger.stop();
    runner.join().unwrap().unwrap();
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Error policy
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn widget_error_is_fatal_by_default() {
    let term = terminal(10, 3);
    let widget = keyed_mirror();
    widget.fail_input(Some("bad key"));
    let dashboard = Dashboard::new(
        term.clone(),
        vec![id("w"), place_widget(widget.clone())],
        slow(),
    )
    .unwrap();
    let (stop, _trigger) = StopSignal::new();
    let runner = thread::spawn(move || dashboard.run(&stop));

    term.push_event(Event::Key(KeyEvent::new(KeyCode::Enter)));
    match runner.join().unwrap() {
        Err(RuntimeError::Fatal(event)) => {
            assert!(event.message.contains("\"w\""), "{}", event.message);
            assert!(event.message.contains("bad key"), "{}", event.message);
        }
        other => panic!("expected fatal error, got {other:?}"),
    }
}

#[test]
fn backend_error_event_is_fatal_by_default() {
    let term = terminal(4, 1);
    let dashboard = Dashboard::new(term.clone(), vec![], slow()).unwrap();
    let (stop, _trigger) = StopSignal::new();
    let runner = thread::spawn(move || dashboard.run(&stop));
    term.push_event(Event::error("read failed"));
    let err = runner.join().unwrap().unwrap_err();
    assert_eq!(err.to_string(), "dashboard stopped on error: read failed");
}

#[test]
fn error_handler_replaces_fatal_policy() {
    let term = terminal(10, 3);
    let widget = keyed_mirror();
    widget.fail_input(Some("bad key"));
    let errors = Arc::new(AtomicUsize::new(0));
    let config = {
        let errors = errors.clone();
        slow().with_error_handler(move |_| {
            errors.fetch_add(1, Ordering::SeqCst);
        })
    };
    let dashboard = Dashboard::new(term.clone(), vec![place_widget(widget.clone())], config).unwrap();
    let (stop, trigger) = StopSignal::new();
    let runner = thread::spawn(move || dashboard.run(&stop));

    for _ in 0..3 {
        term.push_event(Event::Key(KeyEvent::new(KeyCode::Tab)));
    }
    assert!(wait_until(|| errors.load(Ordering::SeqCst) == 3));
    trigger.stop();
    runner.join().unwrap().unwrap();
}

#[test]
fn failing_first_draw_is_returned() {
    let widget = keyed_mirror();
    widget.fail_draw(Some("no data"));
    let dashboard = Dashboard::new(terminal(6, 2), vec![place_widget(widget)], slow()).unwrap();
    let (stop, _trigger) = StopSignal::new();
    let err = dashboard.run(&stop).unwrap_err();
    assert!(matches!(err, RuntimeError::Container(_)));
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Controller
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn controller_draws_on_request() {
    let term = terminal(6, 2);
    let widget = keyed_mirror();
    let controller =
        Controller::new(term.clone(), vec![place_widget(widget.clone())], DashboardConfig::default())
            .unwrap();
    assert_eq!(term.flush_count(), 1);
    assert_eq!(widget.draws().len(), 1);

    controller.redraw().unwrap();
    assert_eq!(term.flush_count(), 2);

    term.push_event(Event::Key(KeyEvent::new(KeyCode::Char('k'))));
    assert!(wait_until(|| widget.keys().len() == 1));

    controller.close();
    controller.close();
    assert!(controller.is_closed());
    assert!(matches!(controller.redraw(), Err(RuntimeError::Closed)));
}

#[test]
fn controller_reports_fatal_error_on_next_redraw() {
    let term = terminal(6, 2);
    let controller = Controller::new(term.clone(), vec![], DashboardConfig::default()).unwrap();
    controller.sink().send(Event::error("sensor offline"));
    assert!(wait_until(|| {
        match controller.redraw() {
            Err(RuntimeError::Fatal(event)) => {
                assert_eq!(event.message, "sensor offline");
                true
            }
            Ok(()) => false,
            Err(other) => panic!("unexpected error {other}"),
        }
    }));
    assert!(controller.is_closed());
}

#[test]
fn controller_updates_are_visible_after_redraw() {
    let term = terminal(8, 3);
    let controller =
        Controller::new(term.clone(), vec![id("root")], DashboardConfig::default()).unwrap();
    assert_eq!(term.to_text(), "        \n        \n        ");

    controller
        .container()
        .update("root", vec![border(LineStyle::Ascii)])
        .unwrap();
    controller.redraw().unwrap();
    assert_eq!(term.to_text(), "+------+\n|      |\n+------+");
}
