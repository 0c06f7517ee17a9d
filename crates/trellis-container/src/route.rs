#![forbid(unsafe_code)]

//! Keyboard and mouse routing.
//!
//! Handler errors are never returned to the caller. They are published as
//! [`Event::Error`] through the distribution system, where the application's
//! error policy sees them alongside backend failures.

use trellis_core::distribution::EventSink;
use trellis_core::event::{Event, KeyEvent, MouseEvent};
use trellis_core::geometry::{Point, Rect};
use trellis_widgets::{EventMeta, KeyScope, MouseScope, OUTSIDE_CANVAS, WidgetError};

use crate::focus::{FocusEffect, FocusTracker};
use crate::tree::{NodeId, Tree};

pub(crate) fn keyboard(
    tree: &Tree,
    focus: &FocusTracker<NodeId>,
    sink: &EventSink,
    event: &KeyEvent,
) {
    if let Some(root) = tree.node(tree.root()) {
        if root.options.key_focus_next.is_some_and(|key| event.matches(&key)) {
            cycle_focus(tree, focus, true);
            return;
        }
        if root.options.key_focus_previous.is_some_and(|key| event.matches(&key)) {
            cycle_focus(tree, focus, false);
            return;
        }
    }

    for id in tree.preorder() {
        let Some(widget) = tree.node(id).and_then(|n| n.widget()) else {
            continue;
        };
        let focused = focus.is_active(id);
        let wanted = match widget.options().keyboard {
            KeyScope::None => false,
            KeyScope::Focused => focused,
            KeyScope::Global => true,
        };
        if wanted && let Err(err) = widget.keyboard(event, &EventMeta { focused }) {
            report(tree, id, sink, "keyboard", &err);
        }
    }
}

pub(crate) fn mouse(
    tree: &Tree,
    focus: &FocusTracker<NodeId>,
    sink: &EventSink,
    event: &MouseEvent,
) {
    let effect = focus.mouse(event, |p| tree.node_at(p));
    if matches!(effect, FocusEffect::Committed(_)) {
        trellis_core::debug!(?effect, "focus moved by mouse");
    }

    let target = tree.node_at(event.position);
    for id in tree.preorder() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let Some(widget) = node.widget() else {
            continue;
        };
        let local = match widget.options().mouse {
            MouseScope::None => None,
            MouseScope::Widget if target == Some(id) => {
                node.widget_rect.and_then(|r| r.relative(event.position))
            }
            MouseScope::Container if target == Some(id) => node
                .areas
                .usable
                .contains(event.position)
                .then(|| translate(event.position, node.widget_rect)),
            MouseScope::Global => Some(translate(event.position, node.widget_rect)),
            MouseScope::Widget | MouseScope::Container => None,
        };
        let Some(local) = local else {
            continue;
        };
        let meta = EventMeta {
            focused: focus.is_active(id),
        };
        if let Err(err) = widget.mouse(&event.at(local), &meta) {
            report(tree, id, sink, "mouse", &err);
        }
    }
}

/// Widget-local position, or [`OUTSIDE_CANVAS`] when the widget was not
/// drawn or `p` lies outside it.
fn translate(p: Point, widget: Option<Rect>) -> Point {
    widget
        .and_then(|r| r.relative(p))
        .unwrap_or(OUTSIDE_CANVAS)
}

/// Move focus to the next (or previous) widget container in pre-order,
/// wrapping around and skipping containers marked `key_focus_skip`.
fn cycle_focus(tree: &Tree, focus: &FocusTracker<NodeId>, forward: bool) {
    let order = tree.preorder();
    let eligible = |id: &&NodeId| {
        tree.node(**id)
            .is_some_and(|n| n.widget().is_some() && !n.options.key_focus_skip)
    };
    let active = focus.active();
    let pos = order.iter().position(|&id| id == active).unwrap_or(0);

    let next = if forward {
        order[pos + 1..]
            .iter()
            .chain(order[..=pos].iter())
            .find(eligible)
    } else {
        order[..pos]
            .iter()
            .rev()
            .chain(order[pos..].iter().rev())
            .find(eligible)
    };
    if let Some(&id) = next {
        trellis_core::debug!(container = %tree.label(id), forward, "keyboard focus moved");
        focus.set_active(id);
    }
}

fn report(tree: &Tree, id: NodeId, sink: &EventSink, handler: &str, err: &WidgetError) {
    let message = format!(
        "widget in container {} failed to handle {handler} event: {err}",
        tree.label(id)
    );
    trellis_core::warn!(%message, "widget handler failed");
    if !sink.send(Event::error(message)) {
        trellis_core::warn!("error event dropped, distribution system closed");
    }
}
