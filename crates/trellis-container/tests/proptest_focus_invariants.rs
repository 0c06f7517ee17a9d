//! Property-based invariant tests for mouse-driven focus.
//!
//! 1. Exactly one container is focused after any event sequence.
//! 2. Focus only moves on a left release directly preceded (ignoring motion)
//!    by a left press in the same container.
//! 3. Pressing in one container and releasing in another never moves focus.

use std::sync::Arc;

use proptest::prelude::*;
use trellis_container::Container;
use trellis_container::options::*;
use trellis_core::distribution::DistributionSystem;
use trellis_core::event::{MouseButton, MouseEvent, MouseEventKind};
use trellis_render::headless::HeadlessTerminal;
use trellis_core::geometry::Size;

// ── Helpers ─────────────────────────────────────────────────────────────

const QUADRANTS: [&str; 4] = ["nw", "sw", "ne", "se"];

/// A 20x10 screen cut into four named 10x5 quadrants.
fn quadrants() -> (DistributionSystem, Container) {
    let term = Arc::new(HeadlessTerminal::new(Size::new(20, 10)));
    let eds = DistributionSystem::new();
    let opts = vec![
        id("root"),
        split_vertical(
            vec![split_horizontal(vec![id("nw")], vec![id("sw")], SplitSize::default())],
            vec![split_horizontal(vec![id("ne")], vec![id("se")], SplitSize::default())],
            SplitSize::default(),
        ),
    ];
    let container = Container::new(term, eds.sink(), opts).unwrap();
    (eds, container)
}

fn quadrant_at(x: u16, y: u16) -> &'static str {
    match (x < 10, y < 5) {
        (true, true) => "nw",
        (true, false) => "sw",
        (false, true) => "ne",
        (false, false) => "se",
    }
}

fn kind_strategy() -> impl Strategy<Value = MouseEventKind> {
    prop_oneof![
        4 => Just(MouseEventKind::Down(MouseButton::Left)),
        4 => Just(MouseEventKind::Up(MouseButton::Left)),
        2 => Just(MouseEventKind::Moved),
        2 => Just(MouseEventKind::Drag(MouseButton::Left)),
        1 => Just(MouseEventKind::Down(MouseButton::Right)),
        1 => Just(MouseEventKind::Up(MouseButton::Middle)),
        1 => Just(MouseEventKind::ScrollUp),
    ]
}

fn event_strategy() -> impl Strategy<Value = MouseEvent> {
    (kind_strategy(), 0u16..20, 0u16..10).prop_map(|(kind, x, y)| MouseEvent::new(kind, x, y))
}

fn is_motion(kind: MouseEventKind) -> bool {
    matches!(kind, MouseEventKind::Moved | MouseEventKind::Drag(_))
}

// ═════════════════════════════════════════════════════════════════════════
// 1–2. One focused container, moved only by a matching press/release
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn focus_moves_only_on_matching_release(
        events in proptest::collection::vec(event_strategy(), 0..64),
    ) {
        let (_eds, container) = quadrants();
        let mut expected = "root".to_owned();
        let mut pressed: Option<&'static str> = None;

        for event in &events {
            container.mouse(event);
            let here = quadrant_at(event.position.x, event.position.y);
            match event.kind {
                MouseEventKind::Down(MouseButton::Left) => pressed = Some(here),
                MouseEventKind::Up(MouseButton::Left) => {
                    if pressed == Some(here) {
                        expected = here.to_owned();
                    }
                    pressed = None;
                }
                kind if is_motion(kind) => {}
                _ => pressed = None,
            }

            let focused = container.focused_id();
            prop_assert!(focused.is_some());
            prop_assert_eq!(focused.as_deref(), Some(expected.as_str()));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Press and release in different containers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_click_never_moves_focus(
        from in 0usize..4,
        offset in 1usize..4,
        drags in proptest::collection::vec((0u16..20, 0u16..10), 0..8),
    ) {
        let (_eds, container) = quadrants();
        let to = (from + offset) % 4;
        let origin = |q: usize| -> (u16, u16) {
            let x = if q < 2 { 2 } else { 12 };
            let y = if q % 2 == 0 { 1 } else { 7 };
            (x, y)
        };
        prop_assert_eq!(quadrant_at(origin(from).0, origin(from).1), QUADRANTS[from]);

        let (fx, fy) = origin(from);
        let (tx, ty) = origin(to);
        container.mouse(&MouseEvent::new(MouseEventKind::Down(MouseButton::Left), fx, fy));
        for (x, y) in drags {
            container.mouse(&MouseEvent::new(MouseEventKind::Drag(MouseButton::Left), x, y));
        }
        container.mouse(&MouseEvent::new(MouseEventKind::Up(MouseButton::Left), tx, ty));

        let focused = container.focused_id();
        prop_assert_eq!(focused.as_deref(), Some("root"));
    }
}
