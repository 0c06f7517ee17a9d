#![forbid(unsafe_code)]

//! Focus tracking.
//!
//! Exactly one container is active at a time. The mouse changes it through a
//! click/release state machine:
//!
//! ```text
//! WantLeftButton --left press on C--> WantRelease(C)
//! WantRelease(C) --left release on C--> WantLeftButton   (C becomes active)
//! WantRelease(C) --left release elsewhere--> WantLeftButton
//! WantRelease(C) --left press on D--> WantRelease(D)
//! WantRelease(C) --other button--> WantLeftButton
//! ```
//!
//! Pointer motion without a button change (`Moved`, `Drag`) never changes
//! the state, so pressing in one container, dragging, and releasing in
//! another commits nothing.

use std::sync::{PoisonError, RwLock};

use trellis_core::event::{MouseButton, MouseEvent, MouseEventKind};
use trellis_core::geometry::Point;

/// State of the click/release machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState<K> {
    /// Idle: waiting for a left-button press inside some container.
    WantLeftButton,
    /// The left button went down inside `candidate`.
    WantRelease { candidate: K },
}

/// What one mouse event did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEffect<K> {
    /// No change.
    Ignored,
    /// A press recorded a candidate.
    Armed(K),
    /// A second press replaced the candidate.
    Rearmed(K),
    /// A release on the candidate made it active.
    Committed(K),
    /// The candidate was dropped without a focus change.
    Discarded,
}

/// The focus state machine over container keys `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusMachine<K> {
    active: K,
    state: FocusState<K>,
}

impl<K: Copy + Eq> FocusMachine<K> {
    /// Start idle with `active` focused.
    pub fn new(active: K) -> Self {
        Self {
            active,
            state: FocusState::WantLeftButton,
        }
    }

    #[inline]
    pub fn active(&self) -> K {
        self.active
    }

    #[inline]
    pub fn state(&self) -> FocusState<K> {
        self.state
    }

    /// Focus `key` directly and drop any pending candidate.
    pub fn set_active(&mut self, key: K) {
        self.active = key;
        self.state = FocusState::WantLeftButton;
    }

    /// Feed one mouse event. `lookup` maps a screen point to the deepest
    /// container containing it and is only called for left-button events.
    pub fn apply(
        &mut self,
        event: &MouseEvent,
        lookup: impl FnOnce(Point) -> Option<K>,
    ) -> FocusEffect<K> {
        let left_down = matches!(event.kind, MouseEventKind::Down(MouseButton::Left));
        let left_up = matches!(event.kind, MouseEventKind::Up(MouseButton::Left));
        let motion = matches!(event.kind, MouseEventKind::Moved | MouseEventKind::Drag(_));

        match self.state {
            FocusState::WantLeftButton => {
                if !left_down {
                    return FocusEffect::Ignored;
                }
                match lookup(event.position) {
                    Some(key) => {
                        self.state = FocusState::WantRelease { candidate: key };
                        FocusEffect::Armed(key)
                    }
                    None => FocusEffect::Ignored,
                }
            }
            FocusState::WantRelease { candidate } => {
                if motion {
                    return FocusEffect::Ignored;
                }
                if left_down {
                    return match lookup(event.position) {
                        Some(key) => {
                            self.state = FocusState::WantRelease { candidate: key };
                            FocusEffect::Rearmed(key)
                        }
                        None => {
                            self.state = FocusState::WantLeftButton;
                            FocusEffect::Discarded
                        }
                    };
                }
                self.state = FocusState::WantLeftButton;
                if left_up && lookup(event.position) == Some(candidate) {
                    self.active = candidate;
                    FocusEffect::Committed(candidate)
                } else {
                    FocusEffect::Discarded
                }
            }
        }
    }
}

/// Shared focus state of one container tree.
///
/// Draws only read it; mouse dispatch writes it.
#[derive(Debug)]
pub(crate) struct FocusTracker<K> {
    machine: RwLock<FocusMachine<K>>,
}

impl<K: Copy + Eq> FocusTracker<K> {
    pub(crate) fn new(active: K) -> Self {
        Self {
            machine: RwLock::new(FocusMachine::new(active)),
        }
    }

    pub(crate) fn active(&self) -> K {
        self.machine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active()
    }

    pub(crate) fn is_active(&self, key: K) -> bool {
        self.active() == key
    }

    pub(crate) fn set_active(&self, key: K) {
        self.machine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_active(key);
    }

    pub(crate) fn mouse(
        &self,
        event: &MouseEvent,
        lookup: impl FnOnce(Point) -> Option<K>,
    ) -> FocusEffect<K> {
        self.machine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(event, lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two side-by-side containers: 1 covers x < 5, 2 covers 5 <= x < 10.
    fn lookup(p: Point) -> Option<u8> {
        match p.x {
            0..=4 => Some(1),
            5..=9 => Some(2),
            _ => None,
        }
    }

    fn ev(kind: MouseEventKind, x: u16) -> MouseEvent {
        MouseEvent::new(kind, x, 0)
    }

    const DOWN: MouseEventKind = MouseEventKind::Down(MouseButton::Left);
    const UP: MouseEventKind = MouseEventKind::Up(MouseButton::Left);

    #[test]
    fn click_and_release_in_same_container_commits() {
        let mut m = FocusMachine::new(0u8);
        assert_eq!(m.apply(&ev(DOWN, 7), lookup), FocusEffect::Armed(2));
        assert_eq!(m.state(), FocusState::WantRelease { candidate: 2 });
        assert_eq!(m.apply(&ev(UP, 8), lookup), FocusEffect::Committed(2));
        assert_eq!(m.active(), 2);
        assert_eq!(m.state(), FocusState::WantLeftButton);
    }

    #[test]
    fn release_in_other_container_discards() {
        let mut m = FocusMachine::new(0u8);
        m.apply(&ev(DOWN, 1), lookup);
        assert_eq!(m.apply(&ev(UP, 6), lookup), FocusEffect::Discarded);
        assert_eq!(m.active(), 0);
        assert_eq!(m.state(), FocusState::WantLeftButton);
    }

    #[test]
    fn drag_between_containers_commits_nothing() {
        let mut m = FocusMachine::new(0u8);
        m.apply(&ev(DOWN, 1), lookup);
        assert_eq!(
            m.apply(&ev(MouseEventKind::Drag(MouseButton::Left), 6), lookup),
            FocusEffect::Ignored
        );
        m.apply(&ev(UP, 6), lookup);
        assert_eq!(m.active(), 0);
    }

    #[test]
    fn second_press_replaces_candidate() {
        let mut m = FocusMachine::new(0u8);
        m.apply(&ev(DOWN, 1), lookup);
        assert_eq!(m.apply(&ev(DOWN, 6), lookup), FocusEffect::Rearmed(2));
        assert_eq!(m.apply(&ev(UP, 6), lookup), FocusEffect::Committed(2));
    }

    #[test]
    fn press_outside_everything_stays_idle() {
        let mut m = FocusMachine::new(0u8);
        assert_eq!(m.apply(&ev(DOWN, 20), lookup), FocusEffect::Ignored);
        assert_eq!(m.state(), FocusState::WantLeftButton);

        m.apply(&ev(DOWN, 1), lookup);
        assert_eq!(m.apply(&ev(DOWN, 20), lookup), FocusEffect::Discarded);
        assert_eq!(m.state(), FocusState::WantLeftButton);
    }

    #[test]
    fn other_buttons_are_ignored_when_idle_and_cancel_when_armed() {
        let mut m = FocusMachine::new(0u8);
        for kind in [
            MouseEventKind::Down(MouseButton::Right),
            MouseEventKind::Up(MouseButton::Middle),
            MouseEventKind::ScrollDown,
            UP,
        ] {
            assert_eq!(m.apply(&ev(kind, 1), lookup), FocusEffect::Ignored);
        }

        m.apply(&ev(DOWN, 1), lookup);
        assert_eq!(
            m.apply(&ev(MouseEventKind::ScrollUp, 1), lookup),
            FocusEffect::Discarded
        );
        m.apply(&ev(UP, 1), lookup);
        assert_eq!(m.active(), 0);
    }

    #[test]
    fn tracker_shares_state() {
        let tracker = FocusTracker::new(0u8);
        assert!(tracker.is_active(0));
        tracker.mouse(&ev(DOWN, 2), lookup);
        tracker.mouse(&ev(UP, 2), lookup);
        assert!(tracker.is_active(1));
        tracker.set_active(2);
        assert_eq!(tracker.active(), 2);
    }
}
