#![forbid(unsafe_code)]

//! The container tree.
//!
//! A [`Container`] divides a terminal into a binary tree of regions. Each
//! region either splits into two children or holds one widget. The tree is
//! configured declaratively with [`options`], drawn with
//! [`Container::draw`], and fed input with [`Container::keyboard`] and
//! [`Container::mouse`].
//!
//! # Locking
//!
//! The tree sits behind one mutex held for a whole draw pass or a whole
//! input dispatch, so a draw always sees the layout and focus left by the
//! last completed dispatch. Focus has its own read/write lock; draws only
//! read it. Widget callbacks run with the tree locked and must not call
//! back into their container.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis_container::Container;
//! use trellis_container::options::*;
//!
//! let container = Container::new(
//!     terminal,
//!     eds.sink(),
//!     vec![
//!         border(LineStyle::Rounded),
//!         key_focus_next(KeyCode::Tab),
//!         split_vertical(
//!             vec![id("chart"), place_widget(chart)],
//!             vec![id("log"), place_widget(log)],
//!             split_percent(60),
//!         ),
//!     ],
//! )?;
//! container.draw()?;
//! ```

mod draw;
pub mod error;
pub mod focus;
pub mod options;
mod route;
mod tree;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use trellis_core::distribution::EventSink;
use trellis_core::event::{Event, KeyEvent, MouseEvent};
use trellis_core::geometry::Rect;
use trellis_render::terminal::Terminal;

use crate::focus::FocusTracker;
use crate::tree::{NodeId, Tree};

pub use error::ContainerError;
pub use focus::{FocusEffect, FocusMachine, FocusState};
pub use options::{ContainerOptions, Opt, Side};

/// The root of a container tree, bound to a terminal.
pub struct Container {
    terminal: Arc<dyn Terminal>,
    sink: EventSink,
    tree: Mutex<Tree>,
    focus: FocusTracker<NodeId>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("tree", &*self.tree())
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

impl Container {
    /// Build a tree from the root's options.
    ///
    /// `sink` receives widget handler failures as [`Event::Error`]. Every
    /// option is validated here; a tree that builds never fails at draw time
    /// because of its configuration.
    pub fn new(
        terminal: Arc<dyn Terminal>,
        sink: EventSink,
        opts: impl IntoIterator<Item = Opt>,
    ) -> Result<Self, ContainerError> {
        let mut tree = Tree::build(opts.into_iter().collect())?;
        tree.layout(Rect::from_size(terminal.size()));
        let active = tree.initially_focused().unwrap_or(tree.root());
        Ok(Self {
            terminal,
            sink,
            tree: Mutex::new(tree),
            focus: FocusTracker::new(active),
        })
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the options of the container identified by `id`.
    ///
    /// The container keeps its identifier. Its children, widget, border and
    /// every other option come from `opts` alone; border and focus colors are
    /// inherited from its parent as at construction. If focus was inside the
    /// replaced subtree it moves to this container. On error the tree is left
    /// as it was.
    pub fn update(&self, id: &str, opts: impl IntoIterator<Item = Opt>) -> Result<(), ContainerError> {
        if id.is_empty() {
            return Err(ContainerError::EmptyId);
        }
        let mut tree = self.tree();
        let target = tree
            .find(id)
            .ok_or_else(|| ContainerError::UnknownId(id.to_owned()))?;

        let mut next = tree.clone();
        next.replace(target, opts.into_iter().collect())?;
        next.layout(Rect::from_size(self.terminal.size()));

        let marked = next
            .initially_focused()
            .filter(|&n| n == target || next.is_descendant(n, target));
        if let Some(marked) = marked {
            self.focus.set_active(marked);
        } else if !next.contains(self.focus.active()) {
            self.focus.set_active(target);
        }
        *tree = next;
        trellis_core::debug!(container = id, "container updated");
        Ok(())
    }

    /// Lay the tree out at the terminal's current size and draw it into the
    /// terminal's back buffer. Does not clear or flush the terminal.
    pub fn draw(&self) -> Result<(), ContainerError> {
        let mut tree = self.tree();
        tree.layout(Rect::from_size(self.terminal.size()));
        draw::draw_tree(&tree, &self.focus, self.terminal.as_ref())
    }

    /// Route a key to the focused widget and to global keyboard widgets.
    pub fn keyboard(&self, event: &KeyEvent) {
        let tree = self.tree();
        route::keyboard(&tree, &self.focus, &self.sink, event);
    }

    /// Update focus from a mouse event and route it to interested widgets.
    pub fn mouse(&self, event: &MouseEvent) {
        let tree = self.tree();
        route::mouse(&tree, &self.focus, &self.sink, event);
    }

    /// Dispatch any event: keys and mouse events are routed, the rest is
    /// ignored. Suitable as a distribution system subscriber.
    pub fn handle(&self, event: &Event) {
        match event {
            Event::Key(key) => self.keyboard(key),
            Event::Mouse(mouse) => self.mouse(mouse),
            Event::Resize(_) | Event::Error(_) => {}
        }
    }

    /// Identifier of the focused container, if it has one.
    pub fn focused_id(&self) -> Option<String> {
        let tree = self.tree();
        tree.node(self.focus.active())
            .and_then(|n| n.options.id.clone())
    }

    /// Area of the identified container as of the last layout.
    pub fn area_of(&self, id: &str) -> Option<Rect> {
        let tree = self.tree();
        tree.find(id)
            .and_then(|n| tree.node(n))
            .map(|n| n.areas.area)
    }

    /// Where the identified container's widget was placed in the last
    /// layout, or `None` if it holds no widget or the widget did not fit.
    pub fn widget_area_of(&self, id: &str) -> Option<Rect> {
        let tree = self.tree();
        tree.find(id)
            .and_then(|n| tree.node(n))
            .and_then(|n| n.widget_rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::*;
    use std::time::Duration;
    use trellis_core::distribution::{DistributionSystem, SubscribeOptions};
    use trellis_core::event::{KeyCode, Modifiers, MouseButton, MouseEventKind};
    use trellis_core::geometry::{Point, Size};
    use trellis_render::headless::HeadlessTerminal;
    use trellis_widgets::mirror::Mirror;
    use trellis_widgets::{KeyScope, MouseScope, WidgetOptions};

    fn setup(w: u16, h: u16) -> (Arc<HeadlessTerminal>, DistributionSystem) {
        (Arc::new(HeadlessTerminal::new(Size::new(w, h))), DistributionSystem::new())
    }

    fn container(
        term: &Arc<HeadlessTerminal>,
        eds: &DistributionSystem,
        opts: Vec<Opt>,
    ) -> Result<Container, ContainerError> {
        Container::new(term.clone(), eds.sink(), opts)
    }

    fn click(c: &Container, x: u16, y: u16) {
        c.mouse(&MouseEvent::new(MouseEventKind::Down(MouseButton::Left), x, y));
        c.mouse(&MouseEvent::new(MouseEventKind::Up(MouseButton::Left), x, y));
    }

    fn keyed(scope: KeyScope) -> Arc<Mirror> {
        Arc::new(Mirror::new(WidgetOptions::new().keyboard(scope)))
    }

    #[test]
    fn root_focused_by_default_or_by_option() {
        let (term, eds) = setup(10, 4);
        let c = container(&term, &eds, vec![id("root")]).unwrap();
        assert_eq!(c.focused_id().as_deref(), Some("root"));

        let c = container(
            &term,
            &eds,
            vec![split_vertical(
                vec![id("a")],
                vec![id("b"), focused()],
                SplitSize::default(),
            )],
        )
        .unwrap();
        assert_eq!(c.focused_id().as_deref(), Some("b"));
    }

    #[test]
    fn click_moves_focus() {
        let (term, eds) = setup(10, 4);
        let c = container(
            &term,
            &eds,
            vec![split_vertical(vec![id("a")], vec![id("b")], SplitSize::default())],
        )
        .unwrap();
        click(&c, 7, 1);
        assert_eq!(c.focused_id().as_deref(), Some("b"));
        click(&c, 1, 1);
        assert_eq!(c.focused_id().as_deref(), Some("a"));
    }

    #[test]
    fn keyboard_scopes() {
        let (term, eds) = setup(20, 4);
        let focused_only = keyed(KeyScope::Focused);
        let global = keyed(KeyScope::Global);
        let deaf = keyed(KeyScope::None);
        let c = container(
            &term,
            &eds,
            vec![split_vertical(
                vec![id("a"), place_widget(focused_only.clone())],
                vec![split_vertical(
                    vec![id("b"), place_widget(global.clone())],
                    vec![id("c"), place_widget(deaf.clone())],
                    SplitSize::default(),
                )],
                SplitSize::default(),
            )],
        )
        .unwrap();

        c.keyboard(&KeyEvent::new(KeyCode::Char('x')));
        assert!(focused_only.keys().is_empty());
        assert_eq!(global.keys().len(), 1);
        assert!(!global.keys()[0].1.focused);

        click(&c, 1, 1);
        c.keyboard(&KeyEvent::new(KeyCode::Char('y')));
        assert_eq!(focused_only.keys().len(), 1);
        assert!(focused_only.keys()[0].1.focused);
        assert_eq!(global.keys().len(), 2);
        assert!(deaf.keys().is_empty());
    }

    #[test]
    fn focus_keys_cycle_widget_containers() {
        let (term, eds) = setup(30, 4);
        let w = || place_widget(keyed(KeyScope::Focused));
        let c = container(
            &term,
            &eds,
            vec![
                key_focus_next(KeyCode::Tab),
                key_focus_previous(KeyCode::BackTab),
                split_vertical(
                    vec![id("a"), w()],
                    vec![split_vertical(
                        vec![id("skip"), w(), key_focus_skip()],
                        vec![id("c"), w()],
                        SplitSize::default(),
                    )],
                    SplitSize::default(),
                ),
            ],
        )
        .unwrap();
        let tab = KeyEvent::new(KeyCode::Tab);
        let back = KeyEvent::new(KeyCode::BackTab);

        c.keyboard(&tab);
        assert_eq!(c.focused_id().as_deref(), Some("a"));
        c.keyboard(&tab);
        assert_eq!(c.focused_id().as_deref(), Some("c"));
        c.keyboard(&tab);
        assert_eq!(c.focused_id().as_deref(), Some("a"));
        c.keyboard(&back);
        assert_eq!(c.focused_id().as_deref(), Some("c"));
    }

    #[test]
    fn shift_tab_from_terminal_moves_focus_back() {
        let (term, eds) = setup(20, 4);
        let global = keyed(KeyScope::Global);
        let c = container(
            &term,
            &eds,
            vec![
                key_focus_next(KeyCode::Tab),
                key_focus_previous(KeyCode::BackTab),
                split_vertical(
                    vec![id("a"), place_widget(global.clone())],
                    vec![id("b"), place_widget(keyed(KeyScope::Focused))],
                    SplitSize::default(),
                ),
            ],
        )
        .unwrap();
        c.keyboard(&KeyEvent::new(KeyCode::Tab));
        assert_eq!(c.focused_id().as_deref(), Some("a"));

        // Terminals report Shift+Tab as BackTab with Shift held.
        c.keyboard(&KeyEvent::new(KeyCode::BackTab).with_modifiers(Modifiers::SHIFT));
        assert_eq!(c.focused_id().as_deref(), Some("b"));
        assert!(global.keys().is_empty());

        // A modifier the binding does not name is a different key.
        c.keyboard(&KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::CTRL));
        assert_eq!(c.focused_id().as_deref(), Some("b"));
        assert_eq!(global.keys().len(), 1);
    }

    #[test]
    fn focus_keys_are_not_forwarded() {
        let (term, eds) = setup(10, 4);
        let global = keyed(KeyScope::Global);
        let c = container(
            &term,
            &eds,
            vec![key_focus_next(KeyCode::Tab), place_widget(global.clone())],
        )
        .unwrap();
        c.keyboard(&KeyEvent::new(KeyCode::Tab));
        assert!(global.keys().is_empty());
    }

    #[test]
    fn container_scope_reports_outside_sentinel() {
        let (term, eds) = setup(20, 10);
        let mirror = Arc::new(Mirror::new(
            WidgetOptions::new()
                .max_size(Size::new(4, 2))
                .mouse(MouseScope::Container),
        ));
        let c = container(&term, &eds, vec![id("w"), place_widget(mirror.clone())]).unwrap();
        let rect = c.widget_area_of("w").unwrap();
        assert_eq!(rect, Rect::new(8, 4, 4, 2));

        let moved = |x, y| MouseEvent::new(MouseEventKind::Moved, x, y);
        c.mouse(&moved(9, 5));
        c.mouse(&moved(0, 0));
        let got: Vec<Point> = mirror.mice().iter().map(|(e, _)| e.position).collect();
        assert_eq!(got, vec![Point::new(1, 1), trellis_widgets::OUTSIDE_CANVAS]);
    }

    #[test]
    fn global_mouse_scope_receives_everything() {
        let (term, eds) = setup(20, 4);
        let global = Arc::new(Mirror::new(WidgetOptions::new().mouse(MouseScope::Global)));
        let c = container(
            &term,
            &eds,
            vec![split_vertical(
                vec![id("g"), place_widget(global.clone())],
                vec![id("other")],
                SplitSize::default(),
            )],
        )
        .unwrap();
        c.mouse(&MouseEvent::new(MouseEventKind::ScrollUp, 15, 2));
        c.mouse(&MouseEvent::new(MouseEventKind::ScrollUp, 3, 2));
        let got: Vec<Point> = global.mice().iter().map(|(e, _)| e.position).collect();
        assert_eq!(got, vec![trellis_widgets::OUTSIDE_CANVAS, Point::new(3, 2)]);
    }

    #[test]
    fn handler_errors_go_to_the_sink() {
        let (term, eds) = setup(10, 4);
        let (tx, rx) = std::sync::mpsc::channel();
        eds.subscribe(
            SubscribeOptions::new().with_filter([trellis_core::event::EventKind::Error]),
            move |ev| {
                let _ = tx.send(ev.clone());
            },
        )
        .unwrap();
        let broken = keyed(KeyScope::Global);
        broken.fail_input(Some("boom"));
        let c = container(&term, &eds, vec![id("w"), place_widget(broken)]).unwrap();

        c.keyboard(&KeyEvent::new(KeyCode::Enter));
        let got = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match got {
            Event::Error(err) => {
                assert!(err.message.contains("\"w\""));
                assert!(err.message.contains("boom"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn draw_error_aborts_pass() {
        let (term, eds) = setup(10, 4);
        let broken = Arc::new(Mirror::new(WidgetOptions::new()));
        broken.fail_draw(Some("no data"));
        let c = container(&term, &eds, vec![id("w"), place_widget(broken)]).unwrap();
        let err = c.draw().unwrap_err();
        assert!(matches!(err, ContainerError::Widget { ref container, .. } if container == "\"w\""));
    }

    #[test]
    fn handle_ignores_resize_and_errors() {
        let (term, eds) = setup(10, 4);
        let mirror = keyed(KeyScope::Global);
        let c = container(&term, &eds, vec![place_widget(mirror.clone())]).unwrap();
        c.handle(&Event::Resize(Size::new(3, 3)));
        c.handle(&Event::error("x"));
        c.handle(&Event::Key(KeyEvent::new(KeyCode::Escape)));
        assert_eq!(mirror.keys().len(), 1);
    }
}
