#![forbid(unsafe_code)]

//! The container tree.
//!
//! Nodes live in an arena keyed by [`NodeId`]. A split node owns its two
//! children through their ids; every node keeps its parent id for upward
//! navigation only. Removing a node removes its whole subtree.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use trellis_core::geometry::{Point, Rect};
use trellis_layout::{Fit, NodeAreas, SplitAxis, SplitSize, fit_widget, split, usable_area};
use trellis_widgets::Widget;

use crate::error::ContainerError;
use crate::options::{Content, ContainerOptions, Opt, fold};

/// Arena key of a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node holds.
#[derive(Clone)]
pub(crate) enum Slot {
    Empty,
    Widget(Arc<dyn Widget>),
    Split {
        axis: SplitAxis,
        size: SplitSize,
        first: NodeId,
        second: NodeId,
    },
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Widget(_) => f.write_str("Widget(..)"),
            Self::Split {
                axis,
                size,
                first,
                second,
            } => f
                .debug_struct("Split")
                .field("axis", axis)
                .field("size", size)
                .field("first", first)
                .field("second", second)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) options: ContainerOptions,
    pub(crate) slot: Slot,
    /// Areas from the last layout pass.
    pub(crate) areas: NodeAreas,
    /// Where the widget was fitted in the last layout pass, if it fit.
    pub(crate) widget_rect: Option<Rect>,
}

impl Node {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            options: ContainerOptions::default(),
            slot: Slot::Empty,
            areas: NodeAreas {
                area: Rect::default(),
                frame: Rect::default(),
                inner: Rect::default(),
                usable: Rect::default(),
            },
            widget_rect: None,
        }
    }

    pub(crate) fn widget(&self) -> Option<&Arc<dyn Widget>> {
        match &self.slot {
            Slot::Widget(widget) => Some(widget),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Tree {
    root: NodeId,
    next_id: u64,
    nodes: BTreeMap<NodeId, Node>,
}

impl Tree {
    /// Build a tree from the root's options.
    pub(crate) fn build(opts: Vec<Opt>) -> Result<Self, ContainerError> {
        let root = NodeId(1);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::new(None));
        let mut tree = Self {
            root,
            next_id: 2,
            nodes,
        };
        tree.populate(root, ContainerOptions::default(), opts)?;
        tree.validate()?;
        Ok(tree)
    }

    #[inline]
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Human-readable name for logs and errors.
    pub(crate) fn label(&self, id: NodeId) -> String {
        match self.node(id).and_then(|n| n.options.id.as_deref()) {
            Some(name) => format!("{name:?}"),
            None => id.to_string(),
        }
    }

    fn allocate(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(Some(parent)));
        id
    }

    /// Apply `opts` over `base` at `id` and create its children.
    fn populate(
        &mut self,
        id: NodeId,
        base: ContainerOptions,
        opts: Vec<Opt>,
    ) -> Result<(), ContainerError> {
        let (options, content) = fold(base, opts)?;
        let child_base = options.child_defaults();

        let slot = match content {
            Content::Empty => Slot::Empty,
            Content::Widget(widget) => Slot::Widget(widget),
            Content::Split {
                axis,
                size,
                first,
                second,
            } => {
                let first_id = self.allocate(id);
                let second_id = self.allocate(id);
                self.populate(first_id, child_base.clone(), first)?;
                self.populate(second_id, child_base, second)?;
                Slot::Split {
                    axis,
                    size,
                    first: first_id,
                    second: second_id,
                }
            }
        };

        if let Some(node) = self.nodes.get_mut(&id) {
            node.options = options;
            node.slot = slot;
        }
        Ok(())
    }

    /// Replace the options of `id`, rebuilding its subtree. The identifier
    /// is kept unless the new options set another one.
    pub(crate) fn replace(&mut self, id: NodeId, opts: Vec<Opt>) -> Result<(), ContainerError> {
        let Some(node) = self.nodes.get(&id) else {
            return Ok(());
        };
        let base = match node.parent.and_then(|p| self.nodes.get(&p)) {
            Some(parent) => parent.options.child_defaults(),
            None => ContainerOptions::default(),
        };
        let kept_id = node.options.id.clone();

        for child in self.children(id) {
            self.remove_subtree(child);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.slot = Slot::Empty;
        }

        let base = ContainerOptions { id: kept_id, ..base };
        self.populate(id, base, opts)?;
        self.validate()
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.nodes.get(&id).map(|n| &n.slot) {
            Some(Slot::Split { first, second, .. }) => vec![*first, *second],
            _ => Vec::new(),
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.remove_subtree(child);
        }
        self.nodes.remove(&id);
    }

    /// Identifiers unique, one initial focus at most, root-only keys.
    fn validate(&self) -> Result<(), ContainerError> {
        let mut seen = BTreeSet::new();
        let mut focused = 0usize;
        for (&id, node) in &self.nodes {
            if let Some(name) = &node.options.id
                && !seen.insert(name.as_str())
            {
                return Err(ContainerError::DuplicateId(name.clone()));
            }
            if node.options.focused {
                focused += 1;
            }
            if id != self.root {
                if node.options.key_focus_next.is_some() {
                    return Err(ContainerError::RootOnly {
                        option: "key_focus_next",
                    });
                }
                if node.options.key_focus_previous.is_some() {
                    return Err(ContainerError::RootOnly {
                        option: "key_focus_previous",
                    });
                }
            }
        }
        if focused > 1 {
            return Err(ContainerError::MultipleFocused);
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub(crate) fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.options.id.as_deref() == Some(name))
            .map(|(&id, _)| id)
    }

    /// The node marked with the `focused` option, if any.
    pub(crate) fn initially_focused(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.options.focused)
            .map(|(&id, _)| id)
    }

    /// Whether `node` lies strictly below `ancestor`.
    pub(crate) fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// All nodes, parents before children, first child before second.
    pub(crate) fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(Slot::Split { first, second, .. }) = self.nodes.get(&id).map(|n| &n.slot) {
                stack.push(*second);
                stack.push(*first);
            }
        }
        out
    }

    /// The deepest node whose frame contains `p`.
    ///
    /// Children are split from their parent's area inside the border, so a
    /// border cell always resolves to the bordered node itself.
    pub(crate) fn node_at(&self, p: Point) -> Option<NodeId> {
        let mut cur = self.root;
        if !self.nodes.get(&cur)?.areas.frame.contains(p) {
            return None;
        }
        loop {
            let Some(Slot::Split { first, second, .. }) = self.nodes.get(&cur).map(|n| &n.slot)
            else {
                return Some(cur);
            };
            let hit = [*first, *second].into_iter().find(|child| {
                self.nodes
                    .get(child)
                    .is_some_and(|n| n.areas.frame.contains(p))
            });
            match hit {
                Some(child) => cur = child,
                None => return Some(cur),
            }
        }
    }

    // ── Layout ──────────────────────────────────────────────────────────

    /// Compute every node's areas, with the root occupying `area`.
    pub(crate) fn layout(&mut self, area: Rect) {
        self.layout_node(self.root, area);
    }

    fn layout_node(&mut self, id: NodeId, area: Rect) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let opts = &node.options;
        let padding = matches!(node.slot, Slot::Widget(_)).then_some(&opts.padding);
        let areas = usable_area(area, &opts.margin, opts.bordered(), padding);
        node.areas = areas;
        node.widget_rect = match &node.slot {
            Slot::Widget(widget) => match widget.options().validate() {
                Ok(wopts) => match fit_widget(areas.usable, &wopts.limits, opts.halign, opts.valign)
                {
                    Fit::Fits(rect) => Some(rect),
                    Fit::TooSmall => None,
                },
                Err(_) => None,
            },
            _ => None,
        };

        if let Slot::Split {
            axis,
            size,
            first,
            second,
        } = node.slot
        {
            let (a, b) = split(areas.inner, axis, size);
            self.layout_node(first, a);
            self.layout_node(second, b);
        }
    }
}
