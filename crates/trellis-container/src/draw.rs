#![forbid(unsafe_code)]

//! The draw pass.
//!
//! Nodes are drawn parents first. Each node gets a canvas over its frame
//! (area after margin) holding its border, title, and widget; the canvas is
//! then applied to the terminal. Empty cells are never written, so a child
//! drawn later is not erased by its parent.

use trellis_core::geometry::Point;
use trellis_render::canvas::{Canvas, CanvasError};
use trellis_render::cell::{Cell, CellOptions};
use trellis_render::drawing::Draw;
use trellis_render::terminal::Terminal;
use trellis_widgets::DrawMeta;

use crate::error::ContainerError;
use crate::focus::FocusTracker;
use crate::tree::{Node, NodeId, Tree};

pub(crate) fn draw_tree(
    tree: &Tree,
    focus: &FocusTracker<NodeId>,
    terminal: &dyn Terminal,
) -> Result<(), ContainerError> {
    for id in tree.preorder() {
        if let Some(node) = tree.node(id) {
            draw_node(tree, id, node, focus.is_active(id), terminal)?;
        }
    }
    Ok(())
}

fn draw_node(
    tree: &Tree,
    id: NodeId,
    node: &Node,
    focused: bool,
    terminal: &dyn Terminal,
) -> Result<(), ContainerError> {
    let frame = node.areas.frame;
    if frame.is_empty() {
        return Ok(());
    }
    let mut canvas = Canvas::new(frame)?;

    let opts = &node.options;
    if let Some(style) = opts.border {
        let color = if focused {
            opts.focused_color
        } else {
            opts.border_color
        };
        let bounds = canvas.bounds();
        canvas.draw_border(bounds, style.chars(), Cell::default().with_fg(color));
        canvas.draw_border_title(bounds, &opts.title, opts.title_align, &CellOptions::new().fg(color));
    }

    if let Some(widget) = node.widget() {
        match node.widget_rect {
            Some(rect) => {
                let mut widget_canvas = Canvas::new(rect)?;
                widget
                    .draw(&mut widget_canvas, &DrawMeta { focused })
                    .map_err(|source| ContainerError::Widget {
                        container: tree.label(id),
                        source,
                    })?;
                widget_canvas.copy_to(&mut canvas);
            }
            None => {
                // Too small: mark the first cell that is still free.
                let spot = [node.areas.usable, node.areas.inner]
                    .into_iter()
                    .find(|r| !r.is_empty());
                if let Some(spot) = spot {
                    let local = Point::new(spot.x - frame.x, spot.y - frame.y);
                    canvas.draw_placeholder(local, &CellOptions::new());
                }
            }
        }
    }

    match canvas.apply(terminal) {
        Ok(()) => Ok(()),
        Err(CanvasError::DoesNotFit { .. }) => {
            // The terminal shrank mid-pass; the next pass lays out again.
            trellis_core::debug!(
                container = %tree.label(id),
                ?frame,
                "canvas skipped, terminal too small"
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
