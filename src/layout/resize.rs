//! Interactive resizing of the boundary between two siblings.
//!
//! A resize request enters at the parent of the node whose edge was grabbed. A container accepts
//! it only when the edge runs across its own axis and a sibling exists on that side; otherwise the
//! request moves up one level with the container standing in for the child. The accepting
//! container owns the drag until [`LayoutTree::end_resize`].

use quilt_ipc::{Direction, Orientation, Point};

use super::container::{DragSession, LayoutTree, NodeKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// `owner` now drags the boundary between `child` and its sibling.
    Started { owner: String, child: String },
    /// No container up to the root could take the request.
    Absorbed,
    /// Another drag is already in progress.
    Busy,
}

impl LayoutTree {
    /// Begin dragging the `direction` edge of node `id`, with the pointer at `origin`.
    ///
    /// Returns `None` if there is no such node.
    pub fn resize(&mut self, id: &str, direction: Direction, origin: Point) -> Option<ResizeOutcome> {
        let Some(key) = self.key_of(id) else {
            warn!("resize of unknown node {id:?}");
            return None;
        };

        if let Some(owner) = self.drag_owner {
            debug!(
                "ignoring resize of {id}: {} is already dragging",
                self.nodes[owner].id
            );
            return Some(ResizeOutcome::Busy);
        }

        let mut child = key;
        loop {
            let Some(parent) = self.nodes[child].parent else {
                debug!("resize {direction} of {id} reached the root, ignoring");
                return Some(ResizeOutcome::Absorbed);
            };

            if self.accepts_resize(parent, child, direction) {
                let container = self.container_mut(parent)?;
                container.drag = Some(DragSession {
                    child,
                    direction,
                    last_pointer: origin,
                });
                self.drag_owner = Some(parent);

                let owner = self.nodes[parent].id.clone();
                let child = self.nodes[child].id.clone();
                debug!("{owner} started dragging {direction} edge of {child}");
                self.check_invariants();
                return Some(ResizeOutcome::Started { owner, child });
            }

            trace!(
                "forwarding resize {direction} from {} to {}",
                self.nodes[child].id,
                self.nodes[parent].id
            );
            child = parent;
        }
    }

    /// Feed a pointer sample to the active drag.
    ///
    /// Returns `false` if there is no active drag.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        let Some(owner) = self.drag_owner else {
            return false;
        };
        let Some(container) = self.container(owner) else {
            self.drag_owner = None;
            return false;
        };
        let orientation = container.orientation;
        let Some(session) = container.drag.clone() else {
            self.drag_owner = None;
            return false;
        };

        let Some((target, sibling)) = self.drag_pair(owner, &session) else {
            debug!("drag target of {} went away, ending drag", self.nodes[owner].id);
            self.end_resize();
            return false;
        };

        let extent = self.extent(owner);
        let delta = position - session.last_pointer;
        let (moved, span) = match orientation {
            Orientation::Row => (delta.x, extent.width),
            Orientation::Column => (delta.y, extent.height),
        };

        if let Some(container) = self.container_mut(owner) {
            if let Some(drag) = &mut container.drag {
                drag.last_pointer = position;
            }
        }

        let fraction = moved / span;
        if !fraction.is_finite() || fraction == 0. {
            return true;
        }

        // Positive values grow the target at the expense of its sibling.
        let grow = if session.direction.is_negative() {
            -fraction
        } else {
            fraction
        };

        let min = self.options.min_pane_size;
        let target_size = self.nodes[target].size.main(orientation);
        let sibling_size = self.nodes[sibling].size.main(orientation);
        let grow = grow.clamp((min - target_size).min(0.), (sibling_size - min).max(0.));

        *self.nodes[target].size.main_mut(orientation) += grow;
        *self.nodes[sibling].size.main_mut(orientation) -= grow;

        trace!(
            "{} resized {} by {grow:.4} against {}",
            self.nodes[owner].id,
            self.nodes[target].id,
            self.nodes[sibling].id
        );
        self.check_invariants();
        true
    }

    /// Release the active drag.
    ///
    /// Returns `false` if there was none.
    pub fn end_resize(&mut self) -> bool {
        let Some(owner) = self.drag_owner.take() else {
            return false;
        };
        if let Some(container) = self.container_mut(owner) {
            container.drag = None;
        }
        debug!("drag ended");
        true
    }

    /// Drop the drag session if a structural change invalidated it.
    pub(super) fn prune_drag(&mut self) {
        let Some(owner) = self.drag_owner else {
            return;
        };
        let valid = self
            .container(owner)
            .and_then(|c| c.drag.as_ref())
            .is_some_and(|session| self.drag_pair(owner, session).is_some());
        if !valid {
            debug!("layout changed under the active drag, ending it");
            self.end_resize();
        }
    }

    fn accepts_resize(&self, container: NodeKey, child: NodeKey, direction: Direction) -> bool {
        let Some(data) = self.container(container) else {
            return false;
        };
        if direction.axis() != data.orientation {
            return false;
        }

        let Some(idx) = self.position(container, child) else {
            return false;
        };
        if direction.is_negative() {
            idx > 0
        } else {
            idx + 1 < data.children.len()
        }
    }

    /// The dragged child and the sibling on the dragged side.
    fn drag_pair(&self, owner: NodeKey, session: &DragSession) -> Option<(NodeKey, NodeKey)> {
        let children = self.children(owner);
        let idx = self.position(owner, session.child)?;
        let sibling = if session.direction.is_negative() {
            *children.get(idx.checked_sub(1)?)?
        } else {
            *children.get(idx + 1)?
        };
        Some((session.child, sibling))
    }
}
