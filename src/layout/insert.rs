use std::collections::HashSet;

use quilt_ipc::{Direction, NodeKind, Size};

use super::container::{ContainerData, LayoutTree, LeafData, NodeData};

impl LayoutTree {
    /// Split pane `id` in half, placing a new empty pane towards `direction`.
    ///
    /// When the split runs along the parent's axis the new pane joins the parent's children.
    /// Otherwise the target is wrapped in a new container of the opposite orientation that takes
    /// over its place, size and flags.
    ///
    /// Returns the id of the new pane, or `None` if `id` is not a pane.
    pub fn insert(&mut self, id: &str, direction: Direction) -> Option<String> {
        let Some(target) = self.key_of(id) else {
            warn!("insert next to unknown pane {id:?}");
            return None;
        };
        if !self.nodes[target].is_leaf() {
            warn!("insert next to {id} ignored: not a pane");
            return None;
        }
        let parent = self.nodes[target].parent?;
        let orientation = self.container(parent)?.orientation;
        let idx = self.position(parent, target)?;

        let axis = direction.axis();
        let old_size = self.nodes[target].size;
        let old_neighbors = self.nodes[target].neighbors;
        let half = old_size.main(axis) / 2.;

        let new_id = self.fresh_id(NodeKind::Leaf, &HashSet::new());
        let new_leaf = self.insert_node(
            new_id.clone(),
            Size::from_axes(axis, half, 1.),
            NodeData::Leaf(LeafData::default()),
        );
        // The new pane always faces the target across the split.
        self.nodes[new_leaf].neighbors = old_neighbors.with(direction.opposite(), true);

        let pair = if direction.is_negative() {
            vec![new_leaf, target]
        } else {
            vec![target, new_leaf]
        };

        if axis == orientation {
            *self.nodes[target].size.main_mut(axis) = half;
            self.splice_children(parent, idx, 1, pair);
            self.refresh_neighbors(parent);
        } else {
            let wrapper_id = self.fresh_id(NodeKind::Container, &HashSet::new());
            let wrapper = self.insert_node(
                wrapper_id,
                old_size,
                NodeData::Container(ContainerData::new(axis)),
            );
            self.nodes[wrapper].neighbors = old_neighbors;
            self.nodes[target].size = Size::from_axes(axis, half, 1.);

            self.splice_children(parent, idx, 1, vec![wrapper]);
            self.set_children(wrapper, pair);
            self.refresh_neighbors(wrapper);
            trace!(
                "wrapped {id} in {} {}",
                axis,
                self.nodes[wrapper].id
            );
        }

        debug!("inserted {new_id} {direction} of {id}");
        self.prune_drag();
        self.check_invariants();
        Some(new_id)
    }
}
