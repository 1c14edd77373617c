//! Pane deletion.
//!
//! Deleting starts at the pane's parent. A neighbor absorbs the freed space, and a container left
//! with a single pane dissolves into its own parent, handing that pane over in its place. This
//! repeats upwards until some container keeps at least two children, or until the root, which is
//! never removed.

use quilt_ipc::Direction;

use super::container::{LayoutTree, NodeKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed {
        /// Sibling that took over the pane's space, if one did.
        survivor: Option<String>,
        /// Containers dissolved on the way up, innermost first.
        collapsed: Vec<String>,
    },
    /// The pane is the last one left and stays.
    Refused,
}

/// Result of removing one child from one container.
enum Step {
    /// The container keeps its new children.
    Done,
    /// The container must be replaced in its parent by its sole remaining child, if any.
    Collapse(Option<NodeKey>),
}

impl LayoutTree {
    /// Close pane `id`, preferring the sibling towards `direction` to absorb its space.
    ///
    /// Returns `None` if `id` is not a pane.
    pub fn delete(&mut self, id: &str, direction: Direction) -> Option<DeleteOutcome> {
        let Some(leaf) = self.key_of(id) else {
            warn!("delete of unknown pane {id:?}");
            return None;
        };
        if !self.nodes[leaf].is_leaf() {
            warn!("delete of {id} ignored: not a pane");
            return None;
        }
        if self.leaf_count() <= 1 {
            debug!("refusing to delete {id}: it is the last pane");
            return Some(DeleteOutcome::Refused);
        }

        let mut target = leaf;
        let mut carryover = None;
        let mut survivor = None;
        let mut collapsed = Vec::new();

        while let Some(parent) = self.nodes[target].parent {
            let (step, grown) = self.remove_child(parent, target, direction, carryover);
            if survivor.is_none() {
                survivor = grown;
            }

            match step {
                Step::Done => break,
                Step::Collapse(sole) => {
                    trace!(
                        "{} collapsed, forwarding {:?}",
                        self.nodes[parent].id,
                        sole.map(|key| &self.nodes[key].id)
                    );
                    collapsed.push(parent);
                    carryover = sole;
                    target = parent;
                }
            }
        }

        self.remove_node(leaf);
        let collapsed: Vec<String> = collapsed
            .into_iter()
            .filter_map(|key| self.remove_node(key))
            .map(|node| node.id)
            .collect();
        let survivor = survivor.map(|key| self.nodes[key].id.clone());

        debug!(
            "deleted {id}, survivor {survivor:?}, collapsed {}",
            collapsed.len()
        );
        self.prune_drag();
        self.check_invariants();
        Some(DeleteOutcome::Removed {
            survivor,
            collapsed,
        })
    }

    /// Remove `target` from `container`, putting `carryover` in its place.
    ///
    /// Without a carryover, the sibling towards `direction` (or the other one) grows by the
    /// target's share. Also returns that sibling.
    fn remove_child(
        &mut self,
        container: NodeKey,
        target: NodeKey,
        direction: Direction,
        carryover: Option<NodeKey>,
    ) -> (Step, Option<NodeKey>) {
        let Some(data) = self.container(container) else {
            return (Step::Done, None);
        };
        let orientation = data.orientation;
        let mut children = data.children.clone();
        let Some(idx) = children.iter().position(|&key| key == target) else {
            return (Step::Done, None);
        };

        let prev = idx.checked_sub(1).map(|i| children[i]);
        let next = children.get(idx + 1).copied();
        let survivor = if direction.is_negative() {
            prev.or(next)
        } else {
            next.or(prev)
        };

        let mut grown = None;
        if carryover.is_none() {
            if let Some(survivor) = survivor {
                let share = self.nodes[target].size.main(orientation);
                *self.nodes[survivor].size.main_mut(orientation) += share;
                grown = Some(survivor);
            }
        }

        children.remove(idx);
        if let Some(carryover) = carryover {
            children.insert(idx, carryover);
        }

        let keep = match children.as_slice() {
            [] => false,
            [sole] => self.children(*sole).len() > 1,
            _ => true,
        };
        let is_root = self.nodes[container].parent.is_none();

        if !keep {
            if let Some(&sole) = children.first() {
                self.nodes[sole].size = self.nodes[container].size;
                self.nodes[sole].neighbors = self.nodes[container].neighbors;
            }
            if !is_root {
                return (Step::Collapse(children.first().copied()), grown);
            }
        }

        self.set_children(container, children);
        self.refresh_neighbors(container);
        (Step::Done, grown)
    }
}
