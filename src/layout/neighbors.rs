use quilt_ipc::{Direction, Neighbors, Orientation};

use super::container::{LayoutTree, NodeKey};

/// Neighbor flags of a container's child.
///
/// Edges across the container's axis come straight from the container. Along the axis, an edge
/// has a neighbor when there is a sibling on that side or when the container itself has one.
pub fn child_neighbors(
    parent: Neighbors,
    orientation: Orientation,
    has_prev: bool,
    has_next: bool,
) -> Neighbors {
    let (start, end) = match orientation {
        Orientation::Row => (Direction::Left, Direction::Right),
        Orientation::Column => (Direction::Top, Direction::Bottom),
    };

    parent
        .with(start, has_prev || parent.get(start))
        .with(end, has_next || parent.get(end))
}

impl LayoutTree {
    /// Recompute the flags of every descendant of `key` from its own flags.
    pub(super) fn refresh_neighbors(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            let Some(container) = self.container(key) else {
                continue;
            };
            let orientation = container.orientation;
            let children = container.children.clone();
            let parent = self.nodes[key].neighbors;

            let count = children.len();
            for (idx, child) in children.into_iter().enumerate() {
                self.nodes[child].neighbors =
                    child_neighbors(parent, orientation, idx > 0, idx + 1 < count);
                stack.push(child);
            }
        }
    }
}
