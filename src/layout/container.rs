//! Row/column container tree implementation using SlotMap
//!
//! The tree arranges panes in nested rows and columns:
//! - Leaf nodes are panes, carrying an opaque content reference
//! - Container nodes sequence their children along one axis (row or column)
//! - Every node stores its size as fractions of its parent's content box, and four neighbor
//!   flags telling which of its edges face another pane
//!
//! Within a container, the children's main-axis fractions sum to 1 and every child spans the full
//! cross axis. The root is a container of size 1x1 with no neighbors.
//!
//! Each node lives in a slotmap and has exactly one parent key, and each key appears in exactly
//! one child list. Mutations go through the helpers at the bottom of this file so that child lists
//! and parent keys never disagree.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use anyhow::{bail, ensure, Context as _};
use quilt_ipc::{
    Direction, LayoutDescription, LayoutTreeNode, Neighbors, NodeKind, Orientation, Point, Rect,
    Size,
};
use slotmap::{new_key_type, SlotMap};

use super::neighbors::child_neighbors;
use super::{IdSource, Options, SequentialIds};

// ============================================================================
// SlotMap Key Types
// ============================================================================

new_key_type! {
    /// Key to reference a node in the layout tree
    pub struct NodeKey;
}

/// Tolerance for comparing size fractions.
pub const SIZE_EPSILON: f64 = 1e-6;

// ============================================================================
// Node Types
// ============================================================================

/// A node stored in the slotmap.
#[derive(Debug)]
pub(super) struct Node {
    pub(super) id: String,
    /// Fractions of the parent's content box.
    pub(super) size: Size,
    pub(super) neighbors: Neighbors,
    pub(super) parent: Option<NodeKey>,
    pub(super) data: NodeData,
}

#[derive(Debug)]
pub(super) enum NodeData {
    Leaf(LeafData),
    Container(ContainerData),
}

#[derive(Debug, Default)]
pub(super) struct LeafData {
    pub(super) content: Option<String>,
}

#[derive(Debug)]
pub(super) struct ContainerData {
    pub(super) orientation: Orientation,
    /// Child node keys, in layout order.
    pub(super) children: Vec<NodeKey>,
    /// Drag owned by this container, if any.
    pub(super) drag: Option<DragSession>,
}

/// Ongoing drag of the boundary between a child and one of its siblings.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DragSession {
    pub(super) child: NodeKey,
    pub(super) direction: Direction,
    pub(super) last_pointer: Point,
}

/// Root of a pane layout.
#[derive(Debug)]
pub struct LayoutTree {
    pub(super) nodes: SlotMap<NodeKey, Node>,
    pub(super) ids: HashMap<String, NodeKey>,
    pub(super) root: NodeKey,
    /// Container holding the only active drag session.
    pub(super) drag_owner: Option<NodeKey>,
    /// Size of the viewport in logical pixels.
    pub(super) view_size: Size,
    pub(super) id_source: Box<dyn IdSource>,
    pub(super) options: Options,
}

/// Read-only view of a node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a LayoutTree,
    key: NodeKey,
}

/// Public view of the active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragInfo<'a> {
    /// Container that owns the session.
    pub owner: &'a str,
    /// Child whose edge is being dragged.
    pub child: &'a str,
    pub direction: Direction,
    pub last_pointer: Point,
}

// ============================================================================
// ContainerData Implementation
// ============================================================================

impl ContainerData {
    pub(super) fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            children: Vec::new(),
            drag: None,
        }
    }
}

impl Node {
    pub(super) fn is_leaf(&self) -> bool {
        matches!(self.data, NodeData::Leaf(_))
    }

    pub(super) fn container(&self) -> Option<&ContainerData> {
        match &self.data {
            NodeData::Container(container) => Some(container),
            NodeData::Leaf(_) => None,
        }
    }

    fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Leaf(_) => NodeKind::Leaf,
            NodeData::Container(_) => NodeKind::Container,
        }
    }
}

// ============================================================================
// LayoutTree Implementation
// ============================================================================

impl LayoutTree {
    /// Create a tree holding a single pane.
    pub fn new(view_size: Size, options: Options) -> Self {
        let reserved = HashSet::new();
        let mut tree = Self::empty(view_size, options, Box::new(SequentialIds::new()), &reserved);

        let pane_id = tree.fresh_id(NodeKind::Leaf, &reserved);
        let pane = tree.insert_node(
            pane_id,
            Size::FULL,
            NodeData::Leaf(LeafData::default()),
        );
        tree.set_children(tree.root, vec![pane]);
        tree.refresh_neighbors(tree.root);
        tree.check_invariants();
        tree
    }

    /// Load a layout description, normalizing every sibling group.
    pub fn from_description(
        desc: &LayoutDescription,
        view_size: Size,
        options: Options,
    ) -> anyhow::Result<Self> {
        Self::from_description_with_ids(desc, view_size, options, Box::new(SequentialIds::new()))
    }

    pub fn from_description_with_ids(
        desc: &LayoutDescription,
        view_size: Size,
        options: Options,
        id_source: Box<dyn IdSource>,
    ) -> anyhow::Result<Self> {
        let mut reserved = HashSet::new();
        collect_ids(desc, &mut reserved)?;

        let mut tree = Self::empty(view_size, options, id_source, &reserved);
        let orientation = desc.orientation.unwrap_or(tree.options.root_orientation);

        if desc.is_leaf() {
            // A bare pane: keep the empty root and put the pane inside it.
            let pane = tree.load_node(desc, orientation.flip(), Size::FULL, &reserved)?;
            tree.set_children(tree.root, vec![pane]);
        } else {
            if let Some(id) = &desc.id {
                tree.rename(tree.root, id.clone());
            }
            if let Some(container) = tree.container_mut(tree.root) {
                container.orientation = orientation;
            }
            let children = tree.load_children(desc, orientation, &reserved)?;
            tree.set_children(tree.root, children);
        }

        tree.refresh_neighbors(tree.root);
        tree.check_invariants();
        debug!(
            "loaded layout with {} panes and {} nodes",
            tree.leaf_count(),
            tree.nodes.len()
        );
        Ok(tree)
    }

    fn empty(
        view_size: Size,
        options: Options,
        id_source: Box<dyn IdSource>,
        reserved: &HashSet<String>,
    ) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            id: String::new(),
            size: Size::FULL,
            neighbors: Neighbors::NONE,
            parent: None,
            data: NodeData::Container(ContainerData::new(options.root_orientation)),
        });

        let mut tree = Self {
            nodes,
            ids: HashMap::new(),
            root,
            drag_owner: None,
            view_size,
            id_source,
            options,
        };
        let root_id = tree.fresh_id(NodeKind::Container, reserved);
        tree.rename(root, root_id);
        tree
    }

    fn load_children(
        &mut self,
        desc: &LayoutDescription,
        orientation: Orientation,
        reserved: &HashSet<String>,
    ) -> anyhow::Result<Vec<NodeKey>> {
        let mut total = 0.0_f64;
        for child in &desc.children {
            let main = match orientation {
                Orientation::Row => child.width,
                Orientation::Column => child.height,
            };
            ensure!(
                main.is_finite() && main > 0.,
                "{} of {} must be a positive number, got {main}",
                match orientation {
                    Orientation::Row => "width",
                    Orientation::Column => "height",
                },
                child.id.as_deref().unwrap_or("unnamed node"),
            );
            total += main;
        }
        ensure!(total.is_finite(), "sizes of a sibling group overflow");

        let mut keys = Vec::with_capacity(desc.children.len());
        for child in &desc.children {
            let main = match orientation {
                Orientation::Row => child.width,
                Orientation::Column => child.height,
            };
            let size = Size::from_axes(orientation, main / total, 1.);
            let key = self.load_node(child, orientation.flip(), size, reserved)?;
            keys.push(key);
        }
        Ok(keys)
    }

    fn load_node(
        &mut self,
        desc: &LayoutDescription,
        default_orientation: Orientation,
        size: Size,
        reserved: &HashSet<String>,
    ) -> anyhow::Result<NodeKey> {
        let kind = if desc.is_leaf() {
            NodeKind::Leaf
        } else {
            NodeKind::Container
        };
        let id = match &desc.id {
            Some(id) => id.clone(),
            None => self.fresh_id(kind, reserved),
        };

        if desc.is_leaf() {
            let data = NodeData::Leaf(LeafData {
                content: desc.content.clone(),
            });
            return Ok(self.insert_node(id, size, data));
        }

        let orientation = desc.orientation.unwrap_or(default_orientation);
        let data = NodeData::Container(ContainerData::new(orientation));
        let key = self.insert_node(id, size, data);
        let children = self
            .load_children(desc, orientation, reserved)
            .with_context(|| format!("error loading children of {}", self.nodes[key].id))?;
        self.set_children(key, children);
        Ok(key)
    }

    // ========================================================================
    // Public queries
    // ========================================================================

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn set_view_size(&mut self, view_size: Size) {
        self.view_size = view_size;
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            key: self.root,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.nodes[self.root].id
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<NodeRef<'_>> {
        let key = *self.ids.get(id)?;
        Some(NodeRef { tree: self, key })
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        let parent = self.nodes[self.key_of(id)?].parent?;
        Some(&self.nodes[parent].id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Pane ids in depth-first, layout order.
    pub fn leaf_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            match &node.data {
                NodeData::Leaf(_) => out.push(node.id.as_str()),
                NodeData::Container(container) => {
                    stack.extend(container.children.iter().rev().copied());
                }
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|node| node.is_leaf()).count()
    }

    /// Total number of nodes, containers included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Size of a node in logical pixels.
    pub fn extent_of(&self, id: &str) -> Option<Size> {
        let key = self.key_of(id)?;
        Some(self.extent(key))
    }

    /// Absolute rectangles of every pane, in layout order.
    ///
    /// The last child of each container takes whatever remains so that rounding never leaves a
    /// gap at the far edge.
    pub fn leaf_rects(&self) -> Vec<(String, Rect)> {
        let mut out = Vec::new();
        let area = Rect {
            x: 0.,
            y: 0.,
            width: self.view_size.width,
            height: self.view_size.height,
        };
        self.collect_rects(self.root, area, &mut out);
        out
    }

    fn collect_rects(&self, key: NodeKey, area: Rect, out: &mut Vec<(String, Rect)>) {
        let node = &self.nodes[key];
        let container = match &node.data {
            NodeData::Leaf(_) => {
                out.push((node.id.clone(), area));
                return;
            }
            NodeData::Container(container) => container,
        };

        let orientation = container.orientation;
        let total = match orientation {
            Orientation::Row => area.width,
            Orientation::Column => area.height,
        };
        let mut used = 0.0_f64;
        let count = container.children.len();

        for (idx, &child_key) in container.children.iter().enumerate() {
            let fraction = self.nodes[child_key].size.main(orientation);
            let span = if idx + 1 == count {
                (total - used).max(0.)
            } else {
                (total * fraction).max(0.)
            };

            let child_area = match orientation {
                Orientation::Row => Rect {
                    x: area.x + used,
                    y: area.y,
                    width: span,
                    height: area.height,
                },
                Orientation::Column => Rect {
                    x: area.x,
                    y: area.y + used,
                    width: area.width,
                    height: span,
                },
            };
            used += span;
            self.collect_rects(child_key, child_area, out);
        }
    }

    /// Serializable snapshot of the whole tree.
    pub fn snapshot(&self) -> LayoutTreeNode {
        self.snapshot_node(self.root)
    }

    fn snapshot_node(&self, key: NodeKey) -> LayoutTreeNode {
        let node = &self.nodes[key];
        let (orientation, content, children) = match &node.data {
            NodeData::Leaf(leaf) => (None, leaf.content.clone(), Vec::new()),
            NodeData::Container(container) => (
                Some(container.orientation),
                None,
                container
                    .children
                    .iter()
                    .map(|&child| self.snapshot_node(child))
                    .collect(),
            ),
        };

        LayoutTreeNode {
            id: node.id.clone(),
            kind: node.kind(),
            orientation,
            size: node.size,
            neighbors: node.neighbors,
            content,
            children,
        }
    }

    /// The active drag, if any.
    pub fn drag_session(&self) -> Option<DragInfo<'_>> {
        let owner = self.drag_owner?;
        let node = self.nodes.get(owner)?;
        let session = node.container()?.drag.as_ref()?;
        Some(DragInfo {
            owner: &node.id,
            child: &self.nodes.get(session.child)?.id,
            direction: session.direction,
            last_pointer: session.last_pointer,
        })
    }

    /// Whether the node or one of its ancestors owns the active drag.
    ///
    /// Hover controls inside such a subtree should stay put until the drag ends.
    pub fn is_dragging(&self, id: &str) -> bool {
        let Some(owner) = self.drag_owner else {
            return false;
        };
        let Some(mut key) = self.key_of(id) else {
            return false;
        };
        loop {
            if key == owner {
                return true;
            }
            match self.nodes[key].parent {
                Some(parent) => key = parent,
                None => return false,
            }
        }
    }

    /// Directions in which a node offers controls.
    pub fn offered_edges(&self, id: &str) -> Vec<Direction> {
        self.node(id)
            .map(|node| node.neighbors().edges().collect())
            .unwrap_or_default()
    }

    /// Text dump of the tree, one node per line.
    ///
    /// Each line shows the kind (`pane`, `row` or `column`), the id, the size fractions and the
    /// neighbor flags in top, bottom, left, right order.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        self.debug_tree_node(self.root, 0, &mut out);
        out
    }

    fn debug_tree_node(&self, key: NodeKey, depth: usize, out: &mut String) {
        let node = &self.nodes[key];
        let indent = "  ".repeat(depth);
        let flags: String = [
            (Direction::Top, 'T'),
            (Direction::Bottom, 'B'),
            (Direction::Left, 'L'),
            (Direction::Right, 'R'),
        ]
        .into_iter()
        .map(|(dir, c)| if node.neighbors.get(dir) { c } else { '-' })
        .collect();
        let label = match &node.data {
            NodeData::Leaf(_) => "pane",
            NodeData::Container(container) => container.orientation.name(),
        };

        let _ = write!(
            out,
            "{indent}{label} {} {:.3}x{:.3} {flags}",
            node.id, node.size.width, node.size.height
        );
        if let Some(session) = node.container().and_then(|c| c.drag.as_ref()) {
            let child = self
                .nodes
                .get(session.child)
                .map_or("(missing)", |child| child.id.as_str());
            let _ = write!(out, " dragging {child} {}", session.direction);
        }
        out.push('\n');

        if let NodeData::Container(container) = &node.data {
            for &child in &container.children {
                self.debug_tree_node(child, depth + 1, out);
            }
        }
    }

    /// Panics if any tree invariant is broken.
    pub fn verify_invariants(&self) {
        let root = &self.nodes[self.root];
        assert!(root.parent.is_none(), "root must not have a parent");
        assert!(!root.is_leaf(), "root must be a container");
        assert_eq!(root.neighbors, Neighbors::NONE, "root must not have neighbors");
        assert!(
            (root.size.width - 1.).abs() <= SIZE_EPSILON
                && (root.size.height - 1.).abs() <= SIZE_EPSILON,
            "root must fill the view, got {:?}",
            root.size
        );

        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            assert!(seen.insert(key), "node reachable twice");
            let node = &self.nodes[key];
            assert_eq!(self.ids.get(&node.id), Some(&key), "id index out of date");

            let Some(container) = node.container() else {
                continue;
            };
            assert!(
                !container.children.is_empty(),
                "container {} must have children",
                node.id
            );
            if container.drag.is_some() {
                assert_eq!(self.drag_owner, Some(key), "drag owned by unexpected container");
            }

            let orientation = container.orientation;
            let count = container.children.len();
            let mut sum = 0.0_f64;
            for (idx, &child_key) in container.children.iter().enumerate() {
                let child = &self.nodes[child_key];
                assert_eq!(child.parent, Some(key), "parent key of {} out of date", child.id);

                let main = child.size.main(orientation);
                let cross = child.size.cross(orientation);
                assert!(
                    main.is_finite() && main >= 0.,
                    "{} has invalid size {:?}",
                    child.id,
                    child.size
                );
                assert!(
                    (cross - 1.).abs() <= SIZE_EPSILON,
                    "{} must fill the cross axis of {}, got {:?}",
                    child.id,
                    node.id,
                    child.size
                );
                sum += main;

                let expected = child_neighbors(node.neighbors, orientation, idx > 0, idx + 1 < count);
                assert_eq!(
                    child.neighbors, expected,
                    "neighbors of {} out of date",
                    child.id
                );

                stack.push(child_key);
            }
            assert!(
                (sum - 1.).abs() <= SIZE_EPSILON,
                "children of {} must sum to 1, got {sum}",
                node.id
            );
        }

        assert_eq!(seen.len(), self.nodes.len(), "unreachable nodes in the slotmap");
        assert_eq!(self.ids.len(), self.nodes.len(), "stale ids in the index");

        if let Some(owner) = self.drag_owner {
            let session = self.nodes.get(owner).and_then(|node| node.container());
            assert!(
                session.is_some_and(|c| c.drag.is_some()),
                "drag owner must hold a session"
            );
        }
    }

    /// Runs [`Self::verify_invariants`] in debug builds, or when configured to.
    pub(super) fn check_invariants(&self) {
        if self.options.verify_invariants {
            self.verify_invariants();
        }
    }

    // ========================================================================
    // Internal SlotMap helpers
    // ========================================================================

    pub(super) fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.ids.get(id).copied()
    }

    pub(super) fn container(&self, key: NodeKey) -> Option<&ContainerData> {
        self.nodes.get(key)?.container()
    }

    pub(super) fn container_mut(&mut self, key: NodeKey) -> Option<&mut ContainerData> {
        match &mut self.nodes.get_mut(key)?.data {
            NodeData::Container(container) => Some(container),
            NodeData::Leaf(_) => None,
        }
    }

    pub(super) fn children(&self, key: NodeKey) -> &[NodeKey] {
        match self.container(key) {
            Some(container) => &container.children,
            None => &[],
        }
    }

    /// Index of `child` within `parent`.
    pub(super) fn position(&self, parent: NodeKey, child: NodeKey) -> Option<usize> {
        self.children(parent).iter().position(|&key| key == child)
    }

    /// Insert a detached node and register its id.
    pub(super) fn insert_node(&mut self, id: String, size: Size, data: NodeData) -> NodeKey {
        let key = self.nodes.insert(Node {
            id: id.clone(),
            size,
            neighbors: Neighbors::NONE,
            parent: None,
            data,
        });
        self.ids.insert(id, key);
        key
    }

    /// Remove a single node, leaving its children alone.
    pub(super) fn remove_node(&mut self, key: NodeKey) -> Option<Node> {
        let node = self.nodes.remove(key)?;
        if self.ids.get(&node.id) == Some(&key) {
            self.ids.remove(&node.id);
        }
        if self.drag_owner == Some(key) {
            self.drag_owner = None;
        }
        Some(node)
    }

    fn rename(&mut self, key: NodeKey, id: String) {
        let old = std::mem::replace(&mut self.nodes[key].id, id.clone());
        if self.ids.get(&old) == Some(&key) {
            self.ids.remove(&old);
        }
        self.ids.insert(id, key);
    }

    /// Replace the whole child sequence of `parent`.
    pub(super) fn set_children(&mut self, parent: NodeKey, children: Vec<NodeKey>) {
        for &child in &children {
            self.nodes[child].parent = Some(parent);
        }
        if let Some(container) = self.container_mut(parent) {
            container.children = children;
        }
    }

    /// Replace `count` children of `parent` starting at `idx` with `replacement`.
    pub(super) fn splice_children(
        &mut self,
        parent: NodeKey,
        idx: usize,
        count: usize,
        replacement: Vec<NodeKey>,
    ) {
        for &child in &replacement {
            self.nodes[child].parent = Some(parent);
        }
        if let Some(container) = self.container_mut(parent) {
            let end = (idx + count).min(container.children.len());
            container.children.splice(idx..end, replacement);
        }
    }

    /// Size of a node in logical pixels.
    pub(super) fn extent(&self, key: NodeKey) -> Size {
        let mut size = self.view_size;
        let mut current = Some(key);
        while let Some(key) = current {
            let node = &self.nodes[key];
            size.width *= node.size.width;
            size.height *= node.size.height;
            current = node.parent;
        }
        size
    }

    /// Allocate an id that is neither in the tree nor in `reserved`.
    pub(super) fn fresh_id(&mut self, kind: NodeKind, reserved: &HashSet<String>) -> String {
        loop {
            let id = self.id_source.next_id(kind);
            if !self.ids.contains_key(&id) && !reserved.contains(&id) {
                return id;
            }
        }
    }
}

// ============================================================================
// NodeRef Implementation
// ============================================================================

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a Node {
        &self.tree.nodes[self.key]
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn id(&self) -> &'a str {
        &self.node().id
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    pub fn size(&self) -> Size {
        self.node().size
    }

    pub fn neighbors(&self) -> Neighbors {
        self.node().neighbors
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.node().container().map(|c| c.orientation)
    }

    pub fn content(&self) -> Option<&'a str> {
        match &self.node().data {
            NodeData::Leaf(leaf) => leaf.content.as_deref(),
            NodeData::Container(_) => None,
        }
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let key = self.node().parent?;
        Some(NodeRef {
            tree: self.tree,
            key,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.key)
            .iter()
            .map(move |&key| NodeRef { tree, key })
    }

    pub fn child_count(&self) -> usize {
        self.tree.children(self.key).len()
    }
}

// ============================================================================
// Loading helpers
// ============================================================================

fn collect_ids(desc: &LayoutDescription, ids: &mut HashSet<String>) -> anyhow::Result<()> {
    if let Some(id) = &desc.id {
        if id.is_empty() {
            bail!("node ids must not be empty");
        }
        if !ids.insert(id.clone()) {
            bail!("duplicate node id {id:?}");
        }
    }
    for child in &desc.children {
        collect_ids(child, ids)?;
    }
    Ok(())
}
