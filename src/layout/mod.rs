//! Pane layout engine.
//!
//! A layout is a tree of nested rows and columns with panes at the leaves, see [`LayoutTree`].
//! Three operations change it:
//!
//! - [`LayoutTree::resize`] starts a drag of the boundary between two siblings, which
//!   [`LayoutTree::pointer_move`] then moves and [`LayoutTree::end_resize`] releases;
//! - [`LayoutTree::insert`] splits a pane in half;
//! - [`LayoutTree::delete`] closes a pane and collapses containers left with a single child.
//!
//! Requests that a container cannot serve, such as dragging the outer edge of its first child,
//! travel up the tree until a container can serve them or the root ignores them.

use std::fmt;

use quilt_config::{Config, RootOrientation};
use quilt_ipc::{Action, NodeKind, Orientation};

mod container;
mod insert;
mod neighbors;
mod remove;
mod resize;


pub use container::{DragInfo, LayoutTree, NodeKey, NodeRef, SIZE_EPSILON};
pub use neighbors::child_neighbors;
pub use remove::DeleteOutcome;
pub use resize::ResizeOutcome;

/// Engine options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Smallest fraction of its container a drag may leave a pane with.
    pub min_pane_size: f64,
    /// Orientation of the root when a loaded layout doesn't say.
    pub root_orientation: Orientation,
    /// Check tree invariants after every mutation.
    pub verify_invariants: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        let root_orientation = match config.layout.root_orientation {
            RootOrientation::Row => Orientation::Row,
            RootOrientation::Column => Orientation::Column,
        };

        Self {
            min_pane_size: config.layout.min_pane_size.0,
            root_orientation,
            verify_invariants: cfg!(debug_assertions) || config.debug.verify_invariants,
        }
    }
}

/// Source of ids for nodes the engine creates.
///
/// Returned ids that are already taken are skipped, so a source only needs to avoid repeating
/// itself.
pub trait IdSource: fmt::Debug {
    fn next_id(&mut self, kind: NodeKind) -> String;
}

/// Generates `pane-1`, `split-2`, `pane-3` and so on.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self, kind: NodeKind) -> String {
        self.counter += 1;
        let prefix = match kind {
            NodeKind::Leaf => "pane",
            NodeKind::Container => "split",
        };
        format!("{prefix}-{}", self.counter)
    }
}

/// What replaying an [`Action`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Resize(Option<ResizeOutcome>),
    /// Whether a drag consumed the sample.
    PointerMove(bool),
    /// Whether a drag was active.
    EndResize(bool),
    /// Id of the new pane.
    Insert(Option<String>),
    Delete(Option<DeleteOutcome>),
}

impl LayoutTree {
    pub fn apply(&mut self, action: &Action) -> ActionResult {
        match action {
            Action::Resize {
                id,
                direction,
                origin,
            } => ActionResult::Resize(self.resize(id, *direction, *origin)),
            Action::PointerMove { position } => {
                ActionResult::PointerMove(self.pointer_move(*position))
            }
            Action::EndResize => ActionResult::EndResize(self.end_resize()),
            Action::Insert { id, direction } => ActionResult::Insert(self.insert(id, *direction)),
            Action::Delete { id, direction } => ActionResult::Delete(self.delete(id, *direction)),
        }
    }
}

impl ActionResult {
    /// Whether the action changed anything.
    pub fn is_effective(&self) -> bool {
        match self {
            ActionResult::Resize(outcome) => {
                matches!(outcome, Some(ResizeOutcome::Started { .. }))
            }
            ActionResult::PointerMove(moved) => *moved,
            ActionResult::EndResize(ended) => *ended,
            ActionResult::Insert(id) => id.is_some(),
            ActionResult::Delete(outcome) => {
                matches!(outcome, Some(DeleteOutcome::Removed { .. }))
            }
        }
    }
}
