//! Types for exchanging layouts with the quilt pane engine.
//!
//! Everything here is plain data: the engine in the `quilt` crate consumes a
//! [`LayoutDescription`] on load, accepts [`Action`]s from whatever drives it (a pointer layer, a
//! script, a test), and hands back [`LayoutTreeNode`] snapshots for rendering.
//!
//! All types serialize with serde. Directions and orientations use their lowercase names on the
//! wire, and anything else is rejected rather than defaulted.

use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Edge of a pane, and the direction an operation acts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

/// Axis along which a container sequences its children.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Orientation {
    /// Children laid out left to right; the main axis is the width.
    #[default]
    Row,
    /// Children laid out top to bottom; the main axis is the height.
    Column,
}

/// Pointer position in logical pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Width and height, either as fractions of a parent or in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Absolute rectangle in logical pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-edge adjacency flags.
///
/// A set flag means another pane is reachable across that edge, so resize, insert and delete
/// controls make sense there. A cleared flag means the edge lies on the outer boundary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbors {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

/// Input layout, loaded once and normalized before it becomes live.
///
/// A node without children is a pane. Sizes only need to be proportional within a sibling
/// group; they are divided by their sum on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "full_fraction")]
    pub width: f64,
    #[serde(default = "full_fraction")]
    pub height: f64,
    /// Defaults to the opposite of the parent's orientation (row at the root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Opaque reference to whatever the pane displays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutDescription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Leaf,
    Container,
}

/// Snapshot of one node of a live layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTreeNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub size: Size,
    pub neighbors: Neighbors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutTreeNode>,
}

/// Operation issued against a live layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Start dragging the `direction` edge of a node.
    Resize {
        id: String,
        direction: Direction,
        origin: Point,
    },
    /// Feed a pointer sample to the active drag.
    PointerMove { position: Point },
    /// Release the active drag.
    EndResize,
    /// Split a pane, placing the new pane towards `direction`.
    Insert { id: String, direction: Direction },
    /// Close a pane; the neighbor towards `direction` absorbs its space when there is one.
    Delete { id: String, direction: Direction },
}

fn full_fraction() -> f64 {
    1.
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }

    /// Whether the direction points towards the start of its axis (top or left).
    pub fn is_negative(self) -> bool {
        matches!(self, Direction::Top | Direction::Left)
    }

    /// Container orientation whose main axis this direction moves along.
    pub fn axis(self) -> Orientation {
        if self.is_vertical() {
            Orientation::Column
        } else {
            Orientation::Row
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(r#"invalid direction, can be "top", "bottom", "left" or "right""#),
        }
    }
}

impl Orientation {
    pub fn flip(self) -> Self {
        match self {
            Orientation::Row => Orientation::Column,
            Orientation::Column => Orientation::Row,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Row => "row",
            Orientation::Column => "column",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Orientation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "row" => Ok(Orientation::Row),
            "column" => Ok(Orientation::Column),
            _ => Err(r#"invalid orientation, can be "row" or "column""#),
        }
    }
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Size {
    /// Fills the parent on both axes.
    pub const FULL: Size = Size::new(1., 1.);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size along the main axis of a container with the given orientation.
    pub fn main(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Row => self.width,
            Orientation::Column => self.height,
        }
    }

    pub fn cross(self, orientation: Orientation) -> f64 {
        self.main(orientation.flip())
    }

    pub fn main_mut(&mut self, orientation: Orientation) -> &mut f64 {
        match orientation {
            Orientation::Row => &mut self.width,
            Orientation::Column => &mut self.height,
        }
    }

    /// Size with `main` on the main axis and `cross` on the other one.
    pub fn from_axes(orientation: Orientation, main: f64, cross: f64) -> Self {
        match orientation {
            Orientation::Row => Size::new(main, cross),
            Orientation::Column => Size::new(cross, main),
        }
    }
}

impl Neighbors {
    pub const NONE: Neighbors = Neighbors {
        top: false,
        bottom: false,
        left: false,
        right: false,
    };

    pub fn get(self, direction: Direction) -> bool {
        match direction {
            Direction::Top => self.top,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn set(&mut self, direction: Direction, value: bool) {
        match direction {
            Direction::Top => self.top = value,
            Direction::Bottom => self.bottom = value,
            Direction::Left => self.left = value,
            Direction::Right => self.right = value,
        }
    }

    pub fn with(mut self, direction: Direction, value: bool) -> Self {
        self.set(direction, value);
        self
    }

    /// Edges with a neighbor, in `Direction::ALL` order.
    pub fn edges(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.get(*d))
    }
}

impl LayoutDescription {
    pub fn leaf(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: Some(id.into()),
            width,
            height,
            orientation: None,
            content: None,
            children: Vec::new(),
        }
    }

    pub fn container(
        id: impl Into<String>,
        width: f64,
        height: f64,
        children: Vec<LayoutDescription>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            width,
            height,
            orientation: None,
            content: None,
            children,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<&LayoutTreeNode> for LayoutDescription {
    fn from(node: &LayoutTreeNode) -> Self {
        Self {
            id: Some(node.id.clone()),
            width: node.size.width,
            height: node.size.height,
            orientation: node.orientation,
            content: node.content.clone(),
            children: node.children.iter().map(LayoutDescription::from).collect(),
        }
    }
}

impl LayoutTreeNode {
    /// Number of panes in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self.kind {
            NodeKind::Leaf => 1,
            NodeKind::Container => self.children.iter().map(|c| c.leaf_count()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_direction() {
        assert_eq!("top".parse::<Direction>(), Ok(Direction::Top));
        assert_eq!("right".parse::<Direction>(), Ok(Direction::Right));
        assert!("up".parse::<Direction>().is_err());
        assert!("Top".parse::<Direction>().is_err());
        assert!("".parse::<Direction>().is_err());
    }

    #[test]
    fn unknown_direction_is_rejected_by_serde() {
        let json = r#"{ "action": "insert", "id": "a", "direction": "diagonal" }"#;
        assert!(serde_json::from_str::<Action>(json).is_err());
    }

    #[test]
    fn direction_axis() {
        assert_eq!(Direction::Left.axis(), Orientation::Row);
        assert_eq!(Direction::Bottom.axis(), Orientation::Column);
        assert!(Direction::Top.is_negative());
        assert!(!Direction::Right.is_negative());
        assert_eq!(Direction::Top.opposite(), Direction::Bottom);
    }

    #[test]
    fn size_axes() {
        let size = Size::new(0.25, 1.);
        assert_eq!(size.main(Orientation::Row), 0.25);
        assert_eq!(size.cross(Orientation::Row), 1.);
        assert_eq!(Size::from_axes(Orientation::Column, 0.5, 1.), Size::new(1., 0.5));
    }

    #[test]
    fn neighbor_edges() {
        let neighbors = Neighbors::NONE
            .with(Direction::Left, true)
            .with(Direction::Bottom, true);
        assert_eq!(
            neighbors.edges().collect::<Vec<_>>(),
            vec![Direction::Bottom, Direction::Left]
        );
    }

    #[test]
    fn parse_description_defaults() {
        let json = r#"{
            "children": [
                { "id": "a", "width": 1 },
                { "id": "b", "width": 3, "children": [
                    { "id": "c", "height": 2 },
                    { "id": "d", "content": "editor" }
                ] }
            ]
        }"#;
        let desc: LayoutDescription = serde_json::from_str(json).unwrap();
        assert_eq!(desc.id, None);
        assert_eq!(desc.width, 1.);
        assert_eq!(desc.children.len(), 2);
        assert!(desc.children[0].is_leaf());
        assert_eq!(desc.children[0].height, 1.);
        assert_eq!(desc.children[1].width, 3.);
        assert_eq!(desc.children[1].children[1].content.as_deref(), Some("editor"));
    }

    #[test]
    fn parse_actions() {
        let json = r#"[
            { "action": "resize", "id": "a", "direction": "right", "origin": { "x": 10, "y": 5 } },
            { "action": "pointer-move", "position": { "x": 20, "y": 5 } },
            { "action": "end-resize" },
            { "action": "delete", "id": "b", "direction": "left" }
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(json).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Resize {
                    id: String::from("a"),
                    direction: Direction::Right,
                    origin: Point::new(10., 5.),
                },
                Action::PointerMove {
                    position: Point::new(20., 5.),
                },
                Action::EndResize,
                Action::Delete {
                    id: String::from("b"),
                    direction: Direction::Left,
                },
            ]
        );
    }

    #[test]
    fn snapshot_converts_back_to_description() {
        let node = LayoutTreeNode {
            id: String::from("root"),
            kind: NodeKind::Container,
            orientation: Some(Orientation::Row),
            size: Size::FULL,
            neighbors: Neighbors::NONE,
            content: None,
            children: vec![LayoutTreeNode {
                id: String::from("a"),
                kind: NodeKind::Leaf,
                orientation: None,
                size: Size::FULL,
                neighbors: Neighbors::NONE,
                content: Some(String::from("term")),
                children: Vec::new(),
            }],
        };

        let desc = LayoutDescription::from(&node);
        assert_eq!(desc.orientation, Some(Orientation::Row));
        assert_eq!(desc.children[0].id.as_deref(), Some("a"));
        assert_eq!(desc.children[0].content.as_deref(), Some("term"));
        assert_eq!(node.leaf_count(), 1);
    }
}
