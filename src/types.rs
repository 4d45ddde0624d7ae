//! Core data types for the diagram editor.
//!
//! This module defines the scene graph: shape nodes with their kinds and text
//! bodies, routed arrows, and the [`Scene`] arena that owns both. Nodes and
//! arrows reference each other only through id handles; all lifetime
//! management lives in the `Scene`.

use crate::constants;
use crate::geometry::{Point, Rect, Size};
use crate::routing;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Unique identifier for shape nodes.
pub type NodeId = Uuid;

/// Unique identifier for arrows.
pub type ArrowId = Uuid;

/// The closed set of node kinds, each with its fixed body layout.
///
/// A plain node carries only a title; an interface node adds a methods body;
/// a class node adds a properties body and a methods body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Title-only node.
    Plain,
    /// Interface-like node with a single methods body.
    Interface {
        /// Method signatures, one per line.
        methods: String,
    },
    /// Class-like node with a properties body and a methods body.
    Class {
        /// Property declarations, one per line.
        properties: String,
        /// Method signatures, one per line.
        methods: String,
    },
}

/// Logical sub-region of a node, used for hit-testing and text editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRegion {
    /// The title field at the top of the node.
    Title,
    /// The properties body (class nodes only).
    Properties,
    /// The methods body (interface and class nodes).
    Methods,
    /// Anywhere else inside the node's bounds.
    Frame,
}

/// Snapshot of every editable text field on a node.
///
/// The optional fields are present exactly when the node's kind carries the
/// corresponding body, so an edit command captures only what can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeText {
    /// The title text.
    pub title: String,
    /// Properties body text, if the node is a class.
    pub properties: Option<String>,
    /// Methods body text, if the node is a class or interface.
    pub methods: Option<String>,
}

/// A positioned, resizable rectangular diagram node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeNode {
    /// Stable identity, distinct from position.
    pub id: NodeId,
    /// Top-left corner in logical space.
    pub position: Point,
    /// Current extent; never smaller than the configured minimums.
    pub size: Size,
    /// Title text shown at the top of the node.
    pub title: String,
    /// Kind tag carrying any text bodies.
    pub kind: NodeKind,
    /// Handles of arrows attached to this node. Derived; rebuilt on load.
    #[serde(skip)]
    pub attached: HashSet<ArrowId>,
}

impl ShapeNode {
    /// Creates a node of the given kind at a position, with default title,
    /// empty bodies, and minimum size.
    pub fn new(kind: NodeKind, position: Point) -> Self {
        let mut node = Self {
            id: Uuid::new_v4(),
            position,
            size: Size::new(constants::MIN_NODE_WIDTH, constants::MIN_NODE_HEIGHT),
            title: constants::DEFAULT_NODE_TITLE.to_string(),
            kind,
            attached: HashSet::new(),
        };
        node.resize_to_fit();
        node
    }

    /// The node's bounding rectangle in logical space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// The four arrow mount points on the node's boundary.
    pub fn mount_points(&self) -> [Point; 4] {
        self.rect().mount_points()
    }

    /// Copies out the node's editable text fields.
    pub fn text(&self) -> NodeText {
        let (properties, methods) = match &self.kind {
            NodeKind::Plain => (None, None),
            NodeKind::Interface { methods } => (None, Some(methods.clone())),
            NodeKind::Class {
                properties,
                methods,
            } => (Some(properties.clone()), Some(methods.clone())),
        };
        NodeText {
            title: self.title.clone(),
            properties,
            methods,
        }
    }

    /// Applies a text snapshot, ignoring fields the node's kind doesn't have,
    /// then resizes the node to fit.
    pub fn apply_text(&mut self, text: &NodeText) {
        self.title = text.title.clone();
        match &mut self.kind {
            NodeKind::Plain => {}
            NodeKind::Interface { methods } => {
                if let Some(new_methods) = &text.methods {
                    *methods = new_methods.clone();
                }
            }
            NodeKind::Class {
                properties,
                methods,
            } => {
                if let Some(new_properties) = &text.properties {
                    *properties = new_properties.clone();
                }
                if let Some(new_methods) = &text.methods {
                    *methods = new_methods.clone();
                }
            }
        }
        self.resize_to_fit();
    }

    /// Grows or shrinks the node to its preferred text size, floored at the
    /// minimum dimensions.
    ///
    /// Uses fixed average character metrics so the invariant holds without a
    /// font system; the painter lays out real text independently.
    pub fn resize_to_fit(&mut self) {
        let mut width = text_width(&self.title);
        let mut height = constants::LINE_HEIGHT;
        for body in self.body_texts() {
            width = width.max(text_width(body));
            height += block_height(body);
        }

        self.size = Size::new(
            (width + 2.0 * constants::TEXT_PADDING_X).max(constants::MIN_NODE_WIDTH),
            (height + 2.0 * constants::TEXT_PADDING_Y).max(constants::MIN_NODE_HEIGHT),
        );
    }

    /// The text bodies below the title, in top-to-bottom order.
    pub fn body_texts(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::Plain => vec![],
            NodeKind::Interface { methods } => vec![methods.as_str()],
            NodeKind::Class {
                properties,
                methods,
            } => vec![properties.as_str(), methods.as_str()],
        }
    }

    /// Resolves which sub-region of the node a node-local point falls in.
    ///
    /// The title occupies a fixed-height band at the top; the remaining
    /// height is split between the bodies (equally for a class node).
    pub fn region_at(&self, local: Point) -> NodeRegion {
        let title_height = constants::LINE_HEIGHT + constants::TEXT_PADDING_Y;
        if local.y < title_height {
            return NodeRegion::Title;
        }
        match &self.kind {
            NodeKind::Plain => NodeRegion::Frame,
            NodeKind::Interface { .. } => NodeRegion::Methods,
            NodeKind::Class { .. } => {
                let body_height = self.size.height - title_height;
                if local.y < title_height + body_height / 2.0 {
                    NodeRegion::Properties
                } else {
                    NodeRegion::Methods
                }
            }
        }
    }
}

fn text_width(text: &str) -> f64 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    longest as f64 * constants::CHAR_WIDTH
}

fn block_height(text: &str) -> f64 {
    let lines = text.lines().count().max(1);
    lines as f64 * constants::LINE_HEIGHT
}

/// Line style of an arrow shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrokeStyle {
    /// Continuous line.
    Solid,
    /// Dashed line.
    Dashed,
}

/// End-cap glyph drawn at an arrow's destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCapStyle {
    /// No glyph.
    None,
    /// Two-stroke open arrowhead.
    OpenArrow,
    /// Closed, unfilled triangle (inheritance / implementation).
    Triangle,
    /// Filled diamond (composition).
    FilledDiamond,
    /// Unfilled diamond (aggregation).
    OutlineDiamond,
}

/// A routed connector between two shape nodes.
///
/// `start` and `end` are id handles into the owning [`Scene`]; the route is
/// a derived cache recomputed whenever either endpoint moves or resizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    /// Unique identifier for this arrow.
    pub id: ArrowId,
    /// Source node handle.
    pub start: NodeId,
    /// Destination node handle.
    pub end: NodeId,
    /// Shaft line style.
    pub stroke: StrokeStyle,
    /// Destination end-cap glyph.
    pub cap: EndCapStyle,
    /// Orthogonal route from start mount to end mount. Derived; rebuilt on
    /// load and on endpoint geometry changes.
    #[serde(skip)]
    pub route: Vec<Point>,
}

impl Arrow {
    /// Creates an unrouted arrow between two nodes.
    pub fn new(start: NodeId, end: NodeId, stroke: StrokeStyle, cap: EndCapStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            stroke,
            cap,
            route: Vec::new(),
        }
    }

    /// Whether the given logical point lies on the arrow's route, within the
    /// standard hit threshold.
    pub fn hit_test(&self, point: Point) -> bool {
        routing::route_contains(&self.route, point, constants::ARROW_HIT_THRESHOLD)
    }

    /// Bounding box of the current route.
    pub fn bounds(&self) -> Rect {
        Rect::bounding(&self.route)
    }
}

/// The scene graph: an arena owning every node and arrow on the canvas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// All nodes, indexed by id.
    pub nodes: HashMap<NodeId, ShapeNode>,
    /// All arrows, indexed by id.
    pub arrows: HashMap<ArrowId, Arrow>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes the scene to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a scene from JSON, rebuilding derived routes and
    /// attachment sets.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.rebuild_derived();
        Ok(scene)
    }

    /// Inserts a node, returning its id.
    pub fn add_node(&mut self, node: ShapeNode) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Removes a node together with every arrow attached to it.
    ///
    /// Returns the node (with its attachment set cleared) and the removed
    /// arrows so the caller can capture them for undo. Dangling arrows are an
    /// invariant violation, so the arrows always travel with the node.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<(ShapeNode, Vec<Arrow>)> {
        let mut node = self.nodes.remove(&node_id)?;
        let mut removed_arrows = Vec::new();
        let attached: Vec<ArrowId> = node.attached.drain().collect();
        for arrow_id in attached {
            if let Some(arrow) = self.remove_arrow(arrow_id) {
                removed_arrows.push(arrow);
            }
        }
        Some((node, removed_arrows))
    }

    /// Creates and routes a new arrow between two nodes.
    ///
    /// Silently rejects self-arrows, arrows with a missing endpoint, and
    /// duplicates of the same ordered `(start, end)` pair, returning `None`;
    /// the user gesture that caused them is harmless to ignore.
    pub fn add_arrow(
        &mut self,
        start: NodeId,
        end: NodeId,
        stroke: StrokeStyle,
        cap: EndCapStyle,
    ) -> Option<ArrowId> {
        if start == end
            || !self.nodes.contains_key(&start)
            || !self.nodes.contains_key(&end)
            || self.has_arrow_between(start, end)
        {
            return None;
        }
        let arrow = Arrow::new(start, end, stroke, cap);
        Some(self.insert_arrow(arrow))
    }

    /// Re-inserts a previously removed arrow, attaching it to both endpoints
    /// and recomputing its route. Used by undo/redo.
    pub fn insert_arrow(&mut self, mut arrow: Arrow) -> ArrowId {
        let id = arrow.id;
        if let (Some(start), Some(end)) = (self.nodes.get(&arrow.start), self.nodes.get(&arrow.end))
        {
            arrow.route = routing::compute_route(start.rect(), end.rect());
        }
        if let Some(node) = self.nodes.get_mut(&arrow.start) {
            node.attached.insert(id);
        }
        if let Some(node) = self.nodes.get_mut(&arrow.end) {
            node.attached.insert(id);
        }
        self.arrows.insert(id, arrow);
        id
    }

    /// Removes an arrow, detaching it from both endpoints.
    pub fn remove_arrow(&mut self, arrow_id: ArrowId) -> Option<Arrow> {
        let arrow = self.arrows.remove(&arrow_id)?;
        if let Some(node) = self.nodes.get_mut(&arrow.start) {
            node.attached.remove(&arrow_id);
        }
        if let Some(node) = self.nodes.get_mut(&arrow.end) {
            node.attached.remove(&arrow_id);
        }
        Some(arrow)
    }

    /// Whether an arrow already exists for the ordered `(start, end)` pair.
    pub fn has_arrow_between(&self, start: NodeId, end: NodeId) -> bool {
        self.arrows
            .values()
            .any(|a| a.start == start && a.end == end)
    }

    /// Moves a node by a delta and reroutes every attached arrow.
    pub fn shift_node(&mut self, node_id: NodeId, delta: Point) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.position = node.position + delta;
            self.reroute_attached(node_id);
        }
    }

    /// Applies a text snapshot to a node (which resizes it to fit) and
    /// reroutes every attached arrow.
    pub fn set_node_text(&mut self, node_id: NodeId, text: &NodeText) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.apply_text(text);
            self.reroute_attached(node_id);
        }
    }

    /// Recomputes the route of every arrow attached to a node.
    ///
    /// Must run after any move or resize of the node so arrows are never
    /// stale by more than one frame.
    pub fn reroute_attached(&mut self, node_id: NodeId) {
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };
        let attached: Vec<ArrowId> = node.attached.iter().copied().collect();
        for arrow_id in attached {
            self.reroute_arrow(arrow_id);
        }
    }

    /// Recomputes a single arrow's route from its endpoints' current bounds.
    pub fn reroute_arrow(&mut self, arrow_id: ArrowId) {
        let Some(arrow) = self.arrows.get(&arrow_id) else {
            return;
        };
        let (Some(start), Some(end)) = (self.nodes.get(&arrow.start), self.nodes.get(&arrow.end))
        else {
            return;
        };
        let route = routing::compute_route(start.rect(), end.rect());
        if let Some(arrow) = self.arrows.get_mut(&arrow_id) {
            arrow.route = route;
        }
    }

    /// Rebuilds every derived field (attachment sets and routes) from the
    /// persistent node/arrow data. Called after deserialization.
    pub fn rebuild_derived(&mut self) {
        for node in self.nodes.values_mut() {
            node.attached.clear();
        }
        let arrow_ids: Vec<ArrowId> = self.arrows.keys().copied().collect();
        for arrow_id in arrow_ids {
            let (start, end) = {
                let arrow = &self.arrows[&arrow_id];
                (arrow.start, arrow.end)
            };
            if let Some(node) = self.nodes.get_mut(&start) {
                node.attached.insert(arrow_id);
            }
            if let Some(node) = self.nodes.get_mut(&end) {
                node.attached.insert(arrow_id);
            }
            self.reroute_arrow(arrow_id);
        }
    }

    /// Finds the node whose bounds contain the logical point, if any.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.rect().contains(point))
            .map(|node| node.id)
    }

    /// Finds the arrow whose route passes within the hit threshold of the
    /// logical point, if any.
    pub fn arrow_at(&self, point: Point) -> Option<ArrowId> {
        self.arrows
            .values()
            .find(|arrow| arrow.hit_test(point))
            .map(|arrow| arrow.id)
    }
}
