//! Zoom-aware pointer event redispatch.
//!
//! The canvas renders through a uniform scale, but raw pointer events arrive
//! in view (post-scale) coordinates. Hit-testing a scaled scene with view
//! coordinates targets the wrong element at any zoom other than 1.0, and a
//! drag must keep delivering to the element that was pressed even after the
//! pointer leaves it. [`ZoomTransform`] and [`InputRedispatcher`] close both
//! gaps: every raw event is descaled, re-targeted against the logical scene
//! graph, and re-emitted with target-local coordinates.

use crate::constants::{DEFAULT_ZOOM_INDEX, LINE_HEIGHT, TEXT_PADDING_Y, ZOOM_LEVELS};
use crate::geometry::Point;
use crate::types::{ArrowId, NodeId, NodeKind, NodeRegion, Scene};

/// Discrete zoom state: an index into the fixed table of permitted scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomTransform {
    level_index: usize,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            level_index: DEFAULT_ZOOM_INDEX,
        }
    }
}

impl ZoomTransform {
    /// Creates a transform at the default 1.0 scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active scale factor.
    pub fn scale(&self) -> f64 {
        ZOOM_LEVELS[self.level_index]
    }

    /// The active index into the zoom-level table.
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// Jumps directly to a zoom level by table index, ignoring out-of-range
    /// requests.
    pub fn set_level_index(&mut self, index: usize) {
        if index < ZOOM_LEVELS.len() {
            self.level_index = index;
        }
    }

    /// Whether a further zoom-in step exists.
    pub fn can_zoom_in(&self) -> bool {
        self.level_index < ZOOM_LEVELS.len() - 1
    }

    /// Whether a further zoom-out step exists.
    pub fn can_zoom_out(&self) -> bool {
        self.level_index > 0
    }

    /// Steps to the next zoom level; silently ignored at the maximum.
    pub fn zoom_in(&mut self) {
        if self.can_zoom_in() {
            self.level_index += 1;
        }
    }

    /// Steps to the previous zoom level; silently ignored at the minimum.
    pub fn zoom_out(&mut self) {
        if self.can_zoom_out() {
            self.level_index -= 1;
        }
    }

    /// Converts a view-space point to logical space.
    pub fn to_logical(&self, view: Point) -> Point {
        view.scaled(1.0 / self.scale())
    }

    /// Converts a logical-space point to view space.
    pub fn to_view(&self, logical: Point) -> Point {
        logical.scaled(self.scale())
    }
}

/// Kinds of pointer events flowing through the redispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Button went down.
    Press,
    /// Button came up.
    Release,
    /// Press and release on the same spot.
    Click,
    /// Motion with no button held.
    Move,
    /// Motion with the button held.
    Drag,
    /// Pointer entered an element (synthesized only).
    Enter,
    /// Pointer left an element (synthesized only).
    Exit,
}

impl PointerKind {
    fn is_motion(self) -> bool {
        matches!(self, PointerKind::Move | PointerKind::Drag)
    }
}

/// A raw pointer event in view (scaled) coordinates, relative to the
/// redispatch layer's origin. The caller removes window chrome and scroll
/// offsets before dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointerEvent {
    /// Event kind.
    pub kind: PointerKind,
    /// Position in view space.
    pub point: Point,
}

/// A logical element of the scene graph that events can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The empty canvas surface.
    Background,
    /// A node's frame.
    Node(NodeId),
    /// A node's title field.
    Title(NodeId),
    /// A class node's properties body.
    Properties(NodeId),
    /// An interface or class node's methods body.
    Methods(NodeId),
    /// An arrow's route.
    Arrow(ArrowId),
}

impl Target {
    /// The logical parent in the scene graph, if any.
    pub fn parent(self) -> Option<Target> {
        match self {
            Target::Background => None,
            Target::Node(_) | Target::Arrow(_) => Some(Target::Background),
            Target::Title(id) | Target::Properties(id) | Target::Methods(id) => {
                Some(Target::Node(id))
            }
        }
    }

    /// Whether this element handles plain pointer events
    /// (press/release/click/enter/exit).
    pub fn handles_pointer(self) -> bool {
        // Every element type registers for plain pointer events; text fields
        // need clicks for editing and arrows need clicks for selection.
        true
    }

    /// Whether this element handles motion events (move/drag).
    ///
    /// Text fields and arrows don't track motion, so moves and drags over
    /// them walk up to the owning node or the background.
    pub fn handles_motion(self) -> bool {
        matches!(self, Target::Background | Target::Node(_))
    }

    fn handles(self, kind: PointerKind) -> bool {
        if kind.is_motion() {
            self.handles_motion()
        } else {
            self.handles_pointer()
        }
    }
}

/// A retargeted event: the resolved logical element plus the point in that
/// element's local coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchedEvent {
    /// Event kind (possibly synthesized Enter/Exit).
    pub kind: PointerKind,
    /// Resolved logical target.
    pub target: Target,
    /// Position relative to the target's origin, in logical units.
    pub local: Point,
}

/// Retargets raw view-space pointer events to logical scene elements.
///
/// Holds the sticky press target (drags and the release go to whoever was
/// pressed, not whoever is under the pointer), the last entered element for
/// enter/exit synthesis, and a re-entrancy flag so self-generated events
/// can never recurse into the dispatcher.
#[derive(Debug, Default)]
pub struct InputRedispatcher {
    last_pressed: Option<Target>,
    last_entered: Option<Target>,
    dispatching: bool,
}

impl InputRedispatcher {
    /// Creates an idle redispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sticky press target, if a press is in flight.
    pub fn last_pressed(&self) -> Option<Target> {
        self.last_pressed
    }

    /// Processes one raw event, returning the retargeted events to deliver
    /// in order. Events arriving while a dispatch is already in progress are
    /// dropped, as are events that resolve to no listening element.
    pub fn dispatch(
        &mut self,
        scene: &Scene,
        zoom: &ZoomTransform,
        event: RawPointerEvent,
    ) -> Vec<DispatchedEvent> {
        if self.dispatching {
            return Vec::new();
        }
        self.dispatching = true;
        let out = self.redispatch(scene, zoom, event);
        self.dispatching = false;
        out
    }

    fn redispatch(
        &mut self,
        scene: &Scene,
        zoom: &ZoomTransform,
        event: RawPointerEvent,
    ) -> Vec<DispatchedEvent> {
        let logical = zoom.to_logical(event.point);
        let hit = deepest_target_at(scene, logical);
        let resolved = listening_target(hit, event.kind);

        let mut out = Vec::new();
        match event.kind {
            PointerKind::Press => {
                self.last_pressed = resolved;
                push_event(&mut out, scene, event.kind, resolved, logical);
            }
            PointerKind::Release => {
                // Sticky: the release goes to whoever was pressed, even if
                // the pointer has left it.
                push_event(&mut out, scene, event.kind, self.last_pressed, logical);
                self.last_pressed = None;
            }
            PointerKind::Click => {
                push_event(&mut out, scene, event.kind, resolved, logical);
                self.last_pressed = None;
            }
            PointerKind::Move => {
                self.synthesize_enter_exit(&mut out, scene, resolved, logical);
                push_event(&mut out, scene, event.kind, resolved, logical);
            }
            PointerKind::Drag => {
                self.synthesize_enter_exit(&mut out, scene, resolved, logical);
                push_event(&mut out, scene, event.kind, self.last_pressed, logical);
            }
            PointerKind::Enter | PointerKind::Exit => {
                // Never delivered directly; they only feed the transition
                // tracking.
                self.synthesize_enter_exit(&mut out, scene, resolved, logical);
            }
        }
        out
    }

    /// Emits an exit to the previously entered element followed by an enter
    /// to the new one whenever the resolved element changes.
    fn synthesize_enter_exit(
        &mut self,
        out: &mut Vec<DispatchedEvent>,
        scene: &Scene,
        resolved: Option<Target>,
        logical: Point,
    ) {
        if self.last_entered == resolved {
            return;
        }
        push_event(out, scene, PointerKind::Exit, self.last_entered, logical);
        self.last_entered = resolved;
        push_event(out, scene, PointerKind::Enter, self.last_entered, logical);
    }
}

fn push_event(
    out: &mut Vec<DispatchedEvent>,
    scene: &Scene,
    kind: PointerKind,
    target: Option<Target>,
    logical: Point,
) {
    if let Some(target) = target {
        out.push(DispatchedEvent {
            kind,
            target,
            local: logical - target_origin(scene, target),
        });
    }
}

/// Deepest-hit-test over the logical scene graph.
///
/// Node sub-regions are deeper than the node, nodes sit over arrows, and
/// everything sits over the background. A miss on everything is the
/// background itself, which is a valid target, not a failure.
pub fn deepest_target_at(scene: &Scene, logical: Point) -> Target {
    if let Some(node_id) = scene.node_at(logical) {
        let node = &scene.nodes[&node_id];
        let local = logical - node.position;
        return match node.region_at(local) {
            NodeRegion::Title => Target::Title(node_id),
            NodeRegion::Properties => Target::Properties(node_id),
            NodeRegion::Methods => Target::Methods(node_id),
            NodeRegion::Frame => Target::Node(node_id),
        };
    }
    if let Some(arrow_id) = scene.arrow_at(logical) {
        return Target::Arrow(arrow_id);
    }
    Target::Background
}

/// Walks the parent chain from the hit element to the nearest one with a
/// handler for the event's category, or `None` if the chain is exhausted.
pub fn listening_target(hit: Target, kind: PointerKind) -> Option<Target> {
    let mut current = Some(hit);
    while let Some(target) = current {
        if target.handles(kind) {
            return Some(target);
        }
        current = target.parent();
    }
    None
}

/// Origin of a target's local coordinate frame, in logical space.
pub fn target_origin(scene: &Scene, target: Target) -> Point {
    let title_height = LINE_HEIGHT + TEXT_PADDING_Y;
    match target {
        Target::Background | Target::Arrow(_) => Point::default(),
        Target::Node(id) | Target::Title(id) => scene
            .nodes
            .get(&id)
            .map(|n| n.position)
            .unwrap_or_default(),
        Target::Properties(id) => scene
            .nodes
            .get(&id)
            .map(|n| n.position + Point::new(0.0, title_height))
            .unwrap_or_default(),
        Target::Methods(id) => scene
            .nodes
            .get(&id)
            .map(|n| {
                let body_top = match &n.kind {
                    // A class's methods body sits below the properties band.
                    NodeKind::Class { .. } => {
                        title_height + (n.size.height - title_height) / 2.0
                    }
                    _ => title_height,
                };
                n.position + Point::new(0.0, body_top)
            })
            .unwrap_or_default(),
    }
}
