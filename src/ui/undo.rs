//! Undo/redo action history for the canvas.
//!
//! Every edit is a reversible [`EditorAction`] value applied against an
//! explicit [`Scene`], and the [`ActionHistory`] keeps a bounded past deque
//! and a future stack. The history also hands out identity tokens used for
//! unsaved-changes tracking.

use crate::constants::HISTORY_LENGTH;
use crate::geometry::Point;
use crate::types::{Arrow, NodeId, NodeText, Scene, ShapeNode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Identity token for a performed action.
///
/// Stamped once when an action enters the history and never reused, so
/// comparing two tokens answers "is this the same performed action?" the way
/// reference identity did in a pointer-based design.
pub type ActionId = u64;

/// A reversible edit, captured as values at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditorAction {
    /// A node was created.
    CreateNode {
        /// The created node as captured at creation.
        node: ShapeNode,
    },
    /// The current selection (possibly a node, an arrow, both, or neither)
    /// was deleted. Both fields `None` is a valid no-op command.
    DeleteSelection {
        /// Deleted node together with every arrow that was attached to it.
        node: Option<(ShapeNode, Vec<Arrow>)>,
        /// Deleted standalone arrow, when an arrow was selected.
        arrow: Option<Arrow>,
    },
    /// A node was moved. Stores only the delta, so redo/undo are applications
    /// of the delta and its negation.
    MoveNode {
        /// The moved node.
        node_id: NodeId,
        /// Displacement applied by the move.
        delta: Point,
    },
    /// An arrow was created between two nodes.
    CreateArrow {
        /// The created arrow as captured at creation.
        arrow: Arrow,
    },
    /// A node's title and/or body text changed.
    EditText {
        /// The edited node.
        node_id: NodeId,
        /// Text fields before the edit.
        old: NodeText,
        /// Text fields after the edit.
        new: NodeText,
    },
}

impl EditorAction {
    /// Applies (or re-applies) the action to the scene.
    pub fn apply(&self, scene: &mut Scene) {
        match self {
            EditorAction::CreateNode { node } => {
                scene.add_node(node.clone());
            }
            EditorAction::DeleteSelection { node, arrow } => {
                if let Some(captured) = arrow {
                    scene.remove_arrow(captured.id);
                }
                if let Some((captured, _)) = node {
                    scene.remove_node(captured.id);
                }
            }
            EditorAction::MoveNode { node_id, delta } => {
                scene.shift_node(*node_id, *delta);
            }
            EditorAction::CreateArrow { arrow } => {
                scene.insert_arrow(arrow.clone());
            }
            EditorAction::EditText { node_id, new, .. } => {
                scene.set_node_text(*node_id, new);
            }
        }
    }

    /// Reverses the action on the scene.
    pub fn revert(&self, scene: &mut Scene) {
        match self {
            EditorAction::CreateNode { node } => {
                scene.remove_node(node.id);
            }
            EditorAction::DeleteSelection { node, arrow } => {
                if let Some((captured, attached)) = node {
                    let mut restored = captured.clone();
                    restored.attached.clear();
                    scene.add_node(restored);
                    for captured_arrow in attached {
                        scene.insert_arrow(captured_arrow.clone());
                    }
                }
                if let Some(captured) = arrow {
                    scene.insert_arrow(captured.clone());
                }
            }
            EditorAction::MoveNode { node_id, delta } => {
                scene.shift_node(*node_id, delta.scaled(-1.0));
            }
            EditorAction::CreateArrow { arrow } => {
                scene.remove_arrow(arrow.id);
            }
            EditorAction::EditText { node_id, old, .. } => {
                scene.set_node_text(*node_id, old);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    id: ActionId,
    action: EditorAction,
}

/// Bounded command log with undo/redo and a last-performed identity marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionHistory {
    /// Undoable actions, oldest first. Bounded at [`HISTORY_LENGTH`].
    #[serde(skip)]
    past: VecDeque<HistoryEntry>,
    /// Undone actions awaiting redo; cleared by any fresh edit.
    #[serde(skip)]
    future: Vec<HistoryEntry>,
    #[serde(skip)]
    next_id: ActionId,
    #[serde(skip)]
    last_performed: Option<ActionId>,
}

impl ActionHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an already-applied action, invalidating the redo chain.
    ///
    /// When the retention depth is exceeded the oldest entry is evicted
    /// silently and becomes irrevocable. Returns the new action's identity
    /// token.
    pub fn add(&mut self, action: EditorAction) -> ActionId {
        self.future.clear();
        let id = self.next_id;
        self.next_id += 1;
        self.past.push_back(HistoryEntry { id, action });
        while self.past.len() > HISTORY_LENGTH {
            self.past.pop_front();
        }
        self.last_performed = Some(id);
        id
    }

    /// Undoes the most recent action against the scene.
    ///
    /// Returns the undone action's token, or `None` (having done nothing)
    /// when the past is empty.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<ActionId> {
        let entry = self.past.pop_back()?;
        entry.action.revert(scene);
        let id = entry.id;
        self.future.push(entry);
        self.last_performed = self.past.back().map(|e| e.id);
        Some(id)
    }

    /// Redoes the most recently undone action against the scene.
    pub fn redo(&mut self, scene: &mut Scene) -> Option<ActionId> {
        let entry = self.future.pop()?;
        entry.action.apply(scene);
        let id = entry.id;
        self.last_performed = Some(id);
        self.past.push_back(entry);
        Some(id)
    }

    /// Whether an undo is available.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Identity token of the most recently performed (added or redone)
    /// action, or of the new top of the past after an undo. `None` when the
    /// past is empty.
    ///
    /// The canvas records this at save time and compares tokens afterwards
    /// to decide whether there are unsaved changes.
    pub fn last_performed(&self) -> Option<ActionId> {
        self.last_performed
    }

    /// Drops all history, e.g. after opening a different file.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.last_performed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EndCapStyle, NodeKind, StrokeStyle};

    fn node_at(x: f64, y: f64) -> ShapeNode {
        ShapeNode::new(NodeKind::Plain, Point::new(x, y))
    }

    fn noop_action() -> EditorAction {
        EditorAction::DeleteSelection {
            node: None,
            arrow: None,
        }
    }

    #[test]
    fn test_undo_redo_empty_history_is_noop() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(&mut scene), None);
        assert_eq!(history.redo(&mut scene), None);
    }

    #[test]
    fn test_history_bound_evicts_oldest() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();

        for _ in 0..HISTORY_LENGTH + 3 {
            history.add(noop_action());
        }

        for _ in 0..HISTORY_LENGTH {
            assert!(history.undo(&mut scene).is_some());
        }
        // Evicted entries are irrevocable.
        assert_eq!(history.undo(&mut scene), None);
    }

    #[test]
    fn test_add_clears_redo_chain() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();

        history.add(noop_action());
        history.add(noop_action());
        history.undo(&mut scene);
        assert!(history.can_redo());

        history.add(noop_action());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_last_performed_transitions() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();

        assert_eq!(history.last_performed(), None);
        let first = history.add(noop_action());
        let second = history.add(noop_action());
        assert_eq!(history.last_performed(), Some(second));

        history.undo(&mut scene);
        assert_eq!(history.last_performed(), Some(first));
        history.undo(&mut scene);
        assert_eq!(history.last_performed(), None);

        history.redo(&mut scene);
        assert_eq!(history.last_performed(), Some(first));
        history.redo(&mut scene);
        assert_eq!(history.last_performed(), Some(second));
    }

    #[test]
    fn test_create_node_inverse() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();

        let node = node_at(100.0, 100.0);
        let id = scene.add_node(node.clone());
        history.add(EditorAction::CreateNode { node });

        history.undo(&mut scene);
        assert!(scene.nodes.is_empty());

        history.redo(&mut scene);
        assert!(scene.nodes.contains_key(&id));
    }

    #[test]
    fn test_move_node_inverse() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();
        let id = scene.add_node(node_at(100.0, 100.0));

        let delta = Point::new(50.0, -20.0);
        scene.shift_node(id, delta);
        history.add(EditorAction::MoveNode { node_id: id, delta });
        assert_eq!(scene.nodes[&id].position, Point::new(150.0, 80.0));

        history.undo(&mut scene);
        assert_eq!(scene.nodes[&id].position, Point::new(100.0, 100.0));

        history.redo(&mut scene);
        assert_eq!(scene.nodes[&id].position, Point::new(150.0, 80.0));
    }

    #[test]
    fn test_create_arrow_inverse() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();
        let a = scene.add_node(node_at(0.0, 0.0));
        let b = scene.add_node(node_at(400.0, 0.0));
        let arrow_id = scene
            .add_arrow(a, b, StrokeStyle::Solid, EndCapStyle::Triangle)
            .unwrap();
        history.add(EditorAction::CreateArrow {
            arrow: scene.arrows[&arrow_id].clone(),
        });

        history.undo(&mut scene);
        assert!(scene.arrows.is_empty());
        assert!(scene.nodes[&a].attached.is_empty());

        history.redo(&mut scene);
        assert!(scene.arrows.contains_key(&arrow_id));
        assert!(scene.nodes[&b].attached.contains(&arrow_id));
    }

    #[test]
    fn test_delete_selection_restores_node_with_arrows() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();
        let a = scene.add_node(node_at(0.0, 0.0));
        let b = scene.add_node(node_at(400.0, 0.0));
        let arrow_id = scene
            .add_arrow(a, b, StrokeStyle::Dashed, EndCapStyle::FilledDiamond)
            .unwrap();

        let captured = scene.remove_node(a).unwrap();
        history.add(EditorAction::DeleteSelection {
            node: Some(captured),
            arrow: None,
        });
        assert!(scene.arrows.is_empty());

        history.undo(&mut scene);
        assert!(scene.nodes.contains_key(&a));
        assert!(scene.arrows.contains_key(&arrow_id));
        assert!(scene.nodes[&a].attached.contains(&arrow_id));
        assert_eq!(scene.arrows[&arrow_id].stroke, StrokeStyle::Dashed);

        history.redo(&mut scene);
        assert!(!scene.nodes.contains_key(&a));
        assert!(scene.arrows.is_empty());
    }

    #[test]
    fn test_delete_selection_noop_roundtrip() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();
        scene.add_node(node_at(0.0, 0.0));

        history.add(noop_action());
        history.undo(&mut scene);
        history.redo(&mut scene);
        assert_eq!(scene.nodes.len(), 1);
    }

    #[test]
    fn test_edit_text_inverse() {
        let mut history = ActionHistory::new();
        let mut scene = Scene::new();
        let node = ShapeNode::new(
            NodeKind::Interface {
                methods: String::new(),
            },
            Point::default(),
        );
        let id = scene.add_node(node);

        let old = scene.nodes[&id].text();
        let new = NodeText {
            title: "Comparable".to_string(),
            properties: None,
            methods: Some("compare_to(other)".to_string()),
        };
        scene.set_node_text(id, &new);
        history.add(EditorAction::EditText {
            node_id: id,
            old: old.clone(),
            new: new.clone(),
        });

        history.undo(&mut scene);
        assert_eq!(scene.nodes[&id].text(), old);

        history.redo(&mut scene);
        assert_eq!(scene.nodes[&id].text(), new);
    }
}
