//! Application state management structures.
//!
//! This module defines the main [`CanvasApp`] struct and the smaller state
//! structs it is composed of: tool selection, canvas selection, in-flight
//! interactions, and file tracking.

use super::dispatch::{InputRedispatcher, ZoomTransform};
use super::undo::{ActionHistory, ActionId};
use crate::geometry::Point;
use crate::types::{ArrowId, EndCapStyle, NodeId, NodeKind, NodeRegion, Scene, StrokeStyle};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// The currently selected editing tool.
///
/// Owned by the toolbar but read by the canvas gesture handlers to decide
/// which command a press/release synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    /// Select, move, and edit existing elements.
    Select,
    /// Click to create a class node.
    Class,
    /// Click to create an interface node.
    Interface,
    /// Drag between nodes: inheritance arrow (solid, hollow triangle).
    Inherits,
    /// Drag between nodes: interface implementation (dashed, hollow triangle).
    Implements,
    /// Drag between nodes: aggregation (solid, hollow diamond).
    Aggregates,
    /// Drag between nodes: composition (solid, filled diamond).
    Composes,
}

impl Tool {
    /// The node kind this tool creates, if it is a creation tool.
    pub fn node_kind(self) -> Option<NodeKind> {
        match self {
            Tool::Class => Some(NodeKind::Class {
                properties: String::new(),
                methods: String::new(),
            }),
            Tool::Interface => Some(NodeKind::Interface {
                methods: String::new(),
            }),
            _ => None,
        }
    }

    /// The arrow style this tool draws, if it is a relationship tool.
    pub fn arrow_style(self) -> Option<(StrokeStyle, EndCapStyle)> {
        match self {
            Tool::Inherits => Some((StrokeStyle::Solid, EndCapStyle::Triangle)),
            Tool::Implements => Some((StrokeStyle::Dashed, EndCapStyle::Triangle)),
            Tool::Aggregates => Some((StrokeStyle::Solid, EndCapStyle::OutlineDiamond)),
            Tool::Composes => Some((StrokeStyle::Solid, EndCapStyle::FilledDiamond)),
            _ => None,
        }
    }

    /// Short label for the toolbar button.
    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Class => "Class",
            Tool::Interface => "Interface",
            Tool::Inherits => "Inherits from",
            Tool::Implements => "Implements",
            Tool::Aggregates => "Aggregate of",
            Tool::Composes => "Composed of",
        }
    }
}

/// The current canvas selection: at most one node and one arrow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected node, if any.
    pub node: Option<NodeId>,
    /// Selected arrow, if any.
    pub arrow: Option<ArrowId>,
}

impl Selection {
    /// Clears both fields.
    pub fn clear(&mut self) {
        self.node = None;
        self.arrow = None;
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.node.is_none() && self.arrow.is_none()
    }
}

/// An in-progress text edit on a node's title or body.
#[derive(Debug, Clone)]
pub struct TextEdit {
    /// Node being edited.
    pub node_id: NodeId,
    /// Which field is being edited.
    pub region: NodeRegion,
    /// Live edit buffer bound to the egui text widget.
    pub buffer: String,
    /// Field content when the edit began, for the undo capture.
    pub original: String,
}

/// Transient interaction state for in-flight gestures.
#[derive(Debug, Default)]
pub struct InteractionState {
    /// Node currently being dragged with the select tool.
    pub dragging_node: Option<NodeId>,
    /// The dragged node's position when the drag started, for the undo delta.
    pub drag_origin: Option<Point>,
    /// Offset from the node's top-left corner to the initial press point.
    pub drag_grab_offset: Point,
    /// Node a relationship drag started from.
    pub pending_arrow_from: Option<NodeId>,
    /// Current pointer position (logical) while a relationship drag is live.
    pub arrow_preview_point: Option<Point>,
    /// Active text edit, if any.
    pub text_edit: Option<TextEdit>,
    /// Whether the canvas is being panned with the middle mouse button.
    pub is_panning: bool,
    /// Last pointer position during a pan, in screen space.
    pub last_pan_pos: Option<egui::Pos2>,
}

/// A file operation requested this frame, serviced by `file_ops`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Save to the current path, or fall back to save-as.
    Save,
    /// Save behind a path dialog.
    SaveAs,
    /// Open behind a path dialog.
    Open,
    /// Export the scene to an SVG file.
    ExportSvg,
    /// Export the scene to a PNG file.
    ExportPng,
}

/// Messages sent from async file dialogs back to the UI thread.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save completed to the given path; carries the history token captured
    /// when the snapshot was taken, which becomes the save marker.
    SaveCompleted(String, Option<ActionId>),
    /// Open completed with the given path and file content.
    LoadCompleted(String, String),
    /// Export completed to the given path.
    ExportCompleted(String),
    /// A dialog or I/O operation failed.
    OperationFailed(String),
}

/// File tracking: current path and the save marker used for dirty checks.
pub struct FileState {
    /// Path of the current file, if it has ever been saved or opened.
    pub current_path: Option<String>,
    /// History token recorded at the last save; compared by identity
    /// against the history's last performed action.
    pub last_saved_action: Option<ActionId>,
    /// Operation requested this frame, if any.
    pub pending: Option<PendingFileOperation>,
    /// Sending side handed to async dialog tasks.
    pub sender: Sender<FileOperationResult>,
    /// Receiving side polled every frame.
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            last_saved_action: None,
            pending: None,
            sender,
            receiver,
        }
    }
}

/// The main application: the scene being edited plus all UI state.
pub struct CanvasApp {
    /// The scene graph being edited.
    pub scene: Scene,
    /// Currently selected tool.
    pub tool: Tool,
    /// Discrete zoom state.
    pub zoom: ZoomTransform,
    /// Pan offset of the canvas in screen space.
    pub view_offset: egui::Vec2,
    /// Undo/redo history.
    pub history: ActionHistory,
    /// Pointer event retargeting layer.
    pub dispatcher: InputRedispatcher,
    /// Current selection.
    pub selection: Selection,
    /// In-flight gesture state.
    pub interaction: InteractionState,
    /// File path and dirty tracking.
    pub file: FileState,
    /// Whether dark mode visuals are enabled.
    pub dark_mode: bool,
}

impl Default for CanvasApp {
    fn default() -> Self {
        Self {
            scene: Scene::new(),
            tool: Tool::Select,
            zoom: ZoomTransform::new(),
            view_offset: egui::Vec2::ZERO,
            history: ActionHistory::new(),
            dispatcher: InputRedispatcher::new(),
            selection: Selection::default(),
            interaction: InteractionState::default(),
            file: FileState::default(),
            dark_mode: true,
        }
    }
}

impl CanvasApp {
    /// Creates an app with an empty scene and default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the canvas has no unsaved changes, by identity comparison of
    /// the last performed action against the one recorded at save time.
    pub fn is_saved(&self) -> bool {
        self.file.last_saved_action == self.history.last_performed()
    }

    /// Whether the canvas has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        !self.is_saved()
    }

    /// Whether the undo toolbar button should be enabled.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether the redo toolbar button should be enabled.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether a further zoom-in step exists.
    pub fn can_zoom_in(&self) -> bool {
        self.zoom.can_zoom_in()
    }

    /// Whether a further zoom-out step exists.
    pub fn can_zoom_out(&self) -> bool {
        self.zoom.can_zoom_out()
    }
}
