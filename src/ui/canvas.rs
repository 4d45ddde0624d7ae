//! Canvas interaction: turning retargeted pointer events into edits.
//!
//! Raw egui pointer input is converted to view-space [`RawPointerEvent`]s,
//! pushed through the [`InputRedispatcher`](super::dispatch::InputRedispatcher),
//! and the resulting logical events are interpreted against the current tool
//! to mutate the scene and record undo actions.

use super::dispatch::{target_origin, DispatchedEvent, PointerKind, RawPointerEvent, Target};
use super::state::{CanvasApp, TextEdit, Tool};
use super::undo::EditorAction;
use crate::geometry::Point;
use crate::types::{NodeId, NodeRegion, ShapeNode};
use eframe::egui;

impl CanvasApp {
    /// Converts a screen position to view space (canvas-relative, still
    /// scaled), removing the canvas origin and pan offset.
    pub fn screen_to_view(&self, screen_pos: egui::Pos2, canvas_origin: egui::Pos2) -> Point {
        let p = screen_pos - canvas_origin - self.view_offset;
        Point::new(p.x as f64, p.y as f64)
    }

    /// Converts a logical point to screen space for painting.
    pub fn logical_to_screen(&self, logical: Point, canvas_origin: egui::Pos2) -> egui::Pos2 {
        let view = self.zoom.to_view(logical);
        egui::pos2(
            canvas_origin.x + self.view_offset.x + view.x as f32,
            canvas_origin.y + self.view_offset.y + view.y as f32,
        )
    }

    /// Reads this frame's pointer input and feeds it through the
    /// redispatcher.
    pub fn handle_canvas_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        self.handle_canvas_panning(ui, response);
        if self.interaction.is_panning {
            return;
        }

        let origin = response.rect.min;
        let pointer_pos = ui.input(|i| i.pointer.latest_pos());

        let mut raw_events = Vec::new();
        if let Some(pos) = pointer_pos {
            if response.rect.contains(pos) || self.interaction.dragging_node.is_some() {
                let point = self.screen_to_view(pos, origin);
                let primary_down = ui.input(|i| i.pointer.primary_down());

                if ui.input(|i| i.pointer.primary_pressed()) {
                    raw_events.push(RawPointerEvent {
                        kind: PointerKind::Press,
                        point,
                    });
                } else if ui.input(|i| i.pointer.primary_released()) {
                    raw_events.push(RawPointerEvent {
                        kind: PointerKind::Release,
                        point,
                    });
                    if response.clicked() || response.double_clicked() {
                        raw_events.push(RawPointerEvent {
                            kind: PointerKind::Click,
                            point,
                        });
                    }
                } else if ui.input(|i| i.pointer.is_moving()) {
                    raw_events.push(RawPointerEvent {
                        kind: if primary_down {
                            PointerKind::Drag
                        } else {
                            PointerKind::Move
                        },
                        point,
                    });
                }
            }
        }

        let double_clicked = response.double_clicked();
        for raw in raw_events {
            let dispatched = self.dispatcher.dispatch(&self.scene, &self.zoom, raw);
            for event in dispatched {
                self.handle_dispatched(event, double_clicked);
            }
        }
    }

    /// Middle-button canvas panning, independent of the active tool.
    fn handle_canvas_panning(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let middle_down = ui.input(|i| i.pointer.middle_down());
        if middle_down {
            if let Some(current_pos) = response.hover_pos() {
                if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.view_offset += current_pos - last_pos;
                }
                self.interaction.is_panning = true;
                self.interaction.last_pan_pos = Some(current_pos);
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Interprets one retargeted event against the current tool.
    pub fn handle_dispatched(&mut self, event: DispatchedEvent, double_clicked: bool) {
        let logical = target_origin(&self.scene, event.target) + event.local;
        match event.kind {
            PointerKind::Press => self.on_press(event.target, logical),
            PointerKind::Drag => self.on_drag(event.target, logical),
            PointerKind::Release => self.on_release(event.target, logical),
            PointerKind::Click => self.on_click(event.target, logical, double_clicked),
            // Hover transitions currently carry no behavior beyond the
            // dispatcher's own bookkeeping.
            PointerKind::Move | PointerKind::Enter | PointerKind::Exit => {}
        }
    }

    fn on_press(&mut self, target: Target, logical: Point) {
        let node_id = target_node(target);
        match self.tool {
            Tool::Select => {
                if let Some(id) = node_id {
                    self.select_node(id);
                    if let Some(node) = self.scene.nodes.get(&id) {
                        self.interaction.dragging_node = Some(id);
                        self.interaction.drag_origin = Some(node.position);
                        self.interaction.drag_grab_offset = logical - node.position;
                    }
                }
            }
            _ if self.tool.arrow_style().is_some() => {
                if let Some(id) = node_id {
                    self.interaction.pending_arrow_from = Some(id);
                    self.interaction.arrow_preview_point = Some(logical);
                }
            }
            _ => {}
        }
    }

    fn on_drag(&mut self, target: Target, logical: Point) {
        // Drags arrive targeted at the sticky press target; the logical
        // point is what matters here.
        let _ = target;
        if let Some(id) = self.interaction.dragging_node {
            if let Some(node) = self.scene.nodes.get(&id) {
                let desired = logical - self.interaction.drag_grab_offset;
                let delta = desired - node.position;
                if delta != Point::default() {
                    self.scene.shift_node(id, delta);
                }
            }
        } else if self.interaction.pending_arrow_from.is_some() {
            self.interaction.arrow_preview_point = Some(logical);
        }
    }

    fn on_release(&mut self, _target: Target, logical: Point) {
        // Finish a node move: the positions were updated live, so only the
        // total delta needs recording.
        if let (Some(id), Some(origin)) = (
            self.interaction.dragging_node.take(),
            self.interaction.drag_origin.take(),
        ) {
            if let Some(node) = self.scene.nodes.get(&id) {
                let delta = node.position - origin;
                if delta != Point::default() {
                    self.history
                        .add(EditorAction::MoveNode { node_id: id, delta });
                }
            }
        }

        // Finish a relationship drag: create the arrow if released over a
        // different node; duplicates and self-arrows are silently ignored.
        if let Some(from) = self.interaction.pending_arrow_from.take() {
            self.interaction.arrow_preview_point = None;
            if let (Some(to), Some((stroke, cap))) =
                (self.scene.node_at(logical), self.tool.arrow_style())
            {
                if let Some(arrow_id) = self.scene.add_arrow(from, to, stroke, cap) {
                    self.history.add(EditorAction::CreateArrow {
                        arrow: self.scene.arrows[&arrow_id].clone(),
                    });
                }
            }
        }
    }

    fn on_click(&mut self, target: Target, logical: Point, double_clicked: bool) {
        match self.tool {
            Tool::Class | Tool::Interface => {
                if target == Target::Background {
                    self.create_node_at(logical);
                }
            }
            Tool::Select => {
                if double_clicked {
                    if let Some(region) = target_region(target) {
                        if let Some(id) = target_node(target) {
                            self.begin_text_edit(id, region);
                            return;
                        }
                    }
                }
                self.commit_text_edit();
                match target {
                    Target::Arrow(id) => {
                        self.selection.clear();
                        self.selection.arrow = Some(id);
                    }
                    Target::Background => self.selection.clear(),
                    _ => {
                        if let Some(id) = target_node(target) {
                            self.select_node(id);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Creates a node of the active tool's kind at a logical point and
    /// records the action.
    pub fn create_node_at(&mut self, logical: Point) -> Option<NodeId> {
        let kind = self.tool.node_kind()?;
        let node = ShapeNode::new(kind, logical);
        let id = self.scene.add_node(node.clone());
        self.history.add(EditorAction::CreateNode { node });
        self.select_node(id);
        Some(id)
    }

    fn select_node(&mut self, id: NodeId) {
        if self.selection.node != Some(id) {
            self.commit_text_edit();
            self.selection.clear();
            self.selection.node = Some(id);
        }
    }

    /// Deletes the current selection, recording a single reversible action.
    ///
    /// With nothing selected this still records a no-op action, keeping the
    /// history uniform instead of special-casing empty deletes.
    pub fn delete_selection(&mut self) {
        self.commit_text_edit();
        let arrow = self
            .selection
            .arrow
            .take()
            .and_then(|id| self.scene.remove_arrow(id));
        let node = self
            .selection
            .node
            .take()
            .and_then(|id| self.scene.remove_node(id));
        self.history.add(EditorAction::DeleteSelection { node, arrow });
    }

    /// Undoes the most recent action. Selection is cleared because it may
    /// reference elements the undo removed.
    pub fn undo(&mut self) {
        self.commit_text_edit();
        if self.history.undo(&mut self.scene).is_some() {
            self.selection.clear();
        }
    }

    /// Redoes the most recently undone action.
    pub fn redo(&mut self) {
        self.commit_text_edit();
        if self.history.redo(&mut self.scene).is_some() {
            self.selection.clear();
        }
    }

    /// Steps zoom in one level, if possible.
    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    /// Steps zoom out one level, if possible.
    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    /// Starts editing a node's title or body text, committing any edit
    /// already in progress.
    pub fn begin_text_edit(&mut self, node_id: NodeId, region: NodeRegion) {
        self.commit_text_edit();
        let Some(node) = self.scene.nodes.get(&node_id) else {
            return;
        };
        let text = node.text();
        let current = match region {
            NodeRegion::Title | NodeRegion::Frame => Some(text.title),
            NodeRegion::Properties => text.properties,
            NodeRegion::Methods => text.methods,
        };
        let Some(current) = current else {
            return;
        };
        self.selection.clear();
        self.selection.node = Some(node_id);
        self.interaction.text_edit = Some(TextEdit {
            node_id,
            region,
            buffer: current.clone(),
            original: current,
        });
    }

    /// Commits the in-progress text edit, if any: applies the new text
    /// (resizing the node to fit) and records an [`EditorAction::EditText`]
    /// when the text actually changed.
    pub fn commit_text_edit(&mut self) {
        let Some(edit) = self.interaction.text_edit.take() else {
            return;
        };
        if edit.buffer == edit.original {
            return;
        }
        let Some(node) = self.scene.nodes.get(&edit.node_id) else {
            return;
        };
        let old = node.text();
        let mut new = old.clone();
        match edit.region {
            NodeRegion::Title | NodeRegion::Frame => new.title = edit.buffer,
            NodeRegion::Properties => new.properties = Some(edit.buffer),
            NodeRegion::Methods => new.methods = Some(edit.buffer),
        }
        self.scene.set_node_text(edit.node_id, &new);
        self.history.add(EditorAction::EditText {
            node_id: edit.node_id,
            old,
            new,
        });
    }
}

/// The node a target belongs to, if any.
pub fn target_node(target: Target) -> Option<NodeId> {
    match target {
        Target::Node(id) | Target::Title(id) | Target::Properties(id) | Target::Methods(id) => {
            Some(id)
        }
        Target::Background | Target::Arrow(_) => None,
    }
}

/// The editable region a target corresponds to, if any.
pub fn target_region(target: Target) -> Option<NodeRegion> {
    match target {
        Target::Title(_) => Some(NodeRegion::Title),
        Target::Properties(_) => Some(NodeRegion::Properties),
        Target::Methods(_) => Some(NodeRegion::Methods),
        _ => None,
    }
}
