//! User interface components and rendering logic for the diagram editor.
//!
//! This module contains all the UI-related code including the main application
//! struct, canvas rendering, pointer event retargeting, and file operations.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main CanvasApp
//! - `dispatch` - Zoom transform and pointer event retargeting
//! - `canvas` - Gesture handling: selection, dragging, tool actions
//! - `rendering` - Drawing nodes, arrows, and end-cap glyphs
//! - `undo` - Reversible editor actions and the bounded history
//! - `file_ops` - Save/load dialogs and result plumbing
//! - `export` - SVG and PNG export

mod canvas;
mod dispatch;
mod export;
mod file_ops;
mod rendering;
mod state;
mod undo;

#[cfg(test)]
mod tests;

pub use dispatch::{
    DispatchedEvent, InputRedispatcher, PointerKind, RawPointerEvent, Target, ZoomTransform,
};
pub use export::build_svg;
pub use state::{CanvasApp, Selection, Tool};
pub use undo::{ActionHistory, ActionId, EditorAction};

use crate::types::NodeRegion;
use eframe::egui;

/// Toolbar order of the editing tools.
const TOOLBAR_TOOLS: [Tool; 7] = [
    Tool::Select,
    Tool::Class,
    Tool::Interface,
    Tool::Inherits,
    Tool::Implements,
    Tool::Aggregates,
    Tool::Composes,
];

impl eframe::App for CanvasApp {
    /// Persist the scene between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.scene.to_json() {
            Ok(json) => storage.set_string("scene", json),
            Err(err) => log::error!("Failed to serialize scene: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_undo_redo_keys(ctx);
        self.handle_delete_key(ctx);
        self.handle_file_shortcuts(ctx);
        self.handle_zoom_keys(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            // The drawing surface is at least the default logical canvas at
            // the current scale, so zooming in gives room to pan into.
            let surface = egui::vec2(
                (crate::constants::CANVAS_WIDTH * self.zoom.scale()) as f32,
                (crate::constants::CANVAS_HEIGHT * self.zoom.scale()) as f32,
            )
            .max(ui.available_size());
            let (response, painter) = ui.allocate_painter(surface, egui::Sense::click_and_drag());
            self.handle_canvas_input(ui, &response);
            self.render_scene(&painter, response.rect);
            self.draw_text_edit_overlay(ctx, response.rect);
        });
    }
}

impl CanvasApp {
    /// Handles undo/redo keyboard shortcuts.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift) {
            self.undo();
        } else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.redo();
        }
    }

    /// Handles the delete key for removing the current selection.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.delete_selection();
        }
    }

    /// Handles file-related keyboard shortcuts: New, Open, Save, and Save As.
    /// Uses the platform-standard Command (macOS) or Control modifier.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| {
            let cmd = i.modifiers.command;
            if i.key_pressed(egui::Key::S) && cmd && i.modifiers.shift {
                self.save_as_diagram();
            } else if i.key_pressed(egui::Key::S) && cmd {
                self.save_diagram();
            }
            if i.key_pressed(egui::Key::O) && cmd {
                self.open_diagram();
            }
            if i.key_pressed(egui::Key::N) && cmd {
                self.new_diagram();
            }
        });
    }

    /// Handles zoom keyboard shortcuts: Ctrl+Plus and Ctrl+Minus.
    fn handle_zoom_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| {
            let cmd = i.modifiers.command;
            if cmd && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)) {
                self.zoom_in();
            }
            if cmd && i.key_pressed(egui::Key::Minus) {
                self.zoom_out();
            }
        });
    }

    /// Renders the toolbar with tools, history, zoom, and file operations.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_diagram();
            }
            if ui.button("Open").clicked() {
                self.open_diagram();
            }
            if ui.button("Save").clicked() {
                self.save_diagram();
            }
            if ui.button("Save As").clicked() {
                self.save_as_diagram();
            }
            ui.menu_button("Export", |ui| {
                if ui.button("SVG").clicked() {
                    self.export_svg();
                    ui.close();
                }
                if ui.button("PNG").clicked() {
                    self.export_png();
                    ui.close();
                }
            });

            ui.separator();

            for tool in TOOLBAR_TOOLS {
                if ui.selectable_label(self.tool == tool, tool.label()).clicked() {
                    if self.tool != tool {
                        self.commit_text_edit();
                    }
                    self.tool = tool;
                }
            }

            ui.separator();

            ui.add_enabled_ui(self.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.undo();
                }
            });
            ui.add_enabled_ui(self.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.redo();
                }
            });

            ui.separator();

            ui.add_enabled_ui(self.can_zoom_out(), |ui| {
                if ui.button("-").clicked() {
                    self.zoom_out();
                }
            });
            ui.label(format!("{:.0}%", self.zoom.scale() * 100.0));
            ui.add_enabled_ui(self.can_zoom_in(), |ui| {
                if ui.button("+").clicked() {
                    self.zoom_in();
                }
            });

            ui.separator();
            ui.checkbox(&mut self.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let status = if self.is_dirty() { "*" } else { "" };
                match &self.file.current_path {
                    Some(path) => ui.label(format!("{}{}", path, status)),
                    None => ui.label(format!("Untitled{}", status)),
                };
            });
        });
    }

    /// Floating text editor for the node field being edited, anchored over
    /// the node on the canvas. Enter commits a title edit, Escape discards,
    /// and losing focus commits.
    fn draw_text_edit_overlay(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let anchor = match &self.interaction.text_edit {
            Some(edit) => match self.scene.nodes.get(&edit.node_id) {
                Some(node) => {
                    let translate = self.content_translate();
                    self.logical_to_screen(node.position + translate, canvas_rect.min)
                }
                None => {
                    self.interaction.text_edit = None;
                    return;
                }
            },
            None => return,
        };

        let mut commit = false;
        let mut cancel = false;
        if let Some(edit) = &mut self.interaction.text_edit {
            let multiline = !matches!(edit.region, NodeRegion::Title | NodeRegion::Frame);
            egui::Area::new(egui::Id::new("node_text_edit"))
                .fixed_pos(anchor)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    let response = if multiline {
                        ui.add(egui::TextEdit::multiline(&mut edit.buffer).desired_rows(3))
                    } else {
                        ui.add(egui::TextEdit::singleline(&mut edit.buffer))
                    };
                    response.request_focus();
                    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        cancel = true;
                    } else if !multiline && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        commit = true;
                    } else if response.lost_focus() {
                        commit = true;
                    }
                });
        }

        if cancel {
            self.interaction.text_edit = None;
        } else if commit {
            self.commit_text_edit();
        }
    }
}
