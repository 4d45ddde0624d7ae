//! File operations for saving and loading diagrams.
//!
//! Dialogs run on async tasks via `rfd` and report back to the UI thread
//! through the channel in [`FileState`](super::state::FileState).

use super::state::{CanvasApp, FileOperationResult, PendingFileOperation};
use crate::types::Scene;
use eframe::egui;

impl CanvasApp {
    /// Handles pending file operations.
    ///
    /// Processes completed async file operations from the channel, then
    /// initiates any operation requested this frame. Save operations capture
    /// the scene snapshot and history token at initiation time, so edits made
    /// while a dialog is open do not leak into the saved file or the save
    /// marker.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            match result {
                FileOperationResult::SaveCompleted(path, saved_action) => {
                    self.file.current_path = Some(path);
                    self.file.last_saved_action = saved_action;
                    log::info!("Diagram saved");
                }
                FileOperationResult::LoadCompleted(path, content) => {
                    match Scene::from_json(&content) {
                        Ok(scene) => {
                            self.scene = scene;
                            self.file.current_path = Some(path);
                            self.history.clear();
                            self.file.last_saved_action = None;
                            self.selection.clear();
                            self.interaction = Default::default();
                            log::info!("Diagram loaded");
                        }
                        Err(e) => {
                            log::error!("Failed to parse diagram: {}", e);
                        }
                    }
                }
                FileOperationResult::ExportCompleted(path) => {
                    log::info!("Diagram exported to {}", path);
                }
                FileOperationResult::OperationFailed(error) => {
                    log::error!("File operation failed: {}", error);
                }
            }
        }

        let Some(op) = self.file.pending.take() else {
            return;
        };

        match op {
            PendingFileOperation::SaveAs => {
                let ctx = ctx.clone();
                let json = self.scene.to_json().unwrap_or_default();
                let saved_action = self.history.last_performed();
                let sender = self.file.sender.clone();

                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .set_file_name("diagram.json")
                        .save_file()
                        .await
                    {
                        let path = handle.path();
                        match std::fs::write(path, json) {
                            Ok(_) => {
                                let _ = sender.send(FileOperationResult::SaveCompleted(
                                    path.display().to_string(),
                                    saved_action,
                                ));
                            }
                            Err(e) => {
                                let _ = sender.send(FileOperationResult::OperationFailed(
                                    format!("Failed to save file: {}", e),
                                ));
                            }
                        }
                    }
                    ctx.request_repaint();
                });
            }
            PendingFileOperation::Save => {
                if let Some(path) = self.file.current_path.clone() {
                    let ctx = ctx.clone();
                    let json = self.scene.to_json().unwrap_or_default();
                    let saved_action = self.history.last_performed();
                    let sender = self.file.sender.clone();

                    tokio::spawn(async move {
                        match std::fs::write(&path, json) {
                            Ok(_) => {
                                let _ = sender.send(FileOperationResult::SaveCompleted(
                                    path,
                                    saved_action,
                                ));
                            }
                            Err(e) => {
                                let _ = sender.send(FileOperationResult::OperationFailed(
                                    format!("Failed to save file: {}", e),
                                ));
                            }
                        }
                        ctx.request_repaint();
                    });
                } else {
                    self.file.pending = Some(PendingFileOperation::SaveAs);
                }
            }
            PendingFileOperation::Open => {
                let ctx = ctx.clone();
                let sender = self.file.sender.clone();

                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file()
                        .await
                    {
                        let path = handle.path();
                        match std::fs::read_to_string(path) {
                            Ok(json) => {
                                let _ = sender.send(FileOperationResult::LoadCompleted(
                                    path.display().to_string(),
                                    json,
                                ));
                            }
                            Err(e) => {
                                let _ = sender.send(FileOperationResult::OperationFailed(
                                    format!("Failed to read file: {}", e),
                                ));
                            }
                        }
                    }
                    ctx.request_repaint();
                });
            }
            PendingFileOperation::ExportSvg => self.start_svg_export(ctx),
            PendingFileOperation::ExportPng => self.start_png_export(ctx),
        }
    }

    /// Opens a file dialog to save the diagram with a new name.
    pub fn save_as_diagram(&mut self) {
        self.file.pending = Some(PendingFileOperation::SaveAs);
    }

    /// Saves the diagram to the current file path, or triggers "Save As" if no path is set.
    pub fn save_diagram(&mut self) {
        if self.file.current_path.is_some() {
            self.file.pending = Some(PendingFileOperation::Save);
        } else {
            self.save_as_diagram();
        }
    }

    /// Opens a file dialog to load a diagram from disk.
    pub fn open_diagram(&mut self) {
        self.file.pending = Some(PendingFileOperation::Open);
    }

    /// Requests an SVG export behind a path dialog.
    pub fn export_svg(&mut self) {
        self.file.pending = Some(PendingFileOperation::ExportSvg);
    }

    /// Requests a PNG export behind a path dialog.
    pub fn export_png(&mut self) {
        self.file.pending = Some(PendingFileOperation::ExportPng);
    }

    /// Creates a new empty diagram, resetting all editor state.
    pub fn new_diagram(&mut self) {
        self.scene = Scene::new();
        self.history.clear();
        self.selection.clear();
        self.interaction = Default::default();
        self.file.current_path = None;
        self.file.last_saved_action = None;
        self.view_offset = egui::Vec2::ZERO;
    }
}
