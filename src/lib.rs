//! # UML Canvas
//!
//! A visual UML diagram editor with zoomable canvas, auto-routed relationship
//! arrows, and multi-level undo. Diagrams are built from class and interface
//! nodes connected by the standard UML relationships:
//! - **Inherits from**: solid line with a hollow triangle head
//! - **Implements interface**: dashed line with a hollow triangle head
//! - **Aggregate of**: solid line with a hollow diamond head
//! - **Composed of**: solid line with a filled diamond head
//!
//! ## Features
//! - Interactive node creation, selection, and repositioning
//! - Discrete zoom levels with zoom-aware pointer retargeting
//! - Automatic Manhattan arrow routing between node edges
//! - In-place text editing with resize-to-fit
//! - Bounded undo/redo history and save-state tracking
//! - SVG and PNG export

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod geometry;
mod routing;
mod types;
mod ui;

// Re-export public types and functions
pub use geometry::{Point, Rect, Size};
pub use routing::{closest_mount_pair, compute_route, route_contains};
pub use types::*;
pub use ui::{ActionHistory, CanvasApp, EditorAction, Tool, ZoomTransform};

/// Runs the diagram editor with default settings.
///
/// Initializes the egui application window and starts the main event loop.
/// A scene persisted by a previous session is restored from storage.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an
/// `eframe::Error` if initialization fails.
///
/// # Example
///
/// ```no_run
/// use uml_canvas::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "UML Canvas",
        options,
        Box::new(|cc| {
            let mut app = CanvasApp::new();
            if let Some(json) = cc.storage.and_then(|s| s.get_string("scene")) {
                match Scene::from_json(&json) {
                    Ok(scene) => app.scene = scene,
                    Err(e) => log::warn!("Ignoring stored scene: {}", e),
                }
            }
            Ok(Box::new(app))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_default() {
        let scene = Scene::new();
        assert!(scene.nodes.is_empty());
        assert!(scene.arrows.is_empty());
    }

    #[test]
    fn test_new_node_starts_at_minimum_size() {
        let node = ShapeNode::new(NodeKind::Plain, Point::new(10.0, 20.0));
        assert_eq!(node.size.width, 150.0);
        assert_eq!(node.size.height, 70.0);
    }
}
