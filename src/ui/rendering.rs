//! Canvas rendering: nodes, arrows, end caps, and selection highlights.
//!
//! All geometry lives in logical space; every screen coordinate goes through
//! the zoom transform at paint time. If the scene extends into negative
//! logical coordinates (possible after a resize-to-fit grows a node at the
//! origin leftwards or an undo restores an off-canvas position), the painter
//! translates first so nothing is clipped.

use super::state::CanvasApp;
use crate::constants;
use crate::geometry::{Point, Rect};
use crate::routing;
use crate::types::{Arrow, NodeKind, ShapeNode, StrokeStyle};
use eframe::egui;
use eframe::epaint::StrokeKind;

impl CanvasApp {
    /// Renders every scene element onto the canvas.
    ///
    /// Arrows are drawn first so nodes sit above them; the in-flight
    /// relationship preview and selection highlights go on top.
    pub fn render_scene(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let translate = self.content_translate();

        for arrow in self.scene.arrows.values() {
            let selected = self.selection.arrow == Some(arrow.id);
            self.draw_arrow(painter, canvas_rect, translate, arrow, selected);
        }

        if let (Some(from), Some(preview)) = (
            self.interaction.pending_arrow_from,
            self.interaction.arrow_preview_point,
        ) {
            if let Some(node) = self.scene.nodes.get(&from) {
                let start = self.to_screen(node.rect().center(), canvas_rect, translate);
                let end = self.to_screen(preview, canvas_rect, translate);
                painter.line_segment(
                    [start, end],
                    egui::Stroke::new(1.0, egui::Color32::from_gray(140)),
                );
            }
        }

        for node in self.scene.nodes.values() {
            let selected = self.selection.node == Some(node.id);
            self.draw_node(painter, canvas_rect, translate, node, selected);
        }
    }

    /// Translation applied before scaling so negative logical coordinates
    /// still land inside the painted area.
    pub fn content_translate(&self) -> Point {
        let mut min = Point::default();
        for node in self.scene.nodes.values() {
            min.x = min.x.min(node.position.x);
            min.y = min.y.min(node.position.y);
        }
        for arrow in self.scene.arrows.values() {
            let bounds = arrow.bounds();
            min.x = min.x.min(bounds.pos.x);
            min.y = min.y.min(bounds.pos.y);
        }
        Point::new(-min.x.min(0.0), -min.y.min(0.0))
    }

    fn to_screen(&self, logical: Point, canvas_rect: egui::Rect, translate: Point) -> egui::Pos2 {
        self.logical_to_screen(logical + translate, canvas_rect.min)
    }

    fn draw_arrow(
        &self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        translate: Point,
        arrow: &Arrow,
        selected: bool,
    ) {
        if arrow.route.len() < 2 {
            return;
        }
        let scale = self.zoom.scale() as f32;
        let color = if selected {
            egui::Color32::from_rgb(100, 150, 255)
        } else if self.dark_mode {
            egui::Color32::from_gray(200)
        } else {
            egui::Color32::from_gray(40)
        };
        let stroke = egui::Stroke::new(constants::ARROW_THICKNESS * scale, color);

        let points: Vec<egui::Pos2> = arrow
            .route
            .iter()
            .map(|p| self.to_screen(*p, canvas_rect, translate))
            .collect();
        match arrow.stroke {
            StrokeStyle::Solid => {
                painter.add(egui::Shape::line(points, stroke));
            }
            StrokeStyle::Dashed => {
                let dash = constants::DASH_LENGTH * scale;
                for pair in points.windows(2) {
                    painter.extend(egui::Shape::dashed_line(pair, stroke, dash, dash));
                }
            }
        }

        if let Some(glyph) = routing::cap_glyph(
            arrow.cap,
            &arrow.route,
            constants::CAP_LENGTH,
            constants::CAP_HALF_WIDTH,
        ) {
            let glyph_points: Vec<egui::Pos2> = glyph
                .points
                .iter()
                .map(|p| self.to_screen(*p, canvas_rect, translate))
                .collect();
            let background = if self.dark_mode {
                egui::Color32::from_gray(30)
            } else {
                egui::Color32::WHITE
            };
            if glyph.closed {
                let fill = if glyph.filled { color } else { background };
                painter.add(egui::Shape::convex_polygon(glyph_points, fill, stroke));
            } else {
                painter.add(egui::Shape::line(glyph_points, stroke));
            }
        }
    }

    fn draw_node(
        &self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        translate: Point,
        node: &ShapeNode,
        selected: bool,
    ) {
        let scale = self.zoom.scale() as f32;
        let rect = node.rect();
        let min = self.to_screen(rect.pos, canvas_rect, translate);
        let max = self.to_screen(Point::new(rect.right(), rect.bottom()), canvas_rect, translate);
        let screen_rect = egui::Rect::from_min_max(min, max);

        let fill = if self.dark_mode {
            egui::Color32::from_gray(45)
        } else {
            egui::Color32::WHITE
        };
        let outline_color = if selected {
            egui::Color32::from_rgb(100, 150, 255)
        } else if self.dark_mode {
            egui::Color32::from_gray(200)
        } else {
            egui::Color32::BLACK
        };
        painter.rect_filled(screen_rect, 0.0, fill);
        painter.rect_stroke(
            screen_rect,
            0.0,
            egui::Stroke::new(if selected { 2.0 } else { 1.0 } * scale, outline_color),
            StrokeKind::Inside,
        );

        let text_color = if self.dark_mode {
            egui::Color32::from_gray(230)
        } else {
            egui::Color32::BLACK
        };
        let title_font = egui::FontId::proportional((13.0 * scale).clamp(6.0, 32.0));
        let body_font = egui::FontId::monospace((12.0 * scale).clamp(6.0, 30.0));

        // Title centered in its band at the top.
        let title_height = (constants::LINE_HEIGHT + constants::TEXT_PADDING_Y) as f32 * scale;
        let title_center = egui::pos2(
            screen_rect.center().x,
            screen_rect.min.y + title_height / 2.0,
        );
        painter.text(
            title_center,
            egui::Align2::CENTER_CENTER,
            &node.title,
            title_font,
            text_color,
        );

        // Body bands with separator lines, mirroring the hit-test layout.
        let bands = body_bands(node, rect);
        for (band_top, text) in bands {
            let separator_y = self
                .to_screen(Point::new(rect.pos.x, band_top), canvas_rect, translate)
                .y;
            painter.line_segment(
                [
                    egui::pos2(screen_rect.min.x, separator_y),
                    egui::pos2(screen_rect.max.x, separator_y),
                ],
                egui::Stroke::new(1.0 * scale, outline_color.gamma_multiply(0.5)),
            );
            let text_pos = egui::pos2(
                screen_rect.min.x + constants::TEXT_PADDING_X as f32 * scale,
                separator_y + (constants::TEXT_PADDING_Y as f32 / 2.0) * scale,
            );
            painter.text(
                text_pos,
                egui::Align2::LEFT_TOP,
                text,
                body_font.clone(),
                text_color,
            );
        }
    }
}

/// Top edge (logical y) and text of each body band, top to bottom.
fn body_bands(node: &ShapeNode, rect: Rect) -> Vec<(f64, &str)> {
    let title_height = constants::LINE_HEIGHT + constants::TEXT_PADDING_Y;
    let top = rect.pos.y + title_height;
    match &node.kind {
        NodeKind::Plain => vec![],
        NodeKind::Interface { methods } => vec![(top, methods.as_str())],
        NodeKind::Class {
            properties,
            methods,
        } => {
            let body_height = rect.size.height - title_height;
            vec![
                (top, properties.as_str()),
                (top + body_height / 2.0, methods.as_str()),
            ]
        }
    }
}
