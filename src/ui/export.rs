//! Export utilities: render the current scene to SVG and PNG.
//!
//! The SVG string is built directly from scene geometry, so it matches the
//! canvas rendering without depending on a live egui context. PNG export
//! rasterizes that SVG through `usvg`/`resvg`.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::constants;
use crate::geometry::Point;
use crate::routing;
use crate::types::{Scene, ShapeNode, StrokeStyle};

use super::state::{CanvasApp, FileOperationResult};

/// Whitespace around the scene content in exported images.
const EXPORT_MARGIN: f64 = 20.0;

impl CanvasApp {
    /// Renders the scene to SVG and opens a save dialog for it.
    pub(super) fn start_svg_export(&self, ctx: &eframe::egui::Context) {
        let ctx = ctx.clone();
        let (svg, _, _) = build_svg(&self.scene);
        let sender = self.file.sender.clone();

        tokio::spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("SVG", &["svg"])
                .set_file_name("diagram.svg")
                .save_file()
                .await
            {
                let path = handle.path();
                match std::fs::write(path, svg.as_bytes()) {
                    Ok(_) => {
                        let _ = sender.send(FileOperationResult::ExportCompleted(
                            path.display().to_string(),
                        ));
                    }
                    Err(e) => {
                        let _ = sender.send(FileOperationResult::OperationFailed(
                            format!("Failed to save SVG: {}", e),
                        ));
                    }
                }
            }
            ctx.request_repaint();
        });
    }

    /// Rasterizes the scene to PNG and opens a save dialog for it.
    pub(super) fn start_png_export(&self, ctx: &eframe::egui::Context) {
        let (svg, width, height) = build_svg(&self.scene);

        let mut opt = usvg::Options::default();
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        opt.fontdb = Arc::new(db);

        let tree = match usvg::Tree::from_data(svg.as_bytes(), &opt) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Failed to parse SVG for PNG export: {}", e);
                return;
            }
        };

        let mut pixmap = match tiny_skia::Pixmap::new(width.max(1), height.max(1)) {
            Some(p) => p,
            None => {
                log::error!("Failed to create pixmap {}x{}", width, height);
                return;
            }
        };
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        tokio::spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("PNG", &["png"])
                .set_file_name("diagram.png")
                .save_file()
                .await
            {
                let path = handle.path();
                match pixmap.save_png(path) {
                    Ok(_) => {
                        let _ = sender.send(FileOperationResult::ExportCompleted(
                            path.display().to_string(),
                        ));
                    }
                    Err(e) => {
                        let _ = sender.send(FileOperationResult::OperationFailed(
                            format!("Failed to save PNG: {}", e),
                        ));
                    }
                }
            }
            ctx.request_repaint();
        });
    }
}

/// Builds an SVG document for the scene. Returns (svg, width, height).
pub fn build_svg(scene: &Scene) -> (String, u32, u32) {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut extend = |p: Point| {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    };

    for node in scene.nodes.values() {
        let rect = node.rect();
        extend(rect.pos);
        extend(Point::new(rect.right(), rect.bottom()));
    }
    for arrow in scene.arrows.values() {
        for &p in &arrow.route {
            extend(p);
        }
    }
    if !min.x.is_finite() {
        min = Point::new(0.0, 0.0);
        max = Point::new(constants::MIN_NODE_WIDTH, constants::MIN_NODE_HEIGHT);
    }

    let width = ((max.x - min.x) + 2.0 * EXPORT_MARGIN).ceil().max(1.0) as u32;
    let height = ((max.y - min.y) + 2.0 * EXPORT_MARGIN).ceil().max(1.0) as u32;
    let map = |p: Point| Point::new(p.x - min.x + EXPORT_MARGIN, p.y - min.y + EXPORT_MARGIN);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        width, height, width, height
    );
    let _ = writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\" />",
        width, height
    );

    for arrow in scene.arrows.values() {
        if arrow.route.len() < 2 {
            continue;
        }
        let mut points = String::new();
        for &p in &arrow.route {
            let p = map(p);
            let _ = write!(points, "{:.1},{:.1} ", p.x, p.y);
        }
        let dash = match arrow.stroke {
            StrokeStyle::Solid => String::new(),
            StrokeStyle::Dashed => format!(
                " stroke-dasharray=\"{:.1}\"",
                constants::DASH_LENGTH
            ),
        };
        let _ = writeln!(
            out,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"#000000\" stroke-width=\"{:.1}\"{} />",
            points.trim_end(),
            constants::ARROW_THICKNESS,
            dash
        );

        if let Some(glyph) = routing::cap_glyph(
            arrow.cap,
            &arrow.route,
            constants::CAP_LENGTH,
            constants::CAP_HALF_WIDTH,
        ) {
            let mut points = String::new();
            for &p in &glyph.points {
                let p = map(p);
                let _ = write!(points, "{:.1},{:.1} ", p.x, p.y);
            }
            let points = points.trim_end();
            if glyph.closed {
                let fill = if glyph.filled { "#000000" } else { "#ffffff" };
                let _ = writeln!(
                    out,
                    "<polygon points=\"{}\" fill=\"{}\" stroke=\"#000000\" stroke-width=\"{:.1}\" />",
                    points,
                    fill,
                    constants::ARROW_THICKNESS
                );
            } else {
                let _ = writeln!(
                    out,
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"#000000\" stroke-width=\"{:.1}\" />",
                    points,
                    constants::ARROW_THICKNESS
                );
            }
        }
    }

    for node in scene.nodes.values() {
        write_node_svg(&mut out, node, map);
    }

    let _ = writeln!(out, "</svg>");
    (out, width, height)
}

/// Writes a node's frame, title band and body lines.
fn write_node_svg(out: &mut String, node: &ShapeNode, map: impl Fn(Point) -> Point) {
    let rect = node.rect();
    let pos = map(rect.pos);
    let _ = writeln!(
        out,
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"#ffffff\" stroke=\"#000000\" stroke-width=\"2\" />",
        pos.x, pos.y, rect.size.width, rect.size.height
    );

    let title_height = constants::LINE_HEIGHT + constants::TEXT_PADDING_Y;
    let _ = writeln!(
        out,
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" fill=\"#000000\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
        pos.x + rect.size.width / 2.0,
        pos.y + title_height / 2.0,
        escape_xml(&node.title)
    );

    let bands = node.body_texts();
    if bands.is_empty() {
        return;
    }
    let band_height = (rect.size.height - title_height) / bands.len() as f64;
    for (i, text) in bands.iter().enumerate() {
        let band_top = pos.y + title_height + band_height * i as f64;
        let _ = writeln!(
            out,
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#000000\" />",
            pos.x,
            band_top,
            pos.x + rect.size.width,
            band_top
        );
        for (line_index, line) in text.lines().enumerate() {
            let _ = writeln!(
                out,
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#000000\">{}</text>",
                pos.x + constants::TEXT_PADDING_X,
                band_top + constants::TEXT_PADDING_Y
                    + constants::LINE_HEIGHT * (line_index as f64 + 0.5),
                escape_xml(line)
            );
        }
    }
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EndCapStyle, NodeKind};

    #[test]
    fn test_empty_scene_produces_minimal_document() {
        let (svg, width, height) = build_svg(&Scene::new());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(width, constants::MIN_NODE_WIDTH as u32 + 40);
        assert_eq!(height, constants::MIN_NODE_HEIGHT as u32 + 40);
    }

    #[test]
    fn test_nodes_and_arrows_appear_in_output() {
        let mut scene = Scene::new();
        let a = ShapeNode::new(NodeKind::Plain, Point::new(100.0, 100.0));
        let b = ShapeNode::new(NodeKind::Plain, Point::new(500.0, 100.0));
        let (a_id, b_id) = (a.id, b.id);
        scene.add_node(a);
        scene.add_node(b);
        let arrow = scene
            .add_arrow(a_id, b_id, StrokeStyle::Dashed, EndCapStyle::Triangle)
            .unwrap();
        assert!(scene.arrows.contains_key(&arrow));

        let (svg, _, _) = build_svg(&scene);
        assert_eq!(svg.matches("<rect").count(), 3, "background plus two frames");
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("<polygon"), "triangle cap rendered as polygon");
    }

    #[test]
    fn test_titles_are_escaped() {
        let mut scene = Scene::new();
        let mut node = ShapeNode::new(NodeKind::Plain, Point::new(0.0, 0.0));
        node.title = "A<B>&C".to_string();
        scene.add_node(node);

        let (svg, _, _) = build_svg(&scene);
        assert!(svg.contains("A&lt;B&gt;&amp;C"));
        assert!(!svg.contains("A<B>"));
    }
}
