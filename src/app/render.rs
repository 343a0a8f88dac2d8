use eframe::egui;

use crate::geometry::{Point, Rect};
use crate::surface::{Pen, Rgba, Surface};

const LABEL_FONT_SIZE: f32 = 15.0;

/// Draws canvas primitives with an egui painter, offsetting canvas
/// coordinates by the panel's top-left corner.
pub(super) struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
}

impl<'a> PainterSurface<'a> {
    pub(super) fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self { painter, origin }
    }

    fn pos(&self, p: Point) -> egui::Pos2 {
        self.origin + egui::vec2(p.x, p.y)
    }

    fn rect(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_size(self.pos(r.min), egui::vec2(r.size.width, r.size.height))
    }
}

fn color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn stroke(pen: Pen) -> egui::Stroke {
    egui::Stroke::new(pen.width, color32(pen.color))
}

pub(super) fn to_canvas(origin: egui::Pos2, p: egui::Pos2) -> Point {
    let v = p - origin;
    Point::new(v.x, v.y)
}

impl Surface for PainterSurface<'_> {
    fn draw_line(&mut self, from: Point, to: Point, pen: Pen) {
        self.painter
            .line_segment([self.pos(from), self.pos(to)], stroke(pen));
    }

    fn draw_polygon(&mut self, points: &[Point], pen: Pen, fill: Option<Rgba>) {
        let points = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(egui::Shape::convex_polygon(
            points,
            fill.map(color32).unwrap_or(egui::Color32::TRANSPARENT),
            stroke(pen),
        ));
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, pen: Pen, fill: Option<Rgba>) {
        let r = self.rect(rect);
        if let Some(fill) = fill {
            self.painter.rect_filled(r, radius, color32(fill));
        }
        self.painter
            .rect_stroke(r, radius, stroke(pen), egui::StrokeKind::Middle);
    }

    fn draw_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, pen: Pen, fill: Option<Rgba>) {
        let center = self.pos(center);
        let radius = egui::vec2(radius_x, radius_y);
        if let Some(fill) = fill {
            self.painter
                .add(egui::Shape::ellipse_filled(center, radius, color32(fill)));
        }
        self.painter
            .add(egui::Shape::ellipse_stroke(center, radius, stroke(pen)));
    }

    fn draw_text(&mut self, rect: Rect, text: &str, color: Rgba) {
        self.painter.text(
            self.rect(rect).center(),
            egui::Align2::CENTER_CENTER,
            text,
            egui::FontId::proportional(LABEL_FONT_SIZE),
            color32(color),
        );
    }
}

pub(super) fn draw_background(painter: &egui::Painter, rect: egui::Rect) {
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(250));
    let grid_color = egui::Color32::from_gray(228);
    let spacing = 32.0;
    let mut x = rect.min.x;
    while x < rect.max.x {
        painter.line_segment(
            [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
            egui::Stroke::new(1.0, grid_color),
        );
        x += spacing;
    }
    let mut y = rect.min.y;
    while y < rect.max.y {
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            egui::Stroke::new(1.0, grid_color),
        );
        y += spacing;
    }
}
