//! The drawing side of the editor's contract with its host.
//!
//! The canvas never talks to a toolkit directly. It renders into anything
//! implementing [`Surface`]; the desktop shell adapts an egui painter, and
//! tests use [`CommandList`] to capture what would have been drawn.

use crate::geometry::{Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(30, 30, 30);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRAY: Self = Self::rgb(120, 120, 120);
    pub const RED: Self = Self::rgb(220, 40, 40);
    pub const BLUE: Self = Self::rgb(40, 90, 200);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen {
    pub color: Rgba,
    pub width: f32,
}

impl Pen {
    pub const fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Rgba::BLACK, 2.0)
    }
}

pub trait Surface {
    fn draw_line(&mut self, from: Point, to: Point, pen: Pen);

    /// Closed polygon through `points`, filled when `fill` is set.
    fn draw_polygon(&mut self, points: &[Point], pen: Pen, fill: Option<Rgba>);

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, pen: Pen, fill: Option<Rgba>);

    fn draw_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, pen: Pen, fill: Option<Rgba>);

    /// Text centered horizontally and vertically inside `rect`.
    fn draw_text(&mut self, rect: Rect, text: &str, color: Rgba);
}

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        pen: Pen,
    },
    Polygon {
        points: Vec<Point>,
        pen: Pen,
        fill: Option<Rgba>,
    },
    RoundedRect {
        rect: Rect,
        radius: f32,
        pen: Pen,
        fill: Option<Rgba>,
    },
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        pen: Pen,
        fill: Option<Rgba>,
    },
    Text {
        rect: Rect,
        text: String,
        color: Rgba,
    },
}

/// A surface that records every primitive in call order.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Clone, Debug, Default)]
pub struct CommandList {
    pub commands: Vec<DrawCommand>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl CommandList {
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for CommandList {
    fn draw_line(&mut self, from: Point, to: Point, pen: Pen) {
        self.commands.push(DrawCommand::Line { from, to, pen });
    }

    fn draw_polygon(&mut self, points: &[Point], pen: Pen, fill: Option<Rgba>) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            pen,
            fill,
        });
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, pen: Pen, fill: Option<Rgba>) {
        self.commands.push(DrawCommand::RoundedRect {
            rect,
            radius,
            pen,
            fill,
        });
    }

    fn draw_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, pen: Pen, fill: Option<Rgba>) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            pen,
            fill,
        });
    }

    fn draw_text(&mut self, rect: Rect, text: &str, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            rect,
            text: text.to_string(),
            color,
        });
    }
}
