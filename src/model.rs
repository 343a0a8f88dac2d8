use std::{fmt, str::FromStr};

use crate::error::{ArrowError, DiagramError};
use crate::geometry::{self, Point, Rect, Size};
use crate::surface::{Pen, Rgba, Surface};

/// Every shape carries exactly this many connection nodes.
pub const NODE_COUNT: usize = 4;
/// Pointer distance (exclusive) at which a node counts as hit.
pub const NODE_RADIUS: f32 = 8.0;
/// Side of the square delete glyph in a hovered shape's top-left corner.
pub const DELETE_GLYPH_SIZE: f32 = 16.0;
/// Pointer distance (exclusive) at which an arrow's line counts as hit.
pub const ARROW_HIT_THRESHOLD: f32 = 5.0;

const ARROWHEAD_LENGTH: f32 = 15.0;
const ARROWHEAD_SPREAD_DEGREES: f32 = 30.0;
const TERMINATOR_CORNER_RADIUS: f32 = 40.0;
const IO_SKEW: f32 = 10.0;

const SHAPE_FILL: Rgba = Rgba::rgb(235, 242, 255);
const ACTIVE_NODE_FILL: Rgba = Rgba::RED;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Process,
    Decision,
    Terminator,
    Io,
}

/// Outline geometry of a shape, in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Outline {
    Polygon(Vec<Point>),
    RoundedRect { rect: Rect, radius: f32 },
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Process,
        ShapeKind::Decision,
        ShapeKind::Terminator,
        ShapeKind::Io,
    ];

    /// Persisted name, also used for toolbar labels.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Process => "Process",
            ShapeKind::Decision => "Decision",
            ShapeKind::Terminator => "Terminator",
            ShapeKind::Io => "IO",
        }
    }

    pub fn default_size(self) -> Size {
        match self {
            ShapeKind::Decision => Size::new(130.0, 130.0),
            ShapeKind::Process | ShapeKind::Terminator | ShapeKind::Io => Size::new(130.0, 80.0),
        }
    }

    /// Node offsets from the shape's center, in node index order.
    pub fn node_offsets(self) -> [Point; NODE_COUNT] {
        match self {
            ShapeKind::Process | ShapeKind::Terminator => [
                Point::new(-65.0, 0.0),
                Point::new(65.0, 0.0),
                Point::new(0.0, 40.0),
                Point::new(0.0, -40.0),
            ],
            ShapeKind::Decision => [
                Point::new(-65.0, 0.0),
                Point::new(65.0, 0.0),
                Point::new(0.0, 65.0),
                Point::new(0.0, -65.0),
            ],
            ShapeKind::Io => [
                Point::new(0.0, -40.0),
                Point::new(60.0, 0.0),
                Point::new(0.0, 40.0),
                Point::new(-60.0, 0.0),
            ],
        }
    }

    pub fn outline(self, bounds: Rect) -> Outline {
        match self {
            ShapeKind::Process => Outline::Polygon(bounds.corners().to_vec()),
            ShapeKind::Decision => Outline::Polygon(geometry::diamond_points(bounds)),
            ShapeKind::Terminator => Outline::RoundedRect {
                rect: bounds,
                radius: TERMINATOR_CORNER_RADIUS
                    .min(bounds.size.width * 0.5)
                    .min(bounds.size.height * 0.5),
            },
            ShapeKind::Io => Outline::Polygon(geometry::parallelogram_points(bounds, IO_SKEW)),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Process" => Ok(ShapeKind::Process),
            "Decision" => Ok(ShapeKind::Decision),
            "Terminator" => Ok(ShapeKind::Terminator),
            "IO" => Ok(ShapeKind::Io),
            other => Err(DiagramError::UnknownShapeType(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out shape ids that are never reused within a session.
#[derive(Clone, Debug)]
pub struct ShapeIds {
    next: u64,
}

impl Default for ShapeIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ShapeIds {
    pub fn allocate(&mut self) -> ShapeId {
        let id = ShapeId(self.next);
        self.next += 1;
        id
    }
}

/// Address of a node: its owning shape and its index in that shape's node
/// array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub shape: ShapeId,
    pub index: usize,
}

impl NodeRef {
    pub const fn new(shape: ShapeId, index: usize) -> Self {
        Self { shape, index }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.shape, self.index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    owner: ShapeId,
    index: usize,
    offset: Point,
}

impl Node {
    pub fn reference(&self) -> NodeRef {
        NodeRef::new(self.owner, self.index)
    }

    /// Position of the node when its owner occupies `bounds`.
    pub fn position_in(&self, bounds: Rect) -> Point {
        bounds.center() + self.offset
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    position: Point,
    size: Size,
    text: String,
    nodes: [Node; NODE_COUNT],
    locked: bool,
    active_node: Option<usize>,
    show_delete_glyph: bool,
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        let offsets = kind.node_offsets();
        Self {
            id,
            kind,
            position: Point::ZERO,
            size: kind.default_size(),
            text: String::new(),
            nodes: std::array::from_fn(|index| Node {
                owner: id,
                index,
                offset: offsets[index],
            }),
            locked: true,
            active_node: None,
            show_delete_glyph: false,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn nodes(&self) -> &[Node; NODE_COUNT] {
        &self.nodes
    }

    pub fn node_position(&self, index: usize) -> Option<Point> {
        self.nodes.get(index).map(|n| n.position_in(self.bounds()))
    }

    pub fn owns(&self, node: NodeRef) -> bool {
        node.shape == self.id && node.index < NODE_COUNT
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn active_node(&self) -> Option<NodeRef> {
        self.active_node.map(|i| self.nodes[i].reference())
    }

    pub fn shows_delete_glyph(&self) -> bool {
        self.show_delete_glyph
    }

    pub fn hit_test_body(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    pub fn delete_glyph_rect(&self) -> Rect {
        Rect::new(self.position, Size::new(DELETE_GLYPH_SIZE, DELETE_GLYPH_SIZE))
    }

    pub fn hit_test_delete_glyph(&self, p: Point) -> bool {
        self.delete_glyph_rect().contains(p)
    }

    /// Index of the node under `p`, if any.
    ///
    /// Nodes are checked in index order and every match replaces the previous
    /// one, so when hit areas overlap the highest index wins rather than the
    /// closest node.
    pub fn node_at(&self, p: Point) -> Option<usize> {
        let bounds = self.bounds();
        let mut hit = None;
        for node in &self.nodes {
            if node.position_in(bounds).distance(p) < NODE_RADIUS {
                hit = Some(node.index);
            }
        }
        hit
    }

    /// Finds the node under `p` and records it as the active node.
    pub fn hit_test_node(&mut self, p: Point) -> Option<NodeRef> {
        self.active_node = self.node_at(p);
        self.active_node()
    }

    pub fn pointer_enter(&mut self) {
        self.show_delete_glyph = true;
    }

    pub fn pointer_leave(&mut self) {
        self.show_delete_glyph = false;
        self.active_node = None;
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        let bounds = self.bounds();
        let pen = Pen::default();
        match self.kind.outline(bounds) {
            Outline::Polygon(points) => surface.draw_polygon(&points, pen, Some(SHAPE_FILL)),
            Outline::RoundedRect { rect, radius } => {
                surface.draw_rounded_rect(rect, radius, pen, Some(SHAPE_FILL))
            }
        }

        if self.shows_delete_glyph() {
            self.render_delete_glyph(surface);
        }

        if !self.text.is_empty() {
            surface.draw_text(bounds, &self.text, Rgba::BLACK);
        }

        let node_pen = Pen::new(Rgba::GRAY, 1.0);
        for node in &self.nodes {
            let fill = (self.active_node == Some(node.index)).then_some(ACTIVE_NODE_FILL);
            surface.draw_ellipse(node.position_in(bounds), NODE_RADIUS, NODE_RADIUS, node_pen, fill);
        }
    }

    fn render_delete_glyph(&self, surface: &mut dyn Surface) {
        let rect = self.delete_glyph_rect();
        let pen = Pen::new(Rgba::RED, 1.5);
        surface.draw_rounded_rect(rect, 3.0, pen, Some(Rgba::WHITE));
        let inset = 4.0;
        let min = rect.min + Point::new(inset, inset);
        let max = rect.max() - Point::new(inset, inset);
        surface.draw_line(min, max, pen);
        surface.draw_line(Point::new(max.x, min.y), Point::new(min.x, max.y), pen);
    }
}

/// Current position of `node`, if its owner is in `shapes`.
pub fn node_position(shapes: &[Shape], node: NodeRef) -> Option<Point> {
    shapes
        .iter()
        .find(|s| s.id == node.shape)
        .and_then(|s| s.node_position(node.index))
}

/// A directed edge between two nodes. Holds addresses only; the drawn
/// geometry is recomputed from the shapes every time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arrow {
    start: NodeRef,
    end: NodeRef,
}

impl Arrow {
    pub fn new(start: NodeRef, end: NodeRef) -> Result<Self, ArrowError> {
        if start == end {
            return Err(ArrowError::SameNode(start));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NodeRef {
        self.start
    }

    pub fn end(&self) -> NodeRef {
        self.end
    }

    pub fn references_node(&self, node: NodeRef) -> bool {
        self.start == node || self.end == node
    }

    pub fn endpoints(&self, shapes: &[Shape]) -> Option<(Point, Point)> {
        Some((node_position(shapes, self.start)?, node_position(shapes, self.end)?))
    }

    /// True when `p` lies closer than `threshold` to the infinite line
    /// through both endpoints. An arrow whose endpoints coincide never hits.
    pub fn hit_test(&self, shapes: &[Shape], p: Point, threshold: f32) -> bool {
        let Some((from, to)) = self.endpoints(shapes) else {
            return false;
        };
        geometry::distance_to_line(p, from, to).is_some_and(|d| d < threshold)
    }

    pub fn render(&self, shapes: &[Shape], surface: &mut dyn Surface) {
        if let Some((from, to)) = self.endpoints(shapes) {
            draw_arrow(surface, from, to, Pen::default());
        }
    }
}

pub fn draw_arrow(surface: &mut dyn Surface, from: Point, to: Point, pen: Pen) {
    surface.draw_line(from, to, pen);
    for barb in geometry::arrowhead(from, to, ARROWHEAD_LENGTH, ARROWHEAD_SPREAD_DEGREES.to_radians()) {
        surface.draw_line(to, barb, pen);
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::surface::{CommandList, DrawCommand};

    fn shape_at(kind: ShapeKind, x: f32, y: f32) -> Shape {
        let mut ids = ShapeIds::default();
        let mut shape = Shape::new(ids.allocate(), kind);
        shape.set_position(Point::new(x, y));
        shape
    }

    #[test]
    fn test_default_sizes() {
        assert_eq!(ShapeKind::Process.default_size(), Size::new(130.0, 80.0));
        assert_eq!(ShapeKind::Terminator.default_size(), Size::new(130.0, 80.0));
        assert_eq!(ShapeKind::Io.default_size(), Size::new(130.0, 80.0));
        assert_eq!(ShapeKind::Decision.default_size(), Size::new(130.0, 130.0));
    }

    #[test]
    fn test_kind_names_parse_back() {
        for kind in ShapeKind::ALL {
            assert_eq!(kind.name().parse::<ShapeKind>().unwrap(), kind);
        }
        assert!(matches!(
            "Hexagon".parse::<ShapeKind>(),
            Err(DiagramError::UnknownShapeType(name)) if name == "Hexagon"
        ));
        // Names are case sensitive.
        assert!("process".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn test_node_global_positions() {
        let process = shape_at(ShapeKind::Process, 100.0, 50.0);
        assert_eq!(process.node_position(0), Some(Point::new(100.0, 90.0)));
        assert_eq!(process.node_position(1), Some(Point::new(230.0, 90.0)));
        assert_eq!(process.node_position(2), Some(Point::new(165.0, 130.0)));
        assert_eq!(process.node_position(3), Some(Point::new(165.0, 50.0)));
        assert_eq!(process.node_position(4), None);

        let io = shape_at(ShapeKind::Io, 0.0, 0.0);
        assert_eq!(io.node_position(0), Some(Point::new(65.0, 0.0)));
        assert_eq!(io.node_position(1), Some(Point::new(125.0, 40.0)));
        assert_eq!(io.node_position(3), Some(Point::new(5.0, 40.0)));

        let decision = shape_at(ShapeKind::Decision, 0.0, 0.0);
        assert_eq!(decision.node_position(2), Some(Point::new(65.0, 130.0)));
        assert_eq!(decision.node_position(3), Some(Point::new(65.0, 0.0)));
    }

    #[test]
    fn test_nodes_keep_creation_order() {
        let shape = shape_at(ShapeKind::Terminator, 0.0, 0.0);
        for (i, node) in shape.nodes().iter().enumerate() {
            assert_eq!(node.reference(), NodeRef::new(shape.id(), i));
            let center = shape.bounds().center();
            assert_eq!(node.position_in(shape.bounds()) - center, ShapeKind::Terminator.node_offsets()[i]);
        }
    }

    #[test]
    fn test_node_hit_boundary_is_exclusive() {
        let mut shape = shape_at(ShapeKind::Process, 100.0, 100.0);
        let left = shape.node_position(0).unwrap();

        assert_eq!(shape.hit_test_node(left - Point::new(NODE_RADIUS, 0.0)), None);
        assert_eq!(shape.active_node(), None);

        let hit = shape.hit_test_node(left - Point::new(NODE_RADIUS - 0.01, 0.0));
        assert_eq!(hit, Some(NodeRef::new(shape.id(), 0)));
        assert_eq!(shape.active_node(), hit);
    }

    #[test]
    fn test_node_hit_clears_when_pointer_moves_away() {
        let mut shape = shape_at(ShapeKind::Decision, 0.0, 0.0);
        let top = shape.node_position(3).unwrap();
        assert!(shape.hit_test_node(top).is_some());
        assert_eq!(shape.hit_test_node(Point::new(65.0, 65.0)), None);
        assert_eq!(shape.active_node(), None);
    }

    #[test]
    fn test_enter_and_leave_toggle_glyph() {
        let mut shape = shape_at(ShapeKind::Process, 0.0, 0.0);
        shape.pointer_enter();
        assert!(shape.shows_delete_glyph());
        shape.hit_test_node(shape.node_position(1).unwrap());
        shape.pointer_leave();
        assert!(!shape.shows_delete_glyph());
        assert_eq!(shape.active_node(), None);
    }

    #[test]
    fn test_body_and_glyph_hits() {
        let shape = shape_at(ShapeKind::Process, 10.0, 10.0);
        assert!(shape.hit_test_body(Point::new(10.0, 10.0)));
        assert!(shape.hit_test_body(Point::new(140.0, 90.0)));
        assert!(!shape.hit_test_body(Point::new(141.0, 50.0)));
        assert!(shape.hit_test_delete_glyph(Point::new(15.0, 15.0)));
        assert!(!shape.hit_test_delete_glyph(Point::new(30.0, 15.0)));
    }

    #[test]
    fn test_outlines_follow_bounds() {
        let bounds = Rect::new(Point::new(0.0, 0.0), Size::new(130.0, 130.0));
        let Outline::Polygon(diamond) = ShapeKind::Decision.outline(bounds) else {
            panic!("decision should be a polygon");
        };
        assert_eq!(diamond[0], Point::new(65.0, 0.0));
        assert_eq!(diamond[1], Point::new(130.0, 65.0));

        let small = Rect::new(Point::ZERO, Size::new(60.0, 30.0));
        let Outline::RoundedRect { radius, .. } = ShapeKind::Terminator.outline(small) else {
            panic!("terminator should be a rounded rect");
        };
        assert_approx_eq!(f32, radius, 15.0);
    }

    #[test]
    fn test_render_order() {
        let mut shape = shape_at(ShapeKind::Process, 0.0, 0.0);
        shape.set_text("Start");
        shape.pointer_enter();
        shape.hit_test_node(shape.node_position(2).unwrap());

        let mut out = CommandList::default();
        shape.render(&mut out);

        assert!(matches!(out.commands[0], DrawCommand::Polygon { .. }));
        assert!(matches!(out.commands[1], DrawCommand::RoundedRect { .. }));
        assert_eq!(out.texts().collect::<Vec<_>>(), vec!["Start"]);
        let fills: Vec<_> = out
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Ellipse { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec![None, None, Some(ACTIVE_NODE_FILL), None]);
    }

    #[test]
    fn test_arrow_rejects_same_node() {
        let shape = shape_at(ShapeKind::Process, 0.0, 0.0);
        let node = NodeRef::new(shape.id(), 1);
        assert_eq!(Arrow::new(node, node), Err(ArrowError::SameNode(node)));
    }

    #[test]
    fn test_arrow_allows_two_nodes_of_one_shape() {
        let shape = shape_at(ShapeKind::Process, 0.0, 0.0);
        let arrow = Arrow::new(NodeRef::new(shape.id(), 0), NodeRef::new(shape.id(), 1)).unwrap();
        assert_eq!(arrow.start().shape, arrow.end().shape);
        assert!(arrow.references_node(NodeRef::new(shape.id(), 1)));
        assert!(!arrow.references_node(NodeRef::new(shape.id(), 2)));
    }

    #[test]
    fn test_arrow_hit_test() {
        let mut ids = ShapeIds::default();
        let mut a = Shape::new(ids.allocate(), ShapeKind::Process);
        let mut b = Shape::new(ids.allocate(), ShapeKind::Process);
        a.set_position(Point::new(0.0, 0.0));
        b.set_position(Point::new(300.0, 0.0));
        let shapes = vec![a, b];
        // a.node[1] = (130, 40), b.node[0] = (300, 40)
        let arrow = Arrow::new(NodeRef::new(shapes[0].id(), 1), NodeRef::new(shapes[1].id(), 0)).unwrap();

        assert!(arrow.hit_test(&shapes, Point::new(200.0, 44.0), ARROW_HIT_THRESHOLD));
        assert!(!arrow.hit_test(&shapes, Point::new(200.0, 45.0), ARROW_HIT_THRESHOLD));
        assert!(!arrow.hit_test(&shapes, Point::new(200.0, 60.0), ARROW_HIT_THRESHOLD));
    }

    #[test]
    fn test_arrow_with_coinciding_endpoints_never_hits() {
        let mut ids = ShapeIds::default();
        let a = Shape::new(ids.allocate(), ShapeKind::Process);
        let b = Shape::new(ids.allocate(), ShapeKind::Process);
        let shapes = vec![a, b];
        // Both shapes sit at the origin, so node 1 of each coincides.
        let arrow = Arrow::new(NodeRef::new(shapes[0].id(), 1), NodeRef::new(shapes[1].id(), 1)).unwrap();
        let (from, to) = arrow.endpoints(&shapes).unwrap();
        assert_eq!(from, to);
        assert!(!arrow.hit_test(&shapes, from, ARROW_HIT_THRESHOLD));
        assert!(!arrow.hit_test(&shapes, Point::new(0.0, 0.0), ARROW_HIT_THRESHOLD));
    }

    #[test]
    fn test_arrow_render_draws_shaft_and_head() {
        let mut ids = ShapeIds::default();
        let a = Shape::new(ids.allocate(), ShapeKind::Process);
        let mut b = Shape::new(ids.allocate(), ShapeKind::Process);
        b.set_position(Point::new(300.0, 0.0));
        let shapes = vec![a, b];
        let arrow = Arrow::new(NodeRef::new(shapes[0].id(), 1), NodeRef::new(shapes[1].id(), 0)).unwrap();

        let mut out = CommandList::default();
        arrow.render(&shapes, &mut out);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], (Point::new(130.0, 40.0), Point::new(300.0, 40.0)));
        assert_eq!(lines[1].0, Point::new(300.0, 40.0));
        assert_approx_eq!(f32, lines[1].1.distance(lines[1].0), 15.0, epsilon = 1e-3);
    }

    #[test]
    fn test_arrow_to_missing_shape_is_not_drawn() {
        let shape = shape_at(ShapeKind::Process, 0.0, 0.0);
        let ghost = NodeRef::new(ShapeId(99), 0);
        let arrow = Arrow::new(NodeRef::new(shape.id(), 0), ghost).unwrap();
        let shapes = vec![shape];
        let mut out = CommandList::default();
        arrow.render(&shapes, &mut out);
        assert!(out.commands.is_empty());
        assert!(!arrow.hit_test(&shapes, Point::ZERO, ARROW_HIT_THRESHOLD));
    }
}
