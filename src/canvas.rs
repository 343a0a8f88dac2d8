//! The interactive diagram: shapes, arrows, and the gesture state machine
//! that turns raw pointer events into edits.
//!
//! The shape list order is also the z-order. Later shapes are drawn on top
//! and win hit-tests; "bring to front" means moving a shape to the end.

use log::{debug, info, trace};

use crate::document::{self, DiagramRecord};
use crate::error::{ArrowError, DiagramError};
use crate::geometry::{Point, Size};
use crate::model::{self, ARROW_HIT_THRESHOLD, Arrow, NodeRef, Shape, ShapeId, ShapeIds, ShapeKind};
use crate::surface::{Pen, Rgba, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Press { button: PointerButton, pos: Point },
    Move { pos: Point },
    Release { button: PointerButton, pos: Point },
    DoubleClick { button: PointerButton, pos: Point },
}

/// Asks the user for a new label. `None` means the prompt was cancelled.
pub trait TextPrompt {
    fn prompt_for_text(&mut self, initial: &str) -> Option<String>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Idle,
    DraggingShape {
        shape: ShapeId,
        pointer_start: Point,
        shape_start: Point,
    },
    DrawingArrow {
        from: NodeRef,
        pointer: Point,
    },
}

/// What a pointer event did to the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Nothing,
    ShapeDeleted { shape: ShapeId, arrows_removed: usize },
    DragStarted(ShapeId),
    ShapeMoved(ShapeId),
    DragFinished(ShapeId),
    ArrowStarted(NodeRef),
    ArrowCreated { start: NodeRef, end: NodeRef },
    ArrowAbandoned(NodeRef),
    ArrowsRemoved(usize),
    /// The host should prompt for a label and hand the answer to
    /// [`Canvas::edit_label`].
    EditLabel(ShapeId),
}

#[derive(Clone, Debug)]
pub struct Canvas {
    shapes: Vec<Shape>,
    arrows: Vec<Arrow>,
    ids: ShapeIds,
    size: Size,
    gesture: Gesture,
    hovered: Option<ShapeId>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            shapes: Vec::new(),
            arrows: Vec::new(),
            ids: ShapeIds::default(),
            size,
            gesture: Gesture::Idle,
            hovered: None,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    fn shape_index(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.arrows.is_empty()
    }

    /// Adds a shape of `kind` centered in the current canvas bounds.
    pub fn add_shape(&mut self, kind: ShapeKind) -> ShapeId {
        let mut shape = Shape::new(self.ids.allocate(), kind);
        let size = shape.size();
        shape.set_position(Point::new(
            self.size.width / 2.0 - size.width / 2.0,
            self.size.height / 2.0 - size.height / 2.0,
        ));
        let id = shape.id();
        debug!(shape:% = id, kind:% = kind; "Shape added");
        self.shapes.push(shape);
        id
    }

    /// Moves a shape's top-left corner to `position`. Returns false when the
    /// shape does not exist.
    pub fn move_shape(&mut self, id: ShapeId, position: Point) -> bool {
        match self.shape_mut(id) {
            Some(shape) => {
                shape.set_position(position);
                true
            }
            None => false,
        }
    }

    pub fn bring_to_front(&mut self, id: ShapeId) {
        if let Some(idx) = self.shape_index(id) {
            let shape = self.shapes.remove(idx);
            self.shapes.push(shape);
        }
    }

    /// Removes a shape and every arrow attached to any of its nodes. Returns
    /// the number of arrows removed, or `None` if the shape was not found.
    pub fn delete_shape(&mut self, id: ShapeId) -> Option<usize> {
        let idx = self.shape_index(id)?;
        let shape = self.shapes.remove(idx);
        let before = self.arrows.len();
        self.arrows
            .retain(|arrow| !shape.nodes().iter().any(|n| arrow.references_node(n.reference())));
        let removed = before - self.arrows.len();

        if self.hovered == Some(id) {
            self.hovered = None;
        }
        let gesture_uses_shape = match self.gesture {
            Gesture::Idle => false,
            Gesture::DraggingShape { shape, .. } => shape == id,
            Gesture::DrawingArrow { from, .. } => from.shape == id,
        };
        if gesture_uses_shape {
            self.gesture = Gesture::Idle;
        }
        debug!(shape:% = id, arrows_removed = removed; "Shape deleted");
        Some(removed)
    }

    pub fn clear(&mut self) {
        info!(shapes = self.shapes.len(), arrows = self.arrows.len(); "Clearing diagram");
        self.shapes.clear();
        self.arrows.clear();
        self.gesture = Gesture::Idle;
        self.hovered = None;
    }

    /// Connects two live nodes with a new arrow.
    pub fn connect(&mut self, start: NodeRef, end: NodeRef) -> Result<(), ArrowError> {
        let arrow = Arrow::new(start, end)?;
        for node in [start, end] {
            if !self.shapes.iter().any(|s| s.owns(node)) {
                return Err(ArrowError::MissingNode(node));
            }
        }
        debug!(start:% = start, end:% = end; "Arrow created");
        self.arrows.push(arrow);
        Ok(())
    }

    /// Removes every arrow whose line passes within the hit threshold of `p`.
    pub fn remove_arrows_at(&mut self, p: Point) -> usize {
        let shapes = &self.shapes;
        let before = self.arrows.len();
        self.arrows
            .retain(|arrow| !arrow.hit_test(shapes, p, ARROW_HIT_THRESHOLD));
        let removed = before - self.arrows.len();
        if removed > 0 {
            debug!(count = removed; "Arrows removed");
        }
        removed
    }

    /// Applies a label answer: `None` or an empty string keeps the current
    /// text. Returns true if the label changed.
    pub fn apply_label(&mut self, id: ShapeId, answer: Option<&str>) -> bool {
        let Some(text) = answer.filter(|t| !t.is_empty()) else {
            return false;
        };
        match self.shape_mut(id) {
            Some(shape) => {
                shape.set_text(text);
                debug!(shape:% = id; "Label updated");
                true
            }
            None => false,
        }
    }

    /// Prompts for a new label for `id`, seeded with its current text.
    pub fn edit_label(&mut self, id: ShapeId, prompt: &mut dyn TextPrompt) -> bool {
        let Some(current) = self.shape(id).map(|s| s.text().to_string()) else {
            return false;
        };
        let answer = prompt.prompt_for_text(&current);
        self.apply_label(id, answer.as_deref())
    }

    /// Recomputes which shape is under the pointer and which of its nodes is
    /// active.
    ///
    /// A node under `p` claims the hover for its shape even where another
    /// shape's body covers it, or where the node's hit circle pokes out past
    /// its own shape's bounds. Otherwise the last shape in list order
    /// containing `p` wins.
    pub fn update_hover(&mut self, p: Point) {
        let hovered = self
            .shapes
            .iter()
            .rev()
            .find(|s| s.node_at(p).is_some())
            .or_else(|| self.shapes.iter().rev().find(|s| s.hit_test_body(p)))
            .map(Shape::id);

        let previous = self.hovered;
        if hovered != previous {
            if let Some(old) = previous.and_then(|id| self.shape_mut(id)) {
                old.pointer_leave();
            }
            if let Some(new) = hovered.and_then(|id| self.shape_mut(id)) {
                new.pointer_enter();
            }
            trace!(hovered:? = hovered; "Hover changed");
            self.hovered = hovered;
        }

        if let Some(shape) = hovered.and_then(|id| self.shape_mut(id)) {
            shape.hit_test_node(p);
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> Outcome {
        match event {
            PointerEvent::Press { button, pos } if button == PointerButton::Primary => {
                self.press(pos)
            }
            PointerEvent::Move { pos } => self.pointer_moved(pos),
            PointerEvent::Release { button, pos } if button == PointerButton::Primary => {
                self.release(pos)
            }
            PointerEvent::DoubleClick { button, pos } if button == PointerButton::Primary => {
                self.double_click(pos)
            }
            _ => Outcome::Nothing,
        }
    }

    fn press(&mut self, pos: Point) -> Outcome {
        self.update_hover(pos);
        let Some(id) = self.hovered else {
            return Outcome::Nothing;
        };
        let Some(shape) = self.shape(id) else {
            return Outcome::Nothing;
        };

        if shape.hit_test_delete_glyph(pos) {
            let arrows_removed = self.delete_shape(id).unwrap_or(0);
            self.gesture = Gesture::Idle;
            return Outcome::ShapeDeleted {
                shape: id,
                arrows_removed,
            };
        }

        if let Some(from) = shape.active_node() {
            trace!(from:% = from; "Drawing arrow");
            self.gesture = Gesture::DrawingArrow { from, pointer: pos };
            return Outcome::ArrowStarted(from);
        }

        let shape_start = shape.position();
        self.bring_to_front(id);
        if let Some(shape) = self.shape_mut(id) {
            shape.set_locked(false);
        }
        trace!(shape:% = id; "Dragging shape");
        self.gesture = Gesture::DraggingShape {
            shape: id,
            pointer_start: pos,
            shape_start,
        };
        Outcome::DragStarted(id)
    }

    fn pointer_moved(&mut self, pos: Point) -> Outcome {
        let outcome = match &mut self.gesture {
            Gesture::Idle => Outcome::Nothing,
            Gesture::DrawingArrow { pointer, .. } => {
                *pointer = pos;
                Outcome::Nothing
            }
            Gesture::DraggingShape {
                shape,
                pointer_start,
                shape_start,
            } => {
                let id = *shape;
                let target = *shape_start + (pos - *pointer_start);
                if self.move_shape(id, target) {
                    Outcome::ShapeMoved(id)
                } else {
                    Outcome::Nothing
                }
            }
        };
        self.update_hover(pos);
        outcome
    }

    fn release(&mut self, pos: Point) -> Outcome {
        self.update_hover(pos);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Outcome::Nothing,
            Gesture::DraggingShape { shape, .. } => {
                if let Some(s) = self.shape_mut(shape) {
                    s.set_locked(true);
                    debug!(shape:% = shape, x = s.position().x, y = s.position().y; "Shape moved");
                }
                Outcome::DragFinished(shape)
            }
            Gesture::DrawingArrow { from, .. } => {
                if let Some(s) = self.shape_mut(from.shape) {
                    s.set_locked(true);
                }
                let target = self
                    .hovered
                    .and_then(|id| self.shape(id))
                    .and_then(Shape::active_node)
                    .filter(|node| *node != from);
                match target {
                    Some(end) => match self.connect(from, end) {
                        Ok(()) => Outcome::ArrowCreated { start: from, end },
                        Err(err) => {
                            debug!(err:% = err; "Arrow rejected");
                            Outcome::ArrowAbandoned(from)
                        }
                    },
                    None => Outcome::ArrowAbandoned(from),
                }
            }
        }
    }

    fn double_click(&mut self, pos: Point) -> Outcome {
        if let Some(shape) = self.shapes.iter().rev().find(|s| s.hit_test_body(pos)) {
            if !shape.hit_test_delete_glyph(pos) {
                return Outcome::EditLabel(shape.id());
            }
        }
        Outcome::ArrowsRemoved(self.remove_arrows_at(pos))
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        for shape in &self.shapes {
            shape.render(surface);
        }
        for arrow in &self.arrows {
            arrow.render(&self.shapes, surface);
        }
        if let Gesture::DrawingArrow { from, pointer } = self.gesture {
            if let Some(start) = model::node_position(&self.shapes, from) {
                surface.draw_line(start, pointer, Pen::new(Rgba::BLUE, 2.0));
            }
        }
    }

    pub fn save(&self) -> Result<DiagramRecord, DiagramError> {
        document::serialize(&self.shapes, &self.arrows)
    }

    /// Replaces the diagram with `record`. Nothing changes unless the whole
    /// record is valid.
    pub fn load(&mut self, record: &DiagramRecord) -> Result<(), DiagramError> {
        let mut ids = self.ids.clone();
        let (shapes, arrows) = document::deserialize(record, &mut ids)?;
        self.clear();
        self.ids = ids;
        self.shapes = shapes;
        self.arrows = arrows;
        info!(shapes = self.shapes.len(), arrows = self.arrows.len(); "Diagram loaded");
        Ok(())
    }

    pub fn save_json(&self) -> Result<String, DiagramError> {
        document::to_json(&self.save()?)
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), DiagramError> {
        let record = document::from_json(json)?;
        self.load(&record)
    }
}
