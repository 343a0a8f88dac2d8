//! Flat, index-based persisted form of a diagram.
//!
//! Arrows are stored as (shape index, node index) pairs into the `shapes`
//! array, so the record carries no identities of its own. Field names are the
//! on-disk JSON contract.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::DiagramError;
use crate::geometry::{Point, Size};
use crate::model::{Arrow, NODE_COUNT, NodeRef, Shape, ShapeIds, ShapeKind};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DiagramRecord {
    pub shapes: Vec<ShapeRecord>,
    pub arrows: Vec<ArrowRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShapeRecord {
    pub shape_type: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArrowRecord {
    pub start_shape_index: usize,
    pub start_node_index: usize,
    pub end_shape_index: usize,
    pub end_node_index: usize,
}

pub fn serialize(shapes: &[Shape], arrows: &[Arrow]) -> Result<DiagramRecord, DiagramError> {
    let shape_records = shapes
        .iter()
        .map(|shape| ShapeRecord {
            shape_type: shape.kind().name().to_string(),
            x: shape.position().x,
            y: shape.position().y,
            width: shape.size().width,
            height: shape.size().height,
            text: shape.text().to_string(),
        })
        .collect();

    let locate = |arrow: usize, node: NodeRef| -> Result<(usize, usize), DiagramError> {
        let shape = shapes
            .iter()
            .position(|s| s.owns(node))
            .ok_or(DiagramError::DanglingReference { arrow })?;
        Ok((shape, node.index))
    };

    let mut arrow_records = Vec::with_capacity(arrows.len());
    for (i, arrow) in arrows.iter().enumerate() {
        let (start_shape_index, start_node_index) = locate(i, arrow.start())?;
        let (end_shape_index, end_node_index) = locate(i, arrow.end())?;
        arrow_records.push(ArrowRecord {
            start_shape_index,
            start_node_index,
            end_shape_index,
            end_node_index,
        });
    }

    Ok(DiagramRecord {
        shapes: shape_records,
        arrows: arrow_records,
    })
}

/// Builds live shapes and arrows from `record`, drawing fresh ids from `ids`.
///
/// The whole record is validated; on error nothing is returned, so callers
/// can swap the result in only on success.
pub fn deserialize(
    record: &DiagramRecord,
    ids: &mut ShapeIds,
) -> Result<(Vec<Shape>, Vec<Arrow>), DiagramError> {
    let mut shapes = Vec::with_capacity(record.shapes.len());
    for (i, r) in record.shapes.iter().enumerate() {
        let kind: ShapeKind = r.shape_type.parse()?;
        let size = Size::new(r.width, r.height);
        if !size.is_valid() || !r.x.is_finite() || !r.y.is_finite() {
            return Err(DiagramError::Malformed(format!(
                "shape {i} has invalid geometry (x={}, y={}, width={}, height={})",
                r.x, r.y, r.width, r.height
            )));
        }
        let mut shape = Shape::new(ids.allocate(), kind);
        shape.set_position(Point::new(r.x, r.y));
        shape.set_size(size);
        shape.set_text(r.text.as_str());
        shapes.push(shape);
    }

    let resolve = |arrow: usize, shape_index: usize, node_index: usize| {
        match shapes.get(shape_index) {
            Some(shape) if node_index < NODE_COUNT => Ok(NodeRef::new(shape.id(), node_index)),
            _ => Err(DiagramError::InvalidArrowIndex {
                arrow,
                shape_index,
                node_index,
                shape_count: shapes.len(),
            }),
        }
    };

    let mut arrows = Vec::with_capacity(record.arrows.len());
    for (i, r) in record.arrows.iter().enumerate() {
        let start = resolve(i, r.start_shape_index, r.start_node_index)?;
        let end = resolve(i, r.end_shape_index, r.end_node_index)?;
        let arrow = Arrow::new(start, end)
            .map_err(|source| DiagramError::InvalidArrow { arrow: i, source })?;
        arrows.push(arrow);
    }

    debug!(shapes = shapes.len(), arrows = arrows.len(); "Diagram record decoded");
    Ok((shapes, arrows))
}

pub fn to_json(record: &DiagramRecord) -> Result<String, DiagramError> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn from_json(json: &str) -> Result<DiagramRecord, DiagramError> {
    Ok(serde_json::from_str(json)?)
}
