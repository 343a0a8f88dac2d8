//! Error types for diagram editing and persistence.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::model::NodeRef;

/// Why an arrow could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrowError {
    #[error("an arrow cannot start and end on the same node ({0})")]
    SameNode(NodeRef),

    #[error("node {0} does not belong to any shape on the canvas")]
    MissingNode(NodeRef),
}

/// Failures while converting between the live diagram and its persisted
/// record.
///
/// Every variant is raised before the canvas is touched, so a failed load
/// leaves the previous diagram in place.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("unknown shape type `{0}`")]
    UnknownShapeType(String),

    #[error(
        "arrow {arrow} points at shape {shape_index} node {node_index}, \
         but the diagram has {shape_count} shapes with 4 nodes each"
    )]
    InvalidArrowIndex {
        arrow: usize,
        shape_index: usize,
        node_index: usize,
        shape_count: usize,
    },

    #[error("malformed diagram: {0}")]
    Malformed(String),

    /// An arrow outlived the shape owning one of its nodes. This indicates a
    /// bug in the canvas bookkeeping rather than bad input.
    #[error("arrow {arrow} references a shape that is no longer on the canvas")]
    DanglingReference { arrow: usize },

    #[error("invalid arrow {arrow}: {source}")]
    InvalidArrow {
        arrow: usize,
        #[source]
        source: ArrowError,
    },
}

impl From<serde_json::Error> for DiagramError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Errors surfaced to the user by the desktop shell.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Diagram(#[from] DiagramError),

    #[error("settings error: {0}")]
    Settings(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
