use thiserror::Error;

use crate::geometry::{GeometryType, NodePath, Rule};

/// Failure raised by the WKT/EWKT parser.
///
/// `offset` is the byte offset into the input at which parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    /// What the parser was looking for when it failed, if it was waiting on a token.
    pub expected: Option<&'static str>,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
            expected: None,
        }
    }

    pub(crate) fn expected(expected: &'static str, found: &str, offset: usize) -> Self {
        Self {
            message: format!("expected {expected}, found {found}"),
            offset,
            expected: Some(expected),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid geometry at {path}: {rule}")]
    InvalidGeometry { rule: Rule, path: NodePath },

    #[error("{container} cannot contain {member} (at {path})")]
    UnsupportedMember {
        container: GeometryType,
        member: GeometryType,
        path: NodePath,
    },

    #[error("malformed buffer at byte {offset}: {reason}")]
    MalformedBuffer { offset: usize, reason: &'static str },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("geometry engine error: {0}")]
    Engine(#[from] geozero::error::GeozeroError),

    #[error("curved geometry not supported by the geometry engine: {0}")]
    CurveNotSupported(GeometryType),

    #[error("{0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
