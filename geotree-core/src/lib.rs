#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geotree-core`.

pub mod binary;
pub mod engine;
pub mod error;
pub mod functions;
pub mod geometry;
pub mod wkt;

pub use binary::{DecodeOptions, EncodeOptions};
pub use error::{GeometryError, ParseError, Result};
pub use geometry::{
    BoundingBox, Checks, Coord, Dims, Geometry, GeometryType, NodePath, Rule, Shape, MAX_DEPTH,
    SRID_UNKNOWN,
};
