//! Tree operations grouped the way a SQL binding exposes them.
//!
//! Every function is pure: it borrows its input and returns a new tree (or a
//! scalar). The `io` module works on encoded buffers instead of trees.

pub mod accessors;
pub mod editors;
pub mod io;
pub mod operations;

use crate::geometry::{Geometry, Shape};

/// Rebuild a container shape with every member passed through `f`.
/// Non-container shapes are cloned as they are.
pub(crate) fn map_members(shape: &Shape, f: impl Fn(&Geometry) -> Geometry) -> Shape {
    match shape.members() {
        Some(members) => {
            let mapped = members.iter().map(f).collect();
            Shape::collection(shape.geometry_type(), mapped).unwrap_or_else(|| shape.clone())
        }
        None => shape.clone(),
    }
}

/// Carry the root SRID of `src` over to `out` and refresh the cached bbox
/// if `src` had one.
pub(crate) fn finish(src: &Geometry, mut out: Geometry) -> Geometry {
    out.set_srid(src.srid());
    if src.bbox().is_some() {
        let bbox = out.compute_bbox();
        out.set_cached_bbox(bbox);
    }
    out
}
