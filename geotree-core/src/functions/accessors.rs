//! Read-only queries over a tree.
//!
//! CountVertices, NumRings, Dimension, IsClosed

use tracing::trace;

use crate::geometry::{Geometry, Shape};

/// Number of coordinate tuples reachable from `geom`. A point counts as one.
///
/// # Example
///
/// ```
/// use geotree_core::functions::accessors::count_vertices;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("GEOMETRYCOLLECTION(POINT(0 0),LINESTRING(0 0,1 1))").unwrap();
/// assert_eq!(count_vertices(&geom), 3);
/// ```
pub fn count_vertices(geom: &Geometry) -> usize {
    trace!(kind = %geom.geometry_type(), "count_vertices");
    match geom.shape() {
        Shape::Point(_) => 1,
        Shape::LineString(cs) | Shape::CircularString(cs) => cs.len(),
        Shape::Polygon(rings) => rings.iter().map(Vec::len).sum(),
        _ => geom.members().iter().map(count_vertices).sum(),
    }
}

/// Rings of every Polygon and CurvePolygon in the tree, holes included.
///
/// # Example
///
/// ```
/// use geotree_core::functions::accessors::count_rings;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("MULTIPOLYGON(((0 0,0 1,1 1,0 0)),((5 5,5 6,6 6,5 5),EMPTY))").unwrap();
/// assert_eq!(count_rings(&geom), 3);
/// ```
pub fn count_rings(geom: &Geometry) -> usize {
    match geom.shape() {
        Shape::Polygon(rings) => rings.len(),
        Shape::CurvePolygon(rings) => rings.len(),
        Shape::MultiPolygon(members)
        | Shape::MultiSurface(members)
        | Shape::GeometryCollection(members) => members.iter().map(count_rings).sum(),
        _ => 0,
    }
}

/// Topological dimension: 0 for points, 1 for curves, 2 for surfaces.
/// A GeometryCollection takes the highest dimension among its members.
///
/// # Example
///
/// ```
/// use geotree_core::functions::accessors::dimension;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("GEOMETRYCOLLECTION(POINT(0 0),LINESTRING(0 0,1 1))").unwrap();
/// assert_eq!(dimension(&geom), 1);
/// ```
pub fn dimension(geom: &Geometry) -> u8 {
    match geom.shape() {
        Shape::Point(_) | Shape::MultiPoint(_) => 0,
        Shape::LineString(_)
        | Shape::CircularString(_)
        | Shape::CompoundCurve(_)
        | Shape::MultiLineString(_)
        | Shape::MultiCurve(_) => 1,
        Shape::Polygon(_)
        | Shape::CurvePolygon(_)
        | Shape::MultiPolygon(_)
        | Shape::MultiSurface(_) => 2,
        Shape::GeometryCollection(members) => members.iter().map(dimension).max().unwrap_or(0),
    }
}

/// Whether a curve ends where it starts, comparing every active ordinate.
///
/// For a CompoundCurve the first point of the first segment is compared with
/// the last point of the last segment. Multi-curves and collections are
/// closed when all their curves are. Empty curves are not closed; points and
/// surfaces always are.
///
/// # Example
///
/// ```
/// use geotree_core::functions::accessors::is_closed;
/// use geotree_core::wkt;
///
/// let open = wkt::parse("COMPOUNDCURVE(CIRCULARSTRING(0 0,0 1,1 1),(1 1,2 2))").unwrap();
/// assert!(!is_closed(&open));
/// let ring = wkt::parse("COMPOUNDCURVE(CIRCULARSTRING(0 0,1 1,2 0),(2 0,0 0))").unwrap();
/// assert!(is_closed(&ring));
/// ```
pub fn is_closed(geom: &Geometry) -> bool {
    match geom.shape() {
        Shape::LineString(_) | Shape::CircularString(_) | Shape::CompoundCurve(_) => {
            match (geom.start_coord(), geom.end_coord()) {
                (Some(start), Some(end)) => start.same(&end, geom.dims()),
                _ => false,
            }
        }
        Shape::MultiLineString(members)
        | Shape::MultiCurve(members)
        | Shape::GeometryCollection(members) => members.iter().all(is_closed),
        _ => true,
    }
}
