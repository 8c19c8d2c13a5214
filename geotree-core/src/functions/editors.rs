//! Editors that return a reshaped copy of the tree.
//!
//! Force2D / ProjectTo2D, Force3DZ, Force3DM, Force4D, Reverse,
//! ForceClockwise (ForceRHR), FlipCoordinates, RemoveRepeatedPoints, Multi

use crate::geometry::{Coord, Dims, Geometry, Shape, SRID_UNKNOWN};

use super::{finish, map_members};

// ── Dimensionality ────────────────────────────────────────────────────────────

/// Rebuild the tree with the requested ordinates. Dropped ordinates are
/// discarded, added ones are zero-filled. Structure and SRID are preserved.
pub fn force_dims(geom: &Geometry, has_z: bool, has_m: bool) -> Geometry {
    geom.map_coords(Dims::new(has_z, has_m), &|c| c)
}

/// Strip Z and M from every coordinate.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::force_2d;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("GEOMETRYCOLLECTION(POINT(0 0 0),LINESTRING(1 1 1,2 2 2))").unwrap();
/// assert_eq!(
///     wkt::to_wkt(&force_2d(&geom)),
///     "GEOMETRYCOLLECTION(POINT(0 0),LINESTRING(1 1,2 2))"
/// );
/// ```
pub fn force_2d(geom: &Geometry) -> Geometry {
    force_dims(geom, false, false)
}

/// Alias of [`force_2d`].
pub fn project_to_2d(geom: &Geometry) -> Geometry {
    force_2d(geom)
}

pub fn force_3dz(geom: &Geometry) -> Geometry {
    force_dims(geom, true, false)
}

pub fn force_3dm(geom: &Geometry) -> Geometry {
    force_dims(geom, false, true)
}

/// Add whichever of Z and M is missing, zero-filled.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::force_4d;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("POINT(1 2 3)").unwrap();
/// assert_eq!(wkt::to_wkt(&force_4d(&geom)), "POINT(1 2 3 0)");
/// ```
pub fn force_4d(geom: &Geometry) -> Geometry {
    force_dims(geom, true, true)
}

// ── Orientation ───────────────────────────────────────────────────────────────

/// Reverse the vertex order of every line and ring. CompoundCurve segments
/// are also visited back to front so the curve stays continuous.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::reverse;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("COMPOUNDCURVE(CIRCULARSTRING(0 0,0 1,1 1),(1 1,2 2))").unwrap();
/// assert_eq!(
///     wkt::to_wkt(&reverse(&geom)),
///     "COMPOUNDCURVE((2 2,1 1),CIRCULARSTRING(1 1,0 1,0 0))"
/// );
/// ```
pub fn reverse(geom: &Geometry) -> Geometry {
    finish(geom, reverse_node(geom))
}

fn reversed(coords: &[Coord]) -> Vec<Coord> {
    coords.iter().rev().copied().collect()
}

fn reverse_node(geom: &Geometry) -> Geometry {
    let shape = match geom.shape() {
        Shape::Point(c) => Shape::Point(*c),
        Shape::LineString(cs) => Shape::LineString(reversed(cs)),
        Shape::CircularString(cs) => Shape::CircularString(reversed(cs)),
        Shape::Polygon(rings) => Shape::Polygon(rings.iter().map(|r| reversed(r)).collect()),
        Shape::CompoundCurve(segments) => {
            Shape::CompoundCurve(segments.iter().rev().map(reverse_node).collect())
        }
        other => map_members(other, reverse_node),
    };
    Geometry::from_parts(shape, geom.dims())
}

/// Twice the signed area of a ring; positive when counter-clockwise.
fn signed_area2(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum()
}

/// Orient every Polygon so the exterior ring runs clockwise and holes run
/// counter-clockwise. Curved surfaces are left as they are.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::force_clockwise;
/// use geotree_core::wkt;
///
/// let ccw = wkt::parse("POLYGON((0 0,1 0,1 1,0 0))").unwrap();
/// assert_eq!(
///     wkt::to_wkt(&force_clockwise(&ccw)),
///     "POLYGON((0 0,1 1,1 0,0 0))"
/// );
/// ```
pub fn force_clockwise(geom: &Geometry) -> Geometry {
    finish(geom, clockwise_node(geom))
}

fn clockwise_node(geom: &Geometry) -> Geometry {
    let shape = match geom.shape() {
        Shape::Polygon(rings) => Shape::Polygon(
            rings
                .iter()
                .enumerate()
                .map(|(i, ring)| {
                    let area = signed_area2(ring);
                    let wrong_way = if i == 0 { area > 0.0 } else { area < 0.0 };
                    if wrong_way {
                        reversed(ring)
                    } else {
                        ring.clone()
                    }
                })
                .collect(),
        ),
        Shape::MultiPolygon(_) | Shape::MultiSurface(_) | Shape::GeometryCollection(_) => {
            map_members(geom.shape(), clockwise_node)
        }
        other => other.clone(),
    };
    Geometry::from_parts(shape, geom.dims())
}

/// Swap X and Y of every coordinate.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::flip_coordinates;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("LINESTRING(1 2,3 4)").unwrap();
/// assert_eq!(wkt::to_wkt(&flip_coordinates(&geom)), "LINESTRING(2 1,4 3)");
/// ```
pub fn flip_coordinates(geom: &Geometry) -> Geometry {
    let flipped = geom.map_coords(geom.dims(), &|c| Coord { x: c.y, y: c.x, ..c });
    finish(geom, flipped)
}

// ── Cleanup ───────────────────────────────────────────────────────────────────

/// Drop consecutive duplicate vertices from LineStrings and Polygon rings,
/// and duplicate members from MultiPoints. A line or ring that would fall
/// below its minimum legal size is kept unchanged. Arcs are left as they are.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::remove_repeated_points;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("LINESTRING(0 0,0 0,1 1,1 1,2 2)").unwrap();
/// assert_eq!(wkt::to_wkt(&remove_repeated_points(&geom)), "LINESTRING(0 0,1 1,2 2)");
/// ```
pub fn remove_repeated_points(geom: &Geometry) -> Geometry {
    finish(geom, dedup_node(geom))
}

fn dedup_coords(coords: &[Coord], dims: Dims, min_points: usize) -> Vec<Coord> {
    let mut out: Vec<Coord> = Vec::with_capacity(coords.len());
    for c in coords {
        if out.last().is_none_or(|last| !last.same(c, dims)) {
            out.push(*c);
        }
    }
    if out.len() < min_points {
        return coords.to_vec();
    }
    out
}

fn dedup_node(geom: &Geometry) -> Geometry {
    let dims = geom.dims();
    let shape = match geom.shape() {
        Shape::LineString(cs) => Shape::LineString(dedup_coords(cs, dims, 2)),
        Shape::Polygon(rings) => {
            Shape::Polygon(rings.iter().map(|r| dedup_coords(r, dims, 4)).collect())
        }
        Shape::MultiPoint(points) => {
            let mut kept: Vec<Geometry> = Vec::with_capacity(points.len());
            for p in points {
                let seen = kept.iter().any(|k| match (k.shape(), p.shape()) {
                    (Shape::Point(a), Shape::Point(b)) => a.same(b, dims),
                    _ => false,
                });
                if !seen {
                    kept.push(p.clone());
                }
            }
            Shape::MultiPoint(kept)
        }
        Shape::CircularString(_) => geom.shape().clone(),
        other => map_members(other, dedup_node),
    };
    Geometry::from_parts(shape, dims)
}

// ── Collections ───────────────────────────────────────────────────────────────

/// Wrap a single geometry in the homogeneous collection that can hold it;
/// a CompoundCurve goes into a GeometryCollection. Collections are returned
/// unchanged. The SRID moves to the new root.
///
/// # Example
///
/// ```
/// use geotree_core::functions::editors::as_multi;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("SRID=4326;CIRCULARSTRING(0 0,1 1,2 0)").unwrap();
/// assert_eq!(
///     wkt::to_ewkt(&as_multi(&geom), 15),
///     "SRID=4326;MULTICURVE(CIRCULARSTRING(0 0,1 1,2 0))"
/// );
/// ```
pub fn as_multi(geom: &Geometry) -> Geometry {
    let kind = geom.geometry_type();
    let multi = kind.multi_type();
    if multi == kind {
        return geom.clone();
    }
    let mut member = geom.clone();
    member.set_srid(SRID_UNKNOWN);
    member.drop_bbox();
    match Shape::collection(multi, vec![member]) {
        Some(shape) => finish(geom, Geometry::from_parts(shape, geom.dims())),
        None => geom.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::accessors::is_closed;
    use crate::wkt::{parse, to_wkt};

    #[test]
    fn project_preserves_structure_and_srid() {
        let geom = parse("SRID=3857;MULTIPOLYGON ZM (((0 0 1 2,0 1 1 2,1 1 1 2,0 0 1 2)))").unwrap();
        let flat = project_to_2d(&geom);
        assert_eq!(flat.dims(), Dims::XY);
        assert_eq!(flat.srid(), 3857);
        assert_eq!(flat.num_coords(), geom.num_coords());
        assert_eq!(to_wkt(&flat), "MULTIPOLYGON(((0 0,0 1,1 1,0 0)))");
        assert!(flat.validate().is_ok());
    }

    #[test]
    fn force_3dm_drops_z_and_adds_m() {
        let geom = parse("POINT(1 2 3)").unwrap();
        assert_eq!(to_wkt(&force_3dm(&geom)), "POINTM(1 2 0)");
        assert_eq!(to_wkt(&force_3dz(&force_3dm(&geom))), "POINT(1 2 0)");
    }

    #[test]
    fn reverse_keeps_compound_curve_valid() {
        let geom = parse("COMPOUNDCURVE(CIRCULARSTRING(0 0,0 1,1 1),(1 1,2 2,3 3))").unwrap();
        let back = reverse(&geom);
        assert!(back.validate().is_ok());
        assert_eq!(reverse(&back), geom);
    }

    #[test]
    fn clockwise_exterior_counter_clockwise_holes() {
        let geom = parse("POLYGON((0 0,10 0,10 10,0 10,0 0),(2 2,2 4,4 4,4 2,2 2))").unwrap();
        let out = force_clockwise(&geom);
        let Shape::Polygon(rings) = out.shape() else {
            panic!("expected polygon");
        };
        assert!(signed_area2(&rings[0]) < 0.0);
        assert!(signed_area2(&rings[1]) > 0.0);
        assert_eq!(force_clockwise(&out), out);
    }

    #[test]
    fn flip_refreshes_cached_bbox() {
        let mut geom = parse("LINESTRING(0 0,1 5)").unwrap();
        geom.add_bbox();
        let flipped = flip_coordinates(&geom);
        let bbox = flipped.bbox().unwrap();
        assert_eq!((bbox.xmax, bbox.ymax), (5.0, 1.0));
    }

    #[test]
    fn dedup_never_breaks_minimum_sizes() {
        let line = parse("LINESTRING(1 1,1 1,1 1)").unwrap();
        assert_eq!(remove_repeated_points(&line), line);

        let ring = parse("POLYGON((0 0,1 0,1 0,1 1,0 0,0 0))").unwrap();
        let out = remove_repeated_points(&ring);
        assert_eq!(to_wkt(&out), "POLYGON((0 0,1 0,1 1,0 0))");
        assert!(out.validate().is_ok());
    }

    #[test]
    fn dedup_multipoint_and_leave_arcs() {
        let geom = parse("GEOMETRYCOLLECTION(MULTIPOINT(0 0,1 1,0 0),CIRCULARSTRING(0 0,0 0,1 1))").unwrap();
        assert_eq!(
            to_wkt(&remove_repeated_points(&geom)),
            "GEOMETRYCOLLECTION(MULTIPOINT(0 0,1 1),CIRCULARSTRING(0 0,0 0,1 1))"
        );
    }

    #[test]
    fn as_multi_wraps_singletons_only() {
        let geom = parse("SRID=4326;POLYGON((0 0,0 1,1 1,0 0))").unwrap();
        let multi = as_multi(&geom);
        assert_eq!(multi.srid(), 4326);
        assert_eq!(multi.members()[0].srid(), SRID_UNKNOWN);
        assert_eq!(to_wkt(&multi), "MULTIPOLYGON(((0 0,0 1,1 1,0 0)))");
        assert_eq!(as_multi(&multi), multi);

        let ring = parse("COMPOUNDCURVE(CIRCULARSTRING(0 0,1 1,2 0),(2 0,0 0))").unwrap();
        let wrapped = as_multi(&ring);
        assert_eq!(wrapped.geometry_type(), crate::geometry::GeometryType::GeometryCollection);
        assert_eq!(wrapped.members().len(), 1);
        assert!(is_closed(&wrapped));
    }
}
