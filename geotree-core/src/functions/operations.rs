//! Vertex-count changing operations.
//!
//! Simplify (Douglas–Peucker), Segmentize2D

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{Coord, Geometry, Shape};

use super::{finish, map_members};

// ── Simplify ──────────────────────────────────────────────────────────────────

/// Reduce every LineString and Polygon ring with Douglas–Peucker.
///
/// The first and last point of a line are always kept. An interior point
/// survives when its distance to the current chord exceeds `tolerance`.
/// Rings that collapse below four points are dropped, and a polygon whose
/// exterior ring collapses becomes empty. Arcs, compound curves and curve
/// polygons pass through unchanged. A tolerance that is not strictly positive
/// returns an unchanged copy.
///
/// # Example
///
/// ```
/// use geotree_core::functions::operations::simplify;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("LINESTRING(0 0,0 10,0 51,50 20,30 20,7 32)").unwrap();
/// assert_eq!(
///     wkt::to_wkt(&simplify(&geom, 2.0)),
///     "LINESTRING(0 0,0 51,50 20,30 20,7 32)"
/// );
/// ```
pub fn simplify(geom: &Geometry, tolerance: f64) -> Geometry {
    if tolerance.is_nan() || tolerance <= 0.0 {
        return geom.clone();
    }
    let out = finish(geom, simplify_node(geom, tolerance));
    debug!(
        before = geom.num_coords(),
        after = out.num_coords(),
        tolerance,
        "simplified"
    );
    out
}

fn simplify_node(geom: &Geometry, tolerance: f64) -> Geometry {
    let shape = match geom.shape() {
        Shape::LineString(cs) => Shape::LineString(douglas_peucker(cs, tolerance)),
        Shape::Polygon(rings) => {
            let mut kept = Vec::with_capacity(rings.len());
            for (i, ring) in rings.iter().enumerate() {
                let reduced = douglas_peucker(ring, tolerance);
                if reduced.len() < 4 {
                    if i == 0 {
                        kept.clear();
                        break;
                    }
                    continue;
                }
                kept.push(reduced);
            }
            Shape::Polygon(kept)
        }
        Shape::Point(_)
        | Shape::CircularString(_)
        | Shape::CompoundCurve(_)
        | Shape::CurvePolygon(_) => geom.shape().clone(),
        other => map_members(other, |m| simplify_node(m, tolerance)),
    };
    Geometry::from_parts(shape, geom.dims())
}

/// Distance in the XY plane from `p` to the segment `a`–`b`.
fn segment_distance(p: &Coord, a: &Coord, b: &Coord) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    (p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}

fn douglas_peucker(coords: &[Coord], tolerance: f64) -> Vec<Coord> {
    let n = coords.len();
    if n <= 2 {
        return coords.to_vec();
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let (a, b) = (&coords[first], &coords[last]);
        let (split, dist) = (first + 1..last)
            .map(|i| (i, segment_distance(&coords[i], a, b)))
            .fold((first, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if dist > tolerance {
            keep[split] = true;
            stack.push((first, split));
            stack.push((split, last));
        }
    }

    coords
        .iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(*c))
        .collect()
}

// ── Segmentize ────────────────────────────────────────────────────────────────

/// Upper bound on the points inserted into a single segment.
const MAX_SEGMENT_STEPS: f64 = 1e7;

/// Densify LineStrings and Polygon rings so no segment is longer than
/// `max_length`, measured in the XY plane. New points are placed every
/// `max_length` along the segment with Z and M interpolated linearly.
/// Arcs pass through unchanged. A segment that would need more than ten
/// million new points is rejected with [`GeometryError::InvalidInput`].
///
/// # Example
///
/// ```
/// use geotree_core::functions::operations::segmentize2d;
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("LINESTRING(0 0,10 0)").unwrap();
/// let dense = segmentize2d(&geom, 4.0).unwrap();
/// assert_eq!(wkt::to_wkt(&dense), "LINESTRING(0 0,4 0,8 0,10 0)");
///
/// assert!(segmentize2d(&geom, 0.0).is_err());
/// ```
pub fn segmentize2d(geom: &Geometry, max_length: f64) -> Result<Geometry> {
    if max_length <= 0.0 || !max_length.is_finite() {
        return Err(GeometryError::InvalidInput(format!(
            "segment length must be positive and finite, got {max_length}"
        )));
    }
    let out = finish(geom, segmentize_node(geom, max_length)?);
    debug!(
        before = geom.num_coords(),
        after = out.num_coords(),
        max_length,
        "segmentized"
    );
    Ok(out)
}

fn segmentize_node(geom: &Geometry, max_length: f64) -> Result<Geometry> {
    let shape = match geom.shape() {
        Shape::LineString(cs) => Shape::LineString(densify(cs, max_length)?),
        Shape::Polygon(rings) => Shape::Polygon(
            rings
                .iter()
                .map(|r| densify(r, max_length))
                .collect::<Result<_>>()?,
        ),
        Shape::Point(_) | Shape::CircularString(_) => geom.shape().clone(),
        other => {
            let members = geom
                .members()
                .iter()
                .map(|m| segmentize_node(m, max_length))
                .collect::<Result<Vec<_>>>()?;
            Shape::collection(other.geometry_type(), members).unwrap_or_else(|| other.clone())
        }
    };
    Ok(Geometry::from_parts(shape, geom.dims()))
}

fn densify(coords: &[Coord], max_length: f64) -> Result<Vec<Coord>> {
    let Some(first) = coords.first() else {
        return Ok(Vec::new());
    };
    let mut out = vec![*first];
    for w in coords.windows(2) {
        let (a, b) = (&w[0], &w[1]);
        let length = (b.x - a.x).hypot(b.y - a.y);
        let steps = (length / max_length).ceil();
        if steps > MAX_SEGMENT_STEPS {
            return Err(GeometryError::InvalidInput(format!(
                "segment length {max_length} splits a segment of length {length} into too many pieces"
            )));
        }
        // NaN casts to 0 steps.
        for i in 1..steps as usize {
            let t = i as f64 * max_length / length;
            out.push(Coord {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
                z: a.z + (b.z - a.z) * t,
                m: a.m + (b.m - a.m) * t,
            });
        }
        out.push(*b);
    }
    Ok(out)
}
