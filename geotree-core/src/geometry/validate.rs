use std::fmt;
use std::ops::BitOr;

use tracing::trace;

use super::{Coord, Dims, Geometry, GeometryType, Shape};
use crate::error::{GeometryError, Result};

/// Optional structural checks. Dimension agreement and membership
/// restriction are not optional and are always enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checks(u8);

impl Checks {
    pub const NONE: Checks = Checks(0);
    /// Non-empty lines hold at least 2 points, arcs 3, polygon rings 4.
    pub const MIN_POINTS: Checks = Checks(0x01);
    /// Non-empty circular strings hold an odd number of points.
    pub const ODD: Checks = Checks(0x02);
    /// Non-empty rings end where they start.
    pub const CLOSURE: Checks = Checks(0x04);
    /// Adjacent compound-curve segments share their junction coordinate.
    pub const CONTINUITY: Checks = Checks(0x08);
    pub const ALL: Checks = Checks(0x0F);

    pub const fn contains(self, other: Checks) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Checks {
    fn default() -> Self {
        Checks::ALL
    }
}

impl BitOr for Checks {
    type Output = Checks;

    fn bitor(self, rhs: Checks) -> Checks {
        Checks(self.0 | rhs.0)
    }
}

/// The structural invariant a tree violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    MixedDimensions,
    TooFewPoints,
    EvenCircularString,
    UnclosedRing,
    DiscontinuousCurve,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rule::MixedDimensions => "can not mix dimensionality in a geometry",
            Rule::TooFewPoints => "geometry requires more points",
            Rule::EvenCircularString => "geometry must have an odd number of points",
            Rule::UnclosedRing => "geometry contains non-closed rings",
            Rule::DiscontinuousCurve => "incontinuous compound curve",
        })
    }
}

/// Child indices leading from the root to a node; rendered as `$[2][0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for index in &self.0 {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

fn invalid(rule: Rule, path: &NodePath) -> GeometryError {
    GeometryError::InvalidGeometry {
        rule,
        path: path.clone(),
    }
}

pub(crate) fn validate_tree(geom: &Geometry, checks: Checks) -> Result<()> {
    validate_node(geom, geom.dims, checks, &NodePath::root())
}

fn validate_node(geom: &Geometry, dims: Dims, checks: Checks, path: &NodePath) -> Result<()> {
    trace!(kind = %geom.geometry_type(), %path, "validating node");
    if geom.dims != dims {
        return Err(invalid(Rule::MixedDimensions, path));
    }
    match &geom.shape {
        Shape::Point(_) => Ok(()),
        Shape::LineString(cs) => {
            if checks.contains(Checks::MIN_POINTS) && cs.len() == 1 {
                return Err(invalid(Rule::TooFewPoints, path));
            }
            Ok(())
        }
        Shape::CircularString(cs) => check_arc(cs, checks, path),
        Shape::Polygon(rings) => {
            for (i, ring) in rings.iter().enumerate() {
                check_ring(ring, dims, checks, &path.child(i))?;
            }
            Ok(())
        }
        Shape::CurvePolygon(rings) => {
            check_members(GeometryType::CurvePolygon, dims, rings, checks, path)?;
            if checks.contains(Checks::CLOSURE) {
                for (i, ring) in rings.iter().enumerate() {
                    if !curve_is_closed(ring, dims) {
                        return Err(invalid(Rule::UnclosedRing, &path.child(i)));
                    }
                }
            }
            Ok(())
        }
        Shape::CompoundCurve(segments) => {
            check_members(GeometryType::CompoundCurve, dims, segments, checks, path)?;
            if checks.contains(Checks::CONTINUITY) {
                let mut last_end: Option<Coord> = None;
                for (i, segment) in segments.iter().enumerate() {
                    if !joined(last_end, segment, dims) {
                        return Err(invalid(Rule::DiscontinuousCurve, &path.child(i)));
                    }
                    last_end = segment.end_coord().or(last_end);
                }
            }
            Ok(())
        }
        other => {
            let members = other.members().unwrap_or(&[]);
            check_members(other.geometry_type(), dims, members, checks, path)
        }
    }
}

fn check_members(
    container: GeometryType,
    dims: Dims,
    members: &[Geometry],
    checks: Checks,
    path: &NodePath,
) -> Result<()> {
    for (i, member) in members.iter().enumerate() {
        let child = path.child(i);
        if !container.accepts(member.geometry_type()) {
            return Err(GeometryError::UnsupportedMember {
                container,
                member: member.geometry_type(),
                path: child,
            });
        }
        validate_node(member, dims, checks, &child)?;
    }
    Ok(())
}

/// Checks a single member about to be appended at `index`.
pub(crate) fn check_member(
    container: GeometryType,
    dims: Dims,
    previous_end: Option<Coord>,
    member: &Geometry,
    index: usize,
    checks: Checks,
) -> Result<()> {
    let path = NodePath::from(vec![index]);
    if !container.accepts(member.geometry_type()) {
        return Err(GeometryError::UnsupportedMember {
            container,
            member: member.geometry_type(),
            path,
        });
    }
    validate_node(member, dims, checks, &path)?;
    if container == GeometryType::CurvePolygon
        && checks.contains(Checks::CLOSURE)
        && !curve_is_closed(member, dims)
    {
        return Err(invalid(Rule::UnclosedRing, &path));
    }
    if container == GeometryType::CompoundCurve && checks.contains(Checks::CONTINUITY) {
        if !joined(previous_end, member, dims) {
            return Err(invalid(Rule::DiscontinuousCurve, &path));
        }
    }
    Ok(())
}

pub(crate) fn check_ring(ring: &[Coord], dims: Dims, checks: Checks, path: &NodePath) -> Result<()> {
    if ring.is_empty() {
        return Ok(());
    }
    if checks.contains(Checks::MIN_POINTS) && ring.len() < 4 {
        return Err(invalid(Rule::TooFewPoints, path));
    }
    if checks.contains(Checks::CLOSURE) && !ring[0].same(&ring[ring.len() - 1], dims) {
        return Err(invalid(Rule::UnclosedRing, path));
    }
    Ok(())
}

fn check_arc(coords: &[Coord], checks: Checks, path: &NodePath) -> Result<()> {
    if coords.is_empty() {
        return Ok(());
    }
    if checks.contains(Checks::MIN_POINTS) && coords.len() < 3 {
        return Err(invalid(Rule::TooFewPoints, path));
    }
    if checks.contains(Checks::ODD) && coords.len() % 2 == 0 {
        return Err(invalid(Rule::EvenCircularString, path));
    }
    Ok(())
}

// Only a curve with no points at all counts as trivially closed.
fn curve_is_closed(curve: &Geometry, dims: Dims) -> bool {
    match (curve.start_coord(), curve.end_coord()) {
        (Some(start), Some(end)) => start.same(&end, dims),
        (None, None) => true,
        _ => false,
    }
}

/// Whether `segment` starts where the last non-empty segment before it ended.
/// Empty segments and the first non-empty one always join.
fn joined(last_end: Option<Coord>, segment: &Geometry, dims: Dims) -> bool {
    match (last_end, segment.start_coord()) {
        (Some(end), Some(start)) => end.same(&start, dims),
        _ => true,
    }
}
