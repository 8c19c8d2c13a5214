//! Geometry tree: the variant data model and its structural invariants.
//!
//! A [`Geometry`] node carries a [`Shape`] (the variant payload), the
//! dimensionality shared by the whole tree, an SRID (meaningful only at the
//! root) and an optional cached 2D bounding box.
//!
//! Every public constructor validates the tree before handing it out. Trees
//! reached through [`Geometry::shape_mut`] can be edited freely; call
//! [`Geometry::validate`] afterwards to re-check them.

mod bbox;
mod validate;

use std::fmt;

pub use bbox::BoundingBox;
pub use validate::{Checks, NodePath, Rule};

use crate::error::{GeometryError, Result};

/// SRID value meaning "no spatial reference system".
pub const SRID_UNKNOWN: i32 = -1;

/// Maximum nesting depth accepted by the decoders.
pub const MAX_DEPTH: usize = 32;

// ── Dimensionality ────────────────────────────────────────────────────────────

/// The (Z, M) flag pair of a geometry tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dims {
    pub has_z: bool,
    pub has_m: bool,
}

impl Dims {
    pub const XY: Dims = Dims::new(false, false);
    pub const XYZ: Dims = Dims::new(true, false);
    pub const XYM: Dims = Dims::new(false, true);
    pub const XYZM: Dims = Dims::new(true, true);

    pub const fn new(has_z: bool, has_m: bool) -> Self {
        Self { has_z, has_m }
    }

    /// Number of ordinates per coordinate tuple (2, 3 or 4).
    pub const fn ordinates(self) -> usize {
        2 + self.has_z as usize + self.has_m as usize
    }

    pub fn label(self) -> &'static str {
        match (self.has_z, self.has_m) {
            (true, true) => "ZM",
            (true, false) => "Z",
            (false, true) => "M",
            (false, false) => "XY",
        }
    }
}

// ── Coordinates ───────────────────────────────────────────────────────────────

/// One coordinate tuple. Ordinates absent from the owning tree's [`Dims`] are
/// kept at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl Coord {
    pub const fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0, m: 0.0 }
    }

    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, m: 0.0 }
    }

    pub const fn xym(x: f64, y: f64, m: f64) -> Self {
        Self { x, y, z: 0.0, m }
    }

    pub const fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self { x, y, z, m }
    }

    /// Build a coordinate from an ordinate slice laid out as `x y [z] [m]`.
    ///
    /// Returns `None` when the slice length does not match `dims`.
    pub fn from_ordinates(ordinates: &[f64], dims: Dims) -> Option<Self> {
        if ordinates.len() != dims.ordinates() {
            return None;
        }
        let mut c = Coord::xy(ordinates[0], ordinates[1]);
        let mut next = 2;
        if dims.has_z {
            c.z = ordinates[next];
            next += 1;
        }
        if dims.has_m {
            c.m = ordinates[next];
        }
        Some(c)
    }

    /// Zero the ordinates that `dims` does not carry.
    pub fn masked(self, dims: Dims) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: if dims.has_z { self.z } else { 0.0 },
            m: if dims.has_m { self.m } else { 0.0 },
        }
    }

    /// Exact comparison over the ordinates active in `dims`.
    pub fn same(&self, other: &Coord, dims: Dims) -> bool {
        self.x == other.x
            && self.y == other.y
            && (!dims.has_z || self.z == other.z)
            && (!dims.has_m || self.m == other.m)
    }

    /// Active ordinates in `x y [z] [m]` order.
    pub fn ordinates(&self, dims: Dims) -> impl Iterator<Item = f64> {
        [
            Some(self.x),
            Some(self.y),
            dims.has_z.then_some(self.z),
            dims.has_m.then_some(self.m),
        ]
        .into_iter()
        .flatten()
    }
}

// ── Geometry types ────────────────────────────────────────────────────────────

/// Variant tag of a geometry node. Discriminants are the binary type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GeometryType {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 13,
    MultiCurve = 14,
    MultiSurface = 15,
}

impl GeometryType {
    pub const ALL: [GeometryType; 12] = [
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
        GeometryType::CircularString,
        GeometryType::CompoundCurve,
        GeometryType::CurvePolygon,
        GeometryType::MultiCurve,
        GeometryType::MultiSurface,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// WKT keyword.
    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
            GeometryType::CircularString => "CIRCULARSTRING",
            GeometryType::CompoundCurve => "COMPOUNDCURVE",
            GeometryType::CurvePolygon => "CURVEPOLYGON",
            GeometryType::MultiCurve => "MULTICURVE",
            GeometryType::MultiSurface => "MULTISURFACE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// True for types whose payload is a list of member geometries.
    pub fn is_collection(self) -> bool {
        !matches!(
            self,
            GeometryType::Point
                | GeometryType::LineString
                | GeometryType::CircularString
                | GeometryType::Polygon
        )
    }

    /// Whether a container of this type may own a member of type `member`.
    pub fn accepts(self, member: GeometryType) -> bool {
        use GeometryType::*;
        match self {
            CompoundCurve | MultiCurve => matches!(member, LineString | CircularString),
            CurvePolygon => matches!(member, LineString | CircularString | CompoundCurve),
            MultiPoint => member == Point,
            MultiLineString => member == LineString,
            MultiPolygon => member == Polygon,
            MultiSurface => matches!(member, Polygon | CurvePolygon),
            GeometryCollection => true,
            Point | LineString | CircularString | Polygon => false,
        }
    }

    /// The homogeneous collection able to hold a singleton of this type.
    pub fn multi_type(self) -> GeometryType {
        use GeometryType::*;
        match self {
            Point => MultiPoint,
            LineString => MultiLineString,
            Polygon => MultiPolygon,
            CircularString => MultiCurve,
            // MultiCurve members are LineString or CircularString only.
            CompoundCurve => GeometryCollection,
            CurvePolygon => MultiSurface,
            other => other,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Shapes ────────────────────────────────────────────────────────────────────

/// Variant payload of a geometry node. Its derived equality compares all four
/// ordinates; [`Geometry`] equality only compares the active ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Coord),
    LineString(Vec<Coord>),
    CircularString(Vec<Coord>),
    /// Segments: LineString or CircularString.
    CompoundCurve(Vec<Geometry>),
    /// Ring 0 is the exterior, the rest are holes.
    Polygon(Vec<Vec<Coord>>),
    /// Rings: LineString, CircularString or CompoundCurve.
    CurvePolygon(Vec<Geometry>),
    MultiPoint(Vec<Geometry>),
    MultiLineString(Vec<Geometry>),
    MultiPolygon(Vec<Geometry>),
    MultiCurve(Vec<Geometry>),
    MultiSurface(Vec<Geometry>),
    GeometryCollection(Vec<Geometry>),
}

impl Shape {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Shape::Point(_) => GeometryType::Point,
            Shape::LineString(_) => GeometryType::LineString,
            Shape::CircularString(_) => GeometryType::CircularString,
            Shape::CompoundCurve(_) => GeometryType::CompoundCurve,
            Shape::Polygon(_) => GeometryType::Polygon,
            Shape::CurvePolygon(_) => GeometryType::CurvePolygon,
            Shape::MultiPoint(_) => GeometryType::MultiPoint,
            Shape::MultiLineString(_) => GeometryType::MultiLineString,
            Shape::MultiPolygon(_) => GeometryType::MultiPolygon,
            Shape::MultiCurve(_) => GeometryType::MultiCurve,
            Shape::MultiSurface(_) => GeometryType::MultiSurface,
            Shape::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    /// Empty container shape of the given collection type.
    ///
    /// Returns `None` for the non-collection types.
    pub fn collection(kind: GeometryType, members: Vec<Geometry>) -> Option<Self> {
        let shape = match kind {
            GeometryType::CompoundCurve => Shape::CompoundCurve(members),
            GeometryType::CurvePolygon => Shape::CurvePolygon(members),
            GeometryType::MultiPoint => Shape::MultiPoint(members),
            GeometryType::MultiLineString => Shape::MultiLineString(members),
            GeometryType::MultiPolygon => Shape::MultiPolygon(members),
            GeometryType::MultiCurve => Shape::MultiCurve(members),
            GeometryType::MultiSurface => Shape::MultiSurface(members),
            GeometryType::GeometryCollection => Shape::GeometryCollection(members),
            GeometryType::Point
            | GeometryType::LineString
            | GeometryType::CircularString
            | GeometryType::Polygon => return None,
        };
        Some(shape)
    }

    pub fn members(&self) -> Option<&[Geometry]> {
        match self {
            Shape::CompoundCurve(m)
            | Shape::CurvePolygon(m)
            | Shape::MultiPoint(m)
            | Shape::MultiLineString(m)
            | Shape::MultiPolygon(m)
            | Shape::MultiCurve(m)
            | Shape::MultiSurface(m)
            | Shape::GeometryCollection(m) => Some(m),
            Shape::Point(_) | Shape::LineString(_) | Shape::CircularString(_) | Shape::Polygon(_) => {
                None
            }
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut Vec<Geometry>> {
        match self {
            Shape::CompoundCurve(m)
            | Shape::CurvePolygon(m)
            | Shape::MultiPoint(m)
            | Shape::MultiLineString(m)
            | Shape::MultiPolygon(m)
            | Shape::MultiCurve(m)
            | Shape::MultiSurface(m)
            | Shape::GeometryCollection(m) => Some(m),
            Shape::Point(_) | Shape::LineString(_) | Shape::CircularString(_) | Shape::Polygon(_) => {
                None
            }
        }
    }

    /// Take the members out of a collection shape.
    pub fn into_members(self) -> Option<Vec<Geometry>> {
        match self {
            Shape::CompoundCurve(m)
            | Shape::CurvePolygon(m)
            | Shape::MultiPoint(m)
            | Shape::MultiLineString(m)
            | Shape::MultiPolygon(m)
            | Shape::MultiCurve(m)
            | Shape::MultiSurface(m)
            | Shape::GeometryCollection(m) => Some(m),
            Shape::Point(_) | Shape::LineString(_) | Shape::CircularString(_) | Shape::Polygon(_) => {
                None
            }
        }
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// A node of a geometry tree. Containers own their members outright.
#[derive(Debug, Clone)]
pub struct Geometry {
    shape: Shape,
    dims: Dims,
    srid: i32,
    bbox: Option<BoundingBox>,
}

/// Structural equality: dimensionality, SRID and the recursive shape.
/// Only the ordinates carried by the tree's [`Dims`] are compared, and cached
/// bounding boxes are ignored.
impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
            && self.srid == other.srid
            && same_shape(&self.shape, &other.shape, self.dims)
    }
}

fn same_coords(a: &[Coord], b: &[Coord], dims: Dims) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.same(q, dims))
}

fn same_shape(a: &Shape, b: &Shape, dims: Dims) -> bool {
    match (a, b) {
        (Shape::Point(p), Shape::Point(q)) => p.same(q, dims),
        (Shape::LineString(p), Shape::LineString(q))
        | (Shape::CircularString(p), Shape::CircularString(q)) => same_coords(p, q, dims),
        (Shape::Polygon(p), Shape::Polygon(q)) => {
            p.len() == q.len() && p.iter().zip(q).all(|(r, s)| same_coords(r, s, dims))
        }
        _ => a.geometry_type() == b.geometry_type() && a.members() == b.members(),
    }
}

impl Geometry {
    /// Build and validate a tree with every structural check enabled.
    ///
    /// Member nodes are adopted: their SRID is reset to [`SRID_UNKNOWN`] and
    /// their cached bounding boxes are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use geotree_core::{Coord, Dims, Geometry, Shape};
    ///
    /// let line = Geometry::new(
    ///     Shape::LineString(vec![Coord::xy(0.0, 0.0), Coord::xy(1.0, 1.0)]),
    ///     Dims::XY,
    /// )
    /// .unwrap();
    /// assert_eq!(line.num_coords(), 2);
    ///
    /// // A lone coordinate is not a line.
    /// assert!(Geometry::new(Shape::LineString(vec![Coord::xy(0.0, 0.0)]), Dims::XY).is_err());
    /// ```
    pub fn new(shape: Shape, dims: Dims) -> Result<Self> {
        Self::new_with(shape, dims, Checks::ALL)
    }

    /// Like [`Geometry::new`] with a caller-chosen set of optional checks.
    pub fn new_with(shape: Shape, dims: Dims, checks: Checks) -> Result<Self> {
        let geom = Self::assemble(shape, dims);
        geom.validate_with(checks)?;
        Ok(geom)
    }

    /// Build a node without validation, normalizing coordinates and adopted
    /// members. Decoders use this before running the checks themselves.
    pub(crate) fn assemble(shape: Shape, dims: Dims) -> Self {
        let mut geom = Self::from_parts(shape, dims);
        geom.normalize();
        geom
    }

    pub(crate) fn from_parts(shape: Shape, dims: Dims) -> Self {
        Self {
            shape,
            dims,
            srid: SRID_UNKNOWN,
            bbox: None,
        }
    }

    fn normalize(&mut self) {
        let dims = self.dims;
        if let Some(members) = self.shape.members_mut() {
            for member in members {
                member.srid = SRID_UNKNOWN;
                member.bbox = None;
            }
            return;
        }
        match &mut self.shape {
            Shape::Point(c) => *c = c.masked(dims),
            Shape::LineString(cs) | Shape::CircularString(cs) => {
                cs.iter_mut().for_each(|c| *c = c.masked(dims))
            }
            Shape::Polygon(rings) => rings
                .iter_mut()
                .flatten()
                .for_each(|c| *c = c.masked(dims)),
            _ => {}
        }
    }

    pub fn point(dims: Dims, coord: Coord) -> Self {
        Self::assemble(Shape::Point(coord), dims)
    }

    pub fn line_string(dims: Dims, coords: Vec<Coord>) -> Result<Self> {
        Self::new(Shape::LineString(coords), dims)
    }

    pub fn circular_string(dims: Dims, coords: Vec<Coord>) -> Result<Self> {
        Self::new(Shape::CircularString(coords), dims)
    }

    pub fn polygon(dims: Dims, rings: Vec<Vec<Coord>>) -> Result<Self> {
        Self::new(Shape::Polygon(rings), dims)
    }

    pub fn compound_curve(dims: Dims, segments: Vec<Geometry>) -> Result<Self> {
        Self::new(Shape::CompoundCurve(segments), dims)
    }

    pub fn curve_polygon(dims: Dims, rings: Vec<Geometry>) -> Result<Self> {
        Self::new(Shape::CurvePolygon(rings), dims)
    }

    /// Build any collection type (Multi*, CompoundCurve, CurvePolygon,
    /// GeometryCollection) from its members.
    pub fn collection(kind: GeometryType, dims: Dims, members: Vec<Geometry>) -> Result<Self> {
        let shape = Shape::collection(kind, members).ok_or_else(|| {
            GeometryError::InvalidInput(format!("{kind} is not a collection type"))
        })?;
        Self::new(shape, dims)
    }

    /// An empty geometry of the given type. Points cannot be empty.
    pub fn empty(kind: GeometryType, dims: Dims) -> Result<Self> {
        let shape = match kind {
            GeometryType::Point => {
                return Err(GeometryError::InvalidInput(
                    "a point always holds one coordinate".to_string(),
                ))
            }
            GeometryType::LineString => Shape::LineString(Vec::new()),
            GeometryType::CircularString => Shape::CircularString(Vec::new()),
            GeometryType::Polygon => Shape::Polygon(Vec::new()),
            other => Shape::collection(other, Vec::new()).ok_or_else(|| {
                GeometryError::InvalidInput(format!("{other} is not a collection type"))
            })?,
        };
        Ok(Self::from_parts(shape, dims))
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.set_srid(srid);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mutable access to the payload. Invariants are not re-checked and the
    /// cached bounding box is left untouched; see [`Geometry::validate`] and
    /// [`Geometry::drop_bbox`].
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    pub fn into_shape(self) -> Shape {
        self.shape
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.shape.geometry_type()
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn has_z(&self) -> bool {
        self.dims.has_z
    }

    pub fn has_m(&self) -> bool {
        self.dims.has_m
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Set the root SRID. Descendants are reset to [`SRID_UNKNOWN`].
    pub fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
        if let Some(members) = self.shape.members_mut() {
            for member in members {
                member.set_srid(SRID_UNKNOWN);
            }
        }
    }

    pub fn members(&self) -> &[Geometry] {
        self.shape.members().unwrap_or(&[])
    }

    /// Coordinate sequence of a Point, LineString or CircularString.
    pub fn coords(&self) -> Option<&[Coord]> {
        match &self.shape {
            Shape::Point(c) => Some(std::slice::from_ref(c)),
            Shape::LineString(cs) | Shape::CircularString(cs) => Some(cs),
            _ => None,
        }
    }

    /// Mutable coordinate sequence of a LineString or CircularString.
    pub fn coords_mut(&mut self) -> Option<&mut Vec<Coord>> {
        match &mut self.shape {
            Shape::LineString(cs) | Shape::CircularString(cs) => Some(cs),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.geometry_type().is_collection()
    }

    /// True when the tree holds no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match &self.shape {
            Shape::Point(_) => false,
            Shape::LineString(cs) | Shape::CircularString(cs) => cs.is_empty(),
            Shape::Polygon(rings) => rings.iter().all(Vec::is_empty),
            _ => self.members().iter().all(Geometry::is_empty),
        }
    }

    /// True when any node of the tree is a circular-arc type.
    pub fn has_arc(&self) -> bool {
        match &self.shape {
            Shape::CircularString(_) => true,
            Shape::Point(_) | Shape::LineString(_) | Shape::Polygon(_) => false,
            _ => self.members().iter().any(Geometry::has_arc),
        }
    }

    /// Total number of coordinate tuples in the tree.
    pub fn num_coords(&self) -> usize {
        match &self.shape {
            Shape::Point(_) => 1,
            Shape::LineString(cs) | Shape::CircularString(cs) => cs.len(),
            Shape::Polygon(rings) => rings.iter().map(Vec::len).sum(),
            _ => self.members().iter().map(Geometry::num_coords).sum(),
        }
    }

    /// First coordinate of a curve (LineString, CircularString, CompoundCurve).
    /// Empty compound segments are skipped.
    pub fn start_coord(&self) -> Option<Coord> {
        match &self.shape {
            Shape::LineString(cs) | Shape::CircularString(cs) => cs.first().copied(),
            Shape::CompoundCurve(segments) => segments.iter().find_map(Geometry::start_coord),
            _ => None,
        }
    }

    /// Last coordinate of a curve (LineString, CircularString, CompoundCurve).
    pub fn end_coord(&self) -> Option<Coord> {
        match &self.shape {
            Shape::LineString(cs) | Shape::CircularString(cs) => cs.last().copied(),
            Shape::CompoundCurve(segments) => segments.iter().rev().find_map(Geometry::end_coord),
            _ => None,
        }
    }

    /// Visit every coordinate in tree order.
    pub fn for_each_coord<F: FnMut(&Coord)>(&self, f: &mut F) {
        match &self.shape {
            Shape::Point(c) => f(c),
            Shape::LineString(cs) | Shape::CircularString(cs) => cs.iter().for_each(&mut *f),
            Shape::Polygon(rings) => rings.iter().flatten().for_each(&mut *f),
            _ => {
                for member in self.members() {
                    member.for_each_coord(f);
                }
            }
        }
    }

    /// Rebuild the tree at dimensionality `dims`, passing every coordinate
    /// through `f`. SRID and cached bbox carry over to the new root.
    pub(crate) fn map_coords<F: Fn(Coord) -> Coord>(&self, dims: Dims, f: &F) -> Geometry {
        let map_seq = |cs: &[Coord]| cs.iter().map(|c| f(*c).masked(dims)).collect::<Vec<_>>();
        let shape = match &self.shape {
            Shape::Point(c) => Shape::Point(f(*c).masked(dims)),
            Shape::LineString(cs) => Shape::LineString(map_seq(cs)),
            Shape::CircularString(cs) => Shape::CircularString(map_seq(cs)),
            Shape::Polygon(rings) => Shape::Polygon(rings.iter().map(|r| map_seq(r)).collect()),
            other => {
                let members = self.members().iter().map(|m| m.map_coords(dims, f)).collect();
                Shape::collection(other.geometry_type(), members)
                    .unwrap_or_else(|| other.clone())
            }
        };
        Geometry {
            shape,
            dims,
            srid: self.srid,
            bbox: self.bbox,
        }
    }

    /// Stamp `dims` on every node without touching coordinates. Used once the
    /// text parser has resolved the dimensionality of the whole tree.
    pub(crate) fn stamp_dims(&mut self, dims: Dims) {
        self.dims = dims;
        if let Some(members) = self.shape.members_mut() {
            for member in members {
                member.stamp_dims(dims);
            }
        }
    }

    pub(crate) fn set_cached_bbox(&mut self, bbox: Option<BoundingBox>) {
        self.bbox = bbox;
    }

    // ── Validation ────────────────────────────────────────────────────────────

    /// Re-check every structural invariant of the tree.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(Checks::ALL)
    }

    /// Re-check the tree with a caller-chosen set of optional checks.
    /// Dimension agreement and membership restriction are always enforced.
    pub fn validate_with(&self, checks: Checks) -> Result<()> {
        validate::validate_tree(self, checks)
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    /// Append a member to a container.
    ///
    /// The member must be of a type the container accepts, share its
    /// dimensionality and be valid itself; a CompoundCurve additionally
    /// requires the new segment to start where the last one ends. The cached
    /// bounding box is not updated.
    ///
    /// # Example
    ///
    /// ```
    /// use geotree_core::{Coord, Dims, Geometry, GeometryType};
    ///
    /// let mut multi = Geometry::empty(GeometryType::MultiPoint, Dims::XY).unwrap();
    /// multi.push(Geometry::point(Dims::XY, Coord::xy(1.0, 2.0))).unwrap();
    /// assert_eq!(multi.members().len(), 1);
    ///
    /// let line = Geometry::line_string(Dims::XY, vec![Coord::xy(0.0, 0.0), Coord::xy(1.0, 1.0)]).unwrap();
    /// assert!(multi.push(line).is_err());
    /// ```
    pub fn push(&mut self, mut member: Geometry) -> Result<()> {
        let container = self.geometry_type();
        let index = self.members().len();
        let previous_end = self.members().iter().rev().find_map(Geometry::end_coord);
        validate::check_member(container, self.dims, previous_end, &member, index, Checks::ALL)?;
        member.srid = SRID_UNKNOWN;
        member.bbox = None;
        match self.shape.members_mut() {
            Some(members) => {
                members.push(member);
                Ok(())
            }
            None => Err(GeometryError::UnsupportedMember {
                container,
                member: member.geometry_type(),
                path: NodePath::from(vec![index]),
            }),
        }
    }

    /// Append a ring to a Polygon. The ring must be closed when non-empty.
    /// The cached bounding box is not updated.
    pub fn push_ring(&mut self, ring: Vec<Coord>) -> Result<()> {
        let dims = self.dims;
        let container = self.geometry_type();
        let Shape::Polygon(rings) = &mut self.shape else {
            return Err(GeometryError::UnsupportedMember {
                container,
                member: GeometryType::LineString,
                path: NodePath::root(),
            });
        };
        let ring: Vec<Coord> = ring.into_iter().map(|c| c.masked(dims)).collect();
        validate::check_ring(&ring, dims, Checks::ALL, &NodePath::from(vec![rings.len()]))?;
        rings.push(ring);
        Ok(())
    }

    // ── Bounding box ──────────────────────────────────────────────────────────

    /// The cached bounding box, if one has been computed. It may be stale after
    /// mutation.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    /// Compute the 2D extent of the tree without caching it. `None` when the
    /// tree is empty. Circular arcs contribute their control points only.
    pub fn compute_bbox(&self) -> Option<BoundingBox> {
        let mut extent: Option<BoundingBox> = None;
        self.for_each_coord(&mut |c| {
            extent = Some(match extent {
                Some(b) => b.expand(c.x, c.y),
                None => BoundingBox::around(c.x, c.y),
            });
        });
        extent
    }

    /// Compute and cache the bounding box.
    pub fn add_bbox(&mut self) {
        self.bbox = self.compute_bbox();
    }

    /// Invalidate the cached bounding box.
    pub fn drop_bbox(&mut self) {
        self.bbox = None;
    }
}
