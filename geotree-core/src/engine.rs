//! Boundary to the `geo` / `geozero` ecosystem.
//!
//! A [`Geometry`] is a [`GeozeroGeometry`], so it can be streamed into any
//! geozero processor: the `geo` writer behind [`to_geo`] or the WKB writer
//! behind [`to_wkb`] and [`to_ewkb`]. [`from_geo`] goes the other way.
//!
//! `geo` has no curved types, so trees holding circular arcs or curve
//! containers are refused with [`GeometryError::CurveNotSupported`].

use geozero::error::Result as GeozeroResult;
use geozero::{CoordDimensions, GeomProcessor, GeozeroGeometry, ToGeo, ToWkb};
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{Coord, Dims, Geometry, GeometryType, Shape, SRID_UNKNOWN};

fn coord_dimensions(dims: Dims) -> CoordDimensions {
    CoordDimensions {
        z: dims.has_z,
        m: dims.has_m,
        t: false,
        tm: false,
    }
}

impl GeozeroGeometry for Geometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> GeozeroResult<()> {
        process(self, true, 0, processor)
    }

    fn dims(&self) -> CoordDimensions {
        coord_dimensions(Geometry::dims(self))
    }

    fn srid(&self) -> Option<i32> {
        let srid = Geometry::srid(self);
        (srid != SRID_UNKNOWN).then_some(srid)
    }
}

fn process_coord<P: GeomProcessor>(
    c: &Coord,
    dims: Dims,
    multi_dim: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    if multi_dim {
        processor.coordinate(
            c.x,
            c.y,
            dims.has_z.then_some(c.z),
            dims.has_m.then_some(c.m),
            None,
            None,
            idx,
        )
    } else {
        processor.xy(c.x, c.y, idx)
    }
}

fn process_line<P: GeomProcessor>(
    coords: &[Coord],
    dims: Dims,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    let multi_dim = processor.multi_dim();
    processor.linestring_begin(tagged, coords.len(), idx)?;
    for (i, c) in coords.iter().enumerate() {
        process_coord(c, dims, multi_dim, i, processor)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<P: GeomProcessor>(
    rings: &[Vec<Coord>],
    dims: Dims,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    processor.polygon_begin(tagged, rings.len(), idx)?;
    for (i, ring) in rings.iter().enumerate() {
        process_line(ring, dims, false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

// `tagged` is false for members whose type is implied by the container.
fn process<P: GeomProcessor>(
    geom: &Geometry,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> GeozeroResult<()> {
    let dims = geom.dims();
    let multi_dim = processor.multi_dim();
    match geom.shape() {
        Shape::Point(c) => {
            processor.point_begin(idx)?;
            process_coord(c, dims, multi_dim, 0, processor)?;
            processor.point_end(idx)
        }
        Shape::LineString(cs) => process_line(cs, dims, tagged, idx, processor),
        Shape::CircularString(cs) => {
            processor.circularstring_begin(cs.len(), idx)?;
            for (i, c) in cs.iter().enumerate() {
                process_coord(c, dims, multi_dim, i, processor)?;
            }
            processor.circularstring_end(idx)
        }
        Shape::Polygon(rings) => process_polygon(rings, dims, tagged, idx, processor),
        Shape::MultiPoint(points) => {
            processor.multipoint_begin(points.len(), idx)?;
            for (i, point) in points.iter().enumerate() {
                if let Shape::Point(c) = point.shape() {
                    process_coord(c, dims, multi_dim, i, processor)?;
                }
            }
            processor.multipoint_end(idx)
        }
        Shape::MultiLineString(lines) => {
            processor.multilinestring_begin(lines.len(), idx)?;
            for (i, line) in lines.iter().enumerate() {
                if let Shape::LineString(cs) = line.shape() {
                    process_line(cs, dims, false, i, processor)?;
                }
            }
            processor.multilinestring_end(idx)
        }
        Shape::MultiPolygon(polygons) => {
            processor.multipolygon_begin(polygons.len(), idx)?;
            for (i, polygon) in polygons.iter().enumerate() {
                if let Shape::Polygon(rings) = polygon.shape() {
                    process_polygon(rings, dims, false, i, processor)?;
                }
            }
            processor.multipolygon_end(idx)
        }
        Shape::CompoundCurve(segments) => {
            processor.compoundcurve_begin(segments.len(), idx)?;
            process_members(segments, false, processor)?;
            processor.compoundcurve_end(idx)
        }
        Shape::CurvePolygon(rings) => {
            processor.curvepolygon_begin(rings.len(), idx)?;
            process_members(rings, false, processor)?;
            processor.curvepolygon_end(idx)
        }
        Shape::MultiCurve(curves) => {
            processor.multicurve_begin(curves.len(), idx)?;
            process_members(curves, false, processor)?;
            processor.multicurve_end(idx)
        }
        Shape::MultiSurface(surfaces) => {
            processor.multisurface_begin(surfaces.len(), idx)?;
            process_members(surfaces, false, processor)?;
            processor.multisurface_end(idx)
        }
        Shape::GeometryCollection(members) => {
            processor.geometrycollection_begin(members.len(), idx)?;
            process_members(members, true, processor)?;
            processor.geometrycollection_end(idx)
        }
    }
}

fn process_members<P: GeomProcessor>(
    members: &[Geometry],
    tagged: bool,
    processor: &mut P,
) -> GeozeroResult<()> {
    members
        .iter()
        .enumerate()
        .try_for_each(|(i, m)| process(m, tagged, i, processor))
}

/// First node type in the tree that `geo` cannot represent.
fn curved_type(geom: &Geometry) -> Option<GeometryType> {
    match geom.geometry_type() {
        kind @ (GeometryType::CircularString
        | GeometryType::CompoundCurve
        | GeometryType::CurvePolygon
        | GeometryType::MultiCurve
        | GeometryType::MultiSurface) => Some(kind),
        _ => geom.members().iter().find_map(curved_type),
    }
}

/// Convert to a `geo` geometry. Only X and Y survive; the SRID is dropped.
///
/// # Example
///
/// ```
/// use geotree_core::{engine, wkt};
///
/// let tree = wkt::parse("POLYGON((0 0,4 0,4 4,0 0))").unwrap();
/// let geo::Geometry::Polygon(poly) = engine::to_geo(&tree).unwrap() else {
///     panic!("expected a polygon");
/// };
/// assert_eq!(poly.exterior().0.len(), 4);
///
/// let arc = wkt::parse("CIRCULARSTRING(0 0,1 1,2 0)").unwrap();
/// assert!(engine::to_geo(&arc).is_err());
/// ```
pub fn to_geo(geom: &Geometry) -> Result<geo::Geometry<f64>> {
    if let Some(kind) = curved_type(geom) {
        return Err(GeometryError::CurveNotSupported(kind));
    }
    Ok(ToGeo::to_geo(geom)?)
}

/// Build a tree from a `geo` geometry. `Line` becomes a two-point
/// LineString; `Rect` and `Triangle` become Polygons.
pub fn from_geo(geom: &geo::Geometry<f64>, srid: i32) -> Result<Geometry> {
    let tree = convert(geom);
    tree.validate()?;
    Ok(tree.with_srid(srid))
}

fn geo_coord(c: geo::Coord<f64>) -> Coord {
    Coord::xy(c.x, c.y)
}

fn geo_line(line: &geo::LineString<f64>) -> Vec<Coord> {
    line.0.iter().copied().map(geo_coord).collect()
}

fn geo_rings(polygon: &geo::Polygon<f64>) -> Vec<Vec<Coord>> {
    if polygon.exterior().0.is_empty() {
        return Vec::new();
    }
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(geo_line)
        .collect()
}

fn leaf(shape: Shape) -> Geometry {
    Geometry::from_parts(shape, Dims::XY)
}

fn convert(geom: &geo::Geometry<f64>) -> Geometry {
    use geo::Geometry as G;
    let shape = match geom {
        G::Point(p) => Shape::Point(geo_coord(p.0)),
        G::Line(l) => Shape::LineString(vec![geo_coord(l.start), geo_coord(l.end)]),
        G::LineString(ls) => Shape::LineString(geo_line(ls)),
        G::Polygon(p) => Shape::Polygon(geo_rings(p)),
        G::MultiPoint(mp) => Shape::MultiPoint(
            mp.0.iter()
                .map(|p| leaf(Shape::Point(geo_coord(p.0))))
                .collect(),
        ),
        G::MultiLineString(mls) => Shape::MultiLineString(
            mls.0.iter()
                .map(|ls| leaf(Shape::LineString(geo_line(ls))))
                .collect(),
        ),
        G::MultiPolygon(mp) => Shape::MultiPolygon(
            mp.0.iter()
                .map(|p| leaf(Shape::Polygon(geo_rings(p))))
                .collect(),
        ),
        G::GeometryCollection(gc) => Shape::GeometryCollection(gc.0.iter().map(convert).collect()),
        G::Rect(r) => Shape::Polygon(geo_rings(&r.to_polygon())),
        G::Triangle(t) => Shape::Polygon(geo_rings(&t.to_polygon())),
    };
    leaf(shape)
}

/// OGC WKB with the tree's own dimensions.
pub fn to_wkb(geom: &Geometry) -> Result<Vec<u8>> {
    let bytes = ToWkb::to_wkb(geom, GeozeroGeometry::dims(geom))?;
    debug!(kind = %geom.geometry_type(), len = bytes.len(), "exported WKB");
    Ok(bytes)
}

/// PostGIS EWKB with the tree's own dimensions and SRID.
///
/// # Example
///
/// ```
/// use geotree_core::{engine, wkt};
///
/// let tree = wkt::parse("SRID=4326;POINT(1 2)").unwrap();
/// let ewkb = engine::to_ewkb(&tree).unwrap();
/// // little endian, Point with the SRID flag, then SRID 4326
/// assert_eq!(&ewkb[..9], &[0x01, 0x01, 0x00, 0x00, 0x20, 0xE6, 0x10, 0x00, 0x00]);
/// ```
pub fn to_ewkb(geom: &Geometry) -> Result<Vec<u8>> {
    let bytes = ToWkb::to_ewkb(geom, GeozeroGeometry::dims(geom), GeozeroGeometry::srid(geom))?;
    debug!(kind = %geom.geometry_type(), len = bytes.len(), "exported EWKB");
    Ok(bytes)
}
