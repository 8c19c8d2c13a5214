use std::fmt::Write as _;

use crate::geometry::{Coord, Dims, Geometry, GeometryType, Shape, SRID_UNKNOWN};

/// Digits after the decimal point used when no precision is given.
pub const DEFAULT_PRECISION: usize = 15;

/// Spelling of the dimensionality in type keywords.
///
/// Only [`Dialect::Iso`] can spell Z on an empty geometry: the plain dialect
/// writes `LINESTRING Z EMPTY` as `LINESTRING EMPTY`, and the extended one
/// keeps just the `M` of a ZM empty. Such empties read back with fewer
/// dimensions than they were written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `POINT(1 2 3)`; the `M` suffix is only written for M-without-Z.
    #[default]
    Plain,
    /// `POINTM(1 2 3 4)`; the `M` suffix is written whenever M is present.
    Extended,
    /// `POINT ZM (1 2 3 4)`.
    Iso,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub dialect: Dialect,
    /// Maximum digits after the decimal point. Trailing zeros are trimmed.
    pub precision: usize,
}

impl WriteOptions {
    pub const fn plain(precision: usize) -> Self {
        Self {
            dialect: Dialect::Plain,
            precision,
        }
    }

    pub const fn extended(precision: usize) -> Self {
        Self {
            dialect: Dialect::Extended,
            precision,
        }
    }

    pub const fn iso(precision: usize) -> Self {
        Self {
            dialect: Dialect::Iso,
            precision,
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::plain(DEFAULT_PRECISION)
    }
}

/// Serialize `geom` as WKT. The SRID is never written; see [`to_ewkt`].
///
/// # Example
///
/// ```
/// use geotree_core::wkt::{self, WriteOptions};
///
/// let geom = wkt::parse("LINESTRING(0 0 1,1 1 2)").unwrap();
/// assert_eq!(wkt::write(&geom, WriteOptions::iso(15)), "LINESTRING Z (0 0 1,1 1 2)");
/// assert_eq!(wkt::write(&geom, WriteOptions::default()), "LINESTRING(0 0 1,1 1 2)");
/// ```
pub fn write(geom: &Geometry, opts: WriteOptions) -> String {
    let mut out = String::with_capacity(16 + geom.num_coords() * 8);
    write_tagged(&mut out, geom, opts);
    out
}

/// Plain-dialect WKT at [`DEFAULT_PRECISION`].
pub fn to_wkt(geom: &Geometry) -> String {
    write(geom, WriteOptions::default())
}

/// Extended-dialect WKT prefixed with `SRID=<n>;` when the SRID is known.
pub fn to_ewkt(geom: &Geometry, precision: usize) -> String {
    let body = write(geom, WriteOptions::extended(precision));
    if geom.srid() == SRID_UNKNOWN {
        body
    } else {
        format!("SRID={};{body}", geom.srid())
    }
}

fn suffix(dims: Dims, dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Plain if dims.has_m && !dims.has_z => "M",
        Dialect::Plain => "",
        Dialect::Extended if dims.has_m => "M",
        Dialect::Extended => "",
        Dialect::Iso => match (dims.has_z, dims.has_m) {
            (false, false) => "",
            (true, false) => " Z",
            (false, true) => " M",
            (true, true) => " ZM",
        },
    }
}

// No coordinates, rings or members at the top level of the node.
fn has_no_parts(shape: &Shape) -> bool {
    match shape {
        Shape::Point(_) => false,
        Shape::LineString(cs) | Shape::CircularString(cs) => cs.is_empty(),
        Shape::Polygon(rings) => rings.is_empty(),
        other => other.members().is_none_or(<[Geometry]>::is_empty),
    }
}

fn write_tagged(out: &mut String, geom: &Geometry, opts: WriteOptions) {
    out.push_str(geom.geometry_type().name());
    out.push_str(suffix(geom.dims(), opts.dialect));
    if has_no_parts(geom.shape()) {
        out.push_str(" EMPTY");
        return;
    }
    if opts.dialect == Dialect::Iso && geom.dims() != Dims::XY {
        out.push(' ');
    }
    write_body(out, geom, opts);
}

fn write_body(out: &mut String, geom: &Geometry, opts: WriteOptions) {
    let dims = geom.dims();
    match geom.shape() {
        Shape::Point(c) => {
            out.push('(');
            write_coord(out, c, dims, opts.precision);
            out.push(')');
        }
        Shape::LineString(cs) | Shape::CircularString(cs) => {
            write_coords(out, cs, dims, opts.precision)
        }
        Shape::Polygon(rings) => write_rings(out, rings, dims, opts.precision),
        Shape::MultiPoint(points) => write_list(out, points, |out, point| {
            if let Shape::Point(c) = point.shape() {
                if opts.dialect == Dialect::Iso {
                    out.push('(');
                    write_coord(out, c, dims, opts.precision);
                    out.push(')');
                } else {
                    write_coord(out, c, dims, opts.precision);
                }
            }
        }),
        Shape::MultiLineString(members) | Shape::MultiPolygon(members) => {
            write_list(out, members, |out, m| write_untagged(out, m, opts))
        }
        Shape::CompoundCurve(members) | Shape::CurvePolygon(members) | Shape::MultiCurve(members) => {
            write_list(out, members, |out, m| {
                if m.geometry_type() == GeometryType::LineString {
                    write_untagged(out, m, opts)
                } else {
                    write_tagged(out, m, opts)
                }
            })
        }
        Shape::MultiSurface(members) => write_list(out, members, |out, m| {
            if m.geometry_type() == GeometryType::Polygon {
                write_untagged(out, m, opts)
            } else {
                write_tagged(out, m, opts)
            }
        }),
        Shape::GeometryCollection(members) => {
            write_list(out, members, |out, m| write_tagged(out, m, opts))
        }
    }
}

// Member written without its keyword: a bare coordinate list or ring list.
fn write_untagged(out: &mut String, geom: &Geometry, opts: WriteOptions) {
    if has_no_parts(geom.shape()) {
        out.push_str("EMPTY");
    } else {
        write_body(out, geom, opts);
    }
}

fn write_list<T>(out: &mut String, items: &[T], mut item: impl FnMut(&mut String, &T)) {
    out.push('(');
    for (i, it) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        item(out, it);
    }
    out.push(')');
}

fn write_rings(out: &mut String, rings: &[Vec<Coord>], dims: Dims, precision: usize) {
    write_list(out, rings, |out, ring| {
        if ring.is_empty() {
            out.push_str("EMPTY");
        } else {
            write_coords(out, ring, dims, precision);
        }
    });
}

fn write_coords(out: &mut String, coords: &[Coord], dims: Dims, precision: usize) {
    write_list(out, coords, |out, c| write_coord(out, c, dims, precision));
}

fn write_coord(out: &mut String, c: &Coord, dims: Dims, precision: usize) {
    for (i, v) in c.ordinates(dims).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_number(out, v, precision);
    }
}

/// Fixed notation, at most `precision` decimals, trailing zeros trimmed.
fn write_number(out: &mut String, v: f64, precision: usize) {
    let start = out.len();
    let _ = write!(out, "{v:.precision$}");
    if out[start..].contains('.') {
        let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed);
    }
    if &out[start..] == "-0" {
        out.truncate(start);
        out.push('0');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Checks;
    use crate::wkt::{parse, parse_with};

    fn number(v: f64, precision: usize) -> String {
        let mut s = String::new();
        write_number(&mut s, v, precision);
        s
    }

    #[test]
    fn number_formatting() {
        assert_eq!(number(1.0, 15), "1");
        assert_eq!(number(0.1, 15), "0.1");
        assert_eq!(number(-2.5, 15), "-2.5");
        assert_eq!(number(1234.5678, 2), "1234.57");
        assert_eq!(number(-0.0001, 2), "0");
        assert_eq!(number(100.0, 0), "100");
        assert_eq!(number(0.141231, 15), "0.141231");
    }

    #[test]
    fn dialects_for_each_dimensionality() {
        let cases = [
            ("POINT(1 2)", "POINT(1 2)", "POINT(1 2)", "POINT(1 2)"),
            ("POINT(1 2 3)", "POINT(1 2 3)", "POINT(1 2 3)", "POINT Z (1 2 3)"),
            ("POINTM(1 2 4)", "POINTM(1 2 4)", "POINTM(1 2 4)", "POINT M (1 2 4)"),
            ("POINT(1 2 3 4)", "POINT(1 2 3 4)", "POINTM(1 2 3 4)", "POINT ZM (1 2 3 4)"),
        ];
        for (input, plain, extended, iso) in cases {
            let g = parse(input).unwrap();
            assert_eq!(write(&g, WriteOptions::plain(15)), plain);
            assert_eq!(write(&g, WriteOptions::extended(15)), extended);
            assert_eq!(write(&g, WriteOptions::iso(15)), iso);
        }
    }

    #[test]
    fn suffix_on_every_nested_keyword() {
        let g = parse("GEOMETRYCOLLECTION M (POINT M (0 0 1),LINESTRING M (0 0 1,1 1 2))").unwrap();
        assert_eq!(
            to_wkt(&g),
            "GEOMETRYCOLLECTIONM(POINTM(0 0 1),LINESTRINGM(0 0 1,1 1 2))"
        );
    }

    #[test]
    fn empties() {
        assert_eq!(to_wkt(&parse("LINESTRING EMPTY").unwrap()), "LINESTRING EMPTY");
        let g = parse("LINESTRING ZM EMPTY").unwrap();
        assert_eq!(write(&g, WriteOptions::iso(15)), "LINESTRING ZM EMPTY");
        assert_eq!(write(&g, WriteOptions::extended(15)), "LINESTRINGM EMPTY");
        let g = parse("GEOMETRYCOLLECTION(POLYGON EMPTY,MULTILINESTRING(EMPTY,(0 0,1 1)))").unwrap();
        assert_eq!(
            to_wkt(&g),
            "GEOMETRYCOLLECTION(POLYGON EMPTY,MULTILINESTRING(EMPTY,(0 0,1 1)))"
        );
    }

    #[test]
    fn z_empties_only_survive_iso() {
        let g = parse("LINESTRING Z EMPTY").unwrap();
        assert_eq!(g.dims(), Dims::XYZ);
        assert_eq!(to_wkt(&g), "LINESTRING EMPTY");
        assert_eq!(parse(&to_wkt(&g)).unwrap().dims(), Dims::XY);
        assert_eq!(parse(&write(&g, WriteOptions::iso(15))).unwrap(), g);
    }

    #[test]
    fn multipoint_members_per_dialect() {
        let g = parse("MULTIPOINT((0 0),(1 1))").unwrap();
        assert_eq!(to_wkt(&g), "MULTIPOINT(0 0,1 1)");
        assert_eq!(write(&g, WriteOptions::iso(15)), "MULTIPOINT((0 0),(1 1))");
    }

    #[test]
    fn curve_containers_write_bare_lines() {
        let text = "COMPOUNDCURVE(CIRCULARSTRING(0 0,1 1,2 0),(2 0,3 0))";
        assert_eq!(to_wkt(&parse(text).unwrap()), text);
        let text = "MULTISURFACE(((0 0,1 0,1 1,0 0)),CURVEPOLYGON(CIRCULARSTRING(0 0,1 0,1 1,1 0,0 0)))";
        assert_eq!(to_wkt(&parse(text).unwrap()), text);
    }

    #[test]
    fn ewkt_prefix() {
        let g = parse("SRID=4326;POINT(1 2 3 4)").unwrap();
        assert_eq!(to_ewkt(&g, 15), "SRID=4326;POINTM(1 2 3 4)");
        assert_eq!(to_wkt(&g), "POINT(1 2 3 4)");
        let g = parse("POINT(1 2)").unwrap();
        assert_eq!(to_ewkt(&g, 15), "POINT(1 2)");
    }

    #[test]
    fn every_dialect_round_trips() {
        let samples = [
            "SRID=3857;MULTIPOLYGON(((0 0,0 10,10 10,0 0),(1 1,1 2,2 2,1 1)))",
            "GEOMETRYCOLLECTION(POINT(0 0 1 2),MULTIPOINT(1 1 1 1))",
            "MULTICURVE((0 0,1 1),CIRCULARSTRING(0 0,1 1,2 0))",
            "CURVEPOLYGON M (COMPOUNDCURVE M (CIRCULARSTRING M (0 0 1,1 1 1,2 0 1),(2 0 1,0 0 1)))",
            "POLYGON Z ((0 0 0,1 0 0,1 1 0,0 0 0),EMPTY)",
            "MULTISURFACE(EMPTY)",
        ];
        for text in samples {
            let g = parse(text).unwrap();
            for opts in [WriteOptions::plain(15), WriteOptions::extended(15), WriteOptions::iso(15)] {
                let written = write(&g, opts);
                let back = parse(&written).unwrap().with_srid(g.srid());
                assert_eq!(back, g, "{written}");
            }
            assert_eq!(parse(&to_ewkt(&g, 15)).unwrap(), g);
        }
    }

    #[test]
    fn relaxed_tree_still_writes() {
        let g = parse_with("CURVEPOLYGON(CIRCULARSTRING(0 0,0 1,1 1))", Checks::NONE).unwrap();
        assert_eq!(to_wkt(&g), "CURVEPOLYGON(CIRCULARSTRING(0 0,0 1,1 1))");
    }
}
