//! Buffer-level I/O, the shape a SQL binding calls into.
//!
//! GeomFromText, GeomFromEWKT, GeomFromWKB, GeomFromHex,
//! AsText, AsEWKT, AsBinary, AsEWKB, AsHex
//!
//! Buffers are in the internal binary format of [`crate::binary`]: the root
//! SRID is always written and a bounding box is cached for everything but
//! points.

use geozero::wkb::Ewkb;
use geozero::ToGeo;

use crate::binary::{self, EncodeOptions};
use crate::engine;
use crate::error::Result;
use crate::geometry::{Geometry, GeometryType, SRID_UNKNOWN};
use crate::wkt::{self, WriteOptions, DEFAULT_PRECISION};

/// Encode a tree the way every `geom_from_*` function stores it.
pub fn store(geom: &Geometry) -> Result<Vec<u8>> {
    let bbox = geom.geometry_type() != GeometryType::Point && !geom.is_empty();
    binary::encode(geom, EncodeOptions::new(true, bbox))
}

// ── Deserialization helpers ───────────────────────────────────────────────────

/// Parse WKT or EWKT into a buffer. `srid`, when given, overrides any
/// `SRID=` prefix in the text.
///
/// # Example
///
/// ```
/// use geotree_core::binary::extract_srid;
/// use geotree_core::functions::io::geom_from_text;
///
/// let blob = geom_from_text("SRID=3857;POINT(1 2)", None).unwrap();
/// assert_eq!(extract_srid(&blob).unwrap(), 3857);
/// let blob = geom_from_text("POINT(1 2)", Some(4326)).unwrap();
/// assert_eq!(extract_srid(&blob).unwrap(), 4326);
/// ```
pub fn geom_from_text(text: &str, srid: Option<i32>) -> Result<Vec<u8>> {
    let mut geom = wkt::parse(text)?;
    if let Some(srid) = srid {
        geom.set_srid(srid);
    }
    store(&geom)
}

/// Read OGC WKB or PostGIS EWKB (linear types only) into a buffer.
///
/// # Example
///
/// ```
/// use geotree_core::binary::extract_srid;
/// use geotree_core::functions::io::{as_binary, geom_from_text, geom_from_wkb};
///
/// let blob = geom_from_text("LINESTRING(0 0,1 1)", None).unwrap();
/// let wkb = as_binary(&blob).unwrap();
/// let restored = geom_from_wkb(&wkb, Some(4326)).unwrap();
/// assert_eq!(extract_srid(&restored).unwrap(), 4326);
/// ```
pub fn geom_from_wkb(wkb: &[u8], srid: Option<i32>) -> Result<Vec<u8>> {
    let geo: geo::Geometry<f64> = Ewkb(wkb).to_geo()?;
    let geom = engine::from_geo(&geo, srid.unwrap_or(SRID_UNKNOWN))?;
    store(&geom)
}

/// Decode hex text of an internal buffer, validating the tree it holds.
pub fn geom_from_hex(hex: &str) -> Result<Vec<u8>> {
    let bytes = binary::from_hex(hex)?;
    let geom = binary::decode(&bytes)?;
    store(&geom)
}

// ── Serialization helpers ─────────────────────────────────────────────────────

/// Plain WKT at full precision.
///
/// # Example
///
/// ```
/// use geotree_core::functions::io::{as_text, geom_from_text};
///
/// let blob = geom_from_text("SRID=4326;CIRCULARSTRING(0 0,0 1,1 1,0 1,2 2)", None).unwrap();
/// assert_eq!(as_text(&blob).unwrap(), "CIRCULARSTRING(0 0,0 1,1 1,0 1,2 2)");
/// ```
pub fn as_text(blob: &[u8]) -> Result<String> {
    as_text_with(blob, WriteOptions::default())
}

pub fn as_text_with(blob: &[u8], opts: WriteOptions) -> Result<String> {
    Ok(wkt::write(&binary::decode(blob)?, opts))
}

/// EWKT: `SRID=n;` followed by the extended dialect.
///
/// # Example
///
/// ```
/// use geotree_core::functions::io::{as_ewkt, geom_from_text};
///
/// let blob = geom_from_text("POINT ZM (1 2 3 4)", Some(4326)).unwrap();
/// assert_eq!(as_ewkt(&blob).unwrap(), "SRID=4326;POINTM(1 2 3 4)");
/// ```
pub fn as_ewkt(blob: &[u8]) -> Result<String> {
    Ok(wkt::to_ewkt(&binary::decode(blob)?, DEFAULT_PRECISION))
}

/// OGC WKB; the SRID is dropped.
pub fn as_binary(blob: &[u8]) -> Result<Vec<u8>> {
    engine::to_wkb(&binary::decode(blob)?)
}

/// PostGIS EWKB, carrying the SRID.
pub fn as_ewkb(blob: &[u8]) -> Result<Vec<u8>> {
    engine::to_ewkb(&binary::decode(blob)?)
}

/// Uppercase hex of a validated buffer.
pub fn as_hex(blob: &[u8]) -> Result<String> {
    binary::decode(blob)?;
    Ok(binary::to_hex(blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{extract_srid, peek_header};
    use crate::error::GeometryError;

    #[test]
    fn invalid_wkt_returns_err() {
        assert!(matches!(
            geom_from_text("NOT_VALID_WKT", None),
            Err(GeometryError::Parse(_))
        ));
    }

    #[test]
    fn invalid_wkb_returns_err() {
        assert!(geom_from_wkb(&[0xFF, 0x00], None).is_err());
    }

    #[test]
    fn points_are_stored_without_bbox() {
        let point = geom_from_text("POINT(1 2)", None).unwrap();
        assert!(!peek_header(&point).unwrap().has_bbox);
        let line = geom_from_text("LINESTRING(1 2,3 4)", None).unwrap();
        assert!(peek_header(&line).unwrap().has_bbox);
    }

    #[test]
    fn ewkt_without_srid() {
        let blob = geom_from_text("POINT(1 2)", None).unwrap();
        assert_eq!(as_ewkt(&blob).unwrap(), "POINT(1 2)");
    }

    #[test]
    fn text_with_iso_dialect() {
        let blob = geom_from_text("LINESTRINGM(0 0 1,1 1 2)", None).unwrap();
        assert_eq!(
            as_text_with(&blob, WriteOptions::iso(3)).unwrap(),
            "LINESTRING M (0 0 1,1 1 2)"
        );
    }

    #[test]
    fn ewkb_keeps_srid_through_wkb_import() {
        let blob = geom_from_text("SRID=4326;MULTIPOINT(0 0,1 1)", None).unwrap();
        let ewkb = as_ewkb(&blob).unwrap();
        let restored = geom_from_wkb(&ewkb, Some(4326)).unwrap();
        assert_eq!(as_text(&restored).unwrap(), "MULTIPOINT(0 0,1 1)");
        assert_eq!(extract_srid(&restored).unwrap(), 4326);
    }

    #[test]
    fn hex_round_trip_validates() {
        let blob = geom_from_text("POLYGON((0 0,0 1,1 1,0 0))", Some(3857)).unwrap();
        let hex = as_hex(&blob).unwrap();
        assert_eq!(geom_from_hex(&hex).unwrap(), blob);
        assert!(geom_from_hex("0Z").is_err());
    }
}
