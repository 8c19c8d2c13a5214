//! Compact recursive binary encoding of a geometry tree.
//!
//! Wire format, per node:
//!
//! ```text
//! [u8]        header: bits 0-3 type code (1=Point, 2=LineString, ...,
//!             15=MultiSurface), 0x10 hasM, 0x20 hasZ,
//!             0x40 hasSRID (root only), 0x80 hasBBox (root only)
//! [i32]       SRID (only when hasSRID)
//! [f32; 4]    xmin, ymin, xmax, ymax (only when hasBBox)
//! ...         payload:
//!               Point:                     one coordinate tuple
//!               LineString/CircularString: [u32] N, N tuples
//!               Polygon:                   [u32] rings, per ring [u32] N + N tuples
//!               every other type:          [u32] N, N nested nodes
//! ```
//!
//! All numbers are little-endian; coordinate tuples are 2 to 4 `f64`
//! ordinates in `x y [z] [m]` order.

use tracing::{debug, trace};

use crate::error::{GeometryError, Result};
use crate::geometry::{
    BoundingBox, Checks, Coord, Dims, Geometry, GeometryType, Shape, MAX_DEPTH, SRID_UNKNOWN,
};

// ── Header flag constants ─────────────────────────────────────────────────────
pub const TYPE_MASK: u8 = 0x0F;
pub const M_FLAG: u8 = 0x10;
pub const Z_FLAG: u8 = 0x20;
pub const SRID_FLAG: u8 = 0x40;
pub const BBOX_FLAG: u8 = 0x80;

const COUNT_LEN: usize = 4;
const BBOX_LEN: usize = 16;
// Smallest possible nested node: a header byte plus an empty count.
const MIN_NODE_LEN: usize = 1 + COUNT_LEN;

/// Which optional root fields to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Emit the root SRID (skipped when it is [`SRID_UNKNOWN`]).
    pub srid: bool,
    /// Emit the bounding box: the cached one if present, else a freshly
    /// computed one. Skipped for empty trees.
    pub bbox: bool,
}

impl EncodeOptions {
    pub const fn new(srid: bool, bbox: bool) -> Self {
        Self { srid, bbox }
    }
}

/// Decoder limits and checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub checks: Checks,
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            checks: Checks::ALL,
            max_depth: MAX_DEPTH,
        }
    }
}

/// Parsed header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub geom_type: GeometryType,
    pub dims: Dims,
    pub has_srid: bool,
    pub has_bbox: bool,
}

impl Header {
    pub fn to_byte(self) -> u8 {
        let mut byte = self.geom_type.code();
        if self.dims.has_m {
            byte |= M_FLAG;
        }
        if self.dims.has_z {
            byte |= Z_FLAG;
        }
        if self.has_srid {
            byte |= SRID_FLAG;
        }
        if self.has_bbox {
            byte |= BBOX_FLAG;
        }
        byte
    }

    /// `None` when the type code is unknown.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(Self {
            geom_type: GeometryType::from_code(byte & TYPE_MASK)?,
            dims: Dims::new(byte & Z_FLAG != 0, byte & M_FLAG != 0),
            has_srid: byte & SRID_FLAG != 0,
            has_bbox: byte & BBOX_FLAG != 0,
        })
    }
}

/// Peek at the root header without decoding the payload.
///
/// # Example
///
/// ```
/// use geotree_core::binary::{encode, peek_header, EncodeOptions};
/// use geotree_core::{wkt, GeometryType};
///
/// let geom = wkt::parse("SRID=4326;POINT(1 2)").unwrap();
/// let buf = encode(&geom, EncodeOptions::new(true, false)).unwrap();
/// let hdr = peek_header(&buf).unwrap();
/// assert_eq!(hdr.geom_type, GeometryType::Point);
/// assert!(hdr.has_srid);
/// ```
pub fn peek_header(buf: &[u8]) -> Result<Header> {
    let byte = *buf.first().ok_or(GeometryError::MalformedBuffer {
        offset: 0,
        reason: "buffer is empty",
    })?;
    Header::from_byte(byte).ok_or(GeometryError::MalformedBuffer {
        offset: 0,
        reason: "unknown type code",
    })
}

/// Extract only the SRID (cheap, no payload decoding).
pub fn extract_srid(buf: &[u8]) -> Result<i32> {
    let header = peek_header(buf)?;
    if !header.has_srid {
        return Ok(SRID_UNKNOWN);
    }
    let mut cursor = Cursor::new(buf);
    cursor.read_u8()?;
    cursor.read_i32()
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serialise a tree.
///
/// # Example
///
/// ```
/// use geotree_core::binary::{decode, encode, EncodeOptions};
/// use geotree_core::wkt;
///
/// let geom = wkt::parse("LINESTRING(0 0,1 1)").unwrap();
/// let buf = encode(&geom, EncodeOptions::default()).unwrap();
/// // header + count + two XY tuples
/// assert_eq!(buf.len(), 1 + 4 + 2 * 16);
/// assert_eq!(decode(&buf).unwrap(), geom);
/// ```
pub fn encode(geom: &Geometry, opts: EncodeOptions) -> Result<Vec<u8>> {
    let srid = (opts.srid && geom.srid() != SRID_UNKNOWN).then_some(geom.srid());
    let bbox = if opts.bbox {
        geom.bbox().or_else(|| geom.compute_bbox())
    } else {
        None
    };

    let mut out = Vec::with_capacity(encoded_len(geom, srid.is_some(), bbox.is_some()));
    let header = Header {
        geom_type: geom.geometry_type(),
        dims: geom.dims(),
        has_srid: srid.is_some(),
        has_bbox: bbox.is_some(),
    };
    out.push(header.to_byte());
    if let Some(srid) = srid {
        out.extend_from_slice(&srid.to_le_bytes());
    }
    if let Some(b) = bbox {
        for v in [b.xmin, b.ymin, b.xmax, b.ymax] {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    write_payload(&mut out, geom)?;
    debug!(kind = %geom.geometry_type(), len = out.len(), "encoded geometry");
    Ok(out)
}

/// Exact size of the encoding produced by [`encode`] for the given root flags.
pub fn encoded_len(geom: &Geometry, with_srid: bool, with_bbox: bool) -> usize {
    let mut len = 1 + payload_len(geom);
    if with_srid {
        len += 4;
    }
    if with_bbox {
        len += BBOX_LEN;
    }
    len
}

fn payload_len(geom: &Geometry) -> usize {
    let tuple = 8 * geom.dims().ordinates();
    match geom.shape() {
        Shape::Point(_) => tuple,
        Shape::LineString(cs) | Shape::CircularString(cs) => COUNT_LEN + cs.len() * tuple,
        Shape::Polygon(rings) => {
            COUNT_LEN
                + rings
                    .iter()
                    .map(|r| COUNT_LEN + r.len() * tuple)
                    .sum::<usize>()
        }
        _ => {
            COUNT_LEN
                + geom
                    .members()
                    .iter()
                    .map(|m| 1 + payload_len(m))
                    .sum::<usize>()
        }
    }
}

fn write_count(out: &mut Vec<u8>, n: usize) -> Result<()> {
    let n = u32::try_from(n)
        .map_err(|_| GeometryError::InvalidInput(format!("count {n} exceeds u32 range")))?;
    out.extend_from_slice(&n.to_le_bytes());
    Ok(())
}

fn write_coord(out: &mut Vec<u8>, c: &Coord, dims: Dims) {
    for v in c.ordinates(dims) {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn write_coords(out: &mut Vec<u8>, coords: &[Coord], dims: Dims) -> Result<()> {
    write_count(out, coords.len())?;
    for c in coords {
        write_coord(out, c, dims);
    }
    Ok(())
}

fn write_payload(out: &mut Vec<u8>, geom: &Geometry) -> Result<()> {
    let dims = geom.dims();
    match geom.shape() {
        Shape::Point(c) => write_coord(out, c, dims),
        Shape::LineString(cs) | Shape::CircularString(cs) => write_coords(out, cs, dims)?,
        Shape::Polygon(rings) => {
            write_count(out, rings.len())?;
            for ring in rings {
                write_coords(out, ring, dims)?;
            }
        }
        _ => {
            let members = geom.members();
            write_count(out, members.len())?;
            for member in members {
                let header = Header {
                    geom_type: member.geometry_type(),
                    dims: member.dims(),
                    has_srid: false,
                    has_bbox: false,
                };
                out.push(header.to_byte());
                write_payload(out, member)?;
            }
        }
    }
    Ok(())
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Bounds-checked reader over an untrusted buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn malformed(&self, reason: &'static str) -> GeometryError {
        GeometryError::MalformedBuffer {
            offset: self.pos,
            reason,
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.remaining() < N {
            return Err(self.malformed("unexpected end of buffer"));
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    /// Read an element count and make sure `count * min_elem_len` bytes can
    /// still follow, before anything is allocated for it.
    fn read_count(&mut self, min_elem_len: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        let needed = count
            .checked_mul(min_elem_len)
            .ok_or_else(|| self.malformed("element count overflows"))?;
        if needed > self.remaining() {
            return Err(self.malformed("element count exceeds remaining buffer"));
        }
        Ok(count)
    }

    fn read_coord(&mut self, dims: Dims) -> Result<Coord> {
        let mut c = Coord::xy(self.read_f64()?, self.read_f64()?);
        if dims.has_z {
            c.z = self.read_f64()?;
        }
        if dims.has_m {
            c.m = self.read_f64()?;
        }
        Ok(c)
    }

    fn read_coords(&mut self, dims: Dims) -> Result<Vec<Coord>> {
        let n = self.read_count(8 * dims.ordinates())?;
        let mut coords = Vec::with_capacity(n);
        for _ in 0..n {
            coords.push(self.read_coord(dims)?);
        }
        Ok(coords)
    }
}

/// Decode a buffer with every structural check enabled.
pub fn decode(buf: &[u8]) -> Result<Geometry> {
    decode_with(buf, DecodeOptions::default())
}

/// Decode a buffer with caller-chosen checks and depth limit.
///
/// A buffer that is well formed but violates a structural invariant is
/// rejected all the same: no partially valid tree is ever returned.
pub fn decode_with(buf: &[u8], opts: DecodeOptions) -> Result<Geometry> {
    debug!(len = buf.len(), "decoding geometry");
    let mut cursor = Cursor::new(buf);
    let geom = decode_node(&mut cursor, 0, &opts)?;
    if cursor.remaining() != 0 {
        return Err(cursor.malformed("trailing bytes after geometry"));
    }
    geom.validate_with(opts.checks)?;
    Ok(geom)
}

fn decode_node(cursor: &mut Cursor<'_>, depth: usize, opts: &DecodeOptions) -> Result<Geometry> {
    if depth > opts.max_depth {
        return Err(cursor.malformed("maximum nesting depth exceeded"));
    }
    let byte = cursor.read_u8()?;
    let header = Header::from_byte(byte).ok_or(GeometryError::MalformedBuffer {
        offset: cursor.pos - 1,
        reason: "unknown type code",
    })?;
    trace!(kind = %header.geom_type, depth, "decoding node");

    if depth > 0 && (header.has_srid || header.has_bbox) {
        return Err(GeometryError::MalformedBuffer {
            offset: cursor.pos - 1,
            reason: "SRID or bbox flag on a nested geometry",
        });
    }
    let srid = if header.has_srid {
        cursor.read_i32()?
    } else {
        SRID_UNKNOWN
    };
    let bbox = if header.has_bbox {
        Some(BoundingBox {
            xmin: cursor.read_f32()?,
            ymin: cursor.read_f32()?,
            xmax: cursor.read_f32()?,
            ymax: cursor.read_f32()?,
        })
    } else {
        None
    };

    let dims = header.dims;
    let shape = match header.geom_type {
        GeometryType::Point => Shape::Point(cursor.read_coord(dims)?),
        GeometryType::LineString => Shape::LineString(cursor.read_coords(dims)?),
        GeometryType::CircularString => Shape::CircularString(cursor.read_coords(dims)?),
        GeometryType::Polygon => {
            let n = cursor.read_count(COUNT_LEN)?;
            let mut rings = Vec::with_capacity(n);
            for _ in 0..n {
                rings.push(cursor.read_coords(dims)?);
            }
            Shape::Polygon(rings)
        }
        kind => {
            let n = cursor.read_count(MIN_NODE_LEN)?;
            let mut members = Vec::with_capacity(n);
            for _ in 0..n {
                members.push(decode_node(cursor, depth + 1, opts)?);
            }
            Shape::collection(kind, members)
                .ok_or_else(|| cursor.malformed("unknown type code"))?
        }
    };

    let mut geom = Geometry::from_parts(shape, dims);
    geom.set_srid(srid);
    geom.set_cached_bbox(bbox);
    Ok(geom)
}

// ── Hex helpers ───────────────────────────────────────────────────────────────

/// Uppercase hex rendering of an encoded buffer.
pub fn to_hex(buf: &[u8]) -> String {
    buf.iter().map(|b| format!("{b:02X}")).collect()
}

/// Parse a hex string (either case) back into bytes.
pub fn from_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(GeometryError::InvalidInput(
            "hex input has odd length".to_string(),
        ));
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| GeometryError::InvalidInput(format!("invalid hex digits {pair:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rule;
    use crate::wkt;

    fn point_buf(x: f64, y: f64) -> Vec<u8> {
        let mut buf = vec![GeometryType::Point.code()];
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
        buf
    }

    fn malformed_reason(err: GeometryError) -> &'static str {
        match err {
            GeometryError::MalformedBuffer { reason, .. } => reason,
            other => panic!("expected MalformedBuffer, got {other:?}"),
        }
    }

    #[test]
    fn stray_inactive_ordinate_survives_round_trip_equality() {
        let mut geom = wkt::parse("LINESTRING(0 0,1 1)").unwrap();
        geom.coords_mut().unwrap()[0].z = 7.0;
        let buf = encode(&geom, EncodeOptions::new(true, false)).unwrap();
        assert_eq!(decode(&buf).unwrap(), geom);
    }

    #[test]
    fn gap_behind_empty_segment_is_rejected_on_decode() {
        let gapped =
            wkt::parse_with("COMPOUNDCURVE((0 0,1 1),EMPTY,(5 5,6 6))", Checks::NONE).unwrap();
        let buf = encode(&gapped, EncodeOptions::new(false, false)).unwrap();
        assert!(decode(&buf).is_err());
        let relaxed = DecodeOptions {
            checks: Checks::NONE,
            ..DecodeOptions::default()
        };
        assert!(decode_with(&buf, relaxed).is_ok());
    }

    #[test]
    fn header_byte_layout() {
        let header = Header {
            geom_type: GeometryType::LineString,
            dims: Dims::XYZM,
            has_srid: true,
            has_bbox: false,
        };
        assert_eq!(header.to_byte(), 0x02 | Z_FLAG | M_FLAG | SRID_FLAG);
        assert_eq!(Header::from_byte(header.to_byte()), Some(header));
        assert_eq!(Header::from_byte(0x0A), None);
    }

    #[test]
    fn point_layout_is_header_plus_ordinates() {
        let geom = Geometry::point(Dims::XY, Coord::xy(1.0, 2.0));
        let buf = encode(&geom, EncodeOptions::default()).unwrap();
        assert_eq!(buf, point_buf(1.0, 2.0));
    }

    #[test]
    fn srid_and_bbox_only_on_root() {
        let geom = wkt::parse("SRID=4326;MULTIPOINT(0 0,2 3)").unwrap();
        let buf = encode(&geom, EncodeOptions::new(true, true)).unwrap();
        assert_eq!(buf[0] & (SRID_FLAG | BBOX_FLAG), SRID_FLAG | BBOX_FLAG);
        assert_eq!(extract_srid(&buf).unwrap(), 4326);
        // root header + srid + bbox + count, then first child header
        let child = buf[1 + 4 + BBOX_LEN + COUNT_LEN];
        assert_eq!(child & (SRID_FLAG | BBOX_FLAG), 0);
        assert_eq!(buf.len(), encoded_len(&geom, true, true));

        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded, geom);
        assert_eq!(
            decoded.bbox(),
            Some(BoundingBox {
                xmin: 0.0,
                ymin: 0.0,
                xmax: 2.0,
                ymax: 3.0
            })
        );
    }

    #[test]
    fn unknown_srid_is_not_emitted() {
        let geom = wkt::parse("POINT(1 2)").unwrap();
        let buf = encode(&geom, EncodeOptions::new(true, false)).unwrap();
        assert_eq!(buf[0] & SRID_FLAG, 0);
        assert_eq!(extract_srid(&buf).unwrap(), SRID_UNKNOWN);
    }

    #[test]
    fn empty_tree_has_no_bbox() {
        let geom = wkt::parse("LINESTRING EMPTY").unwrap();
        let buf = encode(&geom, EncodeOptions::new(false, true)).unwrap();
        assert_eq!(buf, vec![GeometryType::LineString.code(), 0, 0, 0, 0]);
    }

    #[test]
    fn rejects_truncated_point() {
        let mut buf = point_buf(1.0, 2.0);
        buf.truncate(12);
        assert_eq!(malformed_reason(decode(&buf).unwrap_err()), "unexpected end of buffer");
    }

    #[test]
    fn rejects_unknown_type_code() {
        assert_eq!(malformed_reason(decode(&[0x0B]).unwrap_err()), "unknown type code");
        assert_eq!(malformed_reason(decode(&[]).unwrap_err()), "unexpected end of buffer");
    }

    #[test]
    fn rejects_oversized_count_before_allocating() {
        let mut buf = vec![GeometryType::LineString.code()];
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(&[0u8; 32]);
        assert_eq!(
            malformed_reason(decode(&buf).unwrap_err()),
            "element count exceeds remaining buffer"
        );

        let mut gc = vec![GeometryType::GeometryCollection.code()];
        gc.extend_from_slice(&1_000_000u32.to_le_bytes());
        assert!(decode(&gc).is_err());
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut buf = Vec::new();
        for _ in 0..=MAX_DEPTH + 1 {
            buf.push(GeometryType::GeometryCollection.code());
            buf.extend_from_slice(&1u32.to_le_bytes());
        }
        buf.extend_from_slice(&point_buf(0.0, 0.0));
        assert_eq!(
            malformed_reason(decode(&buf).unwrap_err()),
            "maximum nesting depth exceeded"
        );
    }

    #[test]
    fn rejects_srid_on_child() {
        let mut buf = vec![GeometryType::MultiPoint.code()];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(GeometryType::Point.code() | SRID_FLAG);
        buf.extend_from_slice(&4326i32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        assert_eq!(
            malformed_reason(decode(&buf).unwrap_err()),
            "SRID or bbox flag on a nested geometry"
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut buf = point_buf(0.0, 0.0);
        buf.push(0);
        assert_eq!(
            malformed_reason(decode(&buf).unwrap_err()),
            "trailing bytes after geometry"
        );
    }

    #[test]
    fn well_formed_but_invalid_is_rejected() {
        // MultiPoint holding an XYZ point under an XY header.
        let mut buf = vec![GeometryType::MultiPoint.code()];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(GeometryType::Point.code() | Z_FLAG);
        for v in [1.0f64, 2.0, 3.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        match decode(&buf).unwrap_err() {
            GeometryError::InvalidGeometry { rule, path } => {
                assert_eq!(rule, Rule::MixedDimensions);
                assert_eq!(path.to_string(), "$[0]");
            }
            other => panic!("unexpected {other:?}"),
        }

        // MultiPoint holding a LineString.
        let mut buf = vec![GeometryType::MultiPoint.code()];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(GeometryType::LineString.code());
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            decode(&buf).unwrap_err(),
            GeometryError::UnsupportedMember { .. }
        ));
    }

    #[test]
    fn unclosed_ring_rejected_unless_relaxed() {
        let mut buf = vec![GeometryType::Polygon.code()];
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&4u32.to_le_bytes());
        for (x, y) in [(0.0f64, 0.0f64), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            buf.extend_from_slice(&x.to_le_bytes());
            buf.extend_from_slice(&y.to_le_bytes());
        }
        assert!(decode(&buf).is_err());
        let relaxed = DecodeOptions {
            checks: Checks::NONE,
            ..DecodeOptions::default()
        };
        assert_eq!(decode_with(&buf, relaxed).unwrap().num_coords(), 4);
    }

    #[test]
    fn curve_types_round_trip() {
        let text = "CURVEPOLYGON(COMPOUNDCURVE(CIRCULARSTRING(0 0,1 1,2 0),(2 0,0 0)))";
        let geom = wkt::parse(text).unwrap();
        let buf = encode(&geom, EncodeOptions::default()).unwrap();
        assert_eq!(buf[0] & TYPE_MASK, GeometryType::CurvePolygon.code());
        assert_eq!(decode(&buf).unwrap(), geom);
    }

    #[test]
    fn zm_round_trip_keeps_all_ordinates() {
        let geom = wkt::parse("LINESTRING ZM (0 0 1 2,1 1 3 4)").unwrap();
        let buf = encode(&geom, EncodeOptions::default()).unwrap();
        assert_eq!(buf.len(), 1 + 4 + 2 * 32);
        assert_eq!(decode(&buf).unwrap(), geom);
    }

    #[test]
    fn hex_round_trip() {
        let buf = point_buf(1.0, -1.0);
        let hex = to_hex(&buf);
        assert!(hex.starts_with("01"));
        assert_eq!(from_hex(&hex).unwrap(), buf);
        assert_eq!(from_hex(&hex.to_lowercase()).unwrap(), buf);
        assert!(from_hex("0").is_err());
        assert!(from_hex("ZZ").is_err());
    }
}
