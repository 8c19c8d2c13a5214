use tracing::debug;

use crate::error::{ParseError, Result};
use crate::geometry::{
    Checks, Coord, Dims, Geometry, GeometryType, Shape, MAX_DEPTH, SRID_UNKNOWN,
};

type PResult<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Number(&'a str),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Equals,
    Eof,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{w}'"),
            Token::Number(n) => format!("number {n}"),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn scan_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        let src = self.src;
        let rest = &src[start..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos = start + len;
        &src[start..start + len]
    }

    fn next_token(&mut self) -> PResult<(Token<'a>, usize)> {
        let rest = &self.src[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
        let start = self.pos;
        let Some(c) = self.src[start..].chars().next() else {
            return Ok((Token::Eof, start));
        };
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '=' => Token::Equals,
            c if c.is_ascii_alphabetic() => {
                return Ok((Token::Word(self.scan_while(start, |c| c.is_ascii_alphabetic())), start));
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                let text = self.scan_while(start, |c| {
                    c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
                });
                return Ok((Token::Number(text), start));
            }
            other => {
                return Err(ParseError::new(
                    format!("unexpected character '{other}'"),
                    start,
                ))
            }
        };
        self.pos = start + c.len_utf8();
        Ok((token, start))
    }
}

/// Dimensionality known so far for the tree being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DimHint {
    Unknown,
    /// Legacy `...M` keyword seen; Z follows from the ordinate count.
    LegacyM,
    Fixed(Dims),
}

impl DimHint {
    fn resolve(self) -> Dims {
        match self {
            DimHint::Unknown => Dims::XY,
            DimHint::LegacyM => Dims::XYM,
            DimHint::Fixed(dims) => dims,
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<(Token<'a>, usize)>,
    hint: DimHint,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
            peeked: None,
            hint: DimHint::Unknown,
            depth: 0,
        }
    }

    fn peek(&mut self) -> PResult<(Token<'a>, usize)> {
        if let Some(t) = self.peeked {
            return Ok(t);
        }
        let t = self.lexer.next_token()?;
        self.peeked = Some(t);
        Ok(t)
    }

    fn next(&mut self) -> PResult<(Token<'a>, usize)> {
        match self.peeked.take() {
            Some(t) => Ok(t),
            None => self.lexer.next_token(),
        }
    }

    fn expect(&mut self, want: Token<'static>, label: &'static str) -> PResult<()> {
        let (tok, offset) = self.next()?;
        if tok == want {
            Ok(())
        } else {
            Err(ParseError::expected(label, &tok.describe(), offset))
        }
    }

    fn peek_is(&mut self, want: Token<'static>) -> PResult<bool> {
        Ok(self.peek()?.0 == want)
    }

    fn peek_word(&mut self, word: &str) -> PResult<bool> {
        Ok(matches!(self.peek()?.0, Token::Word(w) if w.eq_ignore_ascii_case(word)))
    }

    fn eat_empty(&mut self) -> PResult<bool> {
        if self.peek_word("EMPTY")? {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn srid_prefix(&mut self) -> PResult<i32> {
        if !self.peek_word("SRID")? {
            return Ok(SRID_UNKNOWN);
        }
        self.next()?;
        self.expect(Token::Equals, "'='")?;
        let (tok, offset) = self.next()?;
        let srid = match tok {
            Token::Number(text) => text
                .parse::<i32>()
                .map_err(|_| ParseError::new(format!("invalid SRID {text}"), offset))?,
            other => return Err(ParseError::expected("SRID value", &other.describe(), offset)),
        };
        self.expect(Token::Semicolon, "';'")?;
        Ok(srid)
    }

    fn expect_eof(&mut self) -> PResult<()> {
        let (tok, offset) = self.next()?;
        if tok == Token::Eof {
            Ok(())
        } else {
            Err(ParseError::expected("end of input", &tok.describe(), offset))
        }
    }

    // ── Dimensionality ────────────────────────────────────────────────────────

    fn apply_keyword_dims(&mut self, iso: Option<Dims>, legacy_m: bool, offset: usize) -> PResult<()> {
        let mixed = || ParseError::new("can not mix dimensionality in a geometry", offset);
        self.hint = match (self.hint, iso, legacy_m) {
            (hint, None, false) => hint,
            (DimHint::Unknown, Some(d), _) => DimHint::Fixed(d),
            (DimHint::LegacyM, Some(d), _) if d.has_m => DimHint::Fixed(d),
            (DimHint::Fixed(cur), Some(d), _) if cur == d => DimHint::Fixed(d),
            (_, Some(_), _) => return Err(mixed()),
            (DimHint::Unknown | DimHint::LegacyM, None, true) => DimHint::LegacyM,
            (DimHint::Fixed(cur), None, true) if cur.has_m => DimHint::Fixed(cur),
            (DimHint::Fixed(_), None, true) => return Err(mixed()),
        };
        Ok(())
    }

    fn tuple_dims(&mut self, n: usize, offset: usize) -> PResult<Dims> {
        let dims = match (self.hint, n) {
            (DimHint::Unknown, 2) => Dims::XY,
            (DimHint::Unknown, 3) => Dims::XYZ,
            (DimHint::Unknown, 4) => Dims::XYZM,
            (DimHint::LegacyM, 3) => Dims::XYM,
            (DimHint::LegacyM, 4) => Dims::XYZM,
            (DimHint::Fixed(d), n) if d.ordinates() == n => d,
            _ => {
                return Err(ParseError::new(
                    format!("coordinate with {n} ordinates does not match the geometry dimensionality"),
                    offset,
                ))
            }
        };
        self.hint = DimHint::Fixed(dims);
        Ok(dims)
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn coord(&mut self) -> PResult<Coord> {
        let start = self.peek()?.1;
        let mut ordinates = [0.0f64; 4];
        let mut n = 0;
        while let (Token::Number(text), offset) = self.peek()? {
            if n == ordinates.len() {
                return Err(ParseError::new("too many ordinates in coordinate", offset));
            }
            ordinates[n] = text
                .parse::<f64>()
                .map_err(|_| ParseError::new(format!("invalid number {text}"), offset))?;
            n += 1;
            self.next()?;
        }
        if n < 2 {
            let (tok, offset) = self.peek()?;
            return Err(ParseError::expected("coordinate", &tok.describe(), offset));
        }
        let dims = self.tuple_dims(n, start)?;
        Coord::from_ordinates(&ordinates[..n], dims)
            .ok_or_else(|| ParseError::new("coordinate arity mismatch", start))
    }

    fn list<T>(&mut self, mut item: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        self.expect(Token::LParen, "'('")?;
        let mut items = vec![item(self)?];
        loop {
            let (tok, offset) = self.next()?;
            match tok {
                Token::Comma => items.push(item(self)?),
                Token::RParen => return Ok(items),
                other => return Err(ParseError::expected("',' or ')'", &other.describe(), offset)),
            }
        }
    }

    fn coord_list(&mut self) -> PResult<Vec<Coord>> {
        self.list(Self::coord)
    }

    fn coord_list_or_empty(&mut self) -> PResult<Vec<Coord>> {
        if self.eat_empty()? {
            return Ok(Vec::new());
        }
        self.coord_list()
    }

    fn rings(&mut self) -> PResult<Vec<Vec<Coord>>> {
        self.list(Self::coord_list_or_empty)
    }

    fn multipoint_member(&mut self) -> PResult<Geometry> {
        let coord = if self.peek_is(Token::LParen)? {
            self.next()?;
            let c = self.coord()?;
            self.expect(Token::RParen, "')'")?;
            c
        } else {
            self.coord()?
        };
        Ok(node(Shape::Point(coord)))
    }

    /// Member of a curve container: bare coordinate list, EMPTY, or a tagged curve.
    fn curve_member(&mut self) -> PResult<Geometry> {
        if self.eat_empty()? {
            return Ok(node(Shape::LineString(Vec::new())));
        }
        if self.peek_is(Token::LParen)? {
            return Ok(node(Shape::LineString(self.coord_list()?)));
        }
        self.tagged()
    }

    /// Member of a MultiSurface: bare ring list, EMPTY, or a tagged surface.
    fn surface_member(&mut self) -> PResult<Geometry> {
        if self.eat_empty()? {
            return Ok(node(Shape::Polygon(Vec::new())));
        }
        if self.peek_is(Token::LParen)? {
            return Ok(node(Shape::Polygon(self.rings()?)));
        }
        self.tagged()
    }

    fn tagged(&mut self) -> PResult<Geometry> {
        let (tok, offset) = self.next()?;
        let Token::Word(word) = tok else {
            return Err(ParseError::expected("geometry type keyword", &tok.describe(), offset));
        };
        let (kind, legacy_m) = keyword(word)
            .ok_or_else(|| ParseError::new(format!("unknown geometry type '{word}'"), offset))?;

        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new("geometry nested too deeply", offset));
        }

        let iso = match self.peek()? {
            (Token::Word(w), _) if w.eq_ignore_ascii_case("Z") => Some(Dims::XYZ),
            (Token::Word(w), _) if w.eq_ignore_ascii_case("M") => Some(Dims::XYM),
            (Token::Word(w), _) if w.eq_ignore_ascii_case("ZM") => Some(Dims::XYZM),
            _ => None,
        };
        if iso.is_some() {
            let (_, suffix_offset) = self.next()?;
            if legacy_m {
                return Err(ParseError::new("dimension suffix given twice", suffix_offset));
            }
        }
        self.apply_keyword_dims(iso, legacy_m, offset)?;

        let geom = if self.eat_empty()? {
            empty_node(kind, offset)?
        } else {
            self.body(kind)?
        };
        self.depth -= 1;
        Ok(geom)
    }

    fn body(&mut self, kind: GeometryType) -> PResult<Geometry> {
        let shape = match kind {
            GeometryType::Point => {
                self.expect(Token::LParen, "'('")?;
                let c = self.coord()?;
                self.expect(Token::RParen, "')'")?;
                Shape::Point(c)
            }
            GeometryType::LineString => Shape::LineString(self.coord_list()?),
            GeometryType::CircularString => Shape::CircularString(self.coord_list()?),
            GeometryType::Polygon => Shape::Polygon(self.rings()?),
            GeometryType::MultiPoint => Shape::MultiPoint(self.list(Self::multipoint_member)?),
            GeometryType::MultiLineString => Shape::MultiLineString(
                self.list(|p| Ok(node(Shape::LineString(p.coord_list_or_empty()?))))?,
            ),
            GeometryType::MultiPolygon => Shape::MultiPolygon(self.list(|p| {
                if p.eat_empty()? {
                    return Ok(node(Shape::Polygon(Vec::new())));
                }
                Ok(node(Shape::Polygon(p.rings()?)))
            })?),
            GeometryType::CompoundCurve => Shape::CompoundCurve(self.list(Self::curve_member)?),
            GeometryType::CurvePolygon => Shape::CurvePolygon(self.list(Self::curve_member)?),
            GeometryType::MultiCurve => Shape::MultiCurve(self.list(Self::curve_member)?),
            GeometryType::MultiSurface => Shape::MultiSurface(self.list(Self::surface_member)?),
            GeometryType::GeometryCollection => {
                Shape::GeometryCollection(self.list(Self::tagged)?)
            }
        };
        Ok(node(shape))
    }
}

// Dimensionality is stamped once the whole tree has been read.
fn node(shape: Shape) -> Geometry {
    Geometry::from_parts(shape, Dims::XY)
}

fn empty_node(kind: GeometryType, offset: usize) -> PResult<Geometry> {
    Geometry::empty(kind, Dims::XY)
        .map_err(|_| ParseError::new(format!("{kind} EMPTY is not supported"), offset))
}

/// Resolve a type keyword, including the legacy `...M` spelling.
fn keyword(word: &str) -> Option<(GeometryType, bool)> {
    if let Some(kind) = GeometryType::from_name(word) {
        return Some((kind, false));
    }
    let stem = word
        .strip_suffix('M')
        .or_else(|| word.strip_suffix('m'))?;
    GeometryType::from_name(stem).map(|kind| (kind, true))
}

/// Parse WKT or EWKT with every structural check enabled.
///
/// # Example
///
/// ```
/// use geotree_core::{wkt, GeometryType};
///
/// let geom = wkt::parse("SRID=4326;LINESTRING(0 0,1 1)").unwrap();
/// assert_eq!(geom.geometry_type(), GeometryType::LineString);
/// assert_eq!(geom.srid(), 4326);
///
/// let err = wkt::parse("LINESTRING(0 0,1 1").unwrap_err();
/// assert!(err.to_string().contains("offset 18"));
/// ```
pub fn parse(text: &str) -> Result<Geometry> {
    parse_with(text, Checks::ALL)
}

/// Parse WKT or EWKT, running only the requested optional checks.
/// Dimension agreement and membership restriction are always enforced.
pub fn parse_with(text: &str, checks: Checks) -> Result<Geometry> {
    debug!(len = text.len(), "parsing WKT");
    let mut parser = Parser::new(text);
    let srid = parser.srid_prefix()?;
    let mut geom = parser.tagged()?;
    parser.expect_eof()?;

    geom.stamp_dims(parser.hint.resolve());
    geom.set_srid(srid);
    geom.validate_with(checks)?;
    debug!(kind = %geom.geometry_type(), dims = geom.dims().label(), srid, "parsed WKT");
    Ok(geom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::geometry::Rule;

    fn parse_err(text: &str) -> ParseError {
        match parse(text) {
            Err(GeometryError::Parse(e)) => e,
            other => panic!("expected parse error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn point_and_srid_prefix() {
        let g = parse("SRID=4326;POINT(1 2)").unwrap();
        assert_eq!(g.srid(), 4326);
        assert_eq!(g.dims(), Dims::XY);
        assert_eq!(g.shape(), &Shape::Point(Coord::xy(1.0, 2.0)));
    }

    #[test]
    fn negative_srid_prefix() {
        assert_eq!(parse("SRID=-1;POINT(1 2)").unwrap().srid(), SRID_UNKNOWN);
    }

    #[test]
    fn dims_inferred_from_first_tuple() {
        let g = parse("LINESTRING(0 0 0,1 1 1)").unwrap();
        assert_eq!(g.dims(), Dims::XYZ);
        let g = parse("LINESTRING(0 0 0 1,1 1 1 1)").unwrap();
        assert_eq!(g.dims(), Dims::XYZM);
    }

    #[test]
    fn legacy_m_keyword() {
        let g = parse("LINESTRINGM(0 0 5,1 1 6)").unwrap();
        assert_eq!(g.dims(), Dims::XYM);
        assert_eq!(g.coords().unwrap()[1], Coord::xym(1.0, 1.0, 6.0));
        assert_eq!(parse("POINTM(0 0 1 5)").unwrap().dims(), Dims::XYZM);
        assert_eq!(parse("LINESTRINGM EMPTY").unwrap().dims(), Dims::XYM);
    }

    #[test]
    fn iso_suffixes() {
        assert_eq!(parse("LINESTRING M (0 0 0,1 1 1)").unwrap().dims(), Dims::XYM);
        assert_eq!(
            parse("LINESTRING ZM (0 0 0 1,1 1 1 1,2 2 2 2,0.141231 4 5 4)")
                .unwrap()
                .dims(),
            Dims::XYZM
        );
        let empty = parse("LINESTRING ZM EMPTY").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.dims(), Dims::XYZM);
        assert_eq!(parse("point z (1 2 3)").unwrap().dims(), Dims::XYZ);
    }

    #[test]
    fn mixed_tuple_arity_rejected() {
        let e = parse_err("LINESTRING(0 0,1 1 1)");
        assert_eq!(e.offset, 15);
        parse_err("LINESTRING Z (0 0,1 1)");
        parse_err("GEOMETRYCOLLECTION(POINT(0 0),POINT(1 1 1))");
    }

    #[test]
    fn conflicting_suffixes_rejected() {
        parse_err("GEOMETRYCOLLECTION Z (POINT M (0 0 0))");
        parse_err("POINTM Z (0 0 0)");
        parse_err("GEOMETRYCOLLECTION Z (POINTM(0 0 0))");
    }

    #[test]
    fn multipoint_with_and_without_parens() {
        let a = parse("MULTIPOINT(0 0,1 1)").unwrap();
        let b = parse("MULTIPOINT((0 0),(1 1))").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.members().len(), 2);
    }

    #[test]
    fn polygons_and_multi_polygons() {
        let g = parse("MULTIPOLYGON(((0 0,0 10,10 10,0 0),(1 1,1 2,2 2,1 1)),((-10 -10,-10 -5,-5 -5,-10 -10)))")
            .unwrap();
        assert_eq!(g.members().len(), 2);
        assert_eq!(g.num_coords(), 12);
    }

    #[test]
    fn compound_curve_members() {
        let g = parse("COMPOUNDCURVE Z (CIRCULARSTRING Z (0 0 0,0 1 0,1 1 0,0 0 0,2 2 0),(2 2 0,1 1 1,2 2 1))")
            .unwrap();
        assert_eq!(g.dims(), Dims::XYZ);
        assert_eq!(g.members()[0].geometry_type(), GeometryType::CircularString);
        assert_eq!(g.members()[1].geometry_type(), GeometryType::LineString);
    }

    #[test]
    fn curve_polygon_mixed_rings() {
        let g = parse("CURVEPOLYGON((0 0,1 0,0 1,0 0),CIRCULARSTRING(0 0,1 0,1 1,1 0,0 0))").unwrap();
        assert_eq!(g.members().len(), 2);
        assert_eq!(g.num_coords(), 9);
    }

    #[test]
    fn nested_empties() {
        let g = parse("GEOMETRYCOLLECTION(LINESTRING EMPTY,POLYGON EMPTY,MULTIPOINT EMPTY)").unwrap();
        assert_eq!(g.members().len(), 3);
        assert!(g.is_empty());
        let g = parse("MULTILINESTRING(EMPTY,(0 0,1 1))").unwrap();
        assert_eq!(g.members().len(), 2);
    }

    #[test]
    fn late_dims_resolution_covers_earlier_empties() {
        let g = parse("GEOMETRYCOLLECTION(LINESTRING EMPTY,POINT(0 0 0))").unwrap();
        assert_eq!(g.dims(), Dims::XYZ);
        assert_eq!(g.members()[0].dims(), Dims::XYZ);
    }

    #[test]
    fn structural_violations_are_not_parse_errors() {
        match parse("POLYGON((0 0,1 0,1 1,0 1))") {
            Err(GeometryError::InvalidGeometry { rule, .. }) => assert_eq!(rule, Rule::UnclosedRing),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse("MULTIPOINT(LINESTRING(0 0,1 1))"),
            Err(GeometryError::Parse(_))
        ));
        assert!(matches!(
            parse("MULTICURVE(POINT(0 0))"),
            Err(GeometryError::UnsupportedMember { .. })
        ));
    }

    #[test]
    fn empty_segments_do_not_hide_gaps_or_open_rings() {
        match parse("COMPOUNDCURVE((0 0,1 1),EMPTY,(5 5,6 6))") {
            Err(GeometryError::InvalidGeometry { rule, path }) => {
                assert_eq!(rule, Rule::DiscontinuousCurve);
                assert_eq!(path.to_string(), "$[2]");
            }
            other => panic!("unexpected {other:?}"),
        }
        match parse("CURVEPOLYGON(COMPOUNDCURVE((0 0,1 1,2 0),EMPTY))") {
            Err(GeometryError::InvalidGeometry { rule, .. }) => assert_eq!(rule, Rule::UnclosedRing),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse("COMPOUNDCURVE(EMPTY,(0 0,1 1),EMPTY,(1 1,2 2))").is_ok());
    }

    #[test]
    fn relaxed_checks_accept_unclosed_curve_ring() {
        assert!(parse("CURVEPOLYGON(CIRCULARSTRING(0 0,0 1,1 1))").is_err());
        let g = parse_with("CURVEPOLYGON(CIRCULARSTRING(0 0,0 1,1 1))", Checks::NONE).unwrap();
        assert_eq!(g.num_coords(), 3);
    }

    #[test]
    fn syntax_errors_carry_offset_and_expectation() {
        let e = parse_err("POINT 1 2)");
        assert_eq!(e.offset, 6);
        assert_eq!(e.expected, Some("'('"));

        let e = parse_err("LINESTRING(0 0,1 1) trailing");
        assert_eq!(e.offset, 20);
        assert_eq!(e.expected, Some("end of input"));

        let e = parse_err("TRIANGLE((0 0,1 0,0 1,0 0))");
        assert_eq!(e.offset, 0);

        parse_err("POINT(1 x)");
        parse_err("POINT(1 2 3 4 5)");
        parse_err("POINT EMPTY");
        parse_err("SRID=abc;POINT(0 0)");
        parse_err("POINT(1 2) #");
        parse_err("");
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let depth = MAX_DEPTH + 1;
        let text = format!(
            "{}POINT(0 0){}",
            "GEOMETRYCOLLECTION(".repeat(depth),
            ")".repeat(depth)
        );
        let e = parse_err(&text);
        assert_eq!(e.message, "geometry nested too deeply");
    }
}
