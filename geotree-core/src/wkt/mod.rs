//! WKT / EWKT text codec.
//!
//! The parser accepts all three writer dialects plus an optional
//! `SRID=<int>;` prefix:
//!
//! - plain:    `LINESTRING(0 0 1,1 1 1)`, `POINTM(0 0 5)`
//! - extended: like plain, but `...M(` whenever M is present (`POINTM(0 0 1 5)`)
//! - ISO:      `LINESTRING Z (0 0 1,1 1 1)`, `POINT ZM (0 0 1 5)`

mod parser;
mod writer;

pub use parser::{parse, parse_with};
pub use writer::{to_ewkt, to_wkt, write, Dialect, WriteOptions, DEFAULT_PRECISION};
