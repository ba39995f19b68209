//! Extended SQL type codecs.
//!
//! Conversion between the text form of SQL interval and geometric values and their binary
//! representation, as used by Postgres and MySQL drivers.
//!
//! - [`interval`], ISO-8601 like interval text, `P1Y2M3DT4H5M6.5S`
//! - [`geometry`], Postgres geometric text and OGC Well-Known-Text, to and from
//!   Well-Known-Binary
//! - [`postgres`], Postgres binary format and oids
//!
//! # Examples
//!
//! ```
//! use sqlext::{ByteOrder, CodecConfig, Interval, geometry};
//!
//! # fn app() -> sqlext::Result<()> {
//! let config = CodecConfig::parse("byte_order=big;precision=micro")?;
//!
//! let interval = Interval::parse("-PT1M30.25S", config.precision)?;
//! assert_eq!(interval.seconds(), -90);
//! assert_eq!(interval.format(config.precision), "PT-1M-30.25S");
//!
//! let wkb = geometry::point_to_wkb("(1,2)", config.byte_order)?;
//! assert_eq!(wkb[0], ByteOrder::BigEndian.flag());
//! assert_eq!(geometry::wkb_to_wkt(&wkb)?, "POINT(1 2)");
//! # Ok(())
//! # }
//! # app().unwrap();
//! ```
//!
//! # Features
//!
//! - `tokio`, async [`resolve_type_async`][geometry::resolve_type_async]
//! - `time`, conversion between [`Interval`] and [`time::Duration`][::time::Duration]
//! - `serde`, serialize values, [`Interval`] as its text form
//! - `log`, warn on invalid environment configuration
//! - `verbose`, trace parsing and encoding with `tracing`

mod common;
mod ext;

// Value
pub mod interval;
pub mod geometry;

// Protocol
pub mod postgres;

// Configuration
pub mod config;

mod error;

pub use interval::{Interval, Precision};
pub use geometry::{ByteOrder, Geometry};
pub use config::CodecConfig;
pub use ext::{FmtExt, HexFmt};
pub use error::{Error, ErrorKind, FormatError, NumericError, RangeError, Result};
