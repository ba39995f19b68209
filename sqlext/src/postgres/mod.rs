//! Postgres type integration.
//!
//! Oids and binary format (format code `1`) for geometric and interval types. All values are
//! in network byte order.
//!
//! <https://www.postgresql.org/docs/current/datatype-geometric.html>

mod pg_type;
mod binary;

pub use pg_type::{Oid, PgType};
pub use binary::{Decode, Encode, Encoded};
