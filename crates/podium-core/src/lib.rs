#![forbid(unsafe_code)]
//! podium-core: values, rows, schemas, configuration and the shared error taxonomy.
//!
//! Everything here is pure data. Reading files lives in `podium-io`, operators
//! in `podium-operators`, and the named queries in `podium-exec`.

pub mod config;
pub mod error;
pub mod hash;
pub mod prelude;
pub mod row;
pub mod schema;
pub mod value;

/// Engine version string reported by the CLI and query metrics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, JoinSide, Result};
pub use row::{ColumnNames, Row};
pub use schema::{DataType, Field, Schema};
pub use value::{KeyPart, Value};
