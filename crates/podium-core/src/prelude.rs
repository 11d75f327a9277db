//! Convenient re-exports for downstream crates.

pub use crate::config::{ConfigFile, EngineConfig, MalformedPolicy};
pub use crate::error::{Error, JoinSide, Result};
pub use crate::row::{ColumnNames, Row};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::value::{KeyPart, Value};
