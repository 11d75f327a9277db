#![forbid(unsafe_code)]
//! podium: streaming CSV query engine behind the Olympic medal insights dashboard.
//!
//! This crate re-exports the workspace members so applications can depend on
//! one package:
//!
//! - [`core`]: values, rows, schemas, configuration, errors
//! - [`io`]: lazy CSV readers and result writers
//! - [`operators`]: predicates, projection, group-by, joins, sorting, frames
//! - [`exec`]: the [`Engine`] and its named queries

pub use podium_core as core;
pub use podium_exec as exec;
pub use podium_io as io;
pub use podium_operators as operators;

pub use podium_core::config::{ConfigFile, EngineConfig, MalformedPolicy};
pub use podium_core::{Row, Value};
pub use podium_exec::{
    Engine, EfficiencyMetric, EfficiencyParams, LeaderboardParams, PreviewTable, QueryError,
    QueryResult, SearchOrder, SearchPage, SearchParams, Table,
};
