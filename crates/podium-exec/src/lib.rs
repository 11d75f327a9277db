#![forbid(unsafe_code)]
//! podium-exec: the query engine behind the dashboard.
//!
//! [`Engine`] opens a fresh reader per query, streams the events table through
//! filter/group-by operators, and joins the result against small materialized
//! tables (countries, population/GDP). Small tables may be shared across
//! queries through the opt-in [`TableCache`].

pub mod cache;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod runtime;

pub use cache::{CacheStats, TableCache};
pub use error::{QueryError, Result};
pub use metrics::{QueryMetrics, QueryTimer};
pub use queries::{
    EfficiencyMetric, EfficiencyParams, LeaderboardParams, PreviewTable, QueryResult, SearchOrder,
    SearchPage, SearchParams,
};
pub use runtime::{Engine, Table};
