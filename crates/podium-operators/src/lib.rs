#![forbid(unsafe_code)]
//! podium-operators: row-at-a-time streaming operators and in-memory frames.
//!
//! Streaming operators (`filter_project_stream`, `group_by_stream`) pull from a
//! [`RowSource`] and keep at most one input row plus their accumulator state.
//! [`Frame`] is the owned, immutable table used for the small side of joins and
//! for post-aggregation shaping (join, project, add-column, sort, top-N).

pub mod traits;

pub mod aggregate;
pub mod frame;
pub mod join;
pub mod predicate;
pub mod sort;
pub mod stream;

pub use aggregate::{group_by_count_stream, group_by_stream, AggFunc, Aggregation, GroupBy};
pub use frame::Frame;
pub use join::{JoinKind, JoinOptions};
pub use predicate::{BoundPredicate, Condition, Predicate};
pub use sort::{compare_nulls_last, BoundedTopK, SortKey};
pub use stream::{filter_project_sorted, filter_project_stream, FilterProject, Page, Paged};
pub use traits::{collect_rows, OpError, Result, RowSource, RowsSource};
