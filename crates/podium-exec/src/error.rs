use thiserror::Error;

use podium_io::IoError;
use podium_operators::OpError;

use crate::runtime::Table;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The table's file could not be opened or has no header.
    #[error("{table} table unavailable: {source}")]
    Source {
        table: Table,
        #[source]
        source: IoError,
    },

    #[error(transparent)]
    Operator(#[from] OpError),

    #[error(transparent)]
    Core(#[from] podium_core::Error),

    #[error("invalid query: {0}")]
    Invalid(String),
}
