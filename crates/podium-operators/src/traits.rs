//! Pull-based row sources and the operator error type.
//!
//! Every stage of a streaming pipeline is a [`RowSource`]: the CSV reader,
//! an in-memory vector of rows, and the filter/project adapter itself, so
//! adapters compose by wrapping one another.

use std::io::Read;
use std::sync::Arc;

use podium_core::prelude::{ColumnNames, Row, Schema};
use podium_io::{CsvRowReader, IoError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpError>;

#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Core(#[from] podium_core::Error),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error("execution error: {0}")]
    Exec(String),
}

/// A finite, non-restartable stream of rows sharing one column layout.
pub trait RowSource {
    /// Column layout of every row this source yields.
    fn columns(&self) -> &ColumnNames;

    /// Next row, or `None` once the stream is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>>;

    /// Declared/observed schema, if the source tracks one.
    fn schema(&self) -> Option<Schema> {
        None
    }
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn columns(&self) -> &ColumnNames {
        (**self).columns()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }

    fn schema(&self) -> Option<Schema> {
        (**self).schema()
    }
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn columns(&self) -> &ColumnNames {
        (**self).columns()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }

    fn schema(&self) -> Option<Schema> {
        (**self).schema()
    }
}

impl<R: Read> RowSource for CsvRowReader<R> {
    fn columns(&self) -> &ColumnNames {
        CsvRowReader::columns(self)
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.read_row()?)
    }

    fn schema(&self) -> Option<Schema> {
        Some(CsvRowReader::schema(self))
    }
}

/// In-memory rows as a source. Rows are expected to use `columns` as layout.
pub struct RowsSource<I> {
    columns: ColumnNames,
    rows: I,
}

impl<I: Iterator<Item = Row>> RowsSource<I> {
    pub fn new(columns: ColumnNames, rows: impl IntoIterator<IntoIter = I, Item = Row>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Row>> RowSource for RowsSource<I> {
    fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        match self.rows.next() {
            Some(row) if !same_layout(row.names(), &self.columns) => Err(OpError::Exec(format!(
                "row layout {:?} does not match source columns {:?}",
                row.names(),
                self.columns
            ))),
            next => Ok(next),
        }
    }
}

fn same_layout(a: &ColumnNames, b: &ColumnNames) -> bool {
    Arc::ptr_eq(a, b) || a[..] == b[..]
}

/// Drain a source into a vector.
pub fn collect_rows<S: RowSource>(mut source: S) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(row) = source.next_row()? {
        rows.push(row);
    }
    Ok(rows)
}
