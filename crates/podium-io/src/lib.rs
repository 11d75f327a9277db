#![forbid(unsafe_code)]
//! podium-io: lazy CSV row streams and result writers.
//!
//! Readers are pull-based and hold one record at a time; nothing here buffers
//! a whole file. Writers serialize already-materialized rows.

pub mod buf;
pub mod error;
pub mod readers;
pub mod writers;

pub use buf::{CountingReader, ReadCounter};
pub use error::{IoError, Result};
pub use readers::csv::{CsvRowReader, ReadOptions, ReadStats};
