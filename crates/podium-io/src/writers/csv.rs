//! CSV writer for result rows. Nulls are written as empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use podium_core::Row;

use crate::error::{IoError, Result};

pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
    columns: Vec<String>,
}

impl CsvWriter<File> {
    pub fn to_path<P: AsRef<Path>>(path: P, columns: &[String], delimiter: u8) -> Result<Self> {
        let f = File::create(path)?;
        Self::to_writer(f, columns, delimiter)
    }
}

impl<W: Write> CsvWriter<W> {
    /// Create the writer and emit the header line.
    pub fn to_writer(writer: W, columns: &[String], delimiter: u8) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        writer.write_record(columns)?;
        Ok(Self {
            writer,
            columns: columns.to_vec(),
        })
    }

    /// Write the row's values for the header columns, in header order.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let mut cells = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            cells.push(row.get(name)?.to_string());
        }
        self.writer.write_record(&cells)?;
        Ok(())
    }

    pub fn write_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a Row>) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| IoError::Io(std::io::Error::new(e.error().kind(), e.to_string())))
    }
}
