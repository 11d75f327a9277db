//! Lazy CSV row stream.
//!
//! Parsing (quotes, escaped quotes, delimiters and newlines inside quoted
//! fields) is delegated to the `csv` crate; this reader adds the header
//! binding, per-cell type inference, null tokens, the malformed-row policy and
//! an optional row limit that stops pulling records once reached.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use podium_core::config::{EngineConfig, MalformedPolicy};
use podium_core::prelude::{ColumnNames, DataType, Error, Field, Row, Schema, Value};

use crate::buf::{counting_from_path, CountingReader, ReadCounter};
use crate::error::{IoError, Result};

#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// Stop after emitting this many rows.
    pub limit: Option<usize>,
    pub malformed: MalformedPolicy,
    /// Cell texts read as null (ASCII case-insensitive, trimmed). Empty is always null.
    pub null_tokens: Vec<String>,
    /// Columns parsed as a fixed type instead of being inferred per cell.
    pub declared: Vec<(String, DataType)>,
    pub buffer_capacity: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            limit: None,
            malformed: MalformedPolicy::Skip,
            null_tokens: vec!["NA".into(), "null".into(), "none".into()],
            declared: Vec::new(),
            buffer_capacity: 64 * 1024,
        }
    }
}

impl ReadOptions {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            delimiter: cfg.delimiter_byte(),
            limit: None,
            malformed: cfg.malformed_policy,
            null_tokens: cfg.null_tokens.clone(),
            declared: Vec::new(),
            buffer_capacity: cfg.read_buffer_bytes.max(1),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    pub fn declare(mut self, column: impl Into<String>, data_type: DataType) -> Self {
        self.declared.push((column.into(), data_type));
        self
    }
}

/// Counters describing how much of the source a reader has consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Data records pulled from the parser (excluding the header).
    pub records_read: u64,
    pub rows_emitted: u64,
    pub malformed_rows: u64,
    /// Bytes pulled from the underlying source, buffering included.
    pub bytes_read: u64,
}

pub struct CsvRowReader<R: Read> {
    source: String,
    reader: csv::Reader<CountingReader<R>>,
    columns: ColumnNames,
    declared: Vec<Option<DataType>>,
    observed: Vec<Option<DataType>>,
    nullable: Vec<bool>,
    null_tokens: Vec<String>,
    malformed: MalformedPolicy,
    limit: Option<usize>,
    record: csv::ByteRecord,
    counter: ReadCounter,
    stats: ReadStats,
    done: bool,
}

impl CsvRowReader<File> {
    /// Open `path` and bind its header. The file is read lazily afterwards.
    pub fn open<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let reader = counting_from_path(path)?;
        Self::from_counting(reader, path.display().to_string(), options)
    }
}

impl<R: Read> CsvRowReader<R> {
    pub fn from_reader(reader: R, source: impl Into<String>, options: ReadOptions) -> Result<Self> {
        Self::from_counting(CountingReader::new(reader), source.into(), options)
    }

    fn from_counting(reader: CountingReader<R>, source: String, options: ReadOptions) -> Result<Self> {
        let counter = reader.counter();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .flexible(true)
            .buffer_capacity(options.buffer_capacity)
            .from_reader(reader);

        let mut header = csv::StringRecord::new();
        if !reader.read_record(&mut header)? {
            return Err(IoError::MissingHeader(source));
        }

        let mut names: Vec<String> = header.iter().map(str::to_string).collect();
        if let Some(first) = names.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(Error::Schema(format!("duplicate column '{name}' in '{source}'")).into());
            }
        }

        let declared = names
            .iter()
            .map(|n| {
                options
                    .declared
                    .iter()
                    .find(|(c, _)| c == n)
                    .map(|(_, dt)| *dt)
            })
            .collect();
        let width = names.len();

        Ok(Self {
            source,
            reader,
            columns: names.into(),
            declared,
            observed: vec![None; width],
            nullable: vec![false; width],
            null_tokens: options.null_tokens,
            malformed: options.malformed,
            limit: options.limit,
            record: csv::ByteRecord::new(),
            counter,
            stats: ReadStats::default(),
            done: false,
        })
    }

    /// Path or label the reader was opened on.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// Schema as observed so far: declared types win, otherwise the widened
    /// type of every non-null cell read. Columns with no values yet are `Utf8`.
    pub fn schema(&self) -> Schema {
        let fields = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let dt = self.declared[i]
                    .or(self.observed[i])
                    .unwrap_or(DataType::Utf8);
                Field::new(name.clone(), dt, self.nullable[i] || self.observed[i].is_none())
            })
            .collect();
        Schema::new(fields)
    }

    pub fn stats(&self) -> ReadStats {
        ReadStats {
            bytes_read: self.counter.bytes(),
            ..self.stats
        }
    }

    /// Handle on the byte counter; stays valid after the reader is consumed.
    pub fn counter(&self) -> ReadCounter {
        self.counter.clone()
    }

    /// Pull the next row, or `None` at end of stream / once the limit is reached.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some(limit) = self.limit {
                if self.stats.rows_emitted >= limit as u64 {
                    self.finish();
                    return Ok(None);
                }
            }
            if !self.reader.read_byte_record(&mut self.record)? {
                self.finish();
                return Ok(None);
            }
            self.stats.records_read += 1;

            let expected = self.columns.len();
            let found = self.record.len();
            let bad_field = self.record.iter().position(|f| std::str::from_utf8(f).is_err());
            if found != expected || bad_field.is_some() {
                let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                self.stats.malformed_rows += 1;
                match self.malformed {
                    MalformedPolicy::Skip => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            source = %self.source,
                            line,
                            expected,
                            found,
                            invalid_utf8 = bad_field.is_some(),
                            "skipping malformed row"
                        );
                        continue;
                    }
                    MalformedPolicy::Fail => {
                        self.done = true;
                        let err = match bad_field {
                            Some(field) => Error::InvalidUtf8 { line, field },
                            None => Error::MalformedRow {
                                line,
                                expected,
                                found,
                            },
                        };
                        return Err(err.into());
                    }
                    // undecodable bytes become U+FFFD
                    MalformedPolicy::Pad => {}
                }
            }

            let mut values = Vec::with_capacity(expected);
            for idx in 0..expected {
                let raw = self.record.get(idx).map(String::from_utf8_lossy).unwrap_or_default();
                let value = parse_cell(&raw, self.declared[idx], &self.null_tokens);
                match value.data_type() {
                    None => self.nullable[idx] = true,
                    Some(dt) => {
                        self.observed[idx] = Some(self.observed[idx].map_or(dt, |cur| cur.widen(dt)))
                    }
                }
                values.push(value);
            }
            self.stats.rows_emitted += 1;
            return Ok(Some(Row::new(self.columns.clone(), values)?));
        }
    }

    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        #[cfg(feature = "tracing")]
        {
            let stats = self.stats();
            tracing::debug!(
                source = %self.source,
                records_read = stats.records_read,
                rows_emitted = stats.rows_emitted,
                malformed_rows = stats.malformed_rows,
                bytes_read = stats.bytes_read,
                "csv stream finished"
            );
        }
    }
}

impl<R: Read> Iterator for CsvRowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_row() {
            Ok(row) => row.map(Ok),
            Err(e) => {
                // parse/IO failures are fatal to the stream
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn parse_cell(raw: &str, declared: Option<DataType>, null_tokens: &[String]) -> Value {
    let t = raw.trim();
    if t.is_empty() || null_tokens.iter().any(|tok| tok.eq_ignore_ascii_case(t)) {
        return Value::Null;
    }
    match declared {
        Some(dt) => Value::parse_as(raw, dt),
        None => Value::infer(raw),
    }
}
