//! Engine: configuration, table access and the shared (optional) table cache.
//!
//! The engine holds no per-query state. Every query opens its own readers and
//! builds its own frames, so one `Engine` can be shared across threads behind
//! an `Arc` and queried concurrently through `&self`.

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use podium_core::config::EngineConfig;
use podium_core::DataType;
use podium_io::{CsvRowReader, ReadOptions};
use podium_operators::Frame;

use crate::cache::TableCache;
use crate::error::{QueryError, Result};

/// The CSV tables the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Events,
    Countries,
    Stats,
    NocCodes,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Events => "events",
            Table::Countries => "countries",
            Table::Stats => "stats",
            Table::NocCodes => "noc_codes",
        }
    }

    /// Columns parsed with a fixed type rather than inferred per cell.
    fn declared(self) -> &'static [(&'static str, DataType)] {
        use DataType::*;
        match self {
            Table::Events => &[
                ("Name", Utf8),
                ("Team", Utf8),
                ("NOC", Utf8),
                ("Games", Utf8),
                ("Year", Int64),
                ("Season", Utf8),
                ("City", Utf8),
                ("Sport", Utf8),
                ("Event", Utf8),
                ("Medal", Utf8),
            ],
            Table::Countries => &[("NOC", Utf8), ("region", Utf8), ("notes", Utf8)],
            Table::Stats => &[
                ("NOC", Utf8),
                ("Country Code", Utf8),
                ("Country Name", Utf8),
                ("Year", Int64),
                ("Population", Float64),
                ("GDP_USD", Float64),
            ],
            Table::NocCodes => &[("NOC", Utf8), ("Country Code", Utf8)],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Engine {
    cfg: EngineConfig,
    cache: Option<Arc<TableCache>>,
}

impl Engine {
    /// Validates `cfg`; creates a private table cache when `cfg.cache_tables` is set.
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        cfg.validate()?;
        let cache = cfg.cache_tables.then(|| Arc::new(TableCache::new()));
        Ok(Self { cfg, cache })
    }

    /// Use an externally owned cache (e.g. shared by several engines).
    pub fn with_cache(mut self, cache: Arc<TableCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn cache(&self) -> Option<&Arc<TableCache>> {
        self.cache.as_ref()
    }

    pub fn path(&self, table: Table) -> Result<PathBuf> {
        match table {
            Table::Events => Ok(self.cfg.events_path()),
            Table::Countries => Ok(self.cfg.countries_path()),
            Table::Stats => Ok(self.cfg.stats_path()),
            Table::NocCodes => self
                .cfg
                .noc_codes_path()
                .ok_or_else(|| QueryError::Invalid("no noc_codes_file configured".into())),
        }
    }

    pub fn read_options(&self, table: Table) -> ReadOptions {
        table
            .declared()
            .iter()
            .fold(ReadOptions::from_config(&self.cfg), |opts, (col, dt)| {
                opts.declare(*col, *dt)
            })
    }

    /// Open a lazy reader over `table`.
    pub fn open(&self, table: Table) -> Result<CsvRowReader<File>> {
        self.open_with(table, self.read_options(table))
    }

    pub fn open_with(&self, table: Table, options: ReadOptions) -> Result<CsvRowReader<File>> {
        let path = self.path(table)?;
        CsvRowReader::open(&path, options).map_err(|source| QueryError::Source { table, source })
    }

    /// Materialize a small table, through the cache when one is configured.
    /// The events table is always read fresh.
    pub fn load(&self, table: Table) -> Result<Arc<Frame>> {
        match (&self.cache, table) {
            (Some(cache), t) if t != Table::Events => {
                let path = self.path(t)?;
                cache.get_or_load(&path, || self.read_frame(t))
            }
            _ => Ok(Arc::new(self.read_frame(table)?)),
        }
    }

    fn read_frame(&self, table: Table) -> Result<Frame> {
        let reader = self.open(table)?;
        let frame = Frame::from_source(reader)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(%table, rows = frame.len(), "table materialized");
        Ok(frame)
    }
}
