//! Engine configuration that downstream crates can serialize/deserialize.
//!
//! Layering: `Default` < `from_env()` < YAML [`ConfigFile`] < CLI flags.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What the CSV reader does with a row whose field count differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Drop the row, count it, keep streaming.
    #[default]
    Skip,
    /// End the stream with `Error::MalformedRow` or `Error::InvalidUtf8`.
    Fail,
    /// Pad short rows with nulls / truncate long ones (still counted).
    Pad,
}

impl FromStr for MalformedPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(MalformedPolicy::Skip),
            "fail" => Ok(MalformedPolicy::Fail),
            "pad" => Ok(MalformedPolicy::Pad),
            other => Err(Error::Config(format!("unknown malformed-row policy '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the source CSV files.
    pub data_dir: PathBuf,

    pub events_file: String,
    pub countries_file: String,
    pub stats_file: String,

    /// Optional NOC → "Country Code" mapping used to join World Bank style stats.
    pub noc_codes_file: Option<String>,

    /// Field delimiter; must be a single ASCII character.
    pub delimiter: char,

    pub malformed_policy: MalformedPolicy,

    /// Cell texts (case-insensitive, trimmed) read as null. Empty cells are always null.
    pub null_tokens: Vec<String>,

    /// Capacity of the CSV reader's internal buffer (bytes).
    pub read_buffer_bytes: usize,

    /// Number of leading events rows used by the join demo.
    pub join_demo_sample_rows: usize,

    /// Upper bound on athlete search page size.
    pub max_page_size: usize,

    /// Keep materialized small tables across queries (reloaded on file change).
    pub cache_tables: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            events_file: "events.csv".to_string(),
            countries_file: "countries.csv".to_string(),
            stats_file: "country_year_stats.csv".to_string(),
            noc_codes_file: None,
            delimiter: ',',
            malformed_policy: MalformedPolicy::Skip,
            null_tokens: vec!["NA".into(), "null".into(), "none".into()],
            read_buffer_bytes: 64 * 1024,
            join_demo_sample_rows: 5_000,
            max_page_size: 500,
            cache_tables: false,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `PODIUM_DATA_DIR`: directory with the CSV files
    /// - `PODIUM_EVENTS_FILE`, `PODIUM_COUNTRIES_FILE`, `PODIUM_STATS_FILE`,
    ///   `PODIUM_NOC_CODES_FILE`: file names inside the data directory
    /// - `PODIUM_DELIMITER`: single-character delimiter
    /// - `PODIUM_MALFORMED_POLICY`: `skip`, `fail` or `pad`
    /// - `PODIUM_READ_BUFFER_BYTES`: reader buffer capacity
    /// - `PODIUM_MAX_PAGE_SIZE`: search page size cap
    /// - `PODIUM_CACHE_TABLES`: `true`/`1` to enable the table cache
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("PODIUM_DATA_DIR") {
            cfg.data_dir = PathBuf::from(s);
        }

        if let Ok(s) = std::env::var("PODIUM_EVENTS_FILE") {
            cfg.events_file = s;
        }

        if let Ok(s) = std::env::var("PODIUM_COUNTRIES_FILE") {
            cfg.countries_file = s;
        }

        if let Ok(s) = std::env::var("PODIUM_STATS_FILE") {
            cfg.stats_file = s;
        }

        if let Ok(s) = std::env::var("PODIUM_NOC_CODES_FILE") {
            cfg.noc_codes_file = Some(s);
        }

        if let Ok(s) = std::env::var("PODIUM_DELIMITER") {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                cfg.delimiter = c;
            }
        }

        if let Ok(s) = std::env::var("PODIUM_MALFORMED_POLICY") {
            if let Ok(p) = s.parse::<MalformedPolicy>() {
                cfg.malformed_policy = p;
            }
        }

        if let Ok(s) = std::env::var("PODIUM_READ_BUFFER_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.read_buffer_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("PODIUM_MAX_PAGE_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_page_size = v;
            }
        }

        if let Ok(s) = std::env::var("PODIUM_CACHE_TABLES") {
            cfg.cache_tables = matches!(s.trim(), "1" | "true" | "TRUE" | "yes");
        }

        cfg
    }

    /// Overlay the fields set in a config file.
    pub fn apply_file(&mut self, doc: &ConfigFile) {
        if let Some(dir) = &doc.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(f) = &doc.events_file {
            self.events_file = f.clone();
        }
        if let Some(f) = &doc.countries_file {
            self.countries_file = f.clone();
        }
        if let Some(f) = &doc.stats_file {
            self.stats_file = f.clone();
        }
        if let Some(f) = &doc.noc_codes_file {
            self.noc_codes_file = Some(f.clone());
        }
        if let Some(d) = doc.delimiter {
            self.delimiter = d;
        }
        if let Some(p) = doc.malformed_policy {
            self.malformed_policy = p;
        }
        if let Some(tokens) = &doc.null_tokens {
            self.null_tokens = tokens.clone();
        }
        if let Some(n) = doc.read_buffer_bytes {
            self.read_buffer_bytes = n;
        }
        if let Some(n) = doc.join_demo_sample_rows {
            self.join_demo_sample_rows = n;
        }
        if let Some(n) = doc.max_page_size {
            self.max_page_size = n;
        }
        if let Some(c) = doc.cache_tables {
            self.cache_tables = c;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter '{}' is not a single ASCII character",
                self.delimiter
            )));
        }
        if self.read_buffer_bytes == 0 {
            return Err(Error::Config("read_buffer_bytes must be > 0".into()));
        }
        if self.max_page_size == 0 {
            return Err(Error::Config("max_page_size must be > 0".into()));
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects. Call `validate` first.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(&self.events_file)
    }

    pub fn countries_path(&self) -> PathBuf {
        self.data_dir.join(&self.countries_file)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join(&self.stats_file)
    }

    pub fn noc_codes_path(&self) -> Option<PathBuf> {
        self.noc_codes_file.as_ref().map(|f| self.data_dir.join(f))
    }
}

/// YAML config file; every field optional and applied over the env config.
///
/// ```yaml
/// data_dir: /srv/olympics
/// stats_file: country_year_stats.csv
/// malformed_policy: fail
/// cache_tables: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub data_dir: Option<PathBuf>,
    pub events_file: Option<String>,
    pub countries_file: Option<String>,
    pub stats_file: Option<String>,
    pub noc_codes_file: Option<String>,
    pub delimiter: Option<char>,
    pub malformed_policy: Option<MalformedPolicy>,
    pub null_tokens: Option<Vec<String>>,
    pub read_buffer_bytes: Option<usize>,
    pub join_demo_sample_rows: Option<usize>,
    pub max_page_size: Option<usize>,
    pub cache_tables: Option<bool>,
}

impl ConfigFile {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }
}
