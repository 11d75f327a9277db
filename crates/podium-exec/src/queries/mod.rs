//! The named queries served to the dashboard, and their parameter/result types.
//!
//! Each submodule adds one group of methods to [`Engine`](crate::Engine).

mod efficiency;
mod join_demo;
mod leaderboard;
mod preview;
mod search;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use podium_core::{Row, Value};
use podium_operators::Frame;

use crate::error::QueryError;
use crate::metrics::QueryMetrics;
use crate::runtime::Table;

/// Rows plus an explicit column order; `total` is set for paginated queries.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip)]
    pub metrics: Option<QueryMetrics>,
}

impl QueryResult {
    pub(crate) fn from_frame(frame: Frame, metrics: QueryMetrics) -> Self {
        Self {
            columns: frame.columns().to_vec(),
            rows: frame.into_rows(),
            total: None,
            metrics: Some(metrics),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column).ok())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One page of athlete search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub data: Vec<Row>,
    /// Matches across the whole events table, independent of the page.
    pub total: u64,
    pub page: usize,
    pub page_size: usize,
    #[serde(skip)]
    pub columns: Vec<String>,
    #[serde(skip)]
    pub metrics: Option<QueryMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewTable {
    Events,
    Countries,
}

impl PreviewTable {
    pub(crate) fn table(self) -> Table {
        match self {
            PreviewTable::Events => Table::Events,
            PreviewTable::Countries => Table::Countries,
        }
    }

    pub fn default_limit(self) -> usize {
        match self {
            PreviewTable::Events => 50,
            PreviewTable::Countries => 20,
        }
    }
}

impl FromStr for PreviewTable {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" => Ok(PreviewTable::Events),
            "countries" => Ok(PreviewTable::Countries),
            other => Err(QueryError::Invalid(format!("cannot preview table '{other}'"))),
        }
    }
}

/// Order in which search matches are paginated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    /// As they appear in the events file.
    #[default]
    File,
    /// Year ascending, file order within a year.
    Year,
}

impl FromStr for SearchOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SearchOrder::File),
            "year" => Ok(SearchOrder::Year),
            other => Err(QueryError::Invalid(format!("unknown search order '{other}'"))),
        }
    }
}

/// Athlete search filters. String selectors equal to `"All"` (or blank) are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Case-insensitive substring of the athlete name.
    pub name: Option<String>,
    pub season: Option<String>,
    pub year_min: Option<i64>,
    pub year_max: Option<i64>,
    pub noc: Option<String>,
    pub sport: Option<String>,
    pub medal_only: bool,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub order: SearchOrder,
    /// Columns to return; all events columns when `None`.
    pub columns: Option<Vec<String>>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            name: None,
            season: None,
            year_min: None,
            year_max: None,
            noc: None,
            sport: None,
            medal_only: false,
            page: 1,
            page_size: 50,
            order: SearchOrder::File,
            columns: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardParams {
    /// Restrict to one Games year; output then includes a `Year` column.
    pub year: Option<i64>,
    pub top_n: usize,
}

impl Default for LeaderboardParams {
    fn default() -> Self {
        Self { year: None, top_n: 20 }
    }
}

/// Ranking column for the efficiency query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyMetric {
    MedalCount,
    #[default]
    MedalsPerMillion,
    MedalsPerBillionGdp,
}

impl EfficiencyMetric {
    pub fn column(self) -> &'static str {
        match self {
            EfficiencyMetric::MedalCount => "medal_count",
            EfficiencyMetric::MedalsPerMillion => "medals_per_million",
            EfficiencyMetric::MedalsPerBillionGdp => "medals_per_billion_gdp",
        }
    }
}

impl FromStr for EfficiencyMetric {
    type Err = QueryError;

    /// Accepts column names and the dashboard's labels ("Total medals", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medal_count" | "total medals" => Ok(EfficiencyMetric::MedalCount),
            "medals_per_million" | "medals per million people" => Ok(EfficiencyMetric::MedalsPerMillion),
            "medals_per_billion_gdp" | "medals per billion gdp" => Ok(EfficiencyMetric::MedalsPerBillionGdp),
            other => Err(QueryError::Invalid(format!("unknown efficiency metric '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyParams {
    pub year: i64,
    pub season: Option<String>,
    /// Medal type (`Gold`, `Silver`, `Bronze`); every medal when `None`.
    pub medal: Option<String>,
    pub sort_by: EfficiencyMetric,
    pub top_n: usize,
}

impl EfficiencyParams {
    pub fn for_year(year: i64) -> Self {
        Self {
            year,
            season: None,
            medal: None,
            sort_by: EfficiencyMetric::default(),
            top_n: 20,
        }
    }
}

/// A dashboard selector, or `None` for "All"/blank.
pub(crate) fn selector(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}
