use podium_core::{Row, Value};
use podium_operators::{group_by_count_stream, Condition, FilterProject, Frame, JoinOptions, Predicate};

use crate::error::Result;
use crate::metrics::QueryTimer;
use crate::queries::{selector, EfficiencyParams, QueryResult};
use crate::runtime::{Engine, Table};

const OUTPUT_COLUMNS: [&str; 9] = [
    "NOC",
    "region",
    "Country Name",
    "Year",
    "medal_count",
    "Population",
    "GDP_USD",
    "medals_per_million",
    "medals_per_billion_gdp",
];

impl Engine {
    /// Medals per capita and per GDP for one Games year.
    ///
    /// Medal rows are counted per (NOC, Year) in one pass over the events
    /// table, then joined with regions and population/GDP statistics. Ratios
    /// with a zero or missing denominator are null.
    pub fn efficiency(&self, params: &EfficiencyParams) -> Result<QueryResult> {
        let timer = QueryTimer::start("efficiency");
        let mut predicate = Predicate::all()
            .and(Condition::not_null("Medal"))
            .and(Condition::eq("Year", params.year));
        if let Some(season) = selector(&params.season) {
            predicate = predicate.and(Condition::eq("Season", season));
        }
        if let Some(medal) = selector(&params.medal) {
            predicate = predicate.and(Condition::eq("Medal", medal));
        }

        let mut medals = FilterProject::new(self.open(Table::Events)?, &predicate, None)?;
        let counts = group_by_count_stream(&mut medals, &["NOC", "Year"], "medal_count")?;

        let regions = self.load(Table::Countries)?.project(&["NOC", "region"])?;
        let with_region = counts.join_with(&regions, &["NOC"], &JoinOptions::left())?;
        let with_stats = self.attach_stats(with_region)?;

        let named = if with_stats.schema().contains("Country Name") {
            with_stats
        } else {
            with_stats.add_column("Country Name", |_| Value::Null)?
        };
        let scored = named
            .add_column("medals_per_million", |r| per_unit(r, "Population", 1e6))?
            .add_column("medals_per_billion_gdp", |r| per_unit(r, "GDP_USD", 1e9))?;

        let out = scored
            .sort_by(params.sort_by.column(), true)?
            .top_n(params.top_n)
            .project(&OUTPUT_COLUMNS)?;

        let metrics = timer.finish(out.len(), &medals.source().stats());
        Ok(QueryResult::from_frame(out, metrics))
    }

    /// Join population/GDP on (NOC, Year), or on (Country Code, Year) through
    /// the NOC code table when one is configured.
    fn attach_stats(&self, counts: Frame) -> Result<Frame> {
        let stats = self.load(Table::Stats)?;
        let left = JoinOptions::left();
        if self.config().noc_codes_file.is_none() {
            return Ok(counts.join_with(&stats, &["NOC", "Year"], &left)?);
        }
        let codes = self.load(Table::NocCodes)?.project(&["NOC", "Country Code"])?;
        Ok(counts
            .join_with(&codes, &["NOC"], &left)?
            .join_with(&stats, &["Country Code", "Year"], &left)?)
    }
}

/// `medal_count / (row[column] / scale)`, null when the denominator is zero or missing.
fn per_unit(row: &Row, column: &str, scale: f64) -> Value {
    let count = row.get("medal_count").ok().and_then(Value::as_f64);
    let denom = row.get(column).ok().and_then(Value::as_f64);
    match (count, denom) {
        (Some(c), Some(d)) if d > 0.0 => {
            let ratio = c / (d / scale);
            if ratio.is_finite() {
                Value::Float(ratio)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    }
}
