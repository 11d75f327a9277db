use podium_operators::{group_by_stream, Aggregation, Condition, FilterProject, GroupBy, JoinOptions, Predicate};

use crate::error::Result;
use crate::metrics::QueryTimer;
use crate::queries::{LeaderboardParams, QueryResult};
use crate::runtime::{Engine, Table};

impl Engine {
    /// Medal counts per NOC (per NOC and year when `year` is set), with the
    /// region name attached, highest first. Ties keep first-seen order.
    ///
    /// Across all years every NOC in the events table is listed, including
    /// those with no medals; a single year only lists medal winners.
    pub fn leaderboard(&self, params: &LeaderboardParams) -> Result<QueryResult> {
        let timer = QueryTimer::start("leaderboard");
        let mut predicate = Predicate::all();
        let mut keys = vec!["NOC"];
        if let Some(year) = params.year {
            predicate = predicate
                .and(Condition::not_null("Medal"))
                .and(Condition::eq("Year", year));
            keys.push("Year");
        }

        let mut events = FilterProject::new(self.open(Table::Events)?, &predicate, None)?;
        let spec = GroupBy::new(&keys[..]).agg(Aggregation::count_non_null("Medal").alias("medal_count"));
        let counts = group_by_stream(&mut events, &spec)?;

        let regions = self.load(Table::Countries)?.project(&["NOC", "region"])?;
        let ranked = counts
            .join_with(&regions, &["NOC"], &JoinOptions::left())?
            .sort_by("medal_count", true)?
            .top_n(params.top_n);

        let mut columns = vec!["NOC", "region"];
        if params.year.is_some() {
            columns.push("Year");
        }
        columns.push("medal_count");
        let out = ranked.project(&columns)?;

        let metrics = timer.finish(out.len(), &events.source().stats());
        Ok(QueryResult::from_frame(out, metrics))
    }
}
