use podium_operators::{Frame, JoinOptions};

use crate::error::Result;
use crate::metrics::QueryTimer;
use crate::queries::QueryResult;
use crate::runtime::{Engine, Table};

const OUTPUT_COLUMNS: [&str; 8] = ["Name", "Year", "Season", "Sport", "Event", "Medal", "NOC", "region"];

impl Engine {
    /// A sample of events rows joined with their region, first `limit` rows.
    pub fn join_demo(&self, limit: usize) -> Result<QueryResult> {
        let timer = QueryTimer::start("join_demo");
        let sample_rows = self.config().join_demo_sample_rows;
        let mut reader = self.open_with(
            Table::Events,
            self.read_options(Table::Events).with_limit(sample_rows),
        )?;
        let sample = Frame::from_source(&mut reader)?;
        let regions = self.load(Table::Countries)?.project(&["NOC", "region"])?;

        let out = sample
            .join_with(&regions, &["NOC"], &JoinOptions::left())?
            .project(&OUTPUT_COLUMNS)?
            .head(limit);

        let metrics = timer.finish(out.len(), &reader.stats());
        Ok(QueryResult::from_frame(out, metrics))
    }
}
