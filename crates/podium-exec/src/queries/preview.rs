use podium_operators::RowSource;

use crate::error::Result;
use crate::metrics::QueryTimer;
use crate::queries::{PreviewTable, QueryResult};
use crate::runtime::Engine;

impl Engine {
    /// First `limit` rows of a table, unfiltered. The reader stops after
    /// `limit` rows; the rest of the file is never read.
    pub fn preview(&self, table: PreviewTable, limit: usize) -> Result<QueryResult> {
        let timer = QueryTimer::start("preview");
        let t = table.table();
        let mut reader = self.open_with(t, self.read_options(t).with_limit(limit))?;
        let columns = reader.columns().to_vec();
        let mut rows = Vec::with_capacity(limit.min(1024));
        while let Some(row) = reader.next_row()? {
            rows.push(row);
        }
        let metrics = timer.finish(rows.len(), &reader.stats());
        Ok(QueryResult {
            columns,
            rows,
            total: None,
            metrics: Some(metrics),
        })
    }
}
