//! Per-query timing.
//!
//! Each façade query wraps itself in a [`QueryTimer`]; finishing it yields a
//! [`QueryMetrics`] record and, with the `tracing` feature, one `info` event.

use std::time::Instant;

use podium_io::ReadStats;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryMetrics {
    pub query: &'static str,
    pub elapsed_ms: f64,
    pub rows_returned: usize,
    /// Input records pulled from the streamed table, malformed ones included.
    pub rows_scanned: u64,
    /// Records the malformed-row policy skipped or padded.
    pub malformed_rows: u64,
}

pub struct QueryTimer {
    query: &'static str,
    started: Instant,
}

impl QueryTimer {
    pub fn start(query: &'static str) -> Self {
        Self {
            query,
            started: Instant::now(),
        }
    }

    /// `read` are the counters of the reader the query streamed.
    pub fn finish(self, rows_returned: usize, read: &ReadStats) -> QueryMetrics {
        let metrics = QueryMetrics {
            query: self.query,
            elapsed_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            rows_returned,
            rows_scanned: read.records_read,
            malformed_rows: read.malformed_rows,
        };
        emit(&metrics);
        metrics
    }
}

#[cfg(feature = "tracing")]
fn emit(m: &QueryMetrics) {
    tracing::info!(
        query = m.query,
        elapsed_ms = m.elapsed_ms,
        rows_returned = m.rows_returned,
        rows_scanned = m.rows_scanned,
        malformed_rows = m.malformed_rows,
        "query finished"
    );
}

#[cfg(not(feature = "tracing"))]
fn emit(_m: &QueryMetrics) {}
