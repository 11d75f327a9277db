//! Streaming readers that produce one `Row` at a time.

pub mod csv;
