//! Byte-counting reader used to observe how much of a source was consumed.
//!
//! The counter is shared (`Arc`) so a caller can keep a handle after the reader
//! moves into a CSV parser, and check that a bounded preview stopped early.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{IoError, Result};

/// Shared count of bytes pulled from the underlying source.
#[derive(Debug, Clone, Default)]
pub struct ReadCounter {
    bytes: Arc<AtomicU64>,
}

impl ReadCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn add(&self, n: usize) {
        self.bytes.fetch_add(n as u64, Ordering::Relaxed);
    }
}

/// A thin wrapper over any `Read` that records bytes read.
pub struct CountingReader<R: Read> {
    inner: R,
    counter: ReadCounter,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            counter: ReadCounter::new(),
        }
    }

    pub fn counter(&self) -> ReadCounter {
        self.counter.clone()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.add(n);
        Ok(n)
    }
}

/// Open a file for counted reading. Missing or unreadable files are `IoError::Open`.
pub fn counting_from_path<P: AsRef<Path>>(path: P) -> Result<CountingReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(CountingReader::new(file))
}
