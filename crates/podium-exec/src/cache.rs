//! Opt-in cache of materialized small tables.
//!
//! Entries are keyed by path and stamped with a blake3 fingerprint of the
//! file's size, modification time and path; a changed fingerprint reloads the
//! table on next use. Frames are handed out as `Arc<Frame>` and never mutated.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::UNIX_EPOCH;

use serde::Serialize;

use podium_core::hash::{hash_parts, Hash256};
use podium_operators::Frame;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CachedTable {
    fingerprint: Hash256,
    frame: Arc<Frame>,
}

#[derive(Default)]
pub struct TableCache {
    entries: RwLock<HashMap<PathBuf, CachedTable>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached frame for `path` if its fingerprint is unchanged,
    /// otherwise run `load` and remember the result.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<Frame>>
    where
        F: FnOnce() -> Result<Frame>,
    {
        let Ok(fp) = fingerprint(path) else {
            // unreadable metadata: let the loader surface the real error
            self.misses.fetch_add(1, Ordering::Relaxed);
            return load().map(Arc::new);
        };

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = entries.get(path).filter(|e| e.fingerprint == fp) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(&hit.frame));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let frame = Arc::new(load()?);
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), fingerprint = %fp, rows = frame.len(), "table cached");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            path.to_path_buf(),
            CachedTable {
                fingerprint: fp,
                frame: Arc::clone(&frame),
            },
        );
        Ok(frame)
    }

    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }
}

/// Fingerprint of a file's identity: size, mtime (ns since epoch) and path.
pub fn fingerprint(path: &Path) -> io::Result<Hash256> {
    let meta = fs::metadata(path)?;
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0u128, |d| d.as_nanos());
    let name = path.to_string_lossy();
    Ok(hash_parts([
        &meta.len().to_le_bytes()[..],
        &mtime.to_le_bytes()[..],
        name.as_bytes(),
    ]))
}
