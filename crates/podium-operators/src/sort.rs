//! Ordering helpers: nulls-last comparison, stable multi-key sort, bounded top-k.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use podium_core::prelude::{Row, Schema, Value};
use podium_core::value::total_cmp;

use crate::traits::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Compare two cells; nulls go last whichever the direction.
pub fn compare_nulls_last(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let o = total_cmp(a, b);
            if descending {
                o.reverse()
            } else {
                o
            }
        }
    }
}

/// Stable in-place sort of rows sharing `schema`'s layout.
pub fn sort_rows(schema: &Schema, rows: &mut [Row], keys: &[SortKey]) -> Result<()> {
    let mut bound = Vec::with_capacity(keys.len());
    for k in keys {
        bound.push((schema.require(&k.column)?, k.descending));
    }
    rows.sort_by(|a, b| {
        for &(idx, desc) in &bound {
            let o = match (a.value(idx), b.value(idx)) {
                (Some(x), Some(y)) => compare_nulls_last(x, y, desc),
                _ => Ordering::Equal,
            };
            if o != Ordering::Equal {
                return o;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

/// Keeps the best `capacity` items by key, ties resolved by arrival order.
///
/// Memory is bounded by `capacity` regardless of how many items are pushed.
pub struct BoundedTopK<T> {
    capacity: usize,
    descending: bool,
    heap: BinaryHeap<Ranked<T>>,
    seq: u64,
}

struct Ranked<T> {
    key: Value,
    seq: u64,
    descending: bool,
    item: T,
}

impl<T> Ord for Ranked<T> {
    // "greater" means ranked later; the heap top is the first to evict
    fn cmp(&self, other: &Self) -> Ordering {
        compare_nulls_last(&self.key, &other.key, self.descending).then(self.seq.cmp(&other.seq))
    }
}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> BoundedTopK<T> {
    pub fn new(capacity: usize, descending: bool) -> Self {
        Self {
            capacity,
            descending,
            heap: BinaryHeap::with_capacity(capacity.min(4096) + 1),
            seq: 0,
        }
    }

    pub fn push(&mut self, key: Value, item: T) {
        if self.capacity == 0 {
            return;
        }
        let ranked = Ranked {
            key,
            seq: self.seq,
            descending: self.descending,
            item,
        };
        self.seq += 1;
        if self.heap.len() >= self.capacity {
            match self.heap.peek() {
                Some(worst) if ranked.cmp(worst) == Ordering::Greater => return,
                _ => {}
            }
        }
        self.heap.push(ranked);
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Items pushed so far, including evicted ones.
    pub fn seen(&self) -> u64 {
        self.seq
    }

    /// Best-first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|r| r.item)
            .collect()
    }
}
