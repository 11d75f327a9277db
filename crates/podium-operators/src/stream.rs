//! Streaming filter + projection with pagination.
//!
//! Rows are tested before they are projected or buffered; only the requested
//! page is kept while every match is still counted, so `total` reflects the
//! whole stream no matter which page was asked for.

use podium_core::prelude::{ColumnNames, Error, Row};

use crate::predicate::{BoundPredicate, Predicate};
use crate::sort::{BoundedTopK, SortKey};
use crate::traits::{Result, RowSource};

/// A window over a sequence of matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// 1-based page number; page 0 is treated as page 1.
    pub fn from_number(page: usize, page_size: usize) -> Self {
        Self {
            offset: page.max(1).saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    }

    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }

    fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    fn contains(&self, idx: usize) -> bool {
        idx >= self.offset && idx < self.end()
    }
}

/// One page of matches plus whole-stream counters.
#[derive(Debug, Clone)]
pub struct Paged {
    pub columns: ColumnNames,
    pub rows: Vec<Row>,
    /// Rows that passed the predicate across the entire stream.
    pub total: u64,
    /// Rows pulled from the source.
    pub scanned: u64,
}

/// Filter/project adapter; itself a [`RowSource`], so it composes.
pub struct FilterProject<S: RowSource> {
    source: S,
    predicate: BoundPredicate,
    projection: Option<Vec<usize>>,
    columns: ColumnNames,
    scanned: u64,
    matched: u64,
}

impl<S: RowSource> FilterProject<S> {
    /// `projection` of `None` keeps every source column.
    pub fn new(source: S, predicate: &Predicate, projection: Option<&[String]>) -> Result<Self> {
        let predicate = predicate.bind(source.columns())?;
        let (projection, columns) = match projection {
            None => (None, source.columns().clone()),
            Some(names) => {
                let mut idx = Vec::with_capacity(names.len());
                for name in names {
                    let i = source
                        .columns()
                        .iter()
                        .position(|c| c == name)
                        .ok_or_else(|| Error::UnknownColumn(name.clone()))?;
                    idx.push(i);
                }
                (Some(idx), ColumnNames::from(names.to_vec()))
            }
        };
        Ok(Self {
            source,
            predicate,
            projection,
            columns,
            scanned: 0,
            matched: 0,
        })
    }

    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    pub fn matched(&self) -> u64 {
        self.matched
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Next source row passing the predicate, not yet projected.
    fn next_match(&mut self) -> Result<Option<Row>> {
        while let Some(row) = self.source.next_row()? {
            self.scanned += 1;
            if self.predicate.matches(&row) {
                self.matched += 1;
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn project(&self, row: Row) -> Result<Row> {
        match &self.projection {
            None => Ok(row),
            Some(idx) => {
                let values = row.values();
                let picked = idx.iter().map(|&i| values[i].clone()).collect();
                Ok(Row::new(self.columns.clone(), picked)?)
            }
        }
    }
}

impl<S: RowSource> RowSource for FilterProject<S> {
    fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        match self.next_match()? {
            Some(row) => Ok(Some(self.project(row)?)),
            None => Ok(None),
        }
    }
}

impl<S: RowSource> Iterator for FilterProject<S> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

/// Filter, project and paginate `source` in file order.
pub fn filter_project_stream<S: RowSource>(
    source: S,
    predicate: &Predicate,
    projection: Option<&[String]>,
    page: Page,
) -> Result<Paged> {
    let mut fp = FilterProject::new(source, predicate, projection)?;
    let mut rows = Vec::new();
    let mut idx = 0usize;
    while let Some(row) = fp.next_match()? {
        if page.contains(idx) {
            rows.push(fp.project(row)?);
        }
        idx += 1;
    }
    Ok(Paged {
        columns: fp.columns.clone(),
        rows,
        total: fp.matched,
        scanned: fp.scanned,
    })
}

/// Like [`filter_project_stream`], but pages are taken in `key` order (stable
/// by file order). Only `offset + limit` rows are held at any time.
pub fn filter_project_sorted<S: RowSource>(
    source: S,
    predicate: &Predicate,
    projection: Option<&[String]>,
    key: &SortKey,
    page: Page,
) -> Result<Paged> {
    let key_idx = source
        .columns()
        .iter()
        .position(|c| *c == key.column)
        .ok_or_else(|| Error::UnknownColumn(key.column.clone()))?;
    let mut fp = FilterProject::new(source, predicate, projection)?;
    let mut top = BoundedTopK::new(page.end(), key.descending);
    while let Some(row) = fp.next_match()? {
        let k = row.values()[key_idx].clone();
        top.push(k, fp.project(row)?);
    }
    let rows = top
        .into_sorted_vec()
        .into_iter()
        .skip(page.offset)
        .collect();
    Ok(Paged {
        columns: fp.columns.clone(),
        rows,
        total: fp.matched,
        scanned: fp.scanned,
    })
}
