//! Owned, immutable tables.
//!
//! A `Frame` is what small tables (countries, population/GDP) and aggregation
//! outputs become once materialized. Every operation returns a new frame; the
//! receiver is never modified.

use podium_core::prelude::{ColumnNames, Error, Field, Row, Schema, Value};

use crate::aggregate::{GroupAccumulator, GroupBy};
use crate::join::{hash_join, JoinOptions};
use crate::predicate::Predicate;
use crate::sort::{sort_rows, SortKey};
use crate::traits::{Result, RowSource};

#[derive(Debug, Clone)]
pub struct Frame {
    schema: Schema,
    columns: ColumnNames,
    rows: Vec<Row>,
}

impl Frame {
    /// Build a frame from rows that must all carry `schema`'s column layout.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Result<Self> {
        let columns = schema.column_names();
        let mut bound = Vec::with_capacity(rows.len());
        for row in rows {
            if row.names()[..] != columns[..] {
                return Err(Error::Schema(format!(
                    "row columns {:?} do not match frame columns {:?}",
                    row.names(),
                    columns
                ))
                .into());
            }
            bound.push(row.rebind(columns.clone())?);
        }
        Ok(Self::from_parts(schema, columns, bound))
    }

    pub fn empty(columns: ColumnNames) -> Self {
        let schema = Schema::infer(&columns, &[]);
        Self::from_parts(schema, columns, Vec::new())
    }

    /// Rows already laid out as `columns`; the schema is inferred from values.
    pub fn from_rows(columns: ColumnNames, rows: Vec<Row>) -> Result<Self> {
        let schema = Schema::infer(&columns, &rows);
        Self::new(schema, rows)
    }

    /// Drain a source. Uses the source's own schema when it tracks one.
    pub fn from_source<S: RowSource>(mut source: S) -> Result<Self> {
        let columns = source.columns().clone();
        let mut rows = Vec::new();
        while let Some(row) = source.next_row()? {
            rows.push(row);
        }
        let schema = source
            .schema()
            .unwrap_or_else(|| Schema::infer(&columns, &rows));
        Self::new(schema, rows)
    }

    pub(crate) fn from_parts(schema: Schema, columns: ColumnNames, rows: Vec<Row>) -> Self {
        Self {
            schema,
            columns,
            rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.schema.require(name)?;
        Ok(self.rows.iter().filter_map(move |r| r.value(idx)))
    }

    /// New frame with `name` appended, computed from each row.
    pub fn add_column<F>(&self, name: &str, f: F) -> Result<Frame>
    where
        F: Fn(&Row) -> Value,
    {
        if self.schema.contains(name) {
            return Err(Error::ColumnExists(name.to_string()).into());
        }
        let mut names = self.columns.to_vec();
        names.push(name.to_string());
        let columns: ColumnNames = names.into();

        let mut rows = Vec::with_capacity(self.rows.len());
        let mut derived = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let v = f(row);
            derived.push(v.clone());
            let mut values = row.values().to_vec();
            values.push(v);
            rows.push(Row::new(columns.clone(), values)?);
        }

        let mut fields = self.schema.fields.clone();
        fields.push(Field::infer(name, derived.iter()));
        Ok(Self::from_parts(Schema::new(fields), columns, rows))
    }

    /// New frame with exactly `names`, in that order.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame> {
        let mut idx = Vec::with_capacity(names.len());
        let mut fields = Vec::with_capacity(names.len());
        for n in names {
            let i = self.schema.require(n.as_ref())?;
            idx.push(i);
            fields.push(self.schema.fields[i].clone());
        }
        let schema = Schema::new(fields);
        let columns = schema.column_names();
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let values = row.values();
            rows.push(Row::new(columns.clone(), idx.iter().map(|&i| values[i].clone()).collect())?);
        }
        Ok(Self::from_parts(schema, columns, rows))
    }

    pub fn filter(&self, predicate: &Predicate) -> Result<Frame> {
        let bound = predicate.bind(&self.columns)?;
        let rows = self.rows.iter().filter(|r| bound.matches(r)).cloned().collect();
        Ok(Self::from_parts(self.schema.clone(), self.columns.clone(), rows))
    }

    /// Inner hash join on `on`.
    pub fn join<S: AsRef<str>>(&self, other: &Frame, on: &[S]) -> Result<Frame> {
        self.join_with(other, on, &JoinOptions::default())
    }

    pub fn join_with<S: AsRef<str>>(&self, other: &Frame, on: &[S], options: &JoinOptions) -> Result<Frame> {
        let on: Vec<String> = on.iter().map(|s| s.as_ref().to_string()).collect();
        hash_join(self, other, &on, options)
    }

    /// Stable sort on one column; nulls last.
    pub fn sort_by(&self, column: &str, descending: bool) -> Result<Frame> {
        let key = SortKey {
            column: column.to_string(),
            descending,
        };
        self.sort_by_keys(std::slice::from_ref(&key))
    }

    /// Stable lexicographic sort; each key puts nulls last.
    pub fn sort_by_keys(&self, keys: &[SortKey]) -> Result<Frame> {
        let mut rows = self.rows.clone();
        sort_rows(&self.schema, &mut rows, keys)?;
        Ok(Self::from_parts(self.schema.clone(), self.columns.clone(), rows))
    }

    /// First `n` rows in current order.
    pub fn top_n(&self, n: usize) -> Frame {
        self.slice(0, n)
    }

    pub fn head(&self, n: usize) -> Frame {
        self.slice(0, n)
    }

    pub fn slice(&self, offset: usize, len: usize) -> Frame {
        let rows = self.rows.iter().skip(offset).take(len).cloned().collect();
        Self::from_parts(self.schema.clone(), self.columns.clone(), rows)
    }

    pub fn group_by(&self, spec: &GroupBy) -> Result<Frame> {
        let mut acc = GroupAccumulator::new(spec, &self.columns)?;
        for row in &self.rows {
            acc.update(row);
        }
        acc.finish()
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
