//! Hash group-by with streaming accumulation.
//!
//! One accumulator slot per distinct key; groups are emitted in order of first
//! occurrence. Input rows are consumed one at a time and never retained.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use podium_core::prelude::{ColumnNames, Error, KeyPart, Row, Value};
use podium_core::value::total_cmp;

use crate::frame::Frame;
use crate::traits::{Result, RowSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFunc {
    /// Every row in the group.
    Count,
    /// Rows whose column is not null.
    CountNonNull,
    Sum,
    Min,
    Max,
    Avg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub func: AggFunc,
    pub column: Option<String>,
    pub alias: String,
}

impl Aggregation {
    pub fn count() -> Self {
        Self {
            func: AggFunc::Count,
            column: None,
            alias: "count_all".into(),
        }
    }

    pub fn count_non_null(column: impl Into<String>) -> Self {
        Self::on(AggFunc::CountNonNull, "count", column.into())
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::on(AggFunc::Sum, "sum", column.into())
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::on(AggFunc::Min, "min", column.into())
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::on(AggFunc::Max, "max", column.into())
    }

    pub fn avg(column: impl Into<String>) -> Self {
        Self::on(AggFunc::Avg, "avg", column.into())
    }

    fn on(func: AggFunc, prefix: &str, column: String) -> Self {
        Self {
            func,
            alias: format!("{prefix}_{column}"),
            column: Some(column),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

/// Group keys plus the aggregations computed per group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub keys: Vec<String>,
    pub aggs: Vec<Aggregation>,
}

impl GroupBy {
    pub fn new<S: AsRef<str>>(keys: &[S]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            aggs: Vec::new(),
        }
    }

    pub fn agg(mut self, agg: Aggregation) -> Self {
        self.aggs.push(agg);
        self
    }

    pub fn count_as(self, alias: impl Into<String>) -> Self {
        self.agg(Aggregation::count().alias(alias))
    }

    fn output_columns(&self) -> Result<ColumnNames> {
        let mut names: Vec<String> = Vec::with_capacity(self.keys.len() + self.aggs.len());
        for n in self.keys.iter().chain(self.aggs.iter().map(|a| &a.alias)) {
            if names.contains(n) {
                return Err(Error::ColumnExists(n.clone()).into());
            }
            names.push(n.clone());
        }
        Ok(names.into())
    }
}

#[derive(Debug, Clone)]
enum AggState {
    Count(i64),
    Sum { int: i64, float: f64, is_float: bool },
    Extreme(Option<Value>),
    Avg { sum: f64, n: u64 },
}

impl AggState {
    fn new(func: AggFunc) -> Self {
        match func {
            AggFunc::Count | AggFunc::CountNonNull => AggState::Count(0),
            AggFunc::Sum => AggState::Sum {
                int: 0,
                float: 0.0,
                is_float: false,
            },
            AggFunc::Min | AggFunc::Max => AggState::Extreme(None),
            AggFunc::Avg => AggState::Avg { sum: 0.0, n: 0 },
        }
    }

    fn update(&mut self, func: AggFunc, v: Option<&Value>) {
        match (self, func) {
            (AggState::Count(c), AggFunc::Count) => *c += 1,
            (AggState::Count(c), _) => {
                if v.is_some_and(|v| !v.is_null()) {
                    *c += 1;
                }
            }
            (AggState::Sum { int, float, is_float }, _) => match v {
                Some(Value::Int(i)) if !*is_float => match int.checked_add(*i) {
                    Some(s) => *int = s,
                    None => {
                        *is_float = true;
                        *float = *int as f64 + *i as f64;
                    }
                },
                Some(Value::Int(i)) => *float += *i as f64,
                Some(Value::Float(f)) => {
                    if !*is_float {
                        *is_float = true;
                        *float = *int as f64;
                    }
                    *float += f;
                }
                _ => {}
            },
            (AggState::Extreme(cur), func) => {
                let Some(v) = v.filter(|v| !v.is_null()) else {
                    return;
                };
                let replace = match cur {
                    None => true,
                    Some(c) => {
                        let o = total_cmp(v, c);
                        if func == AggFunc::Min {
                            o.is_lt()
                        } else {
                            o.is_gt()
                        }
                    }
                };
                if replace {
                    *cur = Some(v.clone());
                }
            }
            (AggState::Avg { sum, n }, _) => {
                if let Some(x) = v.and_then(Value::as_f64) {
                    *sum += x;
                    *n += 1;
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            AggState::Count(c) => Value::Int(c),
            AggState::Sum { int, float, is_float } => {
                if is_float {
                    Value::Float(float)
                } else {
                    Value::Int(int)
                }
            }
            AggState::Extreme(v) => v.unwrap_or(Value::Null),
            AggState::Avg { sum, n } => {
                if n == 0 {
                    Value::Null
                } else {
                    Value::Float(sum / n as f64)
                }
            }
        }
    }
}

/// Running state of one group-by over rows of a fixed layout.
pub(crate) struct GroupAccumulator {
    key_idx: Vec<usize>,
    aggs: Vec<(AggFunc, Option<usize>)>,
    index: HashMap<Vec<KeyPart>, usize>,
    groups: Vec<(Vec<Value>, Vec<AggState>)>,
    output: ColumnNames,
}

impl GroupAccumulator {
    pub(crate) fn new(spec: &GroupBy, input: &ColumnNames) -> Result<Self> {
        let find = |name: &str| {
            input
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| Error::UnknownColumn(name.to_string()))
        };
        let mut key_idx = Vec::with_capacity(spec.keys.len());
        for k in &spec.keys {
            key_idx.push(find(k.as_str())?);
        }
        let mut aggs = Vec::with_capacity(spec.aggs.len());
        for a in &spec.aggs {
            let col = match (&a.column, a.func) {
                (Some(c), _) => Some(find(c.as_str())?),
                (None, AggFunc::Count) => None,
                (None, _) => {
                    return Err(Error::Invariant(format!("aggregation '{}' needs a column", a.alias)).into())
                }
            };
            aggs.push((a.func, col));
        }
        Ok(Self {
            key_idx,
            aggs,
            index: HashMap::new(),
            groups: Vec::new(),
            output: spec.output_columns()?,
        })
    }

    pub(crate) fn update(&mut self, row: &Row) {
        let values = row.values();
        let key: Vec<KeyPart> = self.key_idx.iter().map(|&i| values[i].key()).collect();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                let key_values = self.key_idx.iter().map(|&i| values[i].clone()).collect();
                let states = self.aggs.iter().map(|(f, _)| AggState::new(*f)).collect();
                self.groups.push((key_values, states));
                self.index.insert(key, slot);
                slot
            }
        };
        let states = &mut self.groups[slot].1;
        for (state, (func, col)) in states.iter_mut().zip(&self.aggs) {
            state.update(*func, col.map(|i| &values[i]));
        }
    }

    #[cfg(feature = "tracing")]
    pub(crate) fn groups(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn finish(self) -> Result<Frame> {
        let mut rows = Vec::with_capacity(self.groups.len());
        for (mut values, states) in self.groups {
            values.extend(states.into_iter().map(AggState::finish));
            rows.push(Row::new(self.output.clone(), values)?);
        }
        Frame::from_rows(self.output, rows)
    }
}

/// Single-pass group-by over a stream.
pub fn group_by_stream<S: RowSource>(mut source: S, spec: &GroupBy) -> Result<Frame> {
    let mut acc = GroupAccumulator::new(spec, source.columns())?;
    while let Some(row) = source.next_row()? {
        acc.update(&row);
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(groups = acc.groups(), keys = ?spec.keys, "group-by finished");
    acc.finish()
}

/// Count rows per distinct key, output column `alias`.
pub fn group_by_count_stream<S: RowSource, K: AsRef<str>>(source: S, keys: &[K], alias: &str) -> Result<Frame> {
    group_by_stream(source, &GroupBy::new(keys).count_as(alias))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RowsSource;

    fn source(rows: &[(&str, Option<f64>)]) -> RowsSource<std::vec::IntoIter<Row>> {
        let cols: ColumnNames = vec!["NOC".to_string(), "Height".to_string()].into();
        let rows: Vec<Row> = rows
            .iter()
            .map(|(noc, h)| Row::new(cols.clone(), vec![Value::from(*noc), Value::from(*h)]).unwrap())
            .collect();
        RowsSource::new(cols, rows)
    }

    #[test]
    fn counts_per_key_in_first_seen_order() {
        let src = source(&[("USA", None), ("USA", None), ("FRA", None)]);
        let out = group_by_count_stream(src, &["NOC"], "medal_count").unwrap();
        let got: Vec<(String, Value)> = out
            .iter()
            .map(|r| (r.get("NOC").unwrap().to_string(), r.get("medal_count").unwrap().clone()))
            .collect();
        assert_eq!(
            got,
            vec![("USA".into(), Value::Int(2)), ("FRA".into(), Value::Int(1))]
        );
    }

    #[test]
    fn general_aggregations_skip_nulls() {
        let src = source(&[("USA", Some(180.0)), ("USA", None), ("USA", Some(170.0))]);
        let spec = GroupBy::new(&["NOC"])
            .agg(Aggregation::count())
            .agg(Aggregation::count_non_null("Height"))
            .agg(Aggregation::sum("Height"))
            .agg(Aggregation::min("Height"))
            .agg(Aggregation::max("Height"))
            .agg(Aggregation::avg("Height"));
        let out = group_by_stream(src, &spec).unwrap();
        let row = &out.rows()[0];
        assert_eq!(row.get("count_all").unwrap(), &Value::Int(3));
        assert_eq!(row.get("count_Height").unwrap(), &Value::Int(2));
        assert_eq!(row.get("sum_Height").unwrap(), &Value::Float(350.0));
        assert_eq!(row.get("min_Height").unwrap(), &Value::Float(170.0));
        assert_eq!(row.get("max_Height").unwrap(), &Value::Float(180.0));
        assert_eq!(row.get("avg_Height").unwrap(), &Value::Float(175.0));
    }

    #[test]
    fn alias_colliding_with_key_is_rejected() {
        let src = source(&[("USA", None)]);
        let err = group_by_count_stream(src, &["NOC"], "NOC").unwrap_err();
        assert!(matches!(err, crate::OpError::Core(Error::ColumnExists(c)) if c == "NOC"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let src = source(&[("USA", None)]);
        assert!(group_by_count_stream(src, &["Team"], "n").is_err());
    }
}
