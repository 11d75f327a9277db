//! Hash join.
//!
//! The smaller operand is indexed by its normalized key; the other is probed
//! row by row. Output always follows left-input order, then right-input order
//! among duplicate keys, whichever side was indexed. Rows with a null in any
//! key column never match.

use std::collections::HashMap;

use podium_core::prelude::{Error, JoinSide, KeyPart, Row, Schema, Value};

use crate::frame::Frame;
use crate::join::{JoinKind, JoinOptions};
use crate::traits::{OpError, Result};

type KeyIndex = HashMap<Vec<KeyPart>, Vec<usize>>;

pub fn hash_join(left: &Frame, right: &Frame, on: &[String], options: &JoinOptions) -> Result<Frame> {
    let lkeys = key_indices(left.schema(), on, JoinSide::Left)?;
    let rkeys = key_indices(right.schema(), on, JoinSide::Right)?;

    // left columns, then the right's non-key columns
    let mut fields = left.schema().fields.clone();
    let mut take_right = Vec::new();
    for (i, f) in right.schema().fields.iter().enumerate() {
        if rkeys.contains(&i) {
            continue;
        }
        let name = if fields.iter().any(|lf| lf.name == f.name) {
            match &options.right_suffix {
                Some(sfx) => format!("{}{}", f.name, sfx),
                None => continue,
            }
        } else {
            f.name.clone()
        };
        if fields.iter().any(|lf| lf.name == name) {
            return Err(Error::ColumnExists(name).into());
        }
        let mut field = f.clone();
        field.name = name;
        field.nullable |= options.kind == JoinKind::Left;
        fields.push(field);
        take_right.push(i);
    }
    let schema = Schema::new(fields);
    let columns = schema.column_names();

    let pairs = match options.kind {
        JoinKind::Inner if left.len() < right.len() => {
            let index = build_index(left.rows(), &lkeys);
            let mut pairs = Vec::new();
            for (ri, row) in right.rows().iter().enumerate() {
                if let Some(hits) = row_key(row, &rkeys).and_then(|k| index.get(&k)) {
                    pairs.extend(hits.iter().map(|&li| (li, Some(ri))));
                }
            }
            pairs.sort_unstable();
            trace_sizes("left", left.len(), right.len(), pairs.len());
            pairs
        }
        kind => {
            let index = build_index(right.rows(), &rkeys);
            let mut pairs = Vec::new();
            for (li, row) in left.rows().iter().enumerate() {
                match row_key(row, &lkeys).and_then(|k| index.get(&k)) {
                    Some(hits) => pairs.extend(hits.iter().map(|&ri| (li, Some(ri)))),
                    None if kind == JoinKind::Left => pairs.push((li, None)),
                    None => {}
                }
            }
            trace_sizes("right", right.len(), left.len(), pairs.len());
            pairs
        }
    };

    let mut rows = Vec::with_capacity(pairs.len());
    for (li, ri) in pairs {
        let mut values = left.rows()[li].values().to_vec();
        match ri {
            Some(ri) => {
                let rv = right.rows()[ri].values();
                values.extend(take_right.iter().map(|&i| rv[i].clone()));
            }
            None => values.extend(take_right.iter().map(|_| Value::Null)),
        }
        rows.push(Row::new(columns.clone(), values)?);
    }
    Ok(Frame::from_parts(schema, columns, rows))
}

fn key_indices(schema: &Schema, on: &[String], side: JoinSide) -> Result<Vec<usize>> {
    on.iter()
        .map(|c| {
            schema.index_of(c).ok_or_else(|| {
                OpError::from(Error::JoinKeyMissing {
                    column: c.clone(),
                    side,
                })
            })
        })
        .collect()
}

fn row_key(row: &Row, idx: &[usize]) -> Option<Vec<KeyPart>> {
    let values = row.values();
    let mut key = Vec::with_capacity(idx.len());
    for &i in idx {
        let k = values[i].key();
        if k.is_null() {
            return None;
        }
        key.push(k);
    }
    Some(key)
}

fn build_index(rows: &[Row], idx: &[usize]) -> KeyIndex {
    let mut index = KeyIndex::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(k) = row_key(row, idx) {
            index.entry(k).or_default().push(i);
        }
    }
    index
}

#[cfg(feature = "tracing")]
fn trace_sizes(build_side: &str, build_rows: usize, probe_rows: usize, output_rows: usize) {
    tracing::debug!(build_side, build_rows, probe_rows, output_rows, "hash join");
}

#[cfg(not(feature = "tracing"))]
fn trace_sizes(_build_side: &str, _build_rows: usize, _probe_rows: usize, _output_rows: usize) {}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_core::ColumnNames;

    fn frame(cols: &[&str], rows: Vec<Vec<Value>>) -> Frame {
        let names: ColumnNames = cols.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|v| Row::new(names.clone(), v).unwrap())
            .collect();
        Frame::from_rows(names, rows).unwrap()
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn duplicate_keys_fan_out_in_input_order() {
        let l = frame(
            &["NOC", "Name"],
            vec![vec![s("USA"), s("a")], vec![s("FRA"), s("b")], vec![s("USA"), s("c")]],
        );
        let r = frame(
            &["NOC", "note"],
            vec![vec![s("USA"), s("x")], vec![s("USA"), s("y")], vec![s("GER"), s("z")]],
        );
        let on = vec!["NOC".to_string()];
        let out = hash_join(&l, &r, &on, &JoinOptions::inner()).unwrap();
        let got: Vec<String> = out
            .iter()
            .map(|row| format!("{}{}", row.get("Name").unwrap(), row.get("note").unwrap()))
            .collect();
        assert_eq!(got, vec!["ax", "ay", "cx", "cy"]);

        // same order when the left operand is the one indexed
        let small = frame(&["NOC", "Name"], vec![vec![s("USA"), s("a")], vec![s("USA"), s("c")]]);
        let out = hash_join(&small, &r, &on, &JoinOptions::inner()).unwrap();
        let got: Vec<String> = out
            .iter()
            .map(|row| format!("{}{}", row.get("Name").unwrap(), row.get("note").unwrap()))
            .collect();
        assert_eq!(got, vec!["ax", "ay", "cx", "cy"]);
    }

    #[test]
    fn missing_key_reports_side() {
        let l = frame(&["NOC"], vec![vec![s("USA")]]);
        let r = frame(&["region"], vec![vec![s("United States")]]);
        let err = hash_join(&l, &r, &["NOC".to_string()], &JoinOptions::inner()).unwrap_err();
        assert!(matches!(
            err,
            crate::OpError::Core(Error::JoinKeyMissing { side: JoinSide::Right, .. })
        ));
    }

    #[test]
    fn left_join_keeps_unmatched_and_suffixes_collisions() {
        let l = frame(&["NOC", "Year"], vec![vec![s("USA"), Value::Int(2012)], vec![s("ROT"), Value::Int(2016)]]);
        let r = frame(&["NOC", "Year"], vec![vec![s("USA"), Value::Int(1896)]]);
        let on = vec!["NOC".to_string()];
        let out = hash_join(&l, &r, &on, &JoinOptions::left().with_right_suffix("_r")).unwrap();
        assert_eq!(&out.columns()[..], &["NOC".to_string(), "Year".to_string(), "Year_r".to_string()]);
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows()[1].get("Year_r").unwrap(), &Value::Null);

        let dropped = hash_join(&l, &r, &on, &JoinOptions::inner()).unwrap();
        assert_eq!(&dropped.columns()[..], &["NOC".to_string(), "Year".to_string()]);
    }

    #[test]
    fn null_keys_never_match() {
        let l = frame(&["NOC", "v"], vec![vec![Value::Null, s("a")]]);
        let r = frame(&["NOC", "w"], vec![vec![Value::Null, s("b")]]);
        let out = hash_join(&l, &r, &["NOC".to_string()], &JoinOptions::inner()).unwrap();
        assert!(out.is_empty());
    }
}
