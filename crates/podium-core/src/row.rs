//! Rows: an ordered mapping from column name to [`Value`].
//!
//! The column names are shared (`Arc<[String]>`) between every row produced by
//! one reader or frame, so a row costs one vector of values plus a pointer.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::value::Value;

/// Ordered column names shared by all rows of one stream or frame.
pub type ColumnNames = Arc<[String]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: ColumnNames,
    values: Vec<Value>,
}

impl Row {
    pub fn new(names: ColumnNames, values: Vec<Value>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(Error::Invariant(format!(
                "row has {} values for {} columns",
                values.len(),
                names.len()
            )));
        }
        Ok(Self { names, values })
    }

    /// Build a row from `(name, value)` pairs. Duplicate names are rejected.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut values = Vec::new();
        for (k, v) in pairs {
            let k = k.into();
            if names.contains(&k) {
                return Err(Error::ColumnExists(k));
            }
            names.push(k);
            values.push(v.into());
        }
        Ok(Self {
            names: names.into(),
            values,
        })
    }

    pub fn names(&self) -> &ColumnNames {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Typed accessor by column name; fails with `UnknownColumn`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.index_of(name)
            .map(|i| &self.values[i])
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Return a new row with one extra trailing column.
    pub fn with_column(&self, name: impl Into<String>, value: Value) -> Result<Row> {
        let name = name.into();
        if self.index_of(&name).is_some() {
            return Err(Error::ColumnExists(name));
        }
        let names: ColumnNames = self
            .names
            .iter()
            .cloned()
            .chain(std::iter::once(name))
            .collect();
        let mut values = self.values.clone();
        values.push(value);
        Ok(Row { names, values })
    }

    /// Rebind the values to another (equal-length) set of column names.
    pub fn rebind(self, names: ColumnNames) -> Result<Row> {
        Row::new(names, self.values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_schema_checked() {
        let row = Row::from_pairs([("NOC", Value::from("USA")), ("Year", Value::Int(2012))]).unwrap();
        assert_eq!(row.get("Year").unwrap(), &Value::Int(2012));
        assert!(matches!(row.get("Medal"), Err(Error::UnknownColumn(c)) if c == "Medal"));
    }

    #[test]
    fn with_column_returns_new_row() {
        let row = Row::from_pairs([("NOC", "USA")]).unwrap();
        let wider = row.with_column("region", Value::from("United States")).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(wider.len(), 2);
        assert!(matches!(
            wider.with_column("NOC", Value::Null),
            Err(Error::ColumnExists(_))
        ));
    }

    #[test]
    fn serializes_in_column_order() {
        let row = Row::from_pairs([("b", Value::Int(1)), ("a", Value::Null)]).unwrap();
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"b":1,"a":null}"#);
    }
}
