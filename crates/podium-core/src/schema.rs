//! Logical schema types. Pure data.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::row::{ColumnNames, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int64,
    Float64,
    Utf8,
}

impl DataType {
    /// Smallest type able to hold values of both `self` and `other`.
    pub fn widen(self, other: DataType) -> DataType {
        use DataType::*;
        match (self, other) {
            (Int64, Int64) => Int64,
            (Int64, Float64) | (Float64, Int64) | (Float64, Float64) => Float64,
            _ => Utf8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    /// Infer a field from the values observed in one column.
    ///
    /// All-null (or empty) columns default to nullable `Utf8`.
    pub fn infer<'a>(name: impl Into<String>, values: impl IntoIterator<Item = &'a crate::Value>) -> Self {
        let mut data_type: Option<DataType> = None;
        let mut nullable = false;
        let mut seen = false;
        for v in values {
            seen = true;
            match v.data_type() {
                None => nullable = true,
                Some(dt) => data_type = Some(data_type.map_or(dt, |cur| cur.widen(dt))),
            }
        }
        Field::new(
            name,
            data_type.unwrap_or(DataType::Utf8),
            nullable || !seen || data_type.is_none(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Infer a schema from materialized rows sharing `columns`.
    pub fn infer(columns: &ColumnNames, rows: &[Row]) -> Self {
        let fields = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| Field::infer(name.as_str(), rows.iter().filter_map(|r| r.value(idx))))
            .collect();
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Schema-checked lookup; fails with `UnknownColumn`.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn column_names(&self) -> ColumnNames {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn widening_follows_int_float_utf8_lattice() {
        assert_eq!(DataType::Int64.widen(DataType::Float64), DataType::Float64);
        assert_eq!(DataType::Float64.widen(DataType::Utf8), DataType::Utf8);
        assert_eq!(DataType::Int64.widen(DataType::Int64), DataType::Int64);
    }

    #[test]
    fn field_inference_tracks_nulls() {
        let vals = [Value::Int(1), Value::Null, Value::Float(2.5)];
        let f = Field::infer("Age", vals.iter());
        assert_eq!(f.data_type, DataType::Float64);
        assert!(f.nullable);

        let empty: [Value; 0] = [];
        let f = Field::infer("notes", empty.iter());
        assert_eq!(f.data_type, DataType::Utf8);
        assert!(f.nullable);
    }
}
