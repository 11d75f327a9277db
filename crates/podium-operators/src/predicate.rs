//! Row predicates: a conjunction of per-column conditions.
//!
//! A [`Predicate`] names columns; binding it to a column layout resolves names
//! to positions once so per-row evaluation is a few index lookups. Null cells
//! fail every condition.

use std::cmp::Ordering;

use podium_core::prelude::{ColumnNames, Error, KeyPart, Row, Value};

use crate::traits::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality after key normalization (`"2012"` equals `2012`).
    Eq { column: String, value: Value },
    /// Inclusive bounds; either side may be open.
    Range {
        column: String,
        min: Option<Value>,
        max: Option<Value>,
    },
    /// Case-insensitive substring match on the cell's text.
    Contains { column: String, needle: String },
    /// Case-insensitive prefix match on the cell's text.
    Prefix { column: String, prefix: String },
    NotNull { column: String },
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn range(column: impl Into<String>, min: Option<Value>, max: Option<Value>) -> Self {
        Condition::Range {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Condition::Contains {
            column: column.into(),
            needle: needle.into(),
        }
    }

    pub fn prefix(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Condition::Prefix {
            column: column.into(),
            prefix: prefix.into(),
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Condition::NotNull {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Condition::Eq { column, .. }
            | Condition::Range { column, .. }
            | Condition::Contains { column, .. }
            | Condition::Prefix { column, .. }
            | Condition::NotNull { column } => column,
        }
    }

    fn check(&self) -> Check {
        match self {
            Condition::Eq { value, .. } => Check::Eq(value.key()),
            Condition::Range { min, max, .. } => Check::Range {
                min: min.clone(),
                max: max.clone(),
            },
            Condition::Contains { needle, .. } => Check::Contains(needle.to_lowercase()),
            Condition::Prefix { prefix, .. } => Check::Prefix(prefix.to_lowercase()),
            Condition::NotNull { .. } => Check::NotNull,
        }
    }
}

/// Conjunction of conditions. The empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Resolve column names against `columns`. Unknown names fail here, before
    /// any row is read.
    pub fn bind(&self, columns: &ColumnNames) -> Result<BoundPredicate> {
        let mut checks = Vec::with_capacity(self.conditions.len());
        for cond in &self.conditions {
            let idx = columns
                .iter()
                .position(|c| c == cond.column())
                .ok_or_else(|| Error::UnknownColumn(cond.column().to_string()))?;
            checks.push((idx, cond.check()));
        }
        Ok(BoundPredicate { checks })
    }

    /// Evaluate against a single row by name.
    pub fn eval(&self, row: &Row) -> Result<bool> {
        for cond in &self.conditions {
            let v = row.get(cond.column())?;
            if !cond.check().test(v) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[derive(Debug, Clone)]
enum Check {
    Eq(KeyPart),
    Range { min: Option<Value>, max: Option<Value> },
    Contains(String),
    Prefix(String),
    NotNull,
}

impl Check {
    fn test(&self, v: &Value) -> bool {
        if v.is_null() {
            return false;
        }
        match self {
            Check::Eq(key) => !key.is_null() && v.key() == *key,
            Check::Range { min, max } => {
                let lower = min
                    .as_ref()
                    .map_or(true, |m| matches!(compare_like(v, m), Some(o) if o != Ordering::Less));
                let upper = max
                    .as_ref()
                    .map_or(true, |m| matches!(compare_like(v, m), Some(o) if o != Ordering::Greater));
                lower && upper
            }
            Check::Contains(needle) => v.to_string().to_lowercase().contains(needle.as_str()),
            Check::Prefix(prefix) => v.to_string().to_lowercase().starts_with(prefix.as_str()),
            Check::NotNull => true,
        }
    }
}

/// Order two values of the same kind (numeric vs numeric, text vs text).
fn compare_like(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.as_str().cmp(y.as_str())),
        _ => {
            let x = a.as_f64()?;
            let y = b.as_f64()?;
            x.partial_cmp(&y)
        }
    }
}

/// A predicate resolved against one column layout.
#[derive(Debug, Clone)]
pub struct BoundPredicate {
    checks: Vec<(usize, Check)>,
}

impl BoundPredicate {
    /// Rows must share the layout the predicate was bound to.
    pub fn matches(&self, row: &Row) -> bool {
        self.checks
            .iter()
            .all(|(idx, check)| row.value(*idx).is_some_and(|v| check.test(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(name: &str, year: Value, medal: Value) -> Row {
        Row::from_pairs([
            ("Name", Value::from(name)),
            ("Year", year),
            ("Medal", medal),
        ])
        .unwrap()
    }

    #[test]
    fn conjunction_of_conditions() {
        let p = Predicate::all()
            .and(Condition::contains("Name", "phelps"))
            .and(Condition::range("Year", Some(Value::Int(2004)), Some(Value::Int(2008))))
            .and(Condition::not_null("Medal"));
        let hit = athlete("Michael Fred Phelps, II", Value::Int(2008), Value::from("Gold"));
        let early = athlete("Michael Fred Phelps, II", Value::Int(2000), Value::from("Gold"));
        let no_medal = athlete("Michael Fred Phelps, II", Value::Int(2004), Value::Null);
        let b = p.bind(hit.names()).unwrap();
        assert!(b.matches(&hit));
        assert!(!b.matches(&early));
        assert!(!b.matches(&no_medal));
    }

    #[test]
    fn equality_normalizes_numeric_strings() {
        let p = Predicate::all().and(Condition::eq("Year", "2012"));
        assert!(p.eval(&athlete("A", Value::Int(2012), Value::Null)).unwrap());
        assert!(p.eval(&athlete("A", Value::Float(2012.0), Value::Null)).unwrap());
        assert!(!p.eval(&athlete("A", Value::Null, Value::Null)).unwrap());
    }

    #[test]
    fn prefix_is_case_insensitive() {
        let p = Predicate::all().and(Condition::prefix("Name", "USAIN"));
        assert!(p.eval(&athlete("Usain St. Leo Bolt", Value::Int(2016), Value::Null)).unwrap());
        assert!(!p.eval(&athlete("Yohan Blake", Value::Int(2016), Value::Null)).unwrap());
    }

    #[test]
    fn range_does_not_compare_text_with_numbers() {
        let p = Predicate::all().and(Condition::range("Year", Some(Value::Int(1990)), None));
        assert!(!p.eval(&athlete("A", Value::from("unknown"), Value::Null)).unwrap());
    }

    #[test]
    fn binding_unknown_column_fails() {
        let cols: ColumnNames = vec!["Name".to_string()].into();
        let err = Predicate::all().and(Condition::not_null("Sport")).bind(&cols).unwrap_err();
        assert!(matches!(err, crate::OpError::Core(Error::UnknownColumn(c)) if c == "Sport"));
    }
}
