//! Equi-joins between frames.

pub mod hash;

use serde::{Deserialize, Serialize};

pub use hash::hash_join;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Drop rows without a match on both sides.
    #[default]
    Inner,
    /// Keep every left row; unmatched right columns are null.
    Left,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    pub kind: JoinKind,
    /// Rename right-hand columns whose names collide with left-hand ones by
    /// appending this suffix. Without it colliding right columns are dropped.
    pub right_suffix: Option<String>,
}

impl JoinOptions {
    pub fn inner() -> Self {
        Self::default()
    }

    pub fn left() -> Self {
        Self {
            kind: JoinKind::Left,
            right_suffix: None,
        }
    }

    pub fn with_right_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.right_suffix = Some(suffix.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_read_from_json() {
        let opts: JoinOptions = serde_json::from_str(r#"{"kind":"left","right_suffix":"_r"}"#).unwrap();
        assert_eq!(opts, JoinOptions::left().with_right_suffix("_r"));

        let defaults: JoinOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, JoinOptions::inner());
    }
}
