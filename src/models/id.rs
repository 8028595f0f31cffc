use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Record identifier as it appears in the catalog: a JSON number or a string.
///
/// The wire form is kept as supplied. Comparisons go through [`RecordId::key`],
/// which renders both forms to the same canonical text, so `3` and `"3"`
/// name the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(Number),
    Text(String),
}

impl RecordId {
    /// Canonical comparison key. Integral floats collapse to their integer form.
    pub fn key(&self) -> String {
        match self {
            RecordId::Number(n) => number_key(n),
            RecordId::Text(s) => s.clone(),
        }
    }

    /// Loose equality across the number/string forms.
    pub fn matches(&self, other: &RecordId) -> bool {
        self.key() == other.key()
    }

    /// Numeric value of the id when its canonical key is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        self.key().parse().ok()
    }
}

fn number_key(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 2^53: beyond this f64 no longer represents every integer
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            (f as i64).to_string()
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&RecordId> for serde_json::Value {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Number(n) => serde_json::Value::Number(n.clone()),
            RecordId::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<u64> for RecordId {
    fn from(v: u64) -> Self {
        RecordId::Number(v.into())
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        RecordId::Number(v.into())
    }
}

impl From<i32> for RecordId {
    fn from(v: i32) -> Self {
        RecordId::Number(v.into())
    }
}

impl From<&str> for RecordId {
    fn from(v: &str) -> Self {
        RecordId::Text(v.to_string())
    }
}

impl From<String> for RecordId {
    fn from(v: String) -> Self {
        RecordId::Text(v)
    }
}
