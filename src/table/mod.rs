// src/table/mod.rs
//
// In-memory tabular model shared by the report pipeline and the sinks.
// A NormalizedTable is rectangular by construction: every row carries
// exactly one Value per column, and concatenation of tables with
// differing columns outer-unions the schemas with null fill.

pub mod dates;

use std::fmt;

use chrono::NaiveDateTime;

/// A single cell after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Num(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view; integers widen to f64.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Stable text rendering used by the stringification pass and the CSV
    /// sink. Nulls print empty; floats rely on Rust's shortest-round-trip
    /// formatting (no trailing `.0`); datetimes print `YYYY-MM-DD HH:MM:SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Num(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Rectangular table with canonical column names.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl NormalizedTable {
    pub fn new(columns: Vec<String>) -> Self {
        NormalizedTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding or truncating it to the current column count.
    /// Ragged spreadsheet rows are common; width mismatches are resolved
    /// here rather than left to panic at indexing time.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Concatenate `other` onto `self` as an outer union by column name.
    ///
    /// Columns keep first-seen order: new columns from `other` are appended
    /// on the right and back-filled with nulls in the existing rows; rows
    /// from `other` place their values by name and null-fill the rest.
    pub fn append(&mut self, other: NormalizedTable) {
        let mut mapping = Vec::with_capacity(other.columns.len());
        for col in &other.columns {
            let idx = match self.column_index(col) {
                Some(idx) => idx,
                None => {
                    self.columns.push(col.clone());
                    for row in &mut self.rows {
                        row.push(Value::Null);
                    }
                    self.columns.len() - 1
                }
            };
            mapping.push(idx);
        }
        for src in other.rows {
            let mut dst = vec![Value::Null; self.columns.len()];
            for (i, value) in src.into_iter().enumerate() {
                dst[mapping[i]] = value;
            }
            self.rows.push(dst);
        }
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Rewrite one column in place.
    pub fn map_column<F>(&mut self, idx: usize, f: F)
    where
        F: Fn(Value) -> Value,
    {
        for row in &mut self.rows {
            let old = std::mem::replace(&mut row[idx], Value::Null);
            row[idx] = f(old);
        }
    }
}
