use std::fmt;

use crate::error::{AppError, QueryStage, Result};

/// Rendering of an absent (SQL NULL) value.
pub const NULL_MARKER: &str = "NULL";

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Dates, times and timestamps, kept in the backend's textual form.
    Temporal(String),
    Binary(Vec<u8>),
}

/// Target variant for a column, chosen from the driver-reported type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    UInt,
    Float,
    Bool,
    Text,
    Temporal,
    Binary,
}

impl Value {
    /// Decode a text-protocol cell into the variant for `kind`.
    ///
    /// Binary cells are not handled here; drivers decode them from raw bytes.
    pub fn parse(kind: ValueKind, text: String) -> std::result::Result<Self, String> {
        let value = match kind {
            ValueKind::Int => Value::Int(
                text.trim()
                    .parse()
                    .map_err(|e| format!("invalid integer {:?}: {}", text, e))?,
            ),
            ValueKind::UInt => Value::UInt(
                text.trim()
                    .parse()
                    .map_err(|e| format!("invalid unsigned integer {:?}: {}", text, e))?,
            ),
            ValueKind::Float => Value::Float(
                text.trim()
                    .parse()
                    .map_err(|e| format!("invalid float {:?}: {}", text, e))?,
            ),
            ValueKind::Bool => match text.trim() {
                "t" | "true" | "TRUE" | "1" => Value::Bool(true),
                "f" | "false" | "FALSE" | "0" => Value::Bool(false),
                other => return Err(format!("invalid boolean {:?}", other)),
            },
            ValueKind::Temporal => Value::Temporal(text),
            ValueKind::Text | ValueKind::Binary => Value::Text(text),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(NULL_MARKER),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) | Value::Temporal(s) => f.write_str(s),
            Value::Binary(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Fully materialized output of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the column list.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(AppError::query(
                QueryStage::Scan,
                format!(
                    "row has {} values but the result has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_enforces_width() {
        let mut rs = ResultSet::new(vec!["id".to_string(), "name".to_string()]);
        rs.push_row(vec![Value::Int(1), Value::from("a")]).unwrap();

        let err = rs.push_row(vec![Value::Int(2)]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Query {
                stage: QueryStage::Scan,
                ..
            }
        ));
        assert_eq!(rs.rows().len(), 1);
    }

    #[test]
    fn test_parse_text_protocol_values() {
        assert_eq!(Value::parse(ValueKind::Int, "-42".into()), Ok(Value::Int(-42)));
        assert_eq!(
            Value::parse(ValueKind::UInt, "18446744073709551615".into()),
            Ok(Value::UInt(u64::MAX))
        );
        assert_eq!(Value::parse(ValueKind::Float, "2.5".into()), Ok(Value::Float(2.5)));
        assert_eq!(Value::parse(ValueKind::Bool, "t".into()), Ok(Value::Bool(true)));
        assert_eq!(Value::parse(ValueKind::Bool, "0".into()), Ok(Value::Bool(false)));
        assert_eq!(
            Value::parse(ValueKind::Temporal, "2024-05-01 10:00:00".into()),
            Ok(Value::Temporal("2024-05-01 10:00:00".into()))
        );
        assert!(Value::parse(ValueKind::Int, "twelve".into()).is_err());
        assert!(Value::parse(ValueKind::Bool, "maybe".into()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Binary(vec![0xde, 0xad, 0x01]).to_string(), "0xdead01");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
