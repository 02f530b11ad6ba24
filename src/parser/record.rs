use crate::schema::ColumnType;

/// A typed cell ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Real(f) => Some(*f),
            SqlValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Result of converting one raw CSV field
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: SqlValue,
    /// Non-empty text that did not fit the column type
    pub rejected: bool,
}

/// Convert a raw CSV field to the column type.
///
/// Empty fields are null. Text that does not parse as the requested number
/// becomes null and is flagged, never an error.
pub fn coerce(raw: Option<&str>, col_type: ColumnType) -> Coerced {
    let raw = match raw.map(str::trim) {
        None | Some("") => {
            return Coerced {
                value: SqlValue::Null,
                rejected: false,
            }
        }
        Some(s) => s,
    };

    let value = match col_type {
        ColumnType::Integer => parse_integer(raw).map(SqlValue::Integer),
        ColumnType::Real => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(SqlValue::Real),
        ColumnType::Text => Some(SqlValue::Text(raw.to_string())),
    };

    match value {
        Some(value) => Coerced {
            value,
            rejected: false,
        },
        None => Coerced {
            value: SqlValue::Null,
            rejected: true,
        },
    }
}

/// Parse `"510"` or an integral float such as `"510.0"`
fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i);
    }

    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
