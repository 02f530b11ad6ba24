use serde::Serialize;
use std::collections::HashSet;

use crate::error::LoadError;
use crate::parser::SqlValue;

use super::rows::RowSet;

/// What key sanitizing removed from one table's candidate rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeStats {
    #[serde(rename = "candidate_rows")]
    pub candidates: usize,
    #[serde(rename = "null_key_rows")]
    pub null_keys: usize,
    #[serde(rename = "duplicate_rows")]
    pub duplicates: usize,
}

impl SanitizeStats {
    pub fn kept(&self) -> usize {
        self.candidates - self.null_keys - self.duplicates
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Integer(i64),
    Real(u64),
    Text(String),
}

impl KeyPart {
    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(KeyPart::Integer(*i)),
            SqlValue::Real(f) => Some(KeyPart::Real(f.to_bits())),
            SqlValue::Text(s) => Some(KeyPart::Text(s.clone())),
        }
    }
}

/// Drop rows with a null key column, then drop later duplicates of a key.
///
/// The first row carrying a key wins, so the caller's row order decides
/// which payload survives.
pub fn sanitize(rows: RowSet, keys: &[&str]) -> Result<(RowSet, SanitizeStats), LoadError> {
    let key_idx = keys
        .iter()
        .map(|k| rows.column_index(k))
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = SanitizeStats {
        candidates: rows.len(),
        ..Default::default()
    };
    let mut seen: HashSet<Vec<KeyPart>> = HashSet::with_capacity(rows.len());
    let mut rows = rows;

    rows.retain(|row| {
        let key: Option<Vec<KeyPart>> = key_idx
            .iter()
            .map(|&i| KeyPart::from_value(&row[i]))
            .collect();

        match key {
            None => {
                stats.null_keys += 1;
                false
            }
            Some(key) => {
                if seen.insert(key) {
                    true
                } else {
                    stats.duplicates += 1;
                    false
                }
            }
        }
    });

    Ok((rows, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Option<i64>, payload: &str) -> Vec<SqlValue> {
        vec![
            id.map(SqlValue::Integer).unwrap_or(SqlValue::Null),
            SqlValue::Text(payload.to_string()),
        ]
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut rows = RowSet::new(["occId", "payload"]);
        rows.push(row(Some(100), "first"));
        rows.push(row(Some(100), "second"));
        rows.push(row(Some(101), "other"));

        let (rows, stats) = sanitize(rows, &["occId"]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.value(0, "payload"), Some(&SqlValue::Text("first".into())));
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.kept(), 2);
    }

    #[test]
    fn test_interleaved_repeats_keep_first_of_each_key() {
        let mut rows = RowSet::new(["occId", "payload"]);
        for (id, payload) in [(1, "a"), (2, "b"), (1, "c"), (3, "d"), (2, "e"), (1, "f")] {
            rows.push(row(Some(id), payload));
        }

        let (rows, stats) = sanitize(rows, &["occId"]).unwrap();
        let payloads: Vec<_> = (0..rows.len())
            .map(|i| rows.value(i, "payload").and_then(|v| v.as_str()).unwrap())
            .collect();
        assert_eq!(payloads, vec!["a", "b", "d"]);
        assert_eq!(stats.duplicates, 3);
        assert_eq!(stats.kept(), 3);
    }

    #[test]
    fn test_null_keys_dropped() {
        let mut rows = RowSet::new(["occId", "payload"]);
        rows.push(row(None, "a"));
        rows.push(row(Some(1), "b"));
        rows.push(row(None, "c"));

        let (rows, stats) = sanitize(rows, &["occId"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(stats.null_keys, 2);
        assert_eq!(stats.candidates, 3);
    }

    #[test]
    fn test_composite_key() {
        let mut rows = RowSet::new(["occId", "crimeId"]);
        for (a, b) in [(1, 510), (1, 998), (1, 510), (2, 510)] {
            rows.push(vec![SqlValue::Integer(a), SqlValue::Integer(b)]);
        }
        rows.push(vec![SqlValue::Integer(3), SqlValue::Null]);

        let (rows, stats) = sanitize(rows, &["occId", "crimeId"]).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.null_keys, 1);
    }

    #[test]
    fn test_unknown_key_column() {
        let rows = RowSet::new(["occId"]);
        assert!(sanitize(rows, &["crimeId"]).is_err());
    }
}
