use crate::error::LoadError;
use crate::parser::SqlValue;

use super::rows::RowSet;

/// Label for codes with no defined mapping
pub const FALLBACK_LABEL: &str = "Other";

/// A fixed code -> label dictionary with a catch-all label
#[derive(Debug, Clone)]
pub struct Remap {
    entries: &'static [(&'static str, &'static str)],
    fallback: &'static str,
}

/// LAPD victim descent codes
pub static DESCENT: Remap = Remap::new(
    &[
        ("A", "Outro Asiático"),
        ("B", "Negro"),
        ("C", "Chinês"),
        ("D", "Cambojano"),
        ("F", "Filipino"),
        ("G", "Guamaniano"),
        ("H", "Hispânico"),
        ("I", "Indígena Americano"),
        ("J", "Japonês"),
        ("K", "Coreano"),
        ("L", "Laosiano"),
        ("O", FALLBACK_LABEL),
        ("P", "Ilhéu do Pacífico"),
        ("S", "Samoano"),
        ("U", "Havaiano"),
        ("V", "Vietnamita"),
        ("W", "Branco"),
        ("X", "Desconhecido"),
        ("Z", "Indiano Asiático"),
    ],
    FALLBACK_LABEL,
);

impl Remap {
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        fallback: &'static str,
    ) -> Self {
        Self { entries, fallback }
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    /// Canonical label for a value.
    ///
    /// Labels map to themselves, so remapping twice is a no-op. Anything
    /// else, including null, gets the fallback.
    pub fn label(&self, value: &SqlValue) -> &'static str {
        let Some(raw) = value.as_str().map(str::trim) else {
            return self.fallback;
        };

        self.entries
            .iter()
            .find(|(code, _)| *code == raw)
            .or_else(|| self.entries.iter().find(|(_, label)| *label == raw))
            .map(|(_, label)| *label)
            .unwrap_or(self.fallback)
    }

    pub fn is_label(&self, raw: &str) -> bool {
        raw == self.fallback || self.entries.iter().any(|(_, label)| *label == raw)
    }

    /// Replace a column's values with their labels.
    ///
    /// Returns how many values fell through to the fallback.
    pub fn apply(&self, rows: &mut RowSet, column: &str) -> Result<usize, LoadError> {
        let mut fallbacks = 0;
        rows.map_column(column, |value| {
            let known = value
                .as_str()
                .map(str::trim)
                .is_some_and(|s| self.is_code(s) || self.is_label(s));
            if !known {
                fallbacks += 1;
            }
            *value = SqlValue::Text(self.label(value).to_string());
        })?;
        Ok(fallbacks)
    }

    fn is_code(&self, raw: &str) -> bool {
        self.entries.iter().any(|(code, _)| *code == raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_known_code() {
        assert_eq!(DESCENT.label(&text("H")), "Hispânico");
        assert_eq!(DESCENT.label(&text(" W ")), "Branco");
    }

    #[test]
    fn test_unknown_and_null_fall_back() {
        assert_eq!(DESCENT.label(&text("Q")), FALLBACK_LABEL);
        assert_eq!(DESCENT.label(&text("-")), FALLBACK_LABEL);
        assert_eq!(DESCENT.label(&SqlValue::Null), FALLBACK_LABEL);
        assert_eq!(DESCENT.label(&SqlValue::Integer(3)), FALLBACK_LABEL);
    }

    #[test]
    fn test_labels_are_fixed_points() {
        for (code, label) in DESCENT.entries {
            let once = DESCENT.label(&text(code));
            assert_eq!(once, *label);
            assert_eq!(DESCENT.label(&text(once)), once);
        }
        assert_eq!(DESCENT.label(&text(FALLBACK_LABEL)), FALLBACK_LABEL);
    }

    #[test]
    fn test_apply_is_idempotent_and_total() {
        let mut rows = RowSet::new(["descendencia"]);
        for v in [text("H"), text("Q"), SqlValue::Null, text("O")] {
            rows.push(vec![v]);
        }

        let fallbacks = DESCENT.apply(&mut rows, "descendencia").unwrap();
        assert_eq!(fallbacks, 2);
        let first = rows.clone();

        let again = DESCENT.apply(&mut rows, "descendencia").unwrap();
        assert_eq!(again, 0);
        assert_eq!(rows, first);
        assert!(rows.rows().iter().all(|r| r[0].as_str().is_some()));
        assert_eq!(rows.value(1, "descendencia"), Some(&text("Other")));
    }
}
