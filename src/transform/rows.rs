use crate::error::LoadError;
use crate::parser::SqlValue;

/// Typed rows under canonical column names, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    /// Source fields that did not fit their column type and were nulled
    rejected: usize,
}

impl RowSet {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            rejected: 0,
        }
    }

    pub fn push(&mut self, row: Vec<SqlValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub(crate) fn add_rejected(&mut self, count: usize) {
        self.rejected += count;
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<SqlValue>] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn column_index(&self, name: &str) -> Result<usize, LoadError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    }

    /// Cell lookup by column name
    pub fn value(&self, row: usize, column: &str) -> Option<&SqlValue> {
        let idx = self.column_index(column).ok()?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Append a column; rows past the end of `values` get null
    pub fn add_column(&mut self, name: &str, values: impl IntoIterator<Item = SqlValue>) {
        let mut values = values.into_iter();
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(values.next().unwrap_or(SqlValue::Null));
        }
    }

    /// Append a column computed from each existing row
    pub fn derive_column(&mut self, name: &str, mut f: impl FnMut(&[SqlValue]) -> SqlValue) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            let value = f(row);
            row.push(value);
        }
    }

    pub fn drop_columns(&mut self, names: &[&str]) -> Result<(), LoadError> {
        let mut indexes = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>, _>>()?;
        indexes.sort_unstable_by(|a, b| b.cmp(a));
        indexes.dedup();

        for idx in indexes {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        Ok(())
    }

    /// Rewrite every value of one column in place
    pub fn map_column(
        &mut self,
        name: &str,
        mut f: impl FnMut(&mut SqlValue),
    ) -> Result<(), LoadError> {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            f(&mut row[idx]);
        }
        Ok(())
    }

    /// Union: append `other`'s rows after ours, matching columns by name
    pub fn append(&mut self, other: RowSet) -> Result<(), LoadError> {
        let mapping = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;

        self.rejected += other.rejected;
        for mut row in other.rows {
            let reordered = mapping
                .iter()
                .map(|&i| std::mem::replace(&mut row[i], SqlValue::Null))
                .collect();
            self.rows.push(reordered);
        }
        Ok(())
    }

    /// Keep only the rows for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&[SqlValue]) -> bool) {
        self.rows.retain(|r| keep(r));
    }
}
