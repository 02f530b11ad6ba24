use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::LoadError;

/// Report progress every this many rows while reading
const PROGRESS_INTERVAL: usize = 50_000;

/// The wide source table, read once and kept as raw CSV records
pub struct SourceFrame {
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl SourceFrame {
    /// Read a CSV file from disk
    pub fn read_path(
        path: &Path,
        mut on_progress: impl FnMut(usize),
    ) -> Result<Self, LoadError> {
        let reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        Self::collect(reader, &mut on_progress)
    }

    /// Read CSV data from any reader (used by tests and in-memory sources)
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, LoadError> {
        let reader = ReaderBuilder::new().flexible(true).from_reader(rdr);
        Self::collect(reader, &mut |_| {})
    }

    fn collect<R: Read>(
        mut reader: csv::Reader<R>,
        on_progress: &mut dyn FnMut(usize),
    ) -> Result<Self, LoadError> {
        let index = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        let mut rows = Vec::new();
        for record in reader.into_records() {
            rows.push(record?);
            if rows.len() % PROGRESS_INTERVAL == 0 {
                on_progress(rows.len());
            }
        }
        on_progress(rows.len());

        Ok(Self { index, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a source column; a missing column is schema drift
    pub fn column_index(&self, name: &str) -> Result<usize, LoadError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    }

    /// Raw field text, `None` for short rows
    pub fn field(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}
