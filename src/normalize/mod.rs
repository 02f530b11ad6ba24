//! Builders that derive each normalized table from the wide source
//!
//! Every builder is the same composition: project + rename, optional
//! remap or derived columns, then key sanitizing against the table's
//! declared primary key. The driver materializes the result.

pub mod associations;
pub mod columns;
pub mod entities;
pub mod incidents;

use crate::error::LoadError;
use crate::parser::{SourceFrame, SqlValue};
use crate::schema::TableSchema;
use crate::transform::{sanitize, RowSet, SanitizeStats};

/// Sequential identifiers scoped to one load run.
///
/// Values start at 0 for every run and carry no meaning across reloads.
#[derive(Debug, Default)]
pub struct RunSequence {
    next: i64,
}

impl RunSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Inputs shared by all builders during one run
pub struct LoadContext<'a> {
    pub frame: &'a SourceFrame,
    pub normalize_timestamps: bool,
    /// One synthetic victim id per source row, in row order
    victim_ids: Vec<i64>,
}

impl<'a> LoadContext<'a> {
    pub fn new(frame: &'a SourceFrame, normalize_timestamps: bool) -> Self {
        let mut sequence = RunSequence::new();
        let victim_ids = (0..frame.len()).map(|_| sequence.next_id()).collect();

        Self {
            frame,
            normalize_timestamps,
            victim_ids,
        }
    }

    /// Victim id column aligned with a projection of the whole frame
    pub fn victim_ids(&self) -> impl Iterator<Item = SqlValue> + '_ {
        self.victim_ids.iter().map(|&id| SqlValue::Integer(id))
    }
}

/// Sanitized rows for one table, ready to materialize
#[derive(Debug)]
pub struct TableRows {
    pub schema: &'static TableSchema,
    pub rows: RowSet,
    pub stats: SanitizeStats,
}

/// Sanitize candidate rows against the schema's primary key
pub(crate) fn finish(schema: &'static TableSchema, rows: RowSet) -> Result<TableRows, LoadError> {
    let (rows, stats) = sanitize(rows, schema.primary_key)?;

    tracing::debug!(
        table = schema.name,
        candidates = stats.candidates,
        null_keys = stats.null_keys,
        duplicates = stats.duplicates,
        "sanitized keys"
    );

    Ok(TableRows {
        schema,
        rows,
        stats,
    })
}

/// Fail fast on schema drift before any table is touched
pub fn check_source_columns(frame: &SourceFrame) -> Result<(), LoadError> {
    for name in columns::required_columns() {
        frame.column_index(name)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::parser::SourceFrame;

    pub const HEADER: &str = "DR_NO,Date Rptd,DATE OCC,TIME OCC,AREA,AREA NAME,Premis Cd,Premis Desc,\
LOCATION,LAT,LON,Vict Age,Vict Sex,Vict Descent,Weapon Used Cd,Weapon Desc,Crm Cd 1,Crm Cd 2,Crm Cd Desc";

    /// The documented single-row scenario
    pub const SCENARIO_ROW: &str = "100,01/02/2023 12:00:00 AM,01/01/2023 12:00:00 AM,1530,1,Central,101,Street,\
1ST ST,34.05,-118.24,30,M,H,,,510,998,VEHICLE - STOLEN";

    pub fn frame(rows: &[&str]) -> SourceFrame {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        SourceFrame::from_reader(csv.as_bytes()).unwrap()
    }
}
