use crate::error::LoadError;
use crate::parser::{coerce, SourceFrame};
use crate::schema::ColumnType;

use super::rows::RowSet;

/// One source column kept under a canonical name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    pub source: &'static str,
    pub target: &'static str,
    pub col_type: ColumnType,
}

impl Rename {
    pub const fn integer(source: &'static str, target: &'static str) -> Self {
        Self {
            source,
            target,
            col_type: ColumnType::Integer,
        }
    }

    pub const fn real(source: &'static str, target: &'static str) -> Self {
        Self {
            source,
            target,
            col_type: ColumnType::Real,
        }
    }

    pub const fn text(source: &'static str, target: &'static str) -> Self {
        Self {
            source,
            target,
            col_type: ColumnType::Text,
        }
    }
}

/// Extract the renamed columns from the source, in source row order.
///
/// Every source name must exist; a missing one means the upstream export
/// changed shape and the load must stop.
pub fn project(frame: &SourceFrame, renames: &[Rename]) -> Result<RowSet, LoadError> {
    let indexes = renames
        .iter()
        .map(|r| frame.column_index(r.source))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = RowSet::new(renames.iter().map(|r| r.target));
    let mut rejected = 0;

    for row in 0..frame.len() {
        let values = renames
            .iter()
            .zip(&indexes)
            .map(|(rename, &col)| {
                let cell = coerce(frame.field(row, col), rename.col_type);
                if cell.rejected {
                    rejected += 1;
                }
                cell.value
            })
            .collect();
        rows.push(values);
    }

    if rejected > 0 {
        tracing::warn!(
            columns = ?renames.iter().map(|r| r.source).collect::<Vec<_>>(),
            rejected,
            "nulled source values that did not match their column type"
        );
    }
    rows.add_rejected(rejected);

    Ok(rows)
}
