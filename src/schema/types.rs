use std::collections::{BTreeMap, HashSet};

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    /// Reference the same-named column in the parent table, so the
    /// relation works with `NATURAL JOIN`.
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: column,
        }
    }
}

/// A single declarative column constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The table's identity column (`INTEGER PRIMARY KEY`)
    PrimaryKey,
    /// `REFERENCES table(column)`
    References {
        table: &'static str,
        column: &'static str,
    },
}

/// Per-column constraints for one table.
///
/// Pure metadata: the writer renders it into DDL, nothing here validates rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintMap {
    pub columns: BTreeMap<&'static str, Vec<Constraint>>,
    /// Multi-column key, rendered as a table-level `PRIMARY KEY (..)`
    pub composite_key: Option<Vec<&'static str>>,
}

impl ConstraintMap {
    pub fn for_column(&self, column: &str) -> &[Constraint] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.for_column(column).contains(&Constraint::PrimaryKey)
    }
}

/// Build the constraint map from a primary key and foreign key declarations.
///
/// A single-column key becomes the identity column. A composite key is kept
/// as one table-level key because no single member is unique on its own.
pub fn declare_constraints(
    primary_key: &[&'static str],
    foreign_keys: &[ForeignKey],
) -> ConstraintMap {
    let mut map = ConstraintMap::default();

    match primary_key {
        [] => {}
        [single] => {
            map.columns.entry(*single).or_default().push(Constraint::PrimaryKey);
        }
        composite => map.composite_key = Some(composite.to_vec()),
    }

    for fk in foreign_keys {
        map.columns.entry(fk.column).or_default().push(Constraint::References {
            table: fk.references_table,
            column: fk.references_column,
        });
    }

    map
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    /// Always dropped and rebuilt; `append`/`fail` modes are rejected
    pub rebuild_only: bool,
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn constraints(&self) -> ConstraintMap {
        declare_constraints(self.primary_key, self.foreign_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_key_is_identity() {
        let map = declare_constraints(&["localId"], &[ForeignKey::new("areaId", "areas")]);

        assert!(map.is_primary_key("localId"));
        assert_eq!(map.composite_key, None);
        assert_eq!(
            map.for_column("areaId"),
            &[Constraint::References {
                table: "areas",
                column: "areaId"
            }]
        );
    }

    #[test]
    fn test_composite_key_is_table_level() {
        let map = declare_constraints(
            &["occId", "crimeId"],
            &[
                ForeignKey::new("occId", "ocorrencias"),
                ForeignKey::new("crimeId", "crimes"),
            ],
        );

        assert_eq!(map.composite_key, Some(vec!["occId", "crimeId"]));
        assert!(!map.is_primary_key("occId"));
        assert_eq!(map.for_column("occId").len(), 1);
        assert!(map.for_column("unrelated").is_empty());
    }
}
