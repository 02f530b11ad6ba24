//! Table schema definitions for the normalized crime database

use super::types::*;

// =============================================================================
// Entity Tables
// =============================================================================

pub static AREAS: TableSchema = TableSchema {
    name: "areas",
    columns: &[
        Column::required("areaId", ColumnType::Integer),
        Column::new("nome", ColumnType::Text),
    ],
    primary_key: &["areaId"],
    foreign_keys: &[],
    rebuild_only: false,
};

pub static LOCAIS: TableSchema = TableSchema {
    name: "locais",
    columns: &[
        Column::required("localId", ColumnType::Integer),
        Column::new("areaId", ColumnType::Integer),
        Column::new("morada", ColumnType::Text),
        Column::new("desc_local", ColumnType::Text),
        Column::new("coordenadas", ColumnType::Text),
    ],
    primary_key: &["localId"],
    foreign_keys: &[ForeignKey::new("areaId", "areas")],
    rebuild_only: false,
};

pub static ARMAS: TableSchema = TableSchema {
    name: "armas",
    columns: &[
        Column::required("armaId", ColumnType::Integer),
        Column::new("desc_arma", ColumnType::Text),
    ],
    primary_key: &["armaId"],
    foreign_keys: &[],
    rebuild_only: false,
};

/// Victim ids are issued per run, so appending to an older table is meaningless
pub static VITIMAS: TableSchema = TableSchema {
    name: "vitimas",
    columns: &[
        Column::required("vitimaId", ColumnType::Integer),
        Column::new("idade", ColumnType::Integer),
        Column::new("sexo", ColumnType::Text),
        Column::required("descendencia", ColumnType::Text),
    ],
    primary_key: &["vitimaId"],
    foreign_keys: &[],
    rebuild_only: true,
};

pub static CRIMES: TableSchema = TableSchema {
    name: "crimes",
    columns: &[
        Column::required("crimeId", ColumnType::Integer),
        Column::required("desc_crime", ColumnType::Text),
    ],
    primary_key: &["crimeId"],
    foreign_keys: &[],
    rebuild_only: false,
};

// =============================================================================
// Fact Table
// =============================================================================

pub static OCORRENCIAS: TableSchema = TableSchema {
    name: "ocorrencias",
    columns: &[
        Column::required("occId", ColumnType::Integer),
        Column::new("vitimaId", ColumnType::Integer),
        Column::new("localId", ColumnType::Integer),
        Column::new("armaId", ColumnType::Integer),
        Column::new("date_occ", ColumnType::Text),
        Column::new("date_rptd", ColumnType::Text),
    ],
    primary_key: &["occId"],
    foreign_keys: &[
        ForeignKey::new("vitimaId", "vitimas"),
        ForeignKey::new("localId", "locais"),
        ForeignKey::new("armaId", "armas"),
    ],
    rebuild_only: true,
};

// =============================================================================
// Association Tables
// =============================================================================

pub static OCC_CRIME: TableSchema = TableSchema {
    name: "occ_crime",
    columns: &[
        Column::required("occId", ColumnType::Integer),
        Column::required("crimeId", ColumnType::Integer),
    ],
    primary_key: &["occId", "crimeId"],
    foreign_keys: &[
        ForeignKey::new("occId", "ocorrencias"),
        ForeignKey::new("crimeId", "crimes"),
    ],
    rebuild_only: true,
};

pub static OCC_ARMA: TableSchema = TableSchema {
    name: "occ_arma",
    columns: &[
        Column::required("occId", ColumnType::Integer),
        Column::required("armaId", ColumnType::Integer),
    ],
    primary_key: &["occId", "armaId"],
    foreign_keys: &[
        ForeignKey::new("occId", "ocorrencias"),
        ForeignKey::new("armaId", "armas"),
    ],
    rebuild_only: true,
};

/// All table schemas in load order
pub static ALL_TABLES: &[&TableSchema] = &[
    // Entities
    &AREAS,
    &LOCAIS,
    &ARMAS,
    &VITIMAS,
    &CRIMES,
    // Fact
    &OCORRENCIAS,
    // Associations
    &OCC_CRIME,
    &OCC_ARMA,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_keys_point_at_parent_keys() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                let parent = get_table(fk.references_table)
                    .unwrap_or_else(|| panic!("{} references unknown table", table.name));
                assert_eq!(
                    parent.primary_key,
                    &[fk.references_column],
                    "{}.{} must reference the parent's key",
                    table.name,
                    fk.column
                );
                assert!(table.column(fk.column).is_some());
            }
        }
    }

    #[test]
    fn test_primary_keys_are_declared_columns() {
        for table in ALL_TABLES {
            for key in table.primary_key {
                let col = table.column(key).expect("key column exists");
                assert!(!col.nullable, "{}.{} must be required", table.name, key);
            }
        }
    }
}
