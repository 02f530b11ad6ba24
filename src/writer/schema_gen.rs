use crate::schema::{Constraint, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema, if_not_exists: bool) -> String {
    let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
    let mut sql = format!("CREATE TABLE {}{} (\n", guard, schema.name);
    let constraints = schema.constraints();
    let mut columns = Vec::new();

    for col in schema.columns {
        let mut def = format!("    {} {}", col.name, col.col_type.sql_type());

        for constraint in constraints.for_column(col.name) {
            match constraint {
                Constraint::PrimaryKey => def.push_str(" PRIMARY KEY"),
                Constraint::References { table, column } => {
                    def.push_str(&format!(" REFERENCES {}({})", table, column))
                }
            }
        }

        if !col.nullable {
            def.push_str(" NOT NULL");
        }
        columns.push(def);
    }

    if let Some(key) = &constraints.composite_key {
        columns.push(format!("    PRIMARY KEY ({})", key.join(", ")));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema, if_not_exists: bool) -> Vec<String> {
    let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX {}idx_{}_{} ON {}({})",
                guard, schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}

/// Generate the INSERT statement for a table's columns
pub fn generate_insert(schema: &TableSchema, ignore_existing: bool) -> String {
    let columns = schema.column_names();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT {}INTO {} ({}) VALUES ({})",
        if ignore_existing { "OR IGNORE " } else { "" },
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}
