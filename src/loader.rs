//! Load driver: runs the table builders in foreign-key order inside one
//! transaction and commits only when every table has landed.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::LoadConfig;
use crate::download::resolve_input;
use crate::error::LoadError;
use crate::normalize::{
    associations, check_source_columns, entities, incidents, LoadContext, TableRows,
};
use crate::parser::SourceFrame;
use crate::schema::DependencyResolver;
use crate::transform::SanitizeStats;
use crate::ui::{Phase, Ui};
use crate::writer::{materialize, verify_foreign_keys, SqliteWriter};

/// Progress of one run; each transition is one builder stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Start,
    AreasLoaded,
    LocationsLoaded,
    WeaponsLoaded,
    VictimsLoaded,
    CrimesLoaded,
    IncidentsLoaded,
    AssociationsLoaded,
    Committed,
}

impl LoadState {
    pub fn next(self) -> Option<LoadState> {
        use LoadState::*;
        match self {
            Start => Some(AreasLoaded),
            AreasLoaded => Some(LocationsLoaded),
            LocationsLoaded => Some(WeaponsLoaded),
            WeaponsLoaded => Some(VictimsLoaded),
            VictimsLoaded => Some(CrimesLoaded),
            CrimesLoaded => Some(IncidentsLoaded),
            IncidentsLoaded => Some(AssociationsLoaded),
            AssociationsLoaded => Some(Committed),
            Committed => None,
        }
    }

    /// Tables written by the transition into this state
    pub fn tables(self) -> &'static [&'static str] {
        use LoadState::*;
        match self {
            Start | Committed => &[],
            AreasLoaded => &["areas"],
            LocationsLoaded => &["locais"],
            WeaponsLoaded => &["armas"],
            VictimsLoaded => &["vitimas"],
            CrimesLoaded => &["crimes"],
            IncidentsLoaded => &["ocorrencias"],
            AssociationsLoaded => &["occ_crime", "occ_arma"],
        }
    }

    /// Every table in the order the stages write them
    pub fn load_order() -> Vec<&'static str> {
        let mut order = Vec::new();
        let mut state = LoadState::Start;
        while let Some(next) = state.next() {
            order.extend_from_slice(next.tables());
            state = next;
        }
        order
    }

    fn build(self, ctx: &LoadContext) -> Result<Vec<TableRows>, LoadError> {
        use LoadState::*;
        Ok(match self {
            Start | Committed => Vec::new(),
            AreasLoaded => vec![entities::areas(ctx)?],
            LocationsLoaded => vec![entities::locations(ctx)?],
            WeaponsLoaded => vec![entities::weapons(ctx)?],
            VictimsLoaded => vec![entities::victims(ctx)?],
            CrimesLoaded => vec![entities::crimes(ctx)?],
            IncidentsLoaded => vec![incidents::incidents(ctx)?],
            AssociationsLoaded => vec![
                associations::incident_crimes(ctx)?,
                associations::incident_weapons(ctx)?,
            ],
        })
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Start => "start",
            LoadState::AreasLoaded => "areas_loaded",
            LoadState::LocationsLoaded => "locations_loaded",
            LoadState::WeaponsLoaded => "weapons_loaded",
            LoadState::VictimsLoaded => "victims_loaded",
            LoadState::CrimesLoaded => "crimes_loaded",
            LoadState::IncidentsLoaded => "incidents_loaded",
            LoadState::AssociationsLoaded => "associations_loaded",
            LoadState::Committed => "committed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome for one table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: &'static str,
    #[serde(flatten)]
    pub keys: SanitizeStats,
    /// Source values nulled because they did not fit the column type
    pub coerced_values: usize,
    pub written_rows: u64,
}

/// Outcome of a committed run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub source_rows: usize,
    pub normalized_timestamps: bool,
    /// Source values nulled across all tables
    pub coerced_values: usize,
    pub state: LoadState,
    pub tables: Vec<TableReport>,
}

impl LoadReport {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn total_written(&self) -> u64 {
        self.tables.iter().map(|t| t.written_rows).sum()
    }
}

/// Runs the normalization pipeline against one destination database
pub struct LoadDriver<'a, U: Ui> {
    config: &'a LoadConfig,
    ui: &'a mut U,
}

impl<'a, U: Ui> LoadDriver<'a, U> {
    pub fn new(config: &'a LoadConfig, ui: &'a mut U) -> Self {
        Self { config, ui }
    }

    /// Build and write every table, then commit once.
    ///
    /// Any error drops the open transaction, which rolls back all tables
    /// written so far.
    pub fn run(&mut self, frame: &SourceFrame, db_path: &Path) -> Result<LoadReport> {
        self.config.validate()?;
        DependencyResolver::new().check_order(&LoadState::load_order())?;
        check_source_columns(frame)?;

        let ctx = LoadContext::new(frame, self.config.normalize_timestamps);
        let mut writer = SqliteWriter::open(db_path)?;
        let tx = writer.transaction()?;

        let total = LoadState::load_order().len() as u64;
        let mut report = LoadReport {
            source_rows: frame.len(),
            normalized_timestamps: self.config.normalize_timestamps,
            coerced_values: 0,
            state: LoadState::Start,
            tables: Vec::new(),
        };

        self.ui.set_phase(Phase::Loading);
        let mut state = LoadState::Start;
        while let Some(next) = state.next() {
            if next == LoadState::Committed {
                break;
            }
            if self.ui.cancel_requested() {
                return Err(LoadError::Cancelled.into());
            }

            let built = next
                .build(&ctx)
                .with_context(|| format!("Failed to build tables for stage {}", next))?;

            for table in built {
                let name = table.schema.name;
                let mode = self.config.mode_for(name);
                self.ui.set_progress(report.tables.len() as u64, total, name);

                let written = materialize(&tx, table.schema, &table.rows, mode, self.config.batch_size)
                    .with_context(|| format!("Failed to load table: {}", name))?;

                tracing::info!(
                    table = name,
                    %mode,
                    written,
                    null_keys = table.stats.null_keys,
                    duplicates = table.stats.duplicates,
                    "table loaded"
                );
                self.ui
                    .table_loaded(name, written, table.stats.null_keys + table.stats.duplicates);

                report.coerced_values += table.rows.rejected();
                report.tables.push(TableReport {
                    table: name,
                    keys: table.stats,
                    coerced_values: table.rows.rejected(),
                    written_rows: written,
                });
            }

            state = next;
            report.state = state;
        }

        self.ui.set_phase(Phase::Committing);
        self.ui.set_progress(total, total, "commit");

        if self.config.verify_foreign_keys {
            verify_foreign_keys(&tx).context("Foreign key check failed")?;
        }

        tx.commit().context("Failed to commit load")?;
        report.state = LoadState::Committed;
        tracing::info!(tables = report.tables.len(), rows = report.total_written(), "load committed");

        writer.finalize()?;
        self.ui.clear_progress();

        Ok(report)
    }
}

/// Read a `.csv` (or a `.zip` holding one) and load it into `db_path`
pub fn load_file(
    input: &Path,
    db_path: &Path,
    config: &LoadConfig,
    ui: &mut impl Ui,
) -> Result<LoadReport> {
    let csv_path = resolve_input(input, ui)?;

    ui.set_phase(Phase::Reading);
    ui.set_info(csv_path.display().to_string());
    let frame = SourceFrame::read_path(&csv_path, |rows| {
        ui.set_progress(rows as u64, 0, format!("{} rows", rows))
    })
    .with_context(|| format!("Failed to read source CSV: {:?}", csv_path))?;
    ui.clear_progress();
    ui.log(format!("Read {} source rows", frame.len()));

    LoadDriver::new(config, ui).run(&frame, db_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_order() {
        let mut states = vec![LoadState::Start];
        while let Some(next) = states.last().and_then(|s| s.next()) {
            states.push(next);
        }
        let names: Vec<String> = states.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "start",
                "areas_loaded",
                "locations_loaded",
                "weapons_loaded",
                "victims_loaded",
                "crimes_loaded",
                "incidents_loaded",
                "associations_loaded",
                "committed",
            ]
        );
    }

    #[test]
    fn test_load_order_respects_foreign_keys() {
        let order = LoadState::load_order();
        assert_eq!(order.len(), 8);
        assert!(DependencyResolver::new().check_order(&order).is_ok());
    }

    #[test]
    fn test_report_json_shape() {
        let table = TableReport {
            table: "crimes",
            keys: SanitizeStats {
                candidates: 5,
                null_keys: 1,
                duplicates: 2,
            },
            coerced_values: 1,
            written_rows: 2,
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["table"], "crimes");
        assert_eq!(json["candidate_rows"], 5);
        assert_eq!(json["null_key_rows"], 1);
        assert_eq!(json["duplicate_rows"], 2);
        assert_eq!(json["written_rows"], 2);
        assert_eq!(serde_json::to_value(LoadState::Committed).unwrap(), "committed");
    }
}
