use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::LoadError;
use crate::schema::get_table;

const DEFAULT_BATCH_SIZE: usize = 1000;

/// What to do when a target table already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    /// Abort the load
    Fail,
    /// Drop and rebuild
    #[default]
    Replace,
    /// Keep existing rows; rows with an existing key are skipped
    Append,
}

impl FromStr for TableMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(TableMode::Fail),
            "replace" => Ok(TableMode::Replace),
            "append" => Ok(TableMode::Append),
            other => Err(format!("unknown table mode: {} (fail|replace|append)", other)),
        }
    }
}

impl fmt::Display for TableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableMode::Fail => write!(f, "fail"),
            TableMode::Replace => write!(f, "replace"),
            TableMode::Append => write!(f, "append"),
        }
    }
}

/// Runtime options for one load run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Parse `DATE OCC`/`TIME OCC`/`Date Rptd` into canonical timestamps.
    /// Off stores the raw source text, which is much faster.
    pub normalize_timestamps: bool,
    /// Per-table existing-table behaviour; unlisted tables use `replace`
    pub table_modes: BTreeMap<String, TableMode>,
    /// Run `PRAGMA foreign_key_check` before committing
    pub verify_foreign_keys: bool,
    /// Rows inserted per prepared-statement batch
    pub batch_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            normalize_timestamps: true,
            table_modes: BTreeMap::new(),
            verify_foreign_keys: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: LoadConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    pub fn mode_for(&self, table: &str) -> TableMode {
        self.table_modes.get(table).copied().unwrap_or_default()
    }

    pub fn set_mode(&mut self, table: impl Into<String>, mode: TableMode) {
        self.table_modes.insert(table.into(), mode);
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.batch_size == 0 {
            return Err(LoadError::Config("batch_size must be at least 1".into()));
        }

        for (name, mode) in &self.table_modes {
            let table = get_table(name)
                .ok_or_else(|| LoadError::Config(format!("unknown table: {}", name)))?;

            if table.rebuild_only && *mode != TableMode::Replace {
                return Err(LoadError::Config(format!(
                    "{} is always rebuilt; mode '{}' is not allowed",
                    name, mode
                )));
            }
        }

        Ok(())
    }
}

/// Parse a `table=mode` command line override
pub fn parse_mode_override(s: &str) -> Result<(String, TableMode), String> {
    let (table, mode) = s
        .split_once('=')
        .ok_or_else(|| format!("expected table=mode, got: {}", s))?;
    Ok((table.trim().to_string(), mode.trim().parse()?))
}
