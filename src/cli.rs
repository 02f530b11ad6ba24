use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{parse_mode_override, LoadConfig, TableMode};

#[derive(Parser, Debug)]
#[command(name = "crime-data-to-sqlite")]
#[command(version, about = "Normalize the LA crime CSV export into a relational SQLite database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download (if needed) and load into SQLite
    Sync {
        /// Output SQLite database path
        output_db: PathBuf,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,

        /// Custom cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Download the latest CSV export into the cache
    Download {
        /// Cache directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,
    },

    /// Load a local CSV (or a zip containing one) into SQLite
    Load {
        /// Source `.csv` or `.zip`
        input: PathBuf,

        /// Output SQLite database path
        output_db: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// List the output tables in load order
    ListTables,
}

/// Options shared by every command that writes a database
#[derive(Args, Debug, Default)]
pub struct LoadArgs {
    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep raw date/time text instead of parsing timestamps
    #[arg(long)]
    pub fast: bool,

    /// Existing-table behaviour, e.g. `--mode crimes=append` (repeatable)
    #[arg(short, long, value_parser = parse_mode_override)]
    pub mode: Vec<(String, TableMode)>,

    /// Skip the foreign key check before commit
    #[arg(long)]
    pub no_verify: bool,

    /// Show the full-screen progress view
    #[arg(long)]
    pub tui: bool,

    /// Write the load report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl LoadArgs {
    /// Config file (or defaults) with command line overrides applied
    pub fn load_config(&self) -> Result<LoadConfig> {
        let mut config = match &self.config {
            Some(path) => LoadConfig::from_file(path)?,
            None => LoadConfig::default(),
        };

        if self.fast {
            config.normalize_timestamps = false;
        }
        if self.no_verify {
            config.verify_foreign_keys = false;
        }
        for (table, mode) in &self.mode {
            config.set_mode(table.clone(), *mode);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
