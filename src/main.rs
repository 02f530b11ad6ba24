use anyhow::{Context, Result};
use crime_data_to_sqlite::{
    cli::{Cli, Commands, LoadArgs},
    download::ensure_dataset_downloaded,
    load_file,
    schema::DependencyResolver,
    LoadConfig, LoadReport, LogUi, Ui, UiApp,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where the source CSV comes from
enum Source {
    Local(PathBuf),
    Portal {
        cache_dir: Option<PathBuf>,
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log lines would tear the full-screen view, so the TUI only shows warnings
    let tui = matches!(
        &cli.command,
        Commands::Sync { load, .. } | Commands::Load { load, .. } if load.tui
    );
    let default_filter = if tui { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sync {
            output_db,
            force,
            cache_dir,
            load,
        } => {
            let source = Source::Portal { cache_dir, force };
            run_load(source, &output_db, &load)?;
        }

        Commands::Download { output, force } => {
            let (path, version) = ensure_dataset_downloaded(output, force, &mut LogUi::new())?;
            println!("Crime data version {} cached at {:?}", version, path);
        }

        Commands::Load {
            input,
            output_db,
            load,
        } => {
            run_load(Source::Local(input), &output_db, &load)?;
        }

        Commands::ListTables => {
            println!("Tables in load order:\n");
            let resolver = DependencyResolver::new();
            for table in resolver.load_order()? {
                let parents = resolver.parents(table.name);
                print!("  {:<12} key ({})", table.name, table.primary_key.join(", "));
                if !parents.is_empty() {
                    print!("  -> {}", parents.join(", "));
                }
                println!();
            }
        }
    }

    Ok(())
}

fn run_load(source: Source, output_db: &Path, args: &LoadArgs) -> Result<LoadReport> {
    let start = Instant::now();
    let config = args.load_config()?;

    let report = if args.tui {
        let mut ui = UiApp::new()?;
        match execute(&mut ui, source, output_db, &config) {
            Ok(report) => {
                ui.finish(&summary(&report, output_db, start))?;
                report
            }
            Err(err) => {
                ui.restore()?;
                return Err(err);
            }
        }
    } else {
        execute(&mut LogUi::new(), source, output_db, &config)?
    };

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }

    println!();
    for table in &report.tables {
        println!(
            "  {:<12} {:>9} rows  ({} null keys, {} duplicates)",
            table.table, table.written_rows, table.keys.null_keys, table.keys.duplicates
        );
    }
    println!("\n{}", summary(&report, output_db, start));
    Ok(report)
}

fn execute(
    ui: &mut impl Ui,
    source: Source,
    output_db: &Path,
    config: &LoadConfig,
) -> Result<LoadReport> {
    let input = match source {
        Source::Local(path) => path,
        Source::Portal { cache_dir, force } => ensure_dataset_downloaded(cache_dir, force, ui)?.0,
    };
    load_file(&input, output_db, config, ui)
}

fn summary(report: &LoadReport, output_db: &Path, start: Instant) -> String {
    format!(
        "Created {:?} ({} rows in {} tables from {} source rows) in {:.1}s",
        output_db,
        report.total_written(),
        report.tables.len(),
        report.source_rows,
        start.elapsed().as_secs_f64()
    )
}
