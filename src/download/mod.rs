pub mod cache;
pub mod client;
pub mod extract;

pub use cache::*;
pub use client::*;
pub use extract::*;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::ui::{Phase, Ui};

/// Make sure the newest export is cached locally.
///
/// Returns the CSV path and its version (the portal's last-update time).
/// When the portal is unreachable the newest cached copy is used instead.
pub fn ensure_dataset_downloaded(
    cache_dir: Option<PathBuf>,
    force: bool,
    ui: &mut impl Ui,
) -> Result<(PathBuf, u64)> {
    ui.set_phase(Phase::Checking);
    let cache = CacheManager::new(cache_dir)?;
    let client = DatasetClient::new()?;

    let info = match client.fetch_info() {
        Ok(info) => info,
        Err(err) => match cache.latest_cached()? {
            Some(version) if !force => {
                tracing::warn!(error = %err, version, "portal unreachable, using cached export");
                ui.log(format!("Portal unreachable; using cached version {}", version));
                return Ok((cache.csv_path(version), version));
            }
            _ => return Err(err),
        },
    };

    let version = info.rows_updated_at;
    ui.set_info(format!("{} (version {})", info.name, version));

    if cache.is_cached(version) && !force {
        ui.log(format!("Version {} already cached", version));
        return Ok((cache.csv_path(version), version));
    }

    ui.set_phase(Phase::Downloading);
    let version_dir = cache.version_dir(version);
    fs::create_dir_all(&version_dir).context("Failed to create version directory")?;

    // Download next to the final path so an interrupted run never looks cached
    let partial = version_dir.join(format!("{}.part", CSV_FILE));
    client.download_csv(&partial, ui)?;

    let csv_path = cache.csv_path(version);
    fs::rename(&partial, &csv_path).context("Failed to move download into cache")?;
    ui.clear_progress();

    cache.cleanup_old_versions(version)?;
    tracing::info!(version, path = %csv_path.display(), "dataset cached");

    Ok((csv_path, version))
}
