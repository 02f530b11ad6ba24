use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// File name of the cached export inside a version directory
pub const CSV_FILE: &str = "crime_data.csv";

/// Per-version cache of downloaded exports
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "crime-data-to-sqlite")
                .context("Could not determine cache directory")?
                .cache_dir()
                .to_path_buf(),
        };

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub fn version_dir(&self, version: u64) -> PathBuf {
        self.cache_dir.join(version.to_string())
    }

    pub fn csv_path(&self, version: u64) -> PathBuf {
        self.version_dir(version).join(CSV_FILE)
    }

    pub fn is_cached(&self, version: u64) -> bool {
        self.csv_path(version).exists()
    }

    /// Newest cached version, for offline runs
    pub fn latest_cached(&self) -> Result<Option<u64>> {
        let mut latest = None;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            let version = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<u64>().ok());

            if let Some(v) = version {
                if self.is_cached(v) && latest.map_or(true, |l| v > l) {
                    latest = Some(v);
                }
            }
        }
        Ok(latest)
    }

    /// Remove every cached version except `keep`
    pub fn cleanup_old_versions(&self, keep: u64) -> Result<()> {
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }

            let version = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<u64>().ok());
            if matches!(version, Some(v) if v != keep) {
                fs::remove_dir_all(&path).ok();
            }
        }
        Ok(())
    }
}
