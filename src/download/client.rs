use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::io::{Read, Write};
use std::path::Path;

use crate::ui::Ui;

/// LA open data portal, "Crime Data from 2020 to Present"
const DATASET_ID: &str = "2nrs-mtv8";
const PORTAL_URL: &str = "https://data.lacity.org/api/views";

#[derive(Debug, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub name: String,
    /// Unix seconds of the last data update; used as the cache version
    #[serde(rename = "rowsUpdatedAt")]
    pub rows_updated_at: u64,
}

pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("crime-data-to-sqlite")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    fn metadata_url() -> String {
        format!("{}/{}.json", PORTAL_URL, DATASET_ID)
    }

    fn csv_url() -> String {
        format!("{}/{}/rows.csv?accessType=DOWNLOAD", PORTAL_URL, DATASET_ID)
    }

    /// Fetch the dataset metadata (name and last update)
    pub fn fetch_info(&self) -> Result<DatasetInfo> {
        let text = self
            .client
            .get(Self::metadata_url())
            .send()
            .and_then(|r| r.error_for_status())
            .context("Failed to fetch dataset metadata")?
            .text()
            .context("Failed to read response")?;

        parse_info(&text)
    }

    /// Stream the full CSV export to `dest`
    pub fn download_csv(&self, dest: &Path, ui: &mut impl Ui) -> Result<u64> {
        let mut response = self
            .client
            .get(Self::csv_url())
            .send()
            .and_then(|r| r.error_for_status())
            .context("Failed to start download")?;

        // The export is generated on the fly, so the size is often unknown
        let total_size = response.content_length().unwrap_or(0);
        let mut file = std::fs::File::create(dest).context("Failed to create destination file")?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 64 * 1024];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .context("Failed to read from response")?;
            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .context("Failed to write to file")?;

            downloaded += bytes_read as u64;
            ui.set_progress(downloaded, total_size, format_bytes(downloaded, total_size));
        }

        file.flush()?;
        ui.log(format!("Downloaded {}", format_bytes(downloaded, downloaded)));
        Ok(downloaded)
    }
}

fn parse_info(text: &str) -> Result<DatasetInfo> {
    serde_json::from_str(text).context("Failed to parse dataset metadata")
}

/// Format bytes as human-readable string
fn format_bytes(current: u64, total: u64) -> String {
    fn fmt(bytes: u64) -> String {
        if bytes >= 1_000_000_000 {
            format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
        } else if bytes >= 1_000_000 {
            format!("{:.1} MB", bytes as f64 / 1_000_000.0)
        } else if bytes >= 1_000 {
            format!("{:.1} KB", bytes as f64 / 1_000.0)
        } else {
            format!("{} B", bytes)
        }
    }

    if total == 0 {
        fmt(current)
    } else {
        format!("{} / {}", fmt(current), fmt(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500, 999), "500 B / 999 B");
        assert_eq!(format_bytes(1_500_000, 3_000_000), "1.5 MB / 3.0 MB");
        assert_eq!(format_bytes(2_500_000_000, 0), "2.5 GB");
    }

    #[test]
    fn test_parse_info_ignores_extra_fields() {
        let json = r#"{"id":"2nrs-mtv8","name":"Crime Data from 2020 to Present",
                      "rowsUpdatedAt":1709251200,"viewCount":12}"#;
        let info = parse_info(json).unwrap();
        assert_eq!(info.id, "2nrs-mtv8");
        assert_eq!(info.rows_updated_at, 1709251200);
    }

    #[test]
    #[ignore]
    fn test_fetch_live_metadata() {
        let info = DatasetClient::new().unwrap().fetch_info().unwrap();
        assert_eq!(info.id, DATASET_ID);
    }
}
