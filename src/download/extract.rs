use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::LoadError;
use crate::ui::{Phase, Ui};

/// File name of a `.csv` archive member, without directory prefixes
fn csv_member_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|f| f.to_ascii_lowercase().ends_with(".csv"))
        .map(str::to_string)
}

/// Extract the single `.csv` member of a zip archive into `dest_dir`.
///
/// An archive with no CSV, or with several, is rejected before anything
/// is written.
pub fn extract_csv(zip_path: &Path, dest_dir: &Path, ui: &mut impl Ui) -> Result<PathBuf> {
    let file = File::open(zip_path).context("Failed to open zip file")?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).context("Failed to read zip archive")?;

    let members: Vec<(usize, String)> = (0..archive.len())
        .filter_map(|i| {
            let member = archive.by_index(i).ok()?;
            if member.is_dir() {
                return None;
            }
            csv_member_name(member.name()).map(|name| (i, name))
        })
        .collect();

    let (index, file_name) = match members.as_slice() {
        [] => return Err(LoadError::EmptyArchive(zip_path.to_path_buf()).into()),
        [only] => only.clone(),
        _ => {
            return Err(LoadError::AmbiguousArchive {
                path: zip_path.to_path_buf(),
                members: members.iter().map(|(_, name)| name.clone()).collect(),
            }
            .into())
        }
    };

    fs::create_dir_all(dest_dir).context("Failed to create destination directory")?;
    let mut member = archive
        .by_index(index)
        .context("Failed to read file from archive")?;

    let dest_path = dest_dir.join(&file_name);
    ui.log(format!("Extracting {}", file_name));

    let mut dest_file = File::create(&dest_path)
        .with_context(|| format!("Failed to create file: {:?}", dest_path))?;
    io::copy(&mut member, &mut dest_file)
        .with_context(|| format!("Failed to extract: {}", file_name))?;

    Ok(dest_path)
}

/// Turn a `.csv` or `.zip` input path into a readable CSV path
pub fn resolve_input(path: &Path, ui: &mut impl Ui) -> Result<PathBuf> {
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if !is_zip {
        return Ok(path.to_path_buf());
    }

    ui.set_phase(Phase::Extracting);
    let dest = path.parent().unwrap_or_else(|| Path::new("."));
    extract_csv(path, dest, ui)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, members: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, body) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extracts_csv_member() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("crime.zip");
        write_zip(&zip_path, &[("README.txt", "x"), ("data/Crime_Data.csv", "DR_NO\n1\n")]);

        let csv = resolve_input(&zip_path, &mut SilentUi::new()).unwrap();
        assert_eq!(csv, dir.path().join("Crime_Data.csv"));
        assert_eq!(fs::read_to_string(csv).unwrap(), "DR_NO\n1\n");
    }

    #[test]
    fn test_archive_without_csv() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("empty.zip");
        write_zip(&zip_path, &[("notes.txt", "nothing here")]);

        let err = extract_csv(&zip_path, dir.path(), &mut SilentUi::new()).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::EmptyArchive(_))));
    }

    #[test]
    fn test_archive_with_two_csvs() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("two.zip");
        write_zip(&zip_path, &[("a/2020.csv", "DR_NO\n1\n"), ("b/2021.CSV", "DR_NO\n2\n")]);

        let err = extract_csv(&zip_path, dir.path(), &mut SilentUi::new()).unwrap_err();
        match err.downcast_ref::<LoadError>() {
            Some(LoadError::AmbiguousArchive { members, .. }) => {
                assert_eq!(members, &vec!["2020.csv".to_string(), "2021.CSV".to_string()]);
            }
            other => panic!("expected ambiguous archive, got {:?}", other),
        }
        assert!(!dir.path().join("2020.csv").exists());
    }

    #[test]
    fn test_plain_csv_passes_through() {
        let path = Path::new("/data/crime.csv");
        assert_eq!(resolve_input(path, &mut SilentUi::new()).unwrap(), path);
    }
}
