//! The JSON data directory.
//!
//! Layout:
//! - `<indicator>.json`: one `StoredSeries` per indicator
//! - `combined.json`: `CombinedData` built from the per-indicator files
//! - `releaseDates.json`: scheduled release dates
//! - `journal.json`: prediction journal
//!
//! Every write goes to a temporary sibling first and is renamed into place, so
//! a reader never sees a half-written document.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{CombinedData, IndicatorKey, StoredSeries};
use crate::error::AppError;

pub const COMBINED_FILE: &str = "combined.json";
pub const RELEASE_DATES_FILE: &str = "releaseDates.json";
pub const JOURNAL_FILE: &str = "journal.json";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::data(format!("Failed to create data dir '{}': {e}", self.root.display()))
        })
    }

    pub fn series_path(&self, key: IndicatorKey) -> PathBuf {
        self.root.join(format!("{}.json", key.as_str()))
    }

    pub fn combined_path(&self) -> PathBuf {
        self.root.join(COMBINED_FILE)
    }

    pub fn release_dates_path(&self) -> PathBuf {
        self.root.join(RELEASE_DATES_FILE)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.root.join(JOURNAL_FILE)
    }

    /// Stored series for an indicator; empty when the file does not exist.
    pub fn load_series(&self, key: IndicatorKey) -> Result<StoredSeries, AppError> {
        Ok(read_json_opt(&self.series_path(key))?.unwrap_or_default())
    }

    pub fn save_series(&self, key: IndicatorKey, series: &StoredSeries) -> Result<(), AppError> {
        write_json_atomic(&self.series_path(key), series)
    }

    /// Remove per-indicator files and `combined.json`. Returns how many files were removed.
    pub fn reset_series(&self) -> Result<usize, AppError> {
        let mut removed = 0;
        let paths = IndicatorKey::ALL
            .iter()
            .map(|&k| self.series_path(k))
            .chain(std::iter::once(self.combined_path()));
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "deleted existing data file");
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::data(format!("Failed to delete '{}': {e}", path.display())));
                }
            }
        }
        Ok(removed)
    }

    /// `combined.json`; a missing file is an error since nothing can be shown without it.
    pub fn load_combined(&self) -> Result<CombinedData, AppError> {
        let path = self.combined_path();
        read_json_opt(&path)?.ok_or_else(|| {
            AppError::data(format!(
                "No data found at '{}'. Run `mdash update` first.",
                path.display()
            ))
        })
    }

    pub fn load_combined_opt(&self) -> Result<Option<CombinedData>, AppError> {
        read_json_opt(&self.combined_path())
    }

    pub fn save_combined(&self, data: &CombinedData) -> Result<(), AppError> {
        write_json_atomic(&self.combined_path(), data)
    }
}

/// Parse a JSON file, returning `None` when it does not exist.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::data(format!("Failed to open '{}': {e}", path.display()))),
    };
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|e| AppError::data(format!("Invalid JSON in '{}': {e}", path.display())))
}

/// Pretty-print `value` to `path` via a temporary file + rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::data(format!("Failed to create '{}': {e}", parent.display())))?;
    }

    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp)
        .map_err(|e| AppError::data(format!("Failed to create '{}': {e}", tmp.display())))?;
    serde_json::to_writer_pretty(&mut file, value)
        .map_err(|e| AppError::data(format!("Failed to write '{}': {e}", tmp.display())))?;
    file.write_all(b"\n")
        .and_then(|()| file.sync_all())
        .map_err(|e| AppError::data(format!("Failed to write '{}': {e}", tmp.display())))?;
    drop(file);

    fs::rename(&tmp, path)
        .map_err(|e| AppError::data(format!("Failed to replace '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::DataPoint;

    #[test]
    fn missing_series_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let stored = data.load_series(IndicatorKey::Vix).unwrap();
        assert!(stored.data.is_empty());
        assert!(stored.last_updated.is_none());
    }

    #[test]
    fn series_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path().join("nested"));
        let stored = StoredSeries {
            data: vec![DataPoint::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 13.2)],
            last_updated: None,
        };
        data.save_series(IndicatorKey::Vix, &stored).unwrap();
        assert_eq!(data.load_series(IndicatorKey::Vix).unwrap(), stored);
        assert!(!data.series_path(IndicatorKey::Vix).with_extension("json.tmp").exists());

        let raw = fs::read_to_string(data.series_path(IndicatorKey::Vix)).unwrap();
        assert!(raw.contains("\"2024-01-02\""));
        assert!(raw.contains("\"lastUpdated\""));
    }

    #[test]
    fn missing_combined_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let err = data.load_combined().unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
        assert!(data.load_combined_opt().unwrap().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        fs::write(data.combined_path(), "{ not json").unwrap();
        assert!(data.load_combined_opt().is_err());
    }

    #[test]
    fn reset_removes_only_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        data.save_series(IndicatorKey::Cpi, &StoredSeries::default()).unwrap();
        data.save_combined(&CombinedData::default()).unwrap();
        assert_eq!(data.reset_series().unwrap(), 2);
        assert_eq!(data.reset_series().unwrap(), 0);
    }
}
