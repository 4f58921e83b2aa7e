//! Ingestion adapters. Loaders only materialize cells; all interpretation
//! happens in [`crate::processor::schema`].

use log::info;
use std::path::{Path, PathBuf};

use crate::processor::{
    CatalogError, ParseSummary,
    dataset::Dataset,
    schema::{RawTable, normalize_with_summary},
};

pub mod csv_reader;
pub mod xlsx_reader;

/// Files tried, in order, when no explicit source is configured.
pub const DEFAULT_CANDIDATES: [&str; 2] = ["netflix_titles.csv", "netflix_titles.xlsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Picks the explicit path if given, otherwise the first existing candidate.
pub fn resolve_source(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<PathBuf, CatalogError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(CatalogError::SourceNotFound(vec![path.to_path_buf()]));
    }
    candidates
        .iter()
        .find(|p| p.exists())
        .cloned()
        .ok_or_else(|| CatalogError::SourceNotFound(candidates.to_vec()))
}

pub fn default_candidates() -> Vec<PathBuf> {
    DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect()
}

/// Reads a file into a raw table, dispatching on extension.
pub fn load_raw(path: &Path) -> Result<RawTable, CatalogError> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Csv => csv_reader::load_csv(path),
        SourceFormat::Xlsx => xlsx_reader::load_xlsx(path),
    }
}

/// Reads and normalizes a file.
pub fn load_dataset(path: &Path) -> Result<(Dataset, ParseSummary), CatalogError> {
    let raw = load_raw(path)?;
    info!(
        "Loaded {} rows x {} columns from {}",
        raw.rows.len(),
        raw.headers.len(),
        path.display()
    );
    normalize_with_summary(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.xlsx")).unwrap(), SourceFormat::Xlsx);
        assert!(matches!(
            SourceFormat::from_path(Path::new("a.parquet")),
            Err(CatalogError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_resolve_prefers_first_existing_candidate() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("netflix_titles.csv");
        let xlsx = dir.path().join("netflix_titles.xlsx");
        std::fs::File::create(&xlsx).unwrap();

        let candidates = vec![csv.clone(), xlsx.clone()];
        assert_eq!(resolve_source(None, &candidates).unwrap(), xlsx);

        let mut file = std::fs::File::create(&csv).unwrap();
        writeln!(file, "title").unwrap();
        assert_eq!(resolve_source(None, &candidates).unwrap(), csv);

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            resolve_source(Some(&missing), &candidates),
            Err(CatalogError::SourceNotFound(_))
        ));
    }
}
