use std::path::PathBuf;

/// Returns the path to the bundled sample catalog.
pub fn sample_csv_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("data")
        .join("sample_titles.csv")
}
