//! Schema normalization: raw loader output to the canonical [`Dataset`].

use log::{debug, warn};
use std::collections::HashSet;

use crate::processor::{
    CatalogError, ParseError, ParseSummary,
    dataset::Dataset,
    record::{Field, Kind, Record},
};

/// Untyped table as produced by a loader: header row plus cells.
///
/// `None` marks an empty cell. Rows may be shorter than the header; missing
/// trailing cells read as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        RawTable {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|c| c.map(Into::into)).collect());
    }
}

/// Trims and lowercases a column header. A leading byte-order mark is dropped.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Normalizes a raw table, discarding the parse summary.
pub fn normalize(raw: RawTable) -> Result<Dataset, CatalogError> {
    normalize_with_summary(raw).map(|(dataset, _)| dataset)
}

/// Normalizes a raw table into a [`Dataset`].
///
/// Fails with [`CatalogError::Schema`] when no column resolves to `title`.
/// Malformed cells (non-integer years, unknown kinds) become null and are
/// listed in the returned [`ParseSummary`].
pub fn normalize_with_summary(raw: RawTable) -> Result<(Dataset, ParseSummary), CatalogError> {
    let mut seen: HashSet<Field> = HashSet::new();
    let mut columns: Vec<Option<Field>> = Vec::with_capacity(raw.headers.len());
    let mut present = Vec::new();
    let mut extra_columns = Vec::new();

    for header in &raw.headers {
        let name = normalize_column_name(header);
        if name.is_empty() {
            columns.push(None);
            continue;
        }
        let field = Field::from_name(&name);
        if !seen.insert(field.clone()) {
            warn!("Duplicate column '{header}' ignored, first occurrence of '{field}' wins");
            columns.push(None);
            continue;
        }
        if let Field::Other(name) = &field {
            extra_columns.push(name.clone());
        }
        present.push(field.clone());
        columns.push(Some(field));
    }

    if !seen.contains(&Field::Title) {
        return Err(CatalogError::Schema(format!(
            "required column 'title' not found in {:?}",
            raw.headers
        )));
    }

    let mut summary = ParseSummary::default();
    let mut records = Vec::with_capacity(raw.rows.len());

    for (row_idx, cells) in raw.rows.into_iter().enumerate() {
        let mut record = Record::new(String::new());
        let mut id = None;

        for (cell, column) in cells.into_iter().zip(columns.iter()) {
            let Some(field) = column else { continue };
            let Some(value) = cell.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match field {
                Field::Id => id = Some(value.trim().to_string()),
                Field::Title => record.title = Some(value),
                Field::Kind => match Kind::parse(&value) {
                    Some(kind) => record.kind = Some(kind),
                    None => summary.errors.push(ParseError {
                        row: row_idx,
                        column: field.name().to_string(),
                        value,
                        error: "unknown kind".to_string(),
                    }),
                },
                Field::Director => record.director = Some(value),
                Field::Cast => record.cast = Some(value),
                Field::Country => record.country = Some(value),
                Field::DateAdded => record.date_added = Some(value.trim().to_string()),
                Field::ReleaseYear => match parse_year(&value) {
                    Some(year) => record.release_year = Some(year),
                    None => summary.errors.push(ParseError {
                        row: row_idx,
                        column: field.name().to_string(),
                        value,
                        error: "not an integer year".to_string(),
                    }),
                },
                Field::Rating => record.rating = Some(value),
                Field::Duration => record.duration = Some(value),
                Field::ListedIn => record.listed_in = Some(value),
                Field::Description => record.description = Some(value),
                Field::Other(name) => {
                    record.extra.insert(name.clone(), value);
                }
            }
        }

        // Synthetic ids are the 1-based source row number.
        record.id = id.unwrap_or_else(|| (row_idx + 1).to_string());
        records.push(record);
    }

    summary.rows_processed = records.len();
    for column in [Field::Kind, Field::ReleaseYear] {
        let bad = summary
            .errors
            .iter()
            .filter(|e| e.column == column.name())
            .count();
        if bad > 0 {
            warn!("{bad} malformed '{column}' values treated as null");
        }
    }
    debug!(
        "Normalized {} rows over {} columns ({} pass-through)",
        records.len(),
        present.len(),
        extra_columns.len()
    );

    Ok((Dataset::new(records, present, extra_columns), summary))
}

/// Integer year; spreadsheet floats such as `"2020.0"` are accepted.
fn parse_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i64>() {
        return Some(year);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(v as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| Some(c.to_string())));
        }
        table
    }

    #[test]
    fn test_headers_are_trimmed_and_lowercased() {
        let table = raw(
            &["  Title ", "TYPE", "Release_Year", " Budget"],
            &[&["A", "movie", "2020", "10"]],
        );
        let dataset = normalize(table).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.title.as_deref(), Some("A"));
        assert_eq!(record.kind, Some(Kind::Movie));
        assert_eq!(record.release_year, Some(2020));
        assert_eq!(record.extra.get("budget").map(String::as_str), Some("10"));
        assert_eq!(dataset.extra_columns(), &["budget".to_string()]);
    }

    #[test]
    fn test_missing_title_is_schema_error() {
        let table = raw(&["type", "country"], &[&["Movie", "India"]]);
        assert!(matches!(normalize(table), Err(CatalogError::Schema(_))));
    }

    #[test]
    fn test_empty_cells_are_null_not_empty_strings() {
        let table = raw(&["title", "director", "release_year"], &[&["A", "", " "]]);
        let dataset = normalize(table).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.director, None);
        assert_eq!(record.release_year, None);
    }

    #[test]
    fn test_malformed_cells_are_tolerated_and_reported() {
        let table = raw(
            &["title", "type", "release_year"],
            &[&["A", "Documentary", "19xx"], &["B", "TV Show", "2021.0"]],
        );
        let (dataset, summary) = normalize_with_summary(table).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].kind, None);
        assert_eq!(dataset.records()[0].release_year, None);
        assert_eq!(dataset.records()[1].release_year, Some(2021));
        assert_eq!(summary.rows_processed, 2);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.errors[1].column, "release_year");
    }

    #[test]
    fn test_ids_come_from_show_id_or_row_number() {
        let with_ids = raw(&["show_id", "title"], &[&["s7", "A"]]);
        assert_eq!(normalize(with_ids).unwrap().records()[0].id, "s7");

        let without = raw(&["title"], &[&["A"], &["B"]]);
        let dataset = normalize(without).unwrap();
        assert_eq!(dataset.records()[1].id, "2");
    }

    #[test]
    fn test_unknown_columns_pass_through_beside_listed_in() {
        let table = raw(&["title", "listed_in", "genre"], &[&["A", "Dramas", "noir"]]);
        let dataset = normalize(table).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.listed_in.as_deref(), Some("Dramas"));
        assert_eq!(record.text(&Field::Other("genre".into())), Some("noir"));
        assert_eq!(dataset.extra_columns(), &["genre".to_string()]);
    }

    #[test]
    fn test_short_rows_and_duplicate_headers() {
        let mut table = RawTable::new(vec!["title".into(), "Title".into(), "rating".into()]);
        table.push_row(vec![Some("A"), Some("shadow")]);
        let dataset = normalize(table).unwrap();
        assert_eq!(dataset.records()[0].title.as_deref(), Some("A"));
        assert_eq!(dataset.records()[0].rating, None);
    }
}
