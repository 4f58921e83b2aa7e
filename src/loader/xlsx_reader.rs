use calamine::{Data, ExcelDateTime, Reader, Xlsx, open_workbook};
use chrono::NaiveTime;
use std::path::Path;

use crate::processor::{CatalogError, schema::RawTable};

/// Loads the first worksheet; its first row is the header.
pub fn load_xlsx(path: &Path) -> Result<RawTable, CatalogError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CatalogError::Workbook("Workbook contains no sheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = header_row
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_text));
    }
    Ok(table)
}

/// Cell as text. Whole floats print without a fraction so years stay integral;
/// error cells read as empty.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(date_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Dates read like the CSV export (`January 1, 2021`); a time of day is kept
/// when present.
fn date_text(dt: &ExcelDateTime) -> String {
    match dt.as_datetime() {
        Some(value) if value.time() == NaiveTime::MIN => value.format("%B %-d, %Y").to_string(),
        Some(value) => value.format("%B %-d, %Y %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(2020.0)), Some("2020".to_string()));
        assert_eq!(cell_text(&Data::Float(1.5)), Some("1.5".to_string()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("PG-13".into())), Some("PG-13".to_string()));
    }

    #[test]
    fn test_date_cells_read_like_csv_text() {
        use calamine::ExcelDateTimeType;

        let date = Data::DateTime(ExcelDateTime::new(44197.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&date), Some("January 1, 2021".to_string()));

        let noon = Data::DateTime(ExcelDateTime::new(44197.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&noon), Some("January 1, 2021 12:00:00".to_string()));
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        assert!(load_xlsx(Path::new("does/not/exist.xlsx")).is_err());
    }
}
