use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;
use std::path::Path;

use crate::processor::{CatalogError, schema::RawTable};

/// Loads a CSV file with a header row. Quoted fields may contain commas and
/// newlines; rows of uneven width are accepted.
pub fn load_csv(path: &Path) -> Result<RawTable, CatalogError> {
    let file = std::fs::File::open(path)?;
    load_csv_reader(file)
}

/// [`load_csv`] over any reader. Invalid UTF-8 is replaced, not rejected.
pub fn load_csv_reader<R: Read>(input: R) -> Result<RawTable, CatalogError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let mut table = RawTable::new(headers);

    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        table.push_row(record.iter().map(|field| {
            if field.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(field).into_owned())
            }
        }));
    }
    Ok(table)
}
