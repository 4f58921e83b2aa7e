use crate::utils::sample_csv_path;
use catalog_processor::{loader::load_dataset, processor::record::Field};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, _) = load_dataset(&sample_csv_path())?;

    let by_year_and_kind = dataset
        .query()
        .group_count(Field::ReleaseYear, Some(Field::Kind))
        .execute()?;
    println!("Releases by year and kind: {}", by_year_and_kind.to_json_string(false)?);

    let countries = dataset.query().country_trends(3).execute()?;
    println!("Top producing countries over time: {}", countries.to_json_string(false)?);
    Ok(())
}
