use crate::utils::sample_csv_path;
use catalog_processor::{
    loader::load_dataset,
    processor::{filter::FilterParams, record::Kind},
};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, _) = load_dataset(&sample_csv_path())?;

    // Movies from India released since 1995
    let params = FilterParams::new()
        .kind(Kind::Movie)
        .country_contains("india")
        .release_year_range(1995, 2021);
    let view = dataset.filter(&params)?;

    println!("Matching titles: {:?}", view.titles());
    Ok(())
}
