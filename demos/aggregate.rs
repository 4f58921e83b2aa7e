use crate::utils::sample_csv_path;
use catalog_processor::{
    loader::load_dataset,
    processor::{aggregate::summary, record::Field},
};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, _) = load_dataset(&sample_csv_path())?;

    // Genre counts, multi-valued cells split on ", "
    let genres = dataset
        .query()
        .value_counts(Field::ListedIn, Some(5))
        .execute()?;
    println!("Top genres: {}", genres.to_json_string(true)?);

    let kpis = summary(&dataset.view());
    println!("Summary: {:?}", kpis);
    Ok(())
}
