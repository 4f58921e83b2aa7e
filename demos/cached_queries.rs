use std::rc::Rc;
use std::time::Instant;

use crate::utils::sample_csv_path;
use catalog_processor::{
    loader::load_dataset,
    processor::{query_builder::QueryCache, record::Field},
};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (dataset, _) = load_dataset(&sample_csv_path())?;
    let cache = Rc::new(QueryCache::new());

    // First run (filter + aggregation)
    let start = Instant::now();
    let result = dataset
        .query_with_cache(&cache)
        .genre_trends(5)
        .execute()?;
    println!("First run: {} rows, elapsed: {:?}", result.len(), start.elapsed());

    // Second run (served from the cache)
    let start = Instant::now();
    let cached = dataset
        .query_with_cache(&cache)
        .genre_trends(5)
        .execute()?;
    println!("Cached run: {} rows, elapsed: {:?}", cached.len(), start.elapsed());
    Ok(())
}
