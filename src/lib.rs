//! # catalog-processor
//!
//! In-memory query core for a tabular media catalog (movies and TV shows).
//! A table is loaded once, normalized into a [`processor::dataset::Dataset`],
//! and then answered through a filter, aggregate, paginate pipeline whose
//! output is a homogeneous, JSON-ready [`processor::result::ResultSet`].
//!
//! # Features
//!
//! - **Schema normalization**: case/space-insensitive headers, null cells,
//!   lenient kind and year parsing with a [`processor::ParseSummary`]
//! - **Filtering**: substring, equality, range and membership predicates,
//!   AND-combined, order-preserving views over the dataset
//! - **Aggregations**: value counts over multi-valued fields, grouped counts,
//!   numeric extraction, top-N, seeded sampling, dashboard summaries
//! - **Pagination and projection** with out-of-range clipping
//! - **Loaders** for CSV and XLSX sources
//! - Optional LRU memo of deterministic query results
//!
//! # Example
//!
//! ```rust
//! use catalog_processor::processor::{
//!     filter::FilterParams,
//!     record::{Field, Kind},
//!     schema::{RawTable, normalize},
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut table = RawTable::new(vec!["title".into(), "type".into(), "country".into()]);
//!     table.push_row([Some("Dark"), Some("TV Show"), Some("Germany")]);
//!     table.push_row([Some("Lagaan"), Some("Movie"), Some("India, United Kingdom")]);
//!     let dataset = normalize(table)?;
//!
//!     let counts = dataset
//!         .query()
//!         .filter(FilterParams::new().kind(Kind::Movie))
//!         .value_counts(Field::Country, None)
//!         .execute()?;
//!     assert_eq!(
//!         counts.to_json_string(false)?,
//!         r#"[{"country":"India","count":1},{"country":"United Kingdom","count":1}]"#
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod helpers;
pub mod loader;
pub mod processor;
pub mod request;
