use log::debug;
use lru::LruCache;

use crate::processor::{
    CatalogError,
    aggregate::{
        distinct_values, group_count, releases_by_year, sample, summary, top_k_trends, top_n_by,
        value_counts,
    },
    dataset::Dataset,
    filter::FilterParams,
    paginate::{Page, Projection},
    record::Field,
    result::ResultSet,
};
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// What a query produces from its filtered rows
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    /// The filtered records themselves
    #[default]
    Records,
    ValueCounts {
        field: Field,
        top_n: Option<usize>,
    },
    GroupCount {
        group: Field,
        secondary: Option<Field>,
    },
    TopNBy {
        field: Field,
        n: usize,
        descending: bool,
    },
    Sample {
        n: usize,
        seed: Option<u64>,
    },
    Summary,
    Distinct {
        field: Field,
    },
    ReleasesByYear,
    /// Per-year counts of the `top_k` most common values of `field`
    Trends {
        field: Field,
        top_k: usize,
    },
}

impl Operation {
    /// Unseeded samples differ on every run and are never memoized.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, Operation::Sample { seed: None, .. })
    }
}

#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub struct QueryKey {
    params: FilterParams,
    page: Page,
    projection: Projection,
    operation: Operation,
}

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Caller-owned memo of query results.
///
/// Entries are keyed by query only, so one cache must serve a single
/// immutable dataset snapshot.
#[derive(Debug)]
pub struct QueryCache {
    cache: RefCell<LruCache<QueryKey, ResultSet>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<ResultSet> {
        self.cache.borrow_mut().get(key).cloned()
    }

    pub fn put(&self, key: QueryKey, value: ResultSet) {
        self.cache.borrow_mut().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent query over a [`Dataset`]: filter, then one operation, then
/// pagination of the output rows and column projection.
///
/// # Example
///
/// ```rust
/// # use catalog_processor::processor::{dataset::Dataset, filter::FilterParams, record::{Field, Kind}};
/// # let dataset = Dataset::default();
/// let counts = dataset
///     .query()
///     .filter(FilterParams::new().kind(Kind::Movie))
///     .value_counts(Field::Country, Some(10))
///     .execute()
///     .unwrap();
/// assert!(counts.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    dataset: &'a Dataset,
    cache: Option<Rc<QueryCache>>,
    params: FilterParams,
    page: Page,
    projection: Projection,
    operation: Operation,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(dataset: &'a Dataset, cache: Option<Rc<QueryCache>>) -> Self {
        Self {
            dataset,
            cache,
            params: FilterParams::default(),
            page: Page::default(),
            projection: Projection::all(),
            operation: Operation::Records,
        }
    }

    /// Replace the filter parameters
    pub fn filter(mut self, params: FilterParams) -> Self {
        self.params = params;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.page.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.page.limit = Some(limit);
        self
    }

    /// Restrict output columns; unknown names are ignored
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.projection = Projection::new(columns);
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn records(self) -> Self {
        self.operation(Operation::Records)
    }

    pub fn value_counts(self, field: Field, top_n: Option<usize>) -> Self {
        self.operation(Operation::ValueCounts { field, top_n })
    }

    pub fn group_count(self, group: Field, secondary: Option<Field>) -> Self {
        self.operation(Operation::GroupCount { group, secondary })
    }

    pub fn top_n_by(self, field: Field, n: usize, descending: bool) -> Self {
        self.operation(Operation::TopNBy {
            field,
            n,
            descending,
        })
    }

    pub fn sample(self, n: usize, seed: Option<u64>) -> Self {
        self.operation(Operation::Sample { n, seed })
    }

    pub fn summary(self) -> Self {
        self.operation(Operation::Summary)
    }

    pub fn distinct(self, field: Field) -> Self {
        self.operation(Operation::Distinct { field })
    }

    pub fn releases_by_year(self) -> Self {
        self.operation(Operation::ReleasesByYear)
    }

    pub fn trends(self, field: Field, top_k: usize) -> Self {
        self.operation(Operation::Trends { field, top_k })
    }

    pub fn genre_trends(self, top_k: usize) -> Self {
        self.trends(Field::ListedIn, top_k)
    }

    pub fn country_trends(self, top_k: usize) -> Self {
        self.trends(Field::Country, top_k)
    }

    fn key(&self) -> QueryKey {
        QueryKey {
            params: self.params.clone(),
            page: self.page,
            projection: self.projection.clone(),
            operation: self.operation.clone(),
        }
    }

    /// Run the query, consulting the cache for deterministic operations.
    pub fn execute(&self) -> Result<ResultSet, CatalogError> {
        let cache = self
            .cache
            .as_ref()
            .filter(|_| self.operation.is_deterministic());

        let Some(cache) = cache else {
            return self.run();
        };

        let key = self.key();
        if let Some(hit) = cache.get(&key) {
            debug!("Query cache hit for {:?}", key.operation);
            return Ok(hit);
        }
        let result = self.run()?;
        cache.put(key, result.clone());
        Ok(result)
    }

    fn run(&self) -> Result<ResultSet, CatalogError> {
        let filtered = self.dataset.filter(&self.params)?;
        debug!(
            "Filtered {} of {} rows for {:?}",
            filtered.len(),
            self.dataset.len(),
            self.operation
        );

        let assembled = match &self.operation {
            Operation::Records => {
                // slice before assembling so only the page is materialized
                let page = filtered.paginate(self.page);
                return Ok(ResultSet::from_view(&page).select(&self.projection));
            }
            Operation::ValueCounts { field, top_n } => {
                ResultSet::from_value_counts(field, &value_counts(&filtered, field, *top_n))
            }
            Operation::GroupCount { group, secondary } => ResultSet::from_group_counts(
                group,
                secondary.as_ref(),
                &group_count(&filtered, group, secondary.as_ref()),
            ),
            Operation::TopNBy {
                field,
                n,
                descending,
            } => ResultSet::from_records(self.dataset, top_n_by(&filtered, field, *n, *descending)),
            Operation::Sample { n, seed } => {
                ResultSet::from_records(self.dataset, sample(&filtered, *n, *seed))
            }
            Operation::Summary => ResultSet::from_summary(&summary(&filtered)),
            Operation::Distinct { field } => {
                ResultSet::from_values(field, &distinct_values(&filtered, field))
            }
            Operation::ReleasesByYear => ResultSet::from_group_counts(
                &Field::ReleaseYear,
                None,
                &releases_by_year(&filtered),
            ),
            Operation::Trends { field, top_k } => ResultSet::from_group_counts(
                &Field::ReleaseYear,
                Some(field),
                &top_k_trends(&filtered, field, *top_k),
            ),
        };

        Ok(assembled.paginate(self.page).select(&self.projection))
    }
}

impl Dataset {
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self, None)
    }

    pub fn query_with_cache(&self, cache: &Rc<QueryCache>) -> QueryBuilder<'_> {
        QueryBuilder::new(self, Some(Rc::clone(cache)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::record::{Kind, Record};
    use serde_json::Value as Json;

    fn catalog() -> Dataset {
        let rows = [
            ("A", Kind::Movie, "India", 2020, "Dramas, Comedies"),
            ("B", Kind::TvShow, "USA", 2019, "Comedies"),
            ("C", Kind::Movie, "India", 2019, "Dramas"),
            ("D", Kind::Movie, "France", 2021, "Thrillers"),
        ];
        Dataset::from_records(
            rows.iter()
                .map(|(title, kind, country, year, genres)| {
                    let mut r = Record::new(*title);
                    r.title = Some(title.to_string());
                    r.kind = Some(*kind);
                    r.country = Some(country.to_string());
                    r.release_year = Some(*year);
                    r.listed_in = Some(genres.to_string());
                    r
                })
                .collect(),
        )
    }

    #[test]
    fn test_records_with_filter_page_and_projection() {
        let dataset = catalog();
        let result = dataset
            .query()
            .filter(FilterParams::new().kind(Kind::Movie))
            .offset(1)
            .limit(1)
            .select(["title"])
            .execute()
            .unwrap();
        assert_eq!(result.columns(), &["title".to_string()]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0, "title"), Some(&Json::from("C")));
    }

    #[test]
    fn test_value_counts_query_is_paged_after_aggregation() {
        let dataset = catalog();
        let result = dataset
            .query()
            .value_counts(Field::ListedIn, None)
            .limit(2)
            .execute()
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(0, "listed_in"), Some(&Json::from("Dramas")));
        assert_eq!(result.get(0, "count"), Some(&Json::from(2)));
        assert_eq!(result.get(1, "listed_in"), Some(&Json::from("Comedies")));
    }

    #[test]
    fn test_invalid_params_surface_as_errors() {
        let dataset = catalog();
        let err = dataset
            .query()
            .filter(FilterParams::new().release_year_range(2020, 2000))
            .execute()
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidParameter(_)));
    }

    #[test]
    fn test_cache_memoizes_deterministic_queries_only() {
        let dataset = catalog();
        let cache = Rc::new(QueryCache::new());

        let first = dataset.query_with_cache(&cache).summary().execute().unwrap();
        let second = dataset.query_with_cache(&cache).summary().execute().unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        dataset.query_with_cache(&cache).sample(2, None).execute().unwrap();
        assert_eq!(cache.len(), 1);

        let seeded = dataset.query_with_cache(&cache).sample(2, Some(9)).execute().unwrap();
        assert_eq!(seeded.len(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_capacity_evicts_oldest() {
        let dataset = catalog();
        let cache = Rc::new(QueryCache::with_capacity(1));
        dataset.query_with_cache(&cache).summary().execute().unwrap();
        dataset.query_with_cache(&cache).releases_by_year().execute().unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_trends_and_top_n_queries() {
        let dataset = catalog();
        let trends = dataset.query().genre_trends(1).execute().unwrap();
        assert_eq!(trends.columns(), &["release_year", "listed_in", "count"]);
        assert!(trends.len() >= 1);

        let countries = dataset.query().country_trends(3).execute().unwrap();
        assert_eq!(countries.columns(), &["release_year", "country", "count"]);
        assert_ne!(countries, trends);

        let newest = dataset
            .query()
            .top_n_by(Field::ReleaseYear, 1, true)
            .select(["title"])
            .execute()
            .unwrap();
        assert_eq!(newest.get(0, "title"), Some(&Json::from("D")));
    }
}
