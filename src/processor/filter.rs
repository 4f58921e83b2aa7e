//! Filter engine: declarative parameters compiled into AND-combined predicates.

use serde::{Deserialize, Serialize};

use crate::{
    helpers::text::contains_ignore_case,
    processor::{
        CatalogError, Value,
        dataset::{Dataset, DatasetView},
        record::{Field, Kind, Record},
    },
};

/// Single-field predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterPredicate {
    /// Case-insensitive substring of the raw text
    Contains(String),
    /// Exact, case-sensitive equality of the typed value
    Equals(Value),
    /// Inclusive bounds on the typed value
    Between(Value, Value),
    /// Exact membership in a set of values
    OneOf(Vec<Value>),
}

impl FilterPredicate {
    /// Null fields never match.
    pub fn matches(&self, record: &Record, field: &Field) -> bool {
        match self {
            FilterPredicate::Contains(needle) => record
                .text(field)
                .is_some_and(|text| contains_ignore_case(text, needle)),
            FilterPredicate::Equals(expected) => {
                record.value(field).is_some_and(|v| &v == expected)
            }
            FilterPredicate::Between(lo, hi) => record
                .value(field)
                .is_some_and(|v| lo <= &v && &v <= hi),
            FilterPredicate::OneOf(values) => {
                record.value(field).is_some_and(|v| values.contains(&v))
            }
        }
    }
}

/// Inclusive release-year bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl YearRange {
    pub fn new(min: i64, max: i64) -> Result<Self, CatalogError> {
        let range = YearRange { min, max };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.min > self.max {
            return Err(CatalogError::InvalidParameter(format!(
                "release_year_range min {} is greater than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Filter parameters. Every `None` imposes no constraint; empty strings and
/// empty lists are treated the same as `None`.
///
/// | option                | match                                             |
/// |-----------------------|---------------------------------------------------|
/// | `title_contains`      | case-insensitive substring of `title`             |
/// | `kind`                | kind equality (normalized at load)                |
/// | `kind_in`             | kind is one of the listed kinds                   |
/// | `country_contains`    | case-insensitive substring of the raw `country`   |
/// | `country_in`          | raw `country` exactly equals one listed value     |
/// | `rating_equals`       | exact, case-sensitive `rating`                    |
/// | `release_year_equals` | exact year, null years excluded                   |
/// | `release_year_range`  | inclusive bounds, null years excluded             |
/// | `genre_contains`      | case-insensitive substring of the raw `listed_in` |
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub title_contains: Option<String>,
    pub kind: Option<Kind>,
    pub kind_in: Option<Vec<Kind>>,
    pub country_contains: Option<String>,
    pub country_in: Option<Vec<String>>,
    pub rating_equals: Option<String>,
    pub release_year_equals: Option<i64>,
    pub release_year_range: Option<YearRange>,
    pub genre_contains: Option<String>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn kind_in(mut self, kinds: Vec<Kind>) -> Self {
        self.kind_in = Some(kinds);
        self
    }

    pub fn country_contains(mut self, needle: impl Into<String>) -> Self {
        self.country_contains = Some(needle.into());
        self
    }

    pub fn country_in(mut self, countries: Vec<String>) -> Self {
        self.country_in = Some(countries);
        self
    }

    pub fn rating_equals(mut self, rating: impl Into<String>) -> Self {
        self.rating_equals = Some(rating.into());
        self
    }

    pub fn release_year_equals(mut self, year: i64) -> Self {
        self.release_year_equals = Some(year);
        self
    }

    pub fn release_year_range(mut self, min: i64, max: i64) -> Self {
        self.release_year_range = Some(YearRange { min, max });
        self
    }

    pub fn genre_contains(mut self, needle: impl Into<String>) -> Self {
        self.genre_contains = Some(needle.into());
        self
    }

    pub fn is_identity(&self) -> bool {
        self.predicates().is_empty()
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(range) = &self.release_year_range {
            range.validate()?;
        }
        Ok(())
    }

    /// Compiles the parameters into `(field, predicate)` pairs.
    pub fn predicates(&self) -> Vec<(Field, FilterPredicate)> {
        fn text(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|s| !s.is_empty())
        }

        let mut out = Vec::new();
        if let Some(needle) = text(&self.title_contains) {
            out.push((Field::Title, FilterPredicate::Contains(needle.to_string())));
        }
        if let Some(kind) = self.kind {
            out.push((Field::Kind, FilterPredicate::Equals(kind.as_str().into())));
        }
        if let Some(kinds) = self.kind_in.as_ref().filter(|k| !k.is_empty()) {
            let values = kinds.iter().map(|k| Value::from(k.as_str())).collect();
            out.push((Field::Kind, FilterPredicate::OneOf(values)));
        }
        if let Some(needle) = text(&self.country_contains) {
            out.push((Field::Country, FilterPredicate::Contains(needle.to_string())));
        }
        if let Some(countries) = self.country_in.as_ref().filter(|c| !c.is_empty()) {
            let values = countries.iter().map(|c| Value::from(c.as_str())).collect();
            out.push((Field::Country, FilterPredicate::OneOf(values)));
        }
        if let Some(rating) = text(&self.rating_equals) {
            out.push((Field::Rating, FilterPredicate::Equals(rating.into())));
        }
        if let Some(year) = self.release_year_equals {
            out.push((Field::ReleaseYear, FilterPredicate::Equals(Value::Int(year))));
        }
        if let Some(range) = self.release_year_range {
            out.push((
                Field::ReleaseYear,
                FilterPredicate::Between(Value::Int(range.min), Value::Int(range.max)),
            ));
        }
        if let Some(needle) = text(&self.genre_contains) {
            out.push((Field::ListedIn, FilterPredicate::Contains(needle.to_string())));
        }
        out
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.predicates()
            .iter()
            .all(|(field, predicate)| predicate.matches(record, field))
    }
}

/// Applies `params` to a view. The result keeps the input's relative row order.
pub fn filter<'a>(
    view: &DatasetView<'a>,
    params: &FilterParams,
) -> Result<DatasetView<'a>, CatalogError> {
    params.validate()?;
    let predicates = params.predicates();
    if predicates.is_empty() {
        return Ok(view.clone());
    }

    let records = view.dataset().records();
    let mut out = Vec::with_capacity(view.len());
    for &row in view.rows() {
        let record = &records[row];
        if predicates
            .iter()
            .all(|(field, predicate)| predicate.matches(record, field))
        {
            out.push(row);
        }
    }
    Ok(DatasetView::with_rows(view.dataset(), out))
}

/// Applies a single predicate to a view.
pub fn filter_predicate<'a>(
    view: &DatasetView<'a>,
    field: &Field,
    predicate: &FilterPredicate,
) -> DatasetView<'a> {
    let rows = view
        .rows()
        .iter()
        .copied()
        .filter(|&row| predicate.matches(&view.dataset().records()[row], field))
        .collect();
    DatasetView::with_rows(view.dataset(), rows)
}

impl Dataset {
    pub fn filter(&self, params: &FilterParams) -> Result<DatasetView<'_>, CatalogError> {
        filter(&self.view(), params)
    }
}

impl<'a> DatasetView<'a> {
    pub fn filter(&self, params: &FilterParams) -> Result<DatasetView<'a>, CatalogError> {
        filter(self, params)
    }
}
