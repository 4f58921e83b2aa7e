//! Aggregation engine: stateless functions over a [`DatasetView`].
//!
//! A field the dataset does not carry degrades to an empty result, as does an
//! empty view. None of these functions fail on data.

use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::index};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    helpers::text::split_multi_value,
    processor::{
        CatalogError, Value,
        dataset::DatasetView,
        filter::{FilterParams, FilterPredicate, filter_predicate},
        record::{Field, Kind, Record},
    },
};

/// One `(value, count)` pair of [`value_counts`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
}

/// One row of [`group_count`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub key: Value,
    pub secondary: Option<Value>,
    pub count: usize,
}

/// Dashboard KPIs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub movies: usize,
    pub tv_shows: usize,
    /// Mean of the numeric part of `duration`, over rows that have one
    pub avg_duration: Option<f64>,
    /// Most frequent raw `country` value
    pub top_country: Option<String>,
    pub top_country_count: usize,
}

/// Values a record contributes for `field`: one per split element for
/// multi-valued fields, otherwise at most one.
fn elements(record: &Record, field: &Field) -> Vec<Value> {
    if field.is_multi_valued() {
        record
            .text(field)
            .map(|raw| split_multi_value(raw).map(Value::from).collect())
            .unwrap_or_default()
    } else {
        record.value(field).into_iter().collect()
    }
}

/// Counts per value, descending by count. Ties keep first-seen order.
pub fn value_counts(view: &DatasetView<'_>, field: &Field, top_n: Option<usize>) -> Vec<ValueCount> {
    let mut counts = count_by(view, |record| elements(record, field));
    if let Some(n) = top_n {
        counts.truncate(n);
    }
    counts
}

fn count_by<F>(view: &DatasetView<'_>, mut values_of: F) -> Vec<ValueCount>
where
    F: FnMut(&Record) -> Vec<Value>,
{
    let mut index: HashMap<Value, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for record in view.iter() {
        for value in values_of(record) {
            match index.get(&value) {
                Some(&pos) => counts[pos].count += 1,
                None => {
                    index.insert(value.clone(), counts.len());
                    counts.push(ValueCount { value, count: 1 });
                }
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Counts per group key, optionally broken down by a secondary field.
///
/// Multi-valued fields contribute one key per element. Rows whose group (or
/// requested secondary) value is null are skipped. Output is ordered by group
/// key, then secondary key.
pub fn group_count(
    view: &DatasetView<'_>,
    group: &Field,
    secondary: Option<&Field>,
) -> Vec<GroupCount> {
    let mut groups: BTreeMap<(Value, Option<Value>), usize> = BTreeMap::new();

    for record in view.iter() {
        let keys = elements(record, group);
        if keys.is_empty() {
            continue;
        }
        match secondary {
            None => {
                for key in keys {
                    *groups.entry((key, None)).or_insert(0) += 1;
                }
            }
            Some(field) => {
                let seconds = elements(record, field);
                for key in &keys {
                    for second in &seconds {
                        *groups
                            .entry((key.clone(), Some(second.clone())))
                            .or_insert(0) += 1;
                    }
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|((key, secondary), count)| GroupCount {
            key,
            secondary,
            count,
        })
        .collect()
}

/// Per-row numeric reading of `field`, aligned with the view's rows.
pub fn numeric_extract(view: &DatasetView<'_>, field: &Field) -> Vec<Option<f64>> {
    view.iter().map(|record| record.number(field)).collect()
}

/// The `n` records with the largest (or smallest) numeric value of `field`.
/// Null values sort last in both directions; equal values keep view order.
pub fn top_n_by<'a>(
    view: &DatasetView<'a>,
    field: &Field,
    n: usize,
    descending: bool,
) -> Vec<&'a Record> {
    let mut keyed: Vec<(&'a Record, Option<f64>)> =
        view.iter().map(|r| (r, r.number(field))).collect();

    keyed.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(a),
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    keyed.into_iter().take(n).map(|(r, _)| r).collect()
}

/// Uniform selection of `min(n, len)` records without replacement.
///
/// With a seed the selection is reproducible; without one it draws from the
/// thread-local generator.
pub fn sample<'a>(view: &DatasetView<'a>, n: usize, seed: Option<u64>) -> Vec<&'a Record> {
    match seed {
        Some(seed) => sample_with(view, n, &mut StdRng::seed_from_u64(seed)),
        None => sample_with(view, n, &mut rand::rng()),
    }
}

/// [`sample`] with a caller-supplied generator.
pub fn sample_with<'a, R: Rng + ?Sized>(
    view: &DatasetView<'a>,
    n: usize,
    rng: &mut R,
) -> Vec<&'a Record> {
    let amount = n.min(view.len());
    if amount == 0 {
        return Vec::new();
    }
    let records = view.dataset().records();
    index::sample(rng, view.len(), amount)
        .into_iter()
        .map(|i| &records[view.rows()[i]])
        .collect()
}

/// Dashboard KPIs over a view.
pub fn summary(view: &DatasetView<'_>) -> CatalogSummary {
    let mut movies = 0;
    let mut tv_shows = 0;
    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;

    for record in view.iter() {
        match record.kind {
            Some(Kind::Movie) => movies += 1,
            Some(Kind::TvShow) => tv_shows += 1,
            None => {}
        }
        if let Some(minutes) = record.number(&Field::Duration) {
            duration_sum += minutes;
            duration_count += 1;
        }
    }

    // whole country strings, not split elements; ties go to the smallest value
    let country_counts = count_by(view, |record| record.value(&Field::Country).into_iter().collect());
    let top_country = country_counts
        .iter()
        .take_while(|vc| vc.count == country_counts[0].count)
        .min_by(|a, b| a.value.cmp(&b.value))
        .cloned();

    CatalogSummary {
        total: view.len(),
        movies,
        tv_shows,
        avg_duration: (duration_count > 0).then(|| duration_sum / duration_count as f64),
        top_country_count: top_country.as_ref().map_or(0, |vc| vc.count),
        top_country: top_country.map(|vc| vc.value.to_string()),
    }
}

/// Sorted distinct values of `field`; multi-valued fields are split first.
pub fn distinct_values(view: &DatasetView<'_>, field: &Field) -> Vec<Value> {
    let set: BTreeSet<Value> = view.iter().flat_map(|r| elements(r, field)).collect();
    set.into_iter().collect()
}

/// Releases per year, ordered by year.
pub fn releases_by_year(view: &DatasetView<'_>) -> Vec<GroupCount> {
    group_count(view, &Field::ReleaseYear, None)
}

/// Per-year counts of `field` restricted to its `top_k` values, ranked by
/// total count over rows that have a release year. Multi-valued fields are
/// split first. Ordered by year, then value.
pub fn top_k_trends(view: &DatasetView<'_>, field: &Field, top_k: usize) -> Vec<GroupCount> {
    let dated = filter_predicate(
        view,
        &Field::ReleaseYear,
        &FilterPredicate::Between(Value::Int(i64::MIN), Value::Int(i64::MAX)),
    );
    let top: Vec<Value> = value_counts(&dated, field, Some(top_k))
        .into_iter()
        .map(|vc| vc.value)
        .collect();
    debug!("Trends of '{field}' over {} dated rows, top values {:?}", dated.len(), top);

    group_count(&dated, &Field::ReleaseYear, Some(field))
        .into_iter()
        .filter(|g| g.secondary.as_ref().is_some_and(|s| top.contains(s)))
        .collect()
}

/// [`top_k_trends`] over `listed_in`.
pub fn genre_trends(view: &DatasetView<'_>, top_k: usize) -> Vec<GroupCount> {
    top_k_trends(view, &Field::ListedIn, top_k)
}

/// [`top_k_trends`] over the split `country` values: the producing-countries chart.
pub fn country_trends(view: &DatasetView<'_>, top_k: usize) -> Vec<GroupCount> {
    top_k_trends(view, &Field::Country, top_k)
}

/// The recommendation browser: optional kind and genre narrowing, then a
/// uniform [`sample`]. This is not a similarity model.
pub fn recommend<'a>(
    view: &DatasetView<'a>,
    kind: Option<Kind>,
    genre: Option<&str>,
    n: usize,
    seed: Option<u64>,
) -> Result<Vec<&'a Record>, CatalogError> {
    let mut params = FilterParams::new();
    params.kind = kind;
    params.genre_contains = genre.map(str::to_string);
    let narrowed = view.filter(&params)?;
    Ok(sample(&narrowed, n, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::dataset::Dataset;
    use pretty_assertions::assert_eq;

    fn entry(title: &str, kind: Kind, country: Option<&str>, year: Option<i64>) -> Record {
        let mut r = Record::new(title);
        r.title = Some(title.into());
        r.kind = Some(kind);
        r.country = country.map(Into::into);
        r.release_year = year;
        r
    }

    fn catalog() -> Dataset {
        let mut a = entry("A", Kind::Movie, Some("India"), Some(2020));
        a.listed_in = Some("Dramas, Comedies".into());
        a.duration = Some("90 min".into());
        let mut b = entry("B", Kind::TvShow, Some("USA, India"), Some(2019));
        b.listed_in = Some("Comedies".into());
        b.duration = Some("2 Seasons".into());
        let mut c = entry("C", Kind::Movie, Some("India"), None);
        c.listed_in = Some("Thrillers, Dramas, ".into());
        c.duration = Some("N/A".into());
        Dataset::from_records(vec![a, b, c])
    }

    fn counts(items: &[ValueCount]) -> Vec<(String, usize)> {
        items.iter().map(|vc| (vc.value.to_string(), vc.count)).collect()
    }

    #[test]
    fn test_value_counts_ties_keep_first_seen_order() {
        let dataset = Dataset::from_records(vec![
            entry("A", Kind::Movie, None, None),
            entry("B", Kind::TvShow, None, None),
        ]);
        let result = value_counts(&dataset.view(), &Field::Kind, None);
        assert_eq!(
            counts(&result),
            vec![("Movie".to_string(), 1), ("TV Show".to_string(), 1)]
        );
    }

    #[test]
    fn test_value_counts_splits_multi_valued_fields() {
        let dataset = catalog();
        let result = value_counts(&dataset.view(), &Field::ListedIn, None);
        assert_eq!(
            counts(&result),
            vec![
                ("Dramas".to_string(), 2),
                ("Comedies".to_string(), 2),
                ("Thrillers".to_string(), 1),
            ]
        );
        assert_eq!(result.iter().map(|vc| vc.count).sum::<usize>(), 5);

        let top = value_counts(&dataset.view(), &Field::Country, Some(1));
        assert_eq!(counts(&top), vec![("India".to_string(), 3)]);
    }

    #[test]
    fn test_missing_field_and_empty_view_yield_no_data() {
        let dataset = catalog();
        assert!(value_counts(&dataset.view(), &Field::Other("budget".into()), None).is_empty());
        assert!(group_count(&dataset.view(), &Field::Director, None).is_empty());

        let empty = Dataset::default();
        assert!(value_counts(&empty.view(), &Field::Kind, None).is_empty());
        assert!(top_n_by(&empty.view(), &Field::ReleaseYear, 3, true).is_empty());
        assert!(sample(&empty.view(), 3, Some(1)).is_empty());
        assert_eq!(summary(&empty.view()).avg_duration, None);
    }

    #[test]
    fn test_group_count_with_secondary() {
        let dataset = catalog();
        let groups = group_count(&dataset.view(), &Field::ReleaseYear, Some(&Field::ListedIn));
        let flat: Vec<(String, String, usize)> = groups
            .iter()
            .map(|g| {
                (
                    g.key.to_string(),
                    g.secondary.as_ref().map(ToString::to_string).unwrap_or_default(),
                    g.count,
                )
            })
            .collect();
        assert_eq!(
            flat,
            vec![
                ("2019".to_string(), "Comedies".to_string(), 1),
                ("2020".to_string(), "Comedies".to_string(), 1),
                ("2020".to_string(), "Dramas".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_numeric_extract_and_top_n() {
        let dataset = catalog();
        assert_eq!(
            numeric_extract(&dataset.view(), &Field::Duration),
            vec![Some(90.0), Some(2.0), None]
        );

        let newest = top_n_by(&dataset.view(), &Field::ReleaseYear, 3, true);
        let titles: Vec<_> = newest.iter().map(|r| r.title.as_deref()).collect();
        assert_eq!(titles, vec![Some("A"), Some("B"), Some("C")]);

        let oldest = top_n_by(&dataset.view(), &Field::ReleaseYear, 3, false);
        let titles: Vec<_> = oldest.iter().map(|r| r.title.as_deref()).collect();
        assert_eq!(titles, vec![Some("B"), Some("A"), Some("C")]);
    }

    #[test]
    fn test_seeded_sample_is_reproducible() {
        let dataset = catalog();
        let first: Vec<_> = sample(&dataset.view(), 2, Some(42)).iter().map(|r| r.id.clone()).collect();
        let second: Vec<_> = sample(&dataset.view(), 2, Some(42)).iter().map(|r| r.id.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_ne!(first[0], first[1]);
        assert_eq!(sample(&dataset.view(), 10, None).len(), 3);
    }

    #[test]
    fn test_summary_kpis() {
        let dataset = catalog();
        let kpis = summary(&dataset.view());
        assert_eq!(kpis.total, 3);
        assert_eq!(kpis.movies, 2);
        assert_eq!(kpis.tv_shows, 1);
        assert_eq!(kpis.avg_duration, Some(46.0));
        assert_eq!(kpis.top_country.as_deref(), Some("India"));
        assert_eq!(kpis.top_country_count, 2);
    }

    #[test]
    fn test_distinct_and_trends() {
        let dataset = catalog();
        let genres = distinct_values(&dataset.view(), &Field::ListedIn);
        assert_eq!(
            genres,
            vec![Value::from("Comedies"), Value::from("Dramas"), Value::from("Thrillers")]
        );

        let years = releases_by_year(&dataset.view());
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].key, Value::Int(2019));

        let trends = genre_trends(&dataset.view(), 1);
        assert!(trends.iter().all(|g| g.secondary == Some(Value::from("Comedies"))));
        assert_eq!(trends.len(), 2);
    }

    #[test]
    fn test_country_trends_split_and_keep_top_values() {
        let dataset = catalog();
        let trends = country_trends(&dataset.view(), 1);
        assert_eq!(
            trends,
            vec![
                GroupCount { key: Value::Int(2019), secondary: Some(Value::from("India")), count: 1 },
                GroupCount { key: Value::Int(2020), secondary: Some(Value::from("India")), count: 1 },
            ]
        );
        assert_eq!(top_k_trends(&dataset.view(), &Field::ListedIn, 1), genre_trends(&dataset.view(), 1));
    }

    #[test]
    fn test_summary_top_country_tie_takes_smallest_value() {
        let dataset = Dataset::from_records(vec![
            entry("A", Kind::Movie, Some("Spain"), None),
            entry("B", Kind::Movie, Some("Japan"), None),
            entry("C", Kind::Movie, Some("Spain"), None),
            entry("D", Kind::Movie, Some("Japan"), None),
            entry("E", Kind::Movie, Some("Zambia"), None),
        ]);
        let kpis = summary(&dataset.view());
        assert_eq!(kpis.top_country.as_deref(), Some("Japan"));
        assert_eq!(kpis.top_country_count, 2);
        assert_eq!(summary(&Dataset::default().view()).top_country, None);
    }

    #[test]
    fn test_recommend_narrows_before_sampling() {
        let dataset = catalog();
        let picks = recommend(&dataset.view(), Some(Kind::Movie), Some("dramas"), 5, Some(7)).unwrap();
        let mut titles: Vec<_> = picks.iter().filter_map(|r| r.title.as_deref()).collect();
        titles.sort();
        assert_eq!(titles, vec!["A", "C"]);
    }
}
