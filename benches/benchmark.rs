use catalog_processor::{
    loader::csv_reader::load_csv_reader,
    processor::{
        dataset::Dataset,
        filter::FilterParams,
        query_builder::QueryCache,
        record::{Field, Kind},
        schema::normalize,
    },
};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::fmt::Write;
use std::rc::Rc;

const ROWS: usize = 50_000;
const COUNTRIES: [&str; 5] = ["United States", "India", "Japan", "Spain", "Nigeria"];
const GENRES: [&str; 5] = ["Dramas", "Comedies", "Documentaries", "Thrillers", "Kids' TV"];

fn catalog_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::from("show_id,type,title,country,release_year,rating,duration,listed_in\n");
    for i in 0..rows {
        let movie = rng.random_bool(0.7);
        let _ = writeln!(
            out,
            "s{i},{},Title {i},\"{}, {}\",{},PG-13,{},\"{}, {}\"",
            if movie { "Movie" } else { "TV Show" },
            COUNTRIES[rng.random_range(0..5)],
            COUNTRIES[rng.random_range(0..5)],
            rng.random_range(1980..=2021),
            if movie { "95 min" } else { "2 Seasons" },
            GENRES[rng.random_range(0..5)],
            GENRES[rng.random_range(0..5)],
        );
    }
    out
}

fn load(csv: &str) -> Dataset {
    normalize(load_csv_reader(csv.as_bytes()).unwrap()).unwrap()
}

fn catalog_queries(c: &mut Criterion) {
    let csv = catalog_csv(ROWS, 42);
    let dataset = load(&csv);

    let mut group = c.benchmark_group("CatalogProcessor");
    group.sample_size(20);
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function("load_and_normalize", |b| b.iter(|| load(black_box(&csv))));

    let params = FilterParams::new()
        .kind(Kind::Movie)
        .country_contains("india")
        .release_year_range(2000, 2020);
    group.bench_function("filter_combined", |b| {
        b.iter(|| dataset.filter(black_box(&params)).unwrap())
    });

    group.bench_function("value_counts_country", |b| {
        b.iter(|| {
            dataset
                .query()
                .value_counts(Field::Country, Some(10))
                .execute()
                .unwrap()
        })
    });

    group.bench_function("group_count_year_genre", |b| {
        b.iter(|| {
            dataset
                .query()
                .group_count(Field::ReleaseYear, Some(Field::ListedIn))
                .execute()
                .unwrap()
        })
    });

    group.bench_function("records_page", |b| {
        b.iter(|| {
            dataset
                .query()
                .filter(params.clone())
                .offset(10)
                .limit(20)
                .execute()
                .unwrap()
        })
    });

    group.bench_function("value_counts_country_cached", |b| {
        let cache = Rc::new(QueryCache::new());
        b.iter(|| {
            dataset
                .query_with_cache(&cache)
                .value_counts(Field::Country, Some(10))
                .execute()
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, catalog_queries);
criterion_main!(benches);
