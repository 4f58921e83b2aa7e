use clap::Parser;
use csv::Writer;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::path::PathBuf;

const COUNTRIES: [&str; 8] = [
    "United States",
    "India",
    "United Kingdom",
    "Japan",
    "South Korea",
    "Spain",
    "France",
    "Nigeria",
];
const GENRES: [&str; 8] = [
    "Dramas",
    "Comedies",
    "Documentaries",
    "International TV Shows",
    "Action & Adventure",
    "Kids' TV",
    "Thrillers",
    "Romantic Movies",
];
const RATINGS: [&str; 6] = ["G", "PG", "PG-13", "R", "TV-MA", "TV-14"];
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Writes a synthetic catalog CSV with the standard column layout
#[derive(Parser)]
struct Opts {
    /// Output file
    #[arg(long, default_value = "data/catalog_100k.csv")]
    out: PathBuf,
    /// Number of titles
    #[arg(long, default_value_t = 100_000)]
    rows: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn pick_many<'a, R: Rng>(rng: &mut R, pool: &[&'a str], max: usize) -> Vec<&'a str> {
    let count = rng.random_range(1..=max);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let candidate = pool[rng.random_range(0..pool.len())];
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();
    if let Some(parent) = opts.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = Writer::from_path(&opts.out)?;
    writer.write_record([
        "show_id",
        "type",
        "title",
        "director",
        "cast",
        "country",
        "date_added",
        "release_year",
        "rating",
        "duration",
        "listed_in",
        "description",
    ])?;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    for i in 0..opts.rows {
        let movie = rng.random_bool(0.7);
        let year: i64 = rng.random_range(1950..=2021);
        let duration = if movie {
            format!("{} min", rng.random_range(60..=180))
        } else {
            let seasons = rng.random_range(1..=8);
            format!("{seasons} Season{}", if seasons > 1 { "s" } else { "" })
        };
        // some cells stay empty, like the real export
        let country = if rng.random_bool(0.9) {
            pick_many(&mut rng, &COUNTRIES, 3).join(", ")
        } else {
            String::new()
        };
        let director = if rng.random_bool(0.7) {
            format!("Director {}", rng.random_range(0..2_000))
        } else {
            String::new()
        };
        let date_added = format!(
            "{} {}, {}",
            MONTHS[rng.random_range(0..12)],
            rng.random_range(1..=28),
            rng.random_range(year.max(2008)..=2021)
        );

        writer.write_record([
            format!("s{}", i + 1),
            if movie { "Movie" } else { "TV Show" }.to_string(),
            format!("Title {i}"),
            director,
            format!("Actor {}, Actor {}", rng.random_range(0..5_000), rng.random_range(0..5_000)),
            country,
            date_added,
            year.to_string(),
            RATINGS[rng.random_range(0..RATINGS.len())].to_string(),
            duration,
            pick_many(&mut rng, &GENRES, 3).join(", "),
            format!("Synthetic description for title {i}."),
        ])?;
    }
    writer.flush()?;

    println!("Sample catalog generated: {}", opts.out.display());
    Ok(())
}
