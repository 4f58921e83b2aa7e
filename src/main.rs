use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

use catalog_processor::{
    config::AppConfig,
    loader::load_dataset,
    processor::{
        CatalogError,
        aggregate::recommend,
        dataset::Dataset,
        query_builder::{Operation, QueryCache},
        record::{Field, Kind},
        result::ResultSet,
        schema::normalize_column_name,
    },
    request::{CatalogRequest, query_pairs},
};

#[derive(Parser)]
#[command(name = "catalog", version, about = "Query a media catalog file and print JSON results")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filtered records
    Records(QueryArgs),
    /// Occurrences per value of a field, most frequent first
    Counts {
        #[arg(long, value_parser = parse_field)]
        field: Field,
        #[arg(long)]
        top: Option<usize>,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Counts per group key, optionally per secondary key
    Groups {
        #[arg(long, value_parser = parse_field)]
        by: Field,
        #[arg(long, value_parser = parse_field)]
        then: Option<Field>,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Records with the largest numeric value of a field
    Top {
        #[arg(long, value_parser = parse_field)]
        by: Field,
        #[arg(short = 'n', long, default_value_t = 10)]
        n: usize,
        #[arg(long, default_value_t = false)]
        ascending: bool,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Uniform random records
    Sample {
        #[arg(short = 'n', long, default_value_t = 5)]
        n: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Random picks narrowed by kind and genre
    Recommend {
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<Kind>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(short = 'n', long, default_value_t = 5)]
        n: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Totals, kind split, mean duration and top country
    Summary(QueryArgs),
    /// Per-year counts of the most common values of a field (genres by default)
    Trends {
        #[arg(long, value_parser = parse_field, default_value = "listed_in")]
        by: Field,
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Per-year counts of the top producing countries
    CountryTrends {
        #[arg(long, default_value_t = 3)]
        top_k: usize,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Releases per year
    Releases(QueryArgs),
    /// Sorted unique values of a field
    Distinct {
        #[arg(long, value_parser = parse_field)]
        field: Field,
        #[command(flatten)]
        query: QueryArgs,
    },
}

/// Filters and output shaping, named like the catalog API's query parameters
#[derive(Debug, Clone, Default, Args)]
struct QueryArgs {
    /// Case-insensitive title substring
    #[arg(long)]
    title: Option<String>,
    /// Movie or "TV Show"
    #[arg(long = "type")]
    kind: Option<String>,
    /// Case-insensitive country substring
    #[arg(long)]
    country: Option<String>,
    /// Exact country string (repeatable)
    #[arg(long = "country-in")]
    country_in: Vec<String>,
    /// Exact rating
    #[arg(long)]
    rating: Option<String>,
    #[arg(long)]
    release_year: Option<String>,
    #[arg(long)]
    release_year_min: Option<String>,
    #[arg(long)]
    release_year_max: Option<String>,
    /// Case-insensitive genre substring
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    offset: Option<String>,
    #[arg(long)]
    limit: Option<String>,
    /// Comma-separated output columns
    #[arg(long)]
    fields: Option<String>,
    /// Raw query string such as 'type=Movie&limit=10'; flags override it
    #[arg(long)]
    query: Option<String>,
}

impl QueryArgs {
    /// Query-string pairs first, then flags; later pairs override earlier ones.
    fn to_request(&self) -> Result<CatalogRequest, CatalogError> {
        let mut pairs = match self.query.as_deref() {
            Some(query) => query_pairs(query)?,
            None => Vec::new(),
        };
        let flags = [
            ("title", &self.title),
            ("type", &self.kind),
            ("country", &self.country),
            ("rating", &self.rating),
            ("release_year", &self.release_year),
            ("release_year_min", &self.release_year_min),
            ("release_year_max", &self.release_year_max),
            ("genre", &self.genre),
            ("offset", &self.offset),
            ("limit", &self.limit),
            ("fields", &self.fields),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                pairs.push((key.to_string(), value.clone()));
            }
        }

        let mut request = CatalogRequest::from_pairs(pairs)?;
        if !self.country_in.is_empty() {
            request.params.country_in = Some(self.country_in.clone());
        }
        Ok(request)
    }
}

fn parse_field(raw: &str) -> Result<Field, String> {
    let name = normalize_column_name(raw);
    if name.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    Ok(Field::from_name(&name))
}

fn parse_kind(raw: &str) -> Result<Kind, String> {
    raw.parse::<Kind>().map_err(|e| e.to_string())
}

fn run_query(
    dataset: &Dataset,
    cache: &Rc<QueryCache>,
    query: &QueryArgs,
    operation: Operation,
) -> Result<ResultSet, CatalogError> {
    let request = query.to_request()?;
    dataset
        .query_with_cache(cache)
        .filter(request.params)
        .page(request.page)
        .projection(request.projection)
        .operation(operation)
        .execute()
}

fn run(cli: Cli) -> Result<(), CatalogError> {
    let source = cli.config.source(Path::new("."))?;
    let (dataset, summary) = load_dataset(&source)?;
    info!(
        "Catalog ready: {} rows from {} ({} malformed cells)",
        summary.rows_processed,
        source.display(),
        summary.errors.len()
    );

    let cache = Rc::new(QueryCache::with_capacity(cli.config.cache_size));
    let result = match &cli.command {
        Command::Records(query) => run_query(&dataset, &cache, query, Operation::Records)?,
        Command::Counts { field, top, query } => run_query(
            &dataset,
            &cache,
            query,
            Operation::ValueCounts {
                field: field.clone(),
                top_n: *top,
            },
        )?,
        Command::Groups { by, then, query } => run_query(
            &dataset,
            &cache,
            query,
            Operation::GroupCount {
                group: by.clone(),
                secondary: then.clone(),
            },
        )?,
        Command::Top {
            by,
            n,
            ascending,
            query,
        } => run_query(
            &dataset,
            &cache,
            query,
            Operation::TopNBy {
                field: by.clone(),
                n: *n,
                descending: !ascending,
            },
        )?,
        Command::Sample { n, seed, query } => {
            run_query(&dataset, &cache, query, Operation::Sample { n: *n, seed: *seed })?
        }
        Command::Recommend {
            kind,
            genre,
            n,
            seed,
        } => {
            let picks = recommend(&dataset.view(), *kind, genre.as_deref(), *n, *seed)?;
            ResultSet::from_records(&dataset, picks)
        }
        Command::Summary(query) => run_query(&dataset, &cache, query, Operation::Summary)?,
        Command::Trends { by, top_k, query } => run_query(
            &dataset,
            &cache,
            query,
            Operation::Trends {
                field: by.clone(),
                top_k: *top_k,
            },
        )?,
        Command::CountryTrends { top_k, query } => run_query(
            &dataset,
            &cache,
            query,
            Operation::Trends {
                field: Field::Country,
                top_k: *top_k,
            },
        )?,
        Command::Releases(query) => run_query(&dataset, &cache, query, Operation::ReleasesByYear)?,
        Command::Distinct { field, query } => run_query(
            &dataset,
            &cache,
            query,
            Operation::Distinct {
                field: field.clone(),
            },
        )?,
    };

    println!("{}", result.to_json_string(cli.config.pretty)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.config.init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
