use clap::{ArgAction, Args};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use crate::loader::{default_candidates, resolve_source};
use crate::processor::{CatalogError, query_builder::DEFAULT_CACHE_CAPACITY};

/// Settings shared by every `catalog` subcommand
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Catalog file (.csv or .xlsx). Defaults to netflix_titles.csv, then netflix_titles.xlsx.
    #[arg(long, global = true, env = "CATALOG_DATA", value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Indent JSON output
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Entries kept in the query result memo. A single `catalog` run executes
    /// one query, so this only pays off for library callers that reuse the memo.
    #[arg(long, global = true, env = "CATALOG_CACHE_SIZE", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data: None,
            pretty: false,
            verbose: 0,
            quiet: false,
            cache_size: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Level forced by the flags; `None` leaves `RUST_LOG` in charge.
    pub fn log_level(&self) -> Option<LevelFilter> {
        if self.quiet {
            return Some(LevelFilter::Error);
        }
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }

    /// Installs the `env_logger` backend. Safe to call more than once.
    pub fn init_logging(&self) {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        if let Some(level) = self.log_level() {
            builder.filter_level(level);
        }
        let _ = builder.try_init();
    }

    /// The file to load: `--data` when given, otherwise the default candidates
    /// relative to `base`.
    pub fn source(&self, base: &Path) -> Result<PathBuf, CatalogError> {
        let candidates: Vec<PathBuf> = default_candidates().into_iter().map(|c| base.join(c)).collect();
        resolve_source(self.data.as_deref(), &candidates)
    }
}
