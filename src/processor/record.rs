use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{
    helpers::text::extract_number,
    processor::{CatalogError, Value},
};

/// Content type of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Movie => "Movie",
            Kind::TvShow => "TV Show",
        }
    }

    /// Lenient parse used at ingestion: case, spacing and `_`/`-` are ignored.
    pub fn parse(raw: &str) -> Option<Kind> {
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "movie" => Some(Kind::Movie),
            "tvshow" => Some(Kind::TvShow),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::parse(s).ok_or_else(|| {
            CatalogError::InvalidParameter(format!(
                "unknown kind '{s}', expected 'Movie' or 'TV Show'"
            ))
        })
    }
}

/// Logical catalog field, addressed by its normalized column name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Kind,
    Director,
    Cast,
    Country,
    DateAdded,
    ReleaseYear,
    Rating,
    Duration,
    ListedIn,
    Description,
    /// Pass-through column that is not part of the logical schema
    Other(String),
}

impl Field {
    /// Logical fields in output order.
    pub const LOGICAL: [Field; 12] = [
        Field::Id,
        Field::Kind,
        Field::Title,
        Field::Director,
        Field::Cast,
        Field::Country,
        Field::DateAdded,
        Field::ReleaseYear,
        Field::Rating,
        Field::Duration,
        Field::ListedIn,
        Field::Description,
    ];

    /// Resolves an already-normalized column name. `type` and `show_id` are
    /// accepted as the source dataset's names for `kind` and `id`.
    pub fn from_name(name: &str) -> Field {
        match name {
            "id" | "show_id" => Field::Id,
            "title" => Field::Title,
            "kind" | "type" => Field::Kind,
            "director" => Field::Director,
            "cast" => Field::Cast,
            "country" => Field::Country,
            "date_added" => Field::DateAdded,
            "release_year" => Field::ReleaseYear,
            "rating" => Field::Rating,
            "duration" => Field::Duration,
            "listed_in" => Field::ListedIn,
            "description" => Field::Description,
            other => Field::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Kind => "kind",
            Field::Director => "director",
            Field::Cast => "cast",
            Field::Country => "country",
            Field::DateAdded => "date_added",
            Field::ReleaseYear => "release_year",
            Field::Rating => "rating",
            Field::Duration => "duration",
            Field::ListedIn => "listed_in",
            Field::Description => "description",
            Field::Other(name) => name,
        }
    }

    /// Fields stored as `", "`-delimited lists.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Field::Country | Field::ListedIn | Field::Cast)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One catalog entry.
///
/// Every field except `id` is optional. Accessors never substitute defaults:
/// an absent value is `None` for every field, including `release_year`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub id: String,
    pub title: Option<String>,
    pub kind: Option<Kind>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<i64>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
    /// Non-null pass-through columns keyed by normalized name
    pub extra: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Borrowed text of a field. `kind` yields its display form; `release_year`
    /// has no borrowed text form, use [`Record::value`].
    pub fn text(&self, field: &Field) -> Option<&str> {
        match field {
            Field::Id => Some(self.id.as_str()),
            Field::Title => self.title.as_deref(),
            Field::Kind => self.kind.map(|k| k.as_str()),
            Field::Director => self.director.as_deref(),
            Field::Cast => self.cast.as_deref(),
            Field::Country => self.country.as_deref(),
            Field::DateAdded => self.date_added.as_deref(),
            Field::ReleaseYear => None,
            Field::Rating => self.rating.as_deref(),
            Field::Duration => self.duration.as_deref(),
            Field::ListedIn => self.listed_in.as_deref(),
            Field::Description => self.description.as_deref(),
            Field::Other(name) => self.extra.get(name).map(String::as_str),
        }
    }

    /// Typed value of a field, `None` when absent.
    pub fn value(&self, field: &Field) -> Option<Value> {
        match field {
            Field::ReleaseYear => self.release_year.map(Value::Int),
            other => self.text(other).map(Value::from),
        }
    }

    /// Numeric reading of a field: the integer for `release_year`, otherwise
    /// the first digit run of the text.
    pub fn number(&self, field: &Field) -> Option<f64> {
        match field {
            Field::ReleaseYear => self.release_year.map(|y| y as f64),
            other => self.text(other).and_then(extract_number),
        }
    }
}
