//! Query-string adapter. Converts the catalog API's string parameters into
//! typed filter, page and projection values before they reach the core.

use log::debug;
use std::str::FromStr;

use crate::processor::{
    CatalogError,
    filter::{FilterParams, YearRange},
    paginate::{Page, Projection},
    record::Kind,
};

/// A parsed listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRequest {
    pub params: FilterParams,
    pub page: Page,
    pub projection: Projection,
}

impl CatalogRequest {
    /// Builds a request from `(key, value)` pairs.
    ///
    /// Empty values are treated as absent and unrecognized keys are skipped.
    /// A single year bound leaves the other side open.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = CatalogRequest::default();
        let mut year_min = None;
        let mut year_max = None;

        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "title" => request.params.title_contains = Some(value.to_string()),
                "type" | "kind" => request.params.kind = Some(Kind::from_str(value)?),
                "country" => request.params.country_contains = Some(value.to_string()),
                "rating" => request.params.rating_equals = Some(value.to_string()),
                "genre" | "listed_in" => request.params.genre_contains = Some(value.to_string()),
                "release_year" => request.params.release_year_equals = Some(parse_int(key, value)?),
                "release_year_min" => year_min = Some(parse_int(key, value)?),
                "release_year_max" => year_max = Some(parse_int(key, value)?),
                "offset" => request.page.offset = parse_int(key, value)?,
                "limit" => request.page.limit = Some(parse_int(key, value)?),
                "fields" => request.projection = Projection::new(value.split(',')),
                other => debug!("Ignoring unknown request parameter '{other}'"),
            }
        }

        if year_min.is_some() || year_max.is_some() {
            let range = YearRange::new(year_min.unwrap_or(i64::MIN), year_max.unwrap_or(i64::MAX))?;
            request.params.release_year_range = Some(range);
        }
        Ok(request)
    }

    /// Parses a raw query string such as `type=Movie&country=United%20States`.
    pub fn from_query(query: &str) -> Result<Self, CatalogError> {
        Self::from_pairs(query_pairs(query)?)
    }
}

/// Splits an `application/x-www-form-urlencoded` query into decoded
/// `(key, value)` pairs. `+` is a space and `%XX` escapes are decoded.
pub fn query_pairs(query: &str) -> Result<Vec<(String, String)>, CatalogError> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> Result<String, CatalogError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CatalogError::InvalidParameter(format!("'{raw}' is not valid UTF-8 once decoded")))
}

fn parse_int<T: FromStr>(key: &str, value: &str) -> Result<T, CatalogError> {
    value
        .parse()
        .map_err(|_| CatalogError::InvalidParameter(format!("'{key}' expects an integer, got '{value}'")))
}
