use serde::{Deserialize, Serialize};

use crate::processor::{dataset::DatasetView, record::Field, schema::normalize_column_name};

/// Row window: `[offset, offset + limit)`, `limit = None` meaning "to the end"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Page { offset, limit }
    }

    /// Index range of this page inside a sequence of `len` items.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let start = self.offset.min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(len),
            None => len,
        };
        (start, end)
    }
}

/// Slices a view. An offset past the end gives an empty view.
pub fn paginate<'a>(view: &DatasetView<'a>, offset: usize, limit: Option<usize>) -> DatasetView<'a> {
    let (start, end) = Page::new(offset, limit).bounds(view.len());
    DatasetView::with_rows(view.dataset(), view.rows()[start..end].to_vec())
}

impl<'a> DatasetView<'a> {
    pub fn paginate(&self, page: Page) -> DatasetView<'a> {
        paginate(self, page.offset, page.limit)
    }
}

/// Requested output columns, by name.
///
/// Names are normalized like headers and aliases resolve (`type` selects
/// `kind`). Names that match no available column are dropped without error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Projection {
    names: Vec<String>,
}

impl Projection {
    /// Every column.
    pub fn all() -> Self {
        Projection::default()
    }

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Projection {
            names: names
                .into_iter()
                .map(|n| Field::from_name(&normalize_column_name(n.as_ref())).name().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    /// Selected columns in request order, restricted to `available`.
    pub fn resolve(&self, available: &[String]) -> Vec<String> {
        if self.is_all() {
            return available.to_vec();
        }
        let mut out: Vec<String> = Vec::with_capacity(self.names.len());
        for name in &self.names {
            if available.contains(name) && !out.contains(name) {
                out.push(name.clone());
            }
        }
        out
    }
}
