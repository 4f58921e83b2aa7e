use std::fmt;

use crate::processor::record::{Field, Record};

/// Normalized catalog, immutable once built.
///
/// Row order is the source order. Views produced by filtering and pagination
/// borrow the dataset and only carry row indices.
///
/// # Examples
///
/// ```rust
/// # use catalog_processor::processor::{record::Record, dataset::Dataset};
/// let dataset = Dataset::from_records(vec![Record::new("1"), Record::new("2")]);
/// assert_eq!(dataset.view().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    columns: Vec<Field>,
    extra_columns: Vec<String>,
}

impl Dataset {
    pub(crate) fn new(records: Vec<Record>, columns: Vec<Field>, extra_columns: Vec<String>) -> Self {
        Dataset {
            records,
            columns,
            extra_columns,
        }
    }

    /// Builds a dataset from records that are already canonical.
    /// All logical columns are reported as present.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut extra_columns: Vec<String> = Vec::new();
        for record in &records {
            for name in record.extra.keys() {
                if !extra_columns.contains(name) {
                    extra_columns.push(name.clone());
                }
            }
        }
        let columns = Field::LOGICAL
            .iter()
            .cloned()
            .chain(extra_columns.iter().cloned().map(Field::Other))
            .collect();
        Dataset::new(records, columns, extra_columns)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    /// Columns present in the source, in source order.
    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    pub fn has_column(&self, field: &Field) -> bool {
        self.columns.contains(field)
    }

    /// Pass-through columns, in source order.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// View over every row.
    pub fn view(&self) -> DatasetView<'_> {
        DatasetView {
            dataset: self,
            rows: (0..self.records.len()).collect(),
        }
    }
}

/// Ordered subset of a [`Dataset`]'s rows.
///
/// Row indices are strictly increasing for views produced by filtering and
/// pagination; sampling and ranking produce record sequences instead.
#[derive(Clone)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    pub(crate) fn with_rows(dataset: &'a Dataset, rows: Vec<usize>) -> Self {
        DatasetView { dataset, rows }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Source row indices of this view.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.rows.iter().map(move |&i| &records[i])
    }

    pub fn records(&self) -> Vec<&'a Record> {
        self.iter().collect()
    }

    /// Title of every row, for compact assertions and logs.
    pub fn titles(&self) -> Vec<Option<&'a str>> {
        self.iter().map(|r| r.title.as_deref()).collect()
    }
}

impl PartialEq for DatasetView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dataset, other.dataset) && self.rows == other.rows
    }
}

impl fmt::Debug for DatasetView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetView")
            .field("rows", &self.rows)
            .field("of", &self.dataset.len())
            .finish()
    }
}
