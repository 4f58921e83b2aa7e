//! Result assembly: homogeneous, ordered key-value rows ready for serialization.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value as Json};

use crate::processor::{
    CatalogError, Value,
    aggregate::{CatalogSummary, GroupCount, ValueCount},
    dataset::{Dataset, DatasetView},
    paginate::{Page, Projection},
    record::{Field, Record},
};

/// Tabular result with a fixed column list.
///
/// Every row has exactly one cell per column; missing values are `null`.
/// Serializes as a JSON array of objects whose keys follow column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Json>>,
}

fn to_json(value: Option<Value>) -> Json {
    match value {
        None => Json::Null,
        Some(Value::Int(v)) => Json::from(v),
        Some(Value::Float(v)) => Number::from_f64(v).map(Json::Number).unwrap_or(Json::Null),
        Some(Value::Str(v)) => Json::String(v),
    }
}

/// Output columns for full records: the logical schema, then the dataset's
/// pass-through columns.
pub fn record_columns(dataset: &Dataset) -> Vec<String> {
    Field::LOGICAL
        .iter()
        .map(|f| f.name().to_string())
        .chain(dataset.extra_columns().iter().cloned())
        .collect()
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        ResultSet {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Json>) {
        row.resize(self.columns.len(), Json::Null);
        self.rows.push(row);
    }

    pub fn from_records<'r, I>(dataset: &Dataset, records: I) -> Self
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let columns = record_columns(dataset);
        let fields: Vec<Field> = columns.iter().map(|c| Field::from_name(c)).collect();
        let mut out = ResultSet::new(columns);
        for record in records {
            let row = fields.iter().map(|f| to_json(record.value(f))).collect();
            out.rows.push(row);
        }
        out
    }

    pub fn from_view(view: &DatasetView<'_>) -> Self {
        ResultSet::from_records(view.dataset(), view.iter())
    }

    pub fn from_value_counts(field: &Field, counts: &[ValueCount]) -> Self {
        let mut out = ResultSet::new(vec![field.name().to_string(), "count".to_string()]);
        for vc in counts {
            out.rows
                .push(vec![to_json(Some(vc.value.clone())), Json::from(vc.count)]);
        }
        out
    }

    pub fn from_group_counts(group: &Field, secondary: Option<&Field>, groups: &[GroupCount]) -> Self {
        let mut columns = vec![group.name().to_string()];
        if let Some(second) = secondary {
            columns.push(second.name().to_string());
        }
        columns.push("count".to_string());

        let mut out = ResultSet::new(columns);
        for g in groups {
            let mut row = vec![to_json(Some(g.key.clone()))];
            if secondary.is_some() {
                row.push(to_json(g.secondary.clone()));
            }
            row.push(Json::from(g.count));
            out.rows.push(row);
        }
        out
    }

    pub fn from_values(field: &Field, values: &[Value]) -> Self {
        let mut out = ResultSet::new(vec![field.name().to_string()]);
        for v in values {
            out.rows.push(vec![to_json(Some(v.clone()))]);
        }
        out
    }

    pub fn from_summary(summary: &CatalogSummary) -> Self {
        let columns = [
            "total",
            "movies",
            "tv_shows",
            "avg_duration",
            "top_country",
            "top_country_count",
        ];
        let mut out = ResultSet::new(columns.iter().map(|c| c.to_string()).collect());
        out.rows.push(vec![
            Json::from(summary.total),
            Json::from(summary.movies),
            Json::from(summary.tv_shows),
            to_json(summary.avg_duration.map(Value::Float)),
            to_json(summary.top_country.clone().map(Value::Str)),
            Json::from(summary.top_country_count),
        ]);
        out
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Json> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Keeps the projected columns, in projection order.
    pub fn select(&self, projection: &Projection) -> ResultSet {
        let selected = projection.resolve(&self.columns);
        let positions: Vec<usize> = selected
            .iter()
            .filter_map(|name| self.columns.iter().position(|c| c == name))
            .collect();
        ResultSet {
            columns: selected,
            rows: self
                .rows
                .iter()
                .map(|row| positions.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Slices output rows with the same clipping rules as view pagination.
    pub fn paginate(&self, page: Page) -> ResultSet {
        let (start, end) = page.bounds(self.rows.len());
        ResultSet {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Rows as JSON objects. Key order is not preserved by `Map`; use
    /// [`ResultSet::columns`] or serialize the set directly for ordered output.
    pub fn to_maps(&self) -> Vec<Map<String, Json>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, CatalogError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

struct OrderedRow<'a> {
    columns: &'a [String],
    cells: &'a [Json],
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&OrderedRow {
                columns: &self.columns,
                cells: row,
            })?;
        }
        seq.end()
    }
}
