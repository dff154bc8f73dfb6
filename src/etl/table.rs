//! In-memory tabular data and row records

use serde_json::{Map, Value};

/// One row converted into a column-name to value mapping
pub type Record = Map<String, Value>;

/// A named column of values aligned by row index
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered named columns holding equally long value sequences
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from columns. Every column should hold the same number of values;
    /// the first column determines the row count.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Build a table from a header and row-major values.
    ///
    /// Rows shorter than the header are padded with `null`; extra values are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut values = row.into_iter();
            for column in columns.iter_mut() {
                column.values.push(values.next().unwrap_or(Value::Null));
            }
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
