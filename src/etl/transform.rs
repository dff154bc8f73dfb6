//! Transformer trait for data transformation

use super::{Record, Table};
use crate::error::Result;
use serde_json::Value;

/// Transformer trait for transforming data items
///
/// # Example
/// ```no_run
/// use csv_doc_etl::etl::{Record, Transformer};
/// use csv_doc_etl::Result;
///
/// struct FieldDropper {
///     fields: Vec<String>,
/// }
///
/// impl Transformer for FieldDropper {
///     type Input = Record;
///     type Output = Record;
///
///     fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
///         for field in &self.fields {
///             input.remove(field);
///         }
///         Ok(input)
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform multiple items (default batch implementation)
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}

/// Turns each row of a [`Table`] into a [`Record`] keyed by column name.
///
/// Row order and column order are kept and values pass through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowRecordTransformer;

impl RowRecordTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for RowRecordTransformer {
    type Input = Table;
    type Output = Vec<Record>;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let rows = input.row_count();
        let (names, mut columns): (Vec<String>, Vec<_>) = input
            .into_columns()
            .into_iter()
            .map(|column| (column.name, column.values.into_iter()))
            .unzip();

        let records = (0..rows)
            .map(|_| {
                names
                    .iter()
                    .zip(columns.iter_mut())
                    .map(|(name, values)| (name.clone(), values.next().unwrap_or(Value::Null)))
                    .collect::<Record>()
            })
            .collect();
        Ok(records)
    }
}
