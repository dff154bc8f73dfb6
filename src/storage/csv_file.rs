//! CSV file source

use crate::error::{EtlError, Result};
use crate::etl::{DataSource, Table};
use serde_json::{Number, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read a CSV file with a header row into a [`Table`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn malformed(&self, source: csv::Error) -> EtlError {
        EtlError::SourceMalformed {
            path: self.path.clone(),
            source,
        }
    }
}

impl DataSource for CsvFileSource {
    fn load(&self) -> Result<Table> {
        let unavailable = |source| EtlError::SourceUnavailable {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(unavailable)?;
        if file.metadata().map_err(unavailable)?.len() == 0 {
            return Err(EtlError::SourceEmpty {
                path: self.path.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let headers = reader.headers().map_err(|e| self.malformed(e))?;
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(EtlError::SourceEmpty {
                path: self.path.clone(),
            });
        }
        let headers = unique_headers(headers.iter());

        let rows = reader
            .records()
            .map(|row| {
                row.map(|row| row.iter().map(infer_value).collect::<Vec<_>>())
                    .map_err(|e| self.malformed(e))
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Read {} row(s) x {} column(s) from {}",
            rows.len(),
            headers.len(),
            self.path.display()
        );
        Ok(Table::from_rows(headers, rows))
    }
}

impl fmt::Display for CsvFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Rename repeated header names to `<name>.1`, `<name>.2`, ... so no column
/// is lost when rows become records keyed by name
fn unique_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<&'a str, usize> = HashMap::new();
    let mut names = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        if taken.contains(&name) {
            let suffix = suffixes.entry(header).or_insert(1);
            loop {
                name = format!("{}.{}", header, suffix);
                *suffix += 1;
                if !taken.contains(&name) {
                    break;
                }
            }
        }
        taken.insert(name.clone());
        names.push(name);
    }
    names
}

/// Infer a scalar from a CSV cell: empty → null, then integer, float, boolean, string
fn infer_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(cell.to_string())
}
