//! Command implementations
//!
//! Each input file is its own pipeline invocation: extract, transform, then a
//! fresh store connection with index bootstrap and a chunked load. Within
//! `run` the first failure aborts; files already loaded stay loaded. `ingest`
//! runs every discovered file on its own and reports failures at the end.

use crate::client::{DocumentStore, StoreClient};
use crate::config::{Config, StoreConfig};
use crate::etl::{ChunkedLoader, DataSource, Loader, RowRecordTransformer, Source, Transformer};
use crate::search::{SearchHit, SearchTool};
use crate::storage::{CsvFileSource, DocumentStorage};
use eyre::{Context, Result, eyre};
use std::path::{Path, PathBuf};

/// Run the pipeline for each file against the configured HTTP store
pub async fn run(file_paths: &[PathBuf], config: &Config) -> Result<usize> {
    run_with(file_paths, config, |store| {
        StoreClient::from_config(store).map_err(Into::into)
    })
    .await
}

/// Run the pipeline for each file, opening a new store with `connect` per file
pub async fn run_with<S, F>(file_paths: &[PathBuf], config: &Config, connect: F) -> Result<usize>
where
    S: DocumentStore,
    F: Fn(&StoreConfig) -> Result<S>,
{
    log::info!("Running for {} file(s)", file_paths.len());
    let mut total = 0;
    for path in file_paths {
        let store = connect(&config.store)
            .with_context(|| format!("Failed to connect to document store for {}", path.display()))?;
        total += run_file(path, store, config)
            .await
            .with_context(|| format!("Pipeline failed for {}", path.display()))?;
    }
    log::info!("✓ Loaded {} record(s) from {} file(s)", total, file_paths.len());
    Ok(total)
}

async fn run_file<S: DocumentStore>(path: &Path, store: S, config: &Config) -> crate::Result<usize> {
    let source = Source::from(CsvFileSource::new(path));
    let table = source.load()?;
    let (rows, columns) = table.shape();
    log::info!("Extracted {} row(s) x {} column(s) from {}", rows, columns, source);

    let records = RowRecordTransformer::new().transform(table)?;
    log::info!("Transformed {} record(s)", records.len());

    let storage = DocumentStorage::connect(store, &config.store).await?;
    if records.is_empty() {
        log::warn!("{} produced no records, nothing to load", source);
        return Ok(0);
    }
    log::info!(
        "Loading into '{}' in chunks of {}",
        storage,
        config.chunk_size
    );
    ChunkedLoader::new(storage, config.chunk_size)
        .load(records)
        .await
}

/// List `*.csv` files directly inside `data_dir`, sorted by path
pub fn discover(data_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let data_dir = data_dir.as_ref();
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read data directory: {}", data_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    log::debug!("Discovered {} CSV file(s) in {}", files.len(), data_dir.display());
    Ok(files)
}

/// Discover CSV files and run each one as an independent invocation
pub async fn ingest(data_dir: impl AsRef<Path>, config: &Config) -> Result<usize> {
    ingest_with(data_dir, config, |store| {
        StoreClient::from_config(store).map_err(Into::into)
    })
    .await
}

/// Run every discovered file on its own, so one failing file does not stop
/// the others. Fails after all files were attempted if any of them failed.
pub async fn ingest_with<S, F>(data_dir: impl AsRef<Path>, config: &Config, connect: F) -> Result<usize>
where
    S: DocumentStore,
    F: Fn(&StoreConfig) -> Result<S>,
{
    let files = discover(&data_dir)?;
    if files.is_empty() {
        log::warn!("No CSV files found in {}", data_dir.as_ref().display());
        return Ok(0);
    }

    let mut total = 0;
    let mut failed = Vec::new();
    for file in &files {
        match run_with(std::slice::from_ref(file), config, &connect).await {
            Ok(count) => total += count,
            Err(e) => {
                log::error!("{}: {:?}", file.display(), e);
                failed.push(file.display().to_string());
            }
        }
    }

    if !failed.is_empty() {
        return Err(eyre!(
            "{} of {} file(s) failed to load: {}",
            failed.len(),
            files.len(),
            failed.join(", ")
        ));
    }
    Ok(total)
}

/// Search the configured collection over HTTP
pub async fn search(query: &str, limit: usize, config: &Config) -> Result<Vec<SearchHit>> {
    let store = StoreClient::from_config(&config.store)
        .with_context(|| "Failed to create document store client")?;
    let tool = SearchTool::new(store, &config.store, limit);
    let hits = tool
        .search(query)
        .await
        .with_context(|| format!("Search failed for query '{}'", query))?;
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_only_csv_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.csv"), "a\n1\n").unwrap();
        fs::write(temp_dir.path().join("a.csv"), "a\n1\n").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignore").unwrap();
        fs::create_dir(temp_dir.path().join("nested.csv")).unwrap();

        let files = discover(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover("/nonexistent/data").unwrap_err();
        assert!(err.to_string().contains("Failed to read data directory"));
    }
}
