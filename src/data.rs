//! Dataset model and CSV loading using Polars

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::*;

/// Values held by a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric cells; missing and non-finite cells are `None`
    Numeric(Vec<Option<f64>>),
    /// Any other cell type, rendered as text
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column of the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    /// Numeric cells, or `None` for a text column
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(values) => Some(values),
            ColumnValues::Text(_) => None,
        }
    }
}

/// Tabular dataset: ordered columns sharing one row count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    height: usize,
}

impl Dataset {
    /// Build a dataset from columns, rejecting ragged or duplicated columns
    pub fn new(columns: Vec<Column>) -> crate::Result<Self> {
        let height = columns.first().map_or(0, |c| c.values.len());
        for column in &columns {
            if column.values.len() != height {
                anyhow::bail!(
                    "Column '{}' has {} rows, expected {}",
                    column.name,
                    column.values.len(),
                    height
                );
            }
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                anyhow::bail!("Duplicate column name '{}'", column.name);
            }
        }
        Ok(Self { columns, height })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric cells of the named column; `None` if absent or not numeric
    pub fn numeric_column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_numeric)
    }
}

/// Load a delimited file with a header row into a [`Dataset`]
///
/// Numeric columns keep their values as `f64` (integers are widened);
/// every other column type is kept as text.
pub fn load_dataset(file_path: impl AsRef<Path>) -> crate::Result<Dataset> {
    let file_path = file_path.as_ref();
    let df = LazyCsvReader::new(file_path)
        .with_has_header(true)
        .finish()?
        .collect()?;

    let dataset = from_data_frame(&df)?;
    tracing::info!(
        path = %file_path.display(),
        rows = dataset.height(),
        columns = dataset.columns().len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Convert a Polars frame into the pipeline's dataset model
pub fn from_data_frame(df: &DataFrame) -> crate::Result<Dataset> {
    let mut columns = Vec::with_capacity(df.width());

    for series in df.get_columns() {
        let column = if series.dtype().is_numeric() {
            let values: Vec<Option<f64>> = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .collect();
            Column::numeric(series.name(), values)
        } else {
            let values: Vec<Option<String>> = series
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_owned))
                .collect();
            Column::text(series.name(), values)
        };
        columns.push(column);
    }

    Dataset::new(columns)
}

/// Process-wide dataset cache keyed by source path
///
/// Entries are only replaced through [`DatasetCache::reload`] or dropped
/// through [`DatasetCache::invalidate`]; there is no live reload.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on first use
    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> crate::Result<Arc<Dataset>> {
        let key = source_key(path.as_ref());
        if let Some(dataset) = self.entries.get(&key) {
            tracing::debug!(path = %key.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }
        self.reload(path)
    }

    /// Load `path` again and replace any cached entry
    pub fn reload(&mut self, path: impl AsRef<Path>) -> crate::Result<Arc<Dataset>> {
        let key = source_key(path.as_ref());
        let dataset = Arc::new(load_dataset(&key)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the cached entry for `path`; returns whether one existed
    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        self.entries.remove(&source_key(path.as_ref())).is_some()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(&source_key(path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn source_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
