//! Feature selection → normalization → clustering → visual mapping
//!
//! A run is a pure function of the dataset and a [`ClusterRequest`]. Any
//! failed check halts the run before later stages are invoked.

use ndarray::Array2;

use crate::config::{ClusterRequest, ViewKind};
use crate::data::Dataset;
use crate::error::PipelineError;
use crate::features::{default_selection, numeric_candidates, validate_selection};
use crate::model::{ClusterModel, Clusterer, KMeansClusterer};
use crate::normalize::{complete_rows, feature_matrix, Normalizer, StandardNormalizer};
use crate::visual::{geo_view, scatter_view, ClusterColor, GeoView, Palette, ScatterView};

/// View produced by a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum VisualOutput {
    Map(GeoView),
    Scatter(ScatterView),
}

impl VisualOutput {
    /// Color the mapper assigned to `label`, if any point carries it
    pub fn cluster_color(&self, label: usize) -> Option<ClusterColor> {
        match self {
            VisualOutput::Map(view) => view.cluster_color(label),
            VisualOutput::Scatter(view) => view.cluster_color(label),
        }
    }
}

/// Labeled rows and their view
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
    /// Features the rows were clustered on
    pub features: Vec<String>,
    /// Source row index of every clustered row; incomplete rows are absent
    pub rows: Vec<usize>,
    /// Normalized feature matrix, one row per entry of `rows`
    pub normalized: Array2<f64>,
    pub model: ClusterModel,
    pub view: VisualOutput,
}

impl ClusterOutcome {
    /// `(source row, cluster label)` pairs in clustering order
    pub fn labeled_rows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().copied().zip(self.model.labels.iter().copied())
    }

    /// Number of source rows dropped for missing values
    pub fn dropped_rows(&self, dataset: &Dataset) -> usize {
        dataset.height() - self.rows.len()
    }
}

/// Pipeline with pluggable normalization and clustering stages
#[derive(Debug, Clone, Default)]
pub struct Pipeline<N = StandardNormalizer, C = KMeansClusterer> {
    pub normalizer: N,
    pub clusterer: C,
    pub palette: Palette,
}

impl Pipeline {
    /// Standard normalization and K-Means configured from `request`
    pub fn from_request(request: &ClusterRequest) -> Self {
        Self::new(
            StandardNormalizer,
            KMeansClusterer::new(request.cluster.clone()),
        )
    }
}

impl<N: Normalizer, C: Clusterer> Pipeline<N, C> {
    pub fn new(normalizer: N, clusterer: C) -> Self {
        Self {
            normalizer,
            clusterer,
            palette: Palette::default(),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Run every stage for `request` on `dataset`
    pub fn run(
        &self,
        dataset: &Dataset,
        request: &ClusterRequest,
    ) -> Result<ClusterOutcome, PipelineError> {
        let result = self.run_stages(dataset, request);
        match &result {
            Ok(outcome) => tracing::info!(
                k = request.k,
                view = %request.view,
                rows = outcome.rows.len(),
                dropped = outcome.dropped_rows(dataset),
                "clustering run complete"
            ),
            Err(e) => tracing::warn!(error = %e, "clustering run halted"),
        }
        result
    }

    fn run_stages(
        &self,
        dataset: &Dataset,
        request: &ClusterRequest,
    ) -> Result<ClusterOutcome, PipelineError> {
        let coordinates = request.coordinates.names();
        if request.view == ViewKind::Map {
            check_coordinates(dataset, &coordinates)?;
        }

        let candidates = numeric_candidates(dataset, &request.excluded_columns());
        let features = match &request.features {
            Some(features) => features.clone(),
            None => default_selection(request.mode, &candidates),
        };
        validate_selection(request.mode, &candidates, &features)?;
        tracing::debug!(?features, mode = %request.mode, "feature selection accepted");

        if request.k == 0 {
            return Err(PipelineError::InvalidK(
                "number of clusters must be greater than 0".to_string(),
            ));
        }

        let mut required: Vec<&str> = features.iter().map(String::as_str).collect();
        if request.view == ViewKind::Map {
            required.extend(coordinates);
        }
        let rows = complete_rows(dataset, &required)?;
        if rows.len() < request.k {
            return Err(PipelineError::DegenerateCluster(format!(
                "{} clusters requested but only {} of {} rows have all values",
                request.k,
                rows.len(),
                dataset.height()
            )));
        }
        tracing::debug!(
            kept = rows.len(),
            dropped = dataset.height() - rows.len(),
            "incomplete rows dropped"
        );

        let matrix = feature_matrix(dataset, &features, &rows)?;
        let normalized = self.normalizer.normalize(&matrix);
        let model = self.clusterer.cluster(&normalized, request.k)?;
        if model.labels.len() != rows.len() {
            return Err(PipelineError::Clustering(format!(
                "expected {} labels, got {}",
                rows.len(),
                model.labels.len()
            )));
        }

        let labels = model.labels.to_vec();
        let view = match request.view {
            ViewKind::Map => {
                let coords = feature_matrix(dataset, &coordinates, &rows)?;
                let latitudes = coords.column(0).to_vec();
                let longitudes = coords.column(1).to_vec();
                let view = geo_view(&latitudes, &longitudes, &labels, request.k, &self.palette)
                    .ok_or_else(|| {
                        PipelineError::DegenerateCluster("no rows to place on the map".to_string())
                    })?;
                VisualOutput::Map(view)
            }
            ViewKind::Scatter => {
                let x = matrix.column(0).to_vec();
                let y = (features.len() > 1).then(|| matrix.column(1).to_vec());
                VisualOutput::Scatter(scatter_view(
                    (features[0].as_str(), x.as_slice()),
                    features.get(1).map(String::as_str).zip(y.as_deref()),
                    &labels,
                    request.k,
                    &self.palette,
                ))
            }
        };

        Ok(ClusterOutcome {
            features,
            rows,
            normalized,
            model,
            view,
        })
    }
}

/// Run the standard pipeline configured by `request`
pub fn run_pipeline(
    dataset: &Dataset,
    request: &ClusterRequest,
) -> Result<ClusterOutcome, PipelineError> {
    Pipeline::from_request(request).run(dataset, request)
}

fn check_coordinates(dataset: &Dataset, coordinates: &[&str]) -> Result<(), PipelineError> {
    for &name in coordinates {
        match dataset.column(name) {
            None => {
                return Err(PipelineError::Schema(format!(
                    "coordinate column '{}' not found (columns: {})",
                    name,
                    dataset.column_names().join(", ")
                )))
            }
            Some(column) if !column.is_numeric() => {
                return Err(PipelineError::Schema(format!(
                    "coordinate column '{}' is not numeric",
                    name
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}
