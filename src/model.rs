//! K-Means clustering of the normalized feature matrix

use std::collections::HashSet;

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::PipelineError;

/// Settings for the K-Means fit; the cluster count is passed per call
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Seed for centroid initialization
    pub seed: u64,
    /// Maximum Lloyd iterations per run
    pub max_iters: usize,
    /// Convergence tolerance on centroid movement
    pub tolerance: f64,
    /// Independent initializations; the lowest-inertia run is kept
    pub n_runs: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iters: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

impl ClusterConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_n_runs(mut self, n_runs: usize) -> Self {
        self.n_runs = n_runs;
        self
    }
}

/// Result of a clustering pass
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    /// Number of clusters
    pub n_clusters: usize,
    /// Cluster label per input row, in input order
    pub labels: Array1<usize>,
    /// Cluster centroids in normalized space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares (inertia)
    pub inertia: f64,
}

impl ClusterModel {
    /// Get cluster sizes
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }

    /// Mean silhouette coefficient over the first `sample_size` rows
    pub fn compute_silhouette_sample(&self, features: &Array2<f64>, sample_size: usize) -> f64 {
        let n_samples = features.nrows().min(sample_size);
        if n_samples < 2 || self.n_clusters < 2 {
            return 0.0;
        }

        let mut silhouette_sum = 0.0;

        for i in 0..n_samples {
            let point = features.row(i);
            let cluster_label = self.labels[i];

            let mut same_cluster_distances = Vec::new();
            let mut other_cluster_distances: Vec<Vec<f64>> = vec![Vec::new(); self.n_clusters];

            for j in 0..n_samples {
                if i == j {
                    continue;
                }

                let distance = euclidean_distance(&point, &features.row(j));
                let other_label = self.labels[j];

                if other_label == cluster_label {
                    same_cluster_distances.push(distance);
                } else if other_label < self.n_clusters {
                    other_cluster_distances[other_label].push(distance);
                }
            }

            let a_i = if same_cluster_distances.is_empty() {
                0.0
            } else {
                same_cluster_distances.iter().sum::<f64>() / same_cluster_distances.len() as f64
            };

            let b_i = other_cluster_distances
                .iter()
                .filter(|distances| !distances.is_empty())
                .map(|distances| distances.iter().sum::<f64>() / distances.len() as f64)
                .fold(f64::INFINITY, f64::min);

            let silhouette_i = if b_i.is_infinite() || (a_i == 0.0 && b_i == 0.0) {
                0.0
            } else {
                (b_i - a_i) / a_i.max(b_i)
            };

            silhouette_sum += silhouette_i;
        }

        silhouette_sum / n_samples as f64
    }
}

/// Partitions rows of a normalized matrix into `k` groups
pub trait Clusterer {
    fn cluster(&self, data: &Array2<f64>, k: usize) -> Result<ClusterModel, PipelineError>;
}

/// Seeded K-Means backed by linfa
#[derive(Debug, Clone, Default)]
pub struct KMeansClusterer {
    pub config: ClusterConfig,
}

impl KMeansClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }
}

impl Clusterer for KMeansClusterer {
    fn cluster(&self, data: &Array2<f64>, k: usize) -> Result<ClusterModel, PipelineError> {
        fit_kmeans(data, k, &self.config)
    }
}

/// Fit K-Means on `data` (rows x features)
///
/// Fails when `n_clusters` is zero or exceeds the number of distinct rows;
/// the cluster count is never reduced to fit the data.
pub fn fit_kmeans(
    data: &Array2<f64>,
    n_clusters: usize,
    config: &ClusterConfig,
) -> Result<ClusterModel, PipelineError> {
    if n_clusters == 0 {
        return Err(PipelineError::InvalidK(
            "number of clusters must be greater than 0".to_string(),
        ));
    }

    let distinct = count_distinct_rows(data);
    if distinct < n_clusters {
        return Err(PipelineError::DegenerateCluster(format!(
            "{} clusters requested but only {} distinct data points",
            n_clusters, distinct
        )));
    }

    let rng = ChaCha8Rng::seed_from_u64(config.seed);
    let dataset = DatasetBase::from(data.clone());

    let model = KMeans::params_with(n_clusters, rng, L2Dist)
        .max_n_iterations(config.max_iters as u64)
        .tolerance(config.tolerance)
        .n_runs(config.n_runs)
        .fit(&dataset)
        .map_err(|e| PipelineError::Clustering(e.to_string()))?;

    let labels: Array1<usize> = model.predict(data);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(data, &labels, &centroids);

    tracing::debug!(
        n_clusters,
        rows = data.nrows(),
        features = data.ncols(),
        inertia,
        "k-means fitted"
    );

    Ok(ClusterModel {
        n_clusters,
        labels,
        centroids,
        inertia,
    })
}

/// Number of distinct rows, comparing values bitwise (`-0.0 == 0.0`)
pub fn count_distinct_rows(data: &Array2<f64>) -> usize {
    data.outer_iter()
        .map(|row| row.iter().map(|&x| (x + 0.0).to_bits()).collect::<Vec<u64>>())
        .collect::<HashSet<_>>()
        .len()
}

/// Compute within-cluster sum of squares (inertia)
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    labels
        .iter()
        .enumerate()
        .filter(|&(_, &cluster)| cluster < centroids.nrows())
        .map(|(i, &cluster)| euclidean_distance(&features.row(i), &centroids.row(cluster)).powi(2))
        .sum()
}

fn euclidean_distance(point1: &ArrayView1<f64>, point2: &ArrayView1<f64>) -> f64 {
    point1
        .iter()
        .zip(point2.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}
