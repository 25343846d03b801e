//! GeoCluster: K-Means clustering of delivery records with map and scatter views
//!
//! The pipeline selects numeric feature columns, standardizes them, partitions
//! the rows with seeded K-Means and maps cluster labels to marker colors and
//! positions for rendering.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod session;
pub mod visual;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use config::{ClusterRequest, CoordinateColumns, ViewKind};
pub use data::{load_dataset, Column, ColumnValues, Dataset, DatasetCache};
pub use error::PipelineError;
pub use features::{default_selection, numeric_candidates, validate_selection, SelectionMode};
pub use model::{fit_kmeans, ClusterConfig, ClusterModel, Clusterer, KMeansClusterer};
pub use normalize::{Normalizer, StandardNormalizer, StandardScaler};
pub use pipeline::{run_pipeline, ClusterOutcome, Pipeline, VisualOutput};
pub use session::Session;
pub use visual::{ClusterColor, GeoView, MapCenter, MapPoint, Palette, ScatterPoint, ScatterView};
pub use viz::generate_visualization_report;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
