//! Command-line interface definitions and argument parsing

use clap::{Parser, ValueEnum};

use crate::config::{ClusterRequest, CoordinateColumns, ViewKind};
use crate::features::SelectionMode;
use crate::model::ClusterConfig;

/// Feature selection rule
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Exactly two features
    StrictPair,
    /// One or more features
    FlexMinOne,
    /// Two or more features
    FlexMinTwo,
}

impl From<ModeArg> for SelectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::StrictPair => SelectionMode::StrictPair,
            ModeArg::FlexMinOne => SelectionMode::FlexMinOne,
            ModeArg::FlexMinTwo => SelectionMode::FlexMinTwo,
        }
    }
}

/// Output view
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewArg {
    /// Colored markers at each delivery location
    Map,
    /// Two selected features plotted against each other
    Scatter,
}

impl From<ViewArg> for ViewKind {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Map => ViewKind::Map,
            ViewArg::Scatter => ViewKind::Scatter,
        }
    }
}

/// Delivery location clustering using K-Means
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "Delivery.csv")]
    pub input: String,

    /// Number of clusters for K-Means
    #[arg(
        short = 'k',
        long,
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(2..=10)
    )]
    pub clusters: u32,

    /// Feature columns to cluster on, comma-separated (default: first columns allowed by --mode)
    #[arg(short, long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Feature selection rule
    #[arg(short, long, value_enum, default_value = "flex-min-one")]
    pub mode: ModeArg,

    /// Output view
    #[arg(long, value_enum, default_value = "map")]
    pub view: ViewArg,

    /// Latitude column name
    #[arg(long, default_value = "Latitude")]
    pub lat_col: String,

    /// Longitude column name
    #[arg(long, default_value = "Longitude")]
    pub lon_col: String,

    /// Identifier columns never used as features, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub id_cols: Vec<String>,

    /// Output path for the visualization plot
    #[arg(short, long, default_value = "cluster_plot.png")]
    pub output: String,

    /// Random seed for centroid initialization
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: usize,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// List the candidate feature columns and exit
    #[arg(long)]
    pub list_columns: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Explicit feature selection, if any was given
    pub fn feature_selection(&self) -> Option<Vec<String>> {
        let features: Vec<String> = self
            .features
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        (!features.is_empty()).then_some(features)
    }

    /// Build the pipeline request described by the arguments
    pub fn to_request(&self) -> ClusterRequest {
        let cluster = ClusterConfig::default()
            .with_seed(self.seed)
            .with_max_iters(self.max_iters)
            .with_tolerance(self.tolerance);

        ClusterRequest {
            view: self.view.into(),
            mode: self.mode.into(),
            features: self.feature_selection(),
            k: self.clusters as usize,
            coordinates: CoordinateColumns::new(&self.lat_col, &self.lon_col),
            identifier_columns: self
                .id_cols
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            cluster,
        }
    }
}
