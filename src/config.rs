//! Parameters of a clustering run

use std::fmt;

use crate::features::SelectionMode;
use crate::model::ClusterConfig;

/// Names of the latitude and longitude columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateColumns {
    pub latitude: String,
    pub longitude: String,
}

impl Default for CoordinateColumns {
    fn default() -> Self {
        Self {
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
        }
    }
}

impl CoordinateColumns {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    pub fn names(&self) -> [&str; 2] {
        [self.latitude.as_str(), self.longitude.as_str()]
    }
}

/// How the clustered rows are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Markers at each row's coordinates
    Map,
    /// Selected feature values on two axes
    Scatter,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Map => write!(f, "map"),
            ViewKind::Scatter => write!(f, "scatter"),
        }
    }
}

/// Everything a pipeline run depends on besides the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRequest {
    pub view: ViewKind,
    pub mode: SelectionMode,
    /// Explicit feature selection; `None` uses the mode's default selection
    pub features: Option<Vec<String>>,
    /// Number of clusters
    pub k: usize,
    pub coordinates: CoordinateColumns,
    /// Columns never offered as features, e.g. row identifiers
    pub identifier_columns: Vec<String>,
    pub cluster: ClusterConfig,
}

impl Default for ClusterRequest {
    fn default() -> Self {
        Self {
            view: ViewKind::Map,
            mode: SelectionMode::FlexMinOne,
            features: None,
            k: 3,
            coordinates: CoordinateColumns::default(),
            identifier_columns: Vec::new(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl ClusterRequest {
    /// Create a request for `k` clusters with default settings
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_view(mut self, view: ViewKind) -> Self {
        self.view = view;
        self
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_coordinates(mut self, coordinates: CoordinateColumns) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn with_identifier_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cluster_config(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    /// Columns excluded from feature candidates
    pub fn excluded_columns(&self) -> Vec<&str> {
        self.coordinates
            .names()
            .into_iter()
            .chain(self.identifier_columns.iter().map(String::as_str))
            .collect()
    }
}
