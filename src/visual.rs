//! Mapping of cluster labels to colors and plot/map positions
//!
//! Nothing in this module draws; it produces the point lists consumed by
//! [`crate::viz`] or any other renderer.

use std::fmt;

/// Named marker colors, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterColor {
    Red,
    Blue,
    Green,
    Purple,
    Orange,
    DarkRed,
    LightBlue,
    Pink,
    Gray,
    CadetBlue,
}

impl ClusterColor {
    /// Color name as understood by web map renderers
    pub fn name(self) -> &'static str {
        match self {
            ClusterColor::Red => "red",
            ClusterColor::Blue => "blue",
            ClusterColor::Green => "green",
            ClusterColor::Purple => "purple",
            ClusterColor::Orange => "orange",
            ClusterColor::DarkRed => "darkred",
            ClusterColor::LightBlue => "lightblue",
            ClusterColor::Pink => "pink",
            ClusterColor::Gray => "gray",
            ClusterColor::CadetBlue => "cadetblue",
        }
    }

    /// sRGB components
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ClusterColor::Red => (255, 0, 0),
            ClusterColor::Blue => (0, 0, 255),
            ClusterColor::Green => (0, 128, 0),
            ClusterColor::Purple => (128, 0, 128),
            ClusterColor::Orange => (255, 165, 0),
            ClusterColor::DarkRed => (139, 0, 0),
            ClusterColor::LightBlue => (173, 216, 230),
            ClusterColor::Pink => (255, 192, 203),
            ClusterColor::Gray => (128, 128, 128),
            ClusterColor::CadetBlue => (95, 158, 160),
        }
    }
}

impl fmt::Display for ClusterColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const DEFAULT_COLORS: [ClusterColor; 10] = [
    ClusterColor::Red,
    ClusterColor::Blue,
    ClusterColor::Green,
    ClusterColor::Purple,
    ClusterColor::Orange,
    ClusterColor::DarkRed,
    ClusterColor::LightBlue,
    ClusterColor::Pink,
    ClusterColor::Gray,
    ClusterColor::CadetBlue,
];

/// Fixed, cyclic color palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<ClusterColor>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

impl Palette {
    /// Custom palette; `None` when `colors` is empty
    pub fn new(colors: Vec<ClusterColor>) -> Option<Self> {
        (!colors.is_empty()).then_some(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[ClusterColor] {
        &self.colors
    }

    /// Color for a cluster label, wrapping around the palette
    pub fn color_for(&self, label: usize) -> ClusterColor {
        self.colors[label % self.colors.len()]
    }
}

/// Geographic center of the plotted points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// One map marker
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub color: ClusterColor,
    pub label: usize,
}

/// Everything a map renderer needs
#[derive(Debug, Clone, PartialEq)]
pub struct GeoView {
    pub center: MapCenter,
    pub points: Vec<MapPoint>,
    pub n_clusters: usize,
}

impl GeoView {
    /// Color assigned to `label`; `None` when no point carries it
    pub fn cluster_color(&self, label: usize) -> Option<ClusterColor> {
        self.points.iter().find(|p| p.label == label).map(|p| p.color)
    }
}

/// One scatter plot point
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: ClusterColor,
    pub label: usize,
}

/// Everything a scatter renderer needs
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterView {
    pub x_axis: String,
    pub y_axis: String,
    pub title: String,
    pub points: Vec<ScatterPoint>,
    pub n_clusters: usize,
}

impl ScatterView {
    /// Color assigned to `label`; `None` when no point carries it
    pub fn cluster_color(&self, label: usize) -> Option<ClusterColor> {
        self.points.iter().find(|p| p.label == label).map(|p| p.color)
    }
}

/// Axis name used when only one feature is plotted
pub const INDEX_AXIS: &str = "index";

/// Mean of the coordinates; `None` for an empty row set
pub fn map_center(latitudes: &[f64], longitudes: &[f64]) -> Option<MapCenter> {
    if latitudes.is_empty() || latitudes.len() != longitudes.len() {
        return None;
    }
    let n = latitudes.len() as f64;
    Some(MapCenter {
        latitude: latitudes.iter().sum::<f64>() / n,
        longitude: longitudes.iter().sum::<f64>() / n,
    })
}

/// Package clustered rows as colored map markers around their center
///
/// `latitudes`, `longitudes` and `labels` are parallel, one entry per
/// clustered row.
pub fn geo_view(
    latitudes: &[f64],
    longitudes: &[f64],
    labels: &[usize],
    n_clusters: usize,
    palette: &Palette,
) -> Option<GeoView> {
    if labels.len() != latitudes.len() {
        return None;
    }
    let center = map_center(latitudes, longitudes)?;
    let points = latitudes
        .iter()
        .zip(longitudes)
        .zip(labels)
        .map(|((&latitude, &longitude), &label)| MapPoint {
            latitude,
            longitude,
            color: palette.color_for(label),
            label,
        })
        .collect();
    Some(GeoView {
        center,
        points,
        n_clusters,
    })
}

/// Package clustered rows as colored scatter points
///
/// With `y == None` the row position is used as the y value and the
/// y axis is named [`INDEX_AXIS`].
pub fn scatter_view(
    x: (&str, &[f64]),
    y: Option<(&str, &[f64])>,
    labels: &[usize],
    n_clusters: usize,
    palette: &Palette,
) -> ScatterView {
    let (x_axis, xs) = x;
    let y_axis = y.map_or(INDEX_AXIS, |(name, _)| name);
    let points = xs
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (&x, &label))| ScatterPoint {
            x,
            y: y.map_or(i as f64, |(_, ys)| ys[i]),
            color: palette.color_for(label),
            label,
        })
        .collect();
    ScatterView {
        x_axis: x_axis.to_string(),
        y_axis: y_axis.to_string(),
        title: scatter_title(n_clusters),
        points,
        n_clusters,
    }
}

pub fn scatter_title(n_clusters: usize) -> String {
    format!("K-Means clustering (K = {})", n_clusters)
}
