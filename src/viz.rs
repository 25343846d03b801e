//! Rendering of map and scatter views using Plotters

use std::ops::Range;

use plotters::prelude::*;

use crate::data::Dataset;
use crate::model::ClusterModel;
use crate::pipeline::{ClusterOutcome, VisualOutput};
use crate::visual::{ClusterColor, GeoView, ScatterView};

const MARKER_RADIUS: i32 = 5;

/// Plotters color for a palette entry
pub fn to_rgb(color: ClusterColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

/// Value range of `values` with `padding` on both ends
///
/// A single distinct value is widened so the axis never collapses.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>, padding: f64) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }
    let pad = if max > min { padding } else { padding.max(1.0) };
    (min - pad)..(max + pad)
}

/// Draw the scatter view to a PNG
pub fn create_scatter_plot(view: &ScatterView, output_path: &str) -> crate::Result<()> {
    let x_range = padded_bounds(view.points.iter().map(|p| p.x), 0.5);
    let y_range = padded_bounds(view.points.iter().map(|p| p.y), 0.5);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&view.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(view.x_axis.as_str())
        .y_desc(view.y_axis.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for label in 0..view.n_clusters {
        let Some(color) = view.cluster_color(label).map(to_rgb) else {
            continue;
        };
        chart
            .draw_series(
                view.points
                    .iter()
                    .filter(|p| p.label == label)
                    .map(|p| Circle::new((p.x, p.y), MARKER_RADIUS, color.filled())),
            )?
            .label(format!("Cluster {}", label))
            .legend(move |(x, y)| Circle::new((x, y), MARKER_RADIUS, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = output_path, "scatter plot saved");

    Ok(())
}

/// Draw the map view to a PNG: markers on longitude/latitude axes with the center marked
pub fn create_map_plot(view: &GeoView, output_path: &str) -> crate::Result<()> {
    let lon_range = padded_bounds(view.points.iter().map(|p| p.longitude), 0.01);
    let lat_range = padded_bounds(view.points.iter().map(|p| p.latitude), 0.01);

    let root = BitMapBackend::new(output_path, (700, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!("Delivery location clusters (K = {})", view.n_clusters);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lon_range, lat_range)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for label in 0..view.n_clusters {
        let Some(color) = view.cluster_color(label).map(to_rgb) else {
            continue;
        };
        let marker = color.mix(0.7).filled();
        chart
            .draw_series(
                view.points
                    .iter()
                    .filter(|p| p.label == label)
                    .map(|p| Circle::new((p.longitude, p.latitude), MARKER_RADIUS, marker)),
            )?
            .label(format!("Cluster {}", label))
            .legend(move |(x, y)| Circle::new((x, y), MARKER_RADIUS, color.filled()));
    }

    let center = view.center;
    chart.draw_series(std::iter::once(Cross::new(
        (center.longitude, center.latitude),
        8,
        BLACK.stroke_width(2),
    )))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = output_path, "map plot saved");

    Ok(())
}

/// Create a simple histogram of cluster sizes, colored like `view`
pub fn create_cluster_size_chart(
    model: &ClusterModel,
    view: &VisualOutput,
    output_path: &str,
) -> crate::Result<()> {
    let cluster_sizes = model.cluster_sizes();
    let max_size = *cluster_sizes.iter().max().unwrap_or(&1) as f64;

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Cluster Sizes", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(model.n_clusters as f64 - 0.5), 0f64..(max_size * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Cluster ID")
        .y_desc("Number of Deliveries")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (cluster_id, &size) in cluster_sizes.iter().enumerate() {
        // Empty clusters have no points and no bar
        let Some(color) = view.cluster_color(cluster_id).map(to_rgb) else {
            continue;
        };
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (cluster_id as f64 - 0.4, 0.0),
                (cluster_id as f64 + 0.4, size as f64),
            ],
            color.filled(),
        )))?;
    }

    root.present()?;
    tracing::info!(path = output_path, "cluster size chart saved");

    Ok(())
}

/// Print cluster statistics to console
pub fn print_cluster_statistics(dataset: &Dataset, outcome: &ClusterOutcome) {
    let model = &outcome.model;
    let clustered = outcome.rows.len();

    println!("\n=== Cluster Statistics ===");
    println!("Number of clusters: {}", model.n_clusters);
    println!("Features: {}", outcome.features.join(", "));
    println!(
        "Rows clustered: {} ({} dropped for missing values)",
        clustered,
        outcome.dropped_rows(dataset)
    );
    println!("Within-cluster sum of squares (Inertia): {:.2}", model.inertia);

    let silhouette_score = model.compute_silhouette_sample(&outcome.normalized, 100);
    println!("Silhouette score (sample): {:.3}", silhouette_score);

    println!("\nCluster sizes:");
    for (i, &size) in model.cluster_sizes().iter().enumerate() {
        let percentage = (size as f64 / clustered as f64) * 100.0;
        let color = outcome
            .view
            .cluster_color(i)
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        println!(
            "  Cluster {} ({}): {} deliveries ({:.1}%)",
            i, color, size, percentage
        );
    }

    if let VisualOutput::Map(view) = &outcome.view {
        println!(
            "\nMap center: ({:.5}, {:.5})",
            view.center.latitude, view.center.longitude
        );
    }
}

/// Render the outcome's view plus a cluster size chart next to it
///
/// The size chart is written to `<base>_sizes.png`.
pub fn generate_visualization_report(
    dataset: &Dataset,
    outcome: &ClusterOutcome,
    base_output_path: &str,
) -> crate::Result<()> {
    match &outcome.view {
        VisualOutput::Map(view) => create_map_plot(view, base_output_path)?,
        VisualOutput::Scatter(view) => create_scatter_plot(view, base_output_path)?,
    }

    create_cluster_size_chart(&outcome.model, &outcome.view, &sizes_path(base_output_path))?;
    print_cluster_statistics(dataset, outcome);

    Ok(())
}

/// Path of the size chart belonging to a main plot
pub fn sizes_path(base_output_path: &str) -> String {
    match base_output_path.strip_suffix(".png") {
        Some(stem) => format!("{}_sizes.png", stem),
        None => format!("{}_sizes.png", base_output_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterRequest, ViewKind};
    use crate::data::Column;
    use crate::pipeline::{run_pipeline, Pipeline};
    use crate::visual::Palette;
    use std::path::Path;
    use tempfile::tempdir;

    fn numeric(name: &str, values: &[f64]) -> Column {
        Column::numeric(name, values.iter().map(|&v| Some(v)).collect())
    }

    fn create_test_data() -> Dataset {
        Dataset::new(vec![
            numeric("Latitude", &[37.55, 37.56, 37.57, 35.15, 35.16, 35.17]),
            numeric("Longitude", &[126.97, 126.98, 126.99, 129.05, 129.06, 129.07]),
            numeric("Weight", &[1.0, 1.5, 1.2, 7.0, 7.5, 6.8]),
            numeric("Distance", &[5.0, 4.0, 6.0, 50.0, 52.0, 49.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_to_rgb() {
        assert_eq!(to_rgb(ClusterColor::Red), RGBColor(255, 0, 0));
        assert_eq!(to_rgb(ClusterColor::CadetBlue), RGBColor(95, 158, 160));
    }

    #[test]
    fn test_padded_bounds() {
        assert_eq!(padded_bounds(vec![1.0, 3.0, 2.0], 0.5), 0.5..3.5);
        assert_eq!(padded_bounds(vec![2.0, 2.0], 0.01), 1.0..3.0);
        assert_eq!(padded_bounds(Vec::new(), 0.5), -1.0..1.0);
    }

    #[test]
    fn test_sizes_path() {
        assert_eq!(sizes_path("out/plot.png"), "out/plot_sizes.png");
        assert_eq!(sizes_path("plot"), "plot_sizes.png");
    }

    #[test]
    fn test_create_map_plot() {
        let dataset = create_test_data();
        let outcome = run_pipeline(&dataset, &ClusterRequest::new(2)).unwrap();
        let VisualOutput::Map(view) = &outcome.view else {
            panic!("expected a map view");
        };

        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("map.png");
        let output_str = output_path.to_str().unwrap();

        create_map_plot(view, output_str).unwrap();
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_create_scatter_plot() {
        let dataset = create_test_data();
        let request = ClusterRequest::new(2)
            .with_view(ViewKind::Scatter)
            .with_features(["Weight", "Distance"]);
        let outcome = run_pipeline(&dataset, &request).unwrap();
        let VisualOutput::Scatter(view) = &outcome.view else {
            panic!("expected a scatter view");
        };

        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("scatter.png");
        let output_str = output_path.to_str().unwrap();

        create_scatter_plot(view, output_str).unwrap();
        assert!(Path::new(output_str).exists());
    }

    #[test]
    fn test_render_with_custom_palette() {
        let dataset = create_test_data();
        let request = ClusterRequest::new(2)
            .with_view(ViewKind::Scatter)
            .with_features(["Weight", "Distance"]);
        let palette = Palette::new(vec![ClusterColor::Gray, ClusterColor::Pink]).unwrap();
        let outcome = Pipeline::from_request(&request)
            .with_palette(palette)
            .run(&dataset, &request)
            .unwrap();

        let VisualOutput::Scatter(view) = &outcome.view else {
            panic!("expected a scatter view");
        };
        let drawn: Vec<RGBColor> = (0..2)
            .filter_map(|label| view.cluster_color(label).map(to_rgb))
            .collect();
        assert_eq!(drawn.len(), 2);
        assert!(drawn.contains(&RGBColor(128, 128, 128)));
        assert!(drawn.contains(&RGBColor(255, 192, 203)));
        assert!(!drawn.contains(&to_rgb(ClusterColor::Red)));

        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("custom.png");
        let output_str = output_path.to_str().unwrap();

        generate_visualization_report(&dataset, &outcome, output_str).unwrap();
        assert!(Path::new(output_str).exists());
        assert!(Path::new(&sizes_path(output_str)).exists());
    }

    #[test]
    fn test_generate_visualization_report() {
        let dataset = create_test_data();
        let outcome = run_pipeline(&dataset, &ClusterRequest::new(3)).unwrap();

        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("report.png");
        let output_str = output_path.to_str().unwrap();

        generate_visualization_report(&dataset, &outcome, output_str).unwrap();
        assert!(Path::new(output_str).exists());
        assert!(Path::new(&sizes_path(output_str)).exists());
    }
}
