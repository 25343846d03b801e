//! GeoCluster: delivery location clustering CLI
//!
//! This is the main entrypoint that orchestrates data loading, feature
//! selection, clustering and visualization.

use anyhow::Result;
use clap::Parser;
use geocluster::{numeric_candidates, run_pipeline, viz, Args, DatasetCache};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        println!("GeoCluster - Delivery Location Clustering using K-Means");
        println!("=======================================================\n");
    }

    let mut cache = DatasetCache::new();

    if args.list_columns {
        list_columns(&args, &mut cache)
    } else {
        run_full_pipeline(&args, &mut cache)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Print the columns that may be used as features
fn list_columns(args: &Args, cache: &mut DatasetCache) -> Result<()> {
    let dataset = cache.get_or_load(&args.input)?;
    let request = args.to_request();
    let candidates = numeric_candidates(&dataset, &request.excluded_columns());

    println!("Columns in {}: {}", args.input, dataset.column_names().join(", "));
    if candidates.is_empty() {
        println!("No numeric feature columns available");
    } else {
        println!("Feature candidates: {}", candidates.join(", "));
    }

    Ok(())
}

/// Run full clustering pipeline
fn run_full_pipeline(args: &Args, cache: &mut DatasetCache) -> Result<()> {
    println!("=== Full Clustering Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load data
    if args.verbose {
        println!("Step 1: Loading data");
        println!("  Input file: {}", args.input);
    }

    let data_start = Instant::now();
    let dataset = cache.get_or_load(&args.input)?;
    let data_time = data_start.elapsed();

    println!(
        "✓ Data loaded: {} rows, {} columns",
        dataset.height(),
        dataset.columns().len()
    );
    if args.verbose {
        println!("  Processing time: {:.2}s", data_time.as_secs_f64());
    }

    // Step 2: Select features and cluster
    let request = args.to_request();
    if args.verbose {
        println!("\nStep 2: Clustering");
        println!("  Number of clusters: {}", request.k);
        println!("  Selection mode: {}", request.mode);
        println!("  View: {}", request.view);
        println!("  Seed: {}", request.cluster.seed);
        println!("  Max iterations: {}", request.cluster.max_iters);
        println!("  Tolerance: {}", request.cluster.tolerance);
    }

    let model_start = Instant::now();
    let outcome = run_pipeline(&dataset, &request)?;
    let model_time = model_start.elapsed();

    println!(
        "✓ Clustered {} rows on: {}",
        outcome.rows.len(),
        outcome.features.join(", ")
    );
    if args.verbose {
        println!("  Fitting time: {:.2}s", model_time.as_secs_f64());
        println!("  Inertia: {:.2}", outcome.model.inertia);
    }

    // Step 3: Generate visualization
    if args.verbose {
        println!("\nStep 3: Generating visualizations");
        println!("  Output file: {}", args.output);
    }

    let viz_start = Instant::now();
    viz::generate_visualization_report(&dataset, &outcome, &args.output)?;
    let viz_time = viz_start.elapsed();

    println!("\n✓ Visualizations generated");
    if args.verbose {
        println!("  Visualization time: {:.2}s", viz_time.as_secs_f64());
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Main plot saved to: {}", args.output);
    println!("Cluster sizes saved to: {}", viz::sizes_path(&args.output));

    Ok(())
}
