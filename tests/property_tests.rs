use geocluster::model::count_distinct_rows;
use geocluster::{fit_kmeans, ClusterConfig, Normalizer, Palette, StandardNormalizer};
use ndarray::Array2;
use proptest::prelude::*;

fn matrix(rows: &[Vec<f64>]) -> Array2<f64> {
    let n_cols = rows[0].len();
    Array2::from_shape_vec((rows.len(), n_cols), rows.concat()).unwrap()
}

proptest! {
    #[test]
    fn prop_kmeans_labels_in_range(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 2), 1..20),
        k in 1usize..5
    ) {
        let data = matrix(&data);
        prop_assume!(count_distinct_rows(&data) >= k);

        let model = fit_kmeans(&data, k, &ClusterConfig::default().with_n_runs(2)).unwrap();

        prop_assert_eq!(model.labels.len(), data.nrows());
        for &l in model.labels.iter() {
            prop_assert!(l < k);
        }
        if k == 1 {
            prop_assert!(model.labels.iter().all(|&l| l == 0));
        }
    }

    #[test]
    fn prop_kmeans_deterministic(
        data in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 3), 3..20),
        seed in any::<u64>()
    ) {
        let data = matrix(&data);
        prop_assume!(count_distinct_rows(&data) >= 3);

        let config = ClusterConfig::default().with_seed(seed).with_n_runs(2);
        let first = fit_kmeans(&data, 3, &config).unwrap();
        let second = fit_kmeans(&data, 3, &config).unwrap();
        prop_assert_eq!(first.labels, second.labels);
    }

    #[test]
    fn prop_normalized_columns_are_standard(
        data in prop::collection::vec(prop::collection::vec(-1000.0f64..1000.0, 3), 2..30)
    ) {
        let data = matrix(&data);
        let normalized = StandardNormalizer.normalize(&data);
        let renormalized = StandardNormalizer.normalize(&normalized);

        prop_assert_eq!(normalized.shape(), data.shape());
        for j in 0..data.ncols() {
            let column = renormalized.column(j);
            let mean = column.mean().unwrap();
            let std = column.std(0.0);
            prop_assert!(mean.abs() < 1e-9);
            // Constant columns stay at zero
            prop_assert!((std - 1.0).abs() < 1e-9 || std == 0.0);
            for (a, b) in normalized.column(j).iter().zip(column.iter()) {
                prop_assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn prop_palette_is_cyclic(a in 0usize..1000, b in 0usize..1000) {
        let palette = Palette::default();
        if a % palette.len() == b % palette.len() {
            prop_assert_eq!(palette.color_for(a), palette.color_for(b));
        }
        prop_assert_eq!(palette.color_for(a), palette.color_for(a + palette.len()));
    }
}
