//! Row filtering and standardization of feature columns

use ndarray::{Array1, Array2, Axis};

use crate::data::Dataset;
use crate::error::PipelineError;

/// Standard deviations at or below this are treated as zero variance
const ZERO_VARIANCE_EPS: f64 = 1e-12;

/// Per-column mean and standard deviation fitted on one row set
///
/// Statistics are taken on each column divided by its largest magnitude, so
/// values near `f64::MAX` do not overflow the sums.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    /// Population standard deviation (divisor n)
    pub std: Array1<f64>,
    /// Largest absolute value per column, 1.0 for all-zero columns
    pub scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit column statistics on `data` (rows x features)
    pub fn fit(data: &Array2<f64>) -> Self {
        let n_cols = data.ncols();
        if data.nrows() == 0 {
            return Self {
                mean: Array1::zeros(n_cols),
                std: Array1::zeros(n_cols),
                scale: Array1::ones(n_cols),
            };
        }
        let scale = data.map_axis(Axis(0), |column| {
            let max_abs = column.fold(0.0f64, |acc, &x| acc.max(x.abs()));
            if max_abs > 0.0 && max_abs.is_finite() {
                max_abs
            } else {
                1.0
            }
        });
        let scaled = data / &scale;
        let scaled_mean = scaled
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_cols));
        let scaled_std = scaled.std_axis(Axis(0), 0.0);
        Self {
            mean: &scaled_mean * &scale,
            std: &scaled_std * &scale,
            scale,
        }
    }

    /// Whether column `j` has no spread on the fitted rows
    pub fn is_constant(&self, j: usize) -> bool {
        self.std[j] <= ZERO_VARIANCE_EPS
    }

    /// Standardize `data`; zero-variance columns become all zeros
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            if self.is_constant(j) {
                column.fill(0.0);
            } else {
                let scale = self.scale[j];
                let (mean, std) = (self.mean[j] / scale, self.std[j] / scale);
                column.mapv_inplace(|x| (x / scale - mean) / std);
            }
        }
        out
    }

    pub fn fit_transform(data: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(data);
        let transformed = scaler.transform(data);
        (scaler, transformed)
    }
}

/// Rescales a feature matrix before clustering
pub trait Normalizer {
    fn normalize(&self, data: &Array2<f64>) -> Array2<f64>;
}

/// Zero mean / unit variance per column, fitted on the matrix itself
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

impl Normalizer for StandardNormalizer {
    fn normalize(&self, data: &Array2<f64>) -> Array2<f64> {
        let (scaler, transformed) = StandardScaler::fit_transform(data);
        let constant: Vec<usize> = (0..data.ncols()).filter(|&j| scaler.is_constant(j)).collect();
        if !constant.is_empty() {
            tracing::debug!(?constant, "zero-variance feature columns normalized to zeros");
        }
        transformed
    }
}

/// Indices of rows that have a value in every one of `columns`
///
/// Every name must refer to a numeric column of `dataset`.
pub fn complete_rows<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
) -> Result<Vec<usize>, PipelineError> {
    let cells = numeric_columns(dataset, columns)?;
    Ok((0..dataset.height())
        .filter(|&row| cells.iter().all(|column| column[row].is_some()))
        .collect())
}

/// Gather `columns` for the given `rows` into a dense matrix
///
/// Rows are expected to come from [`complete_rows`] over the same columns.
pub fn feature_matrix<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
    rows: &[usize],
) -> Result<Array2<f64>, PipelineError> {
    let cells = numeric_columns(dataset, columns)?;
    let mut matrix = Array2::zeros((rows.len(), cells.len()));
    for (i, &row) in rows.iter().enumerate() {
        for (j, column) in cells.iter().enumerate() {
            matrix[[i, j]] = column[row].ok_or_else(|| {
                PipelineError::Schema(format!(
                    "row {} has no value for '{}'",
                    row,
                    columns[j].as_ref()
                ))
            })?;
        }
    }
    Ok(matrix)
}

fn numeric_columns<'a, S: AsRef<str>>(
    dataset: &'a Dataset,
    columns: &[S],
) -> Result<Vec<&'a [Option<f64>]>, PipelineError> {
    columns
        .iter()
        .map(|name| {
            dataset.numeric_column(name.as_ref()).ok_or_else(|| {
                PipelineError::Schema(format!("'{}' is not a numeric column", name.as_ref()))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn assert_standardized(data: &Array2<f64>) {
        for column in data.axis_iter(Axis(1)) {
            assert_abs_diff_eq!(column.mean().unwrap(), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_standardizes_columns() {
        let data = array![[1.0, 100.0], [2.0, 200.0], [3.0, 600.0], [10.0, 50.0]];
        let normalized = StandardNormalizer.normalize(&data);

        assert_eq!(normalized.shape(), data.shape());
        assert_standardized(&normalized);
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        let data = array![[1.0, 5.0], [4.0, -2.0], [9.0, 0.5], [2.0, 7.0], [3.0, 3.0]];
        let once = StandardNormalizer.normalize(&data);
        let twice = StandardNormalizer.normalize(&once);

        assert_standardized(&twice);
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_variance_column_becomes_zeros() {
        let data = array![[7.0, 1.0], [7.0, 2.0], [7.0, 3.0]];
        let (scaler, normalized) = StandardScaler::fit_transform(&data);

        assert!(scaler.is_constant(0));
        assert!(!scaler.is_constant(1));
        assert!(normalized.column(0).iter().all(|&x| x == 0.0));
        assert!(normalized.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_empty_matrix() {
        let data = Array2::<f64>::zeros((0, 2));
        let normalized = StandardNormalizer.normalize(&data);
        assert_eq!(normalized.shape(), &[0, 2]);
    }

    #[test]
    fn test_single_row_is_all_zeros() {
        let data = array![[3.0, 4.0]];
        let normalized = StandardNormalizer.normalize(&data);
        assert_eq!(normalized, array![[0.0, 0.0]]);
    }

    #[test]
    fn test_dropped_rows_do_not_affect_statistics() {
        let dataset = Dataset::new(vec![
            Column::numeric("a", vec![Some(1.0), Some(1000.0), Some(3.0)]),
            Column::numeric("b", vec![Some(1.0), None, Some(3.0)]),
        ])
        .unwrap();

        let rows = complete_rows(&dataset, &["a", "b"]).unwrap();
        assert_eq!(rows, vec![0, 2]);

        let matrix = feature_matrix(&dataset, &["a", "b"], &rows).unwrap();
        assert_eq!(matrix, array![[1.0, 1.0], [3.0, 3.0]]);

        let scaler = StandardScaler::fit(&matrix);
        assert_abs_diff_eq!(scaler.mean[0], 2.0);
        assert_abs_diff_eq!(scaler.std[0], 1.0);
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let data = array![[1e308], [1.7e308], [-1.7e308], [3.0]];
        let (scaler, normalized) = StandardScaler::fit_transform(&data);

        assert!(scaler.mean.iter().all(|x| x.is_finite()));
        assert!(scaler.std.iter().all(|x| x.is_finite()));
        assert!(!scaler.is_constant(0));
        assert!(normalized.iter().all(|x| x.is_finite()));
        assert_standardized(&normalized);

        let values: Vec<f64> = normalized.iter().copied().collect();
        for (i, a) in values.iter().enumerate() {
            assert!(values[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_text_column_is_schema_error() {
        let dataset = Dataset::new(vec![Column::text("name", vec![Some("x".into())])]).unwrap();
        assert!(matches!(
            complete_rows(&dataset, &["name"]),
            Err(PipelineError::Schema(_))
        ));
        assert!(matches!(
            complete_rows(&dataset, &["missing"]),
            Err(PipelineError::Schema(_))
        ));
    }
}
