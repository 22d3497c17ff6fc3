//! Evaluation metrics for regression models.

use serde::{Deserialize, Serialize};

/// Held-out evaluation snapshot, persisted alongside the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination.
    pub r2: f64,
    /// Mean absolute error, in price units.
    pub mae: f64,
    /// Root-mean-square error, in price units.
    pub rmse: f64,
    /// Number of held-out rows the metrics were computed on.
    pub n_test: usize,
}

/// Compute R², MAE, and RMSE for paired truth/prediction slices.
///
/// An empty input yields all-zero metrics; a constant truth vector yields
/// `r2 = 0` rather than a division by zero.
pub fn regression_metrics(truth: &[f64], predicted: &[f64]) -> RegressionMetrics {
    let n = truth.len().min(predicted.len());
    if n == 0 {
        return RegressionMetrics {
            r2: 0.0,
            mae: 0.0,
            rmse: 0.0,
            n_test: 0,
        };
    }
    let mean = truth[..n].iter().sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut abs_sum = 0.0;
    for i in 0..n {
        let err = truth[i] - predicted[i];
        ss_res += err * err;
        abs_sum += err.abs();
        let dev = truth[i] - mean;
        ss_tot += dev * dev;
    }
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
    RegressionMetrics {
        r2,
        mae: abs_sum / n as f64,
        rmse: (ss_res / n as f64).sqrt(),
        n_test: n,
    }
}
