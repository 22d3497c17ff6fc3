//! Least-squares gradient boosting over decision stumps.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::model::gbdt::{GbdtModel, MODEL_VERSION, Stump};

/// Training hyperparameters for stump boosting.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Learning rate applied per round.
    pub learning_rate: f64,
    /// Number of bins used for split search.
    pub bins: usize,
    /// Smallest table accepted for training.
    pub min_rows: usize,
    /// Fit on `ln(1 + price)` instead of the raw price.
    pub log_target: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            rounds: 500,
            learning_rate: 0.05,
            bins: 64,
            min_rows: 50,
            log_target: true,
        }
    }
}

/// In-memory regression dataset.
#[derive(Debug, Clone)]
pub struct TrainSet {
    /// Ordered feature names; every row follows this schema.
    pub feature_names: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f64>>,
    /// Target prices aligned with `x`.
    pub y: Vec<f64>,
}

/// Normalized split-gain share per feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Train a stump-GBDT regressor; also reports per-feature importance from
/// accumulated split gain.
pub fn train_gbdt(
    dataset: &TrainSet,
    options: &TrainOptions,
) -> Result<(GbdtModel, Vec<FeatureImportance>), PipelineError> {
    if dataset.x.len() != dataset.y.len() {
        return Err(PipelineError::InvalidModel(
            "mismatched feature/target lengths".to_string(),
        ));
    }
    if dataset.x.len() < options.min_rows.max(2) {
        return Err(PipelineError::InsufficientData {
            rows: dataset.x.len(),
            min_rows: options.min_rows.max(2),
        });
    }
    let d = dataset.feature_names.len();
    for row in &dataset.x {
        if row.len() != d {
            return Err(PipelineError::InvalidModel(
                "inconsistent feature row length".to_string(),
            ));
        }
    }

    let n = dataset.x.len();
    let targets: Vec<f64> = if options.log_target {
        dataset.y.iter().map(|&y| y.ln_1p()).collect()
    } else {
        dataset.y.clone()
    };

    let (mins, maxs) = compute_feature_min_max(&dataset.x, d);
    let binned = bin_features(&dataset.x, &mins, &maxs, options.bins);

    let base_prediction = targets.iter().sum::<f64>() / n as f64;
    let mut predictions = vec![base_prediction; n];
    let mut gain_per_feature = vec![0.0f64; d];
    let mut stumps = Vec::with_capacity(options.rounds);

    for _round in 0..options.rounds {
        let residuals: Vec<f64> = targets
            .iter()
            .zip(&predictions)
            .map(|(t, p)| t - p)
            .collect();
        let (stump, gain) =
            fit_best_stump(&binned, &dataset.x, &mins, &maxs, options.bins, &residuals);
        gain_per_feature[stump.feature_index as usize] += gain.max(0.0);
        for i in 0..n {
            predictions[i] += options.learning_rate * stump.predict(&dataset.x[i]);
        }
        stumps.push(stump);
    }

    let model = GbdtModel {
        model_version: MODEL_VERSION,
        feature_names: dataset.feature_names.clone(),
        base_prediction,
        learning_rate: options.learning_rate,
        stumps,
        log_target: options.log_target,
    };
    Ok((model, normalize_importance(&dataset.feature_names, &gain_per_feature)))
}

fn normalize_importance(names: &[String], gains: &[f64]) -> Vec<FeatureImportance> {
    let total: f64 = gains.iter().sum();
    let mut out: Vec<FeatureImportance> = names
        .iter()
        .zip(gains)
        .map(|(name, &gain)| FeatureImportance {
            feature: name.clone(),
            importance: if total > 0.0 { gain / total } else { 0.0 },
        })
        .collect();
    out.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

fn compute_feature_min_max(x: &[Vec<f64>], feature_len: usize) -> (Vec<f64>, Vec<f64>) {
    let mut mins = vec![f64::INFINITY; feature_len];
    let mut maxs = vec![f64::NEG_INFINITY; feature_len];
    for row in x {
        for (j, &v) in row.iter().take(feature_len).enumerate() {
            if v.is_finite() {
                mins[j] = mins[j].min(v);
                maxs[j] = maxs[j].max(v);
            }
        }
    }
    for j in 0..feature_len {
        if !mins[j].is_finite() || !maxs[j].is_finite() {
            mins[j] = 0.0;
            maxs[j] = 0.0;
        }
        if mins[j] == maxs[j] {
            maxs[j] = mins[j] + 1.0;
        }
    }
    (mins, maxs)
}

fn bin_features(x: &[Vec<f64>], mins: &[f64], maxs: &[f64], bins: usize) -> Vec<Vec<u8>> {
    let bins = bins.clamp(2, 256) as f64;
    let mut out: Vec<Vec<u8>> = Vec::with_capacity(x.len());
    for row in x {
        let mut binned = Vec::with_capacity(mins.len());
        for (j, &min) in mins.iter().enumerate() {
            let max = maxs[j];
            let v = row.get(j).copied().unwrap_or(0.0);
            let t = if max > min {
                ((v - min) / (max - min)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let b = (t * (bins - 1.0)).round() as u8;
            binned.push(b);
        }
        out.push(binned);
    }
    out
}

/// Fit the stump minimizing residual SSE over all features, returning it
/// with the achieved gain over the no-split baseline.
fn fit_best_stump(
    binned: &[Vec<u8>],
    x: &[Vec<f64>],
    mins: &[f64],
    maxs: &[f64],
    bins: usize,
    residuals: &[f64],
) -> (Stump, f64) {
    let n_features = mins.len();
    let bins = bins.clamp(2, 256);

    let mut best = BestSplit::default();
    for feature_idx in 0..n_features {
        let split = best_split_for_feature(binned, residuals, feature_idx, bins);
        if split.score < best.score {
            best = split;
        }
    }

    let feature_idx = best.feature_index;
    let threshold = threshold_for_bin(mins[feature_idx], maxs[feature_idx], best.split_bin, bins);
    let (left_value, right_value) = leaf_means_for_threshold(x, residuals, feature_idx, threshold);
    let stump = Stump {
        feature_index: feature_idx as u16,
        threshold,
        left_value,
        right_value,
    };

    let parent_sse = sse(residuals);
    let gain = if best.score.is_finite() {
        parent_sse - best.score
    } else {
        0.0
    };
    (stump, gain)
}

fn sse(residuals: &[f64]) -> f64 {
    let n = residuals.len().max(1) as f64;
    let sum: f64 = residuals.iter().sum();
    let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
    sum_sq - sum * sum / n
}

#[derive(Debug, Clone)]
struct BestSplit {
    score: f64,
    feature_index: usize,
    split_bin: usize,
}

impl Default for BestSplit {
    fn default() -> Self {
        Self {
            score: f64::INFINITY,
            feature_index: 0,
            split_bin: 0,
        }
    }
}

fn best_split_for_feature(
    binned: &[Vec<u8>],
    residuals: &[f64],
    feature_idx: usize,
    bins: usize,
) -> BestSplit {
    let mut counts = vec![0u32; bins];
    let mut sums = vec![0f64; bins];
    let mut sums_sq = vec![0f64; bins];
    for (i, row) in binned.iter().enumerate() {
        let b = row.get(feature_idx).copied().unwrap_or(0) as usize;
        let r = residuals[i];
        counts[b] += 1;
        sums[b] += r;
        sums_sq[b] += r * r;
    }
    let total_count: u32 = counts.iter().sum();
    if total_count == 0 {
        return BestSplit::default();
    }
    let total_sum: f64 = sums.iter().sum();
    let total_sum_sq: f64 = sums_sq.iter().sum();

    let mut best_score = f64::INFINITY;
    let mut best_bin = 0usize;

    let mut left_count = 0u32;
    let mut left_sum = 0f64;
    let mut left_sum_sq = 0f64;

    for split_bin in 0..(bins - 1) {
        left_count += counts[split_bin];
        left_sum += sums[split_bin];
        left_sum_sq += sums_sq[split_bin];
        let right_count = total_count - left_count;
        if left_count == 0 || right_count == 0 {
            continue;
        }
        let right_sum = total_sum - left_sum;
        let right_sum_sq = total_sum_sq - left_sum_sq;
        let left_sse = left_sum_sq - (left_sum * left_sum) / left_count as f64;
        let right_sse = right_sum_sq - (right_sum * right_sum) / right_count as f64;
        let score = left_sse + right_sse;
        if score < best_score {
            best_score = score;
            best_bin = split_bin;
        }
    }

    BestSplit {
        score: best_score,
        feature_index: feature_idx,
        split_bin: best_bin,
    }
}

fn threshold_for_bin(min: f64, max: f64, split_bin: usize, bins: usize) -> f64 {
    let t = ((split_bin + 1) as f64) / bins as f64;
    min + t * (max - min)
}

fn leaf_means_for_threshold(
    x: &[Vec<f64>],
    residuals: &[f64],
    feature_idx: usize,
    threshold: f64,
) -> (f64, f64) {
    let mut left_sum = 0.0f64;
    let mut left_count = 0u32;
    let mut right_sum = 0.0f64;
    let mut right_count = 0u32;
    for (i, row) in x.iter().enumerate() {
        let v = row.get(feature_idx).copied().unwrap_or(0.0);
        if v <= threshold {
            left_sum += residuals[i];
            left_count += 1;
        } else {
            right_sum += residuals[i];
            right_count += 1;
        }
    }
    let left_mean = if left_count == 0 {
        0.0
    } else {
        left_sum / f64::from(left_count)
    };
    let right_mean = if right_count == 0 {
        0.0
    } else {
        right_sum / f64::from(right_count)
    };
    (left_mean, right_mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset(n: usize) -> TrainSet {
        // Price is a clean step function of area: 100 below 50 m2, 200 above.
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let area = if i % 2 == 0 { 40.0 } else { 80.0 };
            x.push(vec![area, (i % 5) as f64]);
            y.push(if area < 50.0 { 100.0 } else { 200.0 });
        }
        TrainSet {
            feature_names: vec!["area_m2".into(), "noise".into()],
            x,
            y,
        }
    }

    fn options() -> TrainOptions {
        TrainOptions {
            rounds: 60,
            learning_rate: 0.3,
            bins: 16,
            min_rows: 2,
            log_target: false,
        }
    }

    #[test]
    fn empty_dataset_is_insufficient() {
        let dataset = TrainSet {
            feature_names: vec!["area_m2".into()],
            x: Vec::new(),
            y: Vec::new(),
        };
        let err = train_gbdt(&dataset, &TrainOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData { rows: 0, .. }));
    }

    #[test]
    fn below_min_rows_is_insufficient() {
        let dataset = step_dataset(10);
        let options = TrainOptions {
            min_rows: 50,
            ..options()
        };
        let err = train_gbdt(&dataset, &options).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientData {
                rows: 10,
                min_rows: 50
            }
        ));
    }

    #[test]
    fn learns_a_step_function() {
        let dataset = step_dataset(40);
        let (model, _) = train_gbdt(&dataset, &options()).unwrap();
        let low = model.predict(&[40.0, 0.0]);
        let high = model.predict(&[80.0, 0.0]);
        assert!((low - 100.0).abs() < 5.0, "low prediction was {low}");
        assert!((high - 200.0).abs() < 5.0, "high prediction was {high}");
    }

    #[test]
    fn importance_favors_the_predictive_feature() {
        let dataset = step_dataset(40);
        let (_, importance) = train_gbdt(&dataset, &options()).unwrap();
        assert_eq!(importance[0].feature, "area_m2");
        assert!(importance[0].importance > 0.9);
        let total: f64 = importance.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn training_is_deterministic() {
        let dataset = step_dataset(40);
        let (model_a, _) = train_gbdt(&dataset, &options()).unwrap();
        let (model_b, _) = train_gbdt(&dataset, &options()).unwrap();
        assert_eq!(
            model_a.predict(&[60.0, 1.0]).to_bits(),
            model_b.predict(&[60.0, 1.0]).to_bits()
        );
    }

    #[test]
    fn log_target_round_trips_through_prediction() {
        let mut dataset = step_dataset(40);
        dataset.y = dataset.y.iter().map(|&y| y * 10_000.0).collect();
        let options = TrainOptions {
            rounds: 120,
            log_target: true,
            ..options()
        };
        let (model, _) = train_gbdt(&dataset, &options).unwrap();
        let low = model.predict(&[40.0, 0.0]);
        assert!(
            (low - 1_000_000.0).abs() / 1_000_000.0 < 0.05,
            "low prediction was {low}"
        );
    }
}
