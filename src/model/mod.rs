//! Gradient-boosted stump regression: model, training, evaluation.

pub mod gbdt;
pub mod metrics;
pub mod train;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Split row indices into seeded, shuffled train/test partitions.
///
/// Deterministic for a fixed seed; the test partition holds at least one row
/// whenever `test_ratio > 0` and there are at least two rows.
pub fn split_train_test(n_rows: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut test_count = (n_rows as f64 * test_ratio).round() as usize;
    if test_ratio > 0.0 && test_count == 0 && n_rows > 1 {
        test_count = 1;
    }
    if test_count >= n_rows {
        test_count = n_rows.saturating_sub(1);
    }
    let test = indices.split_off(n_rows - test_count);
    (indices, test)
}
