//! One-shot batch training: load the raw listings CSV, clean and encode it,
//! fit the price regressor, report held-out metrics, and persist the
//! artifact directory.

use std::path::PathBuf;

use izmir_konut::artifacts::{TrainedArtifacts, save_artifacts};
use izmir_konut::config::PipelineConfig;
use izmir_konut::data::clean::clean_records;
use izmir_konut::data::load_csv;
use izmir_konut::encode::{DistrictScores, PropertyTypes};
use izmir_konut::error::PipelineError;
use izmir_konut::features::FeatureEncoder;
use izmir_konut::logging;
use izmir_konut::model::metrics::regression_metrics;
use izmir_konut::model::split_train_test;
use izmir_konut::model::train::{TrainOptions, TrainSet, train_gbdt};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let config = match &options.config_path {
        Some(path) => PipelineConfig::load(path).map_err(|err| err.to_string())?,
        None => PipelineConfig::default(),
    };
    if let Err(err) = logging::init(&config.data.log_dir) {
        eprintln!("Logging disabled: {err}");
    }

    let csv_path = options
        .csv_path
        .clone()
        .unwrap_or_else(|| config.data.raw_csv.clone());
    let artifact_dir = options
        .artifact_dir
        .clone()
        .unwrap_or_else(|| config.data.artifact_dir.clone());

    let raw = load_csv(&csv_path).map_err(|err| err.to_string())?;
    let (records, stats) = clean_records(&raw, &config.cleaning.training);
    tracing::info!(
        "Training table: {} rows ({} outliers dropped)",
        stats.kept_rows,
        stats.dropped_rows
    );

    let districts = DistrictScores::fit(&records);
    let property_types = PropertyTypes::fit(&records);
    let encoder = FeatureEncoder::new(districts.clone(), property_types.clone(), config.luxury.clone());

    let mut x = Vec::with_capacity(records.len());
    let mut y = Vec::with_capacity(records.len());
    for record in &records {
        let (features, _) = encoder.encode_record(record).map_err(|err| err.to_string())?;
        x.push(features);
        y.push(record.price);
    }

    let (train_idx, test_idx) =
        split_train_test(records.len(), config.model.test_ratio, config.model.seed);
    let train_set = TrainSet {
        feature_names: encoder.feature_names(),
        x: select(&x, &train_idx),
        y: select_scalar(&y, &train_idx),
    };
    check_min_rows(records.len(), config.model.min_rows).map_err(|err| err.to_string())?;

    let train_options = TrainOptions {
        rounds: config.model.rounds,
        learning_rate: config.model.learning_rate,
        bins: config.model.bins,
        min_rows: 2,
        log_target: config.model.log_target,
    };
    let (model, importance) = train_gbdt(&train_set, &train_options).map_err(|err| err.to_string())?;

    let test_truth = select_scalar(&y, &test_idx);
    let test_predictions: Vec<f64> = test_idx.iter().map(|&i| model.predict(&x[i])).collect();
    let metrics = regression_metrics(&test_truth, &test_predictions);
    tracing::info!(
        "Held-out metrics: r2={:.3} mae={:.0} rmse={:.0} (n={})",
        metrics.r2,
        metrics.mae,
        metrics.rmse,
        metrics.n_test
    );

    println!("r2:   {:.3}", metrics.r2);
    println!("mae:  {:.0}", metrics.mae);
    println!("rmse: {:.0}", metrics.rmse);
    println!("feature importance:");
    for entry in &importance {
        println!("  {:<24} {:.3}", entry.feature, entry.importance);
    }

    let artifacts = TrainedArtifacts {
        model,
        district_scores: districts,
        property_types,
        metrics,
        importance,
    };
    save_artifacts(&artifact_dir, &artifacts).map_err(|err| err.to_string())?;
    println!("artifacts written to {}", artifact_dir.display());
    Ok(())
}

/// The whole-table minimum guards the split itself; `train_gbdt` checks the
/// train partition again.
fn check_min_rows(rows: usize, min_rows: usize) -> Result<(), PipelineError> {
    if rows < min_rows.max(2) {
        return Err(PipelineError::InsufficientData {
            rows,
            min_rows: min_rows.max(2),
        });
    }
    Ok(())
}

fn select(rows: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    indices.iter().map(|&i| rows[i].clone()).collect()
}

fn select_scalar(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    artifact_dir: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--csv" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--csv requires a value".to_string())?;
                options.csv_path = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--out requires a value".to_string())?;
                options.artifact_dir = Some(PathBuf::from(value));
            }
            other => return Err(format!("Unknown argument: {other}\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "Usage: konut-train [--config config.toml] [--csv listings.csv] [--out artifacts/]",
        "",
        "  --config  Pipeline configuration TOML (defaults apply when omitted)",
        "  --csv     Raw listings CSV (overrides the configured path)",
        "  --out     Artifact output directory (overrides the configured path)",
    ]
    .join("\n")
}
