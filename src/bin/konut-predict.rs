//! Estimate the price and luxury tier of a single property from persisted
//! artifacts. This is the contract the interactive form calls.

use std::path::PathBuf;

use izmir_konut::artifacts::load_artifacts;
use izmir_konut::config::PipelineConfig;
use izmir_konut::data::PropertyInput;
use izmir_konut::logging;
use izmir_konut::predict::Predictor;

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

    let artifact_dir = options
        .artifact_dir
        .clone()
        .unwrap_or_else(|| config.data.artifact_dir.clone());
    let artifacts = load_artifacts(&artifact_dir).map_err(|err| err.to_string())?;
    let predictor = Predictor::new(
        artifacts,
        config.luxury.clone(),
        config.validation.clone(),
        config.fallback_district_score,
    )
    .map_err(|err| err.to_string())?;

    if options.list_categories {
        println!("districts:");
        for district in predictor.districts() {
            println!("  {district}");
        }
        println!("property types:");
        for property_type in predictor.property_types() {
            println!("  {property_type}");
        }
        return Ok(());
    }

    let input = options.into_input()?;
    let prediction = predictor.predict(&input).map_err(|err| err.to_string())?;
    println!("estimated price: {:.0}", prediction.price);
    println!(
        "luxury: {} (score {:.1})",
        prediction.luxury.tier, prediction.luxury.value
    );
    println!(
        "  district term: {:.1}  age term: {:.1}  spatial term: {:.1}",
        prediction.luxury.breakdown.district_term,
        prediction.luxury.breakdown.age_term,
        prediction.luxury.breakdown.spatial_term
    );
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    artifact_dir: Option<PathBuf>,
    list_categories: bool,
    district: Option<String>,
    property_type: Option<String>,
    area_m2: Option<f64>,
    room_count: Option<u32>,
    living_room_count: Option<u32>,
    building_age: Option<u32>,
}

impl CliOptions {
    fn into_input(self) -> Result<PropertyInput, String> {
        Ok(PropertyInput {
            district: self.district.ok_or_else(|| missing("--district"))?,
            property_type: self.property_type.ok_or_else(|| missing("--type"))?,
            area_m2: self.area_m2.ok_or_else(|| missing("--area"))?,
            room_count: self.room_count.ok_or_else(|| missing("--rooms"))?,
            living_room_count: self
                .living_room_count
                .ok_or_else(|| missing("--living-rooms"))?,
            building_age: self.building_age.ok_or_else(|| missing("--age"))?,
        })
    }
}

fn missing(flag: &str) -> String {
    format!("{flag} is required\n{}", help_text())
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
            "--artifacts" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--artifacts requires a value".to_string())?;
                options.artifact_dir = Some(PathBuf::from(value));
            }
            "--list" => options.list_categories = true,
            "--district" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--district requires a value".to_string())?;
                options.district = Some(value.clone());
            }
            "--type" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--type requires a value".to_string())?;
                options.property_type = Some(value.clone());
            }
            "--area" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--area requires a value".to_string())?;
                options.area_m2 = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --area value: {value}"))?,
                );
            }
            "--rooms" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--rooms requires a value".to_string())?;
                options.room_count = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid --rooms value: {value}"))?,
                );
            }
            "--living-rooms" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--living-rooms requires a value".to_string())?;
                options.living_room_count = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid --living-rooms value: {value}"))?,
                );
            }
            "--age" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--age requires a value".to_string())?;
                options.building_age = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid --age value: {value}"))?,
                );
            }
            other => return Err(format!("Unknown argument: {other}\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "Usage: konut-predict [--config config.toml] [--artifacts artifacts/]",
        "                     --district NAME --type NAME --area M2",
        "                     --rooms N --living-rooms N --age YEARS",
        "",
        "  --list  Print the districts and property types seen during training",
    ]
    .join("\n")
}
