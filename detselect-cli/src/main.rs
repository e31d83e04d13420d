use clap::Parser;
use detselect::lowlevel::Slot;
use detselect::{Detection, Detector, DetectorError, Selector, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Detection-driven image selection (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Override the detections file named in the config.
    #[arg(short, long, value_name = "FILE")]
    detections: Option<PathBuf>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for pool decisions.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    labels: Vec<String>,
    selection_size: usize,
    multipliers: Option<Vec<f32>>,
    detections_path: String,
    output_path: Option<String>,
    include_pools: bool,
}

#[derive(Debug, Deserialize)]
struct DetectionJson {
    label: String,
    confidence: f32,
}

impl From<&DetectionJson> for Detection {
    fn from(value: &DetectionJson) -> Self {
        Detection::new(value.label.clone(), value.confidence)
    }
}

/// One image from an offline detector run.
#[derive(Debug, Deserialize)]
struct DetectionRecord {
    image_id: String,
    #[serde(default)]
    detections: Vec<DetectionJson>,
    /// Set when the detector could not process the image.
    #[serde(default)]
    error: Option<String>,
}

/// Replays recorded detector output.
struct RecordedDetector;

impl Detector for RecordedDetector {
    type Image = DetectionRecord;

    fn detect(&self, image: &DetectionRecord) -> Result<Vec<Detection>, DetectorError> {
        if let Some(reason) = &image.error {
            return Err(reason.clone().into());
        }
        Ok(image.detections.iter().map(Detection::from).collect())
    }
}

#[derive(Debug, Serialize)]
struct CountRecord {
    image_id: String,
    weighted_count: f32,
    average_score: f32,
}

#[derive(Debug, Serialize)]
struct ScoreRecord {
    image_id: String,
    average_score: f32,
}

#[derive(Debug, Serialize)]
struct Pools {
    count: Vec<CountRecord>,
    score: Vec<ScoreRecord>,
}

#[derive(Debug, Serialize)]
struct Skipped {
    image_id: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct Output {
    selected: Vec<String>,
    processed: usize,
    skipped: Vec<Skipped>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pools: Option<Pools>,
}

fn pools(selector: &Selector) -> Pools {
    let count = selector
        .count_pool()
        .slots()
        .iter()
        .filter_map(Slot::as_filled)
        .map(|entry| CountRecord {
            image_id: entry.image_id.clone(),
            weighted_count: entry.weighted_count,
            average_score: entry.average_score,
        })
        .collect();
    let score = selector
        .score_pool()
        .slots()
        .iter()
        .filter_map(Slot::as_filled)
        .map(|entry| ScoreRecord {
            image_id: entry.image_id.clone(),
            average_score: entry.average_score,
        })
        .collect();
    Pools { count, score }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        let filter = EnvFilter::from_default_env().add_directive("detselect=debug".parse()?);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let detections_path = match cli.detections {
        Some(path) => path,
        None if !config.detections_path.is_empty() => PathBuf::from(&config.detections_path),
        None => return Err("detections_path must be set in the config".into()),
    };

    let mut selector_config = SelectorConfig::new(config.labels, config.selection_size);
    if let Some(multipliers) = config.multipliers {
        selector_config = selector_config.with_multipliers(multipliers);
    }
    let mut selector = Selector::new(selector_config)?;

    let records: Vec<DetectionRecord> =
        serde_json::from_str(&fs::read_to_string(&detections_path)?)?;
    let images: Vec<(&str, &DetectionRecord)> = records
        .iter()
        .map(|record| (record.image_id.as_str(), record))
        .collect();

    let mut skipped = Vec::new();
    for ((image_id, _), result) in images
        .iter()
        .zip(selector.submit_images_par(&RecordedDetector, &images))
    {
        if let Err(err) = result {
            tracing::warn!(image_id = *image_id, error = %err, "skipping image");
            skipped.push(Skipped {
                image_id: (*image_id).to_owned(),
                reason: err.to_string(),
            });
        }
    }

    let stats = selector.stats();
    tracing::info!(
        submitted = stats.submitted,
        count_admissions = stats.count_admissions,
        score_admissions = stats.score_admissions,
        discarded = stats.discarded,
        failures = stats.detection_failures,
        "selection finished"
    );

    let output = Output {
        selected: selector.selected_ids(),
        processed: stats.submitted,
        skipped,
        pools: config.include_pools.then(|| pools(&selector)),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
