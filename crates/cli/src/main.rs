use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use facelineage_core::clustering::domain::cluster::ClusterReport;
use facelineage_core::clustering::domain::face_grouper::{FaceGrouper, IngestFace};
use facelineage_core::clustering::infrastructure::euclidean_face_grouper::EuclideanFaceGrouper;
use facelineage_core::embedding::domain::pfe::{Pfe, PfeBuilder};
use facelineage_core::pipeline::cluster_faces_use_case::ClusterFacesUseCase;
use facelineage_core::pipeline::pipeline_logger::LogPipelineLogger;
use facelineage_core::shared::config::ClusterConfig;
use facelineage_core::shared::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use facelineage_core::shared::face_detection::FaceDetection;
use facelineage_core::temporal::domain::era::EraEstimate;

/// Identity clustering for faces in historical photo collections.
#[derive(Parser)]
#[command(name = "facelineage")]
struct Cli {
    /// JSON config file (defaults to the user config directory, then built-ins).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Cluster faces into identities using uncertainty and era evidence.
    Cluster {
        /// JSON array of face records.
        input: PathBuf,

        /// Write the cluster report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Quick transitive grouping of a fresh upload by raw embedding distance.
    Group {
        /// JSON array of face records.
        input: PathBuf,

        /// Write the groups here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// One detected face as exported by the extraction step.
#[derive(Deserialize)]
struct FaceRecord {
    face_id: u64,
    #[serde(flatten)]
    detection: FaceDetection,
    #[serde(default)]
    era: Option<EraEstimate>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Cluster { input, output } => {
            validate_input(&input)?;
            run_cluster(&input, output.as_deref(), config)
        }
        Command::Group { input, output } => {
            validate_input(&input)?;
            run_group(&input, output.as_deref(), &config)
        }
    }
}

fn run_cluster(
    input: &Path,
    output: Option<&Path>,
    config: ClusterConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = read_records(input)?;
    let builder = PfeBuilder::from_config(&config);
    let faces: Vec<Pfe> = records
        .iter()
        .map(|r| builder.build(r.face_id, &r.detection, r.era))
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Loaded {} faces from {}", faces.len(), input.display());

    let mut use_case = ClusterFacesUseCase::new(config, Box::new(LogPipelineLogger::new()));
    let clusters = use_case.execute(faces)?;
    let reports: Vec<ClusterReport> = clusters.iter().map(|c| c.to_report()).collect();

    write_json(&serde_json::to_string_pretty(&reports)?, output)
}

fn run_group(
    input: &Path,
    output: Option<&Path>,
    config: &ClusterConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let faces: Vec<IngestFace> = read_records(input)?
        .into_iter()
        .map(|r| IngestFace::new(r.face_id, r.detection.embedding))
        .collect();

    let grouper = EuclideanFaceGrouper::from_thresholds(&config.thresholds);
    let groups = grouper.group(&faces)?;
    log::info!("Grouped {} faces into {} groups", faces.len(), groups.len());

    write_json(&serde_json::to_string_pretty(&groups)?, output)
}

fn load_config(explicit: Option<&Path>) -> Result<ClusterConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        log::info!("Using config {}", path.display());
        return Ok(ClusterConfig::load(path)?);
    }
    match default_config_path().filter(|p| p.exists()) {
        Some(path) => {
            log::info!("Using config {}", path.display());
            Ok(ClusterConfig::load(&path)?)
        }
        None => Ok(ClusterConfig::default()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn read_records(input: &Path) -> Result<Vec<FaceRecord>, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read {}: {e}", input.display()))?;
    let records: Vec<FaceRecord> = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid face records in {}: {e}", input.display()))?;
    ensure_unique_ids(&records)?;
    Ok(records)
}

fn ensure_unique_ids(records: &[FaceRecord]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(records.len());
    match records.iter().find(|r| !seen.insert(r.face_id)) {
        Some(dup) => Err(format!("Duplicate face_id {} in input", dup.face_id)),
        None => Ok(()),
    }
}

fn write_json(json: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, json)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            log::info!("Output written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn validate_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[u64]) -> Vec<FaceRecord> {
        let json: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"face_id": {id}, "embedding": [0.1, 0.2], "det_score": 0.9,
                        "bbox": [0.0, 0.0, 50.0, 50.0], "filename": "group.jpg"}}"#
                )
            })
            .collect();
        serde_json::from_str(&format!("[{}]", json.join(","))).unwrap()
    }

    #[test]
    fn test_unique_ids_accepted() {
        assert!(ensure_unique_ids(&records(&[1, 2, 3])).is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = ensure_unique_ids(&records(&[4, 9, 4])).unwrap_err();
        assert_eq!(err, "Duplicate face_id 4 in input");
    }
}
