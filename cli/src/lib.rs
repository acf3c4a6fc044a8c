use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum::{Display, EnumString, VariantNames};
use thiserror::Error;
use tracing::info;
use watershed::{EngineConfig, Marker, PolygonSet, WatershedEngine, WatershedError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    EngineError(#[from] WatershedError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// How segmentation results are written
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// FeatureCollection with one Polygon feature per region outline
    #[default]
    Geojson,
    /// Plain JSON array of polygons
    Json,
}

/// One segmentation run: source image, scribbles and where to put the result
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SegmentationJob {
    /// Image to segment
    pub image: String,
    /// Working resolution control; higher means finer segmentation
    pub sensitivity: f64,
    /// Output file
    pub output: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Leave out polygons too small or malformed to be annotations
    #[serde(default)]
    pub drop_invalid: bool,
    #[serde(default)]
    pub engine: EngineConfig,
    pub markers: Vec<Marker>,
}

impl SegmentationJob {
    /// Load SegmentationJob configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load SegmentationJob configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load SegmentationJob configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load SegmentationJob configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// JSON schema of the job file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SegmentationJob)
    }
}

/// Read a JSON array of markers, as exported by the annotation UI
pub fn load_markers<P: AsRef<Path>>(path: P) -> Result<Vec<Marker>, CliError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Segment the job's image and collect the resulting polygons
pub fn run_job(job: &SegmentationJob) -> Result<PolygonSet, CliError> {
    let source = image::open(&job.image)?;
    info!(
        "Segmenting {} ({}x{}) with {} markers at sensitivity {}",
        job.image,
        source.width(),
        source.height(),
        job.markers.len(),
        job.sensitivity
    );

    let mut engine = WatershedEngine::builder()
        .with_config(job.engine.clone())
        .build();
    engine.initialize(&source)?;
    let polygons = engine.execute_segmentation(&job.markers, job.sensitivity)?;
    engine.teardown();

    let mut set = PolygonSet::new(polygons, source.width(), source.height());
    if job.drop_invalid {
        let before = set.polygons.len();
        set.retain_valid();
        info!("Dropped {} invalid polygons", before - set.polygons.len());
    }

    Ok(set)
}

/// Write `set` to `path` in the requested format
pub fn write_output<P: AsRef<Path>>(set: &PolygonSet, path: P, format: OutputFormat) -> Result<(), CliError> {
    let content = match format {
        OutputFormat::Geojson => set.to_geojson_string()?,
        OutputFormat::Json => serde_json::to_string_pretty(&set.polygons)?,
    };
    fs::write(path, content)?;
    Ok(())
}
