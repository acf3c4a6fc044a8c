use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatershedError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Invalid engine state: {0}")]
    State(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Contour extraction failed for marker {id}: {reason}")]
    ContourExtraction { id: i32, reason: String },

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}

impl WatershedError {
    /// Errors caused by misusing the engine rather than by the data it was given.
    /// These are surfaced to callers; everything else degrades to an empty result.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Initialization(_) | Self::State(_))
    }
}

pub type Result<T> = std::result::Result<T, WatershedError>;
