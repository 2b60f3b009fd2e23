//! Error types for Floorsight

use crate::models::{EntityKind, Stage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloorsightError {
    // Lookup errors
    #[error("{entity} not found: {code}")]
    NotFound { entity: EntityKind, code: String },

    #[error("No floor range of building {building} covers floor {floor}")]
    FloorNotFound { building: String, floor: i32 },

    // Region errors
    #[error("Invalid region: {reason}")]
    InvalidRegion { reason: String },

    #[error("Dataset {dataset} is incomplete: missing {missing}")]
    DatasetIncomplete { dataset: String, missing: String },

    // Remote model errors
    #[error("Remote inference failed at {stage}: {reason}")]
    RemoteInference { stage: Stage, reason: String },

    #[error("Remote inference at {stage} timed out after {seconds}s")]
    RemoteInferenceTimeout { stage: Stage, seconds: u64 },

    // Imaging errors
    #[error("Image codec error: {0}")]
    ImageCodec(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<image::ImageError> for FloorsightError {
    fn from(err: image::ImageError) -> Self {
        FloorsightError::ImageCodec(err.to_string())
    }
}

impl From<serde_json::Error> for FloorsightError {
    fn from(err: serde_json::Error) -> Self {
        FloorsightError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FloorsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_code() {
        let err = FloorsightError::NotFound {
            entity: EntityKind::Apartment,
            code: "CH07".to_string(),
        };
        assert_eq!(err.to_string(), "Apartment not found: CH07");
    }

    #[test]
    fn test_remote_errors_name_the_stage() {
        let err = FloorsightError::RemoteInferenceTimeout {
            stage: Stage::StageTwo,
            seconds: 120,
        };
        assert_eq!(err.to_string(), "Remote inference at stage 2 timed out after 120s");
    }
}
