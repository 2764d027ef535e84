use thiserror::Error;

use genomark_core::GenomarkCoreError;

#[derive(Error, Debug)]
pub enum MarkerError {
    #[error(transparent)]
    Core(#[from] GenomarkCoreError),

    #[error("Invalid frame {0}: expected one of -1, 0, 1, 2")]
    InvalidFrame(i64),

    #[error("Cannot apply {variant} to {marker}: {reason}")]
    UnsupportedVariant {
        variant: String,
        marker: String,
        reason: String,
    },

    #[error("Variant {0} is on the minus strand, convert it to the plus strand first")]
    MinusStrandVariant(String),

    #[error("Feature {child} is not on chromosome {chr}")]
    ChromosomeMismatch { child: String, chr: String },

    #[error("Frame correction failed for transcript {transcript}: {reason}")]
    FrameCorrection { transcript: String, reason: String },

    #[error("Expected a {expected} feature, found {found}")]
    InvalidKind { expected: String, found: String },

    #[error("Chromosome not found: {0}")]
    ChromosomeNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
