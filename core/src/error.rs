use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

/// Failures while loading model or scaler artifacts at startup.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("artifact path must be a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("artifact read error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact ({}): {reason}", .path.display())]
    Shape { path: PathBuf, reason: String },
}

/// Shape errors raised by a transform or model at call time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("X has {actual} features, but {stage} is expecting {expected} features as input")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Everything a `/predict` call can fail with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("Model or scaler not loaded. Please check file paths.")]
    NotLoaded { reason: String },

    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    /// Domain constraint violations carry their message verbatim.
    #[error("{0}")]
    OutOfRange(String),

    #[error("Prediction failed: {0}")]
    Inference(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::OutOfRange(_) => StatusCode::BAD_REQUEST,
            Self::NotLoaded { .. } | Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<ModelError> for PredictError {
    fn from(error: ModelError) -> Self {
        Self::Inference(error.to_string())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("unknown variant '{0}' (expected employee_salary, stock_market or wfh_burnout)")]
    UnknownVariant(String),

    #[error("invalid listen address '{0}'")]
    InvalidAddr(String),
}
