//! Model and scaler abstractions.
//!
//! The endpoint only ever sees the two traits below; the concrete types in
//! `scaler` and `linear` are what ships in the artifact files.

pub mod inference;
pub mod linear;
pub mod scaler;

use crate::error::ModelError;

/// A fitted normalization applied to raw features before inference.
pub trait ScalingTransform: Send + Sync {
    fn n_features(&self) -> usize;

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// A fitted function from a scaled feature vector to a scalar.
pub trait RegressionModel: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;
}

pub(crate) fn ensure_width(
    stage: &'static str,
    expected: usize,
    features: &[f64],
) -> Result<(), ModelError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            stage,
            expected,
            actual: features.len(),
        })
    }
}

pub(crate) fn check_finite(name: &str, values: &[f64]) -> Result<(), String> {
    if values.is_empty() {
        return Err(format!("{} is empty", name));
    }
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(format!("{}[{}] is not finite", name, index)),
        None => Ok(()),
    }
}
