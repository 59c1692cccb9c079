use serde::Deserialize;

use super::{check_finite, ensure_width, RegressionModel};
use crate::error::ModelError;

/// Ordinary least squares weights: `intercept + coefficients · x`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearRegression {
    #[serde(alias = "coef_")]
    coefficients: Vec<f64>,
    #[serde(alias = "intercept_")]
    intercept: f64,
}

impl LinearRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn check(&self) -> Result<(), String> {
        check_finite("coefficients", &self.coefficients)?;
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        Ok(())
    }
}

impl RegressionModel for LinearRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        ensure_width("LinearRegression", self.n_features(), features)?;
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(weight, value)| weight * value)
            .sum();
        Ok(self.intercept + dot)
    }
}
