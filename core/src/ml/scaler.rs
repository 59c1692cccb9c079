use serde::Deserialize;

use super::{check_finite, ensure_width, ScalingTransform};
use crate::error::ModelError;

/// Scaler artifact as stored on disk, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerArtifact {
    pub fn check(&self) -> Result<(), String> {
        match self {
            ScalerArtifact::Standard(scaler) => scaler.check(),
            ScalerArtifact::MinMax(scaler) => scaler.check(),
        }
    }
}

impl ScalingTransform for ScalerArtifact {
    fn n_features(&self) -> usize {
        match self {
            ScalerArtifact::Standard(scaler) => scaler.n_features(),
            ScalerArtifact::MinMax(scaler) => scaler.n_features(),
        }
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        match self {
            ScalerArtifact::Standard(scaler) => scaler.transform(features),
            ScalerArtifact::MinMax(scaler) => scaler.transform(features),
        }
    }
}

/// `z = (x - mean) / scale`. A zero scale entry leaves the centered value
/// unscaled, as constant training columns do.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    #[serde(alias = "mean_")]
    mean: Vec<f64>,
    #[serde(alias = "scale_")]
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    fn check(&self) -> Result<(), String> {
        check_finite("mean", &self.mean)?;
        check_finite("scale", &self.scale)?;
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        Ok(())
    }
}

impl ScalingTransform for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        ensure_width("StandardScaler", self.n_features(), features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| {
                let divisor = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / divisor
            })
            .collect())
    }
}

/// `z = x * scale + min`, with `min` and `scale` already folded from the
/// fitted data range.
#[derive(Debug, Clone, Deserialize)]
pub struct MinMaxScaler {
    #[serde(alias = "min_")]
    min: Vec<f64>,
    #[serde(alias = "scale_")]
    scale: Vec<f64>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { min, scale }
    }

    fn check(&self) -> Result<(), String> {
        check_finite("min", &self.min)?;
        check_finite("scale", &self.scale)?;
        if self.min.len() != self.scale.len() {
            return Err(format!(
                "min has {} entries but scale has {}",
                self.min.len(),
                self.scale.len()
            ));
        }
        Ok(())
    }
}

impl ScalingTransform for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.min.len()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        ensure_width("MinMaxScaler", self.n_features(), features)?;
        Ok(features
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(value, (min, scale))| value * scale + min)
            .collect())
    }
}
