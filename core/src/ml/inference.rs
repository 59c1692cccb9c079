use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::linear::LinearRegression;
use super::scaler::ScalerArtifact;
use super::{RegressionModel, ScalingTransform};
use crate::error::{ArtifactError, PredictError};
use crate::types::FeatureVector;

struct LoadedArtifacts {
    scaler: Box<dyn ScalingTransform>,
    model: Box<dyn RegressionModel>,
}

/// Scaler + model pair, loaded once and read-only afterwards.
///
/// A failed load does not abort startup: the engine keeps the error and every
/// prediction reports it instead.
pub struct InferenceEngine {
    model_path: PathBuf,
    scaler_path: PathBuf,
    loaded: Option<LoadedArtifacts>,
    last_error: Option<String>,
}

impl InferenceEngine {
    pub fn load(model_path: PathBuf, scaler_path: PathBuf, n_features: usize) -> Self {
        let mut engine = Self {
            model_path,
            scaler_path,
            loaded: None,
            last_error: None,
        };

        match load_artifacts(&engine.model_path, &engine.scaler_path, n_features) {
            Ok(loaded) => {
                log::info!(
                    "[MODEL] Model and scaler loaded ({} features) from {}",
                    n_features,
                    engine.model_path.display()
                );
                engine.loaded = Some(loaded);
            }
            Err(error) => {
                log::error!("[MODEL] Error loading model or scaler: {}", error);
                engine.last_error = Some(error.to_string());
            }
        }

        engine
    }

    pub fn from_parts<S, M>(scaler: S, model: M) -> Self
    where
        S: ScalingTransform + 'static,
        M: RegressionModel + 'static,
    {
        Self {
            model_path: PathBuf::new(),
            scaler_path: PathBuf::new(),
            loaded: Some(LoadedArtifacts {
                scaler: Box::new(scaler),
                model: Box::new(model),
            }),
            last_error: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model_path: PathBuf::new(),
            scaler_path: PathBuf::new(),
            loaded: None,
            last_error: Some(reason.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    pub fn ensure_loaded(&self) -> Result<(), PredictError> {
        if self.loaded.is_some() {
            Ok(())
        } else {
            Err(self.not_loaded())
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let loaded = self.loaded.as_ref().ok_or_else(|| self.not_loaded())?;

        let scaled = loaded.scaler.transform(features.as_slice())?;
        let prediction = loaded.model.predict(&scaled)?;
        if !prediction.is_finite() {
            return Err(PredictError::Inference(format!(
                "model produced a non-finite value ({})",
                prediction
            )));
        }
        Ok(prediction)
    }

    fn not_loaded(&self) -> PredictError {
        PredictError::NotLoaded {
            reason: self
                .last_error
                .clone()
                .unwrap_or_else(|| "artifacts not loaded".to_string()),
        }
    }
}

fn load_artifacts(
    model_path: &Path,
    scaler_path: &Path,
    n_features: usize,
) -> Result<LoadedArtifacts, ArtifactError> {
    let scaler: ScalerArtifact = read_artifact(scaler_path)?;
    scaler.check().map_err(|reason| shape_error(scaler_path, reason))?;
    if scaler.n_features() != n_features {
        return Err(shape_error(
            scaler_path,
            format!(
                "scaler expects {} features, endpoint provides {}",
                scaler.n_features(),
                n_features
            ),
        ));
    }

    let model: LinearRegression = read_artifact(model_path)?;
    model.check().map_err(|reason| shape_error(model_path, reason))?;
    if model.n_features() != n_features {
        return Err(shape_error(
            model_path,
            format!(
                "model expects {} features, endpoint provides {}",
                model.n_features(),
                n_features
            ),
        ));
    }

    Ok(LoadedArtifacts {
        scaler: Box::new(scaler),
        model: Box::new(model),
    })
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    if path.is_dir() {
        return Err(ArtifactError::NotAFile(path.to_path_buf()));
    }

    let data = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice::<T>(&data).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn shape_error(path: &Path, reason: String) -> ArtifactError {
    ArtifactError::Shape {
        path: path.to_path_buf(),
        reason,
    }
}
