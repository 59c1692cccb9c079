//! HTTP inference endpoint for pre-trained linear regression models.
//!
//! One process serves one [`types::Variant`]: a fixed feature schema, a
//! scaler + model pair loaded once at startup, and a label band table.

pub mod banding;
pub mod config;
pub mod error;
pub mod http;
pub mod ml;
pub mod telemetry;
pub mod types;
pub mod variants;

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::config::ServeConfig;
use crate::http::ApiState;
use crate::ml::inference::InferenceEngine;
use crate::telemetry::TelemetryStore;

pub async fn run_until_shutdown(
    config: ServeConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let schema = config.variant.schema();
    log::info!(
        "[SERVE] Starting {} endpoint ({} features)",
        config.variant.as_str(),
        schema.features.len()
    );

    let engine = Arc::new(InferenceEngine::load(
        config.model_path.clone(),
        config.scaler_path.clone(),
        schema.features.len(),
    ));
    if !engine.is_loaded() {
        log::warn!("[SERVE] Continuing without a model; /predict will answer 500");
    }
    if config.legacy_error_status {
        log::info!("[SERVE] Legacy error status enabled; failures answer HTTP 200");
    }

    let state = ApiState {
        schema,
        engine,
        telemetry: Arc::new(TelemetryStore::new()),
        static_dir: config.static_dir.clone(),
        legacy_error_status: config.legacy_error_status,
    };
    let app = crate::http::router(state, &config.cors_origin);

    crate::http::serve(config.api_addr, app, async move {
        let _ = shutdown_rx.await;
        log::info!("[SERVE] Shutting down gracefully...");
    })
    .await
}
