use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::error::PredictError;
use crate::ml::inference::InferenceEngine;
use crate::telemetry::{StatsSnapshot, TelemetryStore};
use crate::types::{FeatureVector, Variant};
use crate::variants::{PredictionResponse, VariantSchema};

#[derive(Clone)]
pub struct ApiState {
    pub schema: &'static VariantSchema,
    pub engine: Arc<InferenceEngine>,
    pub telemetry: Arc<TelemetryStore>,
    pub static_dir: PathBuf,
    pub legacy_error_status: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    variant: Variant,
    model_loaded: bool,
    model_path: String,
    scaler_path: String,
    load_error: Option<String>,
    features: Vec<&'static str>,
    stats: StatsSnapshot,
}

pub fn router(state: ApiState, cors_origin: &str) -> Router {
    let static_files = ServeDir::new(state.static_dir.clone());

    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .nest_service("/static", static_files)
        .with_state(state)
        .layer(cors_layer(cors_origin))
}

pub async fn serve<F>(addr: SocketAddr, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("[API] Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index(State(state): State<ApiState>) -> Html<String> {
    let page_path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&page_path).await {
        Ok(page) => Html(page),
        Err(error) => {
            log::debug!(
                "[API] {} unavailable ({}), serving built-in page",
                page_path.display(),
                error
            );
            Html(fallback_page(state.schema))
        }
    }
}

async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let outcome = run_prediction(&state, payload);
    state.telemetry.record(&outcome).await;

    match outcome {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => error_response(&error, state.legacy_error_status),
    }
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let stats = state.telemetry.snapshot_stats().await;

    Json(HealthResponse {
        variant: state.schema.variant,
        model_loaded: state.engine.is_loaded(),
        model_path: state.engine.model_path().to_string_lossy().to_string(),
        scaler_path: state.engine.scaler_path().to_string_lossy().to_string(),
        load_error: state.engine.last_error().map(str::to_string),
        features: state.schema.feature_names(),
        stats,
    })
}

// Artifact availability is checked before the body so a broken deployment
// answers 500 regardless of input.
fn run_prediction(
    state: &ApiState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<PredictionResponse, PredictError> {
    state.engine.ensure_loaded()?;

    let Json(body) = payload.map_err(|rejection| PredictError::InvalidInput(rejection.body_text()))?;
    let fields = match body {
        Value::Object(fields) => fields,
        _ => {
            return Err(PredictError::InvalidInput(
                "request body must be a JSON object".to_string(),
            ))
        }
    };

    let features = FeatureVector::extract(state.schema.features, &fields)?;
    state.schema.validate(&features)?;

    let prediction = state.engine.predict(&features)?;
    let result = state.schema.classify(prediction)?;
    state.schema.respond(&features, &result)
}

fn error_response(error: &PredictError, legacy_error_status: bool) -> Response {
    match error {
        PredictError::NotLoaded { reason } => {
            log::error!("[API] Prediction unavailable: {}", reason)
        }
        PredictError::Inference(_) => log::error!("[API] {}", error),
        PredictError::InvalidInput(_) | PredictError::OutOfRange(_) => {
            log::debug!("[API] Rejected request: {}", error)
        }
    }

    let status = if legacy_error_status {
        StatusCode::OK
    } else {
        error.status()
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn fallback_page(schema: &VariantSchema) -> String {
    let fields = schema
        .features
        .iter()
        .map(|spec| format!("<li><code>{}</code></li>", spec.name))
        .collect::<Vec<_>>()
        .join("");

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h1>{title}</h1><p>POST a JSON object with these fields to <code>/predict</code>:</p>\
         <ul>{fields}</ul></body></html>",
        title = schema.title,
        fields = fields
    )
}

fn cors_layer(allowed: &str) -> CorsLayer {
    let cors = if allowed.trim() == "*" {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = allowed
            .split(',')
            .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    cors.allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::linear::LinearRegression;
    use crate::ml::scaler::StandardScaler;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn identity_engine(coefficients: Vec<f64>) -> InferenceEngine {
        let width = coefficients.len();
        InferenceEngine::from_parts(
            StandardScaler::new(vec![0.0; width], vec![1.0; width]),
            LinearRegression::new(coefficients, 0.0),
        )
    }

    fn state(variant: Variant, engine: InferenceEngine) -> ApiState {
        ApiState {
            schema: variant.schema(),
            engine: Arc::new(engine),
            telemetry: Arc::new(TelemetryStore::new()),
            static_dir: std::env::temp_dir().join("regression-serve-no-such-dir"),
            legacy_error_status: false,
        }
    }

    fn salary_state() -> ApiState {
        // predicted salary = 1000 * age
        state(Variant::EmployeeSalary, identity_engine(vec![1000.0, 0.0]))
    }

    async fn call(state: &ApiState, body: Value) -> (StatusCode, Value) {
        let response = predict(State(state.clone()), Ok(Json(body))).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).expect("json body");
        (status, value)
    }

    #[tokio::test]
    async fn salary_prediction_succeeds_with_band() {
        let state = salary_state();
        let (status, body) = call(&state, json!({"age": 50, "experience": 0})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_salary"], json!(50000.0));
        assert_eq!(body["salary_level"], json!("Mid Level"));
        assert_eq!(body["age"], json!(50.0));
        assert_eq!(body["experience"], json!(0.0));

        let (_, body) = call(&state, json!({"age": 80, "experience": 20})).await;
        assert_eq!(body["salary_level"], json!("Senior Level"));
    }

    #[tokio::test]
    async fn salary_range_violations_are_bad_requests() {
        let state = salary_state();

        let (status, body) = call(&state, json!({"age": 17, "experience": 0})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Age must be between 18 and 100"}));

        let (status, body) = call(&state, json!({"age": 101, "experience": 0})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Age must be between 18 and 100"));

        let (status, body) = call(&state, json!({"age": 30, "experience": 13})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            json!("Experience cannot be negative or greater than (age - 18)")
        );

        let (status, _) = call(&state, json!({"age": 30, "experience": -1})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_and_malformed_input_is_rejected() {
        let state = salary_state();

        let (status, body) = call(&state, json!({"age": 30})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            json!("Invalid input data: missing required field 'experience'")
        );

        let (status, body) = call(&state, json!([30, 5])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            json!("Invalid input data: request body must be a JSON object")
        );

        let (status, _) = call(&state, json!({"age": "thirty", "experience": 5})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let stats = state.telemetry.snapshot_stats().await;
        assert_eq!(stats.requests, 3);
        assert_eq!(stats.client_errors, 3);
    }

    #[tokio::test]
    async fn unloaded_engine_fails_every_request() {
        let state = state(
            Variant::EmployeeSalary,
            InferenceEngine::unavailable("artifact not found: model.json"),
        );

        for body in [json!({"age": 30, "experience": 5}), json!({}), json!("garbage")] {
            let (status, response) = call(&state, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                response["error"],
                json!("Model or scaler not loaded. Please check file paths.")
            );
        }

        let stats = state.telemetry.snapshot_stats().await;
        assert_eq!(stats.server_errors, 3);
    }

    #[tokio::test]
    async fn inference_failures_are_server_errors() {
        // Model expects three features, salary schema supplies two.
        let state = state(
            Variant::EmployeeSalary,
            InferenceEngine::from_parts(
                StandardScaler::new(vec![0.0; 2], vec![1.0; 2]),
                LinearRegression::new(vec![1.0; 3], 0.0),
            ),
        );

        let (status, body) = call(&state, json!({"age": 30, "experience": 5})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().expect("error text");
        assert!(message.starts_with("Prediction failed: "), "{message}");
    }

    #[tokio::test]
    async fn repeated_requests_are_identical() {
        let state = state(
            Variant::WfhBurnout,
            identity_engine(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        );
        let request = json!({
            "work_hours": 30,
            "screen_time_hours": 6.5,
            "meetings_count": 4,
            "breaks_taken": 2,
            "after_hours_work": 1,
            "sleep_hours": 7,
            "task_completion_rate": 0.8,
            "day_type_Weekend": 0
        });

        let first = call(&state, request.clone()).await;
        let second = call(&state, request).await;
        assert_eq!(first, second);
        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(
            first.1,
            json!({
                "burnout_score": 30.0,
                "burnout_level": "Moderate",
                "message": "Consider taking breaks and managing workload."
            })
        );
    }

    #[tokio::test]
    async fn stock_accepts_form_strings() {
        let state = state(
            Variant::StockMarket,
            identity_engine(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        );
        let (status, body) = call(
            &state,
            json!({
                "open": "100", "high": "110", "low": "95", "close": "105.4567",
                "volume": "120000", "year": "2024", "month": "3", "day": "14"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"prediction": 105.46}));
    }

    #[tokio::test]
    async fn legacy_status_answers_ok_with_error_field() {
        let mut state = state(Variant::StockMarket, identity_engine(vec![1.0; 8]));
        state.legacy_error_status = true;

        let (status, body) = call(&state, json!({"open": 1})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"error": "Invalid input data: missing required field 'high'"})
        );
    }

    #[tokio::test]
    async fn health_reports_load_state() {
        let state = state(
            Variant::StockMarket,
            InferenceEngine::unavailable("artifact not found: scaler.json"),
        );
        let _ = call(&state, json!({})).await;

        let Json(report) = health(State(state.clone())).await;
        assert!(!report.model_loaded);
        assert_eq!(report.variant, Variant::StockMarket);
        assert_eq!(
            report.load_error.as_deref(),
            Some("artifact not found: scaler.json")
        );
        assert_eq!(report.features.len(), 8);
        assert_eq!(report.stats.server_errors, 1);
    }

    #[tokio::test]
    async fn index_falls_back_to_built_in_page() {
        let state = salary_state();
        let Html(page) = index(State(state)).await;
        assert!(page.contains("Employee Salary Prediction"));
        assert!(page.contains("<code>experience</code>"));
    }

    #[tokio::test]
    async fn index_serves_page_from_static_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<h1>custom</h1>").expect("write");

        let mut state = salary_state();
        state.static_dir = dir.path().to_path_buf();
        let Html(page) = index(State(state)).await;
        assert_eq!(page, "<h1>custom</h1>");
    }

    #[test]
    fn router_builds_with_wildcard_cors() {
        let _app = router(salary_state(), "*");
        let _app = router(salary_state(), "http://localhost:5000, not a header\n");
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.expect("infallible router");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    fn post_predict(content_type: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/predict");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).expect("request")
    }

    fn error_text(bytes: &[u8]) -> String {
        let value: Value = serde_json::from_slice(bytes).expect("json body");
        value["error"].as_str().expect("error field").to_string()
    }

    #[tokio::test]
    async fn predict_route_maps_extractor_rejections_to_bad_requests() {
        let app = router(salary_state(), "*");

        let (status, body) = send(&app, post_predict(Some("application/json"), "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = error_text(&body);
        assert!(message.starts_with("Invalid input data:"), "{message}");

        let (status, body) = send(&app, post_predict(None, r#"{"age": 40, "experience": 5}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = error_text(&body);
        assert!(message.starts_with("Invalid input data:"), "{message}");

        let (status, body) = send(
            &app,
            post_predict(Some("application/json"), r#"{"age": 40, "experience": 5}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["predicted_salary"], json!(40000.0));
        assert_eq!(value["salary_level"], json!("Entry Level"));
    }

    #[tokio::test]
    async fn health_and_static_routes_are_mounted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("script.js"), "console.log(1);").expect("write");

        let mut state = salary_state();
        state.static_dir = dir.path().to_path_buf();
        let app = router(state, "*");

        let _ = send(&app, post_predict(Some("application/json"), r#"{"age": 17}"#)).await;

        let health = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(&app, health).await;
        assert_eq!(status, StatusCode::OK);
        let report: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(report["variant"], json!("employee_salary"));
        assert_eq!(report["model_loaded"], json!(true));
        assert_eq!(report["stats"]["client_errors"], json!(1));

        let script = Request::builder()
            .uri("/static/script.js")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(&app, script).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log(1);".to_vec());
    }
}
