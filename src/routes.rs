use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::estimator::{self, AnalysisInput, NutritionResult};
use crate::oracle::{confident_labels, SharedOracle};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

const SERVICE_NAME: &str = "All Ten Nutrition API";

pub struct AppState {
    pub oracle: Option<SharedOracle>,
    pub min_score: f32,
    pub oracle_timeout: Duration,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig, oracle: Option<SharedOracle>) -> Self {
        Self {
            oracle,
            min_score: config.vision.min_score,
            oracle_timeout: config.vision.timeout,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Name of the active oracle, or `"none"`.
    pub fn label_source(&self) -> &'static str {
        self.oracle.as_ref().map_or("none", |o| o.name())
    }
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    image: Option<String>,
}

/// Accept raw base64 or a `data:<mime>;base64,<payload>` URL.
pub fn decode_image(image: &str) -> Result<Vec<u8>, ApiError> {
    let payload = match image.trim().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => image,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(ApiError::MissingImage);
    }
    Ok(general_purpose::STANDARD.decode(cleaned)?)
}

fn parse_request(body: &[u8]) -> Result<Vec<u8>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::MissingImage);
    }
    let request: Option<AnalyzeRequest> =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    match request.and_then(|r| r.image) {
        Some(image) if !image.trim().is_empty() => decode_image(&image),
        _ => Err(ApiError::MissingImage),
    }
}

async fn detect_labels(state: &AppState, image: &[u8]) -> Vec<String> {
    let Some(oracle) = state.oracle.as_ref() else {
        return Vec::new();
    };
    match tokio::time::timeout(state.oracle_timeout, oracle.detect(image)).await {
        Ok(Ok(labels)) => confident_labels(labels, state.min_score),
        Ok(Err(e)) => {
            warn!(oracle = oracle.name(), error = %e, "label detection failed, using fallback");
            Vec::new()
        }
        Err(_) => {
            warn!(oracle = oracle.name(), "label detection timed out, using fallback");
            Vec::new()
        }
    }
}

async fn analyze_food(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<NutritionResult>, ApiError> {
    let image = parse_request(&body?)?;
    let labels = detect_labels(&state, &image).await;

    let result = tokio::task::spawn_blocking(move || {
        estimator::estimate(&AnalysisInput {
            image: Some(image.as_slice()),
            labels,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Failed to analyze image: {e}")))?;

    info!(
        foods = ?result.detected_foods,
        calories = result.nutrition.calories,
        confidence = result.confidence,
        "analyzed food image"
    );
    Ok(Json(result))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": format!("{SERVICE_NAME} is running!"),
        "label_source": state.label_source(),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "analyze_food": "/analyze_food"
        }
    }))
}

/// OPTIONS anywhere is a bare 200; other unrouted requests are 404.
async fn fallback(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return (
            StatusCode::OK,
            [
                (
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET, POST, OPTIONS"),
                ),
                (
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type"),
                ),
            ],
        )
            .into_response();
    }
    ApiError::NotFound {
        path: uri.path().to_owned(),
    }
    .into_response()
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index).fallback(fallback))
        .route("/health", get(health).fallback(fallback))
        .route(
            "/analyze_food",
            post(analyze_food)
                .fallback(fallback)
                .layer(DefaultBodyLimit::max(state.max_body_bytes)),
        )
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
