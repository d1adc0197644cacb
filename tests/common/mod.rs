// Shared helpers for driving the router without a listener.

#![allow(dead_code)]

use allten_nutrition_api::{
    app,
    config::ServerConfig,
    error::OracleError,
    oracle::{Label, LabelOracle, SharedOracle},
    AppState,
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Returns the same labels for every image.
pub struct FixedOracle(pub Vec<Label>);

#[async_trait]
impl LabelOracle for FixedOracle {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn detect(&self, _image: &[u8]) -> Result<Vec<Label>, OracleError> {
        Ok(self.0.clone())
    }
}

/// Always fails, like an unreachable vision API.
pub struct BrokenOracle;

#[async_trait]
impl LabelOracle for BrokenOracle {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn detect(&self, _image: &[u8]) -> Result<Vec<Label>, OracleError> {
        Err(OracleError::Response("service unavailable".into()))
    }
}

pub fn router(oracle: Option<SharedOracle>) -> Router {
    app(Arc::new(AppState::new(&ServerConfig::default(), oracle)))
}

pub async fn send(router: Router, method: Method, uri: &str, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
        .unwrap();
    router.oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// `{"image": "<base64>"}` for the given bytes.
pub fn image_body(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose, Engine as _};
    serde_json::json!({ "image": general_purpose::STANDARD.encode(bytes) }).to_string()
}
