//! Google Cloud Vision label detection, authenticated with a service account.

use super::{Label, LabelOracle};
use crate::config::VisionConfig;
use crate::error::OracleError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Cursor;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const VISION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-vision";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const JPEG_QUALITY: u8 = 85;
const MAX_LOGGED_BODY: usize = 500;

#[derive(Deserialize)]
struct ServiceAccount {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

const fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    access_token: String,
    expires_at: i64,
}

pub struct VisionOracle {
    client: reqwest::Client,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    max_results: u32,
    annotate_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl VisionOracle {
    /// Parse service-account JSON and prepare a client. Validates the private
    /// key up front so a broken credential is caught at startup.
    pub fn from_credentials_json(json: &str, config: &VisionConfig) -> Result<Self, OracleError> {
        let account: ServiceAccount =
            serde_json::from_str(json).map_err(|e| OracleError::Credentials(e.to_string()))?;
        if account.client_email.trim().is_empty() {
            return Err(OracleError::Credentials("client_email is empty".into()));
        }
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            client_email: account.client_email,
            token_uri: account.token_uri,
            signing_key,
            max_results: config.max_results,
            annotate_url: config.annotate_url.clone(),
            token: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    async fn access_token(&self) -> Result<String, OracleError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now().timestamp();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TOKEN_REFRESH_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: VISION_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion =
            jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        debug!(token_uri = %self.token_uri, "exchanging service account assertion");
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        Ok(token.access_token)
    }
}

#[async_trait]
impl LabelOracle for VisionOracle {
    fn name(&self) -> &'static str {
        "google-vision"
    }

    async fn detect(&self, image: &[u8]) -> Result<Vec<Label>, OracleError> {
        let bytes = image.to_vec();
        let content = tokio::task::spawn_blocking(move || jpeg_base64(&bytes)).await??;
        let token = self.access_token().await?;

        let payload = annotate_request(&content, self.max_results);

        debug!(bytes = image.len(), "sending label detection request");
        let response = self
            .client
            .post(&self.annotate_url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: truncate(&response_text),
            });
        }

        let result: Value = serde_json::from_str(&response_text)
            .map_err(|e| OracleError::Response(e.to_string()))?;
        let labels = parse_labels(&result)?;
        debug!(count = labels.len(), "label detection finished");
        Ok(labels)
    }
}

/// Re-encode any decodable image as JPEG and base64 it.
pub fn jpeg_base64(image: &[u8]) -> Result<String, image::ImageError> {
    let img = image::load_from_memory(image)?;
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());

    let mut jpeg_bytes = Vec::new();
    rgb.write_to(
        &mut Cursor::new(&mut jpeg_bytes),
        image::ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )?;

    Ok(general_purpose::STANDARD.encode(&jpeg_bytes))
}

fn annotate_request(content: &str, max_results: u32) -> Value {
    serde_json::json!({
        "requests": [{
            "image": { "content": content },
            "features": [{ "type": "LABEL_DETECTION", "maxResults": max_results }]
        }]
    })
}

/// Read `responses[0].labelAnnotations`. No annotations means no labels.
fn parse_labels(result: &Value) -> Result<Vec<Label>, OracleError> {
    let first = &result["responses"][0];
    if let Some(error) = first.get("error") {
        let message = error["message"].as_str().unwrap_or("unknown error");
        return Err(OracleError::Response(message.to_owned()));
    }

    let Some(annotations) = first.get("labelAnnotations") else {
        return Ok(Vec::new());
    };
    let annotations = annotations
        .as_array()
        .ok_or_else(|| OracleError::Response("labelAnnotations is not an array".into()))?;

    Ok(annotations
        .iter()
        .filter_map(|a| {
            let description = a["description"].as_str()?;
            let score = a["score"].as_f64()?;
            Some(Label::new(description, score as f32))
        })
        .collect())
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY).collect()
}
