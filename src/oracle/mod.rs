//! Label oracles: external or local sources of food labels for an image.
//!
//! The oracle is chosen once at startup. A missing or misconfigured oracle
//! leaves the service running on the fallback path.

pub mod color;
pub mod vision;

use crate::config::{LabelSourceKind, ServerConfig};
use crate::error::OracleError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub use color::ColorOracle;
pub use vision::VisionOracle;

/// A detected label with its score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub description: String,
    pub score: f32,
}

impl Label {
    pub fn new(description: impl Into<String>, score: f32) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }
}

#[async_trait]
pub trait LabelOracle: Send + Sync {
    fn name(&self) -> &'static str;

    async fn detect(&self, image: &[u8]) -> Result<Vec<Label>, OracleError>;
}

pub type SharedOracle = Arc<dyn LabelOracle>;

/// Keep labels scoring strictly above `min_score`, lowercased, in order.
pub fn confident_labels(labels: Vec<Label>, min_score: f32) -> Vec<String> {
    labels
        .into_iter()
        .filter(|l| l.score > min_score)
        .map(|l| l.description.to_lowercase())
        .collect()
}

/// Build the configured oracle. Never fails; `None` means unavailable.
pub fn from_config(config: &ServerConfig) -> Option<SharedOracle> {
    match config.label_source {
        LabelSourceKind::None => {
            info!("label oracle disabled");
            None
        }
        LabelSourceKind::Color => {
            info!("using average-colour label heuristic");
            Some(Arc::new(ColorOracle))
        }
        LabelSourceKind::Auto | LabelSourceKind::Vision => {
            let explicit = config.label_source == LabelSourceKind::Vision;
            let Some(json) = config.vision.credentials_json.as_deref() else {
                if explicit {
                    warn!("GOOGLE_APPLICATION_CREDENTIALS_JSON is not set; vision oracle unavailable");
                } else {
                    info!("no vision credentials; using fallback estimates");
                }
                return None;
            };

            match VisionOracle::from_credentials_json(json, &config.vision) {
                Ok(oracle) => {
                    info!(client = %oracle.client_email(), "vision oracle ready");
                    Some(Arc::new(oracle))
                }
                Err(e) => {
                    warn!(error = %e, "vision oracle unavailable");
                    None
                }
            }
        }
    }
}
