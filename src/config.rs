//! Environment-driven configuration, read once at startup.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_MIN_SCORE: f32 = 0.6;
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VISION_MAX_RESULTS: u32 = 10;
pub const DEFAULT_ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Debug, Error)]
#[error("invalid value {value:?} for {name}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which label oracle to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSourceKind {
    /// Vision when credentials are present, otherwise none.
    #[default]
    Auto,
    Vision,
    Color,
    None,
}

impl FromStr for LabelSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "vision" => Ok(Self::Vision),
            "color" | "colour" => Ok(Self::Color),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown label source '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct VisionConfig {
    pub credentials_json: Option<String>,
    pub min_score: f32,
    pub timeout: Duration,
    pub max_results: u32,
    pub annotate_url: String,
}

impl std::fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionConfig")
            .field("credentials_json", &self.credentials_json.as_ref().map(|_| "<redacted>"))
            .field("min_score", &self.min_score)
            .field("timeout", &self.timeout)
            .field("max_results", &self.max_results)
            .field("annotate_url", &self.annotate_url)
            .finish()
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            credentials_json: None,
            min_score: DEFAULT_MIN_SCORE,
            timeout: Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
            max_results: DEFAULT_VISION_MAX_RESULTS,
            annotate_url: DEFAULT_ANNOTATE_URL.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_bytes: usize,
    pub label_source: LabelSourceKind,
    pub log_format: LogFormat,
    pub vision: VisionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            label_source: LabelSourceKind::default(),
            log_format: LogFormat::default(),
            vision: VisionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: parse_or(&get, "HOST", defaults.host)?,
            port: parse_or(&get, "PORT", defaults.port)?,
            max_body_bytes: parse_or(&get, "MAX_BODY_BYTES", defaults.max_body_bytes)?,
            label_source: parse_or(&get, "LABEL_SOURCE", defaults.label_source)?,
            log_format: parse_or(&get, "LOG_FORMAT", defaults.log_format)?,
            vision: VisionConfig {
                credentials_json: get("GOOGLE_APPLICATION_CREDENTIALS_JSON"),
                min_score: parse_or(&get, "VISION_MIN_SCORE", defaults.vision.min_score)?,
                timeout: Duration::from_secs(parse_or(
                    &get,
                    "VISION_TIMEOUT_SECS",
                    DEFAULT_VISION_TIMEOUT_SECS,
                )?),
                max_results: parse_or(&get, "VISION_MAX_RESULTS", defaults.vision.max_results)?,
                annotate_url: get("VISION_ANNOTATE_URL").unwrap_or(defaults.vision.annotate_url),
            },
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T, F>(get: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
