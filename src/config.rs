//! Process configuration for the feed generator.
//!
//! Values come from three layers: built-in defaults, an optional TOML file,
//! and environment variables (highest precedence). The result is built once at
//! startup and handed to the generator by reference; nothing else in the crate
//! reads the environment.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid base URL {0:?}: must be an absolute http(s) URL")]
    InvalidBaseUrl(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Generator configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the `<name>-podcast.yaml` files.
    pub podcasts_root: PathBuf,

    /// Directory holding one media subdirectory per podcast; feeds are
    /// written here as `<name>.xml`.
    pub public_root: PathBuf,

    /// Base URL used to build every enclosure and image link.
    pub base_url: String,

    /// When false the generator validates podcasts without writing XML.
    pub publish_xml: bool,

    /// Whether the binary runs the generator immediately on startup.
    pub run_on_start: bool,

    /// ffprobe executable used to measure episode durations.
    pub ffprobe_path: PathBuf,

    /// Upper bound on a single ffprobe invocation.
    pub probe_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            podcasts_root: PathBuf::from("/app/podcasts"),
            public_root: PathBuf::from("/app/public"),
            base_url: "http://localhost:8080".to_string(),
            publish_xml: true,
            run_on_start: true,
            ffprobe_path: PathBuf::from("ffprobe"),
            probe_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "podcasts_root",
        "public_root",
        "base_url",
        "publish_xml",
        "run_on_start",
        "ffprobe_path",
        "probe_timeout_secs",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Overlay environment-style variables on top of the current values.
    ///
    /// `lookup` is `std::env::var` in the binary and a fixed map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PODCASTS_ROOT") {
            self.podcasts_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("PUBLIC_ROOT") {
            self.public_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("PUBLIC_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("PUBLISH_XML") {
            self.publish_xml = env_flag(&v);
        }
        if let Some(v) = lookup("RUN_ON_START") {
            self.run_on_start = env_flag(&v);
        }
        if let Some(v) = lookup("FFPROBE_PATH") {
            self.ffprobe_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("FFPROBE_TIMEOUT_SECS") {
            self.probe_timeout_secs =
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "FFPROBE_TIMEOUT_SECS",
                        value: v.clone(),
                    })?;
        }
        Ok(())
    }

    /// Parse `base_url`, accepting only absolute http(s) URLs.
    pub fn media_base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            _ => Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Environment toggles are on only for a literal `true` (any case).
fn env_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

// ============================================================================
// Tests
// ============================================================================
