//! Batch orchestration: one feed per `<name>-podcast.yaml` config.
//!
//! Each podcast runs through the same sequence: load the YAML document,
//! check its media directory, discover and date its episodes, sort them
//! newest first, then render and write (or only validate) the feed. A failure
//! in one podcast is logged and counted; it never stops the others.

use chrono::Utc;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::{Config, ConfigError};
use crate::feed::{
    discover_episodes, extract_channel_metadata, sort_newest_first, write_feed_file,
    DatedEpisode, DurationProber, FeedAssembler, OutputError, PodcastId, CONFIG_SUFFIXES,
};

// ============================================================================
// Error Types
// ============================================================================

/// Failures that end processing of a single podcast.
#[derive(Debug, Error)]
pub enum PodcastError {
    #[error("Not a podcast config filename: {0}")]
    NotAConfig(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Config {0} is empty")]
    EmptyConfig(PathBuf),

    #[error("Config {0} is not a mapping")]
    NotAMapping(PathBuf),

    #[error("Failed to scan media directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render feed: {0:#}")]
    Render(anyhow::Error),

    #[error(transparent)]
    Write(#[from] OutputError),
}

// ============================================================================
// Outcomes
// ============================================================================

/// Why a podcast produced no feed without being an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingMediaDir(PathBuf),
    NoEpisodes,
}

/// Successful or skipped end state of one podcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodcastOutcome {
    /// Feed written to `path`.
    Published { path: PathBuf, episodes: usize },
    /// Publishing disabled; the podcast was checked but nothing was written.
    Validated { episodes: usize },
    Skipped(SkipReason),
}

/// Result of processing one config file.
#[derive(Debug)]
pub struct PodcastReport {
    pub config: PathBuf,
    pub result: Result<PodcastOutcome, PodcastError>,
}

/// Aggregate counts for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub reports: Vec<PodcastReport>,
}

impl RunSummary {
    pub fn any_succeeded(&self) -> bool {
        self.succeeded > 0
    }

    fn record(&mut self, report: PodcastReport) {
        self.total += 1;
        match &report.result {
            Ok(PodcastOutcome::Skipped(_)) => self.skipped += 1,
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
        self.reports.push(report);
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Drives feed generation for every podcast under the configured roots.
pub struct Generator<'a> {
    podcasts_root: PathBuf,
    public_root: PathBuf,
    base: Url,
    publish_xml: bool,
    prober: &'a dyn DurationProber,
}

impl<'a> Generator<'a> {
    /// Validates the base URL up front so no podcast is processed with a bad one.
    pub fn new(config: &Config, prober: &'a dyn DurationProber) -> Result<Self, ConfigError> {
        Ok(Self {
            podcasts_root: config.podcasts_root.clone(),
            public_root: config.public_root.clone(),
            base: config.media_base()?,
            publish_xml: config.publish_xml,
            prober,
        })
    }

    /// Lists podcast config files in the podcasts root, sorted by path.
    ///
    /// A missing or unreadable root yields an empty list with a log entry.
    pub fn discover_configs(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.podcasts_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.podcasts_root.display(),
                    "Podcasts directory not found"
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(
                    path = %self.podcasts_root.display(),
                    error = %e,
                    "Failed to read podcasts directory"
                );
                return Vec::new();
            }
        };

        let mut configs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && PodcastId::from_config_path(path).is_some())
            .collect();
        configs.sort();
        configs
    }

    /// Processes every discovered config and logs a run summary.
    pub fn process_all(&self) -> RunSummary {
        let configs = self.discover_configs();
        let mut summary = RunSummary::default();

        if configs.is_empty() {
            tracing::warn!(
                path = %self.podcasts_root.display(),
                "No podcast configs found"
            );
            tracing::info!(
                "Add one config per podcast named <name>{} (or {}) to {}",
                CONFIG_SUFFIXES[0],
                CONFIG_SUFFIXES[1],
                self.podcasts_root.display()
            );
            tracing::info!(
                "Put each podcast's audio files in {}/<name>/",
                self.public_root.display()
            );
            return summary;
        }

        tracing::info!(count = configs.len(), "Found podcast configs");

        for config in configs {
            let result = self.process_podcast(&config);
            if let Err(e) = &result {
                tracing::error!(config = %config.display(), error = %e, "Failed to process podcast");
            }
            summary.record(PodcastReport { config, result });
        }

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Feed generation finished"
        );
        summary
    }

    /// Runs one podcast from config file to feed.
    pub fn process_podcast(&self, config_path: &Path) -> Result<PodcastOutcome, PodcastError> {
        let id = PodcastId::from_config_path(config_path)
            .ok_or_else(|| PodcastError::NotAConfig(config_path.to_path_buf()))?;
        let document = load_document(config_path)?;
        let channel = extract_channel_metadata(&document);

        if let Some(name) = channel.name.as_deref().filter(|n| *n != id.as_str()) {
            tracing::warn!(
                podcast = %id,
                name = name,
                "Config name differs from filename, using filename"
            );
        }

        let media_dir = self.public_root.join(id.as_str());
        if !media_dir.is_dir() {
            tracing::warn!(
                podcast = %id,
                path = %media_dir.display(),
                "Media directory not found, skipping podcast"
            );
            return Ok(PodcastOutcome::Skipped(SkipReason::MissingMediaDir(media_dir)));
        }

        let entries =
            discover_episodes(&media_dir, &document).map_err(|source| PodcastError::Scan {
                path: media_dir.clone(),
                source,
            })?;
        if entries.is_empty() {
            tracing::warn!(podcast = %id, "No episodes found, skipping podcast");
            return Ok(PodcastOutcome::Skipped(SkipReason::NoEpisodes));
        }

        let mut episodes: Vec<DatedEpisode> = entries.into_iter().map(DatedEpisode::new).collect();
        sort_newest_first(&mut episodes);

        for episode in episodes.iter().filter(|e| !e.entry.path.exists()) {
            tracing::warn!(
                podcast = %id,
                path = %episode.entry.path.display(),
                "Episode file not found"
            );
        }

        let count = episodes.len();
        if !self.publish_xml {
            tracing::info!(podcast = %id, episodes = count, "Validated podcast (publishing disabled)");
            return Ok(PodcastOutcome::Validated { episodes: count });
        }

        let xml = FeedAssembler::new(&id, &media_dir, &self.base, self.prober)
            .render(&channel, &episodes, Utc::now())
            .map_err(PodcastError::Render)?;

        let output = self.public_root.join(format!("{}.xml", id));
        write_feed_file(&output, &xml).map_err(PodcastError::Write)?;

        tracing::info!(
            podcast = %id,
            episodes = count,
            path = %output.display(),
            "Generated feed"
        );
        Ok(PodcastOutcome::Published {
            path: output,
            episodes: count,
        })
    }
}

/// Reads and parses a config file into its top-level mapping.
fn load_document(path: &Path) -> Result<Mapping, PodcastError> {
    let content = std::fs::read_to_string(path).map_err(|source| PodcastError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|source| PodcastError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Mapping(map) => Ok(map),
        Value::Null => Err(PodcastError::EmptyConfig(path.to_path_buf())),
        _ => Err(PodcastError::NotAMapping(path.to_path_buf())),
    }
}

// ============================================================================
// Tests
// ============================================================================
