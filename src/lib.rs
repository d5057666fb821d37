//! Podcast RSS generation from YAML configs and audio directories.
//!
//! For every `<name>-podcast.yaml` under the podcasts root, the [`generator`]
//! reads the channel metadata, collects episodes from the config or from
//! `<public_root>/<name>/`, and writes `<public_root>/<name>.xml` as an
//! RSS 2.0 feed with iTunes extensions.

pub mod config;
pub mod feed;
pub mod generator;
pub mod util;

pub use config::{Config, ConfigError};
pub use generator::{Generator, PodcastError, PodcastOutcome, RunSummary, SkipReason};
