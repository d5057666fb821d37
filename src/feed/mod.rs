//! Podcast feed construction.
//!
//! This module turns one podcast configuration plus its media directory into
//! an RSS 2.0 document with iTunes extensions:
//!
//! - [`metadata`] - channel fields and podcast identity from YAML
//! - [`categories`] - the accepted category shapes, normalized to pairs
//! - [`episodes`] - explicit episode lists or a directory scan
//! - [`dates`] - publication date resolution and RFC 2822 formatting
//! - [`duration`] - `<itunes:duration>` text
//! - [`probe`] - measuring audio length with an external probe
//! - [`writer`] - XML emission
//! - [`output`] - atomic replacement of published feed files
//!
//! # Example
//!
//! ```ignore
//! let channel = extract_channel_metadata(&document);
//! let mut episodes: Vec<DatedEpisode> = discover_episodes(&media_dir, &document)?
//!     .into_iter()
//!     .map(DatedEpisode::new)
//!     .collect();
//! sort_newest_first(&mut episodes);
//!
//! let xml = FeedAssembler::new(&id, &media_dir, &base, &prober)
//!     .render(&channel, &episodes, Utc::now())?;
//! write_feed_file(&public_root.join(format!("{id}.xml")), &xml)?;
//! ```

pub mod categories;
pub mod dates;
pub mod duration;
pub mod episodes;
pub mod metadata;
pub mod output;
pub mod probe;
pub mod writer;

pub use categories::{parse_categories, CategoryPair};
pub use dates::{parse_iso8601, rfc2822, DateSource};
pub use duration::format_itunes_duration;
pub use episodes::{discover_episodes, sort_newest_first, DatedEpisode, EpisodeEntry, EpisodeType};
pub use metadata::{extract_channel_metadata, ChannelMetadata, PodcastId, PodcastType, CONFIG_SUFFIXES};
pub use probe::{DurationProber, FfprobeProber, ProbeError};
pub use output::{write_feed_file, OutputError};
pub use writer::{categories_fragment, stable_guid, FeedAssembler};
