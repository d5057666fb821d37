//! Episode discovery: explicit `episodes:` lists or a scan of the media directory.

use chrono::{DateTime, Utc};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use super::dates::{resolve_pub_date, DateSource};
use super::duration::format_itunes_duration;
use super::metadata::{channel_source, scalar_string, truthy};
use crate::util::{file_stem, is_scannable_audio, safe_basename};

/// `<itunes:episodeType>` values; anything else in the config is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeType {
    Full,
    Trailer,
    Bonus,
}

impl EpisodeType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "full" => Some(Self::Full),
            "trailer" => Some(Self::Trailer),
            "bonus" => Some(Self::Bonus),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Trailer => "trailer",
            Self::Bonus => "bonus",
        }
    }
}

/// One episode, declared in config or synthesized from a scanned file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeEntry {
    /// Basename of the audio file.
    pub file: String,
    /// `file` joined onto the podcast's media directory.
    pub path: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub subtitle: Option<String>,
    /// Raw ISO-8601 text; parsed when dating the episode.
    pub pub_date: Option<String>,
    pub image: Option<String>,
    pub explicit: Option<bool>,
    pub author_name: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub episode_type: Option<EpisodeType>,
    pub guid: Option<String>,
    /// Preformatted `<itunes:duration>` text.
    pub duration: Option<String>,
}

impl EpisodeEntry {
    /// Minimal record for a file found by scanning.
    pub fn scanned(media_dir: &Path, file: &str) -> Self {
        Self {
            file: file.to_string(),
            path: media_dir.join(file),
            title: Some(file_stem(file).to_string()),
            ..Self::default()
        }
    }

    /// Builds a record from one `episodes:` mapping.
    ///
    /// The `file` reference is reduced to its basename before it is joined to
    /// `media_dir`. Returns `None` when no usable file name remains.
    pub fn from_config(media_dir: &Path, entry: &Mapping) -> Option<Self> {
        let text = |key: &str| entry.get(key).and_then(scalar_string);
        let raw_file = text("file").unwrap_or_default();
        let file = safe_basename(&raw_file)?.to_string();

        let duration = match entry.get("duration_hms").or_else(|| entry.get("duration")) {
            Some(Value::Number(n)) => format_itunes_duration(n.as_f64()),
            Some(other) => scalar_string(other).filter(|d| !d.trim().is_empty()),
            None => None,
        };

        Some(Self {
            path: media_dir.join(&file),
            title: text("title"),
            description: text("description"),
            summary: text("summary"),
            subtitle: text("subtitle"),
            pub_date: text("pub_date"),
            image: text("image"),
            explicit: entry.get("explicit").and_then(truthy),
            author_name: text("author-name").or_else(|| text("author")),
            season: entry.get("season").and_then(Value::as_i64),
            episode: entry.get("episode").and_then(Value::as_i64),
            episode_type: entry
                .get("episode_type")
                .and_then(Value::as_str)
                .and_then(EpisodeType::parse),
            guid: text("guid"),
            duration,
            file,
        })
    }

    /// Title, or the filename stem when none was declared.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| file_stem(&self.file))
    }
}

/// An episode paired with the timestamp used for ordering and `<pubDate>`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedEpisode {
    pub entry: EpisodeEntry,
    pub published: DateTime<Utc>,
    pub date_source: DateSource,
}

impl DatedEpisode {
    pub fn new(entry: EpisodeEntry) -> Self {
        let (published, date_source) = resolve_pub_date(entry.pub_date.as_deref(), &entry.path);
        Self {
            entry,
            published,
            date_source,
        }
    }
}

/// Sorts newest first. Equal timestamps keep their discovery order.
pub fn sort_newest_first(episodes: &mut [DatedEpisode]) {
    episodes.sort_by(|a, b| b.published.cmp(&a.published));
}

/// Finds the `episodes:` list, top level first, then under `podcast:`.
fn declared_episodes<'a>(document: &'a Mapping) -> Option<&'a [Value]> {
    let listed = |source: &'a Mapping| {
        source
            .get("episodes")
            .and_then(Value::as_sequence)
            .map(Vec::as_slice)
            .filter(|list| !list.is_empty())
    };
    listed(document).or_else(|| listed(channel_source(document)))
}

/// Produces the episode list for one podcast.
///
/// A non-empty `episodes:` list selects explicit mode (declaration order);
/// otherwise the media directory is scanned for `.mp3` files (filename order).
/// A missing media directory yields an empty list.
pub fn discover_episodes(media_dir: &Path, document: &Mapping) -> std::io::Result<Vec<EpisodeEntry>> {
    if !media_dir.is_dir() {
        return Ok(Vec::new());
    }

    if let Some(declared) = declared_episodes(document) {
        let episodes = declared
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let parsed = value
                    .as_mapping()
                    .and_then(|entry| EpisodeEntry::from_config(media_dir, entry));
                if parsed.is_none() {
                    tracing::warn!(
                        index = index,
                        dir = %media_dir.display(),
                        "Skipping episode entry without a usable file name"
                    );
                }
                parsed
            })
            .collect();
        return Ok(episodes);
    }

    scan_media_dir(media_dir)
}

/// Lists scannable audio files in `media_dir`, sorted by filename.
pub fn scan_media_dir(media_dir: &Path) -> std::io::Result<Vec<EpisodeEntry>> {
    let mut names = Vec::new();
    for dir_entry in std::fs::read_dir(media_dir)? {
        let dir_entry = dir_entry?;
        if !dir_entry.path().is_file() {
            continue;
        }
        match dir_entry.file_name().into_string() {
            Ok(name) if is_scannable_audio(&name) => names.push(name),
            Ok(_) => {}
            Err(name) => {
                tracing::warn!(file = ?name, "Skipping file with non-UTF-8 name");
            }
        }
    }
    names.sort();

    Ok(names
        .iter()
        .map(|name| EpisodeEntry::scanned(media_dir, name))
        .collect())
}
