//! Channel metadata extraction from podcast YAML documents.
//!
//! Configs come in two shapes: everything nested under a `podcast:` mapping,
//! or the same keys flat at the top level. Both normalize into
//! [`ChannelMetadata`] here, once, so nothing downstream looks at raw YAML.

use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

use super::categories::{parse_categories, CategoryPair};

/// Filename suffixes that mark a podcast configuration file.
pub const CONFIG_SUFFIXES: [&str; 2] = ["-podcast.yaml", "-podcast.yml"];

// ============================================================================
// Podcast identity
// ============================================================================

/// Canonical podcast name, taken from the config filename.
///
/// `tech-talk-podcast.yaml` → `tech-talk`. The identity names the media
/// directory under the public root and the `<identity>.xml` output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PodcastId(String);

impl PodcastId {
    pub fn new(id: impl Into<String>) -> Self {
        PodcastId(id.into())
    }

    /// Derives the identity from a config path, or `None` if the filename does
    /// not carry a `-podcast.yaml`/`-podcast.yml` suffix with a non-empty prefix.
    pub fn from_config_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        CONFIG_SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))
            .filter(|id| !id.is_empty())
            .map(|id| PodcastId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PodcastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Channel metadata
// ============================================================================

/// `<itunes:type>` values; anything else in the config is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodcastType {
    Episodic,
    Serial,
}

impl PodcastType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "episodic" => Some(Self::Episodic),
            "serial" => Some(Self::Serial),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Episodic => "episodic",
            Self::Serial => "serial",
        }
    }
}

/// Podcast-level metadata with documented defaults.
///
/// Optional fields that are absent (or empty strings) are `None`; the feed
/// writer either omits their element or applies the fallback noted on the
/// field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelMetadata {
    /// `name:` from the config body. Informational only; the filename wins.
    pub name: Option<String>,
    /// Falls back to the podcast identity.
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub subtitle: Option<String>,
    /// Falls back to `description`.
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Falls back to `"en"`.
    pub language: Option<String>,
    pub explicit: bool,
    /// Absolute http(s) URL, or a filename inside the podcast's media directory.
    pub image: Option<String>,
    /// Falls back to the configured base URL.
    pub link: Option<String>,
    pub categories: Vec<CategoryPair>,
    pub podcast_type: Option<PodcastType>,
    pub block: bool,
    pub complete: bool,
    pub new_feed_url: Option<String>,
}

impl ChannelMetadata {
    pub const DEFAULT_LANGUAGE: &'static str = "en";

    pub fn title_or<'a>(&'a self, podcast: &'a PodcastId) -> &'a str {
        self.title.as_deref().unwrap_or(podcast.as_str())
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(Self::DEFAULT_LANGUAGE)
    }

    pub fn summary_or_description(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

/// Picks the mapping that carries channel fields: the nested `podcast:` block
/// when it is a mapping, otherwise the whole document.
pub fn channel_source(document: &Mapping) -> &Mapping {
    match document.get("podcast") {
        Some(Value::Mapping(nested)) => nested,
        _ => document,
    }
}

/// Normalizes a config document into [`ChannelMetadata`].
///
/// Only recognized keys are read. A legacy `author:` key fills `author-name`
/// when the latter is missing.
pub fn extract_channel_metadata(document: &Mapping) -> ChannelMetadata {
    let source = channel_source(document);
    let text = |key: &str| source.get(key).and_then(scalar_string);
    let flag = |key: &str| source.get(key).and_then(truthy).unwrap_or(false);

    ChannelMetadata {
        name: text("name"),
        title: text("title"),
        author_name: text("author-name").or_else(|| text("author")),
        author_email: text("author-email"),
        subtitle: text("subtitle"),
        summary: text("summary"),
        description: text("description"),
        language: text("language"),
        explicit: flag("explicit"),
        image: text("image"),
        link: text("link"),
        categories: source.get("categories").map(parse_categories).unwrap_or_default(),
        podcast_type: source
            .get("type")
            .and_then(Value::as_str)
            .and_then(PodcastType::parse),
        block: flag("block"),
        complete: flag("complete"),
        new_feed_url: text("new_feed_url").or_else(|| text("new-feed-url")),
    }
}

// ============================================================================
// Scalar coercion helpers
// ============================================================================

/// Renders a YAML scalar as text. Empty strings, nulls and collections are `None`.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

/// Interprets a YAML value as a yes/no flag; `None` for null or collections.
pub(crate) fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let lower = s.trim().to_ascii_lowercase();
            Some(matches!(
                lower.as_str(),
                "yes" | "true" | "explicit" | "on" | "y" | "1"
            ))
        }
        Value::Tagged(tagged) => truthy(&tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn doc(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_podcast_id_from_filename() {
        let id = PodcastId::from_config_path(Path::new("/cfg/tech-talk-podcast.yaml")).unwrap();
        assert_eq!(id.as_str(), "tech-talk");
        let id = PodcastId::from_config_path(Path::new("daily-podcast.yml")).unwrap();
        assert_eq!(id.to_string(), "daily");
    }

    #[test]
    fn test_podcast_id_rejects_other_files() {
        for name in ["notes.yaml", "podcast.yaml", "-podcast.yaml", "a-podcast.json"] {
            assert!(
                PodcastId::from_config_path(&PathBuf::from(name)).is_none(),
                "{name} should not be a podcast config"
            );
        }
    }

    #[test]
    fn test_flat_document() {
        let meta = extract_channel_metadata(&doc(
            "title: Tech Talk\nauthor-name: Ada\nauthor-email: ada@example.com\nlanguage: de\nexplicit: true\n",
        ));
        assert_eq!(meta.title.as_deref(), Some("Tech Talk"));
        assert_eq!(meta.author_name.as_deref(), Some("Ada"));
        assert_eq!(meta.author_email.as_deref(), Some("ada@example.com"));
        assert_eq!(meta.language(), "de");
        assert!(meta.explicit);
    }

    #[test]
    fn test_nested_document_takes_precedence() {
        let meta = extract_channel_metadata(&doc(
            "title: Flat Title\npodcast:\n  title: Nested Title\n  description: From nested\n",
        ));
        assert_eq!(meta.title.as_deref(), Some("Nested Title"));
        assert_eq!(meta.description.as_deref(), Some("From nested"));
    }

    #[test]
    fn test_nested_scalar_is_not_a_source() {
        let meta = extract_channel_metadata(&doc("podcast: just a string\ntitle: Flat\n"));
        assert_eq!(meta.title.as_deref(), Some("Flat"));
    }

    #[test]
    fn test_legacy_author_fills_author_name() {
        let meta = extract_channel_metadata(&doc("author: X\n"));
        assert_eq!(meta.author_name.as_deref(), Some("X"));

        let meta = extract_channel_metadata(&doc("author: Old\nauthor-name: New\n"));
        assert_eq!(meta.author_name.as_deref(), Some("New"));
    }

    #[test]
    fn test_defaults() {
        let meta = extract_channel_metadata(&doc("unrelated: 1\n"));
        let id = PodcastId("show".to_string());
        assert_eq!(meta.title_or(&id), "show");
        assert_eq!(meta.language(), "en");
        assert!(!meta.explicit);
        assert!(!meta.block);
        assert!(meta.categories.is_empty());
        assert_eq!(meta.summary_or_description(), "");
    }

    #[test]
    fn test_summary_falls_back_to_description() {
        let meta = extract_channel_metadata(&doc("description: About the show\n"));
        assert_eq!(meta.summary_or_description(), "About the show");
    }

    #[test]
    fn test_podcast_type_is_exact() {
        assert_eq!(
            extract_channel_metadata(&doc("type: serial\n")).podcast_type,
            Some(PodcastType::Serial)
        );
        assert_eq!(extract_channel_metadata(&doc("type: Serial\n")).podcast_type, None);
        assert_eq!(extract_channel_metadata(&doc("type: weekly\n")).podcast_type, None);
    }

    #[test]
    fn test_new_feed_url_spellings() {
        let a = extract_channel_metadata(&doc("new_feed_url: https://a.example/feed.xml\n"));
        let b = extract_channel_metadata(&doc("new-feed-url: https://a.example/feed.xml\n"));
        assert_eq!(a.new_feed_url, b.new_feed_url);
        assert!(a.new_feed_url.is_some());
    }

    #[test]
    fn test_non_string_scalars_render_as_text() {
        let meta = extract_channel_metadata(&doc("title: 2024\nsubtitle: ''\n"));
        assert_eq!(meta.title.as_deref(), Some("2024"));
        assert_eq!(meta.subtitle, None);
    }

    #[test]
    fn test_truthy() {
        assert_eq!(truthy(&Value::Bool(true)), Some(true));
        assert_eq!(truthy(&Value::String("yes".into())), Some(true));
        assert_eq!(truthy(&Value::String("no".into())), Some(false));
        assert_eq!(truthy(&Value::String("clean".into())), Some(false));
        assert_eq!(truthy(&serde_yaml::from_str::<Value>("1").unwrap()), Some(true));
        assert_eq!(truthy(&serde_yaml::from_str::<Value>("0").unwrap()), Some(false));
        assert_eq!(truthy(&Value::Null), None);
    }
}
