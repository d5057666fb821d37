//! RSS 2.0 + iTunes feed emission.
//!
//! [`FeedAssembler`] turns normalized channel metadata and dated episodes into
//! a complete `<rss>` document with quick-xml's event writer. Free text goes
//! through quick-xml escaping; descriptions and summaries are wrapped in
//! CDATA so embedded HTML survives.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use sha1::{Digest, Sha1};
use std::io::Cursor;
use std::path::Path;
use url::Url;

use super::categories::CategoryPair;
use super::dates::rfc2822;
use super::duration::format_itunes_duration;
use super::episodes::DatedEpisode;
use super::metadata::{ChannelMetadata, PodcastId};
use super::probe::DurationProber;
use crate::util::{is_absolute_http, media_url, mime_type_for, safe_basename};

pub const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const GENERATOR: &str = "podcastify";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Stable GUID for an episode without a declared one: SHA-1 hex of
/// `"<podcast>/<file>"`. Unchanged as long as the filename is unchanged.
pub fn stable_guid(podcast: &PodcastId, file: &str) -> String {
    let hash = Sha1::digest(format!("{}/{}", podcast, file).as_bytes());
    format!("{:x}", hash)
}

/// Renders feeds for one podcast.
pub struct FeedAssembler<'a> {
    podcast: &'a PodcastId,
    media_dir: &'a Path,
    base: &'a Url,
    prober: &'a dyn DurationProber,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(
        podcast: &'a PodcastId,
        media_dir: &'a Path,
        base: &'a Url,
        prober: &'a dyn DurationProber,
    ) -> Self {
        Self {
            podcast,
            media_dir,
            base,
            prober,
        }
    }

    /// Public URL of a file in this podcast's media directory.
    pub fn media_url(&self, file: &str) -> String {
        media_url(self.base, self.podcast.as_str(), file)
    }

    /// Resolves a channel or episode image reference to a URL.
    ///
    /// Absolute http(s) links pass through. Anything else is treated as a
    /// filename in the media directory and only produces a URL if that file
    /// exists.
    pub fn resolve_image(&self, reference: Option<&str>) -> Option<String> {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;
        if is_absolute_http(reference) {
            return Some(reference.to_string());
        }

        let name = safe_basename(reference)?;
        let local = self.media_dir.join(name);
        if local.exists() {
            Some(self.media_url(name))
        } else {
            tracing::warn!(
                podcast = %self.podcast,
                path = %local.display(),
                "Image file not found"
            );
            None
        }
    }

    /// Builds the complete feed document.
    pub fn render(
        &self,
        channel: &ChannelMetadata,
        episodes: &[DatedEpisode],
        build_time: DateTime<Utc>,
    ) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .context("Failed to write XML declaration")?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:itunes", ITUNES_NAMESPACE));
        writer
            .write_event(Event::Start(rss))
            .context("Failed to write rss element")?;
        start(&mut writer, "channel")?;

        self.write_channel(&mut writer, channel, build_time)?;
        for episode in episodes {
            self.write_item(&mut writer, channel, episode)?;
        }

        end(&mut writer, "channel")?;
        end(&mut writer, "rss")?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).context("Generated feed contains invalid UTF-8")
    }

    fn write_channel(
        &self,
        w: &mut XmlWriter,
        channel: &ChannelMetadata,
        build_time: DateTime<Utc>,
    ) -> Result<()> {
        let link = channel
            .link
            .as_deref()
            .unwrap_or_else(|| self.base.as_str().trim_end_matches('/'));

        text_element(w, "title", channel.title_or(self.podcast))?;
        text_element(w, "link", link)?;
        cdata_element(w, "description", channel.description.as_deref().unwrap_or(""))?;
        text_element(w, "language", channel.language())?;
        text_element(w, "generator", GENERATOR)?;
        text_element(w, "lastBuildDate", &rfc2822(&build_time))?;
        text_element(w, "itunes:explicit", yes_no(channel.explicit))?;
        text_element(w, "itunes:author", channel.author_name.as_deref().unwrap_or(""))?;

        if let Some(subtitle) = &channel.subtitle {
            text_element(w, "itunes:subtitle", subtitle)?;
        }
        cdata_element(w, "itunes:summary", channel.summary_or_description())?;

        if let Some(href) = self.resolve_image(channel.image.as_deref()) {
            image_element(w, &href)?;
        }

        if channel.author_name.is_some() || channel.author_email.is_some() {
            start(w, "itunes:owner")?;
            if let Some(name) = &channel.author_name {
                text_element(w, "itunes:name", name)?;
            }
            if let Some(email) = &channel.author_email {
                text_element(w, "itunes:email", email)?;
            }
            end(w, "itunes:owner")?;
        }

        write_categories(w, &channel.categories)?;

        if let Some(kind) = channel.podcast_type {
            text_element(w, "itunes:type", kind.as_str())?;
        }
        if channel.block {
            text_element(w, "itunes:block", "yes")?;
        }
        if channel.complete {
            text_element(w, "itunes:complete", "yes")?;
        }
        if let Some(url) = &channel.new_feed_url {
            text_element(w, "itunes:new-feed-url", url)?;
        }
        Ok(())
    }

    fn write_item(
        &self,
        w: &mut XmlWriter,
        channel: &ChannelMetadata,
        episode: &DatedEpisode,
    ) -> Result<()> {
        let entry = &episode.entry;
        let length = std::fs::metadata(&entry.path).map(|m| m.len()).unwrap_or(0);
        let guid = entry
            .guid
            .clone()
            .unwrap_or_else(|| stable_guid(self.podcast, &entry.file));
        let description = entry.description.as_deref().unwrap_or("");
        let summary = entry.summary.as_deref().unwrap_or(description);
        let author = entry
            .author_name
            .as_deref()
            .or(channel.author_name.as_deref())
            .unwrap_or("");
        let explicit = entry.explicit.unwrap_or(channel.explicit);
        let duration = entry.duration.clone().or_else(|| self.probe_duration(&entry.path));

        start(w, "item")?;

        let mut guid_start = BytesStart::new("guid");
        guid_start.push_attribute(("isPermaLink", "false"));
        w.write_event(Event::Start(guid_start))
            .context("Failed to write guid element")?;
        w.write_event(Event::Text(BytesText::new(&guid)))
            .context("Failed to write guid text")?;
        end(w, "guid")?;

        text_element(w, "title", entry.display_title())?;
        cdata_element(w, "description", description)?;
        text_element(w, "pubDate", &rfc2822(&episode.published))?;

        let length = length.to_string();
        let url = self.media_url(&entry.file);
        let mut enclosure = BytesStart::new("enclosure");
        enclosure.push_attribute(("url", url.as_str()));
        enclosure.push_attribute(("length", length.as_str()));
        enclosure.push_attribute(("type", mime_type_for(&entry.file)));
        w.write_event(Event::Empty(enclosure))
            .context("Failed to write enclosure element")?;

        text_element(w, "itunes:explicit", yes_no(explicit))?;
        text_element(w, "itunes:author", author)?;
        if let Some(duration) = &duration {
            text_element(w, "itunes:duration", duration)?;
        }
        if let Some(subtitle) = &entry.subtitle {
            text_element(w, "itunes:subtitle", subtitle)?;
        }
        cdata_element(w, "itunes:summary", summary)?;
        if let Some(href) = self.resolve_image(entry.image.as_deref()) {
            image_element(w, &href)?;
        }
        if let Some(season) = entry.season {
            text_element(w, "itunes:season", &season.to_string())?;
        }
        if let Some(number) = entry.episode {
            text_element(w, "itunes:episode", &number.to_string())?;
        }
        if let Some(kind) = entry.episode_type {
            text_element(w, "itunes:episodeType", kind.as_str())?;
        }

        end(w, "item")
    }

    fn probe_duration(&self, path: &Path) -> Option<String> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Skipping duration probe for missing file");
            return None;
        }
        match self.prober.probe_seconds(path) {
            Ok(seconds) => format_itunes_duration(Some(seconds)),
            Err(e) => {
                tracing::warn!(
                    podcast = %self.podcast,
                    path = %path.display(),
                    error = %e,
                    "Failed to get duration"
                );
                None
            }
        }
    }
}

/// Renders category pairs as a standalone `<itunes:category>` fragment.
pub fn categories_fragment(categories: &[CategoryPair]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_categories(&mut writer, categories)?;
    let bytes = writer.into_inner().into_inner();
    let fragment = String::from_utf8(bytes).context("Category fragment contains invalid UTF-8")?;
    Ok(fragment.trim_start_matches('\n').to_string())
}

fn write_categories(w: &mut XmlWriter, categories: &[CategoryPair]) -> Result<()> {
    for category in categories {
        let mut parent = BytesStart::new("itunes:category");
        parent.push_attribute(("text", category.parent.as_str()));
        match &category.sub {
            Some(sub) => {
                w.write_event(Event::Start(parent))
                    .context("Failed to write category element")?;
                let mut child = BytesStart::new("itunes:category");
                child.push_attribute(("text", sub.as_str()));
                w.write_event(Event::Empty(child))
                    .context("Failed to write subcategory element")?;
                end(w, "itunes:category")?;
            }
            None => {
                w.write_event(Event::Empty(parent))
                    .context("Failed to write category element")?;
            }
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn start(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to write {} element", name))?;
    Ok(())
}

fn end(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to write {} end", name))?;
    Ok(())
}

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("Failed to write {} text", name))?;
    end(w, name)
}

fn image_element(w: &mut XmlWriter, href: &str) -> Result<()> {
    let mut image = BytesStart::new("itunes:image");
    image.push_attribute(("href", href));
    w.write_event(Event::Empty(image))
        .context("Failed to write image element")?;
    Ok(())
}

/// Writes `content` as CDATA, or an empty element when it is blank.
fn cdata_element(w: &mut XmlWriter, name: &str, content: &str) -> Result<()> {
    if content.trim().is_empty() {
        w.write_event(Event::Empty(BytesStart::new(name)))
            .with_context(|| format!("Failed to write {} element", name))?;
        return Ok(());
    }
    start(w, name)?;
    for chunk in cdata_chunks(content) {
        w.write_event(Event::CData(BytesCData::new(chunk)))
            .with_context(|| format!("Failed to write {} CDATA", name))?;
    }
    end(w, name)
}

/// Splits text so no piece contains the `]]>` terminator; adjacent CDATA
/// sections concatenate back to the original text.
fn cdata_chunks(content: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut from = 0;
    for (idx, _) in content.match_indices("]]>") {
        chunks.push(&content[from..idx + 2]);
        from = idx + 2;
    }
    chunks.push(&content[from..]);
    chunks
}
