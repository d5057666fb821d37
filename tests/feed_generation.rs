//! Integration tests for end-to-end feed generation.
//!
//! Each test builds its own podcasts/public directory pair in a tempdir and
//! drives the public `Generator` API with a fake duration prober, then reads
//! the written XML back with quick-xml's reader.

use pretty_assertions::assert_eq;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use podcastify::feed::{stable_guid, PodcastId, ProbeError};
use podcastify::{Config, Generator, PodcastOutcome};

// ============================================================================
// Fixtures
// ============================================================================

struct Workspace {
    _dir: tempfile::TempDir,
    config: Config,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            podcasts_root: dir.path().join("podcasts"),
            public_root: dir.path().join("public"),
            base_url: "https://pods.example.com".to_string(),
            ..Config::default()
        };
        std::fs::create_dir_all(&config.podcasts_root).unwrap();
        std::fs::create_dir_all(&config.public_root).unwrap();
        Self { _dir: dir, config }
    }

    fn write_config(&self, name: &str, yaml: &str) -> PathBuf {
        let path = self.config.podcasts_root.join(format!("{}-podcast.yaml", name));
        std::fs::write(&path, yaml).unwrap();
        path
    }

    fn media_dir(&self, name: &str) -> PathBuf {
        let dir = self.config.public_root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn add_media(&self, name: &str, file: &str, bytes: usize, mtime_secs: u64) {
        let path = self.media_dir(name).join(file);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
            .unwrap();
    }

    fn feed(&self, name: &str) -> String {
        std::fs::read_to_string(self.config.public_root.join(format!("{}.xml", name))).unwrap()
    }
}

fn fixed_duration(_: &Path) -> Result<f64, ProbeError> {
    Ok(3725.0)
}

fn failing_probe(_: &Path) -> Result<f64, ProbeError> {
    Err(ProbeError::Unparsable("N/A".to_string()))
}

#[derive(Debug, Default)]
struct Item {
    guid: String,
    title: String,
    pub_date: String,
    enclosure_url: String,
    enclosure_length: String,
    description: String,
    duration: Option<String>,
    image: Option<String>,
}

fn attr(element: &BytesStart, key: &str) -> String {
    element
        .try_get_attribute(key)
        .unwrap()
        .map(|a| a.unescape_value().unwrap().into_owned())
        .unwrap_or_default()
}

/// Walks the whole document (failing on malformed XML) and collects items.
fn parse_items(xml: &str) -> Vec<Item> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<Item> = None;
    let mut element = String::new();

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                element = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                if element == "item" {
                    current = Some(Item::default());
                }
            }
            Event::Empty(e) => {
                if let Some(item) = current.as_mut() {
                    match e.name().as_ref() {
                        b"enclosure" => {
                            item.enclosure_url = attr(&e, "url");
                            item.enclosure_length = attr(&e, "length");
                        }
                        b"itunes:image" => item.image = Some(attr(&e, "href")),
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if let Some(item) = current.as_mut() {
                    let text = t.unescape().unwrap().into_owned();
                    match element.as_str() {
                        "guid" => item.guid = text,
                        "title" => item.title = text,
                        "pubDate" => item.pub_date = text,
                        "itunes:duration" => item.duration = Some(text),
                        _ => {}
                    }
                }
            }
            Event::CData(c) => {
                if let Some(item) = current.as_mut() {
                    if element == "description" {
                        item.description
                            .push_str(std::str::from_utf8(&c.into_inner()).unwrap());
                    }
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    items.extend(current.take());
                }
                element.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    items
}

// ============================================================================
// Scan mode
// ============================================================================

#[test]
fn test_scan_mode_newest_first_by_mtime() {
    let ws = Workspace::new();
    ws.write_config(
        "tech",
        "podcast:\n  title: Tech Talk\n  author-name: Ada\n  categories: [[Technology, Tech News]]\n",
    );
    ws.add_media("tech", "older.mp3", 100, 1_700_000_000);
    ws.add_media("tech", "newer.mp3", 250, 1_710_000_000);
    ws.add_media("tech", "notes.txt", 10, 1_720_000_000);

    let summary = Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();
    assert_eq!(summary.succeeded, 1);

    let xml = ws.feed("tech");
    assert!(xml.contains("<title>Tech Talk</title>"));
    assert!(xml.contains("<link>https://pods.example.com</link>"));
    assert!(xml.contains("<itunes:category text=\"Technology\">"));
    assert!(xml.contains("<itunes:category text=\"Tech News\"/>"));

    let items = parse_items(&xml);
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["newer", "older"]);

    let id = PodcastId::new("tech");
    assert_eq!(items[0].guid, stable_guid(&id, "newer.mp3"));
    assert_eq!(items[0].enclosure_url, "https://pods.example.com/tech/newer.mp3");
    assert_eq!(items[0].enclosure_length, "250");
    assert_eq!(items[0].duration.as_deref(), Some("1:02:05"));
    assert_eq!(items[1].pub_date, "Tue, 14 Nov 2023 22:13:20 +0000");
}

#[test]
fn test_guids_stable_across_regeneration() {
    let ws = Workspace::new();
    ws.write_config("show", "title: Show\n");
    ws.add_media("show", "ep1.mp3", 1, 1_000);
    ws.add_media("show", "ep2.mp3", 1, 2_000);

    let generator = Generator::new(&ws.config, &fixed_duration).unwrap();
    generator.process_all();
    let first: Vec<String> = parse_items(&ws.feed("show")).into_iter().map(|i| i.guid).collect();
    generator.process_all();
    let second: Vec<String> = parse_items(&ws.feed("show")).into_iter().map(|i| i.guid).collect();

    assert_eq!(first, second);
    assert_ne!(first[0], first[1]);
}

// ============================================================================
// Explicit mode
// ============================================================================

#[test]
fn test_declared_dates_sort_and_missing_file_length_zero() {
    let ws = Workspace::new();
    ws.add_media("daily", "jan.mp3", 10, 1_000);
    ws.add_media("daily", "mar.mp3", 30, 1_000);
    ws.write_config(
        "daily",
        r#"
title: Daily
episodes:
  - file: jan.mp3
    title: January
    pub_date: "2024-01-15T09:00:00Z"
  - file: ghost.mp3
    title: Ghost
    pub_date: "2024-02-01T00:00:00Z"
  - file: mar.mp3
    title: March
    pub_date: "2024-03-01T06:30:00+00:00"
    duration_hms: "45:00"
"#,
    );

    let summary = Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();
    assert!(summary.any_succeeded());

    let items = parse_items(&ws.feed("daily"));
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["March", "Ghost", "January"]);
    assert_eq!(items[0].pub_date, "Fri, 01 Mar 2024 06:30:00 +0000");
    assert_eq!(items[0].duration.as_deref(), Some("45:00"));
    assert_eq!(items[1].enclosure_length, "0");
    assert_eq!(items[1].duration, None);
    assert_eq!(items[2].enclosure_length, "10");
}

#[test]
fn test_file_reference_cannot_escape_media_dir() {
    let ws = Workspace::new();
    ws.add_media("safe", "secret.mp3", 5, 1_000);
    ws.write_config("safe", "episodes:\n  - file: ../../secret.mp3\n");

    Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();

    let items = parse_items(&ws.feed("safe"));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].enclosure_url, "https://pods.example.com/safe/secret.mp3");
    assert_eq!(items[0].enclosure_length, "5");
}

#[test]
fn test_markup_in_text_keeps_document_well_formed() {
    let ws = Workspace::new();
    ws.add_media("odd", "ep.mp3", 1, 1_000);
    ws.write_config(
        "odd",
        r#"
title: "Q&A <live> \"edition\""
description: "<p>Rock & roll</p>"
episodes:
  - file: ep.mp3
    title: "Fish & Chips"
    description: "Ends with ]]> inside"
"#,
    );

    Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();

    let xml = ws.feed("odd");
    assert!(xml.contains("<title>Q&amp;A &lt;live&gt; &quot;edition&quot;</title>"));
    assert!(xml.contains("<![CDATA[<p>Rock & roll</p>]]>"));

    let items = parse_items(&xml);
    assert_eq!(items[0].title, "Fish & Chips");
    assert_eq!(items[0].description, "Ends with ]]> inside");
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn test_image_resolution() {
    let ws = Workspace::new();
    ws.add_media("art", "ep1.mp3", 1, 1_000);
    ws.add_media("art", "ep2.mp3", 1, 2_000);
    ws.add_media("art", "cover.jpg", 1, 1_000);
    ws.write_config(
        "art",
        r#"
image: missing.jpg
episodes:
  - file: ep1.mp3
    image: cover.jpg
  - file: ep2.mp3
    image: https://cdn.example.com/ep2.png
"#,
    );

    Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();

    let xml = ws.feed("art");
    let channel = &xml[..xml.find("<item>").unwrap()];
    assert!(!channel.contains("<itunes:image"));

    let items = parse_items(&xml);
    assert_eq!(items[0].image.as_deref(), Some("https://cdn.example.com/ep2.png"));
    assert_eq!(items[1].image.as_deref(), Some("https://pods.example.com/art/cover.jpg"));
}

// ============================================================================
// Batch behavior
// ============================================================================

#[test]
fn test_failures_do_not_stop_other_podcasts() {
    let ws = Workspace::new();
    ws.write_config("broken", "title: [unterminated\n");
    ws.write_config("empty", "");
    ws.write_config("nodir", "title: Lost\n");
    ws.write_config("ok", "title: Fine\n");
    ws.add_media("ok", "ep.mp3", 1, 1_000);

    let summary = Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(parse_items(&ws.feed("ok")).len(), 1);
}

#[test]
fn test_probe_failure_omits_duration_only() {
    let ws = Workspace::new();
    ws.write_config("quiet", "title: Quiet\n");
    ws.add_media("quiet", "ep.mp3", 1, 1_000);

    let summary = Generator::new(&ws.config, &failing_probe)
        .unwrap()
        .process_all();
    assert_eq!(summary.succeeded, 1);

    let items = parse_items(&ws.feed("quiet"));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].duration, None);
}

#[test]
fn test_dry_run_counts_success_without_writing() {
    let mut ws = Workspace::new();
    ws.config.publish_xml = false;
    let config_path = ws.write_config("dry", "title: Dry\n");
    ws.add_media("dry", "ep.mp3", 1, 1_000);

    let generator = Generator::new(&ws.config, &fixed_duration).unwrap();
    assert_eq!(
        generator.process_podcast(&config_path).unwrap(),
        PodcastOutcome::Validated { episodes: 1 }
    );
    assert!(generator.process_all().any_succeeded());
    assert!(!ws.config.public_root.join("dry.xml").exists());
}

#[test]
fn test_no_configs_is_zero_success() {
    let ws = Workspace::new();
    let summary = Generator::new(&ws.config, &fixed_duration)
        .unwrap()
        .process_all();
    assert_eq!(summary.total, 0);
    assert!(!summary.any_succeeded());
}
