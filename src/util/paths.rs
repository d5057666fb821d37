use std::path::Path;

/// Extensions picked up when scanning a media directory.
const SCAN_EXTENSIONS: &[&str] = &["mp3"];

/// Reduces a config-supplied file reference to its final path component.
///
/// Both `/` and `\` count as separators so a reference can never climb out of
/// the podcast's media directory once joined to it. Returns `None` when no
/// usable component remains (empty, `.`, `..`).
///
/// # Examples
///
/// ```
/// use podcastify::util::safe_basename;
///
/// assert_eq!(safe_basename("episode-01.mp3"), Some("episode-01.mp3"));
/// assert_eq!(safe_basename("season1/episode-01.mp3"), Some("episode-01.mp3"));
/// assert_eq!(safe_basename("..\\..\\boot.ini"), Some("boot.ini"));
/// assert_eq!(safe_basename("media/.."), None);
/// ```
pub fn safe_basename(reference: &str) -> Option<&str> {
    let last = reference
        .trim()
        .split(['/', '\\'])
        .rev()
        .find(|part| !part.is_empty())?;
    match last {
        "." | ".." => None,
        name => Some(name),
    }
}

/// Filename without its final extension (`"ep.1.mp3"` → `"ep.1"`).
pub fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

fn extension_lower(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True for files the directory scan publishes as episodes.
pub fn is_scannable_audio(name: &str) -> bool {
    extension_lower(name).is_some_and(|ext| SCAN_EXTENSIONS.contains(&ext.as_str()))
}

/// Enclosure MIME type for an audio filename; unknown extensions are treated as MP3.
pub fn mime_type_for(name: &str) -> &'static str {
    match extension_lower(name).as_deref() {
        Some("m4a") => "audio/x-m4a",
        Some("aac") => "audio/aac",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        _ => "audio/mpeg",
    }
}
