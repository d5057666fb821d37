use url::Url;

/// True when `reference` is already an absolute http(s) link.
pub fn is_absolute_http(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Builds `<base>/<podcast>/<file>` with each segment percent-encoded.
///
/// # Examples
///
/// ```
/// use podcastify::util::media_url;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:8080").unwrap();
/// assert_eq!(
///     media_url(&base, "tech-talk", "Episode 1.mp3"),
///     "http://localhost:8080/tech-talk/Episode%201.mp3"
/// );
/// ```
pub fn media_url(base: &Url, podcast: &str, file: &str) -> String {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(podcast).push(file);
        }
        Err(()) => {
            // cannot-be-a-base URLs are rejected by Config::media_base
            return format!(
                "{}/{}/{}",
                base.as_str().trim_end_matches('/'),
                podcast,
                file
            );
        }
    }
    url.to_string()
}
