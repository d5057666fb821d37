//! iTunes `<itunes:duration>` formatting.

/// Formats a number of seconds as an iTunes duration string.
///
/// Rounds to the nearest whole second (ties to even) and renders `H:MM:SS`
/// once the value reaches an hour, `M:SS` below that. Negative, NaN and
/// infinite inputs clamp to zero. `None` stays `None` so callers can omit the
/// element entirely.
///
/// # Examples
///
/// ```
/// use podcastify::feed::format_itunes_duration;
///
/// assert_eq!(format_itunes_duration(Some(45.0)).as_deref(), Some("0:45"));
/// assert_eq!(format_itunes_duration(Some(125.0)).as_deref(), Some("2:05"));
/// assert_eq!(format_itunes_duration(Some(3725.0)).as_deref(), Some("1:02:05"));
/// assert_eq!(format_itunes_duration(None), None);
/// ```
pub fn format_itunes_duration(seconds: Option<f64>) -> Option<String> {
    let seconds = seconds?;
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round_ties_even() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    Some(if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    })
}
