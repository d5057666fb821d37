//! Utility functions shared by the feed modules.
//!
//! - **Paths**: basename isolation for config-supplied file references, audio
//!   extension filtering, and MIME type lookup
//! - **URLs**: building public media links under the configured base URL
//!
//! # Examples
//!
//! ```
//! use podcastify::util::{safe_basename, is_absolute_http};
//!
//! assert_eq!(safe_basename("../../etc/passwd"), Some("passwd"));
//! assert!(is_absolute_http("https://example.com/cover.jpg"));
//! ```

mod paths;
mod urls;

pub use paths::{file_stem, is_scannable_audio, mime_type_for, safe_basename};
pub use urls::{is_absolute_http, media_url};
