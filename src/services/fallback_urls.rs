//! Constructed links for recommendations that could not be verified.
//!
//! None of these perform I/O or check that the target exists.

use urlencoding::encode;

/// Netflix Italia catalog search
pub fn netflix_search_url(title: &str) -> String {
    format!("https://www.netflix.com/it/title/search?q={}", encode(title))
}

/// JustWatch availability search, used as `info_url` for unverified items
pub fn justwatch_url(title: &str) -> String {
    format!("https://www.justwatch.com/it/cerca?q={}", encode(title))
}

/// TMDB poster search
pub fn tmdb_image_url(title: &str) -> String {
    format!("https://image.tmdb.org/t/p/w500/search?q={}", encode(title))
}
