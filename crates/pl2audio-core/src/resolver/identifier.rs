//! Playlist identifier validation.

use url::Url;

use crate::error::ResolutionError;

const PLAYLIST_BASE: &str = "https://www.youtube.com/playlist?list=";

fn invalid(identifier: &str, reason: &'static str) -> ResolutionError {
    ResolutionError::InvalidIdentifier {
        identifier: identifier.to_string(),
        reason,
    }
}

fn is_bare_id(s: &str) -> bool {
    s.len() >= 2
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Turns user input into the URL handed to yt-dlp.
///
/// Accepts an http(s) URL with a non-empty `list=` query parameter (normalized
/// by `url`) or a bare playlist id (expanded to a playlist URL).
pub fn playlist_url(identifier: &str) -> Result<String, ResolutionError> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(invalid(identifier, "empty"));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let url = Url::parse(trimmed).map_err(|_| invalid(identifier, "not a valid URL"))?;
        let has_list = url
            .query_pairs()
            .any(|(k, v)| k == "list" && !v.trim().is_empty());
        if !has_list {
            return Err(invalid(identifier, "URL has no list= parameter"));
        }
        return Ok(url.to_string());
    }

    if is_bare_id(trimmed) {
        return Ok(format!("{PLAYLIST_BASE}{trimmed}"));
    }

    Err(invalid(identifier, "not a playlist URL or id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_playlist_url() {
        let u = playlist_url("https://www.youtube.com/playlist?list=PLabc123").unwrap();
        assert_eq!(u, "https://www.youtube.com/playlist?list=PLabc123");
    }

    #[test]
    fn accepts_watch_url_with_list() {
        let u = playlist_url(" https://www.youtube.com/watch?v=xyz&list=PL_9-x ").unwrap();
        assert!(u.contains("list=PL_9-x"));
    }

    #[test]
    fn expands_bare_id() {
        assert_eq!(
            playlist_url("PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf").unwrap(),
            "https://www.youtube.com/playlist?list=PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf"
        );
    }

    #[test]
    fn rejects_url_without_list() {
        let err = playlist_url("https://www.youtube.com/watch?v=xyz").unwrap_err();
        assert!(err.to_string().contains("list="));
    }

    #[test]
    fn rejects_garbage() {
        assert!(playlist_url("").is_err());
        assert!(playlist_url("   ").is_err());
        assert!(playlist_url("not a playlist").is_err());
        assert!(playlist_url("x").is_err());
        assert!(playlist_url("ftp://example.com/?list=PL1").is_err());
    }
}
