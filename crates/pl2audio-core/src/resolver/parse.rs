//! Parsing of `yt-dlp --flat-playlist --dump-single-json` output.

use serde::Deserialize;
use serde_json::Value;

use super::{ItemRef, PlaylistHandle, ViewCount};

const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";

/// Availability values that mean the item cannot be downloaded anonymously.
const UNAVAILABLE_AVAILABILITY: &[&str] = &["private", "needs_auth", "subscriber_only", "premium_only"];

/// Placeholder titles the source uses for entries that are gone.
const UNAVAILABLE_TITLES: &[&str] = &["[Private video]", "[Deleted video]"];

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    playlist_count: Option<u64>,
    #[serde(default)]
    view_count: Option<Value>,
    #[serde(default)]
    entries: Vec<Option<RawEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    availability: Option<String>,
}

impl RawEntry {
    fn is_unavailable(&self) -> bool {
        if let Some(url) = &self.url {
            if url.to_ascii_lowercase().contains("private") {
                return true;
            }
        }
        if let Some(a) = &self.availability {
            if UNAVAILABLE_AVAILABILITY.contains(&a.as_str()) {
                return true;
            }
        }
        if let Some(t) = &self.title {
            if UNAVAILABLE_TITLES.contains(&t.trim()) {
                return true;
            }
        }
        false
    }

    fn into_item(self) -> Option<ItemRef> {
        let url = match (self.url, self.id) {
            (Some(u), _) if !u.trim().is_empty() => u,
            (_, Some(id)) if !id.trim().is_empty() => format!("{WATCH_BASE}{id}"),
            _ => return None,
        };
        Some(ItemRef {
            url,
            title: self.title,
        })
    }
}

/// Best-effort view count: integers and digit strings count, anything else
/// is reported as unavailable.
pub(crate) fn parse_view_count(v: Option<&Value>) -> ViewCount {
    match v {
        Some(Value::Number(n)) => n.as_u64().map_or(ViewCount::Unavailable, ViewCount::Known),
        Some(Value::String(s)) => {
            let digits: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                digits.parse().map_or(ViewCount::Unavailable, ViewCount::Known)
            } else {
                ViewCount::Unavailable
            }
        }
        _ => ViewCount::Unavailable,
    }
}

/// Builds a [`PlaylistHandle`] from the JSON document, dropping unavailable entries.
pub(crate) fn parse_playlist(identifier: &str, json: &str) -> Result<PlaylistHandle, serde_json::Error> {
    let raw: RawPlaylist = serde_json::from_str(json)?;
    let raw_count = raw.entries.len() as u64;

    let mut items = Vec::with_capacity(raw.entries.len());
    for entry in raw.entries.into_iter().flatten() {
        if entry.is_unavailable() {
            tracing::debug!(url = ?entry.url, title = ?entry.title, "skipping unavailable entry");
            continue;
        }
        if let Some(item) = entry.into_item() {
            items.push(item);
        }
    }

    Ok(PlaylistHandle {
        identifier: identifier.to_string(),
        title: raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| identifier.to_string()),
        owner: raw
            .uploader
            .or(raw.channel)
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        item_count: raw.playlist_count.unwrap_or(raw_count),
        view_count: parse_view_count(raw.view_count.as_ref()),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "https://www.youtube.com/playlist?list=PL1";

    fn doc(entries: Value, view_count: Value) -> String {
        json!({
            "_type": "playlist",
            "title": "Road Trip",
            "uploader": "Some Channel",
            "playlist_count": 5,
            "view_count": view_count,
            "entries": entries,
        })
        .to_string()
    }

    #[test]
    fn parses_metadata_and_items() {
        let json = doc(
            json!([
                {"id": "a1", "url": "https://www.youtube.com/watch?v=a1", "title": "First"},
                {"id": "b2", "title": "Second"},
            ]),
            json!(1234),
        );
        let p = parse_playlist(ID, &json).unwrap();
        assert_eq!(p.title, "Road Trip");
        assert_eq!(p.owner, "Some Channel");
        assert_eq!(p.item_count, 5);
        assert_eq!(p.view_count, ViewCount::Known(1234));
        let urls: Vec<&str> = p.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://www.youtube.com/watch?v=a1",
                "https://www.youtube.com/watch?v=b2"
            ]
        );
        assert_eq!(p.items[1].title.as_deref(), Some("Second"));
    }

    #[test]
    fn excludes_exactly_the_flagged_entries() {
        let json = doc(
            json!([
                {"id": "ok1", "url": "https://www.youtube.com/watch?v=ok1"},
                {"id": "p1", "url": "https://www.youtube.com/watch?v=p1&private=1"},
                {"id": "ok2", "url": "https://www.youtube.com/watch?v=ok2", "availability": "public"},
                {"id": "p2", "url": "https://www.youtube.com/watch?v=p2", "availability": "needs_auth"},
                {"id": "p3", "url": "https://www.youtube.com/watch?v=p3", "title": "[Deleted video]"},
                null,
                {"id": "ok3", "url": "https://www.youtube.com/watch?v=ok3", "availability": "unlisted"},
                {"title": "no id or url"},
            ]),
            json!(0),
        );
        let p = parse_playlist(ID, &json).unwrap();
        let urls: Vec<&str> = p.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://www.youtube.com/watch?v=ok1",
                "https://www.youtube.com/watch?v=ok2",
                "https://www.youtube.com/watch?v=ok3",
            ]
        );
    }

    #[test]
    fn non_numeric_view_count_is_unavailable() {
        let p = parse_playlist(ID, &doc(json!([]), json!("N/A"))).unwrap();
        assert_eq!(p.view_count, ViewCount::Unavailable);
        assert!(p.items.is_empty());
    }

    #[test]
    fn view_count_variants() {
        assert_eq!(parse_view_count(Some(&json!(42))), ViewCount::Known(42));
        assert_eq!(parse_view_count(Some(&json!("1,234,567"))), ViewCount::Known(1_234_567));
        assert_eq!(parse_view_count(Some(&json!(-3))), ViewCount::Unavailable);
        assert_eq!(parse_view_count(Some(&json!(2.5))), ViewCount::Unavailable);
        assert_eq!(parse_view_count(Some(&json!(null))), ViewCount::Unavailable);
        assert_eq!(parse_view_count(Some(&json!(""))), ViewCount::Unavailable);
        assert_eq!(parse_view_count(None), ViewCount::Unavailable);
    }

    #[test]
    fn missing_metadata_falls_back() {
        let json = json!({"channel": "Fallback Owner", "entries": [{"id": "x"}]}).to_string();
        let p = parse_playlist(ID, &json).unwrap();
        assert_eq!(p.title, ID);
        assert_eq!(p.owner, "Fallback Owner");
        assert_eq!(p.item_count, 1);

        let p = parse_playlist(ID, "{}").unwrap();
        assert_eq!(p.owner, "unknown");
        assert_eq!(p.item_count, 0);
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_playlist(ID, "ERROR: not json").is_err());
    }
}
