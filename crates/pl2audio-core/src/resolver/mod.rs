//! Playlist resolution: identifier → metadata plus the downloadable items.
//!
//! The only network query is one `yt-dlp --flat-playlist` call; nothing is
//! kept after the handle is dropped.

mod identifier;
mod parse;

use std::fmt;

use crate::error::ResolutionError;
use crate::fetch::YtDlp;
use crate::tools::run_tool;

pub use identifier::playlist_url;

/// One playlist entry, identified by its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub url: String,
    /// Title as listed in the playlist, when the source provides one.
    pub title: Option<String>,
}

impl ItemRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Playlist view count; upstream values that are not integers become `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCount {
    Known(u64),
    Unavailable,
}

impl fmt::Display for ViewCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewCount::Known(n) => write!(f, "{n}"),
            ViewCount::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// A resolved playlist. Immutable; `items` already excludes private and
/// unavailable entries while `item_count` is the upstream length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistHandle {
    pub identifier: String,
    pub title: String,
    pub owner: String,
    pub item_count: u64,
    pub view_count: ViewCount,
    pub items: Vec<ItemRef>,
}

/// Anything that can list a playlist's items.
pub trait PlaylistSource: Send + Sync {
    fn resolve(&self, identifier: &str) -> Result<PlaylistHandle, ResolutionError>;
}

impl PlaylistSource for YtDlp {
    fn resolve(&self, identifier: &str) -> Result<PlaylistHandle, ResolutionError> {
        let url = playlist_url(identifier)?;
        tracing::info!(%url, "resolving playlist");

        let args = [
            "--flat-playlist",
            "--dump-single-json",
            "--no-warnings",
            "--ignore-no-formats-error",
            url.as_str(),
        ];
        let out = run_tool(self.program(), args, self.resolve_timeout()).map_err(ResolutionError::Tool)?;
        if !out.status.success() {
            return Err(ResolutionError::Upstream {
                identifier: identifier.to_string(),
                diagnostic: out.diagnostic(),
            });
        }

        let handle = parse::parse_playlist(identifier, &out.stdout).map_err(|source| {
            ResolutionError::Malformed {
                identifier: identifier.to_string(),
                source,
            }
        })?;
        tracing::info!(
            title = %handle.title,
            listed = handle.item_count,
            available = handle.items.len(),
            "playlist resolved"
        );
        Ok(handle)
    }
}
