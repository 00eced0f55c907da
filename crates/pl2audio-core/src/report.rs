//! Status events emitted while a batch runs.
//!
//! Lanes send [`BatchEvent`]s on a channel; a single consumer (the CLI)
//! renders them. `Display` gives the user-facing text.

use std::fmt;
use std::path::PathBuf;

use crate::resolver::{PlaylistHandle, ViewCount};

/// Playlist metadata shown before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub title: String,
    pub owner: String,
    pub item_count: u64,
    pub view_count: ViewCount,
    /// Items left after dropping private/unavailable entries.
    pub available: usize,
}

impl From<&PlaylistHandle> for PlaylistSummary {
    fn from(p: &PlaylistHandle) -> Self {
        Self {
            title: p.title.clone(),
            owner: p.owner.clone(),
            item_count: p.item_count,
            view_count: p.view_count,
            available: p.items.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Resolved(PlaylistSummary),
    Started { lanes: usize, items: usize },
    Downloaded { lane: String, file: String },
    Extracted { lane: String, file: String },
    Deleted { lane: String, file: String },
    /// Video kept after a failed extraction (keep/quarantine policy).
    Retained { lane: String, path: PathBuf },
    ItemFailed { lane: String, item: String, reason: String },
    Finished { lanes: usize, succeeded: usize, failed: usize },
}

impl BatchEvent {
    /// Errors go to stderr in the CLI.
    pub fn is_error(&self) -> bool {
        matches!(self, BatchEvent::ItemFailed { .. })
    }
}

impl fmt::Display for BatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchEvent::Resolved(p) => {
                writeln!(f, "Playlist Name : {}", p.title)?;
                writeln!(f, "Channel Name  : {}", p.owner)?;
                writeln!(f, "Total Videos  : {}", p.item_count)?;
                write!(f, "Total Views   : {}", p.view_count)
            }
            BatchEvent::Started { lanes, items } => {
                write!(f, "Processing {items} item(s) on {lanes} lane(s)")
            }
            BatchEvent::Downloaded { lane, file } => write!(f, "{lane} --> {file} downloaded"),
            BatchEvent::Extracted { lane, file } => write!(f, "{lane} --> {file} extracted"),
            BatchEvent::Deleted { lane, file } => write!(f, "{lane} --> {file} deleted"),
            BatchEvent::Retained { lane, path } => {
                write!(f, "{lane} --> kept {}", path.display())
            }
            BatchEvent::ItemFailed { lane, item, reason } => {
                write!(f, "{lane} --> failed {item}: {reason}")
            }
            BatchEvent::Finished {
                lanes,
                succeeded,
                failed,
            } => write!(
                f,
                "Done: {succeeded} succeeded, {failed} failed across {lanes} lane(s)"
            ),
        }
    }
}
