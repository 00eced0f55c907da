//! Error types for resolution, per-item work and the batch as a whole.
//!
//! `ResolutionError` and `BatchError` are fatal for a run. `FetchError` and
//! `TranscodeError` stay inside one item: the lane turns them into a failed
//! result and moves on.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::tools::RunError;

/// The playlist could not be turned into a list of items.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Input is neither a playlist URL nor a playlist id.
    #[error("invalid playlist identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    /// yt-dlp could not be run.
    #[error("{0}")]
    Tool(#[source] RunError),

    /// The upstream source rejected the playlist.
    #[error("could not load playlist {identifier}: {diagnostic}")]
    Upstream {
        identifier: String,
        diagnostic: String,
    },

    /// The upstream answer was not the expected JSON.
    #[error("unexpected playlist data for {identifier}: {source}")]
    Malformed {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Downloading one item failed. Always carries the item URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{source}")]
    Tool {
        item: String,
        #[source]
        source: RunError,
    },

    #[error("download timed out after {:.1}s", .after.as_secs_f64())]
    Timeout { item: String, after: Duration },

    /// Stream resolution or the download itself failed upstream.
    #[error("{diagnostic}")]
    Upstream { item: String, diagnostic: String },

    /// The downloader reported success but produced no file.
    #[error("downloaded file {} is missing", .path.display())]
    Missing { item: String, path: PathBuf },

    #[error("{source}")]
    Io {
        item: String,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn from_run(item: &str, err: RunError) -> Self {
        match err {
            RunError::Timeout { after, .. } => FetchError::Timeout {
                item: item.to_string(),
                after,
            },
            other => FetchError::Tool {
                item: item.to_string(),
                source: other,
            },
        }
    }

    /// URL of the item that failed.
    pub fn item(&self) -> &str {
        match self {
            FetchError::Tool { item, .. }
            | FetchError::Timeout { item, .. }
            | FetchError::Upstream { item, .. }
            | FetchError::Missing { item, .. }
            | FetchError::Io { item, .. } => item,
        }
    }
}

/// Extracting audio from one downloaded video failed. Always carries the video path.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("{} has no audio track", .video.display())]
    NoAudioTrack { video: PathBuf },

    #[error("{source}")]
    Tool {
        video: PathBuf,
        #[source]
        source: RunError,
    },

    #[error("audio extraction timed out after {:.1}s", .after.as_secs_f64())]
    Timeout { video: PathBuf, after: Duration },

    /// ffmpeg failed for another reason (corrupt input, unwritable output...).
    #[error("{diagnostic}")]
    Upstream { video: PathBuf, diagnostic: String },

    #[error("{}: {source}", .video.display())]
    Io {
        video: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TranscodeError {
    pub(crate) fn from_run(video: &Path, err: RunError) -> Self {
        match err {
            RunError::Timeout { after, .. } => TranscodeError::Timeout {
                video: video.to_path_buf(),
                after,
            },
            other => TranscodeError::Tool {
                video: video.to_path_buf(),
                source: other,
            },
        }
    }

    /// Path of the video that could not be converted.
    pub fn video(&self) -> &Path {
        match self {
            TranscodeError::NoAudioTrack { video }
            | TranscodeError::Tool { video, .. }
            | TranscodeError::Timeout { video, .. }
            | TranscodeError::Upstream { video, .. }
            | TranscodeError::Io { video, .. } => video,
        }
    }
}

/// Why one item ended up as a failure.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    #[error("transcode: {0}")]
    Transcode(#[from] TranscodeError),

    /// Creating the staging directory or moving the result out of it failed.
    #[error("staging: {0}")]
    Staging(#[source] io::Error),
}

/// Errors that stop the whole run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("output folder {}: {reason}", .path.display())]
    OutputDir { path: PathBuf, reason: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("could not start {lane}: {source}")]
    LaneSpawn {
        lane: String,
        #[source]
        source: io::Error,
    },

    #[error("{lane} panicked")]
    LanePanicked { lane: String },
}
