//! Batch coordination: resolve → partition → lanes → join.
//!
//! Every chunk gets its own OS thread inside a `std::thread::scope`, so the
//! call blocks until all lanes are done. Progress flows through the event
//! channel while the call is outstanding; the per-item outcomes come back
//! by value at join.

mod lane;
mod staging;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

use crate::config::{CleanupPolicy, Pl2AudioConfig, DEFAULT_LANES};
use crate::error::BatchError;
use crate::fetch::Fetcher;
use crate::partition::partition;
use crate::report::{BatchEvent, PlaylistSummary};
use crate::resolver::{ItemRef, PlaylistSource};
use crate::transcode::Transcoder;

use lane::Lane;
use staging::Staging;

pub use staging::QUARANTINE_DIR;

/// Outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Success { item: ItemRef, audio_path: PathBuf },
    Failure { item: ItemRef, reason: String },
}

impl DownloadResult {
    pub fn item(&self) -> &ItemRef {
        match self {
            DownloadResult::Success { item, .. } | DownloadResult::Failure { item, .. } => item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success { .. })
    }
}

/// All outcomes of a batch, in completion order per lane (unordered across lanes).
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub lanes_used: usize,
    pub results: Vec<DownloadResult>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Knobs for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub lanes: usize,
    pub cleanup: CleanupPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES,
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl From<&Pl2AudioConfig> for BatchOptions {
    fn from(cfg: &Pl2AudioConfig) -> Self {
        Self {
            lanes: cfg.lanes,
            cleanup: cfg.cleanup_on_failure,
        }
    }
}

/// Checks that the output folder exists and is a writable directory.
/// The folder is never created here.
pub fn validate_output_dir(path: &Path) -> Result<(), BatchError> {
    let fail = |reason: String| BatchError::OutputDir {
        path: path.to_path_buf(),
        reason,
    };
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => fail("does not exist".to_string()),
        _ => fail(e.to_string()),
    })?;
    if !meta.is_dir() {
        return Err(fail("is not a directory".to_string()));
    }
    // Writable means a stage can actually be created there.
    Staging::create(path).map_err(|e| fail(format!("is not writable: {e}")))?;
    Ok(())
}

/// Runs `items` across up to `options.lanes` lanes and waits for all of them.
///
/// Emits `Started` (when there is work) and always `Finished`. Per-item
/// failures are part of the summary, never an `Err`.
pub fn run_batch(
    items: &[ItemRef],
    output_dir: &Path,
    fetcher: &dyn Fetcher,
    transcoder: &dyn Transcoder,
    options: BatchOptions,
    events: &Sender<BatchEvent>,
) -> Result<BatchSummary, BatchError> {
    let chunks = partition(items, options.lanes);
    let lanes_used = chunks.len();
    if lanes_used > 0 {
        let _ = events.send(BatchEvent::Started {
            lanes: lanes_used,
            items: items.len(),
        });
    }
    tracing::info!(items = items.len(), lanes = lanes_used, "batch started");

    let results = thread::scope(|s| -> Result<Vec<DownloadResult>, BatchError> {
        let mut handles = Vec::with_capacity(lanes_used);
        for (i, chunk) in chunks.into_iter().enumerate() {
            let lane = Lane {
                name: format!("lane-{}", i + 1),
                output_dir,
                fetcher,
                transcoder,
                cleanup: options.cleanup,
                events: events.clone(),
            };
            let name = lane.name.clone();
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(s, move || lane.run(chunk))
                .map_err(|source| BatchError::LaneSpawn {
                    lane: name.clone(),
                    source,
                })?;
            handles.push((name, handle));
        }

        let mut results = Vec::with_capacity(items.len());
        let mut panicked = None;
        for (name, handle) in handles {
            match handle.join() {
                Ok(lane_results) => results.extend(lane_results),
                Err(_) => {
                    tracing::error!(lane = %name, "lane panicked");
                    panicked.get_or_insert(name);
                }
            }
        }
        match panicked {
            Some(lane) => Err(BatchError::LanePanicked { lane }),
            None => Ok(results),
        }
    })?;

    let summary = BatchSummary {
        lanes_used,
        results,
    };
    tracing::info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "batch finished"
    );
    let _ = events.send(BatchEvent::Finished {
        lanes: lanes_used,
        succeeded: summary.succeeded(),
        failed: summary.failed(),
    });
    Ok(summary)
}

/// The whole operation: validate the folder, resolve the playlist, report
/// its metadata, then run every available item.
///
/// Resolution failures abort before any lane starts.
pub fn run_playlist(
    identifier: &str,
    output_dir: &Path,
    source: &dyn PlaylistSource,
    fetcher: &dyn Fetcher,
    transcoder: &dyn Transcoder,
    options: BatchOptions,
    events: &Sender<BatchEvent>,
) -> Result<BatchSummary, BatchError> {
    validate_output_dir(output_dir)?;
    let playlist = source.resolve(identifier)?;
    let _ = events.send(BatchEvent::Resolved(PlaylistSummary::from(&playlist)));
    run_batch(
        &playlist.items,
        output_dir,
        fetcher,
        transcoder,
        options,
        events,
    )
}
