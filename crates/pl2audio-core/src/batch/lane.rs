//! One worker lane: a chunk of items processed strictly in order.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use crate::config::CleanupPolicy;
use crate::error::{ItemError, TranscodeError};
use crate::fetch::Fetcher;
use crate::report::BatchEvent;
use crate::resolver::ItemRef;
use crate::transcode::Transcoder;

use super::staging::{Staging, QUARANTINE_DIR};
use super::DownloadResult;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

pub(crate) struct Lane<'a> {
    pub(crate) name: String,
    pub(crate) output_dir: &'a Path,
    pub(crate) fetcher: &'a dyn Fetcher,
    pub(crate) transcoder: &'a dyn Transcoder,
    pub(crate) cleanup: CleanupPolicy,
    pub(crate) events: Sender<BatchEvent>,
}

impl Lane<'_> {
    fn emit(&self, event: BatchEvent) {
        // A closed channel only means nobody is rendering; the work goes on.
        let _ = self.events.send(event);
    }

    /// Runs every item of `chunk` in order. Per-item errors and panics
    /// become `Failure` results; nothing here aborts the lane.
    pub(crate) fn run(&self, chunk: Vec<ItemRef>) -> Vec<DownloadResult> {
        tracing::debug!(lane = %self.name, items = chunk.len(), "lane started");
        let mut results = Vec::with_capacity(chunk.len());
        for item in chunk {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.process(&item).map_err(|err| err.to_string())
            }))
            .unwrap_or_else(|payload| Err(format!("panicked: {}", panic_message(&*payload))));
            match outcome {
                Ok(audio_path) => results.push(DownloadResult::Success { item, audio_path }),
                Err(reason) => {
                    tracing::warn!(lane = %self.name, url = %item.url, error = %reason, "item failed");
                    self.emit(BatchEvent::ItemFailed {
                        lane: self.name.clone(),
                        item: item.url.clone(),
                        reason: reason.clone(),
                    });
                    results.push(DownloadResult::Failure { item, reason });
                }
            }
        }
        tracing::debug!(lane = %self.name, "lane finished");
        results
    }

    fn process(&self, item: &ItemRef) -> Result<PathBuf, ItemError> {
        let stage = Staging::create(self.output_dir).map_err(ItemError::Staging)?;

        let video = self.fetcher.fetch(item, stage.path())?;
        self.emit(BatchEvent::Downloaded {
            lane: self.name.clone(),
            file: display_name(&video),
        });

        let staged_audio = match self.transcoder.extract_audio(&video, stage.path()) {
            Ok(p) => p,
            Err(err) => {
                self.dispose_failed(&video, &err);
                return Err(err.into());
            }
        };
        let audio = stage
            .promote(&staged_audio, self.output_dir)
            .map_err(ItemError::Staging)?;
        self.emit(BatchEvent::Extracted {
            lane: self.name.clone(),
            file: display_name(&audio),
        });

        match fs::remove_file(&video) {
            Ok(()) => self.emit(BatchEvent::Deleted {
                lane: self.name.clone(),
                file: display_name(&video),
            }),
            // The staging directory goes away on drop regardless.
            Err(e) => tracing::warn!(lane = %self.name, video = %video.display(), error = %e, "could not delete video"),
        }
        Ok(audio)
    }

    /// Applies the cleanup policy to a video whose extraction failed.
    fn dispose_failed(&self, video: &Path, err: &TranscodeError) {
        let target_dir = match self.cleanup {
            CleanupPolicy::Delete => {
                match fs::remove_file(video) {
                    Ok(()) => self.emit(BatchEvent::Deleted {
                        lane: self.name.clone(),
                        file: display_name(video),
                    }),
                    Err(e) => tracing::warn!(lane = %self.name, video = %video.display(), error = %e, "could not delete video"),
                }
                return;
            }
            CleanupPolicy::Keep => self.output_dir.to_path_buf(),
            CleanupPolicy::Quarantine => self.output_dir.join(QUARANTINE_DIR),
        };

        let moved = fs::create_dir_all(&target_dir).and_then(|()| {
            let dest = target_dir.join(video.file_name().unwrap_or_default());
            fs::rename(video, &dest).map(|()| dest)
        });
        match moved {
            Ok(dest) => {
                tracing::info!(lane = %self.name, video = %dest.display(), error = %err, "kept video after failed extraction");
                self.emit(BatchEvent::Retained {
                    lane: self.name.clone(),
                    path: dest,
                });
            }
            Err(e) => tracing::warn!(lane = %self.name, video = %video.display(), error = %e, "could not keep video"),
        }
    }
}
