//! In-memory stand-ins for yt-dlp and ffmpeg.
//!
//! Item URLs look like `https://media.test/watch?v=<name>`; `<name>` drives
//! the behaviour: `bad*` fails to fetch, `noaudio*` fails to transcode,
//! `panic*` panics inside the fetcher.

#![allow(dead_code)]

use pl2audio_core::error::{FetchError, ResolutionError, TranscodeError};
use pl2audio_core::fetch::Fetcher;
use pl2audio_core::report::BatchEvent;
use pl2audio_core::resolver::{ItemRef, PlaylistHandle, PlaylistSource, ViewCount};
use pl2audio_core::transcode::Transcoder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

pub fn item(name: &str) -> ItemRef {
    ItemRef::new(format!("https://media.test/watch?v={name}"))
}

pub fn items(names: &[&str]) -> Vec<ItemRef> {
    names.iter().map(|n| item(n)).collect()
}

pub fn numbered(n: usize) -> Vec<ItemRef> {
    (0..n).map(|i| item(&format!("video{i}"))).collect()
}

fn name_of(url: &str) -> &str {
    url.rsplit("v=").next().unwrap_or(url)
}

pub fn playlist(items: Vec<ItemRef>) -> PlaylistHandle {
    PlaylistHandle {
        identifier: "PLtest".into(),
        title: "Test Playlist".into(),
        owner: "Tester".into(),
        item_count: items.len() as u64,
        view_count: ViewCount::Unavailable,
        items,
    }
}

/// Playlist source returning a fixed handle, or an upstream error when `None`.
pub struct FakeSource {
    pub playlist: Option<PlaylistHandle>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(playlist: Option<PlaylistHandle>) -> Self {
        Self {
            playlist,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PlaylistSource for FakeSource {
    fn resolve(&self, identifier: &str) -> Result<PlaylistHandle, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.playlist
            .clone()
            .ok_or_else(|| ResolutionError::Upstream {
                identifier: identifier.to_string(),
                diagnostic: "ERROR: The playlist does not exist.".into(),
            })
    }
}

/// Writes `<name>.mp4` containing the URL. Records `(thread name, url)` per call.
#[derive(Default)]
pub struct FakeFetcher {
    pub calls: Mutex<Vec<(String, String)>>,
    pub delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn urls_by_lane(&self) -> Vec<(String, Vec<String>)> {
        let calls = self.calls.lock().unwrap();
        let mut lanes: Vec<(String, Vec<String>)> = Vec::new();
        for (lane, url) in calls.iter() {
            match lanes.iter_mut().find(|(l, _)| l == lane) {
                Some((_, urls)) => urls.push(url.clone()),
                None => lanes.push((lane.clone(), vec![url.clone()])),
            }
        }
        lanes.sort();
        lanes
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, item: &ItemRef, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        let lane = thread::current().name().unwrap_or("?").to_string();
        self.calls.lock().unwrap().push((lane, item.url.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = name_of(&item.url);
        if name.starts_with("panic") {
            panic!("fetcher exploded on {name}");
        }
        if name.starts_with("bad") {
            return Err(FetchError::Upstream {
                item: item.url.clone(),
                diagnostic: "ERROR: Video unavailable".into(),
            });
        }
        let path = dest_dir.join(format!("{name}.mp4"));
        fs::write(&path, item.url.as_bytes()).map_err(|source| FetchError::Io {
            item: item.url.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Writes `<stem>.mp3` containing `audio:` plus the video bytes.
pub struct FakeTranscoder;

impl Transcoder for FakeTranscoder {
    fn extract_audio(&self, video: &Path, output_dir: &Path) -> Result<PathBuf, TranscodeError> {
        let stem = video.file_stem().unwrap().to_string_lossy().into_owned();
        if stem.starts_with("noaudio") {
            return Err(TranscodeError::NoAudioTrack {
                video: video.to_path_buf(),
            });
        }
        let io_err = |source| TranscodeError::Io {
            video: video.to_path_buf(),
            source,
        };
        let mut data = b"audio:".to_vec();
        data.extend(fs::read(video).map_err(io_err)?);
        let out = output_dir.join(format!("{stem}.mp3"));
        fs::write(&out, data).map_err(io_err)?;
        Ok(out)
    }
}

/// Drains every event still queued; call after the sender is dropped.
pub fn collect(rx: Receiver<BatchEvent>) -> Vec<BatchEvent> {
    rx.iter().collect()
}

/// Names of all entries in `dir`, sorted.
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
