//! `pl2audio download` – the whole playlist-to-audio batch.

use anyhow::{bail, Context, Result};
use pl2audio_core::batch::{self, BatchOptions};
use pl2audio_core::config::Pl2AudioConfig;
use pl2audio_core::fetch::YtDlp;
use pl2audio_core::report::BatchEvent;
use pl2audio_core::transcode::Ffmpeg;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Single consumer for lane events; keeps output lines whole.
fn render(rx: Receiver<BatchEvent>) {
    for event in rx {
        if event.is_error() {
            eprintln!("{event}");
        } else {
            println!("{event}");
        }
    }
}

pub fn run_download(cfg: &Pl2AudioConfig, playlist: &str, output: &Path, strict: bool) -> Result<()> {
    let ytdlp = YtDlp::from_config(cfg);
    let ffmpeg = Ffmpeg::from_config(cfg);
    let options = BatchOptions::from(cfg);
    tracing::info!(
        playlist,
        output = %output.display(),
        lanes = options.lanes,
        format = %ffmpeg.format(),
        cleanup = %options.cleanup,
        "download requested"
    );

    let (tx, rx) = mpsc::channel();
    let renderer = thread::Builder::new()
        .name("render".into())
        .spawn(move || render(rx))
        .context("start output thread")?;

    let outcome = batch::run_playlist(playlist, output, &ytdlp, &ytdlp, &ffmpeg, options, &tx);
    drop(tx);
    if renderer.join().is_err() {
        tracing::warn!("output thread panicked");
    }

    let summary = outcome.with_context(|| format!("playlist {playlist}"))?;
    if strict && summary.failed() > 0 {
        bail!(
            "{} of {} item(s) failed",
            summary.failed(),
            summary.results.len()
        );
    }
    Ok(())
}
