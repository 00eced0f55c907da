//! Per-item download through yt-dlp.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Pl2AudioConfig;
use crate::error::FetchError;
use crate::resolver::ItemRef;
use crate::tools::{locate, run_tool};

/// Highest-resolution stream that carries both video and audio, falling back
/// to whatever yt-dlp considers best.
const BEST_COMBINED_FORMAT: &str = "best[vcodec!=none][acodec!=none]/best";

/// File name template; yt-dlp sanitizes the title.
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Downloads one item into a directory and returns the local file path.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, item: &ItemRef, dest_dir: &Path) -> Result<PathBuf, FetchError>;
}

/// yt-dlp wrapper used for both playlist resolution and item download.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    timeout: Option<Duration>,
    resolve_timeout: Option<Duration>,
}

impl YtDlp {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            timeout: None,
            resolve_timeout: None,
        }
    }

    pub fn from_config(cfg: &Pl2AudioConfig) -> Self {
        Self::new(locate("yt-dlp", cfg.tools.yt_dlp.as_deref()))
            .with_timeout(cfg.fetch_timeout())
            .with_resolve_timeout(cfg.resolve_timeout())
    }

    /// Bound each item download; the child is killed when it expires.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound the playlist listing separately; large playlists take a while.
    pub fn with_resolve_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout
    }
}

/// The final path is the last line yt-dlp prints for `after_move:filepath`.
fn printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(PathBuf::from)
}

impl Fetcher for YtDlp {
    fn fetch(&self, item: &ItemRef, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        tracing::debug!(url = %item.url, dest = %dest_dir.display(), "fetching");
        let mut args: Vec<&OsStr> = [
            "--no-playlist",
            "--no-part",
            "--no-warnings",
            "--no-progress",
            "--no-simulate",
            "-f",
            BEST_COMBINED_FORMAT,
            "-o",
            OUTPUT_TEMPLATE,
            "--print",
            "after_move:filepath",
            "-P",
        ]
        .into_iter()
        .map(OsStr::new)
        .collect();
        args.push(dest_dir.as_os_str());
        args.push(OsStr::new("--"));
        args.push(OsStr::new(&item.url));

        let out = run_tool(&self.program, &args, self.timeout)
            .map_err(|e| FetchError::from_run(&item.url, e))?;

        if !out.status.success() {
            return Err(FetchError::Upstream {
                item: item.url.clone(),
                diagnostic: out.diagnostic(),
            });
        }

        let path = printed_path(&out.stdout).ok_or_else(|| FetchError::Upstream {
            item: item.url.clone(),
            diagnostic: "yt-dlp reported no output file".to_string(),
        })?;
        let path = if path.is_absolute() {
            path
        } else {
            dest_dir.join(path)
        };
        if !path.is_file() {
            return Err(FetchError::Missing {
                item: item.url.clone(),
                path,
            });
        }
        tracing::debug!(url = %item.url, file = %path.display(), "fetched");
        Ok(path)
    }
}
