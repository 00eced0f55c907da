//! Audio extraction through ffmpeg.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{AudioFormat, Pl2AudioConfig};
use crate::error::TranscodeError;
use crate::tools::{locate, run_tool};

/// ffmpeg stderr fragments that mean "the input has no audio stream".
const NO_AUDIO_MARKERS: &[&str] = &["matches no streams", "does not contain any stream"];

/// Writes the audio track of a video as a standalone file.
///
/// Implementations must not delete `video`; the caller owns its cleanup.
/// Existing output files are overwritten.
pub trait Transcoder: Send + Sync {
    fn extract_audio(&self, video: &Path, output_dir: &Path) -> Result<PathBuf, TranscodeError>;
}

/// `<output_dir>/<video stem>.<ext>`.
pub fn audio_path_for(video: &Path, output_dir: &Path, format: AudioFormat) -> Option<PathBuf> {
    let stem = video.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(format.extension());
    Some(output_dir.join(name))
}

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
    format: AudioFormat,
    timeout: Option<Duration>,
}

impl Ffmpeg {
    pub fn new(program: PathBuf, format: AudioFormat) -> Self {
        Self {
            program,
            format,
            timeout: None,
        }
    }

    pub fn from_config(cfg: &Pl2AudioConfig) -> Self {
        Self::new(locate("ffmpeg", cfg.tools.ffmpeg.as_deref()), cfg.audio_format)
            .with_timeout(cfg.transcode_timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

impl Transcoder for Ffmpeg {
    fn extract_audio(&self, video: &Path, output_dir: &Path) -> Result<PathBuf, TranscodeError> {
        if !video.is_file() {
            return Err(TranscodeError::Io {
                video: video.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "input file not found"),
            });
        }
        let audio = audio_path_for(video, output_dir, self.format).ok_or_else(|| TranscodeError::Io {
            video: video.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "input has no file name"),
        })?;

        let mut args: Vec<&OsStr> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsStr::new)
            .collect();
        args.push(video.as_os_str());
        args.extend(["-map", "0:a:0", "-vn"].into_iter().map(OsStr::new));
        args.extend(self.format.codec_args().iter().copied().map(OsStr::new));
        args.push(audio.as_os_str());

        tracing::debug!(video = %video.display(), audio = %audio.display(), "extracting audio");
        let out = run_tool(&self.program, &args, self.timeout)
            .map_err(|e| TranscodeError::from_run(video, e))?;

        if !out.status.success() {
            let diagnostic = out.diagnostic();
            if NO_AUDIO_MARKERS.iter().any(|m| out.stderr.contains(m)) {
                return Err(TranscodeError::NoAudioTrack {
                    video: video.to_path_buf(),
                });
            }
            return Err(TranscodeError::Upstream {
                video: video.to_path_buf(),
                diagnostic,
            });
        }
        if !audio.is_file() {
            return Err(TranscodeError::Io {
                video: video.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "ffmpeg wrote no output file"),
            });
        }
        Ok(audio)
    }
}
