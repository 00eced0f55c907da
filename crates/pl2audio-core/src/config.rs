use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Number of worker lanes used when the config does not say otherwise.
pub const DEFAULT_LANES: usize = 4;

/// Audio container/codec written by the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Opus,
    Flac,
    Wav,
}

impl AudioFormat {
    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// ffmpeg encoder arguments for this format.
    pub fn codec_args(&self) -> &'static [&'static str] {
        match self {
            AudioFormat::Mp3 => &["-c:a", "libmp3lame", "-q:a", "2"],
            AudioFormat::M4a => &["-c:a", "aac", "-b:a", "192k"],
            AudioFormat::Opus => &["-c:a", "libopus", "-b:a", "128k"],
            AudioFormat::Flac => &["-c:a", "flac"],
            AudioFormat::Wav => &["-c:a", "pcm_s16le"],
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "m4a" | "aac" => Ok(AudioFormat::M4a),
            "opus" => Ok(AudioFormat::Opus),
            "flac" => Ok(AudioFormat::Flac),
            "wav" => Ok(AudioFormat::Wav),
            other => Err(format!(
                "unknown audio format {other:?} (expected mp3, m4a, opus, flac or wav)"
            )),
        }
    }
}

/// What a lane does with the downloaded video when audio extraction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Remove the video along with the staging directory.
    #[default]
    Delete,
    /// Move the video into the output folder, next to the audio files.
    Keep,
    /// Move the video into `<output>/failed/`.
    Quarantine,
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CleanupPolicy::Delete => "delete",
            CleanupPolicy::Keep => "keep",
            CleanupPolicy::Quarantine => "quarantine",
        })
    }
}

impl FromStr for CleanupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "delete" => Ok(CleanupPolicy::Delete),
            "keep" => Ok(CleanupPolicy::Keep),
            "quarantine" => Ok(CleanupPolicy::Quarantine),
            other => Err(format!(
                "unknown cleanup policy {other:?} (expected delete, keep or quarantine)"
            )),
        }
    }
}

/// Paths to the external programs. `None` means "look it up on PATH".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub yt_dlp: Option<PathBuf>,
    #[serde(default)]
    pub ffmpeg: Option<PathBuf>,
}

/// Global configuration loaded from `~/.config/pl2audio/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pl2AudioConfig {
    /// Number of worker lanes (concurrent items).
    pub lanes: usize,
    /// Audio format written for each item.
    pub audio_format: AudioFormat,
    /// Fate of the video when audio extraction fails.
    pub cleanup_on_failure: CleanupPolicy,
    /// Optional bound on the playlist listing, in seconds.
    pub resolve_timeout_secs: Option<u64>,
    /// Optional bound on a single item download, in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Optional bound on a single audio extraction, in seconds.
    pub transcode_timeout_secs: Option<u64>,
    /// External program locations.
    pub tools: ToolsConfig,
}

impl Default for Pl2AudioConfig {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES,
            audio_format: AudioFormat::default(),
            cleanup_on_failure: CleanupPolicy::default(),
            resolve_timeout_secs: None,
            fetch_timeout_secs: None,
            transcode_timeout_secs: None,
            tools: ToolsConfig::default(),
        }
    }
}

impl Pl2AudioConfig {
    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout_secs.map(Duration::from_secs)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    pub fn transcode_timeout(&self) -> Option<Duration> {
        self.transcode_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pl2audio")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Serialize a config the way it is written to disk.
pub fn to_toml_string(cfg: &Pl2AudioConfig) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<Pl2AudioConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = Pl2AudioConfig::default();
        let toml = to_toml_string(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Pl2AudioConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
