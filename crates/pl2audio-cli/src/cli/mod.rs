//! CLI for pl2audio.

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pl2audio_core::config::{self, AudioFormat, CleanupPolicy, Pl2AudioConfig};
use std::path::PathBuf;

use commands::{run_check, run_completions, run_config, run_download, run_info, run_man};

/// Top-level CLI for pl2audio.
#[derive(Debug, Parser)]
#[command(name = "pl2audio", version)]
#[command(about = "pl2audio: download a playlist and keep only the audio", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every available playlist item and convert it to an audio file.
    Download {
        /// Playlist URL (with a list= parameter) or bare playlist id.
        playlist: String,
        /// Existing folder that receives the audio files.
        output: PathBuf,
        /// Number of worker lanes (overrides config).
        #[arg(long, value_name = "N")]
        lanes: Option<usize>,
        /// Audio format: mp3, m4a, opus, flac or wav (overrides config).
        #[arg(long, value_name = "FORMAT")]
        format: Option<AudioFormat>,
        /// Video handling after a failed extraction: delete, keep or quarantine (overrides config).
        #[arg(long, value_name = "POLICY")]
        on_failure: Option<CleanupPolicy>,
        /// Exit with an error if any item failed.
        #[arg(long)]
        strict: bool,
    },

    /// Show playlist metadata and the items that would be downloaded.
    Info {
        /// Playlist URL (with a list= parameter) or bare playlist id.
        playlist: String,
    },

    /// Check that yt-dlp and ffmpeg can be run.
    Check,

    /// Show the config file location and effective settings.
    Config,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page.
    Man,
}

/// Applies command-line overrides on top of the loaded config.
fn apply_overrides(
    mut cfg: Pl2AudioConfig,
    lanes: Option<usize>,
    format: Option<AudioFormat>,
    on_failure: Option<CleanupPolicy>,
) -> Pl2AudioConfig {
    if let Some(lanes) = lanes {
        cfg.lanes = lanes;
    }
    if let Some(format) = format {
        cfg.audio_format = format;
    }
    if let Some(policy) = on_failure {
        cfg.cleanup_on_failure = policy;
    }
    cfg
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                playlist,
                output,
                lanes,
                format,
                on_failure,
                strict,
            } => {
                let cfg = apply_overrides(config::load_or_init()?, lanes, format, on_failure);
                tracing::debug!("effective config: {:?}", cfg);
                run_download(&cfg, &playlist, &output, strict)?;
            }
            CliCommand::Info { playlist } => run_info(&config::load_or_init()?, &playlist)?,
            CliCommand::Check => run_check(&config::load_or_init()?)?,
            CliCommand::Config => run_config(&config::load_or_init()?)?,
            CliCommand::Completions { shell } => run_completions(shell, &mut Cli::command())?,
            CliCommand::Man => run_man(Cli::command())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
