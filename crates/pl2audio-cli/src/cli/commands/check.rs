//! `pl2audio check` – verify the external tools.

use anyhow::{bail, Result};
use pl2audio_core::config::Pl2AudioConfig;
use pl2audio_core::tools::check_tool;

pub fn run_check(cfg: &Pl2AudioConfig) -> Result<()> {
    let tools = [
        check_tool("yt-dlp", cfg.tools.yt_dlp.as_deref(), "--version"),
        check_tool("ffmpeg", cfg.tools.ffmpeg.as_deref(), "-version"),
    ];
    println!("{:<8} {:<8} {:<40} {}", "TOOL", "STATUS", "PATH", "VERSION");
    for t in &tools {
        println!(
            "{:<8} {:<8} {:<40} {}",
            t.name,
            if t.available { "ok" } else { "missing" },
            t.path.display(),
            t.version.as_deref().unwrap_or("-")
        );
    }
    let missing: Vec<&str> = tools
        .iter()
        .filter(|t| !t.available)
        .map(|t| t.name.as_str())
        .collect();
    if !missing.is_empty() {
        bail!("not available: {}", missing.join(", "));
    }
    Ok(())
}
