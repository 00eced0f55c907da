//! `pl2audio info` – resolve a playlist without downloading anything.

use anyhow::Result;
use pl2audio_core::config::Pl2AudioConfig;
use pl2audio_core::fetch::YtDlp;
use pl2audio_core::report::{BatchEvent, PlaylistSummary};
use pl2audio_core::resolver::PlaylistSource;

pub fn run_info(cfg: &Pl2AudioConfig, playlist: &str) -> Result<()> {
    let handle = YtDlp::from_config(cfg).resolve(playlist)?;
    println!("{}", BatchEvent::Resolved(PlaylistSummary::from(&handle)));
    println!("Available     : {}", handle.items.len());
    for (i, item) in handle.items.iter().enumerate() {
        match &item.title {
            Some(title) => println!("{:>4}. {}  {}", i + 1, item.url, title),
            None => println!("{:>4}. {}", i + 1, item.url),
        }
    }
    Ok(())
}
