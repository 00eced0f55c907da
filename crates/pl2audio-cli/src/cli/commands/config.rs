//! `pl2audio config` – where the config lives and what it says.

use anyhow::Result;
use pl2audio_core::config::{self, Pl2AudioConfig};

pub fn run_config(cfg: &Pl2AudioConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", config::to_toml_string(cfg)?);
    Ok(())
}
