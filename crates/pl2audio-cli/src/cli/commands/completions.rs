//! Shell completions and man page generation.

use anyhow::Result;
use clap_complete::Shell;
use std::io;

pub fn run_completions(shell: Shell, cmd: &mut clap::Command) -> Result<()> {
    clap_complete::generate(shell, cmd, "pl2audio", &mut io::stdout());
    Ok(())
}

pub fn run_man(cmd: clap::Command) -> Result<()> {
    clap_mangen::Man::new(cmd).render(&mut io::stdout())?;
    Ok(())
}
