//! CLI command handlers, one file per command.

mod check;
mod completions;
mod config;
mod download;
mod info;

pub use check::run_check;
pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use download::run_download;
pub use info::run_info;
