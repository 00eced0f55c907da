//! Per-item staging directory inside the output folder.
//!
//! Each item downloads and converts inside its own hidden directory so two
//! lanes never touch each other's temporary files. Only the finished audio
//! file is moved into the output folder. Dropping the stage removes whatever
//! is left.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const STAGING_PREFIX: &str = ".pl2audio-";

/// Sub-directory of the output folder that receives quarantined videos.
pub const QUARANTINE_DIR: &str = "failed";

pub(crate) struct Staging {
    dir: TempDir,
}

impl Staging {
    pub(crate) fn create(output_dir: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(output_dir)?;
        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Moves `file` into `dest_dir` under the same name, replacing any
    /// existing file (last writer wins).
    pub(crate) fn promote(&self, file: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        let name = file
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "file has no name"))?;
        let dest = dest_dir.join(name);
        fs::rename(file, &dest)?;
        Ok(dest)
    }
}
