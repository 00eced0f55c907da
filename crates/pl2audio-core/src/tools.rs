//! External tool lookup and child-process execution.
//!
//! yt-dlp and ffmpeg both run through [`run_tool`], which drains stdout and
//! stderr on helper threads and optionally kills the child after a deadline.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Last non-empty stderr lines, joined, for error messages.
    pub fn diagnostic(&self) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let tail = &lines[lines.len().saturating_sub(3)..];
        if tail.is_empty() {
            format!("exited with {}", self.status)
        } else {
            tail.join(" | ")
        }
    }
}

/// Failure to run a tool at all (as opposed to the tool reporting an error).
#[derive(Debug)]
pub enum RunError {
    /// The program could not be started.
    Spawn { program: PathBuf, source: io::Error },
    /// The deadline passed; the child was killed.
    Timeout { program: PathBuf, after: Duration },
    /// Waiting on the child failed.
    Wait { program: PathBuf, source: io::Error },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Spawn { program, source } => {
                write!(f, "could not start {}: {}", program.display(), source)
            }
            RunError::Timeout { program, after } => {
                write!(f, "{} timed out after {:.1}s", program.display(), after.as_secs_f64())
            }
            RunError::Wait { program, source } => {
                write!(f, "waiting for {}: {}", program.display(), source)
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Spawn { source, .. } | RunError::Wait { source, .. } => Some(source),
            RunError::Timeout { .. } => None,
        }
    }
}

/// Resolve a program: explicit path from config wins, then PATH lookup,
/// then the bare name (so the spawn error names what was missing).
pub fn locate(name: &str, configured: Option<&Path>) -> PathBuf {
    if let Some(p) = configured {
        return p.to_path_buf();
    }
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut p) = pipe {
            let _ = p.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait_until(
    child: &mut Child,
    program: &Path,
    started: Instant,
    timeout: Option<Duration>,
) -> Result<ExitStatus, RunError> {
    let Some(timeout) = timeout else {
        return child.wait().map_err(|source| RunError::Wait {
            program: program.to_path_buf(),
            source,
        });
    };
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunError::Timeout {
                        program: program.to_path_buf(),
                        after: timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                return Err(RunError::Wait {
                    program: program.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// Runs `program args...` to completion, capturing output.
///
/// A non-zero exit is not an error here; callers inspect `status` and turn
/// the diagnostic into their own error type.
pub fn run_tool<I, S>(program: &Path, args: I, timeout: Option<Duration>) -> Result<ToolOutput, RunError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let started = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    // On timeout the drain threads are left behind: a grandchild may still
    // hold the pipes open.
    let status = wait_until(&mut child, program, started, timeout)?;
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    tracing::trace!(
        program = %program.display(),
        %status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tool finished"
    );

    Ok(ToolOutput {
        status,
        stdout,
        stderr,
    })
}

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of the version output.
    pub version: Option<String>,
    pub path: PathBuf,
}

/// Check whether a tool runs and capture its version line.
pub fn check_tool(name: &str, configured: Option<&Path>, version_arg: &str) -> ToolInfo {
    let path = locate(name, configured);
    let result = run_tool(&path, [version_arg], Some(Duration::from_secs(15)));
    match result {
        Ok(out) if out.status.success() => ToolInfo {
            name: name.to_string(),
            available: true,
            version: out.stdout.lines().next().map(|s| s.trim().to_string()),
            path,
        },
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path,
        },
    }
}
