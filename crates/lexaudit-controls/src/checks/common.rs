//! Common utilities for host checks

use lexaudit_core::Status;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Failure modes of an external diagnostic tool
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The tool is not installed
    #[error("'{0}' is not installed")]
    ToolUnavailable(String),

    /// The tool exceeded its time bound and was killed
    #[error("'{tool}' timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    /// The tool ran but reported failure
    #[error("'{tool}' exited with status {code:?}: {stderr}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The tool's output could not be interpreted
    #[error("unexpected output from '{tool}': {output:?}")]
    UnexpectedOutput { tool: String, output: String },

    /// Spawning or waiting on the tool failed
    #[error("could not run '{tool}': {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Status a resource takes when its probe failed this way.
    ///
    /// A missing or misbehaving tool leaves the resource unverified but not
    /// broken; timeouts and OS-level failures mean the inspection itself failed.
    pub fn status(&self) -> Status {
        match self {
            ProbeError::ToolUnavailable(_)
            | ProbeError::Failed { .. }
            | ProbeError::UnexpectedOutput { .. } => Status::Warning,
            ProbeError::Timeout { .. } | ProbeError::Io { .. } => Status::Error,
        }
    }
}

/// Run a command with a hard time bound and return trimmed stdout.
pub fn run_command(cmd: &str, args: &[&str], timeout: Duration) -> Result<String, ProbeError> {
    let mut child = match Command::new(cmd)
        .args(args)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ProbeError::ToolUnavailable(cmd.to_string()));
        }
        Err(source) => {
            return Err(ProbeError::Io {
                tool: cmd.to_string(),
                source,
            });
        }
    };

    // Drain pipes off-thread so a chatty tool cannot block on a full pipe.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ProbeError::Timeout {
                        tool: cmd.to_string(),
                        after: timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(ProbeError::Io {
                    tool: cmd.to_string(),
                    source,
                });
            }
        }
    };

    let stdout = collect(stdout);
    if status.success() {
        Ok(stdout.trim().to_string())
    } else {
        Err(ProbeError::Failed {
            tool: cmd.to_string(),
            code: status.code(),
            stderr: collect(stderr).trim().to_string(),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Check if a file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Permission bits (`mode & 0o777`) of a file
#[cfg(unix)]
pub fn permission_bits(path: &Path) -> io::Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map(|m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub fn permission_bits(_path: &Path) -> io::Result<u32> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Unix permission bits are not available on this platform",
    ))
}

/// Default directory for relative `Include` paths in sshd configuration
pub const SSH_CONFIG_DIR: &str = "/etc/ssh";

const MAX_INCLUDE_DEPTH: usize = 16;

/// Parse sshd configuration into lowercase keyword → value.
///
/// sshd uses the first value it reads for a keyword. `Include` files are read
/// in place, in lexical order, with relative patterns resolved against
/// `include_dir`. Everything after a `Match` line is conditional, so parsing
/// of that file stops there; a `Match` inside an included file only ends that
/// file.
pub fn parse_ssh_config(content: &str, include_dir: &Path) -> io::Result<HashMap<String, String>> {
    let mut config = HashMap::new();
    collect_ssh_directives(content, include_dir, 0, &mut config)?;
    Ok(config)
}

fn collect_ssh_directives(
    content: &str,
    include_dir: &Path,
    depth: usize,
    config: &mut HashMap<String, String>,
) -> io::Result<()> {
    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = split_directive(line) else {
            continue;
        };
        let key = key.to_lowercase();
        match key.as_str() {
            "match" => break,
            "include" => {
                if depth >= MAX_INCLUDE_DEPTH {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Include nested deeper than {} levels", MAX_INCLUDE_DEPTH),
                    ));
                }
                for path in find_includes(value, include_dir)? {
                    debug!("Reading included sshd configuration {}", path.display());
                    let included = fs::read_to_string(&path)?;
                    collect_ssh_directives(&included, include_dir, depth + 1, config)?;
                }
            }
            _ => {
                config.entry(key).or_insert_with(|| value.to_string());
            }
        }
    }

    Ok(())
}

/// Files named by an `Include` value, pattern by pattern, each expanded in
/// lexical order. Patterns matching nothing are ignored as sshd does.
fn find_includes(value: &str, include_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in value.split_whitespace() {
        let pattern = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            include_dir.join(pattern)
        };
        let paths = glob::glob(&pattern.to_string_lossy()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid Include pattern '{}': {}", pattern.display(), e),
            )
        })?;
        for path in paths {
            files.push(path.map_err(glob::GlobError::into_error)?);
        }
    }

    Ok(files)
}

fn split_directive(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let (key, rest) = line.split_at(idx);
    let value = rest
        .trim_start()
        .strip_prefix('=')
        .unwrap_or(rest)
        .trim()
        .trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Mount point → (device, filesystem type) from a `/proc/mounts` style table.
/// Later entries shadow earlier ones for the same mount point.
pub fn find_mount<'a>(mounts: &'a str, mount_point: &str) -> Option<(&'a str, &'a str)> {
    mounts
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let device = parts.next()?;
            let target = parts.next()?;
            let fstype = parts.next()?;
            (target == mount_point).then_some((device, fstype))
        })
        .last()
}
