use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::ExecError;

/// Everything a finished (or failed) command produced.
///
/// Output is captured even when the command exits unsuccessfully, so callers
/// can still report what it wrote to stderr.
#[derive(Debug, Default)]
pub struct ExecOutcome {
    pub stdout: String,
    pub stderr: String,
    /// `Some` when the command could not be started or exited non-zero.
    pub error: Option<ExecError>,
}

impl ExecOutcome {
    fn failed(error: ExecError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs `path` with an argument vector and captures both output streams.
///
/// Arguments are passed directly to the executable; no shell is involved.
/// When `stdin` is given it is written to the child's standard input,
/// otherwise the child reads from the null device. `search_path`, when set,
/// becomes the child's `PATH`.
///
/// The call blocks until the child exits. There is no timeout.
pub fn run_captured(
    path: &Path,
    args: &[String],
    stdin: Option<&str>,
    search_path: Option<&OsStr>,
) -> ExecOutcome {
    let input = if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    };
    let mut cmd = Command::new(path);
    cmd.args(args)
        .stdin(input)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(search_path) = search_path {
        cmd.env("PATH", search_path);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(source) => {
            return ExecOutcome::failed(ExecError::Spawn {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    // Feed stdin from a separate thread so a child that fills its output
    // pipes before draining stdin cannot deadlock us.
    let writer = match (child.stdin.take(), stdin) {
        (Some(mut pipe), Some(text)) => {
            let text = text.to_owned();
            Some(thread::spawn(move || pipe.write_all(text.as_bytes())))
        }
        _ => None,
    };

    let output = child.wait_with_output();

    if let Some(writer) = writer {
        match writer.join() {
            Ok(Err(err)) if err.kind() != io::ErrorKind::BrokenPipe => {
                log::warn!("writing stdin to {} failed: {}", path.display(), err);
            }
            Err(_) => log::warn!("stdin writer for {} panicked", path.display()),
            _ => {}
        }
    }

    let output = match output {
        Ok(output) => output,
        Err(source) => {
            return ExecOutcome::failed(ExecError::Spawn {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let error = (!output.status.success()).then(|| ExecError::CommandFailed {
        path: path.to_path_buf(),
        status: output.status,
    });

    ExecOutcome {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        error,
    }
}
