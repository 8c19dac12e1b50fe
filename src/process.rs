//! Subprocess execution with a deadline
//!
//! Every external program this crate runs (`git`, the search matcher) goes
//! through this module. The child's pipes are drained on reader threads while
//! the calling thread polls `try_wait`; once the deadline passes the child is
//! killed and the call fails with [`Error::Timeout`]. A timed-out command is
//! never reported as a success.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Output of a line-capped command run.
#[derive(Debug)]
pub struct LinesOutput {
    /// Exit status of the child.
    pub status: ExitStatus,
    /// Stdout lines, at most the requested cap.
    pub lines: Vec<String>,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
    /// True when the cap was reached and remaining output was discarded.
    pub truncated: bool,
}

/// Render a command as `program arg1 arg2` for logs and error messages.
pub fn describe(command: &Command) -> String {
    let mut text = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        text.push(' ');
        text.push_str(&arg.to_string_lossy());
    }
    text
}

/// Run `command` to completion, collecting stdout and stderr, or kill it once
/// `timeout` has elapsed.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<Output> {
    let description = describe(command);
    let mut child = spawn(command, &description)?;

    let stdout = child.stdout.take().map(read_all);
    let stderr = child.stderr.take().map(read_all);

    let status = wait_with_deadline(&mut child, timeout, description)?;

    Ok(Output {
        status,
        stdout: join(stdout),
        stderr: join(stderr),
    })
}

/// Run `command`, keeping at most `max_lines` lines of stdout.
///
/// Once the cap is reached the stdout pipe is closed, so a well-behaved
/// child exits early on the broken pipe instead of producing output nobody
/// will read.
pub fn run_lines_with_timeout(
    command: &mut Command,
    timeout: Duration,
    max_lines: usize,
) -> Result<LinesOutput> {
    let description = describe(command);
    let mut child = spawn(command, &description)?;

    let stdout = child.stdout.take().map(|pipe| read_lines(pipe, max_lines));
    let stderr = child.stderr.take().map(read_all);

    let status = wait_with_deadline(&mut child, timeout, description)?;

    let (lines, truncated) = match stdout {
        Some(handle) => handle.join().unwrap_or_default(),
        None => (Vec::new(), false),
    };

    Ok(LinesOutput {
        status,
        lines,
        stderr: String::from_utf8_lossy(&join(stderr)).into_owned(),
        truncated,
    })
}

fn spawn(command: &mut Command, description: &str) -> Result<Child> {
    debug!("running: {}", description);
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Spawn {
            program,
            message: e.to_string(),
        })
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
    description: String,
) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            // Reader threads are left detached: a grandchild may still hold
            // the pipes open after the direct child is gone.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                command: description,
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_all<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn read_lines<R: Read + Send + 'static>(
    pipe: R,
    max_lines: usize,
) -> JoinHandle<(Vec<String>, bool)> {
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            if lines.len() >= max_lines {
                // Anything left means the output was cut short.
                buf.clear();
                let more = matches!(reader.read_until(b'\n', &mut buf), Ok(n) if n > 0);
                return (lines, more);
            }
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => return (lines, false),
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    lines.push(line.trim_end_matches(['\n', '\r']).to_string());
                }
            }
        }
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default()
}
