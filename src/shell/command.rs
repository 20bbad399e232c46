//! External process execution.
//!
//! Programs are spawned directly (no intermediate shell) with captured
//! stdout and stderr and an optional payload written to stdin.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Result of executing a process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the process succeeded (exit code 0).
    pub success: bool,
}

/// Options for process execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the inherited environment).
    pub env: HashMap<String, String>,

    /// Bytes written to the process's stdin. Stdin is closed when `None`.
    pub stdin: Option<Vec<u8>>,
}

/// Render a program and its arguments for messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program` with `args` and wait for it to exit.
pub fn execute(
    program: &str,
    args: &[String],
    options: &CommandOptions,
) -> std::io::Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(if options.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("spawning {}", display_command(program, args));
    let mut child = cmd.spawn()?;

    // Feed stdin and drain both pipes on their own threads so a process
    // that fills one pipe never blocks on the other.
    let stdin_handle = match (child.stdin.take(), options.stdin.clone()) {
        (Some(mut pipe), Some(payload)) => Some(thread::spawn(move || {
            // The child may exit without reading its input.
            let _ = pipe.write_all(&payload);
        })),
        _ => None,
    };

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_handle = thread::spawn(move || read_pipe(stdout_pipe));
    let stderr_handle = thread::spawn(move || read_pipe(stderr_pipe));

    let status = child.wait()?;

    if let Some(handle) = stdin_handle {
        let _ = handle.join();
    }
    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    Ok(CommandResult {
        exit_code: status.code(),
        stdout,
        stderr,
        duration: start.elapsed(),
        success: status.success(),
    })
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut reader) = pipe {
        let _ = reader.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
