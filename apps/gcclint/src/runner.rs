//! Compiler process execution.
//!
//! The runner owns process spawning; the rest of the crate only sees the
//! captured text. A non-zero exit status is the normal outcome of a file with
//! errors and is not treated as a failure.

use crate::command::CommandSpec;
use crate::error::RunError;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Runs a compiler invocation with `source` on stdin and returns its output.
pub trait ProcessRunner: Sync {
    fn run(&self, cmd: &CommandSpec, source: &str) -> Result<String, RunError>;
}

/// Spawns the real compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec, source: &str) -> Result<String, RunError> {
        let mut child = Command::new(&cmd.executable)
            .args(cmd.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                executable: cmd.executable.clone(),
                source,
            })?;

        // stdin is written off-thread while stderr is drained
        let stdin = child.stdin.take();
        let input = source.to_owned();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output().map_err(|source| RunError::Io {
            executable: cmd.executable.clone(),
            source,
        })?;
        match writer.join() {
            Ok(Ok(())) => {}
            // compiler stopped reading after a fatal error
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(source)) => {
                return Err(RunError::Io {
                    executable: cmd.executable.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(RunError::Io {
                    executable: cmd.executable.clone(),
                    source: std::io::Error::other("stdin writer thread panicked"),
                })
            }
        }
        debug!(status = ?output.status.code(), "compiler exited");

        let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok(text)
    }
}
