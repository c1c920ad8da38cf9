use crate::models::ProcessOutput;
use camino::Utf8Path;
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Errors the runner itself signals.
///
/// `Spawn` means the child never started (executable missing, permission
/// denied) and is deliberately a different shape from a child that ran and
/// exited non-zero, which is reported as a plain [`ProcessOutput`].
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Spawns external tools, one fresh child per call.
///
/// The runner reports faithfully and never interprets exit status: callers
/// decide what a non-zero status means. No timeout is imposed; a hung child
/// is the caller's accepted risk.
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run one child process to completion.
    ///
    /// When `input` is given it is written to the child's standard input and
    /// the pipe is closed to signal EOF; otherwise the child gets a null
    /// stdin and is expected to work from paths in `args`. Standard output
    /// and standard error are accumulated byte-exact in arrival order and
    /// returned once the child has exited and both streams have closed.
    ///
    /// # Arguments
    /// * `command` - Executable to invoke
    /// * `args` - Argument list, passed through without shell interpretation
    /// * `input` - Optional bytes for the child's standard input
    ///
    /// # Errors
    /// [`ProcessError::Spawn`] when the child cannot be started at all.
    pub async fn run(
        &self,
        command: &Utf8Path,
        args: &[String],
        input: Option<&[u8]>,
    ) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("Executing: {} {}", command, args.join(" "));
        let start = Instant::now();

        let mut cmd = Command::new(command.as_str());
        cmd.args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            command: command.to_string(),
            source,
        })?;

        // Feed stdin concurrently with output collection; writing first and
        // reading later can deadlock once the input outgrows the pipe buffer.
        let writer = input.and_then(|bytes| {
            let stdin = child.stdin.take()?;
            let bytes = bytes.to_vec();
            Some(tokio::spawn(async move {
                let mut stdin = stdin;
                let result = stdin.write_all(&bytes).await;
                drop(stdin); // close pipe to signal EOF
                result
            }))
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ProcessError::Wait {
                command: command.to_string(),
                source,
            })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // A child may legitimately exit before draining its input
                Ok(Err(e)) => tracing::debug!("stdin write to {} ended early: {}", command, e),
                Err(e) => tracing::warn!("stdin writer task for {} failed: {}", command, e),
            }
        }

        let exit_status = output.status.code().unwrap_or(-1);
        tracing::debug!(
            "{} exited with status {} in {:.2}s",
            command,
            exit_status,
            start.elapsed().as_secs_f32()
        );

        Ok(ProcessOutput {
            exit_status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}
