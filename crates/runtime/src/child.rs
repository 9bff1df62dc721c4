//! Target process management.
//!
//! Responsibilities:
//! - Spawn the target command from its resolved argv and bridge its stdio
//!   line by line.
//!
//! Invariants:
//! - The argv is used literally: no shell is involved, so relay peers can
//!   never smuggle shell metacharacters into an execution.
//! - The child is killed when the service is dropped.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{Result, RuntimeError};

/// A spawned target command with line-oriented stdio.
pub struct ChildService {
    program: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl ChildService {
    /// Spawns `program` with `args`, piping stdin and stdout. Stderr is
    /// inherited so the target's own diagnostics stay visible.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RuntimeError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(RuntimeError::ChildStdio)?;
        let stdout = child.stdout.take().ok_or(RuntimeError::ChildStdio)?;

        Ok(Self {
            program: program.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Writes one line to the child's stdin.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Next line from the child's stdout; `None` once it closes.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.stdout.next_line().await?)
    }

    /// Reaps the child after its stdout closed, mapping a failure status
    /// to an error.
    pub async fn finish(mut self) -> Result<()> {
        let status = self.child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(RuntimeError::ChildFailed {
                program: self.program,
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[cfg(unix)]
    async fn test_spawn_bridges_lines_both_ways() {
        let mut child = ChildService::spawn("cat", &[]).unwrap();

        child.send_line("hello mesh").await.unwrap();
        let echoed = child.next_line().await.unwrap();
        assert_eq!(echoed.as_deref(), Some("hello mesh"));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_finish_reports_failure_status() {
        let mut child = ChildService::spawn("false", &[]).unwrap();
        assert_eq!(child.next_line().await.unwrap(), None);
        assert!(matches!(
            child.finish().await,
            Err(RuntimeError::ChildFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_spawn_of_missing_program_fails_cleanly() {
        let result = ChildService::spawn("definitely-not-a-real-binary-xyz", &[]);
        assert!(matches!(result, Err(RuntimeError::Spawn { .. })));
    }
}
