//! External command execution for `exec`.
//!
//! Each run owns the task that drains the child's stdout. Output lines are forwarded
//! to the console while the child's exit is awaited, and the drain task is joined
//! before the run returns, so trailing output is never lost or interleaved with a
//! later command.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::BufReader;
use tokio::process::{ChildStdout, Command};
use tokio::sync::mpsc;

use crate::console::{read_lossy_line, Console, Message};

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, streaming its stdout lines to `console`, and return its exit code.
    async fn run(&self, command: &str, console: &mut dyn Console) -> Result<i32>;
}

/// Runs commands through the platform shell, or a configured one.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    program: Option<String>,
    flag: Option<String>,
}

impl ShellRunner {
    /// `flag` is the argument that hands the command line to `program`. Without one,
    /// a configured program gets `-c`.
    pub fn new(program: Option<String>, flag: Option<String>) -> Self {
        Self { program, flag }
    }

    fn command(&self, command: &str) -> Command {
        let (program, default_flag) = match self.program.as_deref() {
            Some(program) => (program, "-c"),
            None if cfg!(windows) => ("cmd", "/C"),
            None => ("sh", "-c"),
        };
        let flag = self.flag.as_deref().unwrap_or(default_flag);

        let mut cmd = Command::new(program);
        cmd.arg(flag).arg(command);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, console: &mut dyn Console) -> Result<i32> {
        let mut child = self
            .command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start [ {} ]", command))?;
        log::info!("Spawned [ {} ] (pid {:?})", command, child.id());

        let stdout = child
            .stdout
            .take()
            .context("Child process has no stdout")?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let drain = tokio::spawn(drain_lines(stdout, tx));

        let forward = async {
            while let Some(line) = rx.recv().await {
                console.emit(Message::output(line));
            }
        };
        let ((), status) = tokio::join!(forward, child.wait());
        let status = status.with_context(|| format!("Failed to wait for [ {} ]", command))?;

        drain
            .await
            .context("Output drain task panicked")?
            .context("Failed to read command output")?;

        // Killed by a signal on Unix
        let code = status.code().unwrap_or(-1);
        log::info!("[ {} ] exited with code {}", command, code);
        Ok(code)
    }
}

async fn drain_lines(
    stdout: ChildStdout,
    tx: mpsc::UnboundedSender<String>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    while let Some(line) = read_lossy_line(&mut reader, &mut buf).await? {
        if tx.send(line).is_err() {
            break;
        }
    }
    Ok(())
}
