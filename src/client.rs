//! Client for managing persistent SSH sessions through the sessh CLI.
//!
//! Each method runs the sessh binary once and blocks until it exits. All
//! session state lives on the sessh side; the client only remembers how to
//! address the session.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SesshError};
use crate::invocation::{Invocation, Operation, Target, DEFAULT_LOG_LINES};
use crate::response::Response;
use crate::runner::{CapturedOutput, Runner, SystemRunner};

/// Binary name looked up on `PATH` when no explicit path is configured.
pub const DEFAULT_BIN: &str = "sessh";

/// Client for one persistent session.
#[derive(Debug, Clone)]
pub struct SesshClient<R = SystemRunner> {
    target: Target,
    bin: PathBuf,
    runner: R,
}

impl SesshClient<SystemRunner> {
    /// Create a client for session `alias` on `host` (user@host).
    pub fn new(alias: impl Into<String>, host: impl Into<String>) -> Self {
        Self::from_target(Target::new(alias, host))
    }

    pub fn from_target(target: Target) -> Self {
        Self {
            target,
            bin: PathBuf::from(DEFAULT_BIN),
            runner: SystemRunner,
        }
    }
}

impl<R: Runner> SesshClient<R> {
    /// SSH port, passed positionally after the host.
    pub fn with_port(mut self, port: u16) -> Self {
        self.target.port = Some(port);
        self
    }

    /// SSH private key used for the connection.
    pub fn with_identity(mut self, identity: impl Into<PathBuf>) -> Self {
        self.target.identity = Some(identity.into());
        self
    }

    /// ProxyJump host, e.g. `bastionuser@bastion`.
    pub fn with_proxyjump(mut self, proxyjump: impl Into<String>) -> Self {
        self.target.proxyjump = Some(proxyjump.into());
        self
    }

    /// Path to the sessh binary.
    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = bin.into();
        self
    }

    /// Swap the process runner.
    pub fn with_runner<S: Runner>(self, runner: S) -> SesshClient<S> {
        SesshClient {
            target: self.target,
            bin: self.bin,
            runner,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Open or ensure a persistent remote tmux session.
    pub fn open(&self) -> Result<Response> {
        self.invoke(Operation::Open)
    }

    /// Send a command into the persistent tmux session.
    ///
    /// The command string is handed to sessh as a single argument; it is not
    /// split or quoted here.
    pub fn run(&self, command: &str) -> Result<Response> {
        self.invoke(Operation::Run(command.to_string()))
    }

    /// Capture recent output from the tmux session.
    ///
    /// `None` requests the default of 300 lines. The captured text is in
    /// [`Response::output`].
    pub fn logs(&self, lines: Option<u32>) -> Result<Response> {
        let lines = lines.unwrap_or(DEFAULT_LOG_LINES);
        self.invoke(Operation::Logs(lines))
    }

    /// Check whether the SSH controlmaster and tmux session exist.
    ///
    /// See [`Response::session_status`] for a typed view.
    pub fn status(&self) -> Result<Response> {
        self.invoke(Operation::Status)
    }

    /// Kill the tmux session and close the controlmaster.
    pub fn close(&self) -> Result<Response> {
        self.invoke(Operation::Close)
    }

    /// Attach to the tmux session interactively.
    ///
    /// Blocks and hands the terminal to sessh until it exits. Output is not
    /// captured or parsed.
    pub fn attach(&self) -> Result<()> {
        let op = Operation::Attach;
        let invocation = self.invocation(&op);
        debug!(
            op = op.name(),
            alias = %self.target.alias,
            host = %self.target.host,
            "attaching to sessh session"
        );

        let code = self
            .runner
            .interactive(&invocation)
            .map_err(|source| self.spawn_error(source))?;

        match code {
            Some(0) => Ok(()),
            code => {
                let message = exit_description(code);
                debug!(op = op.name(), alias = %self.target.alias, %message, "sessh attach failed");
                Err(SesshError::Failed {
                    op: op.name(),
                    message,
                })
            }
        }
    }

    /// The invocation an operation would run, without running it.
    pub fn invocation(&self, op: &Operation) -> Invocation {
        Invocation::build(&self.bin, &self.target, op)
    }

    fn invoke(&self, op: Operation) -> Result<Response> {
        let invocation = self.invocation(&op);
        debug!(
            op = op.name(),
            alias = %self.target.alias,
            host = %self.target.host,
            command = %invocation.command_line(),
            "running sessh"
        );

        let output = self
            .runner
            .capture(&invocation)
            .map_err(|source| self.spawn_error(source))?;

        if !output.success() {
            let message = failure_message(&output);
            debug!(
                op = op.name(),
                alias = %self.target.alias,
                code = ?output.code,
                %message,
                "sessh failed"
            );
            return Err(SesshError::Failed {
                op: op.name(),
                message,
            });
        }

        let response = Response::parse(&output.stdout)?;
        debug!(op = op.name(), ok = ?response.ok(), "sessh finished");
        Ok(response)
    }

    fn spawn_error(&self, source: std::io::Error) -> SesshError {
        SesshError::Spawn {
            program: self.bin.display().to_string(),
            source,
        }
    }
}

/// Pick the most useful text out of a failed call.
///
/// sessh reports most failures as `{"ok":false,"error":...}` on stdout, so
/// that wins over stderr.
fn failure_message(output: &CapturedOutput) -> String {
    if let Ok(response) = Response::parse(&output.stdout) {
        if let Some(error) = response.error() {
            return error.to_string();
        }
    }

    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    exit_description(output.code)
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
