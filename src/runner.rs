//! Process execution for sessh invocations.
//!
//! The client only ever needs two shapes of call: one that captures output
//! and one that hands the terminal over to the child. Both sit behind
//! [`Runner`] so the client can be driven without spawning processes.

use std::io;
use std::process::Command;

use crate::invocation::Invocation;

/// Output of a finished, captured process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, or `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations. Each method runs exactly one process and blocks
/// until it exits.
pub trait Runner {
    /// Run with stdout and stderr captured.
    fn capture(&self, invocation: &Invocation) -> io::Result<CapturedOutput>;

    /// Run with the caller's stdin, stdout and stderr. Returns the exit code.
    fn interactive(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

impl<R: Runner + ?Sized> Runner for &R {
    fn capture(&self, invocation: &Invocation) -> io::Result<CapturedOutput> {
        (**self).capture(invocation)
    }

    fn interactive(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        (**self).interactive(invocation)
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        for key in &invocation.env_remove {
            cmd.env_remove(key);
        }
        cmd.envs(invocation.env.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

impl Runner for SystemRunner {
    fn capture(&self, invocation: &Invocation) -> io::Result<CapturedOutput> {
        let output = Self::command(invocation).output()?;
        Ok(CapturedOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn interactive(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let status = Self::command(invocation).status()?;
        Ok(status.code())
    }
}
