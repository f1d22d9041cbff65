//! Argument and environment construction for sessh calls.
//!
//! Every call has the shape
//! `sessh <subcommand> <alias> <host> [<port>] <subcommand args...>`.
//! Connection options that have no positional slot travel as environment
//! variables.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Switches sessh to machine-readable output.
pub const JSON_ENV: &str = "SESSH_JSON";
/// Path to the SSH private key.
pub const IDENTITY_ENV: &str = "SESSH_IDENTITY";
/// ProxyJump host for the SSH connection.
pub const PROXYJUMP_ENV: &str = "SESSH_PROXYJUMP";

/// Number of log lines fetched when the caller does not ask for a count.
pub const DEFAULT_LOG_LINES: u32 = 300;

/// The session a client talks to, and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Session alias name
    pub alias: String,
    /// SSH destination (user@host)
    pub host: String,
    /// SSH port; sessh falls back to 22 when omitted
    pub port: Option<u16>,
    /// Path to the SSH private key
    pub identity: Option<PathBuf>,
    /// ProxyJump host (e.g. "bastionuser@bastion")
    pub proxyjump: Option<String>,
}

impl Target {
    pub fn new(alias: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            host: host.into(),
            port: None,
            identity: None,
            proxyjump: None,
        }
    }
}

/// A sessh subcommand with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Open or ensure the remote tmux session
    Open,
    /// Send a command into the session
    Run(String),
    /// Capture the last N lines of session output
    Logs(u32),
    /// Check whether the controlmaster and the session exist
    Status,
    /// Kill the session and close the controlmaster
    Close,
    /// Attach to the session interactively
    Attach,
}

impl Operation {
    /// Subcommand name as sessh expects it.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Run(_) => "run",
            Operation::Logs(_) => "logs",
            Operation::Status => "status",
            Operation::Close => "close",
            Operation::Attach => "attach",
        }
    }

    /// Interactive operations own the terminal and produce no JSON.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Operation::Attach)
    }

    fn trailing_args(&self) -> Vec<String> {
        match self {
            Operation::Run(command) => vec!["--".to_string(), command.clone()],
            Operation::Logs(lines) => vec![lines.to_string()],
            Operation::Open | Operation::Status | Operation::Close | Operation::Attach => {
                Vec::new()
            }
        }
    }
}

/// A fully resolved process invocation.
///
/// `env` lists the variables sessh needs on top of the inherited
/// environment. `env_remove` lists sessh variables that must not leak in
/// from the caller's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, OsString)>,
    pub env_remove: Vec<String>,
}

impl Invocation {
    /// Build the invocation of `op` against `target` using the binary at `bin`.
    pub fn build(bin: &Path, target: &Target, op: &Operation) -> Self {
        let mut args = vec![
            op.name().to_string(),
            target.alias.clone(),
            target.host.clone(),
        ];
        // Port 0 means "unset", as does an empty identity or proxyjump.
        if let Some(port) = target.port.filter(|&p| p != 0) {
            args.push(port.to_string());
        }
        args.extend(op.trailing_args());

        let identity = target
            .identity
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.as_os_str().to_os_string());
        let proxyjump = target
            .proxyjump
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(OsString::from);
        let json = (!op.is_interactive()).then(|| OsString::from("1"));

        let mut env = Vec::new();
        let mut env_remove = Vec::new();
        for (key, value) in [
            (JSON_ENV, json),
            (IDENTITY_ENV, identity),
            (PROXYJUMP_ENV, proxyjump),
        ] {
            match value {
                Some(value) => env.push((key.to_string(), value)),
                None => env_remove.push(key.to_string()),
            }
        }

        Self {
            program: bin.to_path_buf(),
            args,
            env,
            env_remove,
        }
    }

    /// Look up a variable this invocation sets.
    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Whether this invocation clears `key` from the inherited environment.
    pub fn removes_env(&self, key: &str) -> bool {
        self.env_remove.iter().any(|k| k == key)
    }

    /// Program and arguments joined for log output.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_target() -> Target {
        Target {
            alias: "agent".to_string(),
            host: "ubuntu@10.0.0.5".to_string(),
            port: Some(2222),
            identity: Some(PathBuf::from("/keys/id_ed25519")),
            proxyjump: Some("ops@bastion".to_string()),
        }
    }

    #[test]
    fn minimal_target_has_no_port_argument() {
        let target = Target::new("test", "user@example.com");
        let inv = Invocation::build(Path::new("sessh"), &target, &Operation::Open);
        assert_eq!(inv.program, PathBuf::from("sessh"));
        assert_eq!(inv.args, vec!["open", "test", "user@example.com"]);
        assert_eq!(inv.env, vec![(JSON_ENV.to_string(), OsString::from("1"))]);
        assert_eq!(inv.env_remove, vec![IDENTITY_ENV, PROXYJUMP_ENV]);
    }

    #[test]
    fn port_follows_host() {
        let inv = Invocation::build(Path::new("sessh"), &full_target(), &Operation::Status);
        assert_eq!(inv.args, vec!["status", "agent", "ubuntu@10.0.0.5", "2222"]);
    }

    #[test]
    fn run_passes_command_as_single_argument_after_separator() {
        let op = Operation::Run("cd /tmp && echo 'hi there'".to_string());
        let inv = Invocation::build(Path::new("sessh"), &full_target(), &op);
        assert_eq!(
            inv.args,
            vec![
                "run",
                "agent",
                "ubuntu@10.0.0.5",
                "2222",
                "--",
                "cd /tmp && echo 'hi there'"
            ]
        );
    }

    #[test]
    fn logs_passes_line_count() {
        let target = Target::new("test", "user@example.com");
        let inv = Invocation::build(Path::new("sessh"), &target, &Operation::Logs(42));
        assert_eq!(inv.args.last().map(String::as_str), Some("42"));
    }

    #[test]
    fn connection_options_become_environment() {
        let inv = Invocation::build(Path::new("sessh"), &full_target(), &Operation::Close);
        assert_eq!(inv.env_var(JSON_ENV), Some(OsStr::new("1")));
        assert_eq!(inv.env_var(IDENTITY_ENV), Some(OsStr::new("/keys/id_ed25519")));
        assert_eq!(inv.env_var(PROXYJUMP_ENV), Some(OsStr::new("ops@bastion")));
    }

    #[test]
    fn attach_skips_json_flag_but_keeps_connection_options() {
        let inv = Invocation::build(Path::new("sessh"), &full_target(), &Operation::Attach);
        assert_eq!(inv.args, vec!["attach", "agent", "ubuntu@10.0.0.5", "2222"]);
        assert_eq!(inv.env_var(JSON_ENV), None);
        assert!(inv.removes_env(JSON_ENV));
        assert_eq!(inv.env_var(IDENTITY_ENV), Some(OsStr::new("/keys/id_ed25519")));
        assert_eq!(inv.env_var(PROXYJUMP_ENV), Some(OsStr::new("ops@bastion")));
    }

    #[test]
    fn every_captured_operation_sets_json_flag() {
        let target = Target::new("test", "user@example.com");
        let ops = [
            Operation::Open,
            Operation::Run("true".to_string()),
            Operation::Logs(DEFAULT_LOG_LINES),
            Operation::Status,
            Operation::Close,
        ];
        for op in &ops {
            let inv = Invocation::build(Path::new("sessh"), &target, op);
            assert_eq!(inv.env_var(JSON_ENV), Some(OsStr::new("1")), "{}", op.name());
            assert_eq!(inv.args[0], op.name());
        }
    }

    #[test]
    fn zero_port_and_empty_options_are_left_out() {
        let target = Target {
            port: Some(0),
            identity: Some(PathBuf::new()),
            proxyjump: Some(String::new()),
            ..Target::new("test", "user@example.com")
        };
        let inv = Invocation::build(Path::new("sessh"), &target, &Operation::Status);
        assert_eq!(inv.args, vec!["status", "test", "user@example.com"]);
        assert_eq!(inv.env_var(IDENTITY_ENV), None);
        assert_eq!(inv.env_var(PROXYJUMP_ENV), None);
        assert!(inv.removes_env(IDENTITY_ENV));
        assert!(inv.removes_env(PROXYJUMP_ENV));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_identity_passes_through_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/keys/id_\xff\xfe");
        let target = Target {
            identity: Some(PathBuf::from(raw)),
            ..Target::new("test", "user@example.com")
        };
        let inv = Invocation::build(Path::new("sessh"), &target, &Operation::Open);
        assert_eq!(inv.env_var(IDENTITY_ENV), Some(raw));
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let target = Target::new("a", "h");
        let inv = Invocation::build(Path::new("/usr/bin/sessh"), &target, &Operation::Open);
        assert_eq!(inv.command_line(), "/usr/bin/sessh open a h");
    }
}
