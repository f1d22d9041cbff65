//! sessh client library.
//!
//! Drives the `sessh` command-line tool to manage persistent remote terminal
//! sessions:
//! - Opening and closing a tmux session over a multiplexed SSH connection
//! - Running commands in it and fetching its recent output
//! - Checking status and attaching interactively
//!
//! ```no_run
//! use sessh::SesshClient;
//!
//! # fn main() -> Result<(), sessh::SesshError> {
//! let client = SesshClient::new("agent", "ubuntu@203.0.113.7");
//! client.open()?;
//! client.run("cd /tmp && make")?;
//! println!("{}", client.logs(Some(100))?.output());
//! client.close()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod invocation;
pub mod response;
pub mod runner;

pub use client::SesshClient;
pub use config::{Config, Profile};
pub use error::SesshError;
pub use invocation::{Invocation, Operation, Target};
pub use response::{Response, SessionStatus};
pub use runner::{CapturedOutput, Runner, SystemRunner};
