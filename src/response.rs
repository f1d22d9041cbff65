//! Parsed sessh responses.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SesshError};

/// The JSON object sessh printed on stdout.
///
/// Derefs to the underlying map, so every field the tool emitted is
/// available unchanged. The accessors below cover the documented fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response(Map<String, Value>);

impl Response {
    /// Parse stdout of a successful call. Anything but a JSON object is
    /// rejected.
    pub fn parse(stdout: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(stdout) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            _ => Err(SesshError::InvalidJson {
                output: stdout.to_string(),
            }),
        }
    }

    /// The `ok` field, if present and boolean.
    pub fn ok(&self) -> Option<bool> {
        self.0.get("ok").and_then(Value::as_bool)
    }

    /// The `op` field naming the subcommand that answered.
    pub fn op(&self) -> Option<&str> {
        self.0.get("op").and_then(Value::as_str)
    }

    /// Captured session output from `logs`; empty when absent.
    pub fn output(&self) -> &str {
        self.0.get("output").and_then(Value::as_str).unwrap_or("")
    }

    /// The `error` field sessh sets on failure.
    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    /// Typed view of the `master` and `session` fields of a status reply.
    pub fn session_status(&self) -> SessionStatus {
        SessionStatus {
            master: self.flag("master"),
            session: self.flag("session"),
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(truthy)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Response {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Response> for Value {
    fn from(response: Response) -> Self {
        Value::Object(response.0)
    }
}

/// Whether the SSH controlmaster and the remote tmux session exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub master: bool,
    pub session: bool,
}

impl SessionStatus {
    /// Both the connection and the session are up.
    pub fn is_ready(&self) -> bool {
        self.master && self.session
    }
}

// sessh reports existence as 1/0; accept the other obvious encodings too.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
