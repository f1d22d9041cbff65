//! Error type for sessh invocations.

use std::io;

/// Errors that can occur while invoking the sessh binary.
///
/// Every variant is a runtime failure of a single call; the variants only
/// record where it was observed.
#[derive(Debug)]
pub enum SesshError {
    /// The binary could not be started
    Spawn { program: String, source: io::Error },
    /// The binary exited non-zero or was killed
    Failed { op: &'static str, message: String },
    /// The binary exited zero but stdout was not a JSON object
    InvalidJson { output: String },
}

impl SesshError {
    /// The captured text carried by this error.
    pub fn message(&self) -> String {
        match self {
            SesshError::Spawn { source, .. } => source.to_string(),
            SesshError::Failed { message, .. } => message.clone(),
            SesshError::InvalidJson { output } => output.clone(),
        }
    }
}

impl std::fmt::Display for SesshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SesshError::Spawn { program, source } => {
                write!(f, "Failed to run {}: {}", program, source)
            }
            SesshError::Failed { op, message } => write!(f, "sessh {} failed: {}", op, message),
            SesshError::InvalidJson { output } => write!(f, "Invalid JSON from sessh: {}", output),
        }
    }
}

impl std::error::Error for SesshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SesshError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, SesshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_display_names_the_operation() {
        let err = SesshError::Failed {
            op: "status",
            message: "no such session".to_string(),
        };
        assert_eq!(err.to_string(), "sessh status failed: no such session");
        assert_eq!(err.message(), "no such session");
    }

    #[test]
    fn invalid_json_display_carries_stdout() {
        let err = SesshError::InvalidJson {
            output: "not json".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid JSON from sessh: not json");
    }

    #[test]
    fn spawn_exposes_io_source() {
        let err = SesshError::Spawn {
            program: "sessh".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Failed to run sessh"));
    }
}
