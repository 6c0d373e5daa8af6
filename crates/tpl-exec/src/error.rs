use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while loading an exec map or running a whitelisted command.
///
/// Everything except [`ExecError::Spawn`] and [`ExecError::CommandFailed`] is
/// detected before any template runs.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The exec-map file could not be read.
    #[error("cannot read exec-map {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The exec-map document is malformed.
    #[error("cannot parse exec-map {source_name}: {source}")]
    Decode {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A whitelist rule is structurally invalid.
    #[error("whitelist item #{index} in exec-map {source_name:?} {reason}")]
    Config {
        source_name: String,
        index: usize,
        reason: String,
    },

    /// The extra search directories cannot form a valid search path.
    #[error("invalid search path in exec-map {source_name:?}: {source}")]
    SearchPath {
        source_name: String,
        #[source]
        source: std::env::JoinPathsError,
    },

    /// A rule's executable could not be located.
    #[error("cannot resolve executable for {name:?}: {reason}")]
    Resolution { name: String, reason: String },

    /// A rule's explicit path is a directory or carries no executable bit.
    #[error("{} (for {name:?}) is not an executable file", .path.display())]
    Permission { name: String, path: PathBuf },

    /// The requested command is not part of the whitelist.
    #[error("executable {0:?} is not in whitelist")]
    NotWhitelisted(String),

    /// The command could not be started or its output could not be collected.
    #[error("failed to run {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("{} exited with {status}", .path.display())]
    CommandFailed { path: PathBuf, status: ExitStatus },
}

impl ExecError {
    pub(crate) fn config(source_name: &str, index: usize, reason: impl Into<String>) -> Self {
        Self::Config {
            source_name: source_name.to_string(),
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_index_and_source() {
        let err = ExecError::config("tools.yaml", 3, "is missing a 'name' field");
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("tools.yaml"));
        assert!(msg.contains("missing a 'name'"));
    }

    #[test]
    fn test_not_whitelisted_display() {
        let err = ExecError::NotWhitelisted("rm".into());
        assert_eq!(err.to_string(), "executable \"rm\" is not in whitelist");
    }
}
