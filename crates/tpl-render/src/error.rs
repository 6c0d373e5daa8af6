//! Error types for rendering.
//!
//! [`RenderError`] covers everything that can go wrong while walking inputs
//! and rendering templates. [`ValuesError`] and [`ExtensionError`] cover the
//! setup steps that happen before any template runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for render jobs.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The job itself is misconfigured.
    #[error("{0}")]
    Config(String),

    /// An input could not be read or an output could not be written.
    #[error("cannot {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Template syntax error.
    #[error("cannot parse template {template}: {source}")]
    Compile {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// The template referenced data that is not present.
    #[error("{} in template {template}: {source}", describe_keys(.keys))]
    MissingKey {
        template: String,
        /// The key whose lookup failed, or every unresolved top-level name
        /// when the failing expression could not be located.
        keys: Vec<String>,
        #[source]
        source: minijinja::Error,
    },

    /// Any other failure while executing a template, such as a function error.
    #[error("cannot render template {template}: {source}")]
    Execution {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// The template called `exec` while no exec map was loaded.
    #[error("template {template} called a disabled function: {source}")]
    ExecDisabled {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

impl RenderError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether the error aborts a job even under the best-effort policy.
    ///
    /// Only template execution failures can be skipped.
    pub fn is_always_fatal(&self) -> bool {
        !matches!(self, Self::MissingKey { .. } | Self::Execution { .. })
    }
}

fn describe_keys(keys: &[String]) -> String {
    match keys {
        [] => "missing key".to_string(),
        [key] => format!("map has no entry for key {:?}", key),
        _ => {
            let quoted: Vec<String> = keys.iter().map(|k| format!("{:?}", k)).collect();
            format!("map has no entries for keys {}", quoted.join(", "))
        }
    }
}

/// Marker attached to the error raised by the disabled `exec` function.
#[derive(Debug, Error)]
#[error("the 'exec' template function is disabled; you must specify an exec map to enable it")]
pub struct ExecDisabled;

/// Errors raised while loading values.
#[derive(Debug, Error)]
pub enum ValuesError {
    #[error("filename must not be empty")]
    EmptyPath,

    #[error("cannot read file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse values from {source_name}: {source}")]
    Decode {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("value {0:?} must be in the format 'key=value'")]
    InvalidOverride(String),
}

/// Errors raised while loading an extension unit.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The unit's file name cannot produce a valid namespace.
    #[error(
        "invalid extension file name {file_name:?}: must be <namespace>.{extension} \
         using letters, digits and underscores only"
    )]
    Naming {
        file_name: String,
        extension: &'static str,
    },

    /// The unit is unknown or does not provide usable functions.
    #[error("cannot load extension {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
}
