//! Raw exec-map documents, before any validation or resolution.

use std::path::PathBuf;

use serde::Deserialize;

use crate::ExecError;

/// An exec map as written on disk.
///
/// Both YAML and JSON are accepted. Missing sections default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecMapDeclaration {
    /// Directories searched before the inherited `PATH`.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Ordered command rules.
    #[serde(default)]
    pub whitelist: Vec<RuleDeclaration>,
}

/// One unvalidated whitelist entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleDeclaration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub stdin: bool,
    #[serde(default)]
    pub stdout: bool,
    #[serde(default)]
    pub stderr: bool,
}

impl RuleDeclaration {
    /// The explicit path, treating an empty string as absent.
    pub fn explicit_path(&self) -> Option<&PathBuf> {
        self.path.as_ref().filter(|p| !p.as_os_str().is_empty())
    }
}

impl ExecMapDeclaration {
    /// Decodes a declaration from raw bytes.
    ///
    /// An empty document yields an empty declaration.
    pub fn parse(source_name: &str, data: &[u8]) -> Result<Self, ExecError> {
        let decode_error = |source: serde_yaml::Error| ExecError::Decode {
            source_name: source_name.to_string(),
            source,
        };
        let parsed: Option<Self> = serde_yaml::from_slice(data).map_err(decode_error)?;
        Ok(parsed.unwrap_or_default())
    }
}
