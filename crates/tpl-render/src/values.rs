//! The merged key-value data templates render against.
//!
//! Values are accumulated from several sources in order. Every merge is
//! shallow: a later source replaces whole top-level entries and never reaches
//! into nested mappings.
//!
//! ```rust
//! use tpl_render::{Override, Values};
//!
//! let mut values = Values::new();
//! values.load("base", b"user: {name: ripta, shell: zsh}\nregion: eu\n").unwrap();
//! values.load("site", b"user: {name: admin}\n").unwrap();
//! values.apply_override("region=us".parse::<Override>().unwrap());
//!
//! // `user` was replaced wholesale, `region` by the inline override.
//! assert_eq!(values.get("user").unwrap()["name"], "admin");
//! assert!(values.get("user").unwrap().get("shell").is_none());
//! assert_eq!(values.get("region").unwrap(), "us");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::ValuesError;

/// Top-level mapping of names to structured values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Values {
    entries: BTreeMap<String, Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `data` as a YAML (or JSON) mapping and merges its top-level keys.
    ///
    /// An empty document contributes nothing. A document whose top level is
    /// not a mapping fails to decode.
    pub fn load(&mut self, source_name: &str, data: &[u8]) -> Result<(), ValuesError> {
        let decode_error = |source: serde_yaml::Error| ValuesError::Decode {
            source_name: source_name.to_string(),
            source,
        };
        let decoded: Option<BTreeMap<String, Value>> =
            serde_yaml::from_slice(data).map_err(decode_error)?;
        if let Some(entries) = decoded {
            self.entries.extend(entries);
        }
        Ok(())
    }

    /// Reads a values file and merges it.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ValuesError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ValuesError::EmptyPath);
        }
        log::info!("Loading values from {}", path.display());
        let data = fs::read(path).map_err(|source| ValuesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&path.display().to_string(), &data)
    }

    /// Merges `other` into `self`; `other` wins on every shared top-level key.
    pub fn merge(&mut self, other: Values) {
        self.entries.extend(other.entries);
    }

    /// Sets a single top-level entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Applies an inline override as a literal string.
    pub fn apply_override(&mut self, ov: Override) {
        self.entries.insert(ov.key, Value::String(ov.value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The values as a template context.
    pub fn to_context(&self) -> minijinja::Value {
        minijinja::Value::from_serialize(self)
    }
}

/// An inline `key=value` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    key: String,
    value: String,
}

impl Override {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Override {
    type Err = ValuesError;

    /// Splits at the first `=`; everything after it, including further `=`,
    /// is the value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(ValuesError::InvalidOverride(s.to_string())),
        }
    }
}
