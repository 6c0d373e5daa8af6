//! Namespaced function extensions.
//!
//! An extension unit is a set of template functions compiled into the
//! binary. Units are addressed the way shared libraries would be, by a file
//! name of the form `<namespace>.<ext>` where `<ext>` is the platform's
//! dynamic library extension (`so`, `dylib`, `dll`). Every function a unit
//! provides is registered as `<namespace>_<name>`.
//!
//! Units can be registered explicitly:
//!
//! ```rust
//! use tpl_render::minijinja::Value;
//! use tpl_render::{ExtensionRegistry, ExtensionUnit, FunctionRegistry, FunctionSet};
//!
//! fn greetings() -> FunctionSet {
//!     let mut set = FunctionSet::new();
//!     set.insert("hello".into(), Value::from_function(|| "hello"));
//!     set
//! }
//!
//! let mut units = ExtensionRegistry::new();
//! units.register(ExtensionUnit::new("greet", greetings));
//!
//! let mut functions = FunctionRegistry::new();
//! let file = format!("plugins/greet.{}", std::env::consts::DLL_EXTENSION);
//! let namespace = units.load(file, &mut functions).unwrap();
//! assert_eq!(namespace, "greet");
//! assert!(functions.contains("greet_hello"));
//! ```
//!
//! or collected at link time with [`inventory::submit!`], in which case
//! [`ExtensionRegistry::discovered`] picks them up.

use std::collections::BTreeMap;
use std::env::consts::DLL_EXTENSION;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExtensionError;
use crate::functions::{FunctionRegistry, FunctionSet};

static UNIT_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^([A-Za-z0-9_]+)\.{}$", regex::escape(DLL_EXTENSION)))
        .expect("unit file name pattern is valid")
});

/// A compiled-in set of template functions.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionUnit {
    namespace: &'static str,
    factory: fn() -> FunctionSet,
}

inventory::collect!(ExtensionUnit);

impl ExtensionUnit {
    pub const fn new(namespace: &'static str, factory: fn() -> FunctionSet) -> Self {
        Self { namespace, factory }
    }

    /// The file name that selects this unit, e.g. `strings.so`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.namespace, DLL_EXTENSION)
    }

    pub fn functions(&self) -> FunctionSet {
        (self.factory)()
    }
}

/// Known extension units, keyed by namespace.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    units: BTreeMap<&'static str, ExtensionUnit>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unit submitted with `inventory::submit!` in the final binary.
    pub fn discovered() -> Self {
        let mut registry = Self::new();
        for unit in inventory::iter::<ExtensionUnit> {
            registry.register(*unit);
        }
        log::debug!("{} extension units available", registry.units.len());
        registry
    }

    /// Adds a unit. A later unit with the same namespace replaces the earlier one.
    pub fn register(&mut self, unit: ExtensionUnit) {
        self.units.insert(unit.namespace, unit);
    }

    pub fn get(&self, namespace: &str) -> Option<&ExtensionUnit> {
        self.units.get(namespace)
    }

    pub fn file_names(&self) -> Vec<String> {
        self.units.values().map(ExtensionUnit::file_name).collect()
    }

    /// Loads the unit selected by `path` into `functions`.
    ///
    /// Only the base file name of `path` matters; nothing is read from disk.
    /// Returns the namespace the functions were registered under.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        functions: &mut FunctionRegistry,
    ) -> Result<String, ExtensionError> {
        let path = path.as_ref();
        let namespace = namespace_for(path)?;

        let unit = self.get(&namespace).ok_or_else(|| ExtensionError::Load {
            path: path.to_path_buf(),
            reason: format!("no extension unit provides namespace {:?}", namespace),
        })?;
        let set = unit.functions();
        if set.is_empty() {
            return Err(ExtensionError::Load {
                path: path.to_path_buf(),
                reason: "extension unit provides no functions".to_string(),
            });
        }

        let count = functions.merge_namespaced(&namespace, set);
        log::info!(
            "Loaded {} functions from extension {} as {}_*",
            count,
            path.display(),
            namespace
        );
        Ok(namespace)
    }
}

/// Derives the function namespace from a unit's file name.
pub fn namespace_for(path: &Path) -> Result<String, ExtensionError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let namespace = UNIT_FILE_NAME
        .captures(&file_name)
        .map(|caps| caps[1].to_string());
    namespace.ok_or(ExtensionError::Naming {
        file_name,
        extension: DLL_EXTENSION,
    })
}

/// Loads `path` from the units discovered at link time.
pub fn load_extension(
    path: impl AsRef<Path>,
    functions: &mut FunctionRegistry,
) -> Result<String, ExtensionError> {
    ExtensionRegistry::discovered().load(path, functions)
}
