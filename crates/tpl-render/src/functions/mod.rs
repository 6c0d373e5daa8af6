//! Functions available to templates.
//!
//! A [`FunctionRegistry`] is assembled before rendering starts and is
//! immutable while templates run. It holds:
//!
//! - the helper library (see [`library`]) on top of minijinja's built-ins
//! - functions contributed by extensions, under `<namespace>_<name>`
//! - the `exec` function, either bound to an [`ExecWhitelist`] or disabled
//!
//! Every entry is a callable [`minijinja::Value`], usually built with
//! [`minijinja::Value::from_function`].

mod exec;
mod library;

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::{Environment, Value};
use tpl_exec::ExecWhitelist;

pub use exec::{disabled_exec_function, exec_function};
pub use library::library;

/// Name to callable mapping, as produced by the library and by extensions.
pub type FunctionSet = BTreeMap<String, Value>;

/// Name under which the controlled-execution function is registered.
pub const EXEC_FUNCTION: &str = "exec";

/// The complete set of named callables templates can use.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: FunctionSet,
}

impl FunctionRegistry {
    /// An empty registry. Templates still see minijinja's built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// The helper library plus a disabled `exec`.
    pub fn with_library() -> Self {
        let mut registry = Self {
            functions: library(),
        };
        registry.disable_exec();
        registry
    }

    /// Registers a function, replacing any previous entry of the same name.
    pub fn insert(&mut self, name: impl Into<String>, function: Value) -> Option<Value> {
        self.functions.insert(name.into(), function)
    }

    /// Adds every function of `set` as `<namespace>_<name>`.
    ///
    /// Existing entries under the same composite name are silently replaced.
    /// Returns the number of functions merged.
    pub fn merge_namespaced(&mut self, namespace: &str, set: FunctionSet) -> usize {
        let count = set.len();
        for (name, function) in set {
            self.functions
                .insert(format!("{}_{}", namespace, name), function);
        }
        count
    }

    /// Binds `exec` to a loaded whitelist.
    pub fn enable_exec(&mut self, whitelist: ExecWhitelist) {
        self.insert(EXEC_FUNCTION, exec_function(Arc::new(whitelist)));
    }

    /// Replaces `exec` with a stub that fails the whole run when called.
    pub fn disable_exec(&mut self) {
        self.insert(EXEC_FUNCTION, disabled_exec_function());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registers every function as a global in `env`.
    pub fn install(&self, env: &mut Environment<'static>) {
        for (name, function) in &self.functions {
            env.add_global(name.clone(), function.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(registry: &FunctionRegistry, source: &str) -> Result<String, minijinja::Error> {
        let mut env = Environment::new();
        registry.install(&mut env);
        env.render_str(source, ())
    }

    #[test]
    fn test_library_is_installed() {
        let registry = FunctionRegistry::with_library();
        assert!(registry.contains("toYaml"));
        assert!(registry.contains(EXEC_FUNCTION));
        assert_eq!(
            render(&registry, r#"{{ trimLeft("x", "xxabc") }}"#).unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_namespaced_merge_last_wins() {
        let mut registry = FunctionRegistry::new();
        let mut first = FunctionSet::new();
        first.insert("hello".into(), Value::from_function(|| "first"));
        let mut second = FunctionSet::new();
        second.insert("hello".into(), Value::from_function(|| "second"));

        assert_eq!(registry.merge_namespaced("greet", first), 1);
        registry.merge_namespaced("greet", second);

        assert!(registry.contains("greet_hello"));
        assert!(!registry.contains("hello"));
        assert_eq!(render(&registry, "{{ greet_hello() }}").unwrap(), "second");
    }

    #[test]
    fn test_disabled_exec_errors() {
        let registry = FunctionRegistry::with_library();
        let err = render(&registry, r#"{{ exec("date") }}"#).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.insert("f", Value::from_function(|| 1)).is_none());
        assert!(registry.insert("f", Value::from_function(|| 2)).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(render(&registry, "{{ f() }}").unwrap(), "2");
    }
}
