//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait the render engine drives,
//! and [`MiniJinjaEngine`], the default implementation.

use std::collections::{BTreeSet, HashSet};

use minijinja::{AutoEscape, Environment, ErrorKind, Template, UndefinedBehavior};

use crate::error::{ExecDisabled, RenderError};
use crate::functions::FunctionRegistry;
use crate::values::Values;

/// Global functions minijinja provides on its own.
const BUILTIN_GLOBALS: &[&str] = &["range", "dict", "debug", "namespace", "loop", "self"];

/// What happens when a template references a value that is not present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Absent values are an error.
    #[default]
    Strict,
    /// Absent values, and any attribute chain through them, render as empty.
    Lenient,
}

impl MissingKeyPolicy {
    /// `Strict` when rendering stops at the first error, `Lenient` otherwise.
    pub fn from_stop_on_error(stop_on_error: bool) -> Self {
        if stop_on_error {
            Self::Strict
        } else {
            Self::Lenient
        }
    }

    fn undefined_behavior(self) -> UndefinedBehavior {
        match self {
            Self::Strict => UndefinedBehavior::Strict,
            Self::Lenient => UndefinedBehavior::Chainable,
        }
    }
}

/// A template engine that can render template sources against values.
pub trait TemplateEngine {
    /// Registers a template other templates can include or import by `name`.
    ///
    /// Shared templates are not rendered on their own.
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError>;

    /// Checks if a shared template with the given name exists.
    fn has_template(&self, name: &str) -> bool;

    /// Compiles `source` under `name` and executes it against `values`.
    ///
    /// Syntax errors are reported as [`RenderError::Compile`] and nothing is
    /// executed. The returned text is exactly what the template produced.
    fn render(
        &self,
        name: &str,
        source: &str,
        values: &Values,
        policy: MissingKeyPolicy,
    ) -> Result<String, RenderError>;
}

/// MiniJinja-based template engine.
///
/// # Example
///
/// ```rust
/// use tpl_render::{FunctionRegistry, MiniJinjaEngine, MissingKeyPolicy, TemplateEngine, Values};
///
/// let engine = MiniJinjaEngine::new(&FunctionRegistry::with_library());
/// let mut values = Values::new();
/// values.set("name", "World");
///
/// let output = engine
///     .render("greeting", "Hello, {{ name }}!\n", &values, MissingKeyPolicy::Strict)
///     .unwrap();
/// assert_eq!(output, "Hello, World!\n");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    globals: BTreeSet<String>,
}

impl MiniJinjaEngine {
    /// Creates an engine with every function of `functions` installed.
    pub fn new(functions: &FunctionRegistry) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        functions.install(&mut env);

        let globals = functions
            .names()
            .chain(BUILTIN_GLOBALS.iter().copied())
            .map(str::to_string)
            .collect();
        Self { env, globals }
    }

    fn classify(
        &self,
        env: &Environment<'_>,
        template: &Template<'_, '_>,
        values: &Values,
        err: minijinja::Error,
    ) -> RenderError {
        let template_name = template.name().to_string();
        if is_exec_disabled(&err) {
            return RenderError::ExecDisabled {
                template: template_name,
                source: err,
            };
        }
        if err.kind() == ErrorKind::UndefinedError {
            let keys = match failing_path(env, &err) {
                Some(path) => {
                    let undeclared = template.undeclared_variables(false);
                    vec![first_missing(&path, values, &undeclared)]
                }
                None => self.unresolved_names(template, values),
            };
            return RenderError::MissingKey {
                template: template_name,
                keys,
                source: err,
            };
        }
        RenderError::Execution {
            template: template_name,
            source: err,
        }
    }

    /// Every top-level name the template mentions that neither the values
    /// nor the installed functions provide.
    fn unresolved_names(&self, template: &Template<'_, '_>, values: &Values) -> Vec<String> {
        let mut keys: Vec<String> = template
            .undeclared_variables(false)
            .into_iter()
            .filter(|key| !values.contains_key(key) && !self.globals.contains(key))
            .collect();
        keys.sort();
        keys
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|source| RenderError::Compile {
                template: name.to_string(),
                source,
            })
    }

    fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    fn render(
        &self,
        name: &str,
        source: &str,
        values: &Values,
        policy: MissingKeyPolicy,
    ) -> Result<String, RenderError> {
        let compile_error = |source| RenderError::Compile {
            template: name.to_string(),
            source,
        };

        let mut env = self.env.clone();
        env.set_undefined_behavior(policy.undefined_behavior());
        env.add_template_owned(name.to_string(), source.to_string())
            .map_err(compile_error)?;
        let template = env.get_template(name).map_err(compile_error)?;

        template
            .render(values.to_context())
            .map_err(|err| self.classify(&env, &template, values, err))
    }
}

/// The expression the error points at, split into lookup segments.
///
/// `user.nickname` and `user["nickname"]` both give `["user", "nickname"]`.
/// Returns `None` when the error carries no location or the expression is
/// not a plain lookup.
fn failing_path(env: &Environment<'_>, err: &minijinja::Error) -> Option<Vec<String>> {
    let range = err.range()?;
    let template = env.get_template(err.name()?).ok()?;
    lookup_path(template.source().get(range)?)
}

fn lookup_path(expr: &str) -> Option<Vec<String>> {
    let expr = expr.trim().trim_start_matches("{{").trim_end_matches("}}");
    let expr = expr.trim_matches(|c: char| c == '-' || c == '+' || c.is_whitespace());
    let expr = expr.split('|').next()?.trim_end();

    let mut segments = Vec::new();
    for part in expr.split('.') {
        let mut pieces = part.split('[');
        segments.push(pieces.next()?.to_string());
        for subscript in pieces {
            let key = subscript.strip_suffix(']')?.trim();
            segments.push(key.trim_matches(|c: char| c == '"' || c == '\'').to_string());
        }
    }
    let is_name = |s: &String| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    segments.iter().all(is_name).then_some(segments)
}

/// The first segment of `path` the values cannot provide.
///
/// When the head is not a value at all it is either an unknown top-level
/// name or a template-local variable; only the former is blamed.
fn first_missing(path: &[String], values: &Values, undeclared: &HashSet<String>) -> String {
    let (head, rest) = match path.split_first() {
        Some(split) => split,
        None => return String::new(),
    };
    let mut current = match values.get(head) {
        Some(value) => value,
        None if undeclared.contains(head) || rest.is_empty() => return head.clone(),
        None => return path[path.len() - 1].clone(),
    };
    for segment in rest {
        let next = match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment.as_str()),
        };
        match next {
            Some(value) => current = value,
            None => return segment.clone(),
        }
    }
    path[path.len() - 1].clone()
}

fn is_exec_disabled(err: &minijinja::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if inner.is::<ExecDisabled>() {
            return true;
        }
        source = inner.source();
    }
    false
}
