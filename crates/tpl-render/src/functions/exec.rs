//! The `exec` template function.
//!
//! `exec(name, arg1, ..., [stdin])` runs a whitelisted command. When the
//! rule allows stdin, the last argument is fed to the command instead of
//! being passed on its argument vector. The call never fails the template:
//! any problem is logged and the function returns an empty string.

use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::{Error, ErrorKind, Value};
use tpl_exec::ExecWhitelist;

use crate::error::ExecDisabled;

/// Builds `exec` bound to `whitelist`.
pub fn exec_function(whitelist: Arc<ExecWhitelist>) -> Value {
    Value::from_function(move |name: String, args: Rest<Value>| -> String {
        let args = args.iter().map(|arg| arg.to_string()).collect();
        call(&whitelist, &name, args)
    })
}

/// Builds the stand-in `exec` used when no exec map was loaded.
///
/// Calling it raises an error carrying [`ExecDisabled`], which the render
/// engine treats as fatal regardless of the job's error policy.
pub fn disabled_exec_function() -> Value {
    Value::from_function(|name: String, _args: Rest<Value>| -> Result<String, Error> {
        Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot exec {:?}: exec is disabled without an exec map", name),
        )
        .with_source(ExecDisabled))
    })
}

fn call(whitelist: &ExecWhitelist, name: &str, mut args: Vec<String>) -> String {
    let rule = match whitelist.get(name) {
        Ok(rule) => rule,
        Err(err) => {
            log::error!("could not exec {:?} {:?}: {}", name, args, err);
            return String::new();
        }
    };

    let stdin = if rule.allow_stdin() { args.pop() } else { None };
    let outcome = whitelist.run(rule, &args, stdin.as_deref());

    if !outcome.stderr.is_empty() {
        log::warn!(
            "exec {:?} {:?}, STDERR output was: {}",
            name,
            args,
            outcome.stderr
        );
    }
    if let Some(err) = &outcome.error {
        log::error!("exec {:?} {:?} failed with error: {}", name, args, err);
        return String::new();
    }
    rule.surfaced(&outcome).to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use minijinja::Environment;

    fn env_with(yaml: &str) -> Environment<'static> {
        let whitelist = ExecWhitelist::load("test", yaml.as_bytes()).unwrap();
        let mut env = Environment::new();
        env.add_global("exec", exec_function(Arc::new(whitelist)));
        env
    }

    #[test]
    fn test_exec_returns_stdout() {
        let env = env_with("whitelist:\n  - name: sh\n    stdout: true\n");
        let out = env
            .render_str(r#"{{ exec("sh", "-c", "printf hi") }}"#, ())
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_exec_stdin_is_last_argument() {
        let env = env_with("whitelist:\n  - name: sh\n    stdin: true\n    stdout: true\n");
        let out = env
            .render_str(r#"{{ exec("sh", "-c", "tr a-z A-Z", "quiet") }}"#, ())
            .unwrap();
        assert_eq!(out, "QUIET");
    }

    #[test]
    fn test_exec_without_stdin_keeps_last_argument() {
        let env = env_with("whitelist:\n  - name: sh\n    stdout: true\n");
        let source = r#"{{ exec("sh", "-c", "printf '%s' \"$1\"", "sh", "last") }}"#;
        assert_eq!(env.render_str(source, ()).unwrap(), "last");
    }

    #[test]
    fn test_exec_stderr_only() {
        let env = env_with("whitelist:\n  - name: sh\n    stderr: true\n");
        let out = env
            .render_str(r#"{{ exec("sh", "-c", "echo out; printf err >&2") }}"#, ())
            .unwrap();
        assert_eq!(out, "err");
    }

    #[test]
    fn test_exec_failure_degrades_to_empty() {
        let env = env_with("whitelist:\n  - name: sh\n    stdout: true\n");
        let out = env
            .render_str(r#"[{{ exec("sh", "-c", "echo partial; exit 2") }}]"#, ())
            .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_exec_unlisted_degrades_to_empty() {
        let env = env_with("whitelist:\n  - name: sh\n    stdout: true\n");
        let out = env
            .render_str(r#"[{{ exec("rm", "-rf", "/") }}]"#, ())
            .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_exec_stringifies_arguments() {
        let env = env_with("whitelist:\n  - name: sh\n    stdout: true\n");
        let source = r#"{{ exec("sh", "-c", "printf '%s' \"$1\"", "sh", 42) }}"#;
        assert_eq!(env.render_str(source, ()).unwrap(), "42");
    }

    #[test]
    fn test_disabled_carries_marker() {
        let mut env = Environment::new();
        env.add_global("exec", disabled_exec_function());
        let err = env.render_str(r#"{{ exec("date") }}"#, ()).unwrap_err();
        let mut source = std::error::Error::source(&err);
        let mut found = false;
        while let Some(inner) = source {
            if inner.downcast_ref::<ExecDisabled>().is_some() {
                found = true;
                break;
            }
            source = inner.source();
        }
        assert!(found, "ExecDisabled marker missing from {:?}", err);
    }
}
