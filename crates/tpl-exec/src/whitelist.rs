//! Load-time resolution of whitelisted commands.
//!
//! Every rule is validated and resolved to one concrete executable when the
//! exec map is loaded. Whether a command may run, and where it physically
//! lives, is therefore settled before any template executes; later calls
//! only look up the stored path.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::declaration::{ExecMapDeclaration, RuleDeclaration};
use crate::run::{run_captured, ExecOutcome};
use crate::{ExecError, SearchPath};

/// A validated whitelist rule with its executable resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRule {
    name: String,
    path: PathBuf,
    allow_stdin: bool,
    allow_stdout: bool,
    allow_stderr: bool,
}

impl CommandRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The executable this rule runs.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn allow_stdin(&self) -> bool {
        self.allow_stdin
    }

    pub fn allow_stdout(&self) -> bool {
        self.allow_stdout
    }

    pub fn allow_stderr(&self) -> bool {
        self.allow_stderr
    }

    /// The stream this rule surfaces to its caller.
    ///
    /// Stdout wins when both are allowed; a rule that allows neither cannot be
    /// loaded, but an empty string is returned for completeness.
    pub fn surfaced<'a>(&self, outcome: &'a ExecOutcome) -> &'a str {
        if self.allow_stdout {
            &outcome.stdout
        } else if self.allow_stderr {
            &outcome.stderr
        } else {
            ""
        }
    }
}

/// The set of commands templates are allowed to run.
#[derive(Debug, Clone, Default)]
pub struct ExecWhitelist {
    search_path: SearchPath,
    /// Joined `PATH` for children; only set when extra directories were given.
    child_path: Option<OsString>,
    rules: Vec<CommandRule>,
}

impl ExecWhitelist {
    /// Reads and resolves an exec map from disk.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ExecError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ExecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load(&path.display().to_string(), &data)
    }

    /// Parses and resolves an exec map, inheriting the process `PATH`.
    pub fn load(source_name: &str, data: &[u8]) -> Result<Self, ExecError> {
        let declaration = ExecMapDeclaration::parse(source_name, data)?;
        let search_path = SearchPath::inherit(declaration.paths.clone());
        Self::resolve(source_name, declaration, search_path)
    }

    /// Validates and resolves every rule of `declaration` against `search_path`.
    ///
    /// Rules are processed in order and the first failure aborts the load.
    pub fn resolve(
        source_name: &str,
        declaration: ExecMapDeclaration,
        search_path: SearchPath,
    ) -> Result<Self, ExecError> {
        let joined = search_path
            .joined()
            .map_err(|source| ExecError::SearchPath {
                source_name: source_name.to_string(),
                source,
            })?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(declaration.whitelist.len());
        for (index, decl) in declaration.whitelist.into_iter().enumerate() {
            if decl.name.is_empty() {
                return Err(ExecError::config(source_name, index, "is missing a 'name' field"));
            }
            if !decl.stdout && !decl.stderr {
                return Err(ExecError::config(
                    source_name,
                    index,
                    format!("({:?}) has neither 'stdout' nor 'stderr' enabled", decl.name),
                ));
            }
            if !seen.insert(decl.name.clone()) {
                return Err(ExecError::config(
                    source_name,
                    index,
                    format!("({:?}) duplicates an earlier rule", decl.name),
                ));
            }

            let path = match decl.explicit_path() {
                Some(explicit) => check_executable(&decl.name, explicit)?,
                None => lookup(&decl.name, &joined, &cwd)?,
            };
            log::debug!("whitelisted {:?} as {}", decl.name, path.display());
            rules.push(rule_from(decl, path));
        }

        let child_path = search_path.is_augmented().then_some(joined);
        Ok(Self {
            search_path,
            child_path,
            rules,
        })
    }

    /// Looks up a rule by exact name.
    pub fn get(&self, name: &str) -> Result<&CommandRule, ExecError> {
        self.rules
            .iter()
            .find(|rule| rule.name == name)
            .ok_or_else(|| ExecError::NotWhitelisted(name.to_string()))
    }

    /// Runs a rule's executable, capturing stdout and stderr.
    ///
    /// Failures are reported in the returned [`ExecOutcome`] rather than as an
    /// `Err`; deciding what to surface is left to the caller.
    pub fn run(&self, rule: &CommandRule, args: &[String], stdin: Option<&str>) -> ExecOutcome {
        if stdin.is_some() {
            log::info!(
                "Executing {:?} with arguments {:?} and STDIN",
                rule.path,
                args
            );
        } else {
            log::info!("Executing {:?} with arguments {:?}", rule.path, args);
        }
        let outcome = run_captured(&rule.path, args, stdin, self.child_path.as_deref());
        if let Some(err) = &outcome.error {
            log::warn!("Exited with error: {}", err);
        }
        outcome
    }

    pub fn rules(&self) -> &[CommandRule] {
        &self.rules
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn rule_from(decl: RuleDeclaration, path: PathBuf) -> CommandRule {
    CommandRule {
        name: decl.name,
        path,
        allow_stdin: decl.stdin,
        allow_stdout: decl.stdout,
        allow_stderr: decl.stderr,
    }
}

fn lookup(name: &str, search_path: &OsString, cwd: &Path) -> Result<PathBuf, ExecError> {
    let resolution = |err: which::Error| ExecError::Resolution {
        name: name.to_string(),
        reason: err.to_string(),
    };
    let found = which::which_in(name, Some(search_path), cwd).map_err(resolution)?;
    if found.is_absolute() {
        Ok(found)
    } else {
        Ok(cwd.join(found))
    }
}

fn check_executable(name: &str, path: &Path) -> Result<PathBuf, ExecError> {
    let meta = fs::metadata(path).map_err(|err| ExecError::Resolution {
        name: name.to_string(),
        reason: format!("{}: {}", path.display(), err),
    })?;
    if meta.is_dir() || !has_exec_bit(&meta) {
        return Err(ExecError::Permission {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

#[cfg(unix)]
fn has_exec_bit(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(meta: &fs::Metadata) -> bool {
    meta.is_file()
}
