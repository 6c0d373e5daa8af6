//! Whitelisted external command execution.
//!
//! `tpl-exec` turns an otherwise unrestricted shell-out capability into a
//! declaratively bounded one. An exec map names every command a template may
//! run; each name is resolved to one executable path when the map is loaded,
//! and nothing outside the map can be located afterwards.
//!
//! # Exec Map
//!
//! ```yaml
//! paths:
//!   - /opt/tools/bin
//! whitelist:
//!   - name: git
//!     stdout: true
//!   - name: checksum
//!     path: /usr/local/bin/checksum
//!     stdin: true
//!     stdout: true
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tpl_exec::ExecWhitelist;
//!
//! let whitelist = ExecWhitelist::load_file("exec-map.yaml")?;
//! let rule = whitelist.get("git")?;
//! let outcome = whitelist.run(rule, &["rev-parse".into(), "HEAD".into()], None);
//! println!("{}", rule.surfaced(&outcome));
//! # Ok::<(), tpl_exec::ExecError>(())
//! ```
//!
//! # Search Path
//!
//! Extra `paths` never touch the process environment. They are combined with
//! the inherited `PATH` into a [`SearchPath`] snapshot that is used to resolve
//! rules at load time and is handed to each child process as its `PATH`.

mod declaration;
mod error;
mod run;
mod search_path;
mod whitelist;

pub use declaration::{ExecMapDeclaration, RuleDeclaration};
pub use error::ExecError;
pub use run::{run_captured, ExecOutcome};
pub use search_path::SearchPath;
pub use whitelist::{CommandRule, ExecWhitelist};
