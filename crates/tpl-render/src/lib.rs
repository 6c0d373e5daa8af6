//! # tpl-render - Template Tree Rendering
//!
//! `tpl-render` renders text templates, or whole directories of them, against
//! a merged set of key-value data, mirroring the input layout in the output.
//!
//! ## Core Concepts
//!
//! - [`Values`]: Top-level data merged from YAML/JSON files and `key=value` overrides
//! - [`FunctionRegistry`]: Helpers, extension functions and `exec` available to templates
//! - [`ExtensionRegistry`]: Compiled-in function sets loaded under a namespace
//! - [`MiniJinjaEngine`]: Compiles and executes one template at a time
//! - [`RenderJob`]: Walks the inputs and writes each result to its destination
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tpl_render::{FunctionRegistry, MiniJinjaEngine, RenderJob, Values};
//!
//! let mut values = Values::new();
//! values.load_file("values.yaml")?;
//!
//! let functions = FunctionRegistry::with_library();
//! let engine = MiniJinjaEngine::new(&functions);
//!
//! RenderJob::new(["templates/"])
//!     .output("out/")
//!     .execute(&engine, &values)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Template Language
//!
//! Templates use Jinja syntax (`{{ name }}`, `{% for %}`, `{% include %}`).
//! Text outside of tags is copied through unchanged, including the final
//! newline, and nothing is HTML-escaped.
//!
//! ## Errors
//!
//! Syntax errors and I/O errors always stop a job. Execution errors, such as
//! a missing key under the strict policy or a failing function, stop the job
//! only when it was built with `stop_on_error(true)`; otherwise the input is
//! skipped and reported in [`RenderReport::skipped`].

mod error;
pub mod extension;
pub mod functions;
pub mod render;
pub mod template;
pub mod values;

pub use error::{ExecDisabled, ExtensionError, RenderError, ValuesError};
pub use extension::{load_extension, namespace_for, ExtensionRegistry, ExtensionUnit};
pub use functions::{FunctionRegistry, FunctionSet, EXEC_FUNCTION};
pub use render::{
    map_output, strip_template_suffix, OutputBase, OutputTarget, RenderJob, RenderReport,
    RenderedInput, SkippedInput,
};
pub use template::{MiniJinjaEngine, MissingKeyPolicy, TemplateEngine};
pub use values::{Override, Values};

// Re-exported so extension units can build functions without a direct dependency.
pub use inventory;
pub use minijinja;
