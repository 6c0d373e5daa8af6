use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::template::{MissingKeyPolicy, TemplateEngine};
use crate::values::Values;

use super::output::{OutputBase, OutputTarget};

/// One invocation's worth of inputs and where their output goes.
///
/// ```rust,no_run
/// use tpl_render::{FunctionRegistry, MiniJinjaEngine, RenderJob, Values};
///
/// let engine = MiniJinjaEngine::new(&FunctionRegistry::with_library());
/// let report = RenderJob::new(["templates/"])
///     .output("rendered/")
///     .stop_on_error(false)
///     .execute(&engine, &Values::new())
///     .unwrap();
/// println!("{} rendered, {} skipped", report.rendered.len(), report.skipped.len());
/// ```
#[derive(Debug, Clone)]
pub struct RenderJob {
    inputs: Vec<PathBuf>,
    output: String,
    stop_on_error: bool,
}

impl RenderJob {
    /// A job writing to standard output that stops at the first error.
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: "-".to_string(),
            stop_on_error: true,
        }
    }

    /// Sets the output destination; `-` means standard output.
    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Whether execution errors abort the job (`true`) or skip the input.
    pub fn stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn policy(&self) -> MissingKeyPolicy {
        MissingKeyPolicy::from_stop_on_error(self.stop_on_error)
    }

    /// Renders every input, writing standard output to the process stdout.
    pub fn execute<E: TemplateEngine>(
        &self,
        engine: &E,
        values: &Values,
    ) -> Result<RenderReport, RenderError> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.execute_to(engine, values, &mut lock)
    }

    /// Renders every input, writing standard output to `stdout`.
    ///
    /// Inputs are processed depth first in the order given; directory
    /// children are processed in name order.
    pub fn execute_to<E: TemplateEngine>(
        &self,
        engine: &E,
        values: &Values,
        stdout: &mut dyn Write,
    ) -> Result<RenderReport, RenderError> {
        if self.inputs.is_empty() {
            return Err(RenderError::Config("at least one template path is required".to_string()));
        }

        let root = OutputBase::parse(&self.output);
        let mut pending: Vec<(PathBuf, OutputBase)> = self
            .inputs
            .iter()
            .rev()
            .map(|input| (input.clone(), root.clone()))
            .collect();
        let mut report = RenderReport::default();

        while let Some((input, base)) = pending.pop() {
            let meta =
                fs::metadata(&input).map_err(|err| RenderError::io("open input", &input, err))?;

            if meta.is_dir() {
                let child_base = base.descend(input.file_name());
                let mut children = list_dir(&input)?;
                children.sort();
                pending.extend(children.into_iter().rev().map(|c| (c, child_base.clone())));
                continue;
            }

            let target = base.target_for(input.file_name().unwrap_or_default());

            match self.render_file(engine, values, &input, &target, stdout) {
                Ok(()) => report.rendered.push(RenderedInput {
                    input,
                    output: target,
                }),
                Err(err) if !self.stop_on_error && !err.is_always_fatal() => {
                    log::warn!("Skipping {}: {}", input.display(), err);
                    report.skipped.push(SkippedInput { input, error: err });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    fn render_file<E: TemplateEngine>(
        &self,
        engine: &E,
        values: &Values,
        input: &Path,
        target: &OutputTarget,
        stdout: &mut dyn Write,
    ) -> Result<(), RenderError> {
        if target.path().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(RenderError::Config("output name cannot be blank".to_string()));
        }

        let source =
            fs::read_to_string(input).map_err(|err| RenderError::io("read template", input, err))?;
        let name = input.display().to_string();
        let text = engine.render(&name, &source, values, self.policy())?;

        log::info!("Rendering {} into {}", name, target);
        target.append(&text, stdout).map_err(|err| {
            let path = target.path().unwrap_or_else(|| Path::new("-"));
            RenderError::io("write output", path, err)
        })
    }
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    let entries = fs::read_dir(dir).map_err(|err| RenderError::io("list directory", dir, err))?;
    entries
        .map(|entry| {
            entry
                .map(|e| e.path())
                .map_err(|err| RenderError::io("list directory", dir, err))
        })
        .collect()
}

/// The outcome of a job that ran to completion.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub rendered: Vec<RenderedInput>,
    /// Inputs whose execution failed under the best-effort policy.
    pub skipped: Vec<SkippedInput>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug)]
pub struct RenderedInput {
    pub input: PathBuf,
    pub output: OutputTarget,
}

#[derive(Debug)]
pub struct SkippedInput {
    pub input: PathBuf,
    pub error: RenderError,
}
