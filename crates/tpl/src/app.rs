//! Wiring from parsed flags to a finished render job.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use tpl_exec::ExecWhitelist;
use tpl_render::{
    ExtensionRegistry, FunctionRegistry, MiniJinjaEngine, RenderJob, RenderReport, TemplateEngine,
    Values,
};

use crate::cli::Cli;

pub fn run(cli: &Cli) -> Result<RenderReport> {
    let values = load_values(cli)?;
    let functions = build_functions(cli)?;

    let mut engine = MiniJinjaEngine::new(&functions);
    for path in &cli.preload {
        preload(&mut engine, path)?;
    }

    let report = RenderJob::new(cli.templates.iter().cloned())
        .output(cli.out.as_str())
        .stop_on_error(cli.on_error.stop_on_error())
        .execute(&engine, &values)
        .context("Failed to render templates")?;

    for skipped in &report.skipped {
        warn!("Skipped {}: {}", skipped.input.display(), skipped.error);
    }
    Ok(report)
}

fn load_values(cli: &Cli) -> Result<Values> {
    let mut values = Values::new();
    for path in &cli.values {
        values
            .load_file(path)
            .with_context(|| format!("Failed to load values from {:?}", path))?;
    }
    if !cli.overrides.is_empty() {
        info!("Loading values from command line");
        for ov in &cli.overrides {
            values.apply_override(ov.clone());
        }
    }
    Ok(values)
}

fn build_functions(cli: &Cli) -> Result<FunctionRegistry> {
    let mut functions = FunctionRegistry::with_library();

    if !cli.extensions.is_empty() {
        let units = ExtensionRegistry::discovered();
        let known = units.file_names().join(", ");
        for path in &cli.extensions {
            units
                .load(path, &mut functions)
                .with_context(|| format!("Failed to load extension (available: {})", known))?;
        }
    }

    if let Some(path) = &cli.exec_map_file {
        let whitelist = ExecWhitelist::load_file(path)
            .with_context(|| format!("Failed to load exec map {}", path.display()))?;
        info!(
            "Loaded {} exec rules from {}",
            whitelist.rules().len(),
            path.display()
        );
        functions.enable_exec(whitelist);
    }

    Ok(functions)
}

/// Registers a shared template under its file name.
fn preload(engine: &mut MiniJinjaEngine, path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Cannot preload {}: not a file", path.display()))?;
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read preload file {}", path.display()))?;
    engine.add_template(&name, &source)?;
    info!("Preloaded {} as {:?}", path.display(), name);
    Ok(())
}
