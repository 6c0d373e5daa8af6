//! CLI argument parsing for tpl

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use tpl_render::Override;

const AFTER_HELP: &str = "Each template may be a file or a directory. Directories are \
    rendered recursively and mirrored under the output path.";

#[derive(Parser, Debug)]
#[command(name = "tpl")]
#[command(author, version, about = "Render templates against YAML/JSON values", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Comma-separated paths to YAML/JSON files containing values (only top-level keys are merged)
    #[arg(long = "values", value_name = "FILES", value_delimiter = ',')]
    pub values: Vec<PathBuf>,

    /// Additional value to inject, in the form key=value
    #[arg(long = "value", value_name = "KEY=VALUE")]
    pub overrides: Vec<Override>,

    /// File from which exec rules are read; `exec` is disabled without one
    #[arg(long, env = "TPL_EXEC_MAP_FILE", value_name = "FILE")]
    pub exec_map_file: Option<PathBuf>,

    /// What to do when a template fails to render
    #[arg(long, value_enum, default_value_t = OnError::Die)]
    pub on_error: OnError,

    /// Output file or directory ('-' for STDOUT)
    #[arg(short, long, default_value = "-")]
    pub out: String,

    /// Extension unit to load, as <namespace>.<dll extension>
    #[arg(long = "extension", value_name = "PATH")]
    pub extensions: Vec<PathBuf>,

    /// Additional template to make available to {% include %} by file name
    #[arg(long = "preload", value_name = "FILE")]
    pub preload: Vec<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Template files or directories to render
    #[arg(required = true, value_name = "TEMPLATES")]
    pub templates: Vec<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (0, 0) => LevelFilter::Info,
            (1, _) => LevelFilter::Debug,
            (v, _) if v > 1 => LevelFilter::Trace,
            (_, 1) => LevelFilter::Warn,
            (_, 2) => LevelFilter::Error,
            _ => LevelFilter::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    /// Stop at the first failure; missing keys are errors
    Die,
    /// Skip templates that fail; missing keys render as empty
    Ignore,
}

impl OnError {
    pub fn stop_on_error(self) -> bool {
        self == Self::Die
    }
}
