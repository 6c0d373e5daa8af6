//! Extension units shipped with the `tpl` binary.
//!
//! Load one with `--extension <namespace>.<dll extension>`, e.g.
//! `--extension path.so` on Linux, which makes `path_base`, `path_dir`,
//! `path_ext` and `path_join` available to templates.

use std::path::{Path, PathBuf};

use minijinja::value::Rest;
use minijinja::Value;
use tpl_render::{ExtensionUnit, FunctionSet};

inventory::submit! {
    ExtensionUnit::new("path", path_functions)
}

fn path_functions() -> FunctionSet {
    let mut set = FunctionSet::new();
    set.insert("base".into(), Value::from_function(base));
    set.insert("dir".into(), Value::from_function(dir));
    set.insert("ext".into(), Value::from_function(ext));
    set.insert("join".into(), Value::from_function(join));
    set
}

fn base(p: String) -> String {
    Path::new(&p)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn dir(p: String) -> String {
    Path::new(&p)
        .parent()
        .map(|parent| parent.display().to_string())
        .unwrap_or_default()
}

fn ext(p: String) -> String {
    Path::new(&p)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn join(parts: Rest<String>) -> String {
    parts.iter().collect::<PathBuf>().display().to_string()
}
