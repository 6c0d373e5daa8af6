//! Where rendered text goes.
//!
//! An output destination string (the `-o` flag) is parsed once into an
//! [`OutputBase`]. Descending into an input directory produces a new base,
//! and each input file maps to a concrete [`OutputTarget`].

use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{is_separator, Path, PathBuf};

const TEMPLATE_EXTENSIONS: &[&str] = &["tpl", "tmpl"];

/// A parsed output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputBase {
    /// `-` or empty: everything goes to standard output.
    Stdout,
    /// A path written with a trailing separator, or a directory derived
    /// while descending. Files land inside it.
    Dir(PathBuf),
    /// Any other path. Files land inside it if it is an existing directory,
    /// otherwise they are all appended to it.
    Path(PathBuf),
}

impl OutputBase {
    pub fn parse(base: &str) -> Self {
        if base.is_empty() || base == "-" {
            Self::Stdout
        } else if base.ends_with(is_separator) {
            Self::Dir(PathBuf::from(base))
        } else {
            Self::Path(PathBuf::from(base))
        }
    }

    /// The base for the children of an input directory named `dir_name`.
    ///
    /// Standard output stays standard output; anything else becomes the
    /// directory `<base>/<dir_name>`.
    pub fn descend(&self, dir_name: Option<&OsStr>) -> Self {
        match self {
            Self::Stdout => Self::Stdout,
            Self::Dir(base) | Self::Path(base) => match dir_name {
                Some(name) => Self::Dir(base.join(name)),
                None => Self::Dir(base.clone()),
            },
        }
    }

    /// The destination for an input file whose base name is `leaf`.
    pub fn target_for(&self, leaf: &OsStr) -> OutputTarget {
        match self {
            Self::Stdout => OutputTarget::Stdout,
            Self::Dir(dir) => OutputTarget::File(dir.join(strip_template_extension(leaf))),
            Self::Path(path) if path.is_dir() => {
                OutputTarget::File(path.join(strip_template_extension(leaf)))
            }
            Self::Path(path) => OutputTarget::File(path.clone()),
        }
    }
}

/// Maps an input file's base name onto an output destination string.
///
/// ```rust
/// use std::path::PathBuf;
/// use tpl_render::{map_output, OutputTarget};
///
/// assert_eq!(map_output("-", "a.txt.tpl"), OutputTarget::Stdout);
/// assert_eq!(
///     map_output("out/", "a.txt.tpl"),
///     OutputTarget::File(PathBuf::from("out/a.txt"))
/// );
/// ```
pub fn map_output(base: &str, leaf: &str) -> OutputTarget {
    OutputBase::parse(base).target_for(OsStr::new(leaf))
}

/// Removes one trailing `.tpl` or `.tmpl` from a file name.
///
/// A name that is nothing but the suffix is left alone.
pub fn strip_template_suffix(leaf: &str) -> &str {
    strip_template_extension(OsStr::new(leaf))
        .to_str()
        .unwrap_or(leaf)
}

/// [`strip_template_suffix`] for names that need not be UTF-8.
fn strip_template_extension(leaf: &OsStr) -> &OsStr {
    let path = Path::new(leaf);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if TEMPLATE_EXTENSIONS.iter().any(|known| ext == *known) => stem,
        _ => leaf,
    }
}

/// A concrete destination for one rendered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout => None,
            Self::File(path) => Some(path),
        }
    }

    /// Appends `text` to the destination.
    ///
    /// Files are created along with their parent directories. `stdout` is
    /// used for [`OutputTarget::Stdout`].
    pub fn append(&self, text: &str, stdout: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Stdout => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(text.as_bytes())?;
                file.sync_all()
            }
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("STDOUT"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_stdout_bases() {
        assert_eq!(OutputBase::parse(""), OutputBase::Stdout);
        assert_eq!(OutputBase::parse("-"), OutputBase::Stdout);
        assert_eq!(map_output("", "x.tpl"), OutputTarget::Stdout);
    }

    #[test]
    fn test_trailing_separator_is_dir() {
        assert_eq!(
            map_output("out/", "test.txt.tmpl"),
            OutputTarget::File(PathBuf::from("out/test.txt"))
        );
    }

    #[test]
    fn test_existing_dir_without_separator() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();
        assert_eq!(
            map_output(base, "a.txt.tpl"),
            OutputTarget::File(dir.path().join("a.txt"))
        );
    }

    #[test]
    fn test_other_path_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("combined.txt");
        let base = file.to_str().unwrap();
        assert_eq!(map_output(base, "a.tpl"), OutputTarget::File(file.clone()));
        assert_eq!(map_output(base, "b.tpl"), OutputTarget::File(file));
    }

    #[test]
    fn test_descend() {
        let name = Some(OsStr::new("in"));
        assert_eq!(OutputBase::Stdout.descend(name), OutputBase::Stdout);
        assert_eq!(
            OutputBase::parse("out/").descend(name),
            OutputBase::Dir(PathBuf::from("out/in"))
        );
        assert_eq!(
            OutputBase::parse("out").descend(name),
            OutputBase::Dir(PathBuf::from("out/in"))
        );
        assert_eq!(
            OutputBase::parse("out").descend(None),
            OutputBase::Dir(PathBuf::from("out"))
        );
    }

    #[test]
    fn test_strip_only_one_suffix() {
        assert_eq!(strip_template_suffix("a.tpl.tpl"), "a.tpl");
        assert_eq!(strip_template_suffix("a.tmpl.tpl"), "a.tmpl");
        assert_eq!(strip_template_suffix("a.txt"), "a.txt");
        assert_eq!(strip_template_suffix("a.TPL"), "a.TPL");
        assert_eq!(strip_template_suffix(".tpl"), ".tpl");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_leaf_keeps_its_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let leaf = OsStr::from_bytes(b"caf\xe9.txt.tpl");
        assert_eq!(
            OutputBase::parse("out/").target_for(leaf),
            OutputTarget::File(Path::new("out").join(OsStr::from_bytes(b"caf\xe9.txt")))
        );
    }

    #[test]
    fn test_append_creates_parents_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::File(dir.path().join("a/b/out.txt"));
        let mut sink: Vec<u8> = Vec::new();
        target.append("one\n", &mut sink).unwrap();
        target.append("two\n", &mut sink).unwrap();
        assert!(sink.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("a/b/out.txt")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[test]
    fn test_append_to_stdout_sink() {
        let mut sink: Vec<u8> = Vec::new();
        OutputTarget::Stdout.append("hi", &mut sink).unwrap();
        assert_eq!(sink, b"hi");
        assert_eq!(OutputTarget::Stdout.to_string(), "STDOUT");
    }

    proptest! {
        #[test]
        fn prop_strip_removes_exactly_one_suffix(
            stem in "[a-z0-9_.]{1,12}",
            suffix in prop::sample::select(vec![".tpl", ".tmpl"]),
        ) {
            let leaf = format!("{}{}", stem, suffix);
            prop_assert_eq!(strip_template_suffix(&leaf), stem.as_str());
        }

        #[test]
        fn prop_other_names_unchanged(leaf in "[a-z0-9_]{1,12}(\\.[a-z]{1,3})?") {
            prop_assume!(!leaf.ends_with(".tpl") && !leaf.ends_with(".tmpl"));
            prop_assert_eq!(strip_template_suffix(&leaf), leaf.as_str());
        }
    }
}
