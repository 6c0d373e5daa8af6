use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// A command search path: extra directories in front of an inherited `PATH`.
///
/// The snapshot is taken once and never written back to the process
/// environment; children receive it explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    extra: Vec<PathBuf>,
    inherited: Option<OsString>,
}

impl SearchPath {
    /// Snapshots the current process `PATH` behind `extra`.
    pub fn inherit(extra: Vec<PathBuf>) -> Self {
        Self::with_base(extra, env::var_os("PATH"))
    }

    /// Builds a search path from an explicit base instead of the environment.
    pub fn with_base(extra: Vec<PathBuf>, inherited: Option<OsString>) -> Self {
        Self { extra, inherited }
    }

    /// Whether any directories were added in front of the inherited path.
    pub fn is_augmented(&self) -> bool {
        !self.extra.is_empty()
    }

    /// Directories in search order.
    pub fn dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.extra.clone();
        if let Some(inherited) = &self.inherited {
            dirs.extend(env::split_paths(inherited));
        }
        dirs
    }

    /// The platform-joined value suitable for a child's `PATH`.
    pub fn joined(&self) -> Result<OsString, env::JoinPathsError> {
        env::join_paths(self.dirs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_dirs_come_first() {
        let base = env::join_paths(["/usr/bin", "/bin"]).unwrap();
        let sp = SearchPath::with_base(vec![PathBuf::from("/opt/tools")], Some(base));
        assert_eq!(
            sp.dirs(),
            vec![
                PathBuf::from("/opt/tools"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin")
            ]
        );
        assert!(sp.is_augmented());
    }

    #[test]
    fn test_no_inherited_path() {
        let sp = SearchPath::with_base(vec![PathBuf::from("/a")], None);
        assert_eq!(sp.dirs(), vec![PathBuf::from("/a")]);
    }

    #[test]
    fn test_plain_inherit_is_not_augmented() {
        assert!(!SearchPath::inherit(Vec::new()).is_augmented());
    }

    #[cfg(unix)]
    #[test]
    fn test_joined_rejects_separator_in_dir() {
        let sp = SearchPath::with_base(vec![PathBuf::from("/a:/b")], None);
        assert!(sp.joined().is_err());
    }
}
