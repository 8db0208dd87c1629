use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Position-independent key of a list entry.
///
/// Built from the lexically cleaned path of the entry (or from the name for entries
/// that have no path), so it survives re-ordering, re-insertion and directory rescans.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct EntityId(String);

impl EntityId {
    pub(crate) fn from_path(path: &Path) -> Self {
        EntityId(path_to_string(&clean_path(path)).replace('\\', "/"))
    }

    pub(crate) fn from_name(name: &str) -> Self {
        EntityId(name.to_string())
    }

    pub(crate) fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Resolves `.` and `..` without touching the file system.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// True when the executable's directory is one of the directories of the process search path,
/// which means it can (and on some systems must) be started by its bare name.
pub(crate) fn is_in_search_path(executable: &Path, search_dirs: &[PathBuf]) -> bool {
    let Some(parent) = executable.parent() else {
        return false;
    };
    if parent.as_os_str().is_empty() {
        return false;
    }
    let parent = clean_path(parent);
    search_dirs.iter().any(|dir| clean_path(dir) == parent)
}

/// Stores the path settings and converts paths between absolute and base-relative form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathContext {
    base_dir: PathBuf,
    use_absolute_paths: bool,
    quote_paths: bool,
}

impl PathContext {
    pub(crate) fn new(base_dir: impl Into<PathBuf>, use_absolute_paths: bool) -> Self {
        PathContext {
            base_dir: clean_path(&base_dir.into()),
            use_absolute_paths,
            quote_paths: false,
        }
    }

    pub(crate) fn with_quoting(mut self, quote_paths: bool) -> Self {
        self.quote_paths = quote_paths;
        self
    }

    pub(crate) fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub(crate) fn use_absolute_paths(&self) -> bool {
        self.use_absolute_paths
    }

    pub(crate) fn quote_paths(&self) -> bool {
        self.quote_paths
    }

    pub(crate) fn toggle_absolute_paths(&mut self, absolute: bool) {
        self.use_absolute_paths = absolute;
    }

    pub(crate) fn absolute_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            clean_path(path)
        } else {
            clean_path(&self.base_dir.join(path))
        }
    }

    /// Relative to the base dir. Paths with no common root (another drive) stay absolute.
    pub(crate) fn relative_path(&self, path: &Path) -> PathBuf {
        let target = self.absolute_path(path);
        let base = self.absolute_path(&self.base_dir);

        let target_parts: Vec<Component> = target.components().collect();
        let base_parts: Vec<Component> = base.components().collect();

        let common = target_parts
            .iter()
            .zip(base_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let shares_root = common > 0
            && !matches!(target_parts.first(), Some(Component::Normal(_)))
            && target_parts.first() == base_parts.first();
        if !shares_root {
            return target;
        }

        let mut relative = PathBuf::new();
        for _ in common..base_parts.len() {
            relative.push("..");
        }
        for part in &target_parts[common..] {
            relative.push(part.as_os_str());
        }
        if relative.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            relative
        }
    }

    pub(crate) fn rebase_path(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            return PathBuf::new();
        }
        if self.use_absolute_paths {
            self.absolute_path(path)
        } else {
            self.relative_path(path)
        }
    }

    pub(crate) fn maybe_quoted(&self, text: &str) -> String {
        if self.quote_paths && text.contains(' ') {
            format!("\"{}\"", text)
        } else {
            text.to_string()
        }
    }

    pub(crate) fn identity_of(&self, path: &Path) -> EntityId {
        EntityId::from_path(&self.absolute_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_path_resolves_dots_lexically() {
        assert_eq!(clean_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn relative_and_absolute_round_trip_through_the_base() {
        let ctx = PathContext::new("/home/user/doom", false);
        assert_eq!(
            ctx.rebase_path(Path::new("/home/user/doom/wads/doom2.wad")),
            PathBuf::from("wads/doom2.wad")
        );
        assert_eq!(
            ctx.rebase_path(Path::new("/home/user/mods/brutal.pk3")),
            PathBuf::from("../mods/brutal.pk3")
        );
        assert_eq!(ctx.rebase_path(Path::new("/home/user/doom")), PathBuf::from("."));

        let abs = PathContext::new("/home/user/doom", true);
        assert_eq!(
            abs.rebase_path(Path::new("wads/doom2.wad")),
            PathBuf::from("/home/user/doom/wads/doom2.wad")
        );
    }

    #[test]
    fn identity_ignores_spelling_of_the_same_path() {
        let ctx = PathContext::new("/games", false);
        assert_eq!(
            ctx.identity_of(Path::new("wads/../wads/doom.wad")),
            ctx.identity_of(Path::new("/games/wads/doom.wad"))
        );
    }

    #[test]
    fn quoting_only_applies_when_enabled_and_needed() {
        let ctx = PathContext::new("/", false);
        assert_eq!(ctx.maybe_quoted("a b"), "a b");
        let ctx = ctx.with_quoting(true);
        assert_eq!(ctx.maybe_quoted("a b"), "\"a b\"");
        assert_eq!(ctx.maybe_quoted("ab"), "ab");
    }

    #[test]
    fn search_path_matches_parent_directory() {
        let dirs = vec![PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")];
        assert!(is_in_search_path(Path::new("/usr/bin/gzdoom"), &dirs));
        assert!(!is_in_search_path(Path::new("/opt/gzdoom/gzdoom"), &dirs));
        assert!(!is_in_search_path(Path::new("gzdoom"), &dirs));
    }
}
