use crate::error::ScanError;
use crate::paths::extension_of;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub(crate) const IWAD_SUFFIXES: &[&str] =
    &["wad", "iwad", "pk3", "ipk3", "pk7", "ipk7", "pkz", "pke"];
pub(crate) const MAP_SUFFIXES: &[&str] = &["wad", "pk3", "pk7", "zip", "7z", "deh", "bex"];
pub(crate) const CONFIG_SUFFIXES: &[&str] = &["ini", "cfg"];
pub(crate) const SAVE_SUFFIXES: &[&str] = &["zds", "dsg"];
pub(crate) const DEHACKED_SUFFIXES: &[&str] = &["deh", "bex"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryTypes {
    Files,
    Both,
}

impl EntryTypes {
    fn accepts(self, is_dir: bool, is_file: bool) -> bool {
        match self {
            EntryTypes::Files => is_file,
            EntryTypes::Both => is_file || is_dir,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedEntry {
    pub(crate) path: PathBuf,
    pub(crate) is_dir: bool,
    pub(crate) is_file: bool,
}

impl ScannedEntry {
    pub(crate) fn file(path: impl Into<PathBuf>) -> Self {
        ScannedEntry {
            path: path.into(),
            is_dir: false,
            is_file: true,
        }
    }

    pub(crate) fn dir(path: impl Into<PathBuf>) -> Self {
        ScannedEntry {
            path: path.into(),
            is_dir: true,
            is_file: false,
        }
    }

    pub(crate) fn has_suffix(&self, suffixes: &[&str]) -> bool {
        has_suffix(&self.path, suffixes)
    }
}

pub(crate) fn has_suffix(path: &Path, suffixes: &[&str]) -> bool {
    let ext = extension_of(path);
    !ext.is_empty() && suffixes.iter().any(|s| *s == ext)
}

/// Enumerates directory entries. The order of the returned entries is kept by every consumer.
pub(crate) trait DirScanner {
    fn scan(
        &self,
        dir: &Path,
        recursive: bool,
        types: EntryTypes,
    ) -> Result<Vec<ScannedEntry>, ScanError>;
}

pub(crate) trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Walks the real file system, entries sorted by file name within each directory.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FsScanner;

impl DirScanner for FsScanner {
    fn scan(
        &self,
        dir: &Path,
        recursive: bool,
        types: EntryTypes,
    ) -> Result<Vec<ScannedEntry>, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError {
                dir: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }
        let mut walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| ScanError {
                dir: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let file_type = entry.file_type();
            let (is_dir, is_file) = (file_type.is_dir(), file_type.is_file());
            if !types.accepts(is_dir, is_file) {
                continue;
            }
            entries.push(if is_dir {
                ScannedEntry::dir(entry.into_path())
            } else {
                ScannedEntry::file(entry.into_path())
            });
        }
        Ok(entries)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// In-memory directory tree for tests. Keys are directories, values their direct entries.
    #[derive(Debug, Default)]
    pub(crate) struct FakeFs {
        pub(crate) dirs: RefCell<BTreeMap<PathBuf, Vec<ScannedEntry>>>,
        pub(crate) failing: RefCell<Vec<PathBuf>>,
    }

    impl FakeFs {
        pub(crate) fn new() -> Self {
            FakeFs::default()
        }

        pub(crate) fn add_file(&self, path: &str) {
            let path = PathBuf::from(path);
            self.ensure_parents(&path);
            let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let mut dirs = self.dirs.borrow_mut();
            let entries = dirs.entry(parent).or_default();
            if !entries.iter().any(|e| e.path == path) {
                entries.push(ScannedEntry::file(path));
            }
        }

        pub(crate) fn remove_file(&self, path: &str) {
            let path = PathBuf::from(path);
            for entries in self.dirs.borrow_mut().values_mut() {
                entries.retain(|e| e.path != path);
            }
        }

        pub(crate) fn fail_on(&self, dir: &str) {
            self.failing.borrow_mut().push(PathBuf::from(dir));
        }

        fn ensure_parents(&self, path: &Path) {
            let mut ancestors: Vec<&Path> = path.ancestors().skip(1).collect();
            ancestors.reverse();
            let mut dirs = self.dirs.borrow_mut();
            for window in ancestors.windows(2) {
                let (parent, child) = (window[0], window[1]);
                let entries = dirs.entry(parent.to_path_buf()).or_default();
                if !entries.iter().any(|e| e.path == child) {
                    entries.push(ScannedEntry::dir(child));
                }
                dirs.entry(child.to_path_buf()).or_default();
            }
        }

        fn collect(
            &self,
            dir: &Path,
            recursive: bool,
            types: EntryTypes,
            out: &mut Vec<ScannedEntry>,
        ) {
            let entries = self.dirs.borrow().get(dir).cloned().unwrap_or_default();
            for entry in entries {
                if types.accepts(entry.is_dir, entry.is_file) {
                    out.push(entry.clone());
                }
                if recursive && entry.is_dir {
                    self.collect(&entry.path, recursive, types, out);
                }
            }
        }
    }

    impl DirScanner for FakeFs {
        fn scan(
            &self,
            dir: &Path,
            recursive: bool,
            types: EntryTypes,
        ) -> Result<Vec<ScannedEntry>, ScanError> {
            if self.failing.borrow().iter().any(|d| d == dir) {
                return Err(ScanError {
                    dir: dir.to_path_buf(),
                    message: "permission denied".to_string(),
                });
            }
            let mut out = Vec::new();
            self.collect(dir, recursive, types, &mut out);
            Ok(out)
        }
    }

    impl PathProbe for FakeFs {
        fn exists(&self, path: &Path) -> bool {
            self.is_dir(path) || self.is_file(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.dirs
                .borrow()
                .values()
                .any(|entries| entries.iter().any(|e| e.is_file && e.path == path))
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.borrow().contains_key(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn fs_scanner_lists_sorted_files_and_respects_recursion() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("b.wad"), b"").expect("write");
        fs::write(dir.path().join("a.wad"), b"").expect("write");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        fs::write(dir.path().join("sub").join("c.pk3"), b"").expect("write");

        let flat = FsScanner
            .scan(dir.path(), false, EntryTypes::Files)
            .expect("scan");
        let names: Vec<_> = flat
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.wad", "b.wad"]);

        let deep = FsScanner
            .scan(dir.path(), true, EntryTypes::Files)
            .expect("scan");
        assert_eq!(deep.len(), 3);

        let both = FsScanner
            .scan(dir.path(), true, EntryTypes::Both)
            .expect("scan");
        let dirs: Vec<_> = both.iter().filter(|e| e.is_dir).collect();
        assert_eq!(both.len(), 4);
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].is_file);
    }

    #[test]
    fn fs_scanner_reports_missing_directory() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let err = FsScanner
            .scan(&missing, false, EntryTypes::Files)
            .expect_err("missing dir");
        assert_eq!(err.dir, missing);
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        assert!(has_suffix(Path::new("/x/DOOM2.WAD"), IWAD_SUFFIXES));
        assert!(!has_suffix(Path::new("/x/readme.txt"), IWAD_SUFFIXES));
        assert!(!has_suffix(Path::new("/x/noext"), IWAD_SUFFIXES));
    }
}
