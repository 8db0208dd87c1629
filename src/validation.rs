use crate::fs_scan::PathProbe;
use crate::paths::path_to_string;
use std::path::Path;

/// Checks paths for one user action and keeps at most one warning for it.
///
/// Only the first failed check produces a message; later failures in the same action stay
/// silent. Failures never block anything.
pub(crate) struct PathChecker<'a, P: PathProbe + ?Sized> {
    probe: &'a P,
    message: Option<String>,
}

impl<'a, P: PathProbe + ?Sized> PathChecker<'a, P> {
    pub(crate) fn new(probe: &'a P) -> Self {
        PathChecker {
            probe,
            message: None,
        }
    }

    fn fail(&mut self, message: String) -> bool {
        if self.message.is_none() {
            self.message = Some(message);
        }
        false
    }

    pub(crate) fn check_non_empty_path(&mut self, path: &Path, subject: &str) -> bool {
        if path.as_os_str().is_empty() {
            return self.fail(format!("Path of {} is empty.", subject));
        }
        true
    }

    pub(crate) fn check_file_path(&mut self, path: &Path, subject: &str) -> bool {
        if !self.check_non_empty_path(path, subject) {
            return false;
        }
        if !self.probe.exists(path) {
            return self.fail(format!(
                "{} {} no longer exists.",
                capitalized(subject),
                path_to_string(path)
            ));
        }
        if !self.probe.is_file(path) {
            return self.fail(format!(
                "{} {} is not a file.",
                capitalized(subject),
                path_to_string(path)
            ));
        }
        true
    }

    pub(crate) fn check_dir_path(&mut self, path: &Path, subject: &str) -> bool {
        if !self.check_non_empty_path(path, subject) {
            return false;
        }
        if !self.probe.exists(path) {
            return self.fail(format!(
                "{} {} no longer exists.",
                capitalized(subject),
                path_to_string(path)
            ));
        }
        if !self.probe.is_dir(path) {
            return self.fail(format!(
                "{} {} is not a directory.",
                capitalized(subject),
                path_to_string(path)
            ));
        }
        true
    }

    /// The single message to show for this action, if any check failed.
    pub(crate) fn into_message(self) -> Option<String> {
        self.message
    }
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One row of a rendered list or tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DisplayItem {
    pub(crate) label: String,
    /// Nesting level; 0 for flat lists.
    pub(crate) depth: usize,
    pub(crate) current: bool,
    pub(crate) selected: bool,
    /// Enabled state for checkable entries (mods).
    pub(crate) checked: Option<bool>,
    /// The path behind the entry is missing or of the wrong kind.
    pub(crate) invalid: bool,
}

impl DisplayItem {
    pub(crate) fn render(&self) -> String {
        let marker = match (self.current, self.selected) {
            (true, _) => '>',
            (false, true) => '*',
            (false, false) => ' ',
        };
        let check = match self.checked {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };
        let invalid = if self.invalid { "  (missing)" } else { "" };
        format!(
            "{} {}{}{}{}",
            marker,
            "  ".repeat(self.depth),
            check,
            self.label,
            invalid
        )
    }
}
