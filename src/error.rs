use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Failures caused by the user asking for something the current list state can't do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListError {
    NothingSelected,
    /// An operation needs a selection in a specific list, e.g. an engine to launch.
    MissingSelection(&'static str),
    MultipleSelected,
    IndexOutOfRange { index: usize, len: usize },
    DuplicateName(String),
    EmptyName,
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::NothingSelected => write!(f, "No item is selected."),
            ListError::MissingSelection(what) => write!(f, "No {} is selected.", what),
            ListError::MultipleSelected => {
                write!(f, "Multiple items are selected, but only one is expected.")
            }
            ListError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} is out of range for a list of {} items.", index, len)
            }
            ListError::DuplicateName(name) => write!(f, "\"{}\" already exists.", name),
            ListError::EmptyName => write!(f, "Name must not be empty."),
        }
    }
}

impl Error for ListError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub(crate) dir: PathBuf,
    pub(crate) message: String,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to list directory {}: {}",
            self.dir.display(),
            self.message
        )
    }
}

impl Error for ScanError {}
