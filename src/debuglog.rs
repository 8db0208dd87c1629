use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) const DEBUG_LOG_ENV_VAR: &str = "DOOMRUNNER_DEBUG_LOG";
const DEBUG_LOG_REL_PATH: &str = "doomrunner/debug.log";
const FALLBACK_DEBUG_LOG_NAME: &str = "doomrunner-debug.log";

static DEBUG_LOGGER: OnceLock<Mutex<File>> = OnceLock::new();

/// Where the log goes: the explicit path, then `DOOMRUNNER_DEBUG_LOG`, then the XDG state dir.
fn resolve_debug_log_path(
    path_override: Option<&str>,
    env_path: Option<String>,
    state_home: Option<String>,
    home: Option<String>,
) -> PathBuf {
    if let Some(path) = path_override {
        return PathBuf::from(path);
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(state) = state_home.filter(|s| !s.is_empty()) {
        return PathBuf::from(state).join(DEBUG_LOG_REL_PATH);
    }
    match home {
        Some(home) => PathBuf::from(home)
            .join(".local/state")
            .join(DEBUG_LOG_REL_PATH),
        None => std::env::temp_dir().join(FALLBACK_DEBUG_LOG_NAME),
    }
}

/// Runs are short, so the log is appended to and every run starts with a session line.
fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub(crate) fn init_debug_logging(
    enabled: bool,
    path_override: &Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !enabled {
        return Ok(());
    }
    let wanted = resolve_debug_log_path(
        path_override.as_deref(),
        std::env::var(DEBUG_LOG_ENV_VAR).ok(),
        std::env::var("XDG_STATE_HOME").ok(),
        std::env::var("HOME").ok(),
    );

    let (path, file) = match open_log(&wanted) {
        Ok(file) => (wanted, file),
        Err(err) => {
            let fallback = std::env::temp_dir().join(FALLBACK_DEBUG_LOG_NAME);
            eprintln!(
                "DoomRunner: Cannot write debug log {} ({}); using {}",
                wanted.display(),
                err,
                fallback.display()
            );
            let file = open_log(&fallback)?;
            (fallback, file)
        }
    };

    let _ = DEBUG_LOGGER.set(Mutex::new(file));
    println!("DoomRunner: Debug log enabled at {}", path.display());
    debug_log_line(&format!(
        "session start: doomrunner {} (pid {})",
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    ));
    Ok(())
}

/// Appends a timestamped line. A no-op until `init_debug_logging` has opened the log.
pub(crate) fn debug_log_line(message: &str) {
    let Some(logger) = DEBUG_LOGGER.get() else {
        return;
    };
    if let Ok(mut file) = logger.lock() {
        let _ = writeln!(file, "[{}] {}", unix_millis(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_prefers_flag_then_env_then_state_dir() {
        let some = |s: &str| Some(s.to_string());
        assert_eq!(
            resolve_debug_log_path(Some("/tmp/x.log"), some("/env.log"), None, None),
            PathBuf::from("/tmp/x.log")
        );
        assert_eq!(
            resolve_debug_log_path(None, some("/env.log"), some("/state"), None),
            PathBuf::from("/env.log")
        );
        assert_eq!(
            resolve_debug_log_path(None, some(""), some("/state"), some("/home/me")),
            PathBuf::from("/state/doomrunner/debug.log")
        );
        assert_eq!(
            resolve_debug_log_path(None, None, None, some("/home/me")),
            PathBuf::from("/home/me/.local/state/doomrunner/debug.log")
        );
    }

    #[test]
    fn open_log_creates_parent_dirs_and_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/debug.log");
        writeln!(open_log(&path).expect("open"), "one").expect("write");
        writeln!(open_log(&path).expect("reopen"), "two").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "one\ntwo\n");
    }
}
