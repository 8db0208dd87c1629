use crate::paths::{file_name_of, is_in_search_path};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Sandbox {
    #[default]
    None,
    Snap,
    Flatpak,
}

/// Facts about an engine executable that decide how it must be started.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ExecutableTraits {
    pub(crate) base_name: String,
    pub(crate) sandbox: Sandbox,
    /// Snap name or Flatpak application id; empty without a sandbox.
    pub(crate) sandbox_app_name: String,
    pub(crate) in_search_path: bool,
}

impl ExecutableTraits {
    pub(crate) fn resolve(executable: &Path, search_dirs: &[PathBuf]) -> Self {
        let base_name = file_name_of(executable);
        let (sandbox, sandbox_app_name) = if executable.starts_with("/snap") {
            (Sandbox::Snap, base_name.clone())
        } else if let Some(app_id) = flatpak_app_id(executable) {
            (Sandbox::Flatpak, app_id)
        } else {
            (Sandbox::None, String::new())
        };
        ExecutableTraits {
            in_search_path: is_in_search_path(executable, search_dirs),
            base_name,
            sandbox,
            sandbox_app_name,
        }
    }
}

/// `<id>` from `/var/lib/flatpak/app/<id>/...` or `~/.local/share/flatpak/app/<id>/...`.
fn flatpak_app_id(executable: &Path) -> Option<String> {
    let parts: Vec<String> = executable
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts
        .windows(3)
        .find(|w| w[0] == "flatpak" && w[1] == "app")
        .map(|w| w[2].clone())
        .filter(|id| !id.is_empty() && parts.len() > 3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OsFamily {
    Windows,
    Unix,
}

/// How the launcher process itself is confined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum LauncherConfinement {
    #[default]
    None,
    /// Running inside a Flatpak; executables under `app_dir` are reachable directly,
    /// anything else has to be started on the host.
    Flatpak { app_dir: PathBuf },
}

pub(crate) const FLATPAK_HOST_ESCAPE: &[&str] = &["flatpak-spawn", "--host"];

/// Capabilities of the system the launcher runs on. Detected once at startup and passed
/// to everything that depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Platform {
    pub(crate) os: OsFamily,
    pub(crate) launcher: LauncherConfinement,
    pub(crate) search_dirs: Vec<PathBuf>,
}

impl Platform {
    pub(crate) fn detect() -> Self {
        let os = if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Unix
        };
        let search_dirs = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        let in_flatpak = std::env::var("FLATPAK_ID").is_ok_and(|id| !id.is_empty())
            || Path::new("/.flatpak-info").exists();

        let platform = Platform {
            os,
            ..Platform::unix()
        }
        .with_search_dirs(search_dirs);
        if in_flatpak {
            platform.with_launcher(LauncherConfinement::Flatpak {
                app_dir: PathBuf::from("/app"),
            })
        } else {
            platform
        }
    }

    pub(crate) fn unix() -> Self {
        Platform {
            os: OsFamily::Unix,
            launcher: LauncherConfinement::None,
            search_dirs: Vec::new(),
        }
    }

    pub(crate) fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    pub(crate) fn with_launcher(mut self, launcher: LauncherConfinement) -> Self {
        self.launcher = launcher;
        self
    }

    pub(crate) fn label(&self) -> String {
        let os = match self.os {
            OsFamily::Windows => "windows",
            OsFamily::Unix => "unix",
        };
        match &self.launcher {
            LauncherConfinement::None => os.to_string(),
            LauncherConfinement::Flatpak { .. } => format!("{} (flatpak)", os),
        }
    }

    pub(crate) fn traits_of(&self, executable: &Path) -> ExecutableTraits {
        ExecutableTraits::resolve(executable, &self.search_dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_executable_uses_file_name_as_app() {
        let traits = ExecutableTraits::resolve(Path::new("/snap/bin/gzdoom"), &[]);
        assert_eq!(traits.sandbox, Sandbox::Snap);
        assert_eq!(traits.sandbox_app_name, "gzdoom");
    }

    #[test]
    fn flatpak_executable_uses_app_id() {
        let system = ExecutableTraits::resolve(
            Path::new("/var/lib/flatpak/app/org.zdoom.GZDoom/current/active/files/bin/gzdoom"),
            &[],
        );
        assert_eq!(system.sandbox, Sandbox::Flatpak);
        assert_eq!(system.sandbox_app_name, "org.zdoom.GZDoom");

        let user = ExecutableTraits::resolve(
            Path::new("/home/me/.local/share/flatpak/app/org.zdoom.GZDoom/x86_64/gzdoom"),
            &[],
        );
        assert_eq!(user.sandbox_app_name, "org.zdoom.GZDoom");
    }

    #[test]
    fn plain_executable_has_no_sandbox() {
        let dirs = vec![PathBuf::from("/usr/bin")];
        let traits = ExecutableTraits::resolve(Path::new("/usr/bin/gzdoom"), &dirs);
        assert_eq!(traits.sandbox, Sandbox::None);
        assert!(traits.sandbox_app_name.is_empty());
        assert!(traits.in_search_path);
        assert_eq!(traits.base_name, "gzdoom");
    }
}
