use crate::args::split_command_line_arguments;
use crate::engine::EngineFamily;
use crate::fs_scan::{DEHACKED_SUFFIXES, has_suffix};
use crate::options::{GameplayOptions, LaunchMode, MultiplayerOptions};
use crate::paths::{PathContext, file_name_of, path_to_string};
use crate::platform::{
    ExecutableTraits, FLATPAK_HOST_ESCAPE, LauncherConfinement, OsFamily, Platform, Sandbox,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything the launch command is built from, already resolved from the lists.
#[derive(Debug, Clone)]
pub(crate) struct LaunchInputs {
    pub(crate) engine_path: PathBuf,
    pub(crate) traits: ExecutableTraits,
    pub(crate) family: EngineFamily,
    /// Directory the engine is started from; every path argument is expressed against it.
    pub(crate) paths: PathContext,
    /// Directories a sandboxed engine has to be granted access to.
    pub(crate) accessible_dirs: Vec<PathBuf>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) iwad: Option<PathBuf>,
    pub(crate) map_packs: Vec<PathBuf>,
    pub(crate) save_game: Option<PathBuf>,
    pub(crate) save_dir: Option<PathBuf>,
    /// Enabled mods, in list order.
    pub(crate) mods: Vec<PathBuf>,
    pub(crate) gameplay: GameplayOptions,
    pub(crate) compat_args: Vec<String>,
    pub(crate) multiplayer: MultiplayerOptions,
    pub(crate) extra_args: String,
}

/// A ready-to-run command: one executable token and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ShellCommand {
    pub(crate) executable: String,
    pub(crate) arguments: Vec<String>,
    /// Sandbox permissions the command grants, e.g. `--filesystem=/home/me/wads`.
    pub(crate) extra_permissions: Vec<String>,
}

impl ShellCommand {
    pub(crate) fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.executable.as_str()).chain(self.arguments.iter().map(String::as_str))
    }

    /// Shell-escaped form, for pasting into a terminal.
    pub(crate) fn to_shell_string(&self) -> String {
        shell_words::join(self.tokens())
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.tokens().collect();
        write!(f, "{}", tokens.join(" "))
    }
}

/// Builds the engine command line.
///
/// The output depends on nothing but the two arguments. Argument positions matter to some
/// engines, so the order below is fixed: execution prefix, executable, config, IWAD, map
/// packs with the launch-mode reference, save dir, gameplay flags, mods, compatibility
/// fragment, multiplayer flags, extra arguments.
pub(crate) fn build_launch_command(inputs: &LaunchInputs, platform: &Platform) -> ShellCommand {
    let paths = &inputs.paths;
    let mut tokens: Vec<String> = Vec::new();
    let mut extra_permissions = Vec::new();

    let inside_own_app = match &platform.launcher {
        LauncherConfinement::Flatpak { app_dir } => {
            let own = inputs.engine_path.starts_with(app_dir);
            if !own {
                tokens.extend(FLATPAK_HOST_ESCAPE.iter().map(|s| s.to_string()));
            }
            own
        }
        LauncherConfinement::None => false,
    };

    if inside_own_app {
        tokens.push(file_name_of(&inputs.engine_path));
    } else {
        match inputs.traits.sandbox {
            Sandbox::Snap => {
                tokens.push("snap".to_string());
                tokens.push("run".to_string());
                tokens.push(inputs.traits.sandbox_app_name.clone());
            }
            Sandbox::Flatpak => {
                tokens.push("flatpak".to_string());
                tokens.push("run".to_string());
                for dir in &inputs.accessible_dirs {
                    let permission =
                        format!("--filesystem={}", path_to_string(&paths.absolute_path(dir)));
                    tokens.push(paths.maybe_quoted(&permission));
                    extra_permissions.push(permission);
                }
                tokens.push(inputs.traits.sandbox_app_name.clone());
            }
            Sandbox::None => tokens.push(executable_reference(inputs, platform)),
        }
    }

    if let Some(config) = &inputs.config {
        tokens.push("-config".to_string());
        tokens.push(path_arg(paths, config));
    }
    if let Some(iwad) = &inputs.iwad {
        tokens.push("-iwad".to_string());
        tokens.push(path_arg(paths, iwad));
    }
    for map_pack in &inputs.map_packs {
        push_file(&mut tokens, paths, map_pack);
    }
    tokens.extend(launch_mode_args(inputs));
    if let Some(save_dir) = &inputs.save_dir {
        tokens.push(inputs.family.save_dir_flag().to_string());
        tokens.push(path_arg(paths, save_dir));
    }
    tokens.extend(inputs.gameplay.gameplay_args(inputs.family));
    for mod_path in &inputs.mods {
        push_file(&mut tokens, paths, mod_path);
    }
    tokens.extend(inputs.compat_args.iter().cloned());
    tokens.extend(inputs.multiplayer.multiplayer_args(inputs.family));
    for arg in split_command_line_arguments(&inputs.extra_args) {
        if arg.quoted && paths.quote_paths() {
            tokens.push(format!("\"{}\"", arg.text));
        } else {
            tokens.push(arg.text);
        }
    }

    let mut tokens = tokens.into_iter();
    ShellCommand {
        executable: tokens.next().unwrap_or_default(),
        arguments: tokens.collect(),
        extra_permissions,
    }
}

fn executable_reference(inputs: &LaunchInputs, platform: &Platform) -> String {
    if inputs.traits.in_search_path {
        return inputs.traits.base_name.clone();
    }
    let mut exe = path_to_string(&inputs.paths.rebase_path(&inputs.engine_path));
    let has_dir = Path::new(&exe)
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty());
    if platform.os != OsFamily::Windows && !has_dir {
        exe = format!("./{}", exe);
    }
    inputs.paths.maybe_quoted(&exe)
}

fn path_arg(paths: &PathContext, path: &Path) -> String {
    paths.maybe_quoted(&path_to_string(&paths.rebase_path(path)))
}

fn push_file(tokens: &mut Vec<String>, paths: &PathContext, file: &Path) {
    let flag = if has_suffix(file, DEHACKED_SUFFIXES) {
        "-deh"
    } else {
        "-file"
    };
    tokens.push(flag.to_string());
    tokens.push(path_arg(paths, file));
}

fn launch_mode_args(inputs: &LaunchInputs) -> Vec<String> {
    match inputs.gameplay.launch_mode {
        LaunchMode::GameMenu => Vec::new(),
        LaunchMode::SelectedMap => inputs.family.map_args(&inputs.gameplay.map_name),
        LaunchMode::SavedGame => match &inputs.save_game {
            Some(save) => inputs
                .family
                .load_game_args(&path_arg(&inputs.paths, save), &file_name_of(save)),
            None => Vec::new(),
        },
    }
}
