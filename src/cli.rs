use crate::compat::CompatFlag;
use crate::options::LaunchMode;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Enable verbose debug output.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) verbose: bool,
    /// Enable diagnostic logging to a file.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) debug: bool,
    /// Path to debug log file (used with --debug). Overrides DOOMRUNNER_DEBUG_LOG.
    #[arg(long, global = true)]
    pub(crate) debug_log: Option<String>,
    /// Path to a config file (TOML). Defaults to $XDG_CONFIG_HOME/doomrunner/config.toml.
    #[arg(long, global = true)]
    pub(crate) config: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Print the engine command line for a preset (or the last used one).
    Command {
        /// Preset to apply before generating the command.
        #[arg(long)]
        preset: Option<String>,
        /// Choose the preset with an interactive fuzzy picker.
        #[arg(long, default_value_t = false, conflicts_with = "preset")]
        pick: bool,
        /// Write paths absolute, overriding the config.
        #[arg(long, default_value_t = false, conflicts_with = "relative")]
        absolute: bool,
        /// Write paths relative to the engine directory, overriding the config.
        #[arg(long, default_value_t = false)]
        relative: bool,
        /// Print a shell-escaped command instead of the display form.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// List presets.
    Presets,
    /// Show every list with its current selection and missing entries.
    Lists {
        /// Preset to apply before listing.
        #[arg(long)]
        preset: Option<String>,
    },
    /// Write one preset to a standalone JSON file.
    PresetExport {
        #[arg(long)]
        preset: String,
        #[arg(long)]
        output: String,
    },
    /// Add a preset from a JSON file written by preset-export.
    PresetImport { file: String },
    /// Add a preset. Without a name it gets the next free "Preset N".
    PresetNew {
        #[arg(long)]
        name: Option<String>,
    },
    /// Copy a preset; the copy is named "<preset> - clone".
    PresetClone { preset: String },
    PresetRename { preset: String, new_name: String },
    PresetDelete { preset: String },
    /// Move a preset one position up or down.
    PresetMove {
        preset: String,
        #[arg(
            long,
            default_value_t = false,
            conflicts_with = "down",
            required_unless_present = "down"
        )]
        up: bool,
        #[arg(long, default_value_t = false)]
        down: bool,
    },
    /// Change what a preset selects. Options that are not given keep their stored value.
    PresetSave {
        preset: String,
        /// Engine name.
        #[arg(long)]
        engine: Option<String>,
        /// Config file name from the engine's config dir.
        #[arg(long = "engine-config")]
        engine_config: Option<String>,
        /// IWAD file name.
        #[arg(long)]
        iwad: Option<String>,
        /// Map pack path relative to the map dir. Repeat to select several.
        #[arg(long = "map-pack")]
        map_packs: Vec<String>,
        #[arg(long, value_enum)]
        launch_mode: Option<LaunchMode>,
        /// Map to start on with `--launch-mode selected-map`, e.g. MAP01 or E1M1.
        #[arg(long)]
        map: Option<String>,
        /// Save file name with `--launch-mode saved-game`.
        #[arg(long)]
        save: Option<String>,
        /// Extra engine arguments.
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
    },
    /// Reorder, remove or enable/disable mods of a preset. Positions start at 1.
    ModEdit {
        preset: String,
        #[arg(value_enum)]
        action: ModAction,
        #[arg(required = true, value_delimiter = ',')]
        positions: Vec<usize>,
    },
    /// Add a mod file to the end of a preset's mod list.
    ModAdd {
        preset: String,
        file: String,
        /// Insert at the top of the list instead.
        #[arg(long, default_value_t = false)]
        first: bool,
    },
    /// Edit compatibility flags shared by all presets.
    Compat {
        /// Flip a flag. Repeatable.
        #[arg(long, value_enum)]
        toggle: Vec<CompatFlag>,
        /// PrBoom compatibility level.
        #[arg(long, conflicts_with = "no_level")]
        level: Option<i32>,
        #[arg(long, default_value_t = false)]
        no_level: bool,
        /// Reset everything before applying the other options.
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Create a starter config file.
    ConfigInit {
        /// Overwrite existing config if present (skip overwrite prompt).
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print resolved config (path + values).
    ConfigShow,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ModAction {
    Up,
    Down,
    Delete,
    /// Flip the enabled state.
    Toggle,
}
