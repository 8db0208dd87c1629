use clap::{CommandFactory, Parser};
use std::{error::Error, fmt, path::PathBuf};

mod args;
mod cli;
mod command;
mod compat;
mod config;
mod debuglog;
mod dir_sync;
mod engine;
mod entities;
mod error;
mod fs_scan;
mod list;
mod map_tree;
mod options;
mod paths;
mod picker;
mod platform;
mod preset;
mod selection;
mod state;
mod util;
mod validation;

use cli::{Cli, Commands, ModAction};
use compat::CompatFlag;
use config::{
    Config, load_config, print_kv_table, resolve_config_path, show_config, write_config,
    write_default_config,
};
use debuglog::{debug_log_line, init_debug_logging};
use entities::Mod;
use error::ListError;
use fs_scan::{FsProbe, FsScanner, PathProbe};
use options::LaunchMode;
use paths::{EntityId, clean_path};
use picker::pick_preset;
use platform::Platform;
use state::{LauncherState, ListKind, PresetApplyReport};

#[derive(Debug)]
pub(crate) struct MyError(pub(crate) String);

impl fmt::Display for MyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for MyError {}

/// Relative paths in a config without `base_dir` resolve against the config file's directory.
fn default_base_dir(config_override: &Option<String>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_config_path(config_override)
        .ok()
        .and_then(|p| p.parent().map(|d| cwd.join(d)))
        .unwrap_or(cwd)
}

fn load_state(cli: &Cli, config: &Config) -> LauncherState {
    let mut state = LauncherState::from_config(config, &default_base_dir(&cli.config));
    for err in state.update_lists_from_dirs(&FsScanner) {
        eprintln!("DoomRunner: Warning: {}", err);
    }
    state
}

fn report_preset(report: &PresetApplyReport, verbose: bool) {
    if verbose {
        println!("DoomRunner (DEBUG): Applied preset \"{}\"", report.preset);
    }
    if report.is_clean() {
        return;
    }
    for stale in &report.stale {
        eprintln!(
            "DoomRunner: Warning: preset \"{}\" refers to a {} that no longer exists: {}",
            report.preset,
            stale.kind.label(),
            stale.id
        );
    }
}

/// Applies the named preset, the picked one, or the last used one, in that order.
fn select_preset(
    state: &mut LauncherState,
    name: Option<&str>,
    pick: bool,
    last_preset: Option<&str>,
    verbose: bool,
) -> Result<(), Box<dyn Error>> {
    let report = if let Some(name) = name {
        let index = state
            .presets
            .find(name)
            .ok_or_else(|| MyError(format!("No preset named \"{}\".", name)))?;
        state.apply_preset(index, &FsScanner)?
    } else if pick {
        let Some(index) = pick_preset(state.presets.presets())? else {
            return Err(MyError("No preset selected.".to_string()).into());
        };
        state.apply_preset(index, &FsScanner)?
    } else if let Some(last) = last_preset
        && state.presets.find(last).is_some()
    {
        state.apply_preset_named(last, &FsScanner)?
    } else {
        if verbose {
            println!("DoomRunner (DEBUG): No preset applied; using stored options");
        }
        return Ok(());
    };
    report_preset(&report, verbose);
    Ok(())
}

fn print_command(
    cli: &Cli,
    config: &Config,
    preset: Option<&str>,
    pick: bool,
    absolute: bool,
    relative: bool,
    raw: bool,
) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    select_preset(
        &mut state,
        preset,
        pick,
        config.last_preset.as_deref(),
        cli.verbose,
    )?;
    if absolute {
        state.toggle_absolute_paths(true);
    } else if relative {
        state.toggle_absolute_paths(false);
    }
    if raw {
        // Shell escaping takes over quoting.
        state.paths = state.paths.clone().with_quoting(false);
    }

    let platform = Platform::detect();
    if cli.verbose {
        println!("DoomRunner (DEBUG): Platform: {}", platform.label());
    }
    let command = state.generate_launch_command(&platform)?;

    if raw {
        println!("{}", command.to_shell_string());
    } else {
        println!("DoomRunner: Command: {}", command);
    }
    for permission in &command.extra_permissions {
        println!("DoomRunner: Sandbox permission: {}", permission);
    }
    if let Some(warning) = state.check_selected_paths(&FsProbe) {
        eprintln!("DoomRunner: Warning: {}", warning);
    }
    Ok(())
}

fn print_presets(cli: &Cli, config: &Config) {
    let state = load_state(cli, config);
    let rows: Vec<(String, String)> = state
        .presets
        .presets()
        .iter()
        .map(|p| {
            let engine = p
                .engine
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "(unset)".to_string());
            (p.name.clone(), engine)
        })
        .collect();
    if rows.is_empty() {
        println!("DoomRunner: No presets configured.");
        return;
    }
    print_kv_table("Presets", &rows);
}

fn print_lists(cli: &Cli, config: &Config, preset: Option<&str>) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    select_preset(
        &mut state,
        preset,
        false,
        config.last_preset.as_deref(),
        cli.verbose,
    )?;
    for kind in ListKind::ALL {
        let items = state.display_items(kind, &FsProbe);
        println!("DoomRunner: {}s ({})", kind.label(), items.len());
        for item in items {
            println!("  {}", item.render());
        }
    }
    Ok(())
}

fn export_preset(
    cli: &Cli,
    config: &Config,
    preset: &str,
    output: &str,
) -> Result<(), Box<dyn Error>> {
    let state = load_state(cli, config);
    let json = state.presets.export_preset(preset)?;
    std::fs::write(output, json)?;
    println!("DoomRunner: Exported preset \"{}\" to {}", preset, output);
    Ok(())
}

fn import_preset(cli: &Cli, config: &Config, file: &str) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    let json = std::fs::read_to_string(file)?;
    let index = state.presets.import_preset(&json)?;
    let name = state
        .presets
        .get(index)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    println!("DoomRunner: Imported preset \"{}\"", name);

    persist(cli, config, &state, config.last_preset.as_deref())
}

/// Writes the edited preset list back. Everything else stays as it was loaded, including
/// `last_preset` unless that preset is gone.
fn persist(
    cli: &Cli,
    config: &Config,
    state: &LauncherState,
    last_preset: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let mut updated = config.clone();
    updated.presets = state.to_config().presets;
    updated.last_preset = last_preset
        .filter(|name| state.presets.find(name).is_some())
        .map(str::to_string);
    write_config(&cli.config, &updated)
}

fn find_preset(state: &LauncherState, name: &str) -> Result<usize, Box<dyn Error>> {
    state
        .presets
        .find(name)
        .ok_or_else(|| MyError(format!("No preset named \"{}\".", name)).into())
}

fn position_by_name<T>(
    items: &[T],
    name: &str,
    what: &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<usize, Box<dyn Error>> {
    items
        .iter()
        .position(|item| name_of(item) == name)
        .ok_or_else(|| MyError(format!("No {} named \"{}\".", what, name)).into())
}

fn edit_presets(cli: &Cli, config: &Config, command: &Commands) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    let mut last_preset = config.last_preset.clone();

    match command {
        Commands::PresetNew { name } => {
            let index = match name {
                Some(name) => state.presets.add(name)?,
                None => state.presets.add_new()?,
            };
            if let Some(preset) = state.presets.get(index) {
                println!("DoomRunner: Added preset \"{}\"", preset.name);
            }
        }
        Commands::PresetClone { preset } => {
            let index = find_preset(&state, preset)?;
            state.presets.list_mut().choose_item(index);
            let copy = state.presets.clone_selected()?;
            if let Some(copy) = state.presets.get(copy) {
                println!("DoomRunner: Cloned \"{}\" as \"{}\"", preset, copy.name);
            }
        }
        Commands::PresetRename { preset, new_name } => {
            let index = find_preset(&state, preset)?;
            state.presets.rename(index, new_name)?;
            if last_preset.as_deref() == Some(preset.as_str()) {
                last_preset = Some(new_name.trim().to_string());
            }
            println!("DoomRunner: Renamed \"{}\" to \"{}\"", preset, new_name.trim());
        }
        Commands::PresetDelete { preset } => {
            let index = find_preset(&state, preset)?;
            state.presets.list_mut().choose_item(index);
            state.presets.delete_selected()?;
            println!("DoomRunner: Deleted preset \"{}\"", preset);
        }
        Commands::PresetMove { preset, up, down: _ } => {
            let index = find_preset(&state, preset)?;
            state.presets.list_mut().choose_item(index);
            if *up {
                state.presets.move_up_selected()?;
            } else {
                state.presets.move_down_selected()?;
            }
        }
        _ => return Err(MyError(format!("Not a preset edit: {:?}", command)).into()),
    }

    persist(cli, config, &state, last_preset.as_deref())
}

#[allow(clippy::too_many_arguments)]
fn save_preset(
    cli: &Cli,
    config: &Config,
    preset: &str,
    engine: Option<&str>,
    engine_config: Option<&str>,
    iwad: Option<&str>,
    map_packs: &[String],
    launch_mode: Option<LaunchMode>,
    map: Option<&str>,
    save: Option<&str>,
    args: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    let index = find_preset(&state, preset)?;
    let report = state.apply_preset(index, &FsScanner)?;
    report_preset(&report, cli.verbose);

    if let Some(name) = engine {
        let engine =
            position_by_name(state.engines.items(), name, "engine", |e| e.name.as_str())?;
        state.choose_engine(engine, &FsScanner)?;
    }
    if let Some(name) = engine_config {
        let entry =
            position_by_name(state.configs.items(), name, "config", |c| c.name.as_str())?;
        state.configs.choose_item(entry);
    }
    if let Some(name) = iwad {
        let iwad = position_by_name(state.iwads.items(), name, "IWAD", |i| i.name.as_str())?;
        state.iwads.choose_item(iwad);
    }
    if !map_packs.is_empty() {
        let map_dir = state
            .dirs
            .map_dir
            .clone()
            .ok_or_else(|| MyError("No map directory is configured.".to_string()))?;
        state.map_packs.deselect_all_and_unset_current();
        for relative in map_packs {
            let id = EntityId::from_path(&map_dir.join(relative));
            if !state.map_packs.select(&id) {
                return Err(MyError(format!(
                    "No map pack {} in {}.",
                    relative,
                    map_dir.display()
                ))
                .into());
            }
            if state.map_packs.current_id().is_none() {
                state.map_packs.set_current(&id);
            }
        }
    }
    if let Some(mode) = launch_mode {
        state.gameplay.launch_mode = mode;
    }
    if let Some(map) = map {
        state.gameplay.map_name = map.to_string();
    }
    if let Some(name) = save {
        let save = position_by_name(state.saves.items(), name, "save", |s| s.name.as_str())?;
        state.saves.choose_item(save);
    }
    if let Some(args) = args {
        state.cmd_args = args.to_string();
    }

    state.save_into_preset(index)?;
    println!("DoomRunner: Saved preset \"{}\"", preset);
    persist(cli, config, &state, config.last_preset.as_deref())
}

fn edit_mods(
    cli: &Cli,
    config: &Config,
    preset: &str,
    action: ModAction,
    positions: &[usize],
) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    let index = find_preset(&state, preset)?;
    let report = state.apply_preset(index, &FsScanner)?;
    report_preset(&report, cli.verbose);

    state.mods.deselect_all_and_unset_current();
    for &position in positions {
        let len = state.mods.len();
        if position == 0 || !state.mods.select(position - 1) {
            return Err(ListError::IndexOutOfRange { index: position, len }.into());
        }
    }
    if !state.mods.is_something_selected() {
        return Err(ListError::NothingSelected.into());
    }
    if let Some(&first) = state.mods.selected_indices().first() {
        state.mods.set_current(first);
    }

    match action {
        ModAction::Up => {
            state.mods.move_up_selected_items()?;
        }
        ModAction::Down => {
            state.mods.move_down_selected_items()?;
        }
        ModAction::Delete => {
            state.mods.delete_selected_items()?;
        }
        ModAction::Toggle => {
            let selected = state.mods.selected_indices().to_vec();
            for (i, m) in state.mods.iter_mut().enumerate() {
                if selected.contains(&i) {
                    m.checked = !m.checked;
                }
            }
        }
    }

    state.save_into_preset(index)?;
    for (i, m) in state.mods.iter().enumerate() {
        println!(
            "  {}. [{}] {}",
            i + 1,
            if m.checked { "x" } else { " " },
            m.name
        );
    }
    persist(cli, config, &state, config.last_preset.as_deref())
}

fn add_mod(
    cli: &Cli,
    config: &Config,
    preset: &str,
    file: &str,
    first: bool,
) -> Result<(), Box<dyn Error>> {
    let mut state = load_state(cli, config);
    let index = find_preset(&state, preset)?;
    let report = state.apply_preset(index, &FsScanner)?;
    report_preset(&report, cli.verbose);

    let path = clean_path(&std::env::current_dir()?.join(file));
    if !FsProbe.is_file(&path) {
        return Err(MyError(format!("Mod {} is not a file.", path.display())).into());
    }
    let item = Mod::from_path(path);
    if first {
        state.mods.prepend(item)?;
    } else {
        state.mods.append(item)?;
    }
    state.save_into_preset(index)?;
    println!("DoomRunner: Added {} to preset \"{}\"", file, preset);
    persist(cli, config, &state, config.last_preset.as_deref())
}

fn edit_compat(
    cli: &Cli,
    config: &Config,
    toggle: &[CompatFlag],
    level: Option<i32>,
    no_level: bool,
    clear: bool,
) -> Result<(), Box<dyn Error>> {
    let mut updated = config.clone();
    if clear {
        updated.compat.clear();
    }
    for &flag in toggle {
        updated.compat.toggle_flag(flag);
    }
    if level.is_some() || no_level {
        updated.compat.set_compat_level(level);
    }

    let (word1, word2) = updated.compat.flag_words();
    print_kv_table(
        "Compatibility",
        &[
            ("compatflags", word1.to_string()),
            ("compatflags2", word2.to_string()),
            (
                "complevel",
                updated
                    .compat
                    .compat_level()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "(unset)".to_string()),
            ),
        ],
    );
    write_config(&cli.config, &updated)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_debug_logging(cli.debug, &cli.debug_log)?;
    let config = load_config(&cli.config)?;
    debug_log_line(&format!("command: {:?}", cli.command));

    match &cli.command {
        Some(Commands::Command {
            preset,
            pick,
            absolute,
            relative,
            raw,
        }) => print_command(
            &cli,
            &config,
            preset.as_deref(),
            *pick,
            *absolute,
            *relative,
            *raw,
        ),
        Some(Commands::Presets) => {
            print_presets(&cli, &config);
            Ok(())
        }
        Some(Commands::Lists { preset }) => print_lists(&cli, &config, preset.as_deref()),
        Some(Commands::PresetExport { preset, output }) => {
            export_preset(&cli, &config, preset, output)
        }
        Some(Commands::PresetImport { file }) => import_preset(&cli, &config, file),
        Some(
            command @ (Commands::PresetNew { .. }
            | Commands::PresetClone { .. }
            | Commands::PresetRename { .. }
            | Commands::PresetDelete { .. }
            | Commands::PresetMove { .. }),
        ) => edit_presets(&cli, &config, command),
        Some(Commands::PresetSave {
            preset,
            engine,
            engine_config,
            iwad,
            map_packs,
            launch_mode,
            map,
            save,
            args,
        }) => save_preset(
            &cli,
            &config,
            preset,
            engine.as_deref(),
            engine_config.as_deref(),
            iwad.as_deref(),
            map_packs,
            *launch_mode,
            map.as_deref(),
            save.as_deref(),
            args.as_deref(),
        ),
        Some(Commands::ModEdit {
            preset,
            action,
            positions,
        }) => edit_mods(&cli, &config, preset, *action, positions),
        Some(Commands::ModAdd {
            preset,
            file,
            first,
        }) => add_mod(&cli, &config, preset, file, *first),
        Some(Commands::Compat {
            toggle,
            level,
            no_level,
            clear,
        }) => edit_compat(&cli, &config, toggle, *level, *no_level, *clear),
        Some(Commands::ConfigInit { force }) => write_default_config(&cli.config, *force),
        Some(Commands::ConfigShow) => show_config(&cli.config),
        None => {
            if config.engines.is_empty() {
                Cli::command().print_help()?;
                println!();
                return Ok(());
            }
            print_command(&cli, &config, None, false, false, false, false)
        }
    }
}
