use crate::command::{LaunchInputs, ShellCommand, build_launch_command};
use crate::compat::CompatibilityOptions;
use crate::config::Config;
use crate::debuglog::debug_log_line;
use crate::dir_sync::{ReloadSummary, update_list_from_dir, update_map_tree_from_dir};
use crate::entities::{Engine, FileEntry, Identified, Iwad, Mod};
use crate::error::{ListError, ScanError};
use crate::fs_scan::{
    CONFIG_SUFFIXES, DirScanner, IWAD_SUFFIXES, MAP_SUFFIXES, PathProbe, SAVE_SUFFIXES,
};
use crate::list::EntityList;
use crate::map_tree::MapTree;
use crate::options::{GameplayOptions, LaunchMode, MultiplayerOptions};
use crate::paths::{EntityId, PathContext, path_to_string};
use crate::platform::Platform;
use crate::preset::{Preset, PresetStore};
use crate::selection::current_id;
use crate::validation::{DisplayItem, PathChecker};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LauncherDirs {
    pub(crate) iwad_dir: Option<PathBuf>,
    /// List IWADs from `iwad_dir` instead of keeping a manual list.
    pub(crate) iwads_from_dir: bool,
    pub(crate) iwad_subdirs: bool,
    pub(crate) map_dir: Option<PathBuf>,
    /// Alternative save directory; without it saves live in the engine's config dir.
    pub(crate) save_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    Engines,
    Configs,
    Iwads,
    MapPacks,
    Saves,
    Mods,
    Presets,
}

impl ListKind {
    pub(crate) const ALL: [ListKind; 7] = [
        ListKind::Presets,
        ListKind::Engines,
        ListKind::Configs,
        ListKind::Iwads,
        ListKind::MapPacks,
        ListKind::Mods,
        ListKind::Saves,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ListKind::Engines => "engine",
            ListKind::Configs => "config",
            ListKind::Iwads => "IWAD",
            ListKind::MapPacks => "map pack",
            ListKind::Saves => "save",
            ListKind::Mods => "mod",
            ListKind::Presets => "preset",
        }
    }
}

/// A preset entry that points at something no longer in its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StaleReference {
    pub(crate) kind: ListKind,
    pub(crate) id: EntityId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PresetApplyReport {
    pub(crate) preset: String,
    pub(crate) stale: Vec<StaleReference>,
}

impl PresetApplyReport {
    pub(crate) fn is_clean(&self) -> bool {
        self.stale.is_empty()
    }
}

/// Everything the launcher holds: the lists, their selections, the options and path settings.
///
/// All paths are kept absolute. The absolute/relative toggle only decides how paths are
/// written to the command line and to the config file.
#[derive(Debug, Clone)]
pub(crate) struct LauncherState {
    pub(crate) paths: PathContext,
    pub(crate) dirs: LauncherDirs,
    pub(crate) engines: EntityList<Engine>,
    pub(crate) configs: EntityList<FileEntry>,
    pub(crate) iwads: EntityList<Iwad>,
    pub(crate) map_packs: MapTree,
    pub(crate) saves: EntityList<FileEntry>,
    pub(crate) mods: EntityList<Mod>,
    pub(crate) presets: PresetStore,
    pub(crate) gameplay: GameplayOptions,
    pub(crate) compat: CompatibilityOptions,
    pub(crate) multiplayer: MultiplayerOptions,
    pub(crate) cmd_args: String,
}

impl LauncherState {
    pub(crate) fn new(paths: PathContext) -> Self {
        LauncherState {
            paths,
            dirs: LauncherDirs::default(),
            engines: EntityList::new(),
            configs: EntityList::new(),
            iwads: EntityList::new(),
            map_packs: MapTree::new(),
            saves: EntityList::new(),
            mods: EntityList::new(),
            presets: PresetStore::new(),
            gameplay: GameplayOptions::default(),
            compat: CompatibilityOptions::default(),
            multiplayer: MultiplayerOptions::default(),
            cmd_args: String::new(),
        }
    }

    /// Builds the state from a loaded config. Relative paths are resolved against the
    /// configured base dir, or `default_base` when none is set.
    pub(crate) fn from_config(config: &Config, default_base: &Path) -> Self {
        let base = config
            .base_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_base.to_path_buf());
        let paths = PathContext::new(base, config.use_absolute_paths.unwrap_or(false))
            .with_quoting(config.quote_paths.unwrap_or(false));
        let abs = |p: &Path| paths.absolute_path(p);
        let abs_opt = |p: &Option<String>| {
            p.as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| paths.absolute_path(Path::new(s)))
        };
        let abs_id = |id: &EntityId| paths.identity_of(&id.to_path());

        let mut state = LauncherState::new(paths.clone());
        state.dirs = LauncherDirs {
            iwad_dir: abs_opt(&config.iwad_dir),
            iwads_from_dir: config.iwads_from_dir.unwrap_or(false),
            iwad_subdirs: config.iwad_subdirs.unwrap_or(false),
            map_dir: abs_opt(&config.map_dir),
            save_dir: abs_opt(&config.save_dir),
        };
        state.engines = EntityList::from_items(
            config
                .engines
                .iter()
                .map(|e| {
                    let mut engine = Engine::from_path(abs(&e.path));
                    if !e.name.trim().is_empty() {
                        engine.name = e.name.clone();
                    }
                    engine.config_dir = e.config_dir.as_deref().map(abs);
                    engine.family = e.family;
                    engine
                })
                .collect(),
        );
        state.iwads = EntityList::from_items(
            config
                .iwads
                .iter()
                .map(|i| Iwad {
                    path: abs(&i.path),
                    ..i.clone()
                })
                .collect(),
        );
        state.mods = EntityList::from_items(
            config
                .mods
                .iter()
                .map(|m| Mod {
                    path: abs(&m.path),
                    ..m.clone()
                })
                .collect(),
        );
        state.presets = PresetStore::from_presets(
            config
                .presets
                .iter()
                .map(|p| Preset {
                    engine: p.engine.as_ref().map(abs_id),
                    config: p.config.as_ref().map(abs_id),
                    iwad: p.iwad.as_ref().map(abs_id),
                    map_packs: p.map_packs.iter().map(abs_id).collect(),
                    mods: p
                        .mods
                        .iter()
                        .map(|m| Mod {
                            path: abs(&m.path),
                            ..m.clone()
                        })
                        .collect(),
                    save_file: p.save_file.as_ref().map(abs_id),
                    ..p.clone()
                })
                .collect(),
        );
        state.presets.list_mut().deselect_all_and_unset_current();
        state.gameplay = config.gameplay.clone();
        state.compat = config.compat.clone();
        state.multiplayer = config.multiplayer.clone();
        state.cmd_args = config.cmd_args.clone().unwrap_or_default();
        state
    }

    /// The persisted form. Paths are written absolute or base-relative per the toggle.
    pub(crate) fn to_config(&self) -> Config {
        let rebase = |p: &Path| self.paths.rebase_path(p);
        let rebase_str = |p: &Option<PathBuf>| p.as_ref().map(|p| path_to_string(&rebase(p)));
        let rebase_id = |id: &EntityId| EntityId::from_path(&rebase(&id.to_path()));
        let rebase_mod = |m: &Mod| Mod {
            path: rebase(&m.path),
            ..m.clone()
        };

        Config {
            base_dir: Some(path_to_string(self.paths.base_dir())),
            use_absolute_paths: Some(self.paths.use_absolute_paths()),
            quote_paths: Some(self.paths.quote_paths()),
            iwad_dir: rebase_str(&self.dirs.iwad_dir),
            iwads_from_dir: Some(self.dirs.iwads_from_dir),
            iwad_subdirs: Some(self.dirs.iwad_subdirs),
            map_dir: rebase_str(&self.dirs.map_dir),
            save_dir: rebase_str(&self.dirs.save_dir),
            last_preset: self.presets.current().map(|p| p.name.clone()),
            cmd_args: Some(self.cmd_args.clone()).filter(|a| !a.is_empty()),
            engines: self
                .engines
                .iter()
                .map(|e| Engine {
                    path: rebase(&e.path),
                    config_dir: e.config_dir.as_deref().map(rebase),
                    ..e.clone()
                })
                .collect(),
            iwads: if self.dirs.iwads_from_dir {
                Vec::new()
            } else {
                self.iwads
                    .iter()
                    .map(|i| Iwad {
                        path: rebase(&i.path),
                        ..i.clone()
                    })
                    .collect()
            },
            mods: self.mods.iter().map(rebase_mod).collect(),
            gameplay: self.gameplay.clone(),
            compat: self.compat.clone(),
            multiplayer: self.multiplayer.clone(),
            presets: self
                .presets
                .presets()
                .iter()
                .map(|p| Preset {
                    engine: p.engine.as_ref().map(rebase_id),
                    config: p.config.as_ref().map(rebase_id),
                    iwad: p.iwad.as_ref().map(rebase_id),
                    map_packs: p.map_packs.iter().map(rebase_id).collect(),
                    mods: p.mods.iter().map(rebase_mod).collect(),
                    save_file: p.save_file.as_ref().map(rebase_id),
                    ..p.clone()
                })
                .collect(),
        }
    }

    // directory-backed lists

    /// Reloads every directory-backed list. A failing directory leaves its list as it was;
    /// the failures are returned so the caller can warn about them.
    pub(crate) fn update_lists_from_dirs<S: DirScanner + ?Sized>(
        &mut self,
        scanner: &S,
    ) -> Vec<ScanError> {
        let mut errors = Vec::new();
        if self.dirs.iwads_from_dir
            && let Some(dir) = self.dirs.iwad_dir.clone()
            && let Err(err) = update_list_from_dir(
                &mut self.iwads,
                scanner,
                &dir,
                self.dirs.iwad_subdirs,
                |e| e.has_suffix(IWAD_SUFFIXES).then(|| Iwad::from_path(&e.path)),
            )
        {
            errors.push(err);
        }
        if let Some(dir) = self.dirs.map_dir.clone()
            && let Err(err) = update_map_tree_from_dir(&mut self.map_packs, scanner, &dir, |e| {
                e.has_suffix(MAP_SUFFIXES)
            })
        {
            errors.push(err);
        }
        if let Err(err) = self.update_configs_from_engine_dir(scanner) {
            errors.push(err);
        }
        if let Err(err) = self.update_saves_from_dir(scanner) {
            errors.push(err);
        }
        errors
    }

    /// Config files of the current engine. Without an engine the list is emptied.
    pub(crate) fn update_configs_from_engine_dir<S: DirScanner + ?Sized>(
        &mut self,
        scanner: &S,
    ) -> Result<Option<ReloadSummary>, ScanError> {
        let Some(dir) = self.engines.current().map(Engine::config_dir) else {
            self.configs.replace_all(Vec::new());
            return Ok(None);
        };
        update_list_from_dir(&mut self.configs, scanner, &dir, false, |e| {
            e.has_suffix(CONFIG_SUFFIXES)
                .then(|| FileEntry::from_path(&e.path))
        })
        .map(Some)
    }

    pub(crate) fn saves_dir(&self) -> Option<PathBuf> {
        self.dirs
            .save_dir
            .clone()
            .or_else(|| self.engines.current().map(Engine::config_dir))
    }

    pub(crate) fn update_saves_from_dir<S: DirScanner + ?Sized>(
        &mut self,
        scanner: &S,
    ) -> Result<Option<ReloadSummary>, ScanError> {
        let Some(dir) = self.saves_dir() else {
            self.saves.replace_all(Vec::new());
            return Ok(None);
        };
        update_list_from_dir(&mut self.saves, scanner, &dir, false, |e| {
            e.has_suffix(SAVE_SUFFIXES)
                .then(|| FileEntry::from_path(&e.path))
        })
        .map(Some)
    }

    /// Makes the engine current and reloads the lists that depend on it.
    pub(crate) fn choose_engine<S: DirScanner + ?Sized>(
        &mut self,
        index: usize,
        scanner: &S,
    ) -> Result<(), ListError> {
        if !self.engines.choose_item(index) {
            return Err(ListError::IndexOutOfRange {
                index,
                len: self.engines.len(),
            });
        }
        self.reload_engine_dependents(scanner);
        Ok(())
    }

    fn reload_engine_dependents<S: DirScanner + ?Sized>(&mut self, scanner: &S) {
        if let Err(err) = self.update_configs_from_engine_dir(scanner) {
            debug_log_line(&format!("config reload failed: {}", err));
        }
        if let Err(err) = self.update_saves_from_dir(scanner) {
            debug_log_line(&format!("save reload failed: {}", err));
        }
    }

    // presets

    /// Pushes the preset's selections into the lists.
    ///
    /// References to entries that no longer exist are dropped: the list is left without a
    /// selection and the reference is listed in the report.
    pub(crate) fn apply_preset<S: DirScanner + ?Sized>(
        &mut self,
        index: usize,
        scanner: &S,
    ) -> Result<PresetApplyReport, ListError> {
        let preset = self
            .presets
            .get(index)
            .cloned()
            .ok_or(ListError::IndexOutOfRange {
                index,
                len: self.presets.presets().len(),
            })?;
        self.presets.list_mut().choose_item(index);

        let mut report = PresetApplyReport {
            preset: preset.name.clone(),
            stale: Vec::new(),
        };

        restore_single(
            &mut self.engines,
            preset.engine.as_ref(),
            ListKind::Engines,
            &mut report,
        );
        self.reload_engine_dependents(scanner);
        restore_single(
            &mut self.configs,
            preset.config.as_ref(),
            ListKind::Configs,
            &mut report,
        );
        restore_single(
            &mut self.iwads,
            preset.iwad.as_ref(),
            ListKind::Iwads,
            &mut report,
        );

        self.map_packs.deselect_all_and_unset_current();
        for id in &preset.map_packs {
            if !self.map_packs.select(id) {
                report.stale.push(StaleReference {
                    kind: ListKind::MapPacks,
                    id: id.clone(),
                });
            }
        }
        if let Some(first) = self.map_packs.selected_ids().first().cloned() {
            self.map_packs.set_current(&first);
        }

        self.mods.replace_all(preset.mods.clone());
        self.gameplay.launch_mode = preset.launch_mode;
        self.gameplay.map_name = preset.map_name.clone();
        restore_single(
            &mut self.saves,
            preset.save_file.as_ref(),
            ListKind::Saves,
            &mut report,
        );
        self.cmd_args = preset.cmd_args.clone();

        for stale in &report.stale {
            debug_log_line(&format!(
                "preset \"{}\": {} {} no longer exists",
                report.preset,
                stale.kind.label(),
                stale.id
            ));
        }
        Ok(report)
    }

    pub(crate) fn apply_preset_named<S: DirScanner + ?Sized>(
        &mut self,
        name: &str,
        scanner: &S,
    ) -> Result<PresetApplyReport, ListError> {
        let index = self
            .presets
            .find(name)
            .ok_or(ListError::MissingSelection("preset"))?;
        self.apply_preset(index, scanner)
    }

    /// Stores the current selections into the preset at `index`.
    pub(crate) fn save_into_preset(&mut self, index: usize) -> Result<(), ListError> {
        let engine = current_id(&self.engines);
        let config = current_id(&self.configs);
        let iwad = current_id(&self.iwads);
        let map_packs = self.map_packs.selected_ids().to_vec();
        let mods = self.mods.items().to_vec();
        let save_file = current_id(&self.saves);
        let len = self.presets.presets().len();

        let preset = self
            .presets
            .get_mut(index)
            .ok_or(ListError::IndexOutOfRange { index, len })?;
        preset.engine = engine;
        preset.config = config;
        preset.iwad = iwad;
        preset.map_packs = map_packs;
        preset.mods = mods;
        preset.launch_mode = self.gameplay.launch_mode;
        preset.map_name = self.gameplay.map_name.clone();
        preset.save_file = save_file;
        preset.cmd_args = self.cmd_args.clone();
        Ok(())
    }

    pub(crate) fn toggle_absolute_paths(&mut self, absolute: bool) {
        self.paths.toggle_absolute_paths(absolute);
        debug_log_line(&format!(
            "paths are now written {}",
            if absolute { "absolute" } else { "relative" }
        ));
    }

    // command line

    pub(crate) fn launch_inputs(&self, platform: &Platform) -> Result<LaunchInputs, ListError> {
        let engine = self
            .engines
            .current()
            .ok_or(ListError::MissingSelection("engine"))?;
        let family = engine.family();
        let run_dir = engine
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.paths.base_dir().to_path_buf());
        let paths = PathContext::new(run_dir, self.paths.use_absolute_paths())
            .with_quoting(self.paths.quote_paths());

        let config = self.configs.current().map(|c| c.path.clone());
        let iwad = self.iwads.current().map(|i| i.path.clone());
        let map_packs: Vec<PathBuf> = self
            .map_packs
            .selected_files()
            .iter()
            .map(|n| n.path.clone())
            .collect();
        let save_game = self.saves.current().map(|s| s.path.clone());
        let loads_save = self.gameplay.launch_mode == LaunchMode::SavedGame;
        let mods: Vec<PathBuf> = self
            .mods
            .iter()
            .filter(|m| m.checked)
            .map(|m| m.path.clone())
            .collect();

        let mut accessible_dirs: Vec<PathBuf> = Vec::new();
        let files = config
            .iter()
            .chain(iwad.iter())
            .chain(map_packs.iter())
            .chain(mods.iter())
            .chain(save_game.iter().filter(|_| loads_save));
        for file in files {
            if let Some(parent) = file.parent()
                && !accessible_dirs.iter().any(|d| d == parent)
            {
                accessible_dirs.push(parent.to_path_buf());
            }
        }
        if let Some(dir) = &self.dirs.save_dir
            && !accessible_dirs.contains(dir)
        {
            accessible_dirs.push(dir.clone());
        }

        Ok(LaunchInputs {
            engine_path: engine.path.clone(),
            traits: platform.traits_of(&engine.path),
            family,
            paths,
            accessible_dirs,
            config,
            iwad,
            map_packs,
            save_game,
            save_dir: self.dirs.save_dir.clone(),
            mods,
            gameplay: self.gameplay.clone(),
            compat_args: self.compat.command_line_args(family),
            multiplayer: self.multiplayer.clone(),
            extra_args: self.cmd_args.clone(),
        })
    }

    pub(crate) fn generate_launch_command(
        &self,
        platform: &Platform,
    ) -> Result<ShellCommand, ListError> {
        let inputs = self.launch_inputs(platform)?;
        let command = build_launch_command(&inputs, platform);
        debug_log_line(&format!("generated command: {}", command));
        Ok(command)
    }

    // display & validation

    pub(crate) fn display_items<P: PathProbe + ?Sized>(
        &self,
        kind: ListKind,
        probe: &P,
    ) -> Vec<DisplayItem> {
        let file_invalid = |p: &Path| !probe.is_file(p);
        match kind {
            ListKind::Engines => list_items(&self.engines, |e| {
                (
                    format!("{} [{}]", e.name, e.family().label()),
                    None,
                    file_invalid(&e.path),
                )
            }),
            ListKind::Configs => list_items(&self.configs, |c| {
                (c.name.clone(), None, file_invalid(&c.path))
            }),
            ListKind::Iwads => {
                list_items(&self.iwads, |i| (i.name.clone(), None, file_invalid(&i.path)))
            }
            ListKind::Saves => {
                list_items(&self.saves, |s| (s.name.clone(), None, file_invalid(&s.path)))
            }
            ListKind::Mods => list_items(&self.mods, |m| {
                (m.name.clone(), Some(m.checked), file_invalid(&m.path))
            }),
            ListKind::Presets => list_items(self.presets.list(), |p| (p.name.clone(), None, false)),
            ListKind::MapPacks => self
                .map_packs
                .flatten()
                .into_iter()
                .map(|(depth, node)| {
                    let id = node.id();
                    DisplayItem {
                        label: node.name.clone(),
                        depth,
                        current: self.map_packs.current_id() == Some(&id),
                        selected: self.map_packs.is_selected(&id),
                        checked: None,
                        invalid: if node.is_dir {
                            !probe.is_dir(&node.path)
                        } else {
                            !probe.is_file(&node.path)
                        },
                    }
                })
                .collect(),
        }
    }

    /// Checks every path the launch would use. Returns the one warning to show, if any.
    pub(crate) fn check_selected_paths<P: PathProbe + ?Sized>(&self, probe: &P) -> Option<String> {
        let mut checker = PathChecker::new(probe);
        if let Some(engine) = self.engines.current() {
            checker.check_file_path(&engine.path, "engine");
        }
        if let Some(config) = self.configs.current() {
            checker.check_file_path(&config.path, "config");
        }
        if let Some(iwad) = self.iwads.current() {
            checker.check_file_path(&iwad.path, "IWAD");
        }
        for node in self.map_packs.selected_files() {
            checker.check_file_path(&node.path, "map pack");
        }
        for m in self.mods.iter().filter(|m| m.checked) {
            checker.check_file_path(&m.path, "mod");
        }
        if self.gameplay.launch_mode == LaunchMode::SavedGame
            && let Some(save) = self.saves.current()
        {
            checker.check_file_path(&save.path, "save");
        }
        if self.dirs.iwads_from_dir
            && let Some(dir) = &self.dirs.iwad_dir
        {
            checker.check_dir_path(dir, "IWAD directory");
        }
        if let Some(dir) = &self.dirs.map_dir {
            checker.check_dir_path(dir, "map directory");
        }
        if let Some(dir) = &self.dirs.save_dir {
            checker.check_dir_path(dir, "save directory");
        }
        checker.into_message()
    }
}

fn restore_single<T: Identified>(
    list: &mut EntityList<T>,
    id: Option<&EntityId>,
    kind: ListKind,
    report: &mut PresetApplyReport,
) {
    list.deselect_all_and_unset_current();
    let Some(id) = id else {
        return;
    };
    match list.find_by_id(id) {
        Some(index) => list.select_and_set_current(index),
        None => report.stale.push(StaleReference {
            kind,
            id: id.clone(),
        }),
    }
}

fn list_items<T>(
    list: &EntityList<T>,
    describe: impl Fn(&T) -> (String, Option<bool>, bool),
) -> Vec<DisplayItem> {
    list.iter()
        .enumerate()
        .map(|(index, item)| {
            let (label, checked, invalid) = describe(item);
            DisplayItem {
                label,
                depth: 0,
                current: list.current_index() == Some(index),
                selected: list.is_selected(index),
                checked,
                invalid,
            }
        })
        .collect()
}
