use crate::entities::{Identified, Mod, Named};
use crate::error::ListError;
use crate::list::EntityList;
use crate::options::LaunchMode;
use crate::paths::EntityId;
use crate::util::unique_name;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// A named snapshot of what the user picked.
///
/// Selections are kept as identities, never as list positions, so a preset stays valid when
/// the lists are rescanned or rearranged. Mods are a full copy of the mod list, including
/// which ones are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Preset {
    pub(crate) name: String,
    pub(crate) engine: Option<EntityId>,
    pub(crate) config: Option<EntityId>,
    pub(crate) iwad: Option<EntityId>,
    pub(crate) map_packs: Vec<EntityId>,
    pub(crate) mods: Vec<Mod>,
    pub(crate) launch_mode: LaunchMode,
    pub(crate) map_name: String,
    pub(crate) save_file: Option<EntityId>,
    pub(crate) cmd_args: String,
}

impl Preset {
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Preset {
            name: name.into(),
            ..Preset::default()
        }
    }
}

impl Identified for Preset {
    fn id(&self) -> EntityId {
        EntityId::from_name(&self.name)
    }
}

impl Named for Preset {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PresetDocument {
    format: u32,
    preset: Preset,
}

const PRESET_FORMAT_VERSION: u32 = 1;

/// Ordered presets with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PresetStore {
    list: EntityList<Preset>,
}

impl PresetStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Loads persisted presets. Names that repeat an earlier one get a numeric suffix.
    pub(crate) fn from_presets(presets: Vec<Preset>) -> Self {
        let mut store = PresetStore::new();
        for mut preset in presets {
            if preset.name.trim().is_empty() {
                preset.name = store.next_default_name();
            }
            preset.name = store.free_name(&preset.name);
            if let Err(err) = store.list.append(preset) {
                crate::debuglog::debug_log_line(&format!("dropped preset: {}", err));
            }
        }
        store
    }

    pub(crate) fn list(&self) -> &EntityList<Preset> {
        &self.list
    }

    pub(crate) fn list_mut(&mut self) -> &mut EntityList<Preset> {
        &mut self.list
    }

    pub(crate) fn presets(&self) -> &[Preset] {
        self.list.items()
    }

    pub(crate) fn find(&self, name: &str) -> Option<usize> {
        self.list.find_by_id(&EntityId::from_name(name))
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Preset> {
        self.list.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Preset> {
        self.list.get_mut(index)
    }

    pub(crate) fn current(&self) -> Option<&Preset> {
        self.list.current()
    }

    fn is_taken(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn free_name(&self, base: &str) -> String {
        unique_name(base, |n| self.is_taken(n))
    }

    fn next_default_name(&self) -> String {
        let mut n = self.list.len() + 1;
        loop {
            let candidate = format!("Preset {}", n);
            if !self.is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Appends an empty preset with the next free "Preset N" name and makes it current.
    pub(crate) fn add_new(&mut self) -> Result<usize, ListError> {
        let name = self.next_default_name();
        self.add(&name)
    }

    /// Appends an empty preset named `name` and makes it current.
    pub(crate) fn add(&mut self, name: &str) -> Result<usize, ListError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ListError::EmptyName);
        }
        let index = self.list.append(Preset::named(name))?;
        self.list.choose_item(index);
        Ok(index)
    }

    pub(crate) fn rename(&mut self, index: usize, new_name: &str) -> Result<(), ListError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ListError::EmptyName);
        }
        let len = self.list.len();
        if let Some(existing) = self.find(new_name)
            && existing != index
        {
            return Err(ListError::DuplicateName(new_name.to_string()));
        }
        let preset = self
            .list
            .get_mut(index)
            .ok_or(ListError::IndexOutOfRange { index, len })?;
        preset.set_name(new_name.to_string());
        Ok(())
    }

    /// Copies the selected preset under a fresh name (" - clone", then a number when taken).
    pub(crate) fn clone_selected(&mut self) -> Result<usize, ListError> {
        let new_index = self.list.clone_selected_item()?;
        self.list.choose_item(new_index);
        Ok(new_index)
    }

    pub(crate) fn delete_selected(&mut self) -> Result<usize, ListError> {
        self.list.delete_selected_item()
    }

    pub(crate) fn move_up_selected(&mut self) -> Result<usize, ListError> {
        self.list.move_up_selected_item()
    }

    pub(crate) fn move_down_selected(&mut self) -> Result<usize, ListError> {
        self.list.move_down_selected_item()
    }

    /// Standalone JSON document holding one preset.
    pub(crate) fn export_preset(&self, name: &str) -> Result<String, Box<dyn Error>> {
        let index = self
            .find(name)
            .ok_or_else(|| crate::MyError(format!("No preset named \"{}\".", name)))?;
        let preset = self.list.get(index).cloned().unwrap_or_default();
        let doc = PresetDocument {
            format: PRESET_FORMAT_VERSION,
            preset,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Appends the preset from an exported document. A clashing name gets a numeric suffix.
    pub(crate) fn import_preset(&mut self, json: &str) -> Result<usize, Box<dyn Error>> {
        let doc: PresetDocument = serde_json::from_str(json)?;
        if doc.format > PRESET_FORMAT_VERSION {
            return Err(crate::MyError(format!(
                "Preset document format {} is newer than supported ({}).",
                doc.format, PRESET_FORMAT_VERSION
            ))
            .into());
        }
        let mut preset = doc.preset;
        let base = if preset.name.trim().is_empty() {
            self.next_default_name()
        } else {
            preset.name.trim().to_string()
        };
        preset.name = self.free_name(&base);
        let index = self.list.append(preset)?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn store_with(names: &[&str]) -> PresetStore {
        PresetStore::from_presets(names.iter().map(|n| Preset::named(*n)).collect())
    }

    fn names(store: &PresetStore) -> Vec<&str> {
        store.presets().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn add_new_picks_next_free_default_name() {
        let mut store = store_with(&["Preset 2"]);
        let index = store.add_new().expect("add");
        assert_eq!(names(&store), vec!["Preset 2", "Preset 3"]);
        assert_eq!(store.list().current_index(), Some(index));
    }

    #[test]
    fn add_rejects_empty_and_duplicate_names() {
        let mut store = store_with(&["Coop"]);
        assert_eq!(store.add("   "), Err(ListError::EmptyName));
        assert_eq!(
            store.add("Coop"),
            Err(ListError::DuplicateName("Coop".to_string()))
        );
        assert_eq!(names(&store), vec!["Coop"]);
    }

    #[test]
    fn rename_keeps_names_unique() {
        let mut store = store_with(&["A", "B"]);
        assert_eq!(
            store.rename(1, "A"),
            Err(ListError::DuplicateName("A".to_string()))
        );
        store.rename(1, "B").expect("same name");
        store.rename(1, " C ").expect("rename");
        assert_eq!(names(&store), vec!["A", "C"]);
    }

    #[test]
    fn repeated_clones_get_distinct_names() {
        let mut store = store_with(&["Solo"]);
        store.list_mut().choose_item(0);
        store.clone_selected().expect("clone");
        store.list_mut().choose_item(0);
        store.clone_selected().expect("clone");
        assert_eq!(names(&store), vec!["Solo", "Solo - clone", "Solo - clone 2"]);
    }

    #[test]
    fn clone_copies_mods_deeply() {
        let mut store = store_with(&["Solo"]);
        store.get_mut(0).expect("preset").mods = vec![Mod::from_path("/mods/a.pk3")];
        store.list_mut().choose_item(0);
        let copy = store.clone_selected().expect("clone");
        store.get_mut(copy).expect("copy").mods[0].checked = false;
        assert!(store.get(0).expect("original").mods[0].checked);
    }

    #[test]
    fn duplicate_names_from_persisted_data_are_renamed() {
        let store = store_with(&["X", "X", ""]);
        assert_eq!(names(&store), vec!["X", "X 2", "Preset 3"]);
    }

    #[test]
    fn export_then_import_appends_with_suffix() {
        let mut store = store_with(&["Night"]);
        {
            let preset = store.get_mut(0).expect("preset");
            preset.iwad = Some(EntityId::from_path(Path::new("/iwads/doom2.wad")));
            preset.cmd_args = "+vid_fps 1".to_string();
        }
        let json = store.export_preset("Night").expect("export");
        let index = store.import_preset(&json).expect("import");
        let imported = store.get(index).expect("imported");
        assert_eq!(imported.name, "Night 2");
        assert_eq!(imported.cmd_args, "+vid_fps 1");
        assert_eq!(imported.iwad, store.get(0).expect("original").iwad);
    }

    #[test]
    fn import_rejects_garbage_and_future_formats() {
        let mut store = PresetStore::new();
        assert!(store.import_preset("not json").is_err());
        assert!(
            store
                .import_preset(r#"{"format": 99, "preset": {"name": "x"}}"#)
                .is_err()
        );
        assert!(store.presets().is_empty());
    }

    #[test]
    fn export_of_unknown_preset_fails() {
        assert!(store_with(&["A"]).export_preset("B").is_err());
    }

    #[test]
    fn reorder_and_delete_follow_the_selection() {
        let mut store = store_with(&["A", "B", "C"]);
        store.list_mut().choose_item(1);

        assert_eq!(store.move_up_selected(), Ok(1));
        assert_eq!(names(&store), vec!["B", "A", "C"]);
        assert_eq!(store.move_down_selected(), Ok(0));
        assert_eq!(names(&store), vec!["A", "B", "C"]);
        assert_eq!(store.current().map(|p| p.name.as_str()), Some("B"));

        assert_eq!(store.delete_selected(), Ok(1));
        assert_eq!(names(&store), vec!["A", "C"]);
        assert_eq!(store.current().map(|p| p.name.as_str()), Some("C"));
    }
}
