use crate::engine::EngineFamily;
use crate::paths::{EntityId, file_name_of, file_stem_of};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An entry that carries an identity independent of its position in a list.
pub(crate) trait Identified {
    fn id(&self) -> EntityId;
}

/// An entry with a user-visible, user-editable name.
pub(crate) trait Named {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Engine {
    /// Defaults to the executable's file stem.
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    /// Directory where the engine keeps its config files; defaults to the engine's own dir.
    #[serde(default)]
    pub(crate) config_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) family: Option<EngineFamily>,
}

impl Engine {
    pub(crate) fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Engine {
            name: file_stem_of(&path),
            path,
            config_dir: None,
            family: None,
        }
    }

    pub(crate) fn family(&self) -> EngineFamily {
        self.family
            .unwrap_or_else(|| EngineFamily::detect(&file_stem_of(&self.path)))
    }

    pub(crate) fn config_dir(&self) -> PathBuf {
        match &self.config_dir {
            Some(dir) => dir.clone(),
            None => self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

impl Identified for Engine {
    fn id(&self) -> EntityId {
        EntityId::from_path(&self.path)
    }
}

impl Named for Engine {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Iwad {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

impl Iwad {
    pub(crate) fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Iwad {
            name: file_name_of(&path),
            path,
        }
    }
}

impl Identified for Iwad {
    fn id(&self) -> EntityId {
        EntityId::from_path(&self.path)
    }
}

impl Named for Iwad {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Mod {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    #[serde(default = "default_checked")]
    pub(crate) checked: bool,
}

fn default_checked() -> bool {
    true
}

impl Mod {
    pub(crate) fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Mod {
            name: file_name_of(&path),
            path,
            checked: true,
        }
    }
}

impl Identified for Mod {
    fn id(&self) -> EntityId {
        EntityId::from_path(&self.path)
    }
}

impl Named for Mod {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Plain file entry, used for engine config files and save files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FileEntry {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

impl FileEntry {
    pub(crate) fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        FileEntry {
            name: file_name_of(&path),
            path,
        }
    }
}

impl Identified for FileEntry {
    fn id(&self) -> EntityId {
        EntityId::from_path(&self.path)
    }
}

impl Named for FileEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_comes_from_path_not_name() {
        let mut a = Mod::from_path("/mods/./brutal.pk3");
        let b = Mod::from_path("/mods/brutal.pk3");
        a.set_name("Brutal Doom".to_string());
        assert_eq!(a.id(), b.id());
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn engine_defaults_config_dir_and_family() {
        let engine = Engine::from_path("/opt/chocolate/chocolate-doom");
        assert_eq!(engine.name, "chocolate-doom");
        assert_eq!(engine.config_dir(), PathBuf::from("/opt/chocolate"));
        assert_eq!(engine.family(), EngineFamily::ChocolateDoom);
    }
}
