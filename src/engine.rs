use serde::{Deserialize, Serialize};

/// Source-port families. Each family spells map warps, save loading and a few other
/// options differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum EngineFamily {
    ZDoom,
    ChocolateDoom,
    PrBoom,
}

const CHOCOLATE_NAMES: &[&str] = &["chocolate", "crispy", "russian"];
const PRBOOM_NAMES: &[&str] = &["prboom", "glboom", "dsda", "woof", "nugget"];

impl EngineFamily {
    pub(crate) fn detect(executable_base_name: &str) -> Self {
        let name = executable_base_name.to_lowercase();
        if CHOCOLATE_NAMES.iter().any(|n| name.contains(n)) {
            EngineFamily::ChocolateDoom
        } else if PRBOOM_NAMES.iter().any(|n| name.contains(n)) {
            EngineFamily::PrBoom
        } else {
            EngineFamily::ZDoom
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            EngineFamily::ZDoom => "ZDoom",
            EngineFamily::ChocolateDoom => "Chocolate Doom",
            EngineFamily::PrBoom => "PrBoom",
        }
    }

    /// Arguments that start the game directly on `map_name`.
    ///
    /// Vanilla-style ports only understand numeric warps, so names that aren't `ExMy` or
    /// `MAPxx` produce nothing for them.
    pub(crate) fn map_args(self, map_name: &str) -> Vec<String> {
        let map_name = map_name.trim();
        if map_name.is_empty() {
            return Vec::new();
        }
        match self {
            EngineFamily::ZDoom => vec!["+map".to_string(), map_name.to_string()],
            EngineFamily::ChocolateDoom | EngineFamily::PrBoom => match parse_warp(map_name) {
                Some(Warp::Episode(e, m)) => {
                    vec!["-warp".to_string(), e.to_string(), m.to_string()]
                }
                Some(Warp::Map(m)) => vec!["-warp".to_string(), m.to_string()],
                None => Vec::new(),
            },
        }
    }

    /// Arguments loading a saved game. ZDoom takes the file, the others take a slot number
    /// that is encoded in the save file name (`doomsav3.dsg`).
    pub(crate) fn load_game_args(self, save_path_arg: &str, save_file_name: &str) -> Vec<String> {
        match self {
            EngineFamily::ZDoom => vec!["-loadgame".to_string(), save_path_arg.to_string()],
            EngineFamily::ChocolateDoom | EngineFamily::PrBoom => {
                match save_slot_number(save_file_name) {
                    Some(slot) => vec!["-loadgame".to_string(), slot.to_string()],
                    None => Vec::new(),
                }
            }
        }
    }

    pub(crate) fn save_dir_flag(self) -> &'static str {
        match self {
            EngineFamily::ZDoom | EngineFamily::ChocolateDoom => "-savedir",
            EngineFamily::PrBoom => "-save",
        }
    }

    pub(crate) fn supports_dmflags(self) -> bool {
        self == EngineFamily::ZDoom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Warp {
    Episode(u32, u32),
    Map(u32),
}

fn parse_warp(map_name: &str) -> Option<Warp> {
    let upper = map_name.to_uppercase();
    if let Some(num) = upper.strip_prefix("MAP") {
        return num.parse::<u32>().ok().map(Warp::Map);
    }
    let rest = upper.strip_prefix('E')?;
    let (episode, map) = rest.split_once('M')?;
    Some(Warp::Episode(episode.parse().ok()?, map.parse().ok()?))
}

fn save_slot_number(save_file_name: &str) -> Option<u32> {
    let stem = save_file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(save_file_name);
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_family_from_executable_name() {
        assert_eq!(EngineFamily::detect("gzdoom"), EngineFamily::ZDoom);
        assert_eq!(EngineFamily::detect("crispy-doom"), EngineFamily::ChocolateDoom);
        assert_eq!(EngineFamily::detect("dsda-doom"), EngineFamily::PrBoom);
        assert_eq!(EngineFamily::detect("PrBoom-Plus"), EngineFamily::PrBoom);
    }

    #[test]
    fn map_args_follow_family_syntax() {
        assert_eq!(EngineFamily::ZDoom.map_args("MAP07"), vec!["+map", "MAP07"]);
        assert_eq!(EngineFamily::PrBoom.map_args("map07"), vec!["-warp", "7"]);
        assert_eq!(
            EngineFamily::ChocolateDoom.map_args("E2M3"),
            vec!["-warp", "2", "3"]
        );
        assert!(EngineFamily::ChocolateDoom.map_args("STARTMAP").is_empty());
        assert!(EngineFamily::ZDoom.map_args("  ").is_empty());
    }

    #[test]
    fn load_game_uses_slot_for_vanilla_ports() {
        assert_eq!(
            EngineFamily::ZDoom.load_game_args("saves/save1.zds", "save1.zds"),
            vec!["-loadgame", "saves/save1.zds"]
        );
        assert_eq!(
            EngineFamily::ChocolateDoom.load_game_args("x", "doomsav3.dsg"),
            vec!["-loadgame", "3"]
        );
        assert!(EngineFamily::PrBoom.load_game_args("x", "quick.dsg").is_empty());
    }
}
