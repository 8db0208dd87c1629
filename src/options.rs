use clap::ValueEnum;
use crate::engine::EngineFamily;
use crate::util::clamp_i32;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_SKILL: i32 = 3;
pub(crate) const DEFAULT_PORT: u16 = 5029;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Skill {
    /// One of the five menu difficulties, 1..=5.
    Standard(i32),
    /// Any number the engine accepts, for mods that add difficulties.
    Custom(i32),
}

impl Skill {
    /// The value passed to `-skill`. Standard levels are held to 1..=5 whatever the config says.
    pub(crate) fn number(self) -> i32 {
        match self {
            Skill::Standard(n) => clamp_i32(n, 1, 5),
            Skill::Custom(n) => n,
        }
    }
}

impl Default for Skill {
    fn default() -> Self {
        Skill::Standard(DEFAULT_SKILL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LaunchMode {
    #[default]
    GameMenu,
    SelectedMap,
    SavedGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GameplayOptions {
    pub(crate) skill: Skill,
    pub(crate) no_monsters: bool,
    pub(crate) fast_monsters: bool,
    pub(crate) monsters_respawn: bool,
    pub(crate) launch_mode: LaunchMode,
    /// Only meaningful with `LaunchMode::SelectedMap`.
    pub(crate) map_name: String,
    pub(crate) dmflags1: i32,
    pub(crate) dmflags2: i32,
}

impl GameplayOptions {
    /// Skill, monster toggles and dmflags. Only values that differ from the defaults are emitted.
    pub(crate) fn gameplay_args(&self, family: EngineFamily) -> Vec<String> {
        let mut args = Vec::new();
        if self.skill.number() != DEFAULT_SKILL {
            args.push("-skill".to_string());
            args.push(self.skill.number().to_string());
        }
        if self.no_monsters {
            args.push("-nomonsters".to_string());
        }
        if self.fast_monsters {
            args.push("-fast".to_string());
        }
        if self.monsters_respawn {
            args.push("-respawn".to_string());
        }
        if family.supports_dmflags() {
            if self.dmflags1 != 0 {
                args.push("+dmflags".to_string());
                args.push(self.dmflags1.to_string());
            }
            if self.dmflags2 != 0 {
                args.push("+dmflags2".to_string());
                args.push(self.dmflags2.to_string());
            }
        }
        args
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MultRole {
    #[default]
    Server,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum NetMode {
    #[default]
    PeerToPeer,
    PacketServer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GameMode {
    #[default]
    Deathmatch,
    TeamDeathmatch,
    AltDeathmatch,
    AltTeamDeathmatch,
    Cooperative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MultiplayerOptions {
    pub(crate) enabled: bool,
    pub(crate) role: MultRole,
    /// Client only.
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) net_mode: NetMode,
    pub(crate) game_mode: GameMode,
    pub(crate) player_count: u32,
    pub(crate) team_damage: f64,
    /// Minutes, 0 = unlimited.
    pub(crate) time_limit: u32,
}

impl Default for MultiplayerOptions {
    fn default() -> Self {
        MultiplayerOptions {
            enabled: false,
            role: MultRole::Server,
            host: String::new(),
            port: DEFAULT_PORT,
            net_mode: NetMode::PeerToPeer,
            game_mode: GameMode::Deathmatch,
            player_count: 2,
            team_damage: 0.0,
            time_limit: 0,
        }
    }
}

impl MultiplayerOptions {
    pub(crate) fn multiplayer_args(&self, family: EngineFamily) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let mut args = Vec::new();
        match self.role {
            MultRole::Client => {
                let address = format!("{}:{}", self.host, self.port);
                let flag = match family {
                    EngineFamily::ZDoom => "-join",
                    EngineFamily::ChocolateDoom => "-connect",
                    EngineFamily::PrBoom => "-net",
                };
                args.push(flag.to_string());
                args.push(address);
            }
            MultRole::Server => {
                match family {
                    EngineFamily::ZDoom => {
                        args.push("-host".to_string());
                        args.push(self.player_count.to_string());
                        if self.port != DEFAULT_PORT {
                            args.push("-port".to_string());
                            args.push(self.port.to_string());
                        }
                        args.push("-netmode".to_string());
                        args.push(
                            match self.net_mode {
                                NetMode::PeerToPeer => "0",
                                NetMode::PacketServer => "1",
                            }
                            .to_string(),
                        );
                    }
                    EngineFamily::ChocolateDoom => {
                        args.push("-server".to_string());
                        if self.port != DEFAULT_PORT {
                            args.push("-port".to_string());
                            args.push(self.port.to_string());
                        }
                    }
                    EngineFamily::PrBoom => {}
                }
                args.extend(self.game_mode_args(family));
                if family == EngineFamily::ZDoom && self.team_damage != 0.0 {
                    args.push("+teamdamage".to_string());
                    args.push(self.team_damage.to_string());
                }
                if self.time_limit > 0 {
                    args.push("-timer".to_string());
                    args.push(self.time_limit.to_string());
                }
            }
        }
        args
    }

    fn game_mode_args(&self, family: EngineFamily) -> Vec<String> {
        let teamplay = family == EngineFamily::ZDoom;
        let flags: &[&str] = match (self.game_mode, teamplay) {
            (GameMode::Deathmatch, _) => &["-deathmatch"],
            (GameMode::TeamDeathmatch, true) => &["-deathmatch", "+teamplay", "1"],
            (GameMode::TeamDeathmatch, false) => &["-deathmatch"],
            (GameMode::AltDeathmatch, _) => &["-altdeath"],
            (GameMode::AltTeamDeathmatch, true) => &["-altdeath", "+teamplay", "1"],
            (GameMode::AltTeamDeathmatch, false) => &["-altdeath"],
            (GameMode::Cooperative, _) => &[],
        };
        flags.iter().map(|f| f.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gameplay_emits_nothing() {
        let opts = GameplayOptions::default();
        assert!(opts.gameplay_args(EngineFamily::ZDoom).is_empty());
    }

    #[test]
    fn non_default_gameplay_flags_are_emitted_in_order() {
        let opts = GameplayOptions {
            skill: Skill::Standard(9),
            no_monsters: true,
            fast_monsters: true,
            monsters_respawn: true,
            dmflags1: 4,
            ..GameplayOptions::default()
        };
        assert_eq!(
            opts.gameplay_args(EngineFamily::ZDoom),
            vec!["-skill", "5", "-nomonsters", "-fast", "-respawn", "+dmflags", "4"]
        );
        assert_eq!(
            opts.gameplay_args(EngineFamily::PrBoom),
            vec!["-skill", "5", "-nomonsters", "-fast", "-respawn"]
        );
    }

    #[test]
    fn standard_skill_from_config_is_clamped() {
        let high: GameplayOptions = toml::from_str("skill = { standard = 9 }").expect("parse");
        assert_eq!(high.gameplay_args(EngineFamily::ZDoom), vec!["-skill", "5"]);
        let low: GameplayOptions = toml::from_str("skill = { standard = -2 }").expect("parse");
        assert_eq!(low.gameplay_args(EngineFamily::ChocolateDoom), vec!["-skill", "1"]);
    }

    #[test]
    fn custom_skill_is_not_clamped() {
        let opts = GameplayOptions {
            skill: Skill::Custom(7),
            ..GameplayOptions::default()
        };
        assert_eq!(opts.gameplay_args(EngineFamily::ZDoom), vec!["-skill", "7"]);
    }

    #[test]
    fn multiplayer_disabled_emits_nothing() {
        let opts = MultiplayerOptions {
            role: MultRole::Client,
            host: "10.0.0.2".to_string(),
            ..MultiplayerOptions::default()
        };
        assert!(opts.multiplayer_args(EngineFamily::ZDoom).is_empty());
    }

    #[test]
    fn zdoom_server_and_client_args() {
        let server = MultiplayerOptions {
            enabled: true,
            player_count: 4,
            port: 6000,
            net_mode: NetMode::PacketServer,
            game_mode: GameMode::TeamDeathmatch,
            team_damage: 0.5,
            time_limit: 20,
            ..MultiplayerOptions::default()
        };
        assert_eq!(
            server.multiplayer_args(EngineFamily::ZDoom),
            vec![
                "-host", "4", "-port", "6000", "-netmode", "1", "-deathmatch", "+teamplay", "1",
                "+teamdamage", "0.5", "-timer", "20"
            ]
        );

        let client = MultiplayerOptions {
            enabled: true,
            role: MultRole::Client,
            host: "doom.example.org".to_string(),
            ..MultiplayerOptions::default()
        };
        assert_eq!(
            client.multiplayer_args(EngineFamily::ZDoom),
            vec!["-join", "doom.example.org:5029"]
        );
        assert_eq!(
            client.multiplayer_args(EngineFamily::ChocolateDoom),
            vec!["-connect", "doom.example.org:5029"]
        );
    }
}
