use crate::MyError;
use crate::compat::CompatibilityOptions;
use crate::entities::{Engine, Iwad, Mod};
use crate::options::{GameplayOptions, MultiplayerOptions};
use crate::preset::Preset;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

const DEFAULT_CONFIG_REL_PATH: &str = "doomrunner/config.toml";

/// Persisted launcher state. Paths are stored the way the user chose: absolute, or
/// relative to `base_dir`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) base_dir: Option<String>,
    pub(crate) use_absolute_paths: Option<bool>,
    pub(crate) quote_paths: Option<bool>,
    pub(crate) iwad_dir: Option<String>,
    pub(crate) iwads_from_dir: Option<bool>,
    pub(crate) iwad_subdirs: Option<bool>,
    pub(crate) map_dir: Option<String>,
    pub(crate) save_dir: Option<String>,
    pub(crate) last_preset: Option<String>,
    pub(crate) cmd_args: Option<String>,
    pub(crate) engines: Vec<Engine>,
    pub(crate) iwads: Vec<Iwad>,
    pub(crate) mods: Vec<Mod>,
    pub(crate) gameplay: GameplayOptions,
    pub(crate) compat: CompatibilityOptions,
    pub(crate) multiplayer: MultiplayerOptions,
    pub(crate) presets: Vec<Preset>,
}

fn resolve_default_config_path() -> Result<PathBuf, Box<dyn Error>> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join(DEFAULT_CONFIG_REL_PATH));
    }
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home)
            .join(".config")
            .join(DEFAULT_CONFIG_REL_PATH));
    }
    Err(
        MyError("Unable to resolve config path (HOME and XDG_CONFIG_HOME are unset).".to_string())
            .into(),
    )
}

pub(crate) fn resolve_config_path(
    path_override: &Option<String>,
) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(path) = path_override {
        Ok(PathBuf::from(path))
    } else {
        resolve_default_config_path()
    }
}

pub(crate) fn load_config(path_override: &Option<String>) -> Result<Config, Box<dyn Error>> {
    let path = resolve_config_path(path_override)?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| MyError(format!("Failed to parse config {}: {}", path.display(), e)))?;
    Ok(config)
}

pub(crate) fn write_config(
    path_override: &Option<String>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let path = resolve_config_path(path_override)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| MyError(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(&path, toml_str)?;
    println!("DoomRunner: Wrote config to {}", path.display());
    Ok(())
}

fn path_line(key: &str, value: &Option<String>, example: &str) -> String {
    match value {
        Some(v) => format!(
            "{} = {}",
            key,
            serde_json::to_string(v).unwrap_or_else(|_| "\"\"".to_string())
        ),
        None => format!("# {} = \"{}\"", key, example),
    }
}

fn render_config_template(config: &Config) -> String {
    let base_dir_line = path_line("base_dir", &config.base_dir, "/home/me/games/doom");
    let iwad_dir_line = path_line("iwad_dir", &config.iwad_dir, "iwads");
    let map_dir_line = path_line("map_dir", &config.map_dir, "maps");
    let save_dir_line = path_line("save_dir", &config.save_dir, "saves");
    let use_absolute_paths = config.use_absolute_paths.unwrap_or(false);
    let quote_paths = config.quote_paths.unwrap_or(false);
    let iwads_from_dir = config.iwads_from_dir.unwrap_or(true);
    let iwad_subdirs = config.iwad_subdirs.unwrap_or(false);

    format!(
        r#"# DoomRunner config

# Relative paths below are resolved against base_dir (default: this file's directory).
{base_dir_line}
# Write paths absolute instead of relative to base_dir, in this file and on the command line.
use_absolute_paths = {use_absolute_paths}
# Wrap paths containing spaces in double quotes in the displayed command.
quote_paths = {quote_paths}

# List IWADs from iwad_dir instead of the [[iwads]] entries.
{iwad_dir_line}
iwads_from_dir = {iwads_from_dir}
iwad_subdirs = {iwad_subdirs}
# Map packs are listed recursively from map_dir.
{map_dir_line}
# Alternative save directory. Without it saves are read from the engine's config dir.
{save_dir_line}

# [[engines]]
# name = "GZDoom"  # optional, defaults to the file name without extension
# path = "/usr/bin/gzdoom"
# family = "z_doom"

# [[mods]]
# name = "brutal.pk3"
# path = "mods/brutal.pk3"
# checked = true

# [gameplay]
# skill = {{ standard = 4 }}
# fast_monsters = true

# [compat]
# flags = ["stairs", "drop_off"]
"#
    )
}

fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool, Box<dyn Error>> {
    let hint = if default { "Y/n" } else { "y/N" };
    let stdin = std::io::stdin();
    loop {
        print!("{} [{}]: ", prompt, hint);
        std::io::stdout().flush()?;

        let mut answer = String::new();
        if stdin.read_line(&mut answer)? == 0 {
            return Ok(default);
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Answer y or n."),
        }
    }
}

fn column_width<'a>(cells: impl Iterator<Item = &'a str>, header: &str) -> usize {
    cells
        .map(|c| c.chars().count())
        .fold(header.len(), usize::max)
}

/// Prints a titled two-column table, sized to the widest key and value.
pub(crate) fn print_kv_table<K: AsRef<str>, V: AsRef<str>>(title: &str, rows: &[(K, V)]) {
    let key_width = column_width(rows.iter().map(|(k, _)| k.as_ref()), "Key");
    let val_width = column_width(rows.iter().map(|(_, v)| v.as_ref()), "Value");
    let rule = format!("+-{}-+-{}-+", "-".repeat(key_width), "-".repeat(val_width));
    let row = |k: &str, v: &str| println!("| {:<key_width$} | {:<val_width$} |", k, v);

    println!("DoomRunner: {}", title);
    println!("{}", rule);
    row("Key", "Value");
    println!("{}", rule);
    for (k, v) in rows {
        row(k.as_ref(), v.as_ref());
    }
    println!("{}", rule);
}

fn or_unset(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(unset)".to_string())
}

fn print_config_table(title: &str, config: &Config) {
    let compat_flags: Vec<String> = config
        .compat
        .flags()
        .map(|f| format!("{:?}", f))
        .collect();
    print_kv_table(
        title,
        &[
            ("base_dir", or_unset(&config.base_dir)),
            (
                "use_absolute_paths",
                config.use_absolute_paths.unwrap_or(false).to_string(),
            ),
            ("quote_paths", config.quote_paths.unwrap_or(false).to_string()),
            ("iwad_dir", or_unset(&config.iwad_dir)),
            (
                "iwads_from_dir",
                config.iwads_from_dir.unwrap_or(false).to_string(),
            ),
            ("iwad_subdirs", config.iwad_subdirs.unwrap_or(false).to_string()),
            ("map_dir", or_unset(&config.map_dir)),
            ("save_dir", or_unset(&config.save_dir)),
            ("last_preset", or_unset(&config.last_preset)),
            ("engines", config.engines.len().to_string()),
            ("iwads", config.iwads.len().to_string()),
            ("mods", config.mods.len().to_string()),
            ("presets", config.presets.len().to_string()),
            ("skill", config.gameplay.skill.number().to_string()),
            ("launch_mode", format!("{:?}", config.gameplay.launch_mode)),
            ("compat_flags", format!("{:?}", compat_flags)),
            (
                "compat_level",
                config
                    .compat
                    .compat_level()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "(unset)".to_string()),
            ),
            ("multiplayer", config.multiplayer.enabled.to_string()),
            ("cmd_args", config.cmd_args.clone().unwrap_or_default()),
        ],
    );
}

pub(crate) fn write_default_config(
    path_override: &Option<String>,
    force: bool,
) -> Result<(), Box<dyn Error>> {
    let path = resolve_config_path(path_override)?;

    if path.exists() && !force {
        let should_overwrite = prompt_yes_no(
            &format!("Config already exists at {}. Overwrite it?", path.display()),
            false,
        )?;
        if !should_overwrite {
            println!("DoomRunner: Keeping existing config unchanged.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = render_config_template(&Config::default());
    std::fs::write(&path, &contents)?;
    println!("DoomRunner: Wrote config to {}", path.display());
    let config: Config = toml::from_str(&contents)?;
    print_config_table("Final Config Defaults", &config);
    Ok(())
}

pub(crate) fn show_config(path_override: &Option<String>) -> Result<(), Box<dyn Error>> {
    let path = resolve_config_path(path_override)?;
    let config = load_config(path_override)?;

    println!("DoomRunner: Config path: {}", path.display());
    print_config_table("Config Values", &config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::CompatFlag;
    use crate::options::{LaunchMode, Skill};
    use crate::paths::EntityId;
    use std::path::Path;

    #[test]
    fn template_parses_back_to_defaults() {
        let rendered = render_config_template(&Config::default());
        let parsed: Config = toml::from_str(&rendered).expect("parse template");
        assert_eq!(parsed.use_absolute_paths, Some(false));
        assert_eq!(parsed.iwads_from_dir, Some(true));
        assert!(parsed.base_dir.is_none());
        assert!(parsed.engines.is_empty());
    }

    #[test]
    fn template_keeps_configured_paths() {
        let config = Config {
            base_dir: Some("/games/my doom".to_string()),
            map_dir: Some("maps".to_string()),
            ..Config::default()
        };
        let parsed: Config =
            toml::from_str(&render_config_template(&config)).expect("parse template");
        assert_eq!(parsed.base_dir.as_deref(), Some("/games/my doom"));
        assert_eq!(parsed.map_dir.as_deref(), Some("maps"));
        assert!(parsed.iwad_dir.is_none());
    }

    #[test]
    fn full_config_survives_toml() {
        let mut compat = CompatibilityOptions::default();
        compat.set_flag(CompatFlag::Stairs, true);
        let gameplay = GameplayOptions {
            skill: Skill::Custom(6),
            ..GameplayOptions::default()
        };
        let config = Config {
            base_dir: Some("/doom".to_string()),
            engines: vec![Engine::from_path("engines/gzdoom")],
            mods: vec![Mod::from_path("mods/a.pk3")],
            gameplay,
            compat,
            presets: vec![Preset {
                name: "Night".to_string(),
                engine: Some(EntityId::from_path(Path::new("engines/gzdoom"))),
                mods: vec![Mod::from_path("mods/a.pk3")],
                launch_mode: LaunchMode::SelectedMap,
                map_name: "MAP01".to_string(),
                ..Preset::default()
            }],
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
map_dir = "maps"
[multiplayer]
enabled = true
host = "10.0.0.2"
"#,
        )
        .expect("parse");
        assert_eq!(parsed.map_dir.as_deref(), Some("maps"));
        assert!(parsed.multiplayer.enabled);
        assert_eq!(parsed.multiplayer.port, crate::options::DEFAULT_PORT);
        assert_eq!(parsed.gameplay, GameplayOptions::default());
    }
}
