use clap::ValueEnum;
use crate::engine::EngineFamily;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// ZDoom compatibility switches, each mapped to its bit in `compatflags` or `compatflags2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CompatFlag {
    ShortTex,
    Stairs,
    LimitPain,
    SilentPickup,
    NoPassOver,
    SoundSlots,
    WallRun,
    NoTossDrops,
    UseBlocking,
    NoDoorLight,
    RavenScroll,
    SoundTarget,
    DehHealth,
    Trace,
    DropOff,
    BoomScroll,
    Invisibility,
    SilentInstantFloors,
    SectorSounds,
    MissileClip,
    CrossDropOff,
    AnyBossDeath,
    Minotaur,
    Mushroom,
    MbfMonsterMove,
    CorpseGibs,
    NoBlockFriends,
    SpriteSort,
    Hitscan,
    LightLevel,
    PolyObj,
    MaskedMidTex,
    PointOnLine,
    MultiExit,
    Teleport,
    PushWindow,
}

impl CompatFlag {
    /// (flag word, bit). Word 1 is `compatflags`, word 2 is `compatflags2`.
    fn bit(self) -> (u8, u32) {
        use CompatFlag::*;
        match self {
            ShortTex => (1, 1 << 0),
            Stairs => (1, 1 << 1),
            LimitPain => (1, 1 << 2),
            SilentPickup => (1, 1 << 3),
            NoPassOver => (1, 1 << 4),
            SoundSlots => (1, 1 << 5),
            WallRun => (1, 1 << 6),
            NoTossDrops => (1, 1 << 7),
            UseBlocking => (1, 1 << 8),
            NoDoorLight => (1, 1 << 9),
            RavenScroll => (1, 1 << 10),
            SoundTarget => (1, 1 << 11),
            DehHealth => (1, 1 << 12),
            Trace => (1, 1 << 13),
            DropOff => (1, 1 << 14),
            BoomScroll => (1, 1 << 15),
            Invisibility => (1, 1 << 16),
            SilentInstantFloors => (1, 1 << 17),
            SectorSounds => (1, 1 << 18),
            MissileClip => (1, 1 << 19),
            CrossDropOff => (1, 1 << 20),
            AnyBossDeath => (1, 1 << 21),
            Minotaur => (1, 1 << 22),
            Mushroom => (1, 1 << 23),
            MbfMonsterMove => (1, 1 << 24),
            CorpseGibs => (1, 1 << 25),
            NoBlockFriends => (1, 1 << 26),
            SpriteSort => (1, 1 << 27),
            Hitscan => (1, 1 << 28),
            LightLevel => (1, 1 << 29),
            PolyObj => (1, 1 << 30),
            MaskedMidTex => (1, 1 << 31),
            PointOnLine => (2, 1 << 0),
            MultiExit => (2, 1 << 1),
            Teleport => (2, 1 << 2),
            PushWindow => (2, 1 << 3),
        }
    }
}

/// Compatibility settings and their command-line form.
///
/// The argument fragment is memoised per engine family. Every mutator clears the memo, so
/// reads never observe a fragment built from older settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CompatibilityOptions {
    flags: BTreeSet<CompatFlag>,
    /// PrBoom `-complevel`.
    compat_level: Option<i32>,
    #[serde(skip)]
    cached_args: RefCell<BTreeMap<EngineFamily, Vec<String>>>,
}

impl PartialEq for CompatibilityOptions {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags && self.compat_level == other.compat_level
    }
}

impl CompatibilityOptions {
    pub(crate) fn is_set(&self, flag: CompatFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub(crate) fn flags(&self) -> impl Iterator<Item = CompatFlag> + '_ {
        self.flags.iter().copied()
    }

    pub(crate) fn compat_level(&self) -> Option<i32> {
        self.compat_level
    }

    pub(crate) fn set_flag(&mut self, flag: CompatFlag, enabled: bool) {
        if enabled {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
        self.invalidate();
    }

    pub(crate) fn toggle_flag(&mut self, flag: CompatFlag) {
        let enabled = !self.is_set(flag);
        self.set_flag(flag, enabled);
    }

    pub(crate) fn set_compat_level(&mut self, level: Option<i32>) {
        self.compat_level = level;
        self.invalidate();
    }

    pub(crate) fn clear(&mut self) {
        self.flags.clear();
        self.compat_level = None;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.cached_args.get_mut().clear();
    }

    /// The two ZDoom flag words.
    pub(crate) fn flag_words(&self) -> (u32, u32) {
        self.flags.iter().fold((0, 0), |(w1, w2), flag| match flag.bit() {
            (1, bit) => (w1 | bit, w2),
            (_, bit) => (w1, w2 | bit),
        })
    }

    pub(crate) fn command_line_args(&self, family: EngineFamily) -> Vec<String> {
        if let Some(args) = self.cached_args.borrow().get(&family) {
            return args.clone();
        }
        let args = self.generate_args(family);
        self.cached_args.borrow_mut().insert(family, args.clone());
        args
    }

    fn generate_args(&self, family: EngineFamily) -> Vec<String> {
        let mut args = Vec::new();
        match family {
            EngineFamily::ZDoom => {
                let (word1, word2) = self.flag_words();
                if word1 != 0 {
                    args.push("+compatflags".to_string());
                    args.push(word1.to_string());
                }
                if word2 != 0 {
                    args.push("+compatflags2".to_string());
                    args.push(word2.to_string());
                }
            }
            EngineFamily::PrBoom => {
                if let Some(level) = self.compat_level {
                    args.push("-complevel".to_string());
                    args.push(level.to_string());
                }
            }
            EngineFamily::ChocolateDoom => {}
        }
        args
    }

    #[cfg(test)]
    fn is_cached(&self, family: EngineFamily) -> bool {
        self.cached_args.borrow().contains_key(&family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_reflects_flag_words() {
        let mut opts = CompatibilityOptions::default();
        opts.set_flag(CompatFlag::Stairs, true);
        opts.set_flag(CompatFlag::DropOff, true);
        opts.set_flag(CompatFlag::Teleport, true);
        assert_eq!(
            opts.command_line_args(EngineFamily::ZDoom),
            vec!["+compatflags", "16386", "+compatflags2", "4"]
        );
        assert!(opts.command_line_args(EngineFamily::ChocolateDoom).is_empty());
    }

    #[test]
    fn every_mutation_invalidates_the_cached_fragment() {
        let mut opts = CompatibilityOptions::default();
        assert!(opts.command_line_args(EngineFamily::ZDoom).is_empty());
        assert!(opts.is_cached(EngineFamily::ZDoom));

        opts.toggle_flag(CompatFlag::ShortTex);
        assert!(!opts.is_cached(EngineFamily::ZDoom));
        assert_eq!(
            opts.command_line_args(EngineFamily::ZDoom),
            vec!["+compatflags", "1"]
        );

        opts.set_compat_level(Some(9));
        assert_eq!(
            opts.command_line_args(EngineFamily::PrBoom),
            vec!["-complevel", "9"]
        );
        opts.set_compat_level(None);
        assert!(opts.command_line_args(EngineFamily::PrBoom).is_empty());

        opts.clear();
        assert!(opts.command_line_args(EngineFamily::ZDoom).is_empty());
    }

    #[test]
    fn deserialized_options_start_without_cache() {
        let opts: CompatibilityOptions =
            toml::from_str("flags = [\"mushroom\"]\ncompat_level = 2\n").expect("parse");
        assert!(!opts.is_cached(EngineFamily::ZDoom));
        assert!(opts.is_set(CompatFlag::Mushroom));
        assert_eq!(
            opts.command_line_args(EngineFamily::ZDoom),
            vec!["+compatflags", "8388608"]
        );
    }
}
