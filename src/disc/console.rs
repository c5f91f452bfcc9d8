//! Console detection from disc image paths
//!
//! Detection is purely filename based: the lower-cased path is run through an
//! ordered rule table and the first matching rule decides the console.

use std::fmt;

/// Target console of a disc image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Console {
    Ps1,
    Ps2,
    Ps3,
    Ps4,
    Ps5,
    Wii,
    Xbox,
    Xbox360,
    Pc,
    Unknown,
}

impl Console {
    /// Label shown in the UI and used in messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ps1 => "PS1",
            Self::Ps2 => "PS2",
            Self::Ps3 => "PS3",
            Self::Ps4 => "PS4",
            Self::Ps5 => "PS5",
            Self::Wii => "Wii",
            Self::Xbox => "Xbox",
            Self::Xbox360 => "Xbox 360",
            Self::Pc => "PC",
            Self::Unknown => "Unknown",
        }
    }

    /// How to boot a burned disc of this console on real hardware
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Ps1 => {
                "PlayStation 1:\n\
                 - Burn CD-R at 4x or slower.\n\
                 - Requires modchip or boot disc (PS-X-Change).\n\
                 - ISO + CUE format is preferred."
            }
            Self::Ps2 => {
                "PlayStation 2:\n\
                 - Requires Free McBoot (FMCB) on memory card.\n\
                 - ESR patched games can boot from DVD-R.\n\
                 - Insert disc, launch ESR, game should start."
            }
            Self::Ps3 => {
                "PlayStation 3:\n\
                 - Requires CFW or HEN.\n\
                 - Burn ISO to disc, or better: use USB/FTP.\n\
                 - Blu-ray burning not required unless for movie ISO."
            }
            Self::Xbox => {
                "Original Xbox:\n\
                 - Requires softmod (e.g., SID 5.11/5.12).\n\
                 - Burn SID installer to DVD-R.\n\
                 - Use Splinter Cell or similar with exploit save."
            }
            Self::Xbox360 => {
                "Xbox 360:\n\
                 - Requires flashed drive (LT+ firmware).\n\
                 - Use .DVD file to burn properly with layer break.\n\
                 - ImgBurn supports this automatically."
            }
            Self::Wii => {
                "Nintendo Wii:\n\
                 - Requires Homebrew Channel installed.\n\
                 - Use NeoGamma or USB Loader GX to run backups.\n\
                 - Burn to DVD-R for best compatibility."
            }
            Self::Pc => {
                "PC:\n\
                 - Just insert disc and run.\n\
                 - No extra mods or patching required."
            }
            Self::Ps4 | Self::Ps5 | Self::Unknown => {
                "No specific instructions available for this console."
            }
        }
    }
}

impl fmt::Display for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One detection rule: a predicate over the lower-cased path and its console
pub struct ConsoleRule {
    pub console: Console,
    pub matches: fn(&str) -> bool,
}

fn is_iso(path: &str) -> bool {
    path.ends_with(".iso")
}

fn is_ps3_family(path: &str) -> bool {
    is_iso(path) && ["ps3", "ps4", "ps5"].iter().any(|tag| path.contains(tag))
}

/// Detection rules in evaluation order
///
/// The generic `.iso` rule sits before the PS3/PS4/PS5 rules, so those can
/// never match: any `.iso` that is not PS2/Wii/Xbox 360 is reported as PC.
static RULES: &[ConsoleRule] = &[
    ConsoleRule {
        console: Console::Ps1,
        matches: |p: &str| p.ends_with(".bin") || p.ends_with(".cue"),
    },
    ConsoleRule {
        console: Console::Ps2,
        matches: |p: &str| p.contains("ps2") && is_iso(p),
    },
    ConsoleRule {
        console: Console::Wii,
        matches: |p: &str| p.contains("wii") && is_iso(p),
    },
    ConsoleRule {
        console: Console::Xbox360,
        matches: |p: &str| p.contains("xbox360") && is_iso(p),
    },
    ConsoleRule {
        console: Console::Pc,
        matches: is_iso,
    },
    ConsoleRule {
        console: Console::Ps3,
        matches: |p: &str| is_ps3_family(p) && p.contains("ps3"),
    },
    ConsoleRule {
        console: Console::Ps4,
        matches: |p: &str| is_ps3_family(p) && p.contains("ps4"),
    },
    ConsoleRule {
        console: Console::Ps5,
        matches: |p: &str| is_ps3_family(p) && p.contains("ps5"),
    },
];

/// The ordered detection rules
pub fn console_rules() -> &'static [ConsoleRule] {
    RULES
}

/// Detect the target console of a disc image from its path
pub fn detect_console(path: &str) -> Console {
    let lower = path.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| rule.console)
        .unwrap_or(Console::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_cue_is_ps1() {
        assert_eq!(detect_console("game.bin"), Console::Ps1);
        assert_eq!(detect_console("Crash Bandicoot (USA).CUE"), Console::Ps1);
        // Extension wins over any console tag
        assert_eq!(detect_console("ps2_thing.bin"), Console::Ps1);
    }

    #[test]
    fn test_tagged_isos() {
        assert_eq!(detect_console("my_wii_game.iso"), Console::Wii);
        assert_eq!(detect_console("Okami PS2.ISO"), Console::Ps2);
        assert_eq!(detect_console("halo3_xbox360.iso"), Console::Xbox360);
    }

    #[test]
    fn test_directory_names_count() {
        assert_eq!(detect_console("/roms/ps2/Okami (USA).iso"), Console::Ps2);
        assert_eq!(detect_console(r"D:\Wii\Mario Kart.iso"), Console::Wii);
    }

    #[test]
    fn test_ps2_checked_before_wii() {
        assert_eq!(detect_console("ps2_wii_mixup.iso"), Console::Ps2);
    }

    #[test]
    fn test_plain_iso_is_pc() {
        assert_eq!(detect_console("random.iso"), Console::Pc);
        // "xbox" alone is not the Xbox 360 tag
        assert_eq!(detect_console("xbox_game.iso"), Console::Pc);
    }

    #[test]
    fn test_ps3_family_falls_through_to_pc() {
        assert_eq!(detect_console("demons_souls_ps3.iso"), Console::Pc);
        assert_eq!(detect_console("bloodborne_ps4.iso"), Console::Pc);
        assert_eq!(detect_console("astro_ps5.iso"), Console::Pc);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(detect_console("noext"), Console::Unknown);
        assert_eq!(detect_console("ps2_game.chd"), Console::Unknown);
        assert_eq!(detect_console(""), Console::Unknown);
    }

    #[test]
    fn test_detection_is_deterministic() {
        for path in ["game.bin", "my_wii_game.iso", "random.iso", "noext"] {
            assert_eq!(detect_console(path), detect_console(path));
        }
    }

    #[test]
    fn test_rule_order() {
        let order: Vec<Console> = console_rules().iter().map(|r| r.console).collect();
        assert_eq!(
            order,
            vec![
                Console::Ps1,
                Console::Ps2,
                Console::Wii,
                Console::Xbox360,
                Console::Pc,
                Console::Ps3,
                Console::Ps4,
                Console::Ps5,
            ]
        );
    }

    #[test]
    fn test_ps3_rules_match_in_isolation() {
        let ps3 = console_rules().iter().find(|r| r.console == Console::Ps3).unwrap();
        assert!((ps3.matches)("game_ps3.iso"));
        assert!(!(ps3.matches)("game_ps3.bin"));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Console::Xbox360.to_string(), "Xbox 360");
        assert_eq!(Console::Pc.to_string(), "PC");
    }

    #[test]
    fn test_instructions_fallback() {
        assert!(Console::Ps2.instructions().contains("Free McBoot"));
        assert_eq!(
            Console::Unknown.instructions(),
            "No specific instructions available for this console."
        );
    }
}
