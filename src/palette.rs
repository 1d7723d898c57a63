// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::logfeed::CommandKind;
use crate::runtime::ColorMode;
use crate::surface::{stop, GradientStop, Rgb};

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    dr * dr + dg * dg + db * db
}

/// Nearest xterm-256 index, choosing between the 6x6x6 cube and the gray ramp.
pub fn rgb_to_ansi256(c: Rgb) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let q = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (q(c.r), q(c.g), q(c.b));
    let cube = Rgb::new(
        LEVELS[r6 as usize],
        LEVELS[g6 as usize],
        LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, Rgb::BLACK),
        239..=255 => (231, Rgb::WHITE),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, Rgb::new(v, v, v))
        }
    };

    if dist2(c, gray) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, Rgb::new(0, 0, 0)),
        (Color::DarkGrey, Rgb::new(128, 128, 128)),
        (Color::Grey, Rgb::new(192, 192, 192)),
        (Color::White, Rgb::new(255, 255, 255)),
        (Color::DarkRed, Rgb::new(128, 0, 0)),
        (Color::Red, Rgb::new(255, 0, 0)),
        (Color::DarkGreen, Rgb::new(0, 128, 0)),
        (Color::Green, Rgb::new(0, 255, 0)),
        (Color::DarkBlue, Rgb::new(0, 0, 128)),
        (Color::Blue, Rgb::new(0, 0, 255)),
        (Color::DarkCyan, Rgb::new(0, 128, 128)),
        (Color::Cyan, Rgb::new(0, 255, 255)),
        (Color::DarkMagenta, Rgb::new(128, 0, 128)),
        (Color::Magenta, Rgb::new(255, 0, 255)),
        (Color::DarkYellow, Rgb::new(128, 128, 0)),
        (Color::Yellow, Rgb::new(255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Terminal colour for `c`; `None` means the terminal default.
pub fn term_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteScheme {
    Cosmic,
    Ember,
    Glacier,
    Phosphor,
}

impl PaletteScheme {
    pub const ALL: [PaletteScheme; 4] = [
        PaletteScheme::Cosmic,
        PaletteScheme::Ember,
        PaletteScheme::Glacier,
        PaletteScheme::Phosphor,
    ];

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosmic" | "cosmos" | "default" => Ok(PaletteScheme::Cosmic),
            "ember" | "fire" => Ok(PaletteScheme::Ember),
            "glacier" | "ice" => Ok(PaletteScheme::Glacier),
            "phosphor" | "green" | "crt" => Ok(PaletteScheme::Phosphor),
            _ => Err(format!("invalid palette: {} (see --list-palettes)", s)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaletteScheme::Cosmic => "cosmic",
            PaletteScheme::Ember => "ember",
            PaletteScheme::Glacier => "glacier",
            PaletteScheme::Phosphor => "phosphor",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            PaletteScheme::Cosmic => "White stars, blue glow, violet nebula, green rain",
            PaletteScheme::Ember => "Warm stars, orange core, crimson nebula, amber rain",
            PaletteScheme::Glacier => "Cold stars, ice-blue core, deep blue nebula, cyan rain",
            PaletteScheme::Phosphor => "Monochrome green CRT look",
        }
    }
}

/// Every colour the compositor and HUD draw with.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePalette {
    pub scheme: PaletteScheme,
    pub background: Rgb,
    pub star: Rgb,
    pub glow: Rgb,
    pub core: [GradientStop; 4],
    pub nebula: [GradientStop; 3],
    pub rain_bright: Rgb,
    pub rain_dim: Rgb,
    pub sparks: [Rgb; 5],
    pub frame: Rgb,
    pub title: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub alert: Rgb,
    pub warn: Rgb,
    pub bar_from: Rgb,
    pub bar_to: Rgb,
    pub feed: [Rgb; CommandKind::COUNT],
}

const GREEN_400: Rgb = Rgb::new(74, 222, 128);
const CYAN_400: Rgb = Rgb::new(34, 211, 238);
const YELLOW_400: Rgb = Rgb::new(250, 204, 21);
const BLUE_400: Rgb = Rgb::new(96, 165, 250);
const PURPLE_400: Rgb = Rgb::new(192, 132, 252);
const RED_400: Rgb = Rgb::new(248, 113, 113);
const ORANGE_400: Rgb = Rgb::new(251, 146, 60);
const RED_500: Rgb = Rgb::new(239, 68, 68);
const PINK_400: Rgb = Rgb::new(244, 114, 182);
const GRAY_500: Rgb = Rgb::new(107, 114, 128);

/// Indexed by [`CommandKind::index`].
const FEED_COLORS: [Rgb; CommandKind::COUNT] = [
    CYAN_400,   // import
    YELLOW_400, // function
    BLUE_400,   // curl
    GREEN_400,  // echo
    PURPLE_400, // git
    RED_400,    // sudo
    ORANGE_400, // network
    RED_500,    // exploit
    PINK_400,   // decrypt
    GREEN_400,  // system
];

const SPARKS: [Rgb; 5] = [
    Rgb::new(34, 197, 94),
    Rgb::new(139, 92, 246),
    Rgb::new(59, 130, 246),
    Rgb::new(236, 72, 153),
    Rgb::new(239, 68, 68),
];

impl ScenePalette {
    pub fn for_scheme(scheme: PaletteScheme) -> Self {
        let cosmic = ScenePalette {
            scheme,
            background: Rgb::BLACK,
            star: Rgb::WHITE,
            glow: Rgb::new(79, 193, 255),
            core: [
                stop(0.0, 255, 255, 255, 0.8),
                stop(0.3, 79, 193, 255, 0.6),
                stop(0.6, 138, 43, 226, 0.4),
                stop(1.0, 0, 0, 0, 0.0),
            ],
            nebula: [
                stop(0.0, 138, 43, 226, 0.2),
                stop(0.5, 75, 0, 130, 0.1),
                stop(1.0, 0, 0, 0, 0.0),
            ],
            rain_bright: Rgb::new(0, 255, 65),
            rain_dim: Rgb::new(0, 143, 17),
            sparks: SPARKS,
            frame: Rgb::new(22, 101, 52),
            title: CYAN_400,
            text: GREEN_400,
            muted: GRAY_500,
            alert: RED_400,
            warn: YELLOW_400,
            bar_from: GREEN_400,
            bar_to: CYAN_400,
            feed: FEED_COLORS,
        };

        match scheme {
            PaletteScheme::Cosmic => cosmic,
            PaletteScheme::Ember => ScenePalette {
                star: Rgb::new(255, 236, 210),
                glow: Rgb::new(255, 150, 60),
                core: [
                    stop(0.0, 255, 250, 235, 0.8),
                    stop(0.3, 255, 150, 60, 0.6),
                    stop(0.6, 200, 30, 40, 0.4),
                    stop(1.0, 0, 0, 0, 0.0),
                ],
                nebula: [
                    stop(0.0, 200, 30, 40, 0.2),
                    stop(0.5, 110, 10, 20, 0.1),
                    stop(1.0, 0, 0, 0, 0.0),
                ],
                rain_bright: Rgb::new(255, 176, 0),
                rain_dim: Rgb::new(150, 64, 0),
                frame: Rgb::new(124, 45, 18),
                title: ORANGE_400,
                text: Rgb::new(253, 186, 116),
                bar_from: Rgb::new(234, 88, 12),
                bar_to: YELLOW_400,
                ..cosmic
            },
            PaletteScheme::Glacier => ScenePalette {
                star: Rgb::new(220, 240, 255),
                glow: Rgb::new(150, 220, 255),
                core: [
                    stop(0.0, 255, 255, 255, 0.8),
                    stop(0.3, 150, 220, 255, 0.6),
                    stop(0.6, 30, 80, 200, 0.4),
                    stop(1.0, 0, 0, 0, 0.0),
                ],
                nebula: [
                    stop(0.0, 30, 80, 200, 0.2),
                    stop(0.5, 10, 30, 110, 0.1),
                    stop(1.0, 0, 0, 0, 0.0),
                ],
                rain_bright: Rgb::new(180, 255, 255),
                rain_dim: Rgb::new(40, 120, 160),
                frame: Rgb::new(30, 64, 110),
                title: Rgb::new(186, 230, 253),
                text: Rgb::new(125, 211, 252),
                bar_from: BLUE_400,
                bar_to: Rgb::new(186, 230, 253),
                ..cosmic
            },
            PaletteScheme::Phosphor => ScenePalette {
                star: Rgb::new(200, 255, 200),
                glow: Rgb::new(120, 255, 120),
                core: [
                    stop(0.0, 220, 255, 220, 0.8),
                    stop(0.3, 80, 220, 80, 0.6),
                    stop(0.6, 0, 110, 30, 0.4),
                    stop(1.0, 0, 0, 0, 0.0),
                ],
                nebula: [
                    stop(0.0, 0, 110, 30, 0.2),
                    stop(0.5, 0, 60, 15, 0.1),
                    stop(1.0, 0, 0, 0, 0.0),
                ],
                sparks: [
                    Rgb::new(34, 197, 94),
                    Rgb::new(134, 239, 172),
                    Rgb::new(22, 163, 74),
                    Rgb::new(187, 247, 208),
                    Rgb::new(74, 222, 128),
                ],
                title: Rgb::new(134, 239, 172),
                bar_to: Rgb::new(134, 239, 172),
                feed: [GREEN_400; CommandKind::COUNT],
                ..cosmic
            },
        }
    }

    pub fn feed_color(&self, kind: CommandKind) -> Rgb {
        self.feed[kind.index()]
    }

    pub fn spark_color(&self, tint: u8) -> Rgb {
        self.sparks[tint as usize % self.sparks.len()]
    }
}

impl Default for ScenePalette {
    fn default() -> Self {
        Self::for_scheme(PaletteScheme::Cosmic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_maps_primaries_and_grays() {
        assert_eq!(rgb_to_ansi256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256(Rgb::BLACK), 16);
        assert_eq!(rgb_to_ansi256(Rgb::WHITE), 231);
        assert_eq!(rgb_to_ansi256(Rgb::new(128, 128, 128)), 244);
    }

    #[test]
    fn color16_picks_nearest_entry() {
        assert_eq!(rgb_to_color16(Rgb::new(0, 250, 60)), Color::Green);
        assert_eq!(rgb_to_color16(Rgb::new(10, 10, 20)), Color::Black);
    }

    #[test]
    fn mono_defers_to_terminal_default() {
        assert_eq!(term_color(Rgb::WHITE, ColorMode::Mono), None);
        assert_eq!(
            term_color(Rgb::new(1, 2, 3), ColorMode::TrueColor),
            Some(Color::Rgb { r: 1, g: 2, b: 3 })
        );
    }

    #[test]
    fn every_scheme_parses_by_name() {
        for scheme in PaletteScheme::ALL {
            assert_eq!(PaletteScheme::parse(scheme.name()), Ok(scheme));
            assert_eq!(ScenePalette::for_scheme(scheme).scheme, scheme);
        }
        assert!(PaletteScheme::parse("plaid").is_err());
    }

    #[test]
    fn feed_colors_follow_command_kind() {
        let p = ScenePalette::default();
        assert_eq!(p.feed_color(CommandKind::Import), CYAN_400);
        assert_eq!(p.feed_color(CommandKind::Exploit), RED_500);
        assert_eq!(p.spark_color(7), p.sparks[2]);
    }
}
