// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::charset::{build_chars, charset_from_str, parse_user_hex_chars, Charset, CHARSET_NAMES};
use crate::corpus;
use crate::galaxy::GalaxyParams;
use crate::layers::{GalaxyConfig, RainConfig, SparkConfig};
use crate::logfeed::TypingTiming;
use crate::palette::PaletteScheme;
use crate::progress::ProgressMode;
use crate::rain::RainParams;
use crate::runtime::{ColorMode, MsRange};
use crate::scene::SceneConfig;
use crate::starfield::StarFieldParams;
use crate::surface::Rgb;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  cosmoboot --palette cosmic --charset auto --fps 60 --stars 150 --arms 4 --points 80 --rotation 0.005 --cell 20 --density 3 --trail 0.05 --typems 20,60 --pausems 500,1500 --injectms 150,350";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to apply {flag} {value} (min {min} max {max})")]
    OutOfRange {
        flag: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("failed to apply {flag} {value} (must be a finite number)")]
    NotFinite { flag: &'static str, value: String },
    #[error("failed to apply {flag}: {reason}")]
    Invalid { flag: &'static str, reason: String },
    #[error("failed to read {flag} {}: {source}", path.display())]
    Script {
        flag: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            out.push_str("      \x1b[32mExample:\x1b[0m");
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("  cosmoboot") {
            out.push_str("  \x1b[1;34mcosmoboot\x1b[0m");
            out.push_str(rest);
        } else if line.starts_with("  -") {
            out.push_str("\x1b[33m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "cosmoboot", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "exit-on-ready",
        value_name = "SECS",
        help_heading = "GENERAL",
        help = "Exit N seconds after progress reaches 100 (min 0 max 3600)"
    )]
    pub exit_on_ready: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed every random stream for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Write RUST_LOG-filtered logs to PATH (default filter: info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(long = "no-hud", help_heading = "GENERAL", help = "Start with the HUD hidden")]
    pub no_hud: bool,

    #[arg(
        long = "stars",
        default_value_t = 150,
        help_heading = "SCENE",
        help = "Background star count (min 0 max 5000)"
    )]
    pub stars: usize,

    #[arg(
        long = "arms",
        default_value_t = 4,
        help_heading = "SCENE",
        help = "Spiral arm count (min 0 max 16)"
    )]
    pub arms: usize,

    #[arg(
        long = "points",
        default_value_t = 80,
        help_heading = "SCENE",
        help = "Points per spiral arm (min 1 max 1000)"
    )]
    pub points: usize,

    #[arg(
        long = "rotation",
        default_value_t = 0.005,
        help_heading = "SCENE",
        help = "Galaxy rotation per frame in radians (min 0 max 0.1)"
    )]
    pub rotation: f32,

    #[arg(
        long = "sweep",
        default_value_t = 1.5,
        help_heading = "SCENE",
        help = "Arm sweep in multiples of pi (min 0.1 max 8)"
    )]
    pub sweep: f32,

    #[arg(long = "no-core", help_heading = "SCENE", help = "Hide the core glow")]
    pub no_core: bool,

    #[arg(long = "no-nebula", help_heading = "SCENE", help = "Hide the nebula")]
    pub no_nebula: bool,

    #[arg(long = "no-galaxy", help_heading = "SCENE", help = "Start with the galaxy layer off")]
    pub no_galaxy: bool,

    #[arg(long = "no-rain", help_heading = "SCENE", help = "Start with the rain layer off")]
    pub no_rain: bool,

    #[arg(long = "no-sparks", help_heading = "SCENE", help = "Start with the spark layer off")]
    pub no_sparks: bool,

    #[arg(
        long = "galaxy-opacity",
        default_value_t = crate::scene::DEFAULT_GALAXY_OPACITY,
        help_heading = "SCENE",
        help = "Galaxy layer opacity (min 0 max 1)"
    )]
    pub galaxy_opacity: f32,

    #[arg(
        long = "sparks-opacity",
        default_value_t = crate::scene::DEFAULT_SPARK_OPACITY,
        help_heading = "SCENE",
        help = "Spark layer opacity (min 0 max 1)"
    )]
    pub sparks_opacity: f32,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "RAIN",
        help = "Rain alphabet preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        value_name = "HEX,...",
        help_heading = "RAIN",
        help = "Rain alphabet as hex code points, replaces --charset"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "glyphs",
        value_name = "TEXT",
        help_heading = "RAIN",
        help = "Rain alphabet as literal text, replaces --charset"
    )]
    pub glyphs: Option<String>,

    #[arg(
        long = "cell",
        default_value_t = 20.0,
        help_heading = "RAIN",
        help = "Rain column width in pixels (min 4 max 200)"
    )]
    pub cell: f32,

    #[arg(
        short = 'd',
        long = "density",
        default_value_t = 3,
        help_heading = "RAIN",
        help = "Glyphs per rain column (min 1 max 20)"
    )]
    pub density: usize,

    #[arg(
        long = "trail",
        default_value_t = 0.05,
        help_heading = "RAIN",
        help = "Trail fade alpha per frame (min 0.005 max 1)"
    )]
    pub trail: f32,

    #[arg(
        long = "rain-opacity",
        default_value_t = crate::scene::DEFAULT_RAIN_OPACITY,
        help_heading = "RAIN",
        help = "Rain layer opacity (min 0 max 1)"
    )]
    pub rain_opacity: f32,

    #[arg(
        long = "typems",
        default_value = "20,60",
        help_heading = "FEED",
        help = "Per-character typing delay in ms: LOW,HIGH (max 5000)"
    )]
    pub type_ms: MsRange,

    #[arg(
        long = "pausems",
        default_value = "500,1500",
        help_heading = "FEED",
        help = "Pause after each typed line in ms: LOW,HIGH (max 60000)"
    )]
    pub pause_ms: MsRange,

    #[arg(
        long = "injectms",
        default_value = "150,350",
        help_heading = "FEED",
        help = "Command feed interval in ms: LOW,HIGH (min 10 max 60000)"
    )]
    pub inject_ms: MsRange,

    #[arg(
        long = "script",
        value_name = "PATH",
        help_heading = "FEED",
        help = "Initialization log script, one line per entry"
    )]
    pub script: Option<PathBuf>,

    #[arg(
        long = "commands",
        value_name = "PATH",
        help_heading = "FEED",
        help = "Command corpus, one command per line"
    )]
    pub commands: Option<PathBuf>,

    #[arg(
        long = "load-secs",
        help_heading = "FEED",
        help = "Fill the progress bar linearly over N seconds (min 1 max 3600)"
    )]
    pub load_secs: Option<f64>,

    #[arg(
        short = 'c',
        long = "palette",
        default_value = "cosmic",
        help_heading = "APPEARANCE",
        help = "Palette (see --list-palettes)"
    )]
    pub palette: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-palettes",
        help_heading = "HELP",
        help = "List available palettes and exit"
    )]
    pub list_palettes: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn require_f64_range(flag: &'static str, v: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite {
            flag,
            value: v.to_string(),
        });
    }
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            flag,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

pub fn require_f32_range(flag: &'static str, v: f32, min: f32, max: f32) -> Result<f32, ConfigError> {
    require_f64_range(flag, v as f64, min as f64, max as f64)
        .map(|_| v)
        .map_err(|e| match e {
            // Report the value as typed rather than its widened form.
            ConfigError::OutOfRange { flag, .. } => ConfigError::OutOfRange {
                flag,
                value: v.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            },
            ConfigError::NotFinite { flag, .. } => ConfigError::NotFinite {
                flag,
                value: v.to_string(),
            },
            other => other,
        })
}

pub fn require_usize_range(
    flag: &'static str,
    v: usize,
    min: usize,
    max: usize,
) -> Result<usize, ConfigError> {
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            flag,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

pub fn require_ms_range(
    flag: &'static str,
    r: MsRange,
    min: u32,
    max: u32,
) -> Result<MsRange, ConfigError> {
    for v in [r.low, r.high] {
        if v < min || v > max {
            return Err(ConfigError::OutOfRange {
                flag,
                value: format!("{},{}", r.low, r.high),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    Ok(r)
}

fn read_lines(flag: &'static str, path: &Path) -> Result<Vec<String>, ConfigError> {
    corpus::load_script(path).map_err(|source| ConfigError::Script {
        flag,
        path: path.to_path_buf(),
        source,
    })
}

fn rain_alphabet(args: &Args, default_to_ascii: bool) -> Result<Vec<char>, ConfigError> {
    let mut extra: Vec<char> = Vec::new();
    if let Some(hex) = &args.chars {
        extra = parse_user_hex_chars(hex).map_err(|reason| ConfigError::Invalid {
            flag: "--chars",
            reason,
        })?;
    }
    if let Some(text) = &args.glyphs {
        extra.extend(text.chars());
    }

    let charset = if args.chars.is_some() || args.glyphs.is_some() {
        Charset::NONE
    } else {
        charset_from_str(&args.charset, default_to_ascii).map_err(|reason| ConfigError::Invalid {
            flag: "--charset",
            reason,
        })?
    };
    Ok(build_chars(charset, &extra))
}

/// Validates every scene option and assembles the [`SceneConfig`].
pub fn scene_config(
    args: &Args,
    color_mode: ColorMode,
    default_to_ascii: bool,
) -> Result<SceneConfig, ConfigError> {
    let palette = PaletteScheme::parse(&args.palette).map_err(|reason| ConfigError::Invalid {
        flag: "--palette",
        reason,
    })?;

    let galaxy = GalaxyConfig {
        stars: StarFieldParams {
            count: require_usize_range("--stars", args.stars, 0, 5000)?,
            ..StarFieldParams::default()
        },
        galaxy: GalaxyParams {
            arms: require_usize_range("--arms", args.arms, 0, 16)?,
            points_per_arm: require_usize_range("--points", args.points, 1, 1000)?,
            sweep: require_f32_range("--sweep", args.sweep, 0.1, 8.0)? * std::f32::consts::PI,
            ..GalaxyParams::default()
        },
        rotation_step: require_f32_range("--rotation", args.rotation, 0.0, 0.1)?,
        style: crate::compositor::GalaxyStyle {
            core: !args.no_core,
            nebula: !args.no_nebula,
            ..Default::default()
        },
    };

    let rain = RainConfig {
        params: RainParams {
            cell_width: require_f32_range("--cell", args.cell, 4.0, 200.0)?,
            density: require_usize_range("--density", args.density, 1, 20)?,
            ..RainParams::default()
        },
        alphabet: rain_alphabet(args, default_to_ascii)?,
        trail_alpha: require_f32_range("--trail", args.trail, 0.005, 1.0)?,
    };

    let type_ms = require_ms_range("--typems", args.type_ms, 0, 5000)?;
    let pause_ms = require_ms_range("--pausems", args.pause_ms, 0, 60000)?;
    let inject = require_ms_range("--injectms", args.inject_ms, 10, 60000)?;

    let progress = match args.load_secs {
        Some(s) => ProgressMode::Linear(Duration::from_secs_f64(require_f64_range(
            "--load-secs",
            s,
            1.0,
            3600.0,
        )?)),
        None => ProgressMode::Stochastic,
    };

    let mut config = SceneConfig {
        seed: args.seed,
        galaxy,
        rain,
        sparks: SparkConfig::default(),
        galaxy_opacity: require_f32_range("--galaxy-opacity", args.galaxy_opacity, 0.0, 1.0)?,
        rain_opacity: require_f32_range("--rain-opacity", args.rain_opacity, 0.0, 1.0)?,
        spark_opacity: require_f32_range("--sparks-opacity", args.sparks_opacity, 0.0, 1.0)?,
        enabled: [!args.no_galaxy, !args.no_rain, !args.no_sparks],
        loading_timing: TypingTiming {
            char_delay: type_ms,
            pause: pause_ms,
            ..TypingTiming::loading()
        },
        inject,
        progress,
        palette,
        color_mode,
        background: match args.color_bg {
            ColorBg::Black => Some(Rgb::BLACK),
            ColorBg::DefaultBackground | ColorBg::Transparent => None,
        },
        ascii: default_to_ascii,
        hud: !args.no_hud,
        ..SceneConfig::default()
    };

    if let Some(path) = &args.script {
        config.loading_script = read_lines("--script", path)?;
    }
    if let Some(path) = &args.commands {
        config.commands = read_lines("--commands", path)?;
    }
    Ok(config)
}

fn print_list_heading(title: &str, flag: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}\x1b[0m", title);
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with {}.\x1b[0m", flag);
    } else {
        println!("{}", title);
        println!("NOTE: Use only the VALUE (left side) with {}.", flag);
    }
    println!();
    println!("VALUE        DESCRIPTION");
}

pub fn print_list_charsets() {
    print_list_heading("AVAILABLE CHARSET PRESETS:", "--charset");
    for (name, about) in CHARSET_NAMES {
        println!("{:<12} {}", name, about);
    }
}

pub fn print_list_palettes() {
    print_list_heading("AVAILABLE PALETTES:", "--palette");
    for (i, scheme) in PaletteScheme::ALL.iter().enumerate() {
        println!("{:<12} {} (key {})", scheme.name(), scheme.describe(), i + 1);
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  cosmoboot [OPTIONS]\n\nGENERAL:\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: cosmoboot --duration 10\n\n  -s, --screensaver\n      Exit on the first keypress.\n      Example: cosmoboot -s\n\n  --exit-on-ready <seconds>\n      Exit this long after the progress bar fills.\n      Example: cosmoboot --load-secs 8 --exit-on-ready 2\n\n  --seed <number>\n      Reproducible run: every random stream is seeded from it.\n      Example: cosmoboot --seed 42\n\n  --log-file <path>\n      Write logs to a file (filter with RUST_LOG).\n      Example: RUST_LOG=debug cosmoboot --log-file boot.log\n\n  --no-hud\n      Start with the overlay hidden (toggle with h).\n\nSCENE:\n  --stars <n>, --arms <n>, --points <n>\n      Star count (0..5000), arm count (0..16), points per arm (1..1000).\n      Example: cosmoboot --arms 6 --points 120\n\n  --rotation <radians>\n      Rotation per frame (0..0.1). Up/Down adjust it live.\n      Example: cosmoboot --rotation 0.01\n\n  --sweep <multiples of pi>\n      Angle swept along each arm (0.1..8).\n      Example: cosmoboot --sweep 2\n\n  --no-core, --no-nebula\n      Hide the core glow or the nebula.\n\n  --no-galaxy, --no-rain, --no-sparks\n      Start with a layer off (toggle with g, m, s).\n\n  --galaxy-opacity <0..1>, --sparks-opacity <0..1>\n      Layer opacity in the composite.\n\nRAIN:\n  --charset <name>\n      Alphabet preset (see --list-charsets).\n      Example: cosmoboot --charset katakana\n\n  --chars <hex,...>\n      Alphabet from hex code points.\n      Example: cosmoboot --chars 30,31\n\n  --glyphs <text>\n      Alphabet from literal text.\n      Example: cosmoboot --glyphs \"01<>\"\n\n  --cell <px>, -d, --density <n>\n      Column width (4..200) and glyphs per column (1..20).\n\n  --trail <alpha>\n      Fade per frame (0.005..1); lower leaves longer trails.\n\n  --rain-opacity <0..1>\n      Rain layer opacity in the composite.\n\nFEED:\n  --typems <low,high>\n      Typing delay per character in ms.\n      Example: cosmoboot --typems 10,30\n\n  --pausems <low,high>\n      Pause after each line in ms.\n\n  --injectms <low,high>\n      Command feed interval in ms (min 10).\n\n  --script <path>, --commands <path>\n      Replace the log script or the command corpus.\n\n  --load-secs <seconds>\n      Fill the progress bar linearly (1..3600).\n\nAPPEARANCE:\n  -c, --palette <name>\n      Palette (see --list-palettes). Keys 1-4 switch live.\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n\n  --color-bg <black|default-background|transparent>\n      Background mode.\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n\n  --perf-stats\n      Print performance statistics summary on exit.\n      Example: cosmoboot --duration 10 --perf-stats\n\nKEYS:\n  q/Esc quit, space regenerate, p pause, g/m/s toggle layers,\n  h toggle HUD, Up/Down rotation speed, 1-4 palettes\n\nHELP:\n  --check-bitcolor, --help, --help-detail, --list-charsets, --list-palettes, -v, -i\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }
    println!();
    print_list_charsets();
    println!();
    print_list_palettes();
}
