// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod clock;
mod compositor;
mod config;
mod corpus;
mod frame;
mod galaxy;
mod hud;
mod layers;
mod logfeed;
mod palette;
mod particle;
mod progress;
mod rain;
mod raster;
mod rng;
mod runtime;
mod scene;
mod sparks;
mod starfield;
mod surface;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::clock::{FramePacer, PerfStats};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, print_list_charsets,
    print_list_palettes, require_f64_range, scene_config, Args, ConfigError,
};
use crate::frame::Frame;
use crate::palette::PaletteScheme;
use crate::runtime::{ColorMode, LayerKind};
use crate::scene::Scene;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const ROTATION_KEY_FACTOR: f32 = 1.25;

fn build_info() -> &'static str {
    env!("COSMOBOOT_BUILD")
}

fn git_sha() -> &'static str {
    env!("COSMOBOOT_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn exit_on_config_error<T>(res: Result<T, ConfigError>) -> T {
    res.unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    })
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term == "linux" || term == "vt100" || term == "ansi" {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> Result<ColorMode, ConfigError> {
    match args.colormode {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8) | Some(256) => Ok(ColorMode::Color256),
        Some(24) | Some(32) => Ok(ColorMode::TrueColor),
        Some(m) => Err(ConfigError::Invalid {
            flag: "--colormode",
            reason: format!("{} (allowed: 0,16,8/256,24/32)", m),
        }),
    }
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

/// Logs go to `--log-file` when given. Without one, stderr would tear the
/// alternate screen, so nothing is logged unless RUST_LOG asks for it.
fn init_logging(args: &Args) {
    let default_filter = if args.log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = &args.log_file {
        match std::fs::File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("failed to open --log-file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
    let _ = builder.try_init();
}

enum Outcome {
    Continue,
    Quit,
}

fn handle_key(scene: &mut Scene, code: KeyCode, now: Instant) -> Outcome {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => return Outcome::Quit,
        KeyCode::Char(' ') => scene.regenerate(),
        KeyCode::Char('p') => {
            scene.toggle_pause(now);
            log::info!("{}", if scene.is_paused() { "paused" } else { "resumed" });
        }
        KeyCode::Char('g') => scene.toggle_layer(LayerKind::Galaxy, now),
        KeyCode::Char('m') => scene.toggle_layer(LayerKind::Rain, now),
        KeyCode::Char('s') => scene.toggle_layer(LayerKind::Sparks, now),
        KeyCode::Char('h') => {
            scene.toggle_hud();
            log::debug!("hud {}", if scene.hud_visible() { "on" } else { "off" });
        }
        KeyCode::Up | KeyCode::Down => {
            let factor = if code == KeyCode::Up {
                ROTATION_KEY_FACTOR
            } else {
                1.0 / ROTATION_KEY_FACTOR
            };
            scene.adjust_rotation(factor);
            log::debug!("rotation step {:.4}", scene.rotation_step());
        }
        KeyCode::Char(c @ '1'..='4') => {
            let i = c as usize - '1' as usize;
            if let Some(scheme) = PaletteScheme::ALL.get(i) {
                scene.set_palette(*scheme);
                log::info!("palette: {}", scheme.name());
            }
        }
        _ => {}
    }
    Outcome::Continue
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.list_palettes {
        print_list_palettes();
        return Ok(());
    }

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = exit_on_config_error(detect_color_mode(&args));

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(effective));
        }
        println!("  effective: {}", color_mode_label(effective));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        if git_sha().is_empty() {
            println!("Build: {}", build_info());
        } else {
            println!("Build: {} ({})", build_info(), git_sha());
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    init_logging(&args);

    let color_mode = exit_on_config_error(detect_color_mode(&args));
    let target_fps = exit_on_config_error(require_f64_range("--fps", args.fps, 1.0, 240.0));
    let duration_s = match args.duration {
        Some(s) if s.is_finite() && s <= 0.0 => None,
        Some(s) => Some(exit_on_config_error(require_f64_range(
            "--duration",
            s,
            0.1,
            86400.0,
        ))),
        None => None,
    };
    let exit_on_ready = args.exit_on_ready.map(|s| {
        Duration::from_secs_f64(exit_on_config_error(require_f64_range(
            "--exit-on-ready",
            s,
            0.0,
            3600.0,
        )))
    });
    let config = exit_on_config_error(scene_config(&args, color_mode, default_to_ascii()));

    log::info!(
        "starting: palette={} color_mode={} fps={} seed={:?}",
        config.palette.name(),
        color_mode_label(color_mode),
        target_fps,
        config.seed
    );

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;

    let start_time = Instant::now();
    let mut scene = Scene::new(config, w, h, start_time);
    let mut frame = Frame::new(w, h);

    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let mut ready_at: Option<Instant> = None;

    let mut pacer = FramePacer::new(target_fps, start_time);
    let mut perf = PerfStats::default();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        if let Outcome::Quit = handle_key(&mut scene, k.code, Instant::now()) {
                            running = false;
                            break;
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if pacer.is_due(now) {
                break;
            }

            let mut timeout = pacer.timeout(now);
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        let now = Instant::now();
        if let Some((nw, nh)) = pending_resize {
            scene.resize(nw, nh, now);
            frame = Frame::new(nw, nh);
            term.invalidate();
        }

        let work_start = Instant::now();
        let ran = scene.tick(now);
        scene.render(&mut frame, now);
        term.draw(&frame)?;
        perf.record(work_start.elapsed(), ran > 0, pacer.period());

        if let Some(delay) = exit_on_ready {
            if scene.is_ready() {
                let at = *ready_at.get_or_insert_with(|| {
                    log::info!("ready after {:.1}s", now.duration_since(start_time).as_secs_f32());
                    now
                });
                if now.duration_since(at) >= delay {
                    running = false;
                }
            }
        }

        pacer.mark(Instant::now());
    }

    drop(term);
    log::info!(
        "stopped after {} frames at {:.0}% loaded",
        perf.frames,
        scene.progress()
    );
    if args.perf_stats {
        println!("{}", perf.summary(start_time.elapsed(), target_fps));
    }

    Ok(())
}
