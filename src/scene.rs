// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::corpus;
use crate::frame::Frame;
use crate::hud::{self, HudLayout, HudStyle, HudView};
use crate::layers::{
    AnimatedLayer, GalaxyConfig, GalaxyLayer, Layer, RainConfig, RainLayer, SparkConfig, SparkLayer,
};
use crate::logfeed::{
    CommandInjector, ScriptedTyper, Tone, TypingTiming, COMMAND_HISTORY_CAP, COMMAND_PREFILL,
    LOADING_HISTORY_CAP, LOADING_NUMBER_BASE,
};
use crate::palette::{PaletteScheme, ScenePalette};
use crate::progress::{ProgressDriver, ProgressMode, StatusBoard};
use crate::raster::Canvas;
use crate::rng::{source_for, RandomSource};
use crate::runtime::{ColorMode, LayerKind, MsRange};
use crate::surface::{Rgb, Surface};

pub const DEFAULT_GALAXY_OPACITY: f32 = 0.9;
pub const DEFAULT_RAIN_OPACITY: f32 = 0.6;
pub const DEFAULT_SPARK_OPACITY: f32 = 0.8;
pub const DEFAULT_INJECT: MsRange = MsRange::new(150, 350);
pub const CURSOR_BLINK: Duration = Duration::from_millis(500);

/// Bottom to top. Rain never clears, so anything beneath it is buried under
/// its black trail fill.
pub const BLEND_ORDER: [LayerKind; 3] = [LayerKind::Rain, LayerKind::Galaxy, LayerKind::Sparks];

pub const MIN_ROTATION_STEP: f32 = 0.0;
pub const MAX_ROTATION_STEP: f32 = 0.1;

// Keeps the per-layer streams apart under one `--seed`.
const SALT_GALAXY: u64 = 1;
const SALT_RAIN: u64 = 2;
const SALT_SPARKS: u64 = 3;
const SALT_FEEDS: u64 = 4;

/// Everything a scene needs, already validated.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub seed: Option<u64>,
    pub galaxy: GalaxyConfig,
    pub rain: RainConfig,
    pub sparks: SparkConfig,
    pub galaxy_opacity: f32,
    pub rain_opacity: f32,
    pub spark_opacity: f32,
    pub enabled: [bool; 3],
    pub loading_timing: TypingTiming,
    pub boot_timing: TypingTiming,
    pub inject: MsRange,
    pub loading_script: Vec<String>,
    pub boot_script: Vec<String>,
    pub commands: Vec<String>,
    pub progress: ProgressMode,
    pub palette: PaletteScheme,
    pub color_mode: ColorMode,
    pub background: Option<Rgb>,
    pub ascii: bool,
    pub hud: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            galaxy: GalaxyConfig::default(),
            rain: RainConfig::default(),
            sparks: SparkConfig::default(),
            galaxy_opacity: DEFAULT_GALAXY_OPACITY,
            rain_opacity: DEFAULT_RAIN_OPACITY,
            spark_opacity: DEFAULT_SPARK_OPACITY,
            enabled: [true; 3],
            loading_timing: TypingTiming::loading(),
            boot_timing: TypingTiming::boot_steps(),
            inject: DEFAULT_INJECT,
            loading_script: corpus::owned(corpus::LOADING_SEQUENCE),
            boot_script: corpus::owned(corpus::BOOT_STEPS),
            commands: corpus::owned(corpus::COMMANDS),
            progress: ProgressMode::Stochastic,
            palette: PaletteScheme::Cosmic,
            color_mode: ColorMode::TrueColor,
            background: None,
            ascii: false,
            hud: true,
        }
    }
}

fn slot(kind: LayerKind) -> usize {
    match kind {
        LayerKind::Galaxy => 0,
        LayerKind::Rain => 1,
        LayerKind::Sparks => 2,
    }
}

/// The whole boot screen: three animated layers, the feeds behind the HUD
/// and the canvas they are composited into.
pub struct Scene {
    cols: u16,
    rows: u16,
    ascii: bool,
    color_mode: ColorMode,
    background: Option<Rgb>,
    galaxy: GalaxyLayer<Canvas>,
    rain: RainLayer<Canvas>,
    sparks: SparkLayer<Canvas>,
    enabled: [bool; 3],
    canvas: Canvas,
    palette: ScenePalette,
    boot: ScriptedTyper,
    loading: ScriptedTyper,
    commands: CommandInjector,
    progress: ProgressDriver,
    status: StatusBoard,
    feed_rng: Box<dyn RandomSource>,
    hud_visible: bool,
    paused: bool,
    started: Instant,
}

impl Scene {
    pub fn new(config: SceneConfig, cols: u16, rows: u16, now: Instant) -> Self {
        let seed = config.seed;
        let mut feed_rng = source_for(seed, SALT_FEEDS);

        let boot_cap = config.boot_script.len();
        let mut boot = ScriptedTyper::new(config.boot_script, config.boot_timing, Tone::Ok, boot_cap);
        let mut loading = ScriptedTyper::new(
            config.loading_script,
            config.loading_timing,
            Tone::Info,
            LOADING_HISTORY_CAP,
        )
        .with_number_base(LOADING_NUMBER_BASE);
        let mut commands = CommandInjector::new(config.commands, config.inject, COMMAND_HISTORY_CAP);
        commands.prefill(COMMAND_PREFILL, &mut *feed_rng);

        boot.start(now);
        loading.start(now);
        commands.start(now, &mut *feed_rng);
        let mut progress = ProgressDriver::new(config.progress);
        progress.start(now);
        let mut status = StatusBoard::default();
        status.start(now);

        let mut scene = Self {
            cols,
            rows,
            ascii: config.ascii,
            color_mode: config.color_mode,
            background: config.background,
            galaxy: AnimatedLayer::new(
                config.galaxy,
                source_for(seed, SALT_GALAXY),
                config.galaxy_opacity,
            ),
            rain: AnimatedLayer::new(config.rain, source_for(seed, SALT_RAIN), config.rain_opacity),
            sparks: AnimatedLayer::new(
                config.sparks,
                source_for(seed, SALT_SPARKS),
                config.spark_opacity,
            ),
            enabled: config.enabled,
            canvas: Canvas::new(cols, rows).with_ascii(config.ascii),
            palette: ScenePalette::for_scheme(config.palette),
            boot,
            loading,
            commands,
            progress,
            status,
            feed_rng,
            hud_visible: config.hud,
            paused: false,
            started: now,
        };

        let palette = scene.palette.clone();
        let enabled = scene.enabled;
        for layer in scene.layers_mut() {
            layer.set_palette(palette.clone());
            layer.mount(Canvas::new(cols, rows).with_ascii(config.ascii), now);
            if !enabled[slot(layer.kind())] {
                layer.pause();
            }
        }
        scene
    }

    fn layers_mut(&mut self) -> [&mut dyn Layer<Canvas>; 3] {
        [&mut self.galaxy, &mut self.rain, &mut self.sparks]
    }

    #[cfg(test)]
    fn layers(&self) -> [&dyn Layer<Canvas>; 3] {
        [&self.galaxy, &self.rain, &self.sparks]
    }

    #[cfg(test)]
    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    pub fn is_ready(&self) -> bool {
        self.progress.is_complete()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[cfg(test)]
    pub fn is_enabled(&self, kind: LayerKind) -> bool {
        self.enabled[slot(kind)]
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    #[cfg(test)]
    pub fn palette(&self) -> &ScenePalette {
        &self.palette
    }

    pub fn rotation_step(&self) -> f32 {
        self.galaxy.config().rotation_step
    }

    #[cfg(test)]
    pub fn loading(&self) -> &ScriptedTyper {
        &self.loading
    }

    #[cfg(test)]
    pub fn commands(&self) -> &CommandInjector {
        &self.commands
    }

    #[cfg(test)]
    pub fn layer_running(&self, kind: LayerKind) -> bool {
        self.layers()[slot(kind)].is_running()
    }

    /// Advances the feeds and fires every live layer clock. Returns how many
    /// layers ran a frame.
    pub fn tick(&mut self, now: Instant) -> usize {
        let rng = &mut *self.feed_rng;
        let p = self.progress.poll(now, rng);
        self.status.poll(now, rng);
        self.boot.poll(now, rng);

        self.loading.set_progress(p);
        self.commands.set_progress(p);
        self.loading.poll(now, rng);
        self.commands.poll(now, rng);

        let enabled = self.enabled;
        self.layers_mut()
            .into_iter()
            .filter(|layer| enabled[slot(layer.kind())])
            .map(|layer| layer.frame(now))
            .filter(|ran| *ran)
            .count()
    }

    pub fn render(&mut self, frame: &mut Frame, now: Instant) {
        self.canvas.clear();
        for kind in BLEND_ORDER {
            if !self.enabled[slot(kind)] {
                continue;
            }
            let layer: &dyn Layer<Canvas> = match kind {
                LayerKind::Galaxy => &self.galaxy,
                LayerKind::Rain => &self.rain,
                LayerKind::Sparks => &self.sparks,
            };
            if let Some(src) = layer.surface() {
                self.canvas.blend_layer(src, layer.opacity());
            }
        }

        let layout = HudLayout::compute(frame.width, frame.height);
        if self.hud_visible {
            hud::shade(&mut self.canvas, &layout, &self.palette);
        }
        self.canvas.write_frame(frame, self.color_mode, self.background);

        if self.hud_visible {
            let blink = now.saturating_duration_since(self.started).as_millis() / CURSOR_BLINK.as_millis();
            let view = HudView {
                alert_level: self.progress.alert_level(now),
                status: self.status.entries(),
                boot: &self.boot,
                loading: &self.loading,
                commands: &self.commands,
                progress: self.progress.value(),
                phase: self.progress.phase(),
                eta_secs: self.progress.eta_secs(),
                cursor_on: blink % 2 == 0,
            };
            let style = HudStyle {
                mode: self.color_mode,
                ascii: self.ascii,
            };
            hud::draw(frame, &layout, &view, &self.palette, &style);
        }
    }

    /// Full regeneration at the new size.
    pub fn resize(&mut self, cols: u16, rows: u16, now: Instant) {
        self.cols = cols;
        self.rows = rows;
        self.canvas = Canvas::new(cols, rows).with_ascii(self.ascii);
        let ascii = self.ascii;
        let enabled = self.enabled;
        let paused = self.paused;
        for layer in self.layers_mut() {
            layer.resize(Canvas::new(cols, rows).with_ascii(ascii), now);
            if paused || !enabled[slot(layer.kind())] {
                layer.pause();
            }
        }
        log::debug!("scene resized to {}x{}", cols, rows);
    }

    pub fn regenerate(&mut self) {
        for layer in self.layers_mut() {
            layer.regenerate();
        }
    }

    pub fn set_palette(&mut self, scheme: PaletteScheme) {
        self.palette = ScenePalette::for_scheme(scheme);
        let palette = self.palette.clone();
        for layer in self.layers_mut() {
            layer.set_palette(palette.clone());
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        self.paused = !self.paused;
        let paused = self.paused;
        let enabled = self.enabled;
        for layer in self.layers_mut() {
            if paused {
                layer.pause();
            } else if enabled[slot(layer.kind())] {
                layer.resume(now);
            }
        }
    }

    pub fn toggle_layer(&mut self, kind: LayerKind, now: Instant) {
        let i = slot(kind);
        self.enabled[i] = !self.enabled[i];
        let on = self.enabled[i];
        let paused = self.paused;
        let mut layers = self.layers_mut();
        let layer = &mut layers[i];
        if on && !paused {
            layer.resume(now);
        } else {
            layer.pause();
        }
        log::debug!("{} layer {}", kind.label(), if on { "on" } else { "off" });
    }

    pub fn toggle_hud(&mut self) {
        self.hud_visible = !self.hud_visible;
    }

    /// Scales the galaxy spin, staying inside the allowed step range.
    pub fn adjust_rotation(&mut self, factor: f32) {
        let cfg = self.galaxy.config_mut();
        let step = if cfg.rotation_step <= 0.0 && factor > 1.0 {
            0.001
        } else {
            cfg.rotation_step * factor
        };
        cfg.rotation_step = step.clamp(MIN_ROTATION_STEP, MAX_ROTATION_STEP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SceneConfig {
        SceneConfig {
            seed: Some(42),
            rain: RainConfig {
                alphabet: vec!['0', '1', 'Z'],
                ..RainConfig::default()
            },
            ..SceneConfig::default()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn every_enabled_layer_runs_each_tick() {
        let t0 = Instant::now();
        let mut scene = Scene::new(config(), 80, 24, t0);
        assert_eq!(scene.tick(t0 + ms(16)), 3);
        scene.toggle_layer(LayerKind::Rain, t0 + ms(20));
        assert!(!scene.is_enabled(LayerKind::Rain));
        assert!(!scene.layer_running(LayerKind::Rain));
        assert_eq!(scene.tick(t0 + ms(32)), 2);
        scene.toggle_layer(LayerKind::Rain, t0 + ms(40));
        assert_eq!(scene.tick(t0 + ms(48)), 3);
    }

    #[test]
    fn pause_stops_all_layer_clocks() {
        let t0 = Instant::now();
        let mut scene = Scene::new(config(), 80, 24, t0);
        scene.toggle_pause(t0);
        assert!(scene.is_paused());
        assert_eq!(scene.tick(t0 + ms(16)), 0);
        scene.toggle_pause(t0 + ms(20));
        assert_eq!(scene.tick(t0 + ms(36)), 3);
    }

    #[test]
    fn disabled_layers_stay_off_after_resize() {
        let t0 = Instant::now();
        let mut cfg = config();
        cfg.enabled = [true, false, true];
        let mut scene = Scene::new(cfg, 80, 24, t0);
        scene.resize(100, 30, t0 + ms(10));
        assert_eq!(scene.size(), (100, 30));
        assert!(!scene.layer_running(LayerKind::Rain));
        assert!(scene.layer_running(LayerKind::Galaxy));
    }

    #[test]
    fn render_fills_the_frame_with_scene_and_hud() {
        let t0 = Instant::now();
        let mut scene = Scene::new(config(), 100, 30, t0);
        for i in 1..=10 {
            scene.tick(t0 + ms(16 * i));
        }
        let mut frame = Frame::new(100, 30);
        scene.render(&mut frame, t0 + ms(160));
        let top: String = frame.row(0).iter().map(|c| c.ch).collect();
        assert!(top.contains("[SYSTEM]"));

        scene.toggle_hud();
        let mut bare = Frame::new(100, 30);
        scene.render(&mut bare, t0 + ms(160));
        let top: String = bare.row(0).iter().map(|c| c.ch).collect();
        assert!(!top.contains("[SYSTEM]"));
    }

    #[test]
    fn completing_progress_halts_both_feeds() {
        let t0 = Instant::now();
        let cfg = SceneConfig {
            progress: ProgressMode::Linear(Duration::from_secs(2)),
            ..config()
        };
        let mut scene = Scene::new(cfg, 80, 24, t0);
        scene.tick(t0 + Duration::from_secs(3));
        assert!(scene.is_ready());
        assert!(scene.loading().is_halted());
        assert!(scene.commands().is_halted());
        let lines = scene.commands().next_line();
        scene.tick(t0 + Duration::from_secs(10));
        assert_eq!(scene.commands().next_line(), lines);
        assert!(scene.loading().next_deadline().is_none());
    }

    #[test]
    fn rotation_adjustment_is_clamped() {
        let t0 = Instant::now();
        let mut scene = Scene::new(config(), 80, 24, t0);
        for _ in 0..100 {
            scene.adjust_rotation(2.0);
        }
        assert_eq!(scene.rotation_step(), MAX_ROTATION_STEP);
        for _ in 0..2000 {
            scene.adjust_rotation(0.5);
        }
        assert!(scene.rotation_step() >= 0.0);
        scene.adjust_rotation(0.0);
        scene.adjust_rotation(2.0);
        assert!(scene.rotation_step() > 0.0);
    }

    fn canvas_luminance(scene: &Scene) -> f32 {
        let (cols, rows) = scene.size();
        let mut sum = 0.0;
        for row in 0..rows {
            for col in 0..cols {
                if let Some(t) = scene.canvas.texel(col, row) {
                    sum += t.color.iter().sum::<f32>();
                }
            }
        }
        sum
    }

    fn settled_scene(enabled: [bool; 3]) -> Scene {
        let t0 = Instant::now();
        let cfg = SceneConfig {
            seed: Some(7),
            enabled,
            hud: false,
            ..config()
        };
        let mut scene = Scene::new(cfg, 100, 30, t0);
        for i in 1..=200 {
            scene.tick(t0 + ms(16 * i));
        }
        let mut frame = Frame::new(100, 30);
        scene.render(&mut frame, t0 + ms(16 * 200));
        scene
    }

    #[test]
    fn rain_trail_does_not_darken_the_galaxy() {
        let without = canvas_luminance(&settled_scene([true, false, true]));
        let with = canvas_luminance(&settled_scene([true, true, true]));
        assert!(without > 0.0);
        approx::assert_relative_eq!(with, without, max_relative = 0.01);
    }

    #[test]
    fn palette_switch_reaches_the_scene() {
        let t0 = Instant::now();
        let mut scene = Scene::new(config(), 80, 24, t0);
        scene.set_palette(PaletteScheme::Ember);
        assert_eq!(scene.palette().scheme, PaletteScheme::Ember);
    }
}
