// Copyright (c) 2026 rezky_nightky

//! Mountable animation layers.
//!
//! A layer owns its population, its drawing surface, its random source and
//! its own [`Clock`]. Each fired frame runs `update` and then `render`; a
//! layer whose clock has been stopped ignores frames entirely.

use std::time::Instant;

use crate::clock::{Clock, ClockHandle, FrameTick};
use crate::compositor::{self, GalaxyStyle, DEFAULT_TRAIL_ALPHA};
use crate::galaxy::{generate_arms, Arm, GalaxyParams, RotationAccumulator, DEFAULT_ROTATION_STEP};
use crate::palette::ScenePalette;
use crate::particle::ParticlePool;
use crate::rain::{GlyphRain, RainParams};
use crate::rng::RandomSource;
use crate::runtime::LayerKind;
use crate::sparks::{SparkField, SparkParams};
use crate::starfield::{generate_stars, twinkle, StarFieldParams};
use crate::surface::{Surface, SurfaceError, Viewport};

pub trait Animation: Sized {
    type Config;

    const KIND: LayerKind;

    fn generate(viewport: Viewport, config: &Self::Config, rng: &mut dyn RandomSource) -> Self;

    fn update(&mut self, config: &Self::Config, tick: &FrameTick, rng: &mut dyn RandomSource);

    fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        config: &Self::Config,
        palette: &ScenePalette,
    ) -> Result<(), SurfaceError>;

    /// Called after a regeneration with the state it replaces.
    fn carry_over(&mut self, _previous: &Self) {}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalaxyConfig {
    pub stars: StarFieldParams,
    pub galaxy: GalaxyParams,
    pub rotation_step: f32,
    pub style: GalaxyStyle,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            stars: StarFieldParams::default(),
            galaxy: GalaxyParams::default(),
            rotation_step: DEFAULT_ROTATION_STEP,
            style: GalaxyStyle::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GalaxyState {
    pub stars: ParticlePool,
    pub arms: Vec<Arm>,
    pub rotation: RotationAccumulator,
}

impl Animation for GalaxyState {
    type Config = GalaxyConfig;

    const KIND: LayerKind = LayerKind::Galaxy;

    fn generate(viewport: Viewport, config: &GalaxyConfig, rng: &mut dyn RandomSource) -> Self {
        Self {
            stars: generate_stars(viewport, &config.stars, rng),
            arms: generate_arms(viewport, &config.galaxy, rng),
            rotation: RotationAccumulator::new(config.rotation_step),
        }
    }

    fn update(&mut self, config: &GalaxyConfig, _tick: &FrameTick, rng: &mut dyn RandomSource) {
        self.rotation.set_step(config.rotation_step);
        self.rotation.advance();
        twinkle(&mut self.stars, &config.stars, rng);
    }

    fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        config: &GalaxyConfig,
        palette: &ScenePalette,
    ) -> Result<(), SurfaceError> {
        compositor::render_galaxy(
            surface,
            &self.stars,
            &self.arms,
            &self.rotation,
            &config.style,
            palette,
        )
    }

    // The spin survives a resize.
    fn carry_over(&mut self, previous: &Self) {
        self.rotation = previous.rotation;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub params: RainParams,
    pub alphabet: Vec<char>,
    pub trail_alpha: f32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            params: RainParams::default(),
            alphabet: Vec::new(),
            trail_alpha: DEFAULT_TRAIL_ALPHA,
        }
    }
}

impl Animation for GlyphRain {
    type Config = RainConfig;

    const KIND: LayerKind = LayerKind::Rain;

    fn generate(viewport: Viewport, config: &RainConfig, rng: &mut dyn RandomSource) -> Self {
        GlyphRain::generate(viewport, config.params, &config.alphabet, rng)
    }

    fn update(&mut self, _config: &RainConfig, _tick: &FrameTick, rng: &mut dyn RandomSource) {
        self.tick(rng);
    }

    fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        config: &RainConfig,
        palette: &ScenePalette,
    ) -> Result<(), SurfaceError> {
        compositor::render_rain(surface, self, config.trail_alpha, palette)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SparkConfig {
    pub params: SparkParams,
}

impl Animation for SparkField {
    type Config = SparkConfig;

    const KIND: LayerKind = LayerKind::Sparks;

    fn generate(viewport: Viewport, config: &SparkConfig, _rng: &mut dyn RandomSource) -> Self {
        SparkField::new(viewport, config.params)
    }

    fn update(&mut self, _config: &SparkConfig, tick: &FrameTick, rng: &mut dyn RandomSource) {
        self.advance(tick.dt, rng);
    }

    fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        _config: &SparkConfig,
        palette: &ScenePalette,
    ) -> Result<(), SurfaceError> {
        compositor::render_sparks(surface, self, palette)
    }
}

/// The lifecycle the scene drives, independent of what a layer animates.
pub trait Layer<S: Surface> {
    fn kind(&self) -> LayerKind;

    fn mount(&mut self, surface: S, now: Instant);

    /// Stops the clock and discards the population, handing back the surface.
    fn unmount(&mut self) -> Option<S>;

    /// Regenerates everything for a new surface.
    fn resize(&mut self, surface: S, now: Instant);

    /// Runs one update and render if the clock is live.
    fn frame(&mut self, now: Instant) -> bool;

    fn pause(&mut self);

    fn resume(&mut self, now: Instant);

    #[cfg(test)]
    fn is_running(&self) -> bool;

    fn regenerate(&mut self);

    fn surface(&self) -> Option<&S>;

    fn opacity(&self) -> f32;

    fn set_palette(&mut self, palette: ScenePalette);
}

pub struct AnimatedLayer<A: Animation, S: Surface> {
    config: A::Config,
    rng: Box<dyn RandomSource>,
    clock: Clock,
    handle: Option<ClockHandle>,
    surface: Option<S>,
    state: Option<A>,
    opacity: f32,
    palette: ScenePalette,
}

impl<A: Animation, S: Surface> AnimatedLayer<A, S> {
    pub fn new(config: A::Config, rng: Box<dyn RandomSource>, opacity: f32) -> Self {
        Self {
            config,
            rng,
            clock: Clock::new(),
            handle: None,
            surface: None,
            state: None,
            opacity: opacity.clamp(0.0, 1.0),
            palette: ScenePalette::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> Option<&A> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &A::Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut A::Config {
        &mut self.config
    }

    fn stop_clock(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.clock.stop(handle);
        }
    }
}

impl<A: Animation, S: Surface> Layer<S> for AnimatedLayer<A, S> {
    fn kind(&self) -> LayerKind {
        A::KIND
    }

    fn mount(&mut self, surface: S, now: Instant) {
        self.stop_clock();
        let viewport = surface.viewport();
        self.state = Some(A::generate(viewport, &self.config, &mut *self.rng));
        self.surface = Some(surface);
        self.handle = Some(self.clock.start(now));
        log::debug!(
            "mounted {} layer at {}x{}",
            A::KIND.label(),
            viewport.width,
            viewport.height
        );
    }

    fn unmount(&mut self) -> Option<S> {
        self.stop_clock();
        self.state = None;
        if self.surface.is_some() {
            log::debug!("unmounted {} layer", A::KIND.label());
        }
        self.surface.take()
    }

    fn resize(&mut self, surface: S, now: Instant) {
        let previous = self.state.take();
        self.unmount();
        self.mount(surface, now);
        if let (Some(state), Some(previous)) = (self.state.as_mut(), previous.as_ref()) {
            state.carry_over(previous);
        }
    }

    fn frame(&mut self, now: Instant) -> bool {
        let (Some(state), Some(surface)) = (self.state.as_mut(), self.surface.as_mut()) else {
            return false;
        };
        let config = &self.config;
        let rng = &mut *self.rng;
        let palette = &self.palette;
        self.clock.fire(now, |tick| {
            state.update(config, &tick, rng);
            if let Err(err) = state.render(surface, config, palette) {
                log::trace!("{} layer skipped a frame: {}", A::KIND.label(), err);
            }
        })
    }

    fn pause(&mut self) {
        self.stop_clock();
    }

    fn resume(&mut self, now: Instant) {
        if self.state.is_some() && self.handle.is_none() {
            self.handle = Some(self.clock.start(now));
        }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.handle.is_some() && self.clock.is_running()
    }

    fn regenerate(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let mut fresh = A::generate(surface.viewport(), &self.config, &mut *self.rng);
        if let Some(previous) = self.state.as_ref() {
            fresh.carry_over(previous);
        }
        self.state = Some(fresh);
    }

    fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_palette(&mut self, palette: ScenePalette) {
        self.palette = palette;
    }
}

pub type GalaxyLayer<S> = AnimatedLayer<GalaxyState, S>;
pub type RainLayer<S> = AnimatedLayer<GlyphRain, S>;
pub type SparkLayer<S> = AnimatedLayer<SparkField, S>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::surface::testing::{DrawOp, RecordingSurface};
    use std::time::Duration;

    fn galaxy() -> GalaxyLayer<RecordingSurface> {
        AnimatedLayer::new(GalaxyConfig::default(), seeded(1), 1.0)
    }

    fn angle(layer: &GalaxyLayer<RecordingSurface>) -> f32 {
        layer.state().map(|s| s.rotation.angle()).unwrap_or(-1.0)
    }

    #[test]
    fn mounted_layer_updates_then_draws() {
        let t0 = Instant::now();
        let mut layer = galaxy();
        layer.mount(RecordingSurface::new(800.0, 600.0), t0);
        assert!(layer.is_running());
        assert!(layer.frame(t0 + Duration::from_millis(16)));
        assert!((angle(&layer) - 0.005).abs() < 1e-6);
        let ops = &layer.surface().unwrap().ops;
        assert_eq!(ops[0], DrawOp::Clear);
        assert!(ops.len() > 150);
    }

    #[test]
    fn stopped_clock_ignores_one_more_frame() {
        let t0 = Instant::now();
        let mut layer = galaxy();
        layer.mount(RecordingSurface::new(800.0, 600.0), t0);
        layer.frame(t0 + Duration::from_millis(16));
        let drawn = layer.surface().unwrap().ops.len();
        let before = angle(&layer);

        layer.pause();
        layer.pause();
        assert!(!layer.frame(t0 + Duration::from_millis(32)));
        assert_eq!(layer.surface().unwrap().ops.len(), drawn);
        assert_eq!(angle(&layer), before);

        layer.resume(t0 + Duration::from_millis(48));
        assert!(layer.frame(t0 + Duration::from_millis(64)));
        assert!(angle(&layer) > before);
    }

    #[test]
    fn unmount_discards_state_and_returns_surface() {
        let t0 = Instant::now();
        let mut layer = galaxy();
        layer.mount(RecordingSurface::new(320.0, 200.0), t0);
        let surface = layer.unmount();
        assert!(surface.is_some());
        assert!(layer.state().is_none());
        assert!(!layer.is_running());
        assert!(!layer.frame(t0 + Duration::from_millis(16)));
        assert!(layer.unmount().is_none());
    }

    #[test]
    fn zero_sized_surface_never_panics() {
        let t0 = Instant::now();
        let mut layer = galaxy();
        layer.mount(RecordingSurface::new(0.0, 0.0), t0);
        assert!(layer.frame(t0 + Duration::from_millis(16)));
        assert!(layer.surface().unwrap().ops.is_empty());
        assert!(layer.state().unwrap().arms.is_empty());
    }

    #[test]
    fn resize_regenerates_but_keeps_rotation() {
        let t0 = Instant::now();
        let mut layer = galaxy();
        layer.mount(RecordingSurface::new(200.0, 200.0), t0);
        for i in 1..=10 {
            layer.frame(t0 + Duration::from_millis(16 * i));
        }
        let spun = angle(&layer);
        layer.resize(RecordingSurface::new(800.0, 600.0), t0 + Duration::from_secs(1));
        assert_eq!(angle(&layer), spun);
        assert!(layer.surface().unwrap().ops.is_empty());
        assert!(layer.is_running());
        assert_eq!(layer.state().unwrap().stars.len(), 150);
    }

    #[test]
    fn rain_layer_keeps_its_population() {
        let t0 = Instant::now();
        let config = RainConfig {
            alphabet: vec!['x', 'y'],
            ..RainConfig::default()
        };
        let mut layer: RainLayer<RecordingSurface> = AnimatedLayer::new(config, seeded(4), 0.5);
        layer.mount(RecordingSurface::new(400.0, 300.0), t0);
        let count = layer.state().unwrap().len();
        for i in 1..=30 {
            layer.frame(t0 + Duration::from_millis(16 * i));
        }
        assert_eq!(layer.state().unwrap().len(), count);
        assert_eq!(layer.kind(), LayerKind::Rain);
        assert!(!layer.surface().unwrap().ops.contains(&DrawOp::Clear));
    }

    #[test]
    fn spark_layer_spawns_from_frame_time() {
        let t0 = Instant::now();
        let mut layer: SparkLayer<RecordingSurface> =
            AnimatedLayer::new(SparkConfig::default(), seeded(4), 1.0);
        layer.mount(RecordingSurface::new(400.0, 300.0), t0);
        layer.frame(t0 + Duration::from_millis(650));
        assert_eq!(layer.state().unwrap().particles().len(), 2);
    }
}
