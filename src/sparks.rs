// Copyright (c) 2026 rezky_nightky

//! Short-lived drifting sparks.

use std::time::Duration;

use crate::particle::{Particle, ParticlePool};
use crate::rng::RandomSource;
use crate::surface::Viewport;

pub const SPARK_CAP: usize = 31;
pub const SPAWN_EVERY: Duration = Duration::from_millis(300);
pub const STEP_EVERY: Duration = Duration::from_millis(50);
pub const LIFE_DECAY: f32 = 0.008;
pub const SIZE_DECAY: f32 = 0.995;
pub const SPARK_SIZE: (f32, f32) = (1.0, 3.0);
pub const SPARK_TINTS: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparkParams {
    pub cap: usize,
    pub spawn_every: Duration,
    pub step_every: Duration,
}

impl Default for SparkParams {
    fn default() -> Self {
        Self {
            cap: SPARK_CAP,
            spawn_every: SPAWN_EVERY,
            step_every: STEP_EVERY,
        }
    }
}

/// Spawner and stepper for a capped spark pool, paced by elapsed time
/// rather than frame count.
#[derive(Clone, Debug)]
pub struct SparkField {
    pub params: SparkParams,
    pub viewport: Viewport,
    pool: ParticlePool,
    spawn_debt: Duration,
    step_debt: Duration,
}

impl SparkField {
    pub fn new(viewport: Viewport, params: SparkParams) -> Self {
        Self {
            params,
            viewport,
            pool: ParticlePool::with_capacity(params.cap),
            spawn_debt: Duration::ZERO,
            step_debt: Duration::ZERO,
        }
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn spawn(&mut self, rng: &mut dyn RandomSource) {
        if self.viewport.is_empty() {
            return;
        }
        self.pool.push(Particle {
            x: rng.range(0.0, self.viewport.width),
            y: rng.range(0.0, self.viewport.height),
            vx: rng.range(-1.0, 1.0),
            vy: rng.range(-1.0, 1.0),
            size: rng.range(SPARK_SIZE.0, SPARK_SIZE.1),
            tint: rng.below(SPARK_TINTS as usize) as u8,
            brightness: 1.0,
            life: 1.0,
            ..Particle::default()
        });
    }

    /// One 50 ms step: drift, fade, shrink, retire the dead.
    pub fn step(&mut self) -> usize {
        self.pool.tick(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.life -= LIFE_DECAY;
            p.size *= SIZE_DECAY;
            p.life > 0.0
        })
    }

    pub fn advance(&mut self, dt: Duration, rng: &mut dyn RandomSource) {
        let spawn_every = self.params.spawn_every.max(Duration::from_millis(1));
        let step_every = self.params.step_every.max(Duration::from_millis(1));

        self.spawn_debt += dt;
        while self.spawn_debt >= spawn_every {
            self.spawn_debt -= spawn_every;
            self.spawn(rng);
        }

        self.step_debt += dt;
        while self.step_debt >= step_every {
            self.step_debt -= step_every;
            self.step();
        }
    }
}
