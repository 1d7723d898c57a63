// Copyright (c) 2026 rezky_nightky

use crate::particle::{Particle, ParticlePool};
use crate::rng::RandomSource;
use crate::surface::Viewport;

pub const DEFAULT_STAR_COUNT: usize = 150;
pub const STAR_DEPTH: f32 = 1000.0;
pub const STAR_SIZE: (f32, f32) = (0.5, 2.5);
pub const STAR_DRIFT: (f32, f32) = (0.1, 0.6);

/// Chance per tick that a star flares.
pub const TWINKLE_CHANCE: f32 = 0.01;
/// Flare decay per tick, scaled by the star's drift speed.
pub const TWINKLE_FADE: f32 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarFieldParams {
    pub count: usize,
    pub twinkle_chance: f32,
}

impl Default for StarFieldParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_STAR_COUNT,
            twinkle_chance: TWINKLE_CHANCE,
        }
    }
}

pub fn generate_stars(
    viewport: Viewport,
    params: &StarFieldParams,
    rng: &mut dyn RandomSource,
) -> ParticlePool {
    if viewport.is_empty() {
        return ParticlePool::unbounded();
    }

    let mut pool = ParticlePool::with_capacity(params.count);
    for _ in 0..params.count {
        pool.push(Particle {
            x: rng.range(0.0, viewport.width),
            y: rng.range(0.0, viewport.height),
            z: rng.range(0.0, STAR_DEPTH),
            size: rng.range(STAR_SIZE.0, STAR_SIZE.1),
            brightness: rng.unit(),
            speed: rng.range(STAR_DRIFT.0, STAR_DRIFT.1),
            life: 0.0,
            ..Particle::default()
        });
    }
    pool
}

/// Star positions never move; only the flare level in `life` evolves.
pub fn twinkle(stars: &mut ParticlePool, params: &StarFieldParams, rng: &mut dyn RandomSource) {
    stars.tick(|star| {
        if rng.chance(params.twinkle_chance) {
            star.life = 1.0;
        } else {
            star.life = (star.life - TWINKLE_FADE * (0.5 + star.speed)).max(0.0);
        }
        true
    });
}

/// Depth as a `[0, 1)` parallax factor.
pub fn parallax_factor(star: &Particle) -> f32 {
    (star.z / STAR_DEPTH).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn generates_requested_count_inside_bounds() {
        let mut rng = seeded(42);
        let params = StarFieldParams {
            count: 150,
            ..StarFieldParams::default()
        };
        let stars = generate_stars(Viewport::new(800.0, 600.0), &params, &mut *rng);
        assert_eq!(stars.len(), 150);
        for s in stars.iter() {
            assert!((0.0..800.0).contains(&s.x));
            assert!((0.0..600.0).contains(&s.y));
            assert!((0.0..1000.0).contains(&s.z));
            assert!((0.5..2.5).contains(&s.size));
            assert!((0.0..1.0).contains(&s.brightness));
            assert!((0.1..0.6).contains(&s.speed));
        }
    }

    #[test]
    fn zero_viewport_yields_empty_field() {
        let mut rng = seeded(1);
        let stars = generate_stars(Viewport::new(0.0, 0.0), &StarFieldParams::default(), &mut *rng);
        assert!(stars.is_empty());
    }

    #[test]
    fn twinkle_keeps_positions_and_bounds_life() {
        let mut rng = seeded(9);
        let params = StarFieldParams {
            count: 64,
            twinkle_chance: 0.2,
        };
        let mut stars = generate_stars(Viewport::new(320.0, 200.0), &params, &mut *rng);
        let before: Vec<(f32, f32, f32)> = stars.iter().map(|s| (s.x, s.y, s.z)).collect();
        for _ in 0..100 {
            twinkle(&mut stars, &params, &mut *rng);
        }
        let after: Vec<(f32, f32, f32)> = stars.iter().map(|s| (s.x, s.y, s.z)).collect();
        assert_eq!(before, after);
        assert!(stars.iter().all(|s| (0.0..=1.0).contains(&s.life)));
        assert!(stars.iter().any(|s| s.life > 0.0));
    }
}
