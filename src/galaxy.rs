// Copyright (c) 2026 rezky_nightky

//! Spiral arms and the rotation that turns them.

use std::f32::consts::{PI, TAU};

use crate::particle::Particle;
use crate::rng::RandomSource;
use crate::surface::Viewport;

pub const DEFAULT_ARMS: usize = 4;
pub const DEFAULT_POINTS_PER_ARM: usize = 80;
pub const DEFAULT_INNER_RADIUS: f32 = 50.0;
pub const DEFAULT_RADIUS_SPAN: f32 = 300.0;
/// Angle swept from the inner to the outer end of an arm.
pub const DEFAULT_SWEEP: f32 = 1.5 * PI;
pub const DEFAULT_ROTATION_STEP: f32 = 0.005;

pub const ARM_DEPTH: f32 = 100.0;
pub const ARM_SIZE: (f32, f32) = (1.0, 4.0);
pub const ARM_BRIGHTNESS: (f32, f32) = (0.2, 1.0);
pub const ARM_PHASE: (f32, f32) = (0.01, 0.03);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalaxyParams {
    pub arms: usize,
    pub points_per_arm: usize,
    pub inner_radius: f32,
    pub radius_span: f32,
    pub sweep: f32,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            arms: DEFAULT_ARMS,
            points_per_arm: DEFAULT_POINTS_PER_ARM,
            inner_radius: DEFAULT_INNER_RADIUS,
            radius_span: DEFAULT_RADIUS_SPAN,
            sweep: DEFAULT_SWEEP,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arm {
    pub angle_offset: f32,
    pub base_radius: f32,
    /// Local coordinates relative to the galaxy centre, inner end first.
    pub points: Vec<Particle>,
}

pub fn generate_arms(
    viewport: Viewport,
    params: &GalaxyParams,
    rng: &mut dyn RandomSource,
) -> Vec<Arm> {
    if viewport.is_empty() || params.arms == 0 {
        return Vec::new();
    }

    let per_arm = params.points_per_arm;
    (0..params.arms)
        .map(|a| {
            let angle_offset = a as f32 * TAU / params.arms as f32;
            let points = (0..per_arm)
                .map(|i| {
                    let t = i as f32 / per_arm as f32;
                    let radius = params.inner_radius + t * params.radius_span;
                    let angle = angle_offset + t * params.sweep;
                    Particle {
                        x: angle.cos() * radius,
                        y: angle.sin() * radius,
                        z: rng.range(0.0, ARM_DEPTH),
                        size: rng.range(ARM_SIZE.0, ARM_SIZE.1),
                        brightness: rng.range(ARM_BRIGHTNESS.0, ARM_BRIGHTNESS.1),
                        speed: rng.range(ARM_PHASE.0, ARM_PHASE.1),
                        life: 1.0,
                        ..Particle::default()
                    }
                })
                .collect();
            Arm {
                angle_offset,
                base_radius: params.radius_span,
                points,
            }
        })
        .collect()
}

/// Global spin shared by every arm. Only ever grows; `sin`/`cos` wrap it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationAccumulator {
    angle: f32,
    step: f32,
}

impl RotationAccumulator {
    pub fn new(step: f32) -> Self {
        Self {
            angle: 0.0,
            step: step.max(0.0),
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_step(&mut self, step: f32) {
        self.step = step.max(0.0);
    }

    pub fn advance(&mut self) -> f32 {
        self.angle += self.step;
        self.angle
    }

    /// `(cos, sin)` of the current angle, computed once per frame.
    pub fn basis(&self) -> (f32, f32) {
        (self.angle.cos(), self.angle.sin())
    }
}

impl Default for RotationAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_STEP)
    }
}

pub fn rotate(x: f32, y: f32, (cos, sin): (f32, f32)) -> (f32, f32) {
    (x * cos - y * sin, x * sin + y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use approx::assert_abs_diff_eq;

    fn vp() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn four_arms_of_eighty_points_start_at_inner_radius() {
        let mut rng = seeded(11);
        let arms = generate_arms(vp(), &GalaxyParams::default(), &mut *rng);
        assert_eq!(arms.len(), 4);
        for (a, arm) in arms.iter().enumerate() {
            assert_eq!(arm.points.len(), 80);
            assert_abs_diff_eq!(arm.angle_offset, a as f32 * TAU / 4.0, epsilon = 1e-6);
            let first = arm.points[0];
            let r = (first.x * first.x + first.y * first.y).sqrt();
            assert_abs_diff_eq!(r, 50.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn arm_geometry_is_reproducible_for_a_seed() {
        let a = generate_arms(vp(), &GalaxyParams::default(), &mut *seeded(5));
        let b = generate_arms(vp(), &GalaxyParams::default(), &mut *seeded(5));
        assert_eq!(a, b);
    }

    #[test]
    fn point_radius_follows_the_sweep() {
        let params = GalaxyParams {
            arms: 1,
            points_per_arm: 10,
            ..GalaxyParams::default()
        };
        let arms = generate_arms(vp(), &params, &mut *seeded(3));
        for (i, p) in arms[0].points.iter().enumerate() {
            let t = i as f32 / 10.0;
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert_abs_diff_eq!(r, 50.0 + t * 300.0, epsilon = 1e-2);
            assert!((0.2..1.0).contains(&p.brightness));
        }
    }

    #[test]
    fn zero_viewport_or_zero_arms_is_empty() {
        let mut rng = seeded(1);
        assert!(generate_arms(Viewport::default(), &GalaxyParams::default(), &mut *rng).is_empty());
        let none = GalaxyParams {
            arms: 0,
            ..GalaxyParams::default()
        };
        assert!(generate_arms(vp(), &none, &mut *rng).is_empty());
    }

    #[test]
    fn rotation_only_grows() {
        let mut rot = RotationAccumulator::default();
        let mut last = rot.angle();
        for _ in 0..10_000 {
            let next = rot.advance();
            assert!(next >= last);
            last = next;
        }
        assert_abs_diff_eq!(last, 50.0, epsilon = 0.05);
    }

    #[test]
    fn quarter_turn_rotation() {
        let (x, y) = rotate(1.0, 0.0, (0.0, 1.0));
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-6);
    }
}
