// Copyright (c) 2026 rezky_nightky

//! Paints layer state onto a [`Surface`]. Nothing here draws randomness or
//! mutates state; every function is a pure read of what the update pass left.

use crate::galaxy::{rotate, Arm, RotationAccumulator};
use crate::palette::ScenePalette;
use crate::particle::ParticlePool;
use crate::rain::{GlyphRain, RainVariant};
use crate::sparks::SparkField;
use crate::starfield::parallax_factor;
use crate::surface::{RadialGradient, Surface, SurfaceError};

pub const DEFAULT_TRAIL_ALPHA: f32 = 0.05;

pub const SWAY_RATE: f32 = 0.1;
pub const SWAY_X: f32 = 20.0;
pub const SWAY_Y: f32 = 10.0;
pub const TWINKLE_SCALE: f32 = 2.0;
pub const TWINKLE_ALPHA: f32 = 0.5;

pub const CORE_RADIUS: f32 = 100.0;
pub const CORE_FILL: f32 = 80.0;
pub const NEBULA_OFFSET: (f32, f32) = (-100.0, 50.0);
pub const NEBULA_RADIUS: f32 = 200.0;
pub const NEBULA_FILL: f32 = 150.0;

pub const CULL_PADDING: f32 = 50.0;
pub const GLOW_THRESHOLD: f32 = 0.7;
pub const GLOW_SCALE: f32 = 3.0;
pub const GLOW_ALPHA: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backdrop {
    Clear,
    /// Translucent background fill so earlier frames fade out as trails.
    Trail(f32),
}

fn paint_backdrop<S: Surface + ?Sized>(surface: &mut S, backdrop: Backdrop, palette: &ScenePalette) {
    match backdrop {
        Backdrop::Clear => surface.clear(),
        Backdrop::Trail(alpha) => {
            let vp = surface.viewport();
            surface.fill_rect(0.0, 0.0, vp.width, vp.height, palette.background.alpha(alpha));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalaxyStyle {
    pub backdrop: Backdrop,
    pub core: bool,
    pub nebula: bool,
}

impl Default for GalaxyStyle {
    fn default() -> Self {
        Self {
            backdrop: Backdrop::Clear,
            core: true,
            nebula: true,
        }
    }
}

pub fn render_galaxy<S: Surface + ?Sized>(
    surface: &mut S,
    stars: &ParticlePool,
    arms: &[Arm],
    rotation: &RotationAccumulator,
    style: &GalaxyStyle,
    palette: &ScenePalette,
) -> Result<(), SurfaceError> {
    let vp = surface.ready()?;
    let (cx, cy) = vp.center();
    paint_backdrop(surface, style.backdrop, palette);

    let sway = rotation.angle() * SWAY_RATE;
    let (sway_x, sway_y) = (sway.sin() * SWAY_X, sway.cos() * SWAY_Y);
    for star in stars.iter() {
        let p = parallax_factor(star);
        let x = star.x + sway_x * p;
        let y = star.y + sway_y * p;
        let radius = star.size * (1.0 - p * 0.5);
        let alpha = star.brightness * (1.0 - p * 0.3);
        surface.fill_circle(x, y, radius, palette.star.alpha(alpha));
        if star.life > 0.0 {
            surface.fill_circle(
                x,
                y,
                star.size * TWINKLE_SCALE,
                palette
                    .glow
                    .alpha(star.brightness * TWINKLE_ALPHA * star.life),
            );
        }
    }

    if style.core {
        let core = RadialGradient::new(cx, cy, CORE_RADIUS, &palette.core);
        surface.fill_radial(&core, CORE_FILL);
    }

    let basis = rotation.basis();
    let (min_x, max_x) = (-CULL_PADDING, vp.width + CULL_PADDING);
    let (min_y, max_y) = (-CULL_PADDING, vp.height + CULL_PADDING);
    for arm in arms {
        for point in &arm.points {
            let (rx, ry) = rotate(point.x, point.y, basis);
            let (x, y) = (cx + rx, cy + ry);
            if x < min_x || x > max_x || y < min_y || y > max_y {
                continue;
            }
            // Glow goes down first so the dot sits on top of it.
            if point.brightness > GLOW_THRESHOLD {
                surface.fill_circle(
                    x,
                    y,
                    point.size * GLOW_SCALE,
                    palette.glow.alpha(point.brightness * GLOW_ALPHA),
                );
            }
            surface.fill_circle(x, y, point.size, palette.star.alpha(point.brightness));
        }
    }

    if style.nebula {
        let nebula = RadialGradient::new(
            cx + NEBULA_OFFSET.0,
            cy + NEBULA_OFFSET.1,
            NEBULA_RADIUS,
            &palette.nebula,
        );
        surface.fill_radial(&nebula, NEBULA_FILL);
    }
    Ok(())
}

pub fn render_rain<S: Surface + ?Sized>(
    surface: &mut S,
    rain: &GlyphRain,
    trail_alpha: f32,
    palette: &ScenePalette,
) -> Result<(), SurfaceError> {
    surface.ready()?;
    paint_backdrop(surface, Backdrop::Trail(trail_alpha), palette);
    for cell in rain.cells() {
        let color = match cell.variant {
            RainVariant::Bright => palette.rain_bright,
            RainVariant::Dim => palette.rain_dim,
        };
        surface.fill_glyph(cell.x, cell.y, cell.glyph, color.alpha(cell.opacity));
    }
    Ok(())
}

pub fn render_sparks<S: Surface + ?Sized>(
    surface: &mut S,
    sparks: &SparkField,
    palette: &ScenePalette,
) -> Result<(), SurfaceError> {
    surface.ready()?;
    surface.clear();
    for p in sparks.particles().iter() {
        let color = palette.spark_color(p.tint);
        surface.fill_circle(p.x, p.y, p.size * GLOW_SCALE, color.alpha(p.life * GLOW_ALPHA));
        surface.fill_circle(p.x, p.y, p.size, color.alpha(p.life));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{generate_arms, GalaxyParams};
    use crate::particle::Particle;
    use crate::rain::RainParams;
    use crate::rng::seeded;
    use crate::sparks::SparkParams;
    use crate::starfield::{generate_stars, StarFieldParams};
    use crate::surface::testing::{DrawOp, RecordingSurface};
    use crate::surface::Viewport;

    fn arm_with(points: Vec<Particle>) -> Vec<Arm> {
        vec![Arm {
            angle_offset: 0.0,
            base_radius: 300.0,
            points,
        }]
    }

    #[test]
    fn unavailable_surface_draws_nothing() {
        let mut s = RecordingSurface::new(0.0, 0.0);
        let res = render_galaxy(
            &mut s,
            &ParticlePool::unbounded(),
            &[],
            &RotationAccumulator::default(),
            &GalaxyStyle::default(),
            &ScenePalette::default(),
        );
        assert!(matches!(res, Err(SurfaceError::Unavailable { .. })));
        assert!(s.ops.is_empty());
    }

    #[test]
    fn galaxy_pass_order_is_backdrop_stars_core_arms_nebula() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = seeded(10);
        let stars = generate_stars(vp, &StarFieldParams::default(), &mut *rng);
        let arms = generate_arms(vp, &GalaxyParams::default(), &mut *rng);
        let mut s = RecordingSurface::new(800.0, 600.0);
        render_galaxy(
            &mut s,
            &stars,
            &arms,
            &RotationAccumulator::default(),
            &GalaxyStyle::default(),
            &ScenePalette::default(),
        )
        .unwrap();

        assert_eq!(s.ops[0], DrawOp::Clear);
        let radials: Vec<usize> = s
            .ops
            .iter()
            .enumerate()
            .filter(|(_, op)| matches!(op, DrawOp::Radial { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(radials.len(), 2);
        assert_eq!(radials[0], 1 + 150);
        assert_eq!(radials[1], s.ops.len() - 1);
        assert_eq!(
            s.ops[radials[1]],
            DrawOp::Radial {
                cx: 300.0,
                cy: 350.0,
                radius: 200.0,
                clip: 150.0
            }
        );
    }

    #[test]
    fn star_parallax_uses_depth() {
        let stars: ParticlePool = vec![Particle {
            x: 100.0,
            y: 100.0,
            z: 500.0,
            size: 2.0,
            brightness: 1.0,
            ..Particle::default()
        }]
        .into_iter()
        .collect();
        let mut s = RecordingSurface::new(400.0, 400.0);
        let style = GalaxyStyle {
            core: false,
            nebula: false,
            ..GalaxyStyle::default()
        };
        render_galaxy(
            &mut s,
            &stars,
            &[],
            &RotationAccumulator::default(),
            &style,
            &ScenePalette::default(),
        )
        .unwrap();
        match s.ops[1] {
            DrawOp::Circle {
                cx,
                cy,
                radius,
                color,
            } => {
                assert_eq!(cx, 100.0);
                assert_eq!(cy, 105.0);
                assert_eq!(radius, 1.5);
                assert!((color.a - 0.85).abs() < 1e-6);
            }
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.ops.len(), 2);
    }

    #[test]
    fn bright_arm_points_get_glow_beneath_and_far_points_are_culled() {
        let bright = Particle {
            x: 10.0,
            y: 0.0,
            size: 2.0,
            brightness: 0.9,
            ..Particle::default()
        };
        let dim = Particle {
            brightness: 0.5,
            ..bright
        };
        let far = Particle {
            x: 1000.0,
            ..bright
        };
        let arms = arm_with(vec![bright, dim, far]);
        let style = GalaxyStyle {
            core: false,
            nebula: false,
            ..GalaxyStyle::default()
        };
        let mut s = RecordingSurface::new(200.0, 200.0);
        render_galaxy(
            &mut s,
            &ParticlePool::unbounded(),
            &arms,
            &RotationAccumulator::default(),
            &style,
            &ScenePalette::default(),
        )
        .unwrap();

        let radii: Vec<f32> = s
            .circles()
            .map(|op| match op {
                DrawOp::Circle { radius, .. } => *radius,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(radii, vec![6.0, 2.0, 2.0]);
    }

    #[test]
    fn rain_trails_instead_of_clearing() {
        let mut rng = seeded(3);
        let vp = Viewport::new(200.0, 100.0);
        let rain = GlyphRain::generate(vp, RainParams::default(), &['a', 'b'], &mut *rng);
        let mut s = RecordingSurface::new(200.0, 100.0);
        render_rain(&mut s, &rain, DEFAULT_TRAIL_ALPHA, &ScenePalette::default()).unwrap();

        assert!(!s.ops.contains(&DrawOp::Clear));
        match s.ops[0] {
            DrawOp::Rect { w, h, color, .. } => {
                assert_eq!((w, h), (200.0, 100.0));
                assert!((color.a - 0.05).abs() < 1e-6);
            }
            ref other => panic!("unexpected {:?}", other),
        }
        let glyphs = s
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Glyph { .. }))
            .count();
        assert_eq!(glyphs, rain.len());
    }

    #[test]
    fn sparks_draw_glow_then_dot() {
        let mut rng = seeded(3);
        let mut field = SparkField::new(Viewport::new(100.0, 100.0), SparkParams::default());
        field.spawn(&mut *rng);
        let mut s = RecordingSurface::new(100.0, 100.0);
        render_sparks(&mut s, &field, &ScenePalette::default()).unwrap();
        assert_eq!(s.ops.len(), 3);
        assert_eq!(s.ops[0], DrawOp::Clear);
    }
}
