// Copyright (c) 2026 rezky_nightky

//! The drawing contract the compositor paints through.
//!
//! Coordinates are logical pixels with the origin at the top-left. A backend
//! only has to fill rectangles, filled circles, single glyphs and radial
//! gradients; [`crate::raster::Canvas`] is the terminal one.

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero, negative or non-finite extents count as empty.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn alpha(self, a: f32) -> Rgba {
        Rgba::new(self, a)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        rgb: Rgb::BLACK,
        a: 0.0,
    };

    pub fn new(rgb: Rgb, a: f32) -> Self {
        Self {
            rgb,
            a: if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            Rgb::new(
                mix(self.rgb.r, other.rgb.r),
                mix(self.rgb.g, other.rgb.g),
                mix(self.rgb.b, other.rgb.b),
            ),
            self.a + (other.a - self.a) * t,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

pub const fn stop(offset: f32, r: u8, g: u8, b: u8, a: f32) -> GradientStop {
    GradientStop {
        offset,
        color: Rgba {
            rgb: Rgb::new(r, g, b),
            a,
        },
    }
}

/// Concentric gradient from `(cx, cy)` out to `radius`; stop offsets are
/// fractions of the radius, ascending.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(cx: f32, cy: f32, radius: f32, stops: &[GradientStop]) -> Self {
        Self {
            cx,
            cy,
            radius,
            stops: stops.to_vec(),
        }
    }

    pub fn color_at_distance(&self, d: f32) -> Rgba {
        if self.radius <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        self.sample(d / self.radius)
    }

    pub fn sample(&self, t: f32) -> Rgba {
        let Some(first) = self.stops.first() else {
            return Rgba::TRANSPARENT;
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = (b.offset - a.offset).max(f32::EPSILON);
                return a.color.lerp(b.color, (t - a.offset) / span);
            }
        }
        self.stops.last().map(|s| s.color).unwrap_or(Rgba::TRANSPARENT)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SurfaceError {
    #[error("drawing surface unavailable ({width}x{height})")]
    Unavailable { width: f32, height: f32 },
}

pub trait Surface {
    fn viewport(&self) -> Viewport;

    fn clear(&mut self);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);

    /// Draws `ch` with its baseline at `y`, monospace, left edge at `x`.
    fn fill_glyph(&mut self, x: f32, y: f32, ch: char, color: Rgba);

    /// Fills the disc of `clip_radius` around the gradient centre.
    fn fill_radial(&mut self, gradient: &RadialGradient, clip_radius: f32);

    /// The viewport, or an error when there is nothing to draw into.
    fn ready(&self) -> Result<Viewport, SurfaceError> {
        let vp = self.viewport();
        if vp.is_empty() {
            return Err(SurfaceError::Unavailable {
                width: vp.width,
                height: vp.height,
            });
        }
        Ok(vp)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawOp {
        Clear,
        Rect {
            x: f32,
            y: f32,
            w: f32,
            h: f32,
            color: Rgba,
        },
        Circle {
            cx: f32,
            cy: f32,
            radius: f32,
            color: Rgba,
        },
        Glyph {
            x: f32,
            y: f32,
            ch: char,
            color: Rgba,
        },
        Radial {
            cx: f32,
            cy: f32,
            radius: f32,
            clip: f32,
        },
    }

    /// Records every call instead of rasterizing.
    #[derive(Clone, Debug, Default)]
    pub struct RecordingSurface {
        pub viewport: Viewport,
        pub ops: Vec<DrawOp>,
    }

    impl RecordingSurface {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                viewport: Viewport::new(width, height),
                ops: Vec::new(),
            }
        }

        pub fn circles(&self) -> impl Iterator<Item = &DrawOp> {
            self.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Circle { .. }))
        }
    }

    impl Surface for RecordingSurface {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn clear(&mut self) {
            self.ops.push(DrawOp::Clear);
        }

        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
            self.ops.push(DrawOp::Rect { x, y, w, h, color });
        }

        fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
            self.ops.push(DrawOp::Circle {
                cx,
                cy,
                radius,
                color,
            });
        }

        fn fill_glyph(&mut self, x: f32, y: f32, ch: char, color: Rgba) {
            self.ops.push(DrawOp::Glyph { x, y, ch, color });
        }

        fn fill_radial(&mut self, gradient: &RadialGradient, clip_radius: f32) {
            self.ops.push(DrawOp::Radial {
                cx: gradient.cx,
                cy: gradient.cy,
                radius: gradient.radius,
                clip: clip_radius,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_viewports_are_reported_unavailable() {
        assert!(Viewport::new(0.0, 600.0).is_empty());
        assert!(Viewport::new(800.0, f32::NAN).is_empty());
        assert!(!Viewport::new(800.0, 600.0).is_empty());
    }

    #[test]
    fn gradient_sampling_interpolates_between_stops() {
        let g = RadialGradient::new(
            0.0,
            0.0,
            100.0,
            &[stop(0.0, 255, 255, 255, 0.8), stop(1.0, 0, 0, 0, 0.0)],
        );
        let mid = g.color_at_distance(50.0);
        assert_eq!(mid.rgb, Rgb::new(128, 128, 128));
        assert!((mid.a - 0.4).abs() < 1e-6);
        assert_eq!(g.color_at_distance(500.0).a, 0.0);
    }
}
