// Copyright (c) 2026 rezky_nightky

//! Terminal-cell rasterizer behind the [`Surface`] trait.
//!
//! Every cell stands for a block of logical pixels. Each texel keeps a
//! premultiplied background colour with coverage plus at most one glyph.
//! Areas (rectangles, large circles, gradients) tint the background while
//! small circles and text become glyphs, which is how a terminal can show
//! a 2-pixel star at all.

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::term_color;
use crate::runtime::ColorMode;
use crate::surface::{RadialGradient, Rgb, Rgba, Surface, Viewport};

pub const CELL_PX_W: f32 = 8.0;
pub const CELL_PX_H: f32 = 16.0;

/// Circles narrower than this radius are drawn as dot glyphs.
pub const DOT_RADIUS: f32 = 4.0;
/// Glyphs fainter than this are dropped.
pub const MIN_GLYPH: f32 = 0.04;

const DOTS: [(f32, char); 4] = [(0.75, '.'), (1.5, '·'), (2.5, '•'), (f32::INFINITY, '●')];
const ASCII_DOTS: [(f32, char); 4] = [(0.75, '.'), (1.5, '.'), (2.5, '*'), (f32::INFINITY, 'o')];

// Sub-sample offsets used to estimate circle coverage of a cell.
const SAMPLES_X: [f32; 2] = [0.25, 0.75];
const SAMPLES_Y: [f32; 4] = [0.125, 0.375, 0.625, 0.875];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub fg: [f32; 3],
    pub strength: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Texel {
    /// Premultiplied by `alpha`.
    pub color: [f32; 3],
    pub alpha: f32,
    pub glyph: Option<Glyph>,
}

impl Texel {
    fn blend(&mut self, c: Rgba, weight: f32) {
        let a = (c.a * weight).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let src = rgb_f(c.rgb);
        for (dst, s) in self.color.iter_mut().zip(src) {
            *dst = s * a + *dst * (1.0 - a);
        }
        self.alpha = a + self.alpha * (1.0 - a);

        if let Some(g) = self.glyph.as_mut() {
            for (dst, s) in g.fg.iter_mut().zip(src) {
                *dst = s * a + *dst * (1.0 - a);
            }
            g.strength *= 1.0 - a;
            if g.strength < MIN_GLYPH {
                self.glyph = None;
            }
        }
    }

    /// Background over `base`, straight (not premultiplied) colour.
    fn resolve(&self, base: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0; 3];
        for i in 0..3 {
            out[i] = self.color[i] + base[i] * (1.0 - self.alpha);
        }
        out
    }
}

fn rgb_f(c: Rgb) -> [f32; 3] {
    [c.r as f32, c.g as f32, c.b as f32]
}

fn to_rgb(c: [f32; 3]) -> Rgb {
    let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Rgb::new(q(c[0]), q(c[1]), q(c[2]))
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    texels: Vec<Texel>,
    ascii: bool,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            texels: vec![Texel::default(); cols as usize * rows as usize],
            ascii: false,
        }
    }

    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    #[cfg(test)]
    pub fn texel(&self, col: u16, row: u16) -> Option<&Texel> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.texels.get(row as usize * self.cols as usize + col as usize)
    }

    #[cfg(test)]
    pub fn glyph_count(&self) -> usize {
        self.texels.iter().filter(|t| t.glyph.is_some()).count()
    }

    fn idx(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    /// Cell ranges overlapped by the pixel box, clipped to the grid.
    fn cell_span(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(i32, i32, i32, i32)> {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return None;
        }
        let c0 = ((x0 / CELL_PX_W).floor() as i32).max(0);
        let r0 = ((y0 / CELL_PX_H).floor() as i32).max(0);
        let c1 = ((x1 / CELL_PX_W).ceil() as i32).min(self.cols as i32);
        let r1 = ((y1 / CELL_PX_H).ceil() as i32).min(self.rows as i32);
        if c0 >= c1 || r0 >= r1 {
            return None;
        }
        Some((c0, r0, c1, r1))
    }

    fn set_dot(&mut self, col: i32, row: i32, radius: f32, color: Rgba) {
        let Some(i) = self.idx(col, row) else { return };
        let table = if self.ascii { &ASCII_DOTS } else { &DOTS };
        let ch = table
            .iter()
            .find(|(limit, _)| radius < *limit)
            .map(|(_, ch)| *ch)
            .unwrap_or('.');
        let t = &mut self.texels[i];
        if t.glyph.is_some_and(|g| g.strength > color.a) {
            return;
        }
        t.glyph = Some(Glyph {
            ch,
            fg: rgb_f(color.rgb),
            strength: color.a,
        });
    }

    /// Composites `src` over this canvas, scaled by `opacity`.
    pub fn blend_layer(&mut self, src: &Canvas, opacity: f32) {
        let op = opacity.clamp(0.0, 1.0);
        if op <= 0.0 || src.cols != self.cols || src.rows != self.rows {
            return;
        }
        for (dst, s) in self.texels.iter_mut().zip(&src.texels) {
            let a = s.alpha * op;
            for i in 0..3 {
                dst.color[i] = s.color[i] * op + dst.color[i] * (1.0 - a);
            }
            dst.alpha = a + dst.alpha * (1.0 - a);
            if let Some(g) = dst.glyph.as_mut() {
                g.strength *= 1.0 - a;
            }

            if let Some(g) = s.glyph {
                let strength = g.strength * op;
                let keep = dst.glyph.is_some_and(|d| d.strength >= strength);
                if !keep && strength >= MIN_GLYPH {
                    dst.glyph = Some(Glyph { strength, ..g });
                }
            }
            if dst.glyph.is_some_and(|g| g.strength < MIN_GLYPH) {
                dst.glyph = None;
            }
        }
    }

    /// Resolves every texel into `frame`. `base` of `None` keeps the
    /// terminal's own background where nothing was painted.
    pub fn write_frame(&self, frame: &mut Frame, mode: ColorMode, base: Option<Rgb>) {
        let base_f = rgb_f(base.unwrap_or(Rgb::BLACK));
        for row in 0..self.rows.min(frame.height) {
            for col in 0..self.cols.min(frame.width) {
                let t = &self.texels[row as usize * self.cols as usize + col as usize];
                let bg = t.resolve(base_f);
                let bg_color = if base.is_none() && t.alpha < 0.02 {
                    None
                } else {
                    term_color(to_rgb(bg), mode)
                };

                let cell = match t.glyph {
                    Some(g) if mode != ColorMode::Mono || g.strength > 0.25 => {
                        let fg = mix(bg, g.fg, g.strength.clamp(0.0, 1.0));
                        Cell {
                            ch: g.ch,
                            fg: term_color(to_rgb(fg), mode),
                            bg: bg_color,
                            bold: g.strength > 0.85,
                        }
                    }
                    _ => Cell::blank_with_bg(bg_color),
                };
                frame.set(col, row, cell);
            }
        }
    }
}

impl Surface for Canvas {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.cols as f32 * CELL_PX_W, self.rows as f32 * CELL_PX_H)
    }

    fn clear(&mut self) {
        self.texels.fill(Texel::default());
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if !(w > 0.0 && h > 0.0) {
            return;
        }
        let Some((c0, r0, c1, r1)) = self.cell_span(x, y, x + w, y + h) else {
            return;
        };
        for row in r0..r1 {
            let top = row as f32 * CELL_PX_H;
            let cover_y = ((y + h).min(top + CELL_PX_H) - y.max(top)) / CELL_PX_H;
            for col in c0..c1 {
                let left = col as f32 * CELL_PX_W;
                let cover_x = ((x + w).min(left + CELL_PX_W) - x.max(left)) / CELL_PX_W;
                if let Some(i) = self.idx(col, row) {
                    self.texels[i].blend(color, (cover_x * cover_y).clamp(0.0, 1.0));
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if !(radius > 0.0) || color.a <= 0.0 {
            return;
        }
        if radius < DOT_RADIUS {
            if cx < 0.0 || cy < 0.0 {
                return;
            }
            let col = (cx / CELL_PX_W).floor() as i32;
            let row = (cy / CELL_PX_H).floor() as i32;
            self.set_dot(col, row, radius, color);
            return;
        }

        let Some((c0, r0, c1, r1)) =
            self.cell_span(cx - radius, cy - radius, cx + radius, cy + radius)
        else {
            return;
        };
        let r2 = radius * radius;
        let samples = (SAMPLES_X.len() * SAMPLES_Y.len()) as f32;
        for row in r0..r1 {
            for col in c0..c1 {
                let mut inside = 0u32;
                for sy in SAMPLES_Y {
                    for sx in SAMPLES_X {
                        let px = (col as f32 + sx) * CELL_PX_W - cx;
                        let py = (row as f32 + sy) * CELL_PX_H - cy;
                        if px * px + py * py <= r2 {
                            inside += 1;
                        }
                    }
                }
                if inside == 0 {
                    continue;
                }
                if let Some(i) = self.idx(col, row) {
                    self.texels[i].blend(color, inside as f32 / samples);
                }
            }
        }
    }

    fn fill_glyph(&mut self, x: f32, y: f32, ch: char, color: Rgba) {
        if color.a < MIN_GLYPH || x < 0.0 || y <= 0.0 {
            return;
        }
        let col = (x / CELL_PX_W).floor() as i32;
        let row = ((y - 1.0) / CELL_PX_H).floor() as i32;
        let Some(i) = self.idx(col, row) else { return };
        self.texels[i].glyph = Some(Glyph {
            ch,
            fg: rgb_f(color.rgb),
            strength: color.a,
        });
    }

    fn fill_radial(&mut self, gradient: &RadialGradient, clip_radius: f32) {
        if !(clip_radius > 0.0) {
            return;
        }
        let (cx, cy) = (gradient.cx, gradient.cy);
        let Some((c0, r0, c1, r1)) = self.cell_span(
            cx - clip_radius,
            cy - clip_radius,
            cx + clip_radius,
            cy + clip_radius,
        ) else {
            return;
        };
        for row in r0..r1 {
            for col in c0..c1 {
                let px = (col as f32 + 0.5) * CELL_PX_W - cx;
                let py = (row as f32 + 0.5) * CELL_PX_H - cy;
                let d = (px * px + py * py).sqrt();
                if d > clip_radius {
                    continue;
                }
                let c = gradient.color_at_distance(d);
                if let Some(i) = self.idx(col, row) {
                    self.texels[i].blend(c, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::stop;
    use crossterm::style::Color;

    #[test]
    fn viewport_scales_cells_to_pixels() {
        let c = Canvas::new(80, 24);
        assert_eq!(c.viewport(), Viewport::new(640.0, 384.0));
        assert!(Canvas::new(0, 24).ready().is_err());
    }

    #[test]
    fn small_circles_become_dots_and_stronger_dot_wins() {
        let mut c = Canvas::new(4, 4);
        c.fill_circle(12.0, 20.0, 2.0, Rgb::WHITE.alpha(0.3));
        c.fill_circle(13.0, 21.0, 0.5, Rgb::WHITE.alpha(0.9));
        c.fill_circle(14.0, 22.0, 3.0, Rgb::WHITE.alpha(0.2));
        let g = c.texel(1, 1).and_then(|t| t.glyph).expect("dot");
        assert_eq!(g.ch, '.');
        assert_eq!(g.strength, 0.9);
        assert_eq!(c.glyph_count(), 1);
    }

    #[test]
    fn large_circles_tint_backgrounds() {
        let mut c = Canvas::new(10, 5);
        c.fill_circle(40.0, 40.0, 20.0, Rgb::new(79, 193, 255).alpha(0.5));
        let center = c.texel(5, 2).unwrap();
        assert!(center.alpha > 0.45);
        assert_eq!(center.glyph, None);
        assert_eq!(c.texel(0, 0).unwrap().alpha, 0.0);
    }

    #[test]
    fn trail_fill_fades_glyphs_until_dropped() {
        let mut c = Canvas::new(2, 2);
        c.fill_glyph(0.0, 16.0, 'ア', Rgb::new(0, 255, 65).alpha(1.0));
        assert_eq!(c.texel(0, 0).and_then(|t| t.glyph).map(|g| g.ch), Some('ア'));
        let vp = c.viewport();
        for _ in 0..200 {
            c.fill_rect(0.0, 0.0, vp.width, vp.height, Rgb::BLACK.alpha(0.05));
        }
        assert_eq!(c.glyph_count(), 0);
        assert!(c.texel(0, 0).unwrap().alpha > 0.99);
    }

    #[test]
    fn glyph_baseline_picks_the_cell_above() {
        let mut c = Canvas::new(2, 3);
        c.fill_glyph(9.0, 32.0, 'x', Rgb::WHITE.alpha(1.0));
        assert!(c.texel(1, 1).unwrap().glyph.is_some());
        c.fill_glyph(0.0, -4.0, 'y', Rgb::WHITE.alpha(1.0));
        assert_eq!(c.glyph_count(), 1);
    }

    #[test]
    fn radial_fill_is_clipped() {
        let mut c = Canvas::new(20, 10);
        let g = RadialGradient::new(
            80.0,
            80.0,
            100.0,
            &[stop(0.0, 255, 255, 255, 0.8), stop(1.0, 0, 0, 0, 0.0)],
        );
        c.fill_radial(&g, 30.0);
        assert!(c.texel(10, 5).unwrap().alpha > 0.5);
        assert_eq!(c.texel(0, 0).unwrap().alpha, 0.0);
    }

    #[test]
    fn layers_composite_with_opacity_into_frames() {
        let mut layer = Canvas::new(3, 1);
        layer.fill_rect(0.0, 0.0, 24.0, 16.0, Rgb::WHITE.alpha(1.0));
        layer.fill_glyph(8.0, 16.0, 'Z', Rgb::new(0, 255, 0).alpha(1.0));
        let mut scene = Canvas::new(3, 1);
        scene.blend_layer(&layer, 0.5);
        assert!((scene.texel(0, 0).unwrap().alpha - 0.5).abs() < 1e-6);

        let mut frame = Frame::new(3, 1);
        scene.write_frame(&mut frame, ColorMode::TrueColor, Some(Rgb::BLACK));
        let cell = frame.get(0, 0).unwrap();
        assert_eq!(cell.bg, Some(Color::Rgb { r: 128, g: 128, b: 128 }));
        assert_eq!(frame.get(1, 0).unwrap().ch, 'Z');
        assert_eq!(frame.get(2, 0).unwrap().ch, ' ');
    }

    #[test]
    fn transparent_base_leaves_unpainted_cells_default() {
        let c = Canvas::new(2, 1);
        let mut frame = Frame::new(2, 1);
        c.write_frame(&mut frame, ColorMode::Color256, None);
        assert_eq!(frame.get(0, 0).unwrap().bg, None);
    }
}
