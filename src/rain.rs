// Copyright (c) 2026 rezky_nightky

//! Falling glyph rain.
//!
//! A fixed grid of cells is laid out across `floor(width / cell_width)`
//! columns at generation time. Cells never die: once one falls past the
//! bottom edge it is recycled just above the top, so the population is
//! constant for the life of the layer.

use crate::rng::{pick, RandomSource};
use crate::surface::Viewport;

pub const DEFAULT_CELL_WIDTH: f32 = 20.0;
pub const DEFAULT_CELL_HEIGHT: f32 = 20.0;
pub const DEFAULT_DENSITY: usize = 3;
pub const FALL_SPEED: (f32, f32) = (1.0, 4.0);
pub const BRIGHT_SHARE: f32 = 0.2;
pub const MUTATE_CHANCE: f32 = 0.02;
pub const REBRIGHTEN_CHANCE: f32 = 0.05;
pub const OPACITY_DECAY: f32 = 0.98;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RainVariant {
    Bright,
    Dim,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphCell {
    pub column: u16,
    pub x: f32,
    pub y: f32,
    pub glyph: char,
    pub fall_speed: f32,
    pub opacity: f32,
    pub variant: RainVariant,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainParams {
    pub cell_width: f32,
    pub cell_height: f32,
    pub density: usize,
    pub mutate_chance: f32,
    pub rebrighten_chance: f32,
    pub opacity_decay: f32,
}

impl Default for RainParams {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            density: DEFAULT_DENSITY,
            mutate_chance: MUTATE_CHANCE,
            rebrighten_chance: REBRIGHTEN_CHANCE,
            opacity_decay: OPACITY_DECAY,
        }
    }
}

impl RainParams {
    pub fn columns(&self, viewport: Viewport) -> usize {
        if viewport.is_empty() || !(self.cell_width > 0.0) {
            return 0;
        }
        (viewport.width / self.cell_width).floor() as usize
    }
}

#[derive(Clone, Debug)]
pub struct GlyphRain {
    pub params: RainParams,
    pub viewport: Viewport,
    alphabet: Vec<char>,
    cells: Vec<GlyphCell>,
}

impl GlyphRain {
    pub fn generate(
        viewport: Viewport,
        params: RainParams,
        alphabet: &[char],
        rng: &mut dyn RandomSource,
    ) -> Self {
        let alphabet: Vec<char> = if alphabet.is_empty() {
            vec!['0', '1']
        } else {
            alphabet.to_vec()
        };

        let columns = params.columns(viewport);
        let count = columns * params.density;
        let mut cells = Vec::with_capacity(count);
        for i in 0..count {
            let column = i % columns;
            cells.push(GlyphCell {
                column: column.min(u16::MAX as usize) as u16,
                x: column as f32 * params.cell_width,
                y: rng.range(0.0, viewport.height),
                glyph: pick(rng, &alphabet).copied().unwrap_or('0'),
                fall_speed: rng.range(FALL_SPEED.0, FALL_SPEED.1),
                opacity: rng.unit(),
                variant: if rng.chance(BRIGHT_SHARE) {
                    RainVariant::Bright
                } else {
                    RainVariant::Dim
                },
            });
        }

        Self {
            params,
            viewport,
            alphabet,
            cells,
        }
    }

    pub fn cells(&self) -> &[GlyphCell] {
        &self.cells
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// One animation frame of fall, recycle, mutation and flicker.
    pub fn tick(&mut self, rng: &mut dyn RandomSource) {
        let height = self.viewport.height;
        let p = self.params;
        for cell in &mut self.cells {
            cell.y += cell.fall_speed;
            if cell.y >= height {
                cell.y = -p.cell_height;
            }

            if rng.chance(p.mutate_chance) {
                if let Some(&g) = pick(rng, &self.alphabet) {
                    cell.glyph = g;
                }
            }

            cell.opacity = if rng.chance(p.rebrighten_chance) {
                rng.unit()
            } else {
                cell.opacity * p.opacity_decay
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    const ALPHA: &[char] = &['ア', 'イ', '0', '1', 'Z'];

    #[test]
    fn cell_count_is_columns_times_density() {
        let mut rng = seeded(4);
        let rain = GlyphRain::generate(
            Viewport::new(800.0, 600.0),
            RainParams::default(),
            ALPHA,
            &mut *rng,
        );
        assert_eq!(rain.len(), 40 * 3);
        assert!(rain.cells().iter().all(|c| ALPHA.contains(&c.glyph)));
        assert!(rain.cells().iter().all(|c| c.x == c.column as f32 * 20.0));
    }

    #[test]
    fn degenerate_inputs_produce_no_cells() {
        let mut rng = seeded(4);
        let zero = GlyphRain::generate(Viewport::new(0.0, 600.0), RainParams::default(), ALPHA, &mut *rng);
        assert!(zero.is_empty());
        let narrow = GlyphRain::generate(Viewport::new(19.0, 600.0), RainParams::default(), ALPHA, &mut *rng);
        assert!(narrow.is_empty());
        let no_width = RainParams {
            cell_width: 0.0,
            ..RainParams::default()
        };
        let zero_cell = GlyphRain::generate(Viewport::new(800.0, 600.0), no_width, ALPHA, &mut *rng);
        assert!(zero_cell.is_empty());
    }

    #[test]
    fn cells_recycle_above_the_top_and_never_escape() {
        let mut rng = seeded(8);
        let params = RainParams::default();
        let mut rain = GlyphRain::generate(Viewport::new(400.0, 300.0), params, ALPHA, &mut *rng);
        let count = rain.len();
        let mut recycled = false;
        for _ in 0..2_000 {
            rain.tick(&mut *rng);
            for c in rain.cells() {
                assert!(c.y >= -params.cell_height && c.y < 300.0, "y={}", c.y);
                recycled |= c.y == -params.cell_height;
                assert!((0.0..=1.0).contains(&c.opacity));
            }
        }
        assert!(recycled);
        assert_eq!(rain.len(), count);
    }

    #[test]
    fn bright_share_is_roughly_a_fifth() {
        let mut rng = seeded(21);
        let rain = GlyphRain::generate(
            Viewport::new(4000.0, 600.0),
            RainParams {
                density: 10,
                ..RainParams::default()
            },
            ALPHA,
            &mut *rng,
        );
        let bright = rain
            .cells()
            .iter()
            .filter(|c| c.variant == RainVariant::Bright)
            .count() as f32;
        let share = bright / rain.len() as f32;
        assert!((0.12..0.28).contains(&share), "share={}", share);
    }
}
