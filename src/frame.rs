// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Row-major cell grid handed to the terminal once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    #[cfg(test)]
    pub fn clear(&mut self, bg: Option<Color>) {
        self.cells.fill(Cell::blank_with_bg(bg));
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let w = self.width as usize;
        let start = y as usize * w;
        &self.cells[start..start + w]
    }

    /// Writes `text` from `(x, y)` keeping each cell's background. Clipped at
    /// `max_x` (exclusive) and the frame edge; returns the columns written.
    pub fn print(
        &mut self,
        x: u16,
        y: u16,
        max_x: u16,
        text: &str,
        fg: Option<Color>,
        bold: bool,
    ) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = max_x.min(self.width);
        let mut col = x;
        for ch in text.chars() {
            if col >= limit {
                break;
            }
            let i = y as usize * self.width as usize + col as usize;
            self.cells[i] = self.cells[i].overlay(ch, fg, bold);
            col += 1;
        }
        col - x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_clips_and_keeps_background() {
        let mut f = Frame::new(6, 2);
        f.clear(Some(Color::Black));
        let n = f.print(2, 1, 5, "hello", Some(Color::Green), true);
        assert_eq!(n, 3);
        let row: String = f.row(1).iter().map(|c| c.ch).collect();
        assert_eq!(row, "  hel ");
        let c = f.get(2, 1).unwrap();
        assert_eq!(c.bg, Some(Color::Black));
        assert_eq!(c.fg, Some(Color::Green));
        assert!(c.bold);
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut f = Frame::new(2, 2);
        f.set(5, 5, Cell::BLANK.overlay('x', None, false));
        assert!(f.get(5, 5).is_none());
        assert_eq!(f.print(0, 9, 2, "ab", None, false), 0);
        assert!(f.row(9).is_empty());
    }
}
