// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
        bold: false,
    };

    pub fn blank_with_bg(bg: Option<Color>) -> Self {
        Self { bg, ..Self::BLANK }
    }

    /// Same background, new glyph on top.
    pub fn overlay(self, ch: char, fg: Option<Color>, bold: bool) -> Self {
        Self {
            ch,
            fg,
            bold,
            bg: self.bg,
        }
    }
}
