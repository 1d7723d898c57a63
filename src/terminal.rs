// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::ops::Range;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Once this share of a frame changed, a full repaint is cheaper than cursor hops.
const FULL_REDRAW_DIVISOR: usize = 3;

/// Spans of a row whose cells changed and share one style.
pub fn changed_runs(prev: Option<&[Cell]>, row: &[Cell]) -> Vec<Range<usize>> {
    let mut runs: Vec<Range<usize>> = Vec::new();
    let changed = |x: usize| prev.and_then(|p| p.get(x)) != Some(&row[x]);

    let mut x = 0;
    while x < row.len() {
        if !changed(x) {
            x += 1;
            continue;
        }
        let start = x;
        let style = (row[x].fg, row[x].bg, row[x].bold);
        x += 1;
        while x < row.len() && changed(x) && (row[x].fg, row[x].bg, row[x].bold) == style {
            x += 1;
        }
        runs.push(start..x);
    }
    runs
}

#[derive(Default)]
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<Frame>,
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        log::debug!("terminal: raw mode and alternate screen entered");
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Forget the previous frame so the next draw repaints everything.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    fn apply_style(&mut self, pen: &mut Pen, cell: &Cell) -> Result<()> {
        if pen.fg != Some(cell.fg) {
            self.stdout
                .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            pen.fg = Some(cell.fg);
        }
        if pen.bg != Some(cell.bg) {
            self.stdout
                .queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            pen.bg = Some(cell.bg);
        }
        if pen.bold != cell.bold {
            self.stdout.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            pen.bold = cell.bold;
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let mut pen = Pen::default();

        let same_size = self
            .last
            .as_ref()
            .map(|l| l.width == frame.width && l.height == frame.height)
            .unwrap_or(false);
        if !same_size {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let previous = if same_size { self.last.take() } else { None };
        let total = frame.width as usize * frame.height as usize;
        let changed_cells: usize = match &previous {
            Some(prev) => (0..frame.height)
                .map(|y| {
                    prev.row(y)
                        .iter()
                        .zip(frame.row(y))
                        .filter(|(a, b)| a != b)
                        .count()
                })
                .sum(),
            None => total,
        };
        let full = previous.is_none() || changed_cells * FULL_REDRAW_DIVISOR >= total;

        for y in 0..frame.height {
            let row = frame.row(y);
            let prev_row = if full {
                None
            } else {
                previous.as_ref().map(|p| p.row(y))
            };
            for run in changed_runs(prev_row, row) {
                let x0 = run.start as u16;
                if pen.pos != Some((x0, y)) {
                    self.stdout.queue(cursor::MoveTo(x0, y))?;
                }
                self.apply_style(&mut pen, &row[run.start])?;

                self.run_buf.clear();
                self.run_buf.extend(row[run.clone()].iter().map(|c| c.ch));
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next_x = run.end as u16;
                pen.pos = (next_x < frame.width).then_some((next_x, y));
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;

        self.last = Some(frame.clone());
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
