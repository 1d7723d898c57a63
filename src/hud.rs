// Copyright (c) 2026 rezky_nightky

//! Text overlay drawn on top of the composited scene: header, alert tags,
//! status board, initialization log, command feed and the progress footer.

use crossterm::style::Color;

use crate::corpus::{FOOTER_PROMPT, HEADER};
use crate::frame::Frame;
use crate::logfeed::{CommandInjector, ScriptedTyper};
use crate::palette::{term_color, ScenePalette};
use crate::progress::{banner_for, StatusEntry, StatusLevel};
use crate::raster::{Canvas, CELL_PX_H, CELL_PX_W};
use crate::runtime::ColorMode;
use crate::surface::Rgb;

/// Below this the HUD collapses to the header and one progress line.
pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 12;
/// From this width the panels sit in two columns.
pub const WIDE_COLS: u16 = 96;

pub const HEADER_ROWS: u16 = 3;
pub const FOOTER_ROWS: u16 = 4;
pub const STATUS_ROWS: u16 = 8;
pub const PANEL_SHADE: f32 = 0.7;
const STATUS_BAR: u16 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    /// Rows available inside the border.
    fn inner_rows(&self) -> u16 {
        self.h.saturating_sub(2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudLayout {
    pub width: u16,
    pub height: u16,
    pub compact: bool,
    pub status: Option<Rect>,
    pub messages: Option<Rect>,
    pub feed: Option<Rect>,
}

impl HudLayout {
    pub fn compute(width: u16, height: u16) -> Self {
        let mut layout = Self {
            width,
            height,
            compact: width < MIN_COLS || height < MIN_ROWS,
            status: None,
            messages: None,
            feed: None,
        };
        if layout.compact {
            return layout;
        }

        let top = HEADER_ROWS;
        let bottom = height.saturating_sub(FOOTER_ROWS + 1);
        let mh = bottom.saturating_sub(top);
        if mh < 4 {
            return layout;
        }

        if width >= WIDE_COLS {
            let half = width / 2;
            let left_w = half.saturating_sub(2);
            let right_w = width.saturating_sub(half + 1);
            let mut msg_top = top;
            if mh >= 12 {
                let sh = STATUS_ROWS.min(mh / 2);
                layout.status = Some(Rect::new(1, top, left_w, sh));
                msg_top = top + sh;
            }
            layout.messages = Some(Rect::new(1, msg_top, left_w, bottom - msg_top));
            layout.feed = Some(Rect::new(half, top, right_w, mh));
        } else {
            let w = width.saturating_sub(2);
            if mh >= 10 {
                let upper = mh / 2;
                layout.messages = Some(Rect::new(1, top, w, upper));
                layout.feed = Some(Rect::new(1, top + upper, w, mh - upper));
            } else {
                layout.messages = Some(Rect::new(1, top, w, mh));
            }
        }
        layout
    }

    pub fn panels(&self) -> impl Iterator<Item = Rect> {
        [self.status, self.messages, self.feed].into_iter().flatten()
    }

    /// Everything the HUD writes on, darkened so the text stays legible.
    pub fn shaded(&self) -> Vec<Rect> {
        let mut out: Vec<Rect> = self.panels().collect();
        if self.compact {
            out.push(Rect::new(0, 0, self.width, 1));
            out.push(Rect::new(0, self.height.saturating_sub(1), self.width, 1));
        } else {
            out.push(Rect::new(0, 0, self.width, 2));
            out.push(Rect::new(
                0,
                self.height.saturating_sub(FOOTER_ROWS),
                self.width,
                FOOTER_ROWS,
            ));
        }
        out
    }
}

/// Borrowed snapshot of everything the overlay shows.
pub struct HudView<'a> {
    pub alert_level: u8,
    pub status: &'a [StatusEntry],
    pub boot: &'a ScriptedTyper,
    pub loading: &'a ScriptedTyper,
    pub commands: &'a CommandInjector,
    pub progress: f32,
    pub phase: &'static str,
    pub eta_secs: u32,
    pub cursor_on: bool,
}

pub struct HudStyle {
    pub mode: ColorMode,
    pub ascii: bool,
}

impl HudStyle {
    fn color(&self, c: Rgb) -> Option<Color> {
        term_color(c, self.mode)
    }

    fn check(&self) -> &'static str {
        if self.ascii {
            "v"
        } else {
            "✓"
        }
    }

    fn bar_chars(&self) -> (char, char) {
        if self.ascii {
            ('#', '-')
        } else {
            ('█', '░')
        }
    }
}

pub fn shade(canvas: &mut Canvas, layout: &HudLayout, palette: &ScenePalette) {
    use crate::surface::Surface;

    for r in layout.shaded() {
        canvas.fill_rect(
            r.x as f32 * CELL_PX_W,
            r.y as f32 * CELL_PX_H,
            r.w as f32 * CELL_PX_W,
            r.h as f32 * CELL_PX_H,
            palette.background.alpha(PANEL_SHADE),
        );
    }
}

pub fn draw(
    frame: &mut Frame,
    layout: &HudLayout,
    view: &HudView<'_>,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    draw_header(frame, layout, view, palette, style);
    if layout.compact {
        draw_compact_footer(frame, layout, view, palette, style);
        return;
    }
    draw_boot_line(frame, view, palette, style);
    if let Some(r) = layout.status {
        draw_status(frame, r, view.status, palette, style);
    }
    if let Some(r) = layout.messages {
        draw_messages(frame, r, view, palette, style);
    }
    if let Some(r) = layout.feed {
        draw_feed(frame, r, view.commands, palette, style);
    }
    draw_footer(frame, layout, view, palette, style);
}

fn text_len(s: &str) -> u16 {
    s.chars().count().min(u16::MAX as usize) as u16
}

fn alert_tags(level: u8, palette: &ScenePalette) -> Vec<(&'static str, Rgb)> {
    let mut tags = Vec::new();
    if level > 1 {
        tags.push(("[BREACH DETECTED]", palette.alert));
    }
    if level > 2 {
        tags.push(("[ESCALATING]", palette.warn));
    }
    if level > 3 {
        tags.push(("[ROOT ACCESS]", palette.text));
    }
    tags
}

fn draw_header(
    frame: &mut Frame,
    layout: &HudLayout,
    view: &HudView<'_>,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    let w = layout.width;
    let tags = alert_tags(view.alert_level, palette);
    let tags_w: u16 = tags.iter().map(|(t, _)| text_len(t) + 1).sum();
    let header_end = w.saturating_sub(tags_w + 1);
    frame.print(1, 0, header_end, HEADER, style.color(palette.title), true);

    let mut x = w.saturating_sub(tags_w);
    for (tag, color) in tags {
        x += frame.print(x, 0, w, tag, style.color(color), true) + 1;
    }
}

fn draw_boot_line(frame: &mut Frame, view: &HudView<'_>, palette: &ScenePalette, style: &HudStyle) {
    let w = frame.width;
    let fg = style.color(palette.text);
    let mut x = 1;
    if let Some(typing) = view.boot.current_text() {
        x += frame.print(x, 1, w, typing, fg, false);
        if view.cursor_on {
            frame.print(x + 1, 1, w, "_", style.color(palette.title), true);
        }
    } else if let Some(done) = view.boot.history().last() {
        x += frame.print(x, 1, w, &done.text, fg, false);
        frame.print(x + 1, 1, w, style.check(), style.color(palette.title), false);
    }
}

/// Bordered box with the title set into the top edge.
fn draw_box(
    frame: &mut Frame,
    r: Rect,
    title: &str,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    if r.w < 2 || r.h < 2 {
        return;
    }
    let border = style.color(palette.frame);
    let inner = (r.w - 2) as usize;
    let edge = format!("+{}+", "-".repeat(inner));
    frame.print(r.x, r.y, r.right(), &edge, border, false);
    frame.print(r.x, r.y + r.h - 1, r.right(), &edge, border, false);
    for y in r.y + 1..r.y + r.h - 1 {
        frame.print(r.x, y, r.right(), "|", border, false);
        frame.print(r.right() - 1, y, r.right(), "|", border, false);
    }
    if !title.is_empty() && r.w > 6 {
        frame.print(
            r.x + 2,
            r.y,
            r.right().saturating_sub(2),
            &format!(" {} ", title),
            style.color(palette.muted),
            false,
        );
    }
}

fn status_color(level: StatusLevel, palette: &ScenePalette) -> Rgb {
    match level {
        StatusLevel::Initializing | StatusLevel::Loading | StatusLevel::Connecting => palette.warn,
        StatusLevel::Standby => palette.muted,
        StatusLevel::Bypassing => palette.alert,
        StatusLevel::Awakening => palette.glow,
        StatusLevel::Active | StatusLevel::Online => palette.text,
        StatusLevel::Ready => palette.title,
    }
}

fn draw_status(
    frame: &mut Frame,
    r: Rect,
    entries: &[StatusEntry],
    palette: &ScenePalette,
    style: &HudStyle,
) {
    draw_box(frame, r, "// System Status", palette, style);
    let (full, empty) = style.bar_chars();
    let max_x = r.right().saturating_sub(2);
    let label_w = 15;
    let name_end = max_x.saturating_sub(STATUS_BAR + label_w + 2);
    for (i, e) in entries.iter().take(r.inner_rows() as usize).enumerate() {
        let y = r.y + 1 + i as u16;
        let color = status_color(e.level, palette);
        frame.print(r.x + 2, y, name_end, e.name, style.color(palette.text), false);

        let filled = ((e.progress / 100.0) * STATUS_BAR as f32).round() as u16;
        let bar: String = (0..STATUS_BAR)
            .map(|i| if i < filled { full } else { empty })
            .collect();
        let bar_x = name_end + 1;
        frame.print(bar_x, y, max_x, &bar, style.color(color), false);
        frame.print(bar_x + STATUS_BAR + 1, y, max_x, e.level.label(), style.color(color), true);
    }
}

fn draw_messages(
    frame: &mut Frame,
    r: Rect,
    view: &HudView<'_>,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    draw_box(frame, r, "// System Initialization Log", palette, style);
    let rows = r.inner_rows() as usize;
    if rows == 0 {
        return;
    }
    let max_x = r.right().saturating_sub(2);
    let typing = view.loading.current_text();
    let history = view.loading.history();
    let keep = rows.saturating_sub(typing.is_some() as usize);
    let skip = history.len().saturating_sub(keep);

    let mut y = r.y + 1;
    let muted = style.color(palette.muted);
    let text = style.color(palette.text);
    for line in history.iter().skip(skip) {
        let mut x = r.x + 2;
        x += frame.print(x, y, max_x, &format!("[{:04}] ", line.display_number), muted, false);
        x += frame.print(x, y, max_x, &line.text, text, false);
        frame.print(x + 1, y, max_x, style.check(), style.color(palette.title), false);
        y += 1;
    }
    if let Some(partial) = typing {
        let mut x = r.x + 2;
        let number = format!("[{:04}] ", view.loading.next_number());
        x += frame.print(x, y, max_x, &number, muted, false);
        x += frame.print(x, y, max_x, partial, text, false);
        if view.cursor_on {
            frame.print(x, y, max_x, "_", style.color(palette.title), true);
        }
    }
}

fn draw_feed(
    frame: &mut Frame,
    r: Rect,
    commands: &CommandInjector,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    draw_box(frame, r, "// Live Command Execution", palette, style);
    let lines = format!(" Lines: {} ", commands.next_line());
    let lines_x = r.right().saturating_sub(text_len(&lines) + 2);
    if lines_x > r.x + 30 {
        frame.print(lines_x, r.y, r.right(), &lines, style.color(palette.title), false);
    }

    let rows = r.inner_rows() as usize;
    let history = commands.history();
    let skip = history.len().saturating_sub(rows);
    let max_x = r.right().saturating_sub(2);
    for (i, rec) in history.iter().skip(skip).enumerate() {
        let y = r.y + 1 + i as u16;
        let mut x = r.x + 2;
        x += frame.print(
            x,
            y,
            max_x,
            &format!("[{}] ", rec.line_number),
            style.color(palette.muted),
            false,
        );
        frame.print(x, y, max_x, &rec.text, style.color(palette.feed_color(rec.kind)), false);
    }
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Filled cells of a `width`-cell bar at `progress` percent.
pub fn bar_fill(progress: f32, width: u16) -> u16 {
    let p = progress.clamp(0.0, 100.0) / 100.0;
    ((p * width as f32).round() as u16).min(width)
}

fn draw_bar(
    frame: &mut Frame,
    x: u16,
    y: u16,
    width: u16,
    progress: f32,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    let (full, empty) = style.bar_chars();
    let filled = bar_fill(progress, width);
    let mut buf = [0u8; 4];
    for i in 0..width {
        let (ch, color) = if i < filled {
            let t = if filled > 1 {
                i as f32 / (filled - 1) as f32
            } else {
                0.0
            };
            (full, lerp_rgb(palette.bar_from, palette.bar_to, t))
        } else {
            (empty, palette.muted)
        };
        frame.print(x + i, y, x + width, ch.encode_utf8(&mut buf), style.color(color), false);
    }
}

fn draw_footer(
    frame: &mut Frame,
    layout: &HudLayout,
    view: &HudView<'_>,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    let w = layout.width;
    let y0 = layout.height.saturating_sub(FOOTER_ROWS);
    let text = style.color(palette.text);

    let x = 1 + frame.print(1, y0, w, FOOTER_PROMPT, text, false);
    if view.cursor_on {
        frame.print(x + 1, y0, w, "_", text, true);
    }

    let loading = format!("Loading: {}%  {}", view.progress.round() as u32, view.phase);
    frame.print(1, y0 + 1, w, &loading, style.color(palette.muted), false);
    let eta = format!("ETA: {}s", view.eta_secs);
    let eta_x = w.saturating_sub(text_len(&eta) + 1);
    frame.print(eta_x, y0 + 1, w, &eta, style.color(palette.muted), false);

    draw_bar(frame, 1, y0 + 2, w.saturating_sub(2), view.progress, palette, style);

    let dot = if style.ascii { "*" } else { "●" };
    let banner = format!("{} {} {}", dot, banner_for(view.progress), dot);
    let bx = w.saturating_sub(text_len(&banner)) / 2;
    frame.print(bx, y0 + 3, w, &banner, text, true);
}

fn draw_compact_footer(
    frame: &mut Frame,
    layout: &HudLayout,
    view: &HudView<'_>,
    palette: &ScenePalette,
    style: &HudStyle,
) {
    let y = layout.height.saturating_sub(1);
    let label = format!("{:>3}% ", view.progress.round() as u32);
    let x = frame.print(0, y, layout.width, &label, style.color(palette.text), true);
    draw_bar(frame, x, y, layout.width.saturating_sub(x), view.progress, palette, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{self, BOOT_STEPS, COMMANDS, LOADING_SEQUENCE};
    use crate::logfeed::{Tone, TypingTiming, LOADING_HISTORY_CAP, LOADING_NUMBER_BASE};
    use crate::progress::StatusBoard;
    use crate::rng::seeded;
    use crate::runtime::MsRange;
    use std::time::{Duration, Instant};

    struct Fixture {
        board: StatusBoard,
        boot: ScriptedTyper,
        loading: ScriptedTyper,
        commands: CommandInjector,
    }

    impl Fixture {
        fn new() -> Self {
            let mut rng = seeded(5);
            let t0 = Instant::now();
            let mut boot = ScriptedTyper::new(
                corpus::owned(BOOT_STEPS),
                TypingTiming::boot_steps(),
                Tone::Ok,
                BOOT_STEPS.len(),
            );
            let mut loading = ScriptedTyper::new(
                corpus::owned(LOADING_SEQUENCE),
                TypingTiming::loading(),
                Tone::Info,
                LOADING_HISTORY_CAP,
            )
            .with_number_base(LOADING_NUMBER_BASE);
            let mut commands =
                CommandInjector::new(corpus::owned(COMMANDS), MsRange::new(150, 350), 26);
            commands.prefill(20, &mut *rng);
            boot.start(t0);
            loading.start(t0);
            let later = t0 + Duration::from_secs(4);
            boot.poll(later, &mut *rng);
            loading.poll(later, &mut *rng);
            Self {
                board: StatusBoard::default(),
                boot,
                loading,
                commands,
            }
        }

        fn view(&self, alert_level: u8) -> HudView<'_> {
            HudView {
                alert_level,
                status: self.board.entries(),
                boot: &self.boot,
                loading: &self.loading,
                commands: &self.commands,
                progress: 42.0,
                phase: "CALIBRATING QUANTUM PROCESSORS",
                eta_secs: 6,
                cursor_on: true,
            }
        }
    }

    fn row_text(frame: &Frame, y: u16) -> String {
        frame.row(y).iter().map(|c| c.ch).collect()
    }

    fn style() -> HudStyle {
        HudStyle {
            mode: ColorMode::TrueColor,
            ascii: false,
        }
    }

    #[test]
    fn tiny_terminals_collapse_to_compact() {
        let l = HudLayout::compute(30, 10);
        assert!(l.compact);
        assert_eq!(l.panels().count(), 0);
    }

    #[test]
    fn wide_terminals_get_three_panels_in_two_columns() {
        let l = HudLayout::compute(120, 40);
        assert!(!l.compact);
        let status = l.status.unwrap();
        let messages = l.messages.unwrap();
        let feed = l.feed.unwrap();
        assert_eq!(status.h, STATUS_ROWS);
        assert_eq!(messages.y, status.y + status.h);
        assert!(status.right() <= feed.x);
        assert_eq!(feed.h, 40 - FOOTER_ROWS - 1 - HEADER_ROWS);
    }

    #[test]
    fn narrow_terminals_stack_or_drop_panels() {
        let l = HudLayout::compute(80, 24);
        assert!(l.status.is_none());
        assert!(l.messages.is_some() && l.feed.is_some());

        let short = HudLayout::compute(80, 14);
        assert!(short.feed.is_none());
        assert!(short.messages.is_some());
    }

    #[test]
    fn alert_tags_follow_the_hacking_phase() {
        let p = ScenePalette::default();
        assert!(alert_tags(1, &p).is_empty());
        assert_eq!(alert_tags(2, &p).len(), 1);
        let all: Vec<&str> = alert_tags(4, &p).into_iter().map(|(t, _)| t).collect();
        assert_eq!(all, vec!["[BREACH DETECTED]", "[ESCALATING]", "[ROOT ACCESS]"]);
    }

    #[test]
    fn header_tags_and_footer_are_drawn() {
        let fx = Fixture::new();
        let mut frame = Frame::new(120, 40);
        let layout = HudLayout::compute(120, 40);
        draw(&mut frame, &layout, &fx.view(4), &ScenePalette::default(), &style());

        let top = row_text(&frame, 0);
        assert!(top.contains("Galaxy Brain Terminal"));
        assert!(top.trim_end().ends_with("[ROOT ACCESS]"));
        assert!(row_text(&frame, 36).contains("INJECTING QUANTUM CODE SEQUENCES"));
        let loading = row_text(&frame, 37);
        assert!(loading.contains("Loading: 42%"));
        assert!(loading.trim_end().ends_with("ETA: 6s"));
        assert!(row_text(&frame, 39).contains("BYPASSING SECURITY PROTOCOLS"));
    }

    #[test]
    fn feed_panel_shows_newest_records_with_line_numbers() {
        let fx = Fixture::new();
        let mut frame = Frame::new(120, 40);
        let layout = HudLayout::compute(120, 40);
        draw(&mut frame, &layout, &fx.view(0), &ScenePalette::default(), &style());

        let feed = layout.feed.unwrap();
        let title = row_text(&frame, feed.y);
        assert!(title.contains("// Live Command Execution"));
        assert!(title.contains("Lines: 2493"));
        let last = row_text(&frame, feed.y + 20);
        assert!(last.contains("[2492]"), "{}", last);
    }

    #[test]
    fn messages_panel_numbers_lines_from_89() {
        let fx = Fixture::new();
        let mut frame = Frame::new(120, 40);
        let layout = HudLayout::compute(120, 40);
        draw(&mut frame, &layout, &fx.view(0), &ScenePalette::default(), &style());
        let m = layout.messages.unwrap();
        assert!(row_text(&frame, m.y + 1).contains("[0089]"));
    }

    #[test]
    fn compact_mode_draws_a_percentage_line() {
        let fx = Fixture::new();
        let mut frame = Frame::new(30, 10);
        let layout = HudLayout::compute(30, 10);
        draw(&mut frame, &layout, &fx.view(0), &ScenePalette::default(), &style());
        assert!(row_text(&frame, 9).starts_with(" 42% "));
    }

    #[test]
    fn bar_fill_is_clamped() {
        assert_eq!(bar_fill(0.0, 10), 0);
        assert_eq!(bar_fill(55.0, 10), 6);
        assert_eq!(bar_fill(250.0, 10), 10);
    }
}
