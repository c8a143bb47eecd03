//! Terminal presentation of the composited surface. A `Renderer` turns
//! the display-pixel buffer into ANSI truecolor cells; the half-block
//! backend packs 1x2 pixels per cell, braille 2x4.

mod braille;
mod halfblock;

pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;

use std::io::Write;

/// Everything one terminal paint needs. `pixels_rgba` is the compositor's
/// display surface: row-major RGBA8, `pixel_width * pixel_height` pixels.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub viewport_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Pixels-per-cell multiplier (width, height) this backend packs.
    fn cell_pixels(&self) -> (usize, usize);
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Foreground/background escape dedup so unchanged colors cost nothing on
/// the wire.
#[derive(Default)]
pub(crate) struct Pen {
    fg: Option<(u8, u8, u8)>,
    bg: Option<(u8, u8, u8)>,
}

impl Pen {
    pub(crate) fn reset(&mut self) {
        self.fg = None;
        self.bg = None;
    }

    pub(crate) fn set_fg(&mut self, out: &mut dyn Write, c: (u8, u8, u8)) -> std::io::Result<()> {
        if self.fg != Some(c) {
            write!(out, "\x1b[38;2;{};{};{}m", c.0, c.1, c.2)?;
            self.fg = Some(c);
        }
        Ok(())
    }

    pub(crate) fn set_bg(&mut self, out: &mut dyn Write, c: (u8, u8, u8)) -> std::io::Result<()> {
        if self.bg != Some(c) {
            write!(out, "\x1b[48;2;{};{};{}m", c.0, c.1, c.2)?;
            self.bg = Some(c);
        }
        Ok(())
    }
}

/// Common paint preamble: optional synchronized-update begin, home the
/// cursor, reset attributes, disable autowrap while painting full rows.
pub(crate) fn begin_paint(out: &mut dyn Write, sync: bool) -> std::io::Result<()> {
    if sync {
        out.write_all(b"\x1b[?2026h")?;
    }
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")
}

pub(crate) fn end_paint(out: &mut dyn Write, sync: bool) -> std::io::Result<()> {
    out.write_all(b"\x1b[?7h")?;
    if sync {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()
}

/// Paint the HUD rows below the viewport, clearing each line first.
pub(crate) fn write_hud(out: &mut dyn Write, frame: &Frame<'_>) -> std::io::Result<()> {
    let cols = frame.term_cols as usize;
    let mut lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        let row = frame.viewport_rows as usize + i + 1;
        write!(out, "\x1b[{row};1H\x1b[0m\x1b[2K")?;
        if let Some(mut line) = lines.next() {
            if line.len() > cols {
                line = &line[..cols];
            }
            write!(out, "{line}")?;
        }
    }
    Ok(())
}

/// Centered bordered popup for the help text.
pub(crate) fn draw_overlay(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> std::io::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 || text.trim().is_empty() {
        return Ok(());
    }

    let max_inner = cols.saturating_sub(6).max(1);
    let lines: Vec<&str> = text.lines().collect();
    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(1)
        .min(max_inner)
        .max(1);
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_w = inner_w + 4;
    let start_col = (cols.saturating_sub(box_w)) / 2 + 1;
    let start_row = (rows.saturating_sub(body_h + 2)) / 2 + 1;

    let horiz = "-".repeat(box_w.saturating_sub(2));
    out.write_all(b"\x1b[0m\x1b[38;2;230;238;250m\x1b[48;2;8;12;22m")?;
    write!(out, "\x1b[{start_row};{start_col}H+{horiz}+")?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        let shown: String = line.chars().take(inner_w).collect();
        write!(out, "\x1b[{row};{start_col}H| {shown:<inner_w$} |")?;
    }
    write!(
        out,
        "\x1b[{};{}H+{}+",
        start_row + body_h + 1,
        start_col,
        horiz
    )?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}

#[inline]
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u16 {
    // Approximate Rec.709 luma in integer math.
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u16
}
