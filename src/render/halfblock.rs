use crate::render::{begin_paint, draw_overlay, end_paint, write_hud, Frame, Pen, Renderer};
use std::io::Write;

const HALF_BLOCK: char = '\u{2580}';

/// One terminal cell shows two stacked pixels: the upper half as the
/// foreground of U+2580, the lower half as the background.
pub struct HalfBlockRenderer {
    pen: Pen,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self { pen: Pen::default() }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let rows = frame.viewport_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        // The compositor surface must match this backend's packing.
        if w != cols || h != rows.saturating_mul(2) {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w * h * 4 {
            return Ok(());
        }

        begin_paint(out, frame.sync_updates)?;
        self.pen.reset();

        for row in 0..rows {
            let top_y = row * 2;
            let bot_y = top_y + 1;
            for x in 0..cols {
                let ti = (top_y * w + x) * 4;
                let bi = (bot_y * w + x) * 4;
                let top = (
                    frame.pixels_rgba[ti],
                    frame.pixels_rgba[ti + 1],
                    frame.pixels_rgba[ti + 2],
                );
                let bot = (
                    frame.pixels_rgba[bi],
                    frame.pixels_rgba[bi + 1],
                    frame.pixels_rgba[bi + 2],
                );
                self.pen.set_fg(out, top)?;
                self.pen.set_bg(out, bot)?;
                write!(out, "{HALF_BLOCK}")?;
            }
            out.write_all(b"\r\n")?;
        }

        write_hud(out, frame)?;
        if let Some(text) = frame.overlay {
            draw_overlay(out, frame.term_cols, frame.term_rows, text)?;
        }
        end_paint(out, frame.sync_updates)?;
        Ok(())
    }
}
