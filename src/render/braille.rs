use crate::render::{begin_paint, draw_overlay, end_paint, luma, write_hud, Frame, Pen, Renderer};
use std::io::Write;

// Braille dot bit for each position in a 2x4 block, row-major.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// One terminal cell shows a 2x4 pixel block as a braille glyph: pixels
/// brighter than the block's mid-luma become raised dots in the averaged
/// "on" color over the averaged "off" color.
pub struct BrailleRenderer {
    pen: Pen,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self { pen: Pen::default() }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let rows = frame.viewport_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if w != cols.saturating_mul(2) || h != rows.saturating_mul(4) {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w * h * 4 {
            return Ok(());
        }

        begin_paint(out, frame.sync_updates)?;
        self.pen.reset();

        for row in 0..rows {
            let base_y = row * 4;
            for col in 0..cols {
                let base_x = col * 2;

                let mut rgb = [(0u8, 0u8, 0u8); 8];
                let mut lum = [0u16; 8];
                for dy in 0..4 {
                    for dx in 0..2 {
                        let i = dy * 2 + dx;
                        let idx = ((base_y + dy) * w + base_x + dx) * 4;
                        let (r, g, b) = (
                            frame.pixels_rgba[idx],
                            frame.pixels_rgba[idx + 1],
                            frame.pixels_rgba[idx + 2],
                        );
                        rgb[i] = (r, g, b);
                        lum[i] = luma(r, g, b);
                    }
                }

                let min_l = *lum.iter().min().unwrap_or(&0);
                let max_l = *lum.iter().max().unwrap_or(&0);
                let thr = (min_l + max_l) / 2;

                let mut bits = 0u8;
                let mut on = ColorSum::default();
                let mut off = ColorSum::default();
                for i in 0..8 {
                    if lum[i] > thr {
                        bits |= DOT_BITS[i];
                        on.add(rgb[i]);
                    } else {
                        off.add(rgb[i]);
                    }
                }

                let (fg, bg, ch) = if bits == 0 {
                    let c = off.mean();
                    (c, c, ' ')
                } else {
                    let fg = on.mean();
                    let bg = if off.count > 0 { off.mean() } else { fg };
                    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                    (fg, bg, ch)
                };

                self.pen.set_fg(out, fg)?;
                self.pen.set_bg(out, bg)?;
                write!(out, "{ch}")?;
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

#[derive(Default)]
struct ColorSum {
    r: u32,
    g: u32,
    b: u32,
    count: u32,
}

impl ColorSum {
    fn add(&mut self, c: (u8, u8, u8)) {
        self.r += c.0 as u32;
        self.g += c.1 as u32;
        self.b += c.2 as u32;
        self.count += 1;
    }

    fn mean(&self) -> (u8, u8, u8) {
        if self.count == 0 {
            return (0, 0, 0);
        }
        (
            (self.r / self.count) as u8,
            (self.g / self.count) as u8,
            (self.b / self.count) as u8,
        )
    }
}
