//! Pixel-buffer to display-surface compositing. The compositor owns the
//! display-sized RGBA surface; each composite copies from the borrowed
//! engine buffer (scaled nearest-neighbor) and fully overwrites the
//! surface, so the last composite wins.

use clap::ValueEnum;
use std::fmt;

/// How a source buffer is scaled onto the surface. Chosen per instance at
/// construction, never per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitMode {
    /// Uniform scale `min(dw/sw, dh/sh)`, anchored top-left; unfilled
    /// space stays background on the bottom/right edges only.
    Aspect,
    /// Independent per-axis scale filling the whole surface.
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeError {
    InvalidBufferLength { expected: usize, got: usize },
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBufferLength { expected, got } => {
                write!(f, "pixel buffer length {got} does not match {expected}")
            }
        }
    }
}

impl std::error::Error for CompositeError {}

/// Display and simulation dimensions, fixed at construction. The
/// simulation side is the engine's authoritative readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub display_width: usize,
    pub display_height: usize,
    pub sim_width: usize,
    pub sim_height: usize,
}

impl SurfaceGeometry {
    /// Per-axis scale factors from simulation space to display space under
    /// the given fit mode.
    pub fn scale(&self, mode: FitMode) -> (f32, f32) {
        let sx = self.display_width as f32 / self.sim_width.max(1) as f32;
        let sy = self.display_height as f32 / self.sim_height.max(1) as f32;
        match mode {
            FitMode::Aspect => {
                let r = sx.min(sy);
                (r, r)
            }
            FitMode::Stretch => (sx, sy),
        }
    }
}

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

pub struct Compositor {
    geometry: SurfaceGeometry,
    mode: FitMode,
    surface: Vec<u8>,
}

impl Compositor {
    pub fn new(geometry: SurfaceGeometry, mode: FitMode) -> Self {
        let mut surface = vec![0; geometry.display_width * geometry.display_height * 4];
        for px in surface.chunks_exact_mut(4) {
            px.copy_from_slice(&BACKGROUND);
        }
        Self {
            geometry,
            mode,
            surface,
        }
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    /// The display-space scale currently applied to source pixels.
    pub fn scale(&self) -> (f32, f32) {
        self.geometry.scale(self.mode)
    }

    /// The display-pixel extent the scaled image occupies, anchored at the
    /// top-left corner.
    pub fn drawn_extent(&self) -> (usize, usize) {
        let (sx, sy) = self.scale();
        let w = ((self.geometry.sim_width as f32 * sx).round() as usize)
            .min(self.geometry.display_width);
        let h = ((self.geometry.sim_height as f32 * sy).round() as usize)
            .min(self.geometry.display_height);
        (w, h)
    }

    /// Draw `buffer` (row-major RGBA8, `sw x sh` simulation pixels) onto
    /// the surface. The whole surface is rewritten; on a length mismatch
    /// nothing is drawn and the previous surface contents remain.
    pub fn composite(&mut self, buffer: &[u8], sw: usize, sh: usize) -> Result<(), CompositeError> {
        let expected = sw * sh * 4;
        if buffer.len() != expected {
            return Err(CompositeError::InvalidBufferLength {
                expected,
                got: buffer.len(),
            });
        }

        let dw = self.geometry.display_width;
        let dh = self.geometry.display_height;
        let (sx, sy) = SurfaceGeometry {
            sim_width: sw,
            sim_height: sh,
            ..self.geometry
        }
        .scale(self.mode);
        let out_w = ((sw as f32 * sx).round() as usize).min(dw);
        let out_h = ((sh as f32 * sy).round() as usize).min(dh);

        for y in 0..dh {
            let row = &mut self.surface[y * dw * 4..(y + 1) * dw * 4];
            if y >= out_h {
                for px in row.chunks_exact_mut(4) {
                    px.copy_from_slice(&BACKGROUND);
                }
                continue;
            }
            let src_y = ((y as f32 / sy) as usize).min(sh - 1);
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                if x >= out_w {
                    px.copy_from_slice(&BACKGROUND);
                    continue;
                }
                let src_x = ((x as f32 / sx) as usize).min(sw - 1);
                let i = (src_y * sw + src_x) * 4;
                px.copy_from_slice(&buffer[i..i + 4]);
            }
        }
        Ok(())
    }

    pub fn surface(&self) -> &[u8] {
        &self.surface
    }
}
