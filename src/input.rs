//! Pointer-to-simulation coordinate handling. Terminal mouse events carry
//! cell coordinates; a cell maps to a small block of display pixels
//! depending on the renderer, and display pixels map to simulation cells
//! through the compositor's fit scale.

use crate::sim::SimulationHandle;

/// Display-pixel origin of the render surface (the viewport's top-left in
/// display space). Zero in the baseline layout, where the HUD sits below
/// the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceOrigin {
    pub left: f32,
    pub top: f32,
}

/// Map a display-space point to simulation space given the per-axis fit
/// scale. Out-of-range results are returned as-is; clamping is the
/// engine's job.
pub fn display_to_sim(
    px: f32,
    py: f32,
    origin: SurfaceOrigin,
    scale: (f32, f32),
) -> (f32, f32) {
    ((px - origin.left) / scale.0, (py - origin.top) / scale.1)
}

pub struct SeedInputHandler {
    cell_px_w: usize,
    cell_px_h: usize,
    origin: SurfaceOrigin,
}

impl SeedInputHandler {
    /// `cell_px` is the renderer's pixels-per-terminal-cell multiplier.
    pub fn new(cell_px: (usize, usize)) -> Self {
        Self {
            cell_px_w: cell_px.0,
            cell_px_h: cell_px.1,
            origin: SurfaceOrigin::default(),
        }
    }

    /// Forward a pointer-down on a viewport cell as a seed injection. The
    /// cell center is used so wide cells do not bias seeds left/up.
    pub fn pointer_seed(
        &self,
        col: u16,
        row: u16,
        scale: (f32, f32),
        engine: &mut dyn SimulationHandle,
    ) {
        let px = (col as f32 + 0.5) * self.cell_px_w as f32;
        let py = (row as f32 + 0.5) * self.cell_px_h as f32;
        let (sx, sy) = display_to_sim(px, py, self.origin, scale);
        engine.add_seed(sx, sy);
    }

    /// Inject `count` seeds at uniform random simulation coordinates.
    /// Both seeding paths use simulation space; see DESIGN.md.
    pub fn random_seeds(&self, count: usize, engine: &mut dyn SimulationHandle) {
        let (w, h) = (engine.width(), engine.height());
        for _ in 0..count {
            let x = fastrand::usize(..w) as f32;
            let y = fastrand::usize(..h) as f32;
            engine.add_seed(x, y);
        }
    }
}
