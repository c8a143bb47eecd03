//! Bundled simulation engine: an anisotropic phase-field model of
//! dendritic solidification (Kobayashi-style) on a 2D grid.
//!
//! The viewer core drives this strictly through [`SimulationHandle`]; the
//! numerical method below is an implementation detail behind that seam.

mod grid;

pub use grid::Grid2;

use std::f32::consts::PI;
use std::fmt;

// Discretization and model constants. The user-tunable pair (kappa, delta)
// lives on the struct; everything else is fixed for the explicit scheme to
// stay stable (dt/dx^2 well under 0.25 for both fields).
const DX: f32 = 0.03;
const DY: f32 = 0.03;
const DT: f32 = 1.0e-4;
const TAU: f32 = 3.0e-4;
const EPS_BAR: f32 = 0.01;
const ALPHA: f32 = 0.9;
const GAMMA: f32 = 10.0;
const T_EQ: f32 = 1.0;
const ANISO_MODES: f32 = 6.0;
const THETA_0: f32 = 0.2;
const NOISE_AMP: f32 = 0.01;
const SEED_RADIUS: f32 = 2.0;

/// Requested grid sizes below this are clamped up; readbacks are
/// authoritative.
pub const MIN_GRID: usize = 16;

/// The narrow interface the viewer core consumes. The engine owns the
/// RGBA storage returned by the buffer accessors and reuses it on the next
/// call, so a fetched buffer is only valid until the engine is touched
/// again — callers copy what they need within one composite.
pub trait SimulationHandle {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_kappa(&mut self, kappa: f32);
    fn set_delta(&mut self, delta: f32);
    /// Advance the simulation by exactly one tick.
    fn step(&mut self) -> Result<(), EngineError>;
    /// Reinitialize to the undercooled melt state.
    fn reset(&mut self);
    /// Inject a solid seed at the given grid coordinate. Out-of-range
    /// coordinates are clamped to the grid, never dropped.
    fn add_seed(&mut self, x: f32, y: f32);
    fn phi_rgba(&mut self) -> &[u8];
    fn temperature_rgba(&mut self) -> &[u8];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The explicit scheme produced a non-finite field value. The fields
    /// are left as they were before the failing tick.
    NumericalBlowUp { tick: u64 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericalBlowUp { tick } => {
                write!(f, "numerical blow-up at tick {tick}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Phase field `phi` (0 = melt, 1 = solid) and dimensionless temperature
/// `temp` (0 = undercooled, 1 = equilibrium), stepped by explicit Euler
/// with six-fold interface anisotropy.
pub struct Simulation {
    width: usize,
    height: usize,
    kappa: f32,
    delta: f32,
    tick: u64,
    phi: Grid2,
    temp: Grid2,
    scratch: Scratch,
    rgba: Vec<u8>,
}

/// Work grids reused every tick. Stencil outputs only ever write the
/// interior, so the zero-initialized boundaries stay zero for the lifetime
/// of the simulation.
struct Scratch {
    grad_x: Grid2,
    grad_y: Grid2,
    rot_x: Grid2,
    rot_y: Grid2,
    dif_x: Grid2,
    dif_y: Grid2,
    term_rot_x: Grid2,
    term_rot_y: Grid2,
    term_div_x: Grid2,
    term_div_y: Grid2,
    lap_temp: Grid2,
    phi_next: Grid2,
    temp_next: Grid2,
}

impl Scratch {
    fn new(width: usize, height: usize) -> Self {
        let zero = || Grid2::new(width, height, 0.0);
        Self {
            grad_x: zero(),
            grad_y: zero(),
            rot_x: zero(),
            rot_y: zero(),
            dif_x: zero(),
            dif_y: zero(),
            term_rot_x: zero(),
            term_rot_y: zero(),
            term_div_x: zero(),
            term_div_y: zero(),
            lap_temp: zero(),
            phi_next: zero(),
            temp_next: zero(),
        }
    }
}

impl Simulation {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(MIN_GRID);
        let height = height.max(MIN_GRID);
        Self {
            width,
            height,
            kappa: 1.6,
            delta: 0.02,
            tick: 0,
            phi: Grid2::new(width, height, 0.0),
            temp: Grid2::new(width, height, 0.0),
            scratch: Scratch::new(width, height),
            rgba: vec![0; width * height * 4],
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn kappa(&self) -> f32 {
        self.kappa
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn phi_at(&self, x: usize, y: usize) -> f32 {
        self.phi.at(x, y)
    }

    pub fn temperature_at(&self, x: usize, y: usize) -> f32 {
        self.temp.at(x, y)
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        let s = &mut self.scratch;

        self.phi.diff_x(DX, &mut s.grad_x);
        self.phi.diff_y(DY, &mut s.grad_y);

        // Anisotropic interface energy: eps depends on the local interface
        // orientation theta = atan2(phi_y, phi_x).
        let n = self.width * self.height;
        for i in 0..n {
            let gx = s.grad_x.as_slice()[i];
            let gy = s.grad_y.as_slice()[i];
            let angle = ANISO_MODES * (gy.atan2(gx) - THETA_0);
            let eps = EPS_BAR * (1.0 + self.delta * angle.cos());
            let deps = -EPS_BAR * self.delta * ANISO_MODES * angle.sin();
            s.rot_x.as_mut_slice()[i] = eps * deps * gy;
            s.rot_y.as_mut_slice()[i] = eps * deps * gx;
            s.dif_x.as_mut_slice()[i] = eps * eps * gx;
            s.dif_y.as_mut_slice()[i] = eps * eps * gy;
        }

        s.rot_x.diff_x(DX, &mut s.term_rot_x);
        s.rot_y.diff_y(DY, &mut s.term_rot_y);
        s.dif_x.diff_x(DX, &mut s.term_div_x);
        s.dif_y.diff_y(DY, &mut s.term_div_y);
        self.temp.laplacian(DX, DY, &mut s.lap_temp);

        for i in 0..n {
            let p = self.phi.as_slice()[i];
            let t = self.temp.as_slice()[i];

            // Driving force from undercooling, plus a small interface
            // noise term that seeds side-branching.
            let m = (ALPHA / PI) * (GAMMA * (T_EQ - t)).atan();
            let chi = fastrand::f32() - 0.5;
            let react = p * (1.0 - p) * (p - 0.5 + m + NOISE_AMP * chi);

            let dphi = (DT / TAU)
                * (-s.term_rot_x.as_slice()[i]
                    + s.term_rot_y.as_slice()[i]
                    + s.term_div_x.as_slice()[i]
                    + s.term_div_y.as_slice()[i]
                    + react);

            let p_next = (p + dphi).clamp(0.0, 1.0);
            // Latent heat release follows the actual phase change.
            let t_next = t + DT * s.lap_temp.as_slice()[i] + self.kappa * (p_next - p);

            s.phi_next.as_mut_slice()[i] = p_next;
            s.temp_next.as_mut_slice()[i] = t_next;
        }

        let finite = s
            .phi_next
            .as_slice()
            .iter()
            .chain(s.temp_next.as_slice().iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(EngineError::NumericalBlowUp { tick: self.tick });
        }

        std::mem::swap(&mut self.phi, &mut s.phi_next);
        std::mem::swap(&mut self.temp, &mut s.temp_next);
        self.tick += 1;
        Ok(())
    }

    fn render_field(&mut self, which: RenderField) -> &[u8] {
        let src = match which {
            RenderField::Phi => self.phi.as_slice(),
            RenderField::Temperature => self.temp.as_slice(),
        };
        for (px, &v) in self.rgba.chunks_exact_mut(4).zip(src.iter()) {
            let (r, g, b) = match which {
                RenderField::Phi => phi_color(v),
                RenderField::Temperature => temperature_color(v),
            };
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = 255;
        }
        &self.rgba
    }
}

#[derive(Clone, Copy)]
enum RenderField {
    Phi,
    Temperature,
}

impl SimulationHandle for Simulation {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn set_kappa(&mut self, kappa: f32) {
        self.kappa = kappa;
    }

    fn set_delta(&mut self, delta: f32) {
        self.delta = delta;
    }

    fn step(&mut self) -> Result<(), EngineError> {
        self.advance()
    }

    fn reset(&mut self) {
        self.phi.fill(0.0);
        self.temp.fill(0.0);
        self.tick = 0;
    }

    fn add_seed(&mut self, x: f32, y: f32) {
        let cx = x.round().clamp(0.0, (self.width - 1) as f32) as isize;
        let cy = y.round().clamp(0.0, (self.height - 1) as f32) as isize;
        let r = SEED_RADIUS.ceil() as isize;
        let r2 = SEED_RADIUS * SEED_RADIUS;

        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f32 > r2 {
                    continue;
                }
                let px = cx + dx;
                let py = cy + dy;
                if px < 0 || py < 0 || px >= self.width as isize || py >= self.height as isize {
                    continue;
                }
                self.phi.set(px as usize, py as usize, 1.0);
            }
        }
    }

    fn phi_rgba(&mut self) -> &[u8] {
        self.render_field(RenderField::Phi)
    }

    fn temperature_rgba(&mut self) -> &[u8] {
        self.render_field(RenderField::Temperature)
    }
}

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_color(a: (f32, f32, f32), b: (f32, f32, f32), t: f32) -> (f32, f32, f32) {
    (lerp(a.0, b.0, t), lerp(a.1, b.1, t), lerp(a.2, b.2, t))
}

fn tri_gradient(t: f32, c0: (f32, f32, f32), c1: (f32, f32, f32), c2: (f32, f32, f32)) -> (f32, f32, f32) {
    let tt = clamp01(t);
    if tt <= 0.5 {
        lerp_color(c0, c1, tt * 2.0)
    } else {
        lerp_color(c1, c2, (tt - 0.5) * 2.0)
    }
}

fn to_rgb_u8(c: (f32, f32, f32)) -> (u8, u8, u8) {
    (
        (clamp01(c.0) * 255.0).round() as u8,
        (clamp01(c.1) * 255.0).round() as u8,
        (clamp01(c.2) * 255.0).round() as u8,
    )
}

/// Melt fades into ice: near-black deep blue through steel blue to white.
fn phi_color(p: f32) -> (u8, u8, u8) {
    let c = tri_gradient(
        clamp01(p),
        (0.02, 0.03, 0.10),
        (0.25, 0.45, 0.75),
        (0.93, 0.97, 1.0),
    );
    to_rgb_u8(c)
}

/// Undercooled blue through ember to pale yellow at and above equilibrium.
fn temperature_color(t: f32) -> (u8, u8, u8) {
    let x = clamp01((t + 0.25) / 1.5);
    let c = tri_gradient(x, (0.04, 0.08, 0.30), (0.72, 0.24, 0.10), (1.0, 0.92, 0.60));
    to_rgb_u8(c)
}
