/// Row-major 2D scalar field with the central-difference stencils the
/// phase-field model needs. Boundary rows/columns are left untouched by
/// the stencils (no-flux boundaries for the solver).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2 {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Grid2 {
    pub fn new(width: usize, height: usize, fill: f32) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, dx: f32, dy: f32, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x as f32 * dx, y as f32 * dy));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn fill(&mut self, v: f32) {
        self.data.fill(v);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// d/dx by central differences into `out`; boundary columns stay as-is.
    pub fn diff_x(&self, dx: f32, out: &mut Grid2) {
        debug_assert_eq!((out.width, out.height), (self.width, self.height));
        let inv = 1.0 / (2.0 * dx);
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let v = (self.at(x + 1, y) - self.at(x - 1, y)) * inv;
                out.set(x, y, v);
            }
        }
    }

    /// d/dy by central differences into `out`; boundary rows stay as-is.
    pub fn diff_y(&self, dy: f32, out: &mut Grid2) {
        debug_assert_eq!((out.width, out.height), (self.width, self.height));
        let inv = 1.0 / (2.0 * dy);
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let v = (self.at(x, y + 1) - self.at(x, y - 1)) * inv;
                out.set(x, y, v);
            }
        }
    }

    /// Five-point Laplacian into `out`; boundary stays as-is.
    pub fn laplacian(&self, dx: f32, dy: f32, out: &mut Grid2) {
        debug_assert_eq!((out.width, out.height), (self.width, self.height));
        let inv_dx2 = 1.0 / (dx * dx);
        let inv_dy2 = 1.0 / (dy * dy);
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let c = self.at(x, y);
                let ddx = (self.at(x + 1, y) - 2.0 * c + self.at(x - 1, y)) * inv_dx2;
                let ddy = (self.at(x, y + 1) - 2.0 * c + self.at(x, y - 1)) * inv_dy2;
                out.set(x, y, ddx + ddy);
            }
        }
    }
}
