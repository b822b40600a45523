use rand::Rng;

/// Weight a cell keeps of its own value on each diffusion step.
pub const DIFFUSE_SELF: f64 = 0.8;
/// Weight a cell receives from each of its two neighbors on each diffusion step.
pub const DIFFUSE_NEIGHBOR: f64 = 0.1;

/// A circular array of harvestable resource, independent of the tape.
///
/// Cells are addressed modulo the field length. Values never go negative:
/// `harvest` withdraws at most what a cell holds and diffusion is a convex
/// combination of non-negative values.
#[derive(Clone, Debug)]
pub struct ResourceField {
    cells: Vec<f64>,
    /// Reusable scratch: the previous state during `diffuse`.
    scratch: Vec<f64>,
}

impl ResourceField {
    pub fn new(cells: Vec<f64>) -> Self {
        assert!(!cells.is_empty(), "resource field size must be positive");
        let scratch = Vec::with_capacity(cells.len());
        Self { cells, scratch }
    }

    /// A field of `size` cells each holding `value`.
    pub fn uniform(size: usize, value: f64) -> Self {
        Self::new(vec![value; size])
    }

    /// Background noise in `[0, 1)` per cell, plus `size / 10` hotspots that
    /// each add a uniform `[1, 5)` to a random cell.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut cells: Vec<f64> = (0..size).map(|_| rng.r#gen::<f64>()).collect();
        for _ in 0..size / 10 {
            let i = rng.gen_range(0..size);
            cells[i] += rng.gen_range(1.0..5.0);
        }
        Self::new(cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// One diffusion step. Every new value is computed from a full snapshot of
    /// the previous field, so the result does not depend on update order.
    pub fn diffuse(&mut self) {
        let m = self.cells.len();
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.cells);
        let prev = &self.scratch;
        for (i, cell) in self.cells.iter_mut().enumerate() {
            let left = prev[(i + m - 1) % m];
            let right = prev[(i + 1) % m];
            *cell = prev[i] * DIFFUSE_SELF + (left + right) * DIFFUSE_NEIGHBOR;
        }
    }

    /// Remove up to `cap` from the addressed cell and return the amount withdrawn.
    pub fn harvest(&mut self, addr: usize, cap: f64) -> f64 {
        let idx = addr % self.cells.len();
        let amount = self.cells[idx].min(cap.max(0.0)).max(0.0);
        self.cells[idx] = (self.cells[idx] - amount).max(0.0);
        amount
    }

    pub fn sense(&self, addr: usize) -> f64 {
        self.cells[addr % self.cells.len()]
    }
}
