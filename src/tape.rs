use crate::opcode::NOP;

/// The circular instruction memory organisms live on.
///
/// All addressing wraps modulo the tape length, so no read or write can go
/// out of bounds. The length is fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
}

impl Tape {
    /// Create an empty tape (all `NOP`) of `size` cells.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "tape size must be positive");
        Self {
            cells: vec![NOP; size],
        }
    }

    /// Wrap an existing byte buffer as a tape.
    pub fn from_cells(cells: Vec<u8>) -> Self {
        assert!(!cells.is_empty(), "tape size must be positive");
        Self { cells }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Map any integer onto `[0, len)`.
    #[inline(always)]
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.len() as isize) as usize
    }

    /// `wrap(base + k)` without going through signed arithmetic.
    #[inline(always)]
    pub fn offset(&self, base: usize, k: usize) -> usize {
        let n = self.len();
        (base % n + k % n) % n
    }

    #[inline(always)]
    pub fn read(&self, addr: usize) -> u8 {
        self.cells[addr % self.len()]
    }

    #[inline(always)]
    pub fn write(&mut self, addr: usize, op: u8) {
        let n = self.len();
        self.cells[addr % n] = op;
    }

    /// Number of cells in the inclusive wraparound span `[start, end]`.
    #[inline(always)]
    pub fn span_len(&self, start: usize, end: usize) -> usize {
        let n = self.len();
        (end % n + n - start % n) % n + 1
    }

    /// Copy out the inclusive wraparound span `[start, end]`.
    pub fn extract(&self, start: usize, end: usize) -> Vec<u8> {
        let len = self.span_len(start, end);
        (0..len).map(|k| self.read(self.offset(start, k))).collect()
    }

    /// Write `ops` starting at `base`, wrapping past the end of the tape.
    pub fn write_span(&mut self, base: usize, ops: &[u8]) {
        for (k, &op) in ops.iter().enumerate() {
            let addr = self.offset(base, k);
            self.cells[addr] = op;
        }
    }

    /// Reset the inclusive wraparound span `[start, end]` to `NOP`.
    pub fn clear_span(&mut self, start: usize, end: usize) {
        let len = self.span_len(start, end);
        for k in 0..len {
            let addr = self.offset(start, k);
            self.cells[addr] = NOP;
        }
    }

    /// True if `addr` lies in the `len`-cell span beginning at `start`.
    #[inline(always)]
    pub fn span_contains(&self, start: usize, len: usize, addr: usize) -> bool {
        let n = self.len();
        (addr % n + n - start % n) % n < len
    }

    /// True if two wraparound spans share at least one cell.
    ///
    /// Two arcs on a ring intersect iff one of them contains the other's start.
    pub fn spans_overlap(
        &self,
        a_start: usize,
        a_len: usize,
        b_start: usize,
        b_len: usize,
    ) -> bool {
        if a_len == 0 || b_len == 0 {
            return false;
        }
        self.span_contains(a_start, a_len, b_start) || self.span_contains(b_start, b_len, a_start)
    }

    /// Find the lowest base address whose next `length` cells (wrapped) are all `NOP`.
    ///
    /// Candidate bases are considered in ascending order `0..len`. When the
    /// run starting at `base` hits an occupied cell at offset `k`, every base
    /// up to `base + k` would hit the same cell, so the scan resumes at
    /// `base + k + 1`. The answer is the same as the exhaustive scan.
    pub fn find_empty_region(&self, length: usize) -> Option<usize> {
        let n = self.len();
        if length > n {
            return None;
        }
        let mut base = 0;
        'bases: while base < n {
            for k in 0..length {
                if self.cells[(base + k) % n] != NOP {
                    base += k + 1;
                    continue 'bases;
                }
            }
            return Some(base);
        }
        None
    }
}
