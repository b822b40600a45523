use rand::Rng;

use crate::opcode::MAX_OP;

/// The random decisions the simulation makes.
///
/// Every `rand::Rng` is an `Entropy`, so a seeded `SmallRng` gives
/// reproducible runs. Tests can implement this directly to force outcomes
/// such as a specific COPY target.
pub trait Entropy {
    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// A uniformly random opcode in `0..=MAX_OP`.
    fn opcode(&mut self) -> u8;

    /// A uniformly random address in `0..size`.
    fn address(&mut self, size: usize) -> usize;
}

impl<R: Rng + ?Sized> Entropy for R {
    #[inline(always)]
    fn chance(&mut self, p: f64) -> bool {
        // One draw per decision even when `p` is 0 or 1, so that changing a
        // rate does not shift the rest of the random stream.
        self.r#gen::<f64>() < p
    }

    #[inline(always)]
    fn opcode(&mut self) -> u8 {
        self.gen_range(0..=MAX_OP)
    }

    #[inline(always)]
    fn address(&mut self, size: usize) -> usize {
        self.gen_range(0..size)
    }
}
