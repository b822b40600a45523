/// Execution state attached to one tape address.
///
/// Registers belong to addresses, not to organisms: when an organism's body
/// is overwritten, a register at its old address may keep stale bounds. That
/// is expected and harmless.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Register {
    /// First address of the marked genome span.
    pub start: Option<usize>,
    /// Last address (inclusive) of the marked genome span.
    pub end: Option<usize>,
    /// Accumulator. Treated as 0 when unset.
    pub acc: Option<f64>,
    /// Last sensed value. Treated as 1 when unset.
    pub val: Option<f64>,
    /// Cached result of the last FIND_EMPTY. Not read by COPY.
    pub empty: Option<usize>,
}

impl Register {
    /// A register marking the span `[start, end]`.
    pub fn organism(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    /// Both bounds, if both are marked.
    #[inline(always)]
    pub fn span(&self) -> Option<(usize, usize)> {
        Some((self.start?, self.end?))
    }

    #[inline(always)]
    pub fn acc_or_default(&self) -> f64 {
        self.acc.unwrap_or(0.0)
    }

    #[inline(always)]
    pub fn val_or_default(&self) -> f64 {
        self.val.unwrap_or(1.0)
    }
}

/// Per-address registers, created lazily on first use.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    slots: Vec<Option<Register>>,
}

impl RegisterBank {
    /// A bank covering `size` addresses, all without a register.
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// The register at `addr`, creating an empty one if absent.
    #[inline(always)]
    pub fn get(&mut self, addr: usize) -> &mut Register {
        let n = self.slots.len();
        self.slots[addr % n].get_or_insert_with(Register::default)
    }

    /// The register at `addr`, if one exists. Never creates.
    #[inline(always)]
    pub fn peek(&self, addr: usize) -> Option<&Register> {
        self.slots[addr % self.slots.len()].as_ref()
    }

    /// Create or replace the register at `addr`.
    pub fn set(&mut self, addr: usize, register: Register) {
        let n = self.slots.len();
        self.slots[addr % n] = Some(register);
    }

    /// Remove the register at `addr` entirely, returning it.
    pub fn clear(&mut self, addr: usize) -> Option<Register> {
        let n = self.slots.len();
        self.slots[addr % n].take()
    }

    /// Number of addresses that currently have a register.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Every register with both bounds marked, as `(address, start, end)`,
    /// in ascending address order.
    pub fn organisms(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.slots.iter().enumerate().filter_map(|(addr, slot)| {
            let (start, end) = slot.as_ref()?.span()?;
            Some((addr, start, end))
        })
    }
}
