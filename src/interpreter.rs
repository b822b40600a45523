use std::ops::AddAssign;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace};

use crate::config::{ConfigError, SimConfig};
use crate::entropy::Entropy;
use crate::opcode::*;
use crate::registers::{Register, RegisterBank};
use crate::replication::{CopyOutcome, Replicator};
use crate::resource::ResourceField;
use crate::tape::Tape;

/// Built-in founder organisms. The seeded body is the genome followed by COPY.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ancestor {
    /// Pure arithmetic body; never touches the resource field.
    #[default]
    Arith,
    /// Senses and harvests twice under its own body. Harvested amounts land in
    /// the registers at the HARVEST cells, not in the COPY register.
    Forager,
}

impl Ancestor {
    pub fn genome(self) -> &'static [u8] {
        match self {
            Ancestor::Arith => &[MARK_START, ADD, MUL, SUB, DIV, MARK_END],
            Ancestor::Forager => &[MARK_START, SENSE, HARVEST, SENSE, HARVEST, MARK_END],
        }
    }
}

impl FromStr for Ancestor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arith" => Ok(Ancestor::Arith),
            "forager" => Ok(Ancestor::Forager),
            other => Err(ConfigError::UnknownAncestor(other.to_string())),
        }
    }
}

/// Counts of what the COPY instructions did during one or more ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// COPY instructions executed, including skipped ones.
    pub copies: usize,
    pub births: usize,
    pub aborted: usize,
    pub stillborn: usize,
    /// Organism registers removed by collisions.
    pub evictions: usize,
}

impl TickStats {
    pub fn record(&mut self, outcome: CopyOutcome) {
        self.copies += 1;
        match outcome {
            CopyOutcome::Skipped => {}
            CopyOutcome::Stillborn => self.stillborn += 1,
            CopyOutcome::Aborted { .. } => self.aborted += 1,
            CopyOutcome::Born { evicted, .. } => {
                self.births += 1;
                self.evictions += evicted;
            }
        }
    }
}

impl AddAssign for TickStats {
    fn add_assign(&mut self, rhs: Self) {
        self.copies += rhs.copies;
        self.births += rhs.births;
        self.aborted += rhs.aborted;
        self.stillborn += rhs.stillborn;
        self.evictions += rhs.evictions;
    }
}

/// The simulation: a tape, its registers, an optional resource field, and
/// the random source every stochastic decision draws from.
///
/// One tick diffuses the field (if any) and then executes every address once,
/// in ascending order. Changes made by a COPY at address `k` are seen by
/// addresses after `k` in the same tick; nothing is double-buffered.
pub struct Interpreter<R = SmallRng> {
    pub tape: Tape,
    pub registers: RegisterBank,
    pub field: Option<ResourceField>,
    pub replicator: Replicator,
    pub config: SimConfig,
    pub rng: R,
    tick: u64,
}

impl Interpreter<SmallRng> {
    /// Create an empty simulation. The resource field, if configured, is
    /// randomly initialized from the same seeded generator.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let field = config
            .resource_size
            .map(|size| ResourceField::random(size, &mut rng));
        Self::from_parts(config, field, rng)
    }
}

impl<R: Entropy> Interpreter<R> {
    /// Create an empty simulation around an explicit field and random source.
    ///
    /// The field's presence and size take precedence over `config.resource_size`.
    pub fn from_parts(
        mut config: SimConfig,
        field: Option<ResourceField>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.resource_size = field.as_ref().map(ResourceField::len);
        config.validate()?;
        Ok(Self {
            tape: Tape::new(config.tape_size),
            registers: RegisterBank::new(config.tape_size),
            field,
            replicator: Replicator::new(config.policy, config.rates),
            config,
            rng,
            tick: 0,
        })
    }

    /// Number of ticks completed.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Write `genome` at `base` followed by a COPY, and give the COPY's
    /// register the genome's bounds. Returns the COPY address.
    pub fn seed_organism(&mut self, base: usize, genome: &[u8]) -> Result<usize, ConfigError> {
        let n = self.tape.len();
        if genome.is_empty() || genome.len() + 1 > n {
            return Err(ConfigError::GenomeTooLong {
                len: genome.len() + 1,
                tape_size: n,
            });
        }
        let start = base % n;
        let end = self.tape.offset(start, genome.len() - 1);
        let copy_addr = self.tape.offset(start, genome.len());
        self.tape.write_span(start, genome);
        self.tape.write(copy_addr, COPY);
        self.registers.set(copy_addr, Register::organism(start, end));
        info!(start, end, copy_addr, "seeded organism");
        Ok(copy_addr)
    }

    /// Execute the instruction at `addr`. Returns the outcome if it was a COPY.
    pub fn step(&mut self, addr: usize) -> Option<CopyOutcome> {
        let addr = addr % self.tape.len();
        let op = Op::decode(self.tape.read(addr));
        let reg = self.registers.get(addr);
        match op {
            Op::Nop | Op::Inert(_) => {}
            Op::MarkStart => reg.start = Some(addr),
            Op::MarkEnd => reg.end = Some(addr),
            Op::Copy => {
                return Some(self.replicator.copy(
                    addr,
                    &mut self.tape,
                    &mut self.registers,
                    &mut self.rng,
                ));
            }
            Op::FindEmpty => {
                if let Some((start, end)) = reg.span() {
                    let len = self.tape.span_len(start, end);
                    reg.empty = self.tape.find_empty_region(len);
                }
            }
            Op::Sense => {
                if let Some(field) = &self.field {
                    reg.val = Some(field.sense(addr));
                }
            }
            Op::Harvest => {
                if let Some(field) = &mut self.field {
                    let amount = field.harvest(addr, self.config.harvest_cap);
                    reg.acc = Some(reg.acc_or_default() + amount);
                }
            }
            Op::Add => reg.acc = Some(reg.acc_or_default() + reg.val_or_default()),
            Op::Sub => reg.acc = Some(reg.acc_or_default() - reg.val_or_default()),
            Op::Mul => reg.acc = Some(reg.acc_or_default() * reg.val_or_default()),
            Op::Div => {
                let val = reg.val_or_default();
                if val != 0.0 {
                    reg.acc = Some((reg.acc_or_default() / val).trunc());
                }
            }
        }
        None
    }

    /// Run one tick: diffuse, then execute addresses `0..N` in order.
    pub fn tick(&mut self) -> TickStats {
        if let Some(field) = &mut self.field {
            field.diffuse();
        }
        let mut stats = TickStats::default();
        for addr in 0..self.tape.len() {
            if let Some(outcome) = self.step(addr) {
                trace!(tick = self.tick, addr, ?outcome, "copy");
                stats.record(outcome);
            }
        }
        if stats.evictions > 0 || stats.aborted > 0 {
            debug!(
                tick = self.tick,
                births = stats.births,
                aborted = stats.aborted,
                evictions = stats.evictions,
                "collisions resolved"
            );
        }
        self.tick += 1;
        stats
    }

    /// Run `ticks` ticks and return the summed stats.
    pub fn run(&mut self, ticks: usize) -> TickStats {
        let mut total = TickStats::default();
        for _ in 0..ticks {
            total += self.tick();
        }
        total
    }
}
