use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::entropy::Entropy;
use crate::registers::{Register, RegisterBank};
use crate::tape::Tape;

/// Per-instruction copy error probabilities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationRates {
    /// Probability an instruction is replaced by a random opcode.
    pub p_mutate: f64,
    /// Probability a random opcode is inserted before an instruction.
    pub p_insert: f64,
    /// Probability an instruction is dropped.
    pub p_delete: f64,
}

impl MutationRates {
    /// Exact copies.
    pub const NONE: MutationRates = MutationRates {
        p_mutate: 0.0,
        p_insert: 0.0,
        p_delete: 0.0,
    };
}

impl Default for MutationRates {
    fn default() -> Self {
        Self {
            p_mutate: 0.005,
            p_insert: 0.002,
            p_delete: 0.002,
        }
    }
}

/// Copy a genome with point mutations, insertions and deletions.
///
/// Each original instruction, in order: with `p_delete` it is dropped.
/// Otherwise with `p_insert` a random opcode is appended first, and then
/// either a random opcode (with `p_mutate`) or the original is appended.
/// The output length is variable.
pub fn mutate<E: Entropy + ?Sized>(genome: &[u8], rates: &MutationRates, rng: &mut E) -> Vec<u8> {
    let mut out = Vec::with_capacity(genome.len() + 2);
    for &instr in genome {
        if rng.chance(rates.p_delete) {
            continue;
        }
        if rng.chance(rates.p_insert) {
            out.push(rng.opcode());
        }
        if rng.chance(rates.p_mutate) {
            out.push(rng.opcode());
        } else {
            out.push(instr);
        }
    }
    out
}

/// How an offspring competes with whatever already lives where it lands.
///
/// The three rules give very different population dynamics; a run picks one
/// up front.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Wipe the organism registered exactly at the target, if any, then write.
    DirectOverwrite,
    /// The offspring takes half the parent's accumulator and only displaces a
    /// self-marked occupant at the target whose accumulator is strictly lower.
    #[default]
    FitnessGated,
    /// Drop the register of every organism whose span intersects the offspring's.
    OverlapEviction,
}

impl CollisionPolicy {
    pub const ALL: [CollisionPolicy; 3] = [
        CollisionPolicy::DirectOverwrite,
        CollisionPolicy::FitnessGated,
        CollisionPolicy::OverlapEviction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CollisionPolicy::DirectOverwrite => "overwrite",
            CollisionPolicy::FitnessGated => "fitness",
            CollisionPolicy::OverlapEviction => "overlap",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CollisionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollisionPolicy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigError::UnknownPolicy(s.to_string()))
    }
}

/// What a single COPY did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The executing register lacks a start or end mark.
    Skipped,
    /// Every instruction was deleted; nothing was written.
    Stillborn,
    /// The fitness gate kept the occupant at `target`.
    Aborted { target: usize },
    /// An offspring of `len` cells was written at `target`, removing
    /// `evicted` organism registers.
    Born {
        target: usize,
        len: usize,
        evicted: usize,
    },
}

/// The COPY instruction: extract, mutate, pick a target, resolve the
/// collision, write.
#[derive(Clone, Copy, Debug, Default)]
pub struct Replicator {
    pub policy: CollisionPolicy,
    pub rates: MutationRates,
}

impl Replicator {
    pub fn new(policy: CollisionPolicy, rates: MutationRates) -> Self {
        Self { policy, rates }
    }

    /// Execute COPY for the register at `addr`.
    pub fn copy<E: Entropy + ?Sized>(
        &self,
        addr: usize,
        tape: &mut Tape,
        registers: &mut RegisterBank,
        rng: &mut E,
    ) -> CopyOutcome {
        let Some((start, end)) = registers.peek(addr).and_then(Register::span) else {
            return CopyOutcome::Skipped;
        };
        let genome = tape.extract(start, end);
        let mut offspring = mutate(&genome, &self.rates, rng);
        if offspring.is_empty() {
            return CopyOutcome::Stillborn;
        }
        // Insertions can grow a genome past the tape; it would overwrite itself.
        offspring.truncate(tape.len());
        let target = rng.address(tape.len());
        self.place(addr, target, &offspring, tape, registers)
    }

    /// Resolve the collision at `target` and write `offspring` there.
    ///
    /// `parent` is the address whose register issued the COPY.
    pub fn place(
        &self,
        parent: usize,
        target: usize,
        offspring: &[u8],
        tape: &mut Tape,
        registers: &mut RegisterBank,
    ) -> CopyOutcome {
        let target = target % tape.len();
        let len = offspring.len().min(tape.len());
        if len == 0 {
            return CopyOutcome::Stillborn;
        }
        let mut evicted = 0;
        let mut offspring_acc = None;

        match self.policy {
            CollisionPolicy::DirectOverwrite => {
                if let Some((s, e)) = registers.peek(target).and_then(Register::span) {
                    tape.clear_span(s, e);
                    registers.clear(target);
                    evicted = 1;
                }
            }
            CollisionPolicy::FitnessGated => {
                let parent_reg = registers.get(parent);
                let parent_acc = parent_reg.acc_or_default();
                let child_acc = (parent_acc / 2.0).floor();
                parent_reg.acc = Some(parent_acc - child_acc);
                offspring_acc = Some(child_acc);

                let occupant = registers
                    .peek(target)
                    .filter(|r| r.start == Some(target))
                    .and_then(|r| Some((r.span()?, r.acc_or_default())));
                if let Some(((s, e), occupant_acc)) = occupant {
                    if occupant_acc >= child_acc {
                        return CopyOutcome::Aborted { target };
                    }
                    tape.clear_span(s, e);
                    registers.clear(target);
                    evicted = 1;
                }
            }
            CollisionPolicy::OverlapEviction => {
                let doomed: Vec<usize> = registers
                    .organisms()
                    .filter(|&(_, s, e)| tape.spans_overlap(s, tape.span_len(s, e), target, len))
                    .map(|(addr, _, _)| addr)
                    .collect();
                for &addr in &doomed {
                    registers.clear(addr);
                }
                evicted = doomed.len();
            }
        }

        tape.write_span(target, &offspring[..len]);
        let end = tape.offset(target, len - 1);
        registers.set(
            target,
            Register {
                acc: offspring_acc,
                ..Register::organism(target, end)
            },
        );
        CopyOutcome::Born {
            target,
            len,
            evicted,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    proptest! {
        #[test]
        fn zero_rates_are_identity(genome in prop::collection::vec(any::<u8>(), 0..64), seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            prop_assert_eq!(mutate(&genome, &MutationRates::NONE, &mut rng), genome);
        }

        #[test]
        fn length_bounded_by_insertions(genome in prop::collection::vec(any::<u8>(), 0..64), seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let rates = MutationRates { p_mutate: 0.1, p_insert: 0.1, p_delete: 0.1 };
            let out = mutate(&genome, &rates, &mut rng);
            prop_assert!(out.len() <= genome.len() * 2);
        }
    }
}
