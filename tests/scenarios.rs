use std::collections::VecDeque;

use tapelife::config::SimConfig;
use tapelife::entropy::Entropy;
use tapelife::interpreter::{Ancestor, Interpreter};
use tapelife::opcode::*;
use tapelife::registers::Register;
use tapelife::replication::{CollisionPolicy, MutationRates};
use tapelife::report::PopulationReport;
use tapelife::resource::ResourceField;

/// Copies exactly; the next COPY targets come from a queue, repeating the last.
struct Scripted {
    targets: VecDeque<usize>,
}

impl Entropy for Scripted {
    fn chance(&mut self, _p: f64) -> bool {
        false
    }

    fn opcode(&mut self) -> u8 {
        NOP
    }

    fn address(&mut self, size: usize) -> usize {
        let target = if self.targets.len() > 1 {
            self.targets.pop_front()
        } else {
            self.targets.front().copied()
        };
        target.unwrap_or(0) % size
    }
}

fn sim(size: usize, policy: CollisionPolicy, targets: &[usize]) -> Interpreter<Scripted> {
    let config = SimConfig {
        tape_size: size,
        resource_size: None,
        rates: MutationRates::NONE,
        policy,
        harvest_cap: 1.0,
    };
    Interpreter::from_parts(
        config,
        None,
        Scripted {
            targets: targets.iter().copied().collect(),
        },
    )
    .unwrap()
}

const GENOME: [u8; 5] = [MARK_START, ADD, MUL, SUB, MARK_END];

#[test]
fn forced_copy_reproduces_genome() {
    for policy in CollisionPolicy::ALL {
        let mut sim = sim(16, policy, &[8]);
        let copy_addr = sim.seed_organism(0, &GENOME).unwrap();
        assert_eq!(copy_addr, 5);

        let stats = sim.tick();

        assert_eq!(stats.births, 1, "{policy}");
        assert_eq!(sim.tape.extract(8, 12), GENOME.to_vec(), "{policy}");
        let child = sim.registers.peek(8).unwrap();
        assert_eq!(child.start, Some(8));
        assert_eq!(child.end, Some(12));
        // The parent is untouched.
        assert_eq!(sim.tape.extract(0, 4), GENOME.to_vec());
        assert_eq!(sim.tape.read(5), COPY);
    }
}

#[test]
fn overlap_eviction_removes_both_overlapping_organisms() {
    let mut sim = sim(64, CollisionPolicy::OverlapEviction, &[22]);
    let _ = sim.seed_organism(0, &GENOME).unwrap();
    // Two organisms sharing cells 24..=27.
    sim.tape.write_span(20, &[MARK_START, DIV, DIV, DIV, DIV, DIV, DIV, MARK_END]);
    sim.tape.write_span(28, &[MARK_START, MUL, MUL, MARK_END]);
    sim.registers.set(20, Register::organism(20, 27));
    sim.registers.set(24, Register::organism(24, 31));

    // Run the COPY alone so later addresses do not re-mark anything.
    let outcome = sim.step(5);

    assert!(outcome.is_some());
    assert!(sim.registers.peek(24).is_none());
    let child = sim.registers.peek(22).unwrap();
    assert_eq!(child.span(), Some((22, 26)));
    let organisms: Vec<_> = sim.registers.organisms().map(|(addr, _, _)| addr).collect();
    // Only the launcher at 5 and the newborn at 22 carry both bounds.
    assert_eq!(organisms, vec![5, 22]);
    assert!(!organisms.contains(&20));
    assert!(!organisms.contains(&24));
    // Only the registers go; evicted bodies outside 22..=26 stay on the tape.
    assert_eq!(sim.tape.extract(22, 26), GENOME.to_vec());
    assert_eq!(sim.tape.extract(20, 21), vec![MARK_START, DIV]);
    assert_eq!(sim.tape.extract(27, 31), vec![MARK_END, MARK_START, MUL, MUL, MARK_END]);
}

#[test]
fn direct_overwrite_replaces_the_occupant() {
    let mut sim = sim(32, CollisionPolicy::DirectOverwrite, &[16]);
    let _ = sim.seed_organism(0, &GENOME).unwrap();
    sim.tape.write_span(16, &[MARK_START, DIV, DIV, DIV, DIV, DIV, MARK_END]);
    sim.registers.set(16, Register::organism(16, 22));

    let _ = sim.step(5);

    assert_eq!(sim.tape.extract(16, 20), GENOME.to_vec());
    assert_eq!(sim.tape.extract(21, 22), vec![NOP, NOP]);
    assert_eq!(sim.registers.peek(16).and_then(Register::span), Some((16, 20)));
}

#[test]
fn fitness_gate_protects_richer_occupant() {
    let mut sim = sim(32, CollisionPolicy::FitnessGated, &[16]);
    let copy_addr = sim.seed_organism(0, &GENOME).unwrap();
    sim.registers.get(copy_addr).acc = Some(4.0);
    sim.tape.write_span(16, &[MARK_START, DIV, MARK_END]);
    sim.registers.set(
        16,
        Register {
            acc: Some(2.0),
            ..Register::organism(16, 18)
        },
    );
    let before = sim.tape.clone();

    let _ = sim.step(copy_addr);

    assert_eq!(sim.tape, before);
    assert_eq!(sim.registers.peek(copy_addr).and_then(|r| r.acc), Some(2.0));
    assert_eq!(sim.registers.peek(16).and_then(|r| r.acc), Some(2.0));
}

#[test]
fn report_after_replication() {
    let mut sim = sim(64, CollisionPolicy::DirectOverwrite, &[20, 40]);
    let _ = sim.seed_organism(0, &GENOME).unwrap();
    let _ = sim.tick();
    let _ = sim.tick();
    let report = PopulationReport::collect(1, &sim.tape, &sim.registers);
    // Launcher plus two children; the launcher carries the same genome.
    assert_eq!(report.to_string(), "tick 1: pop 3, distinct 1");
    assert_eq!(report.dominant, Some((GENOME.to_vec(), 3)));
}

#[test]
fn forager_harvests_from_the_field() {
    let config = SimConfig {
        tape_size: 32,
        rates: MutationRates::NONE,
        policy: CollisionPolicy::FitnessGated,
        ..SimConfig::default()
    };
    let field = ResourceField::uniform(32, 5.0);
    let scripted = Scripted {
        targets: VecDeque::from([16]),
    };
    let mut sim = Interpreter::from_parts(config, Some(field), scripted).unwrap();
    let _ = sim.seed_organism(0, Ancestor::Forager.genome()).unwrap();
    let before = sim.field.as_ref().unwrap().total();

    let _ = sim.run(3);

    let after = sim.field.as_ref().unwrap().total();
    // The child landed on tick 0; later copies abort against it at equal fitness.
    assert_eq!(sim.registers.organisms().count(), 2);
    assert!(after < before);
    // Two organisms with two HARVESTs each, over three ticks, each capped at 1.0.
    assert!(before - after <= 2.0 * 2.0 * 3.0 + 1e-9);
    assert!(sim.registers.peek(2).and_then(|r| r.acc).unwrap() > 0.0);
}

#[test]
fn seeded_simulation_never_panics() {
    for policy in CollisionPolicy::ALL {
        let config = SimConfig {
            tape_size: 128,
            resource_size: Some(64),
            rates: MutationRates {
                p_mutate: 0.2,
                p_insert: 0.1,
                p_delete: 0.1,
            },
            policy,
            harvest_cap: 1.0,
        };
        let mut sim = Interpreter::new(config, 99).unwrap();
        let _ = sim.seed_organism(10, Ancestor::Forager.genome()).unwrap();
        let _ = sim.run(200);
        assert_eq!(sim.tape.len(), 128);
        let field = sim.field.as_ref().unwrap();
        assert!(field.cells().iter().all(|&v| v >= 0.0));
        let _ = PopulationReport::collect(sim.tick_count(), &sim.tape, &sim.registers);
    }
}
