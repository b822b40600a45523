use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;

use crate::config::ConfigError;
use crate::metrics::{high_order_entropy, occupancy};
use crate::registers::RegisterBank;
use crate::tape::Tape;

/// A read-only summary of the live population after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationReport {
    pub tick: u64,
    /// Registers with both bounds marked.
    pub population: usize,
    /// Distinct extracted genomes.
    pub distinct: usize,
    pub min_len: usize,
    pub max_len: usize,
    pub avg_len: f64,
    /// The most common genome and how many organisms carry it. Ties go to
    /// the genome seen at the lowest address.
    pub dominant: Option<(Vec<u8>, usize)>,
    /// High-order entropy of the whole tape.
    pub hoe: f64,
    /// Fraction of non-empty tape cells.
    pub occupancy: f64,
}

impl PopulationReport {
    /// Snapshot the organisms currently marked in `registers`.
    ///
    /// Genomes are extracted in parallel; results keep ascending register
    /// address order, so the report is deterministic.
    pub fn collect(tick: u64, tape: &Tape, registers: &RegisterBank) -> Self {
        let spans: Vec<(usize, usize)> = registers.organisms().map(|(_, s, e)| (s, e)).collect();
        let genomes: Vec<Vec<u8>> = spans.par_iter().map(|&(s, e)| tape.extract(s, e)).collect();

        let mut counts: HashMap<&[u8], (usize, usize)> = HashMap::new();
        for (i, g) in genomes.iter().enumerate() {
            counts.entry(g.as_slice()).or_insert((0, i)).0 += 1;
        }
        let dominant = counts
            .iter()
            .max_by(|a, b| a.1.0.cmp(&b.1.0).then(b.1.1.cmp(&a.1.1)))
            .map(|(g, &(n, _))| (g.to_vec(), n));

        let lens = genomes.iter().map(Vec::len);
        let min_len = lens.clone().min().unwrap_or(0);
        let max_len = lens.clone().max().unwrap_or(0);
        let avg_len = if genomes.is_empty() {
            0.0
        } else {
            lens.sum::<usize>() as f64 / genomes.len() as f64
        };

        Self {
            tick,
            population: genomes.len(),
            distinct: counts.len(),
            min_len,
            max_len,
            avg_len,
            dominant,
            hoe: high_order_entropy(tape.cells()),
            occupancy: occupancy(tape.cells()),
        }
    }

    pub fn is_extinct(&self) -> bool {
        self.population == 0
    }

    /// True when not every organism has the same length.
    pub fn lengths_vary(&self) -> bool {
        self.min_len != self.max_len
    }

    pub fn csv_header() -> &'static str {
        "tick,pop,distinct,min_len,avg_len,max_len,hoe,occupancy"
    }

    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.3},{},{:.6},{:.4}",
            self.tick,
            self.population,
            self.distinct,
            self.min_len,
            self.avg_len,
            self.max_len,
            self.hoe,
            self.occupancy
        )
    }

    /// The console line plus, when lengths vary, the length spread.
    pub fn detailed(&self) -> String {
        if self.lengths_vary() {
            format!(
                "{self} (len min {} avg {:.1} max {})",
                self.min_len, self.avg_len, self.max_len
            )
        } else {
            self.to_string()
        }
    }
}

/// `tick {t}: pop {n}, distinct {d}`, or `tick {t}: extinction`.
impl fmt::Display for PopulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extinct() {
            write!(f, "tick {}: extinction", self.tick)
        } else {
            write!(f, "tick {}: pop {}, distinct {}", self.tick, self.population, self.distinct)
        }
    }
}

/// Decides which ticks get a report.
#[derive(Clone, Copy, Debug)]
pub struct PopulationReporter {
    interval: u64,
}

impl PopulationReporter {
    pub fn new(interval: u64) -> Result<Self, ConfigError> {
        if interval == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        Ok(Self { interval })
    }

    /// Reports fire on ticks 0, interval, 2 * interval, ...
    pub fn is_due(&self, tick: u64) -> bool {
        tick.is_multiple_of(self.interval)
    }

    pub fn report(
        &self,
        tick: u64,
        tape: &Tape,
        registers: &RegisterBank,
    ) -> Option<PopulationReport> {
        self.is_due(tick)
            .then(|| PopulationReport::collect(tick, tape, registers))
    }
}
