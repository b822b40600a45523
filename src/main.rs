use anyhow::Result;
use clap::Parser;
use tapelife::config::SimConfig;
use tapelife::entropy::Entropy;
use tapelife::interpreter::{Ancestor, Interpreter, TickStats};
use tapelife::opcode::disassemble;
use tapelife::replication::{CollisionPolicy, MutationRates};
use tapelife::report::{PopulationReport, PopulationReporter};
use tracing::info;

#[derive(Parser)]
#[command(name = "tapelife", about = "Self-replicating programs on a circular instruction tape")]
struct Cli {
    /// Random seed for reproducibility.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 50_000)]
    ticks: u64,

    /// Number of cells on the tape.
    #[arg(long, default_value_t = 2048)]
    tape_size: usize,

    /// Number of cells in the resource field.
    #[arg(long, default_value_t = 2048)]
    resource_size: usize,

    /// Run without a resource field (SENSE and HARVEST become no-ops).
    #[arg(long)]
    no_resources: bool,

    /// Per-instruction point mutation probability.
    #[arg(long, default_value_t = 0.005)]
    p_mutate: f64,

    /// Per-instruction insertion probability.
    #[arg(long, default_value_t = 0.002)]
    p_insert: f64,

    /// Per-instruction deletion probability.
    #[arg(long, default_value_t = 0.002)]
    p_delete: f64,

    /// Collision policy (overwrite, fitness, overlap).
    #[arg(long, default_value = "fitness")]
    policy: String,

    /// Founder organism (arith, forager).
    #[arg(long, default_value = "arith")]
    ancestor: String,

    /// Report every N ticks.
    #[arg(long, default_value_t = 500)]
    report_interval: u64,

    /// Output reports as CSV rows instead of console lines.
    #[arg(long)]
    csv: bool,

    /// Print the dominant genome's disassembly after the run.
    #[arg(long)]
    show_dominant: bool,

    /// Run in benchmark mode: suppress reports, print throughput stats.
    #[arg(long)]
    benchmark: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = SimConfig {
        tape_size: cli.tape_size,
        resource_size: (!cli.no_resources).then_some(cli.resource_size),
        rates: MutationRates {
            p_mutate: cli.p_mutate,
            p_insert: cli.p_insert,
            p_delete: cli.p_delete,
        },
        policy: cli.policy.parse::<CollisionPolicy>()?,
        ..SimConfig::default()
    };
    let ancestor: Ancestor = cli.ancestor.parse()?;
    let reporter = PopulationReporter::new(cli.report_interval)?;

    let mut sim = Interpreter::new(config, cli.seed)?;
    let base = sim.rng.address(sim.tape.len());
    let _ = sim.seed_organism(base, ancestor.genome())?;
    info!(policy = %sim.config.policy, seed = cli.seed, "starting run");

    if cli.benchmark {
        run_benchmark(&mut sim, cli.ticks);
    } else {
        run_simulation(&mut sim, &reporter, cli.ticks, cli.csv, cli.show_dominant);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_simulation(
    sim: &mut Interpreter,
    reporter: &PopulationReporter,
    ticks: u64,
    csv: bool,
    show_dominant: bool,
) {
    if csv {
        println!("{}", PopulationReport::csv_header());
    }
    let mut totals = TickStats::default();

    for t in 0..ticks {
        totals += sim.tick();

        if let Some(report) = reporter.report(t, &sim.tape, &sim.registers) {
            if csv {
                println!("{}", report.csv_row());
            } else {
                println!("{report}");
                if report.lengths_vary() {
                    eprintln!("{}", report.detailed());
                }
            }
        }

        if (t + 1) % 1000 == 0 || t + 1 == ticks {
            eprint!("\rtick {}/{ticks}", t + 1);
        }
    }
    eprintln!();
    info!(
        births = totals.births,
        aborted = totals.aborted,
        stillborn = totals.stillborn,
        evictions = totals.evictions,
        "run finished"
    );

    if show_dominant {
        let report = PopulationReport::collect(sim.tick_count(), &sim.tape, &sim.registers);
        match &report.dominant {
            Some((genome, count)) => {
                eprintln!("dominant genome ({count} copies, {} cells):", genome.len());
                eprint!("{}", disassemble(genome));
            }
            None => eprintln!("no organisms left"),
        }
    }
}

fn run_benchmark(sim: &mut Interpreter, ticks: u64) {
    let start = std::time::Instant::now();
    let totals = sim.run(ticks as usize);
    let elapsed = start.elapsed();

    let ticks_per_sec = ticks as f64 / elapsed.as_secs_f64();
    let cells_per_sec = ticks as f64 * sim.tape.len() as f64 / elapsed.as_secs_f64();
    let copies_per_sec = totals.copies as f64 / elapsed.as_secs_f64();

    eprintln!("Benchmark results:");
    eprintln!("  Ticks:             {ticks}");
    eprintln!("  Tape size:         {}", sim.tape.len());
    eprintln!("  Policy:            {}", sim.config.policy);
    eprintln!("  Births:            {}", totals.births);
    eprintln!("  Elapsed:           {elapsed:.2?}");
    eprintln!("  Ticks/sec:         {ticks_per_sec:.1}");
    eprintln!("  Cells/sec:         {cells_per_sec:.0}");
    eprintln!("  Copies/sec:        {copies_per_sec:.0}");
}
