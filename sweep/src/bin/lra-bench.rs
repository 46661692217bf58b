//! LRA simulator benchmark driver
//!
//! Runs one sweep against the simulator and persists the per-parameter means
//! as `<sweep>-benchmark.json`, optionally plotting the result.

use clap::{Parser, ValueEnum};
use lra_sweep::{
    init_logging, run_to_file, Backoff, ProcessInvoker, RetryPolicy, SimulatorConfig, SweepKind,
    SweepOptions,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Benchmark {
    #[value(name = "time")]
    Time,
    #[value(name = "failure_rate_speed")]
    FailureRateSpeed,
    #[value(name = "failure_rate_nodes")]
    FailureRateNodes,
}

impl From<Benchmark> for SweepKind {
    fn from(b: Benchmark) -> Self {
        match b {
            Benchmark::Time => SweepKind::Time,
            Benchmark::FailureRateSpeed => SweepKind::FailureRateSpeed,
            Benchmark::FailureRateNodes => SweepKind::FailureRateNodes,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lra-bench")]
#[command(about = "Run benchmarks for lra-simulator")]
struct Args {
    /// Sweep to run
    #[arg(value_enum)]
    benchmark: Benchmark,

    /// Render the result as a line plot next to the JSON file
    #[arg(long)]
    plot: bool,

    /// Write the plot without opening a viewer
    #[arg(long)]
    no_display: bool,

    /// Print the expanded commands and exit
    #[arg(long)]
    list: bool,

    /// Simulator driver executable
    #[arg(long, default_value = "../ns3")]
    simulator: PathBuf,

    /// Fixed argument passed to the driver before the command
    #[arg(long, default_value = "run")]
    driver_arg: String,

    /// Directory for result files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Valid samples averaged per parameter value
    #[arg(long, default_value_t = lra_sweep::SAMPLE_QUOTA as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    quota: u64,

    /// Give up on a parameter value after this many runs (default: never)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: Option<u32>,

    /// Initial delay after a discarded run, doubled on each consecutive discard
    #[arg(long)]
    backoff_ms: Option<u64>,

    /// Upper bound on the backoff delay
    #[arg(long, default_value_t = 5_000)]
    backoff_max_ms: u64,

    /// Randomize each backoff delay within [0, delay]
    #[arg(long)]
    jitter: bool,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn sweep_options(&self) -> SweepOptions {
        let backoff = self.backoff_ms.map(|ms| Backoff {
            base: Duration::from_millis(ms),
            max: Duration::from_millis(self.backoff_max_ms.max(ms)),
            jitter: self.jitter,
        });

        SweepOptions {
            quota: self.quota as usize,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                backoff,
            },
            output_dir: self.output_dir.clone(),
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let kind = SweepKind::from(args.benchmark);
    let definition = kind.definition();

    if args.list {
        for (_, command) in definition.commands() {
            println!("{command}");
        }
        return Ok(());
    }

    let options = args.sweep_options();
    let mut invoker = ProcessInvoker::new(SimulatorConfig {
        program: args.simulator.clone(),
        driver_arg: args.driver_arg.clone(),
    });

    tracing::info!(sweep = %kind, "running benchmark");
    let result_path = run_to_file(&definition, &mut invoker, &options)?;
    tracing::info!(path = %result_path.display(), "results saved");

    if args.plot {
        plot(&result_path, !args.no_display)?;
    }

    Ok(())
}

#[cfg(feature = "plot")]
fn plot(result_path: &std::path::Path, display: bool) -> color_eyre::Result<()> {
    use sweep_plot::{open_in_viewer, Renderer, SvgRenderer};

    let image = SvgRenderer::default().render(result_path)?;
    if display {
        if let Err(e) = open_in_viewer(&image) {
            tracing::warn!("could not open {}: {}", image.display(), e);
        }
    }
    Ok(())
}

#[cfg(not(feature = "plot"))]
fn plot(_result_path: &std::path::Path, _display: bool) -> color_eyre::Result<()> {
    color_eyre::eyre::bail!("built without the `plot` feature")
}
