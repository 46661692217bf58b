//! LRA Simulator Sweep Driver
//!
//! Drives the external link-reversal simulator across parameter sweeps,
//! resamples each sweep point until a quota of valid measurements is met,
//! and persists the running per-parameter means after every point.

pub mod aggregate;
pub mod catalog;
pub mod collector;
pub mod command;
pub mod error;
pub mod invoker;
pub mod logging;
pub mod runner;

pub use aggregate::{Aggregator, MemoryStore, ResultStore, SampleSet, SnapshotFile};
pub use catalog::{SweepDefinition, SweepKind, Validity};
pub use collector::{Backoff, Discard, RetryPolicy, SampleCollector, SampleOutcome};
pub use command::CommandTemplate;
pub use error::SweepError;
pub use invoker::{InvocationError, ProcessInvoker, ReplayInvoker, SimulationInvoker, SimulatorConfig};
pub use logging::init_logging;
pub use runner::{run_sweep, run_to_file, SweepOptions};

pub use result_format::BenchmarkResult;
pub use sim_output::{LineIndex, ParseError};

/// Valid samples averaged per parameter value
pub const SAMPLE_QUOTA: usize = 10;
