//! Sweep runner
//!
//! For each parameter value in domain order: collect the quota, aggregate,
//! persist, advance. Strictly sequential.

use crate::aggregate::{Aggregator, ResultStore, SnapshotFile};
use crate::catalog::SweepDefinition;
use crate::collector::{RetryPolicy, SampleCollector};
use crate::error::SweepError;
use crate::invoker::SimulationInvoker;
use crate::SAMPLE_QUOTA;
use result_format::BenchmarkResult;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    pub quota: usize,
    pub retry: RetryPolicy,
    pub output_dir: PathBuf,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            quota: SAMPLE_QUOTA,
            retry: RetryPolicy::unbounded(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Run a whole sweep, persisting to `store` after every parameter value
pub fn run_sweep<I, S>(
    definition: &SweepDefinition,
    invoker: &mut I,
    store: S,
    options: &SweepOptions,
) -> Result<BenchmarkResult, SweepError>
where
    I: SimulationInvoker,
    S: ResultStore,
{
    let collector = SampleCollector::new(definition, options.quota, options.retry);
    let mut aggregator = Aggregator::new(definition.label.clone(), store);
    let start = Instant::now();

    info!(
        sweep = %definition.output_file,
        points = definition.domain.len(),
        quota = options.quota,
        "starting sweep"
    );

    for &value in &definition.domain {
        let samples = collector.collect(invoker, value)?;
        aggregator.record(value, &samples)?;
    }

    info!(
        sweep = %definition.output_file,
        elapsed_s = start.elapsed().as_secs_f64(),
        "sweep complete"
    );

    let (result, _) = aggregator.into_parts();
    Ok(result)
}

/// Run a sweep into `<output_dir>/<output_file>.json`; returns the file path
pub fn run_to_file<I: SimulationInvoker>(
    definition: &SweepDefinition,
    invoker: &mut I,
    options: &SweepOptions,
) -> Result<PathBuf, SweepError> {
    let path = definition.output_path(&options.output_dir);
    run_sweep(definition, invoker, SnapshotFile::new(&path), options)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MemoryStore;
    use crate::catalog::Validity;
    use crate::command::CommandTemplate;
    use crate::invoker::ReplayInvoker;
    use sim_output::LineIndex;

    fn definition(domain: Vec<u64>) -> SweepDefinition {
        SweepDefinition {
            label: "X".to_string(),
            template: CommandTemplate::new("sim --n={value}"),
            domain,
            line_index: LineIndex::LAST,
            validity: Validity::AcceptAny,
            output_file: "x-benchmark".to_string(),
        }
    }

    fn options(quota: usize) -> SweepOptions {
        SweepOptions {
            quota,
            ..SweepOptions::default()
        }
    }

    #[test]
    fn test_default_options() {
        let opts = SweepOptions::default();
        assert_eq!(opts.quota, 10);
        assert_eq!(opts.retry.max_attempts, None);
        assert!(opts.retry.backoff.is_none());
    }

    #[test]
    fn test_snapshots_grow_by_prefix() {
        let def = definition(vec![8, 2, 4]);
        let mut replay = ReplayInvoker::from_outputs((1..=6).map(|i| vec![format!("X: {i}")]));
        let mut store = MemoryStore::new();

        let result = run_sweep(&def, &mut replay, &mut store, &options(2)).unwrap();

        assert_eq!(store.snapshots.len(), 3);
        for (k, snapshot) in store.snapshots.iter().enumerate() {
            let keys: Vec<u64> = snapshot.parameters().collect();
            assert_eq!(keys, def.domain[..=k]);
        }
        assert_eq!(result.entries(), &[(8, 1.5), (2, 3.5), (4, 5.5)]);
        assert_eq!(
            replay.commands(),
            &["sim --n=8", "sim --n=8", "sim --n=2", "sim --n=2", "sim --n=4", "sim --n=4"]
        );
    }

    #[test]
    fn test_failure_keeps_finished_prefix() {
        let def = definition(vec![2, 4, 8]);
        let mut replay = ReplayInvoker::from_outputs([vec!["X: 1"], vec!["X: 2"]]);
        replay.push_output(["X: 3"]).push_failure("exit status: 1");
        let mut store = MemoryStore::new();

        let err = run_sweep(&def, &mut replay, &mut store, &options(2)).unwrap_err();

        assert!(matches!(err, SweepError::Invocation(_)));
        assert_eq!(store.snapshots.len(), 1);
        assert_eq!(store.latest().unwrap().entries(), &[(2, 1.5)]);
    }
}
