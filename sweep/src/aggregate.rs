//! Aggregation and persistence
//!
//! Each finished parameter value is reduced to a mean, added to the running
//! [`BenchmarkResult`], and the whole mapping is handed to a [`ResultStore`].

use crate::error::SweepError;
use result_format::{BenchmarkResult, FormatError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Valid samples collected for one parameter value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    values: Vec<f64>,
}

impl SampleSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: f64) {
        self.values.push(sample);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean (NaN when empty)
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

impl FromIterator<f64> for SampleSet {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Durable destination for result snapshots
pub trait ResultStore {
    /// Replace whatever was stored before with `result`
    fn persist(&mut self, result: &BenchmarkResult) -> Result<(), FormatError>;
}

impl<T: ResultStore + ?Sized> ResultStore for &mut T {
    fn persist(&mut self, result: &BenchmarkResult) -> Result<(), FormatError> {
        (**self).persist(result)
    }
}

/// JSON file rewritten on every snapshot
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for SnapshotFile {
    fn persist(&mut self, result: &BenchmarkResult) -> Result<(), FormatError> {
        result.write_snapshot(&self.path)?;
        debug!(path = %self.path.display(), entries = result.len(), "snapshot written");
        Ok(())
    }
}

/// Keeps every snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub snapshots: Vec<BenchmarkResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&BenchmarkResult> {
        self.snapshots.last()
    }
}

impl ResultStore for MemoryStore {
    fn persist(&mut self, result: &BenchmarkResult) -> Result<(), FormatError> {
        self.snapshots.push(result.clone());
        Ok(())
    }
}

/// Running result for one sweep plus its store
pub struct Aggregator<S: ResultStore> {
    label: String,
    result: BenchmarkResult,
    store: S,
}

impl<S: ResultStore> Aggregator<S> {
    /// Always starts empty; a previous file is never read back
    pub fn new(label: impl Into<String>, store: S) -> Self {
        Self {
            label: label.into(),
            result: BenchmarkResult::new(),
            store,
        }
    }

    /// Finalize one parameter value and persist the full mapping
    pub fn record(&mut self, value: u64, samples: &SampleSet) -> Result<f64, SweepError> {
        let mean = samples.mean();
        self.result.insert(value, mean);
        info!("{}: {}, Avg result: {}", self.label, value, mean);

        self.store.persist(&self.result)?;
        Ok(mean)
    }

    pub fn result(&self) -> &BenchmarkResult {
        &self.result
    }

    pub fn into_parts(self) -> (BenchmarkResult, S) {
        (self.result, self.store)
    }
}
