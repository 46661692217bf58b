//! Sample collection
//!
//! Reruns the simulator for one sweep point until the quota of valid
//! samples is met. Parse failures and rejected samples are retried; only an
//! invocation failure (or an exhausted attempt budget) ends the loop early.

use crate::aggregate::SampleSet;
use crate::catalog::SweepDefinition;
use crate::error::SweepError;
use crate::invoker::{InvocationError, SimulationInvoker};
use rand::Rng;
use sim_output::ParseError;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Result of a single simulator run
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Valid(f64),
    Discarded(Discard),
}

/// Why a run did not produce a sample
#[derive(Debug, Clone, PartialEq)]
pub enum Discard {
    Parse(ParseError),
    Rejected(f64),
}

/// Delay between consecutive discarded runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
    pub jitter: bool,
}

impl Backoff {
    /// Exponential delay after `failures` consecutive discards (1-based)
    pub fn delay_with<R: Rng>(&self, failures: u32, rng: &mut R) -> Duration {
        let exp = failures.saturating_sub(1).min(31);
        let delay = self.base.saturating_mul(1u32 << exp).min(self.max);
        if self.jitter && !delay.is_zero() {
            delay.mul_f64(rng.gen::<f64>())
        } else {
            delay
        }
    }

    pub fn delay(&self, failures: u32) -> Duration {
        self.delay_with(failures, &mut rand::thread_rng())
    }
}

/// Retry bounds. The default retries forever without waiting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub backoff: Option<Backoff>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

pub struct SampleCollector<'a> {
    definition: &'a SweepDefinition,
    quota: usize,
    retry: RetryPolicy,
}

impl<'a> SampleCollector<'a> {
    pub fn new(definition: &'a SweepDefinition, quota: usize, retry: RetryPolicy) -> Self {
        debug_assert!(quota > 0, "sample quota must be positive");
        Self {
            definition,
            quota: quota.max(1),
            retry,
        }
    }

    /// Run the simulator once and classify its output
    pub fn attempt<I: SimulationInvoker>(
        &self,
        invoker: &mut I,
        command: &str,
    ) -> Result<SampleOutcome, InvocationError> {
        let lines = invoker.invoke(command)?;
        let outcome = match sim_output::parse_measurement(&lines, self.definition.line_index) {
            Ok(m) if self.definition.validity.accepts(m.value) => SampleOutcome::Valid(m.value),
            Ok(m) => SampleOutcome::Discarded(Discard::Rejected(m.value)),
            Err(e) => SampleOutcome::Discarded(Discard::Parse(e)),
        };
        Ok(outcome)
    }

    /// Collect exactly `quota` valid samples for one parameter value
    pub fn collect<I: SimulationInvoker>(
        &self,
        invoker: &mut I,
        value: u64,
    ) -> Result<SampleSet, SweepError> {
        let command = self.definition.template.expand(value);
        let label = &self.definition.label;

        let mut samples = SampleSet::with_capacity(self.quota);
        let mut attempts: u32 = 0;
        let mut consecutive_discards: u32 = 0;

        while samples.len() < self.quota {
            if let Some(max) = self.retry.max_attempts {
                if attempts >= max {
                    return Err(SweepError::AttemptsExhausted {
                        value,
                        attempts,
                        collected: samples.len(),
                        quota: self.quota,
                    });
                }
            }
            attempts += 1;

            match self.attempt(invoker, &command)? {
                SampleOutcome::Valid(sample) => {
                    consecutive_discards = 0;
                    samples.push(sample);
                    info!(
                        "{}: {}, Result: {} ({}/{})",
                        label,
                        value,
                        sample,
                        samples.len(),
                        self.quota
                    );
                }
                SampleOutcome::Discarded(reason) => {
                    consecutive_discards += 1;
                    debug!(?reason, attempts, "{}: {}, discarded run", label, value);

                    if let Some(backoff) = &self.retry.backoff {
                        let wait = backoff.delay(consecutive_discards);
                        debug!(?wait, "backing off");
                        thread::sleep(wait);
                    }
                }
            }
        }

        Ok(samples)
    }
}
