use crate::invoker::InvocationError;
use result_format::FormatError;

/// Fatal sweep errors. Parse failures never show up here; they are retried.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("failed to persist results: {0}")]
    Persist(#[from] FormatError),

    #[error(
        "gave up on parameter {value} after {attempts} attempts \
         ({collected}/{quota} valid samples)"
    )]
    AttemptsExhausted {
        value: u64,
        attempts: u32,
        collected: usize,
        quota: usize,
    },
}
