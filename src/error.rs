use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Closed-form sum of {start}..={end} overflows i64")]
    SumOverflow { start: i64, end: i64 },

    #[error("Thread count must be at least 1")]
    InvalidThreadCount,

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Projection onto {k} singular vectors requested, only {available} available")]
    InvalidProjection { k: usize, available: usize },

    #[error("SVD did not produce the {0} factor")]
    MissingFactor(&'static str),
}
