//! Workload Generators - deterministic linear-algebra kernels for the sweep
//!
//! # Modules
//!
//! - [`matmul`] - dense square matrix product
//! - [`svd`] - thin SVD followed by projection onto the top singular vectors
//!
//! Every worker in a trial region calls [`Workload::compute`] on its own
//! freshly built matrices; nothing is shared between workers.

use nalgebra::DMatrix;

use crate::error::BenchError;

pub mod matmul;
pub mod svd;

pub use matmul::{MATMUL_DIM, MatMulWorkload};
pub use svd::{SVD_COLS, SVD_ROWS, SVD_TOP_K, SvdProjectionWorkload};

/// One unit of benchmark work, run by each worker of a trial region.
pub trait Workload: Sync {
    /// Benchmark name used in trial labels
    fn name(&self) -> &str;

    /// Build inputs, run the kernel, return one output element for the sanity print.
    fn compute(&self) -> Result<f64, BenchError>;
}

/// Matrix with `value(i, j) = cols * i + j`.
pub fn deterministic_matrix(rows: usize, cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |i, j| (cols * i + j) as f64)
}
