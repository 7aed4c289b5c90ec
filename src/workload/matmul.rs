//! Dense multiply workload: `A * B` with `A = B`, `a(i, j) = dim*i + j`.

use crate::error::BenchError;
use crate::workload::{Workload, deterministic_matrix};

/// Side length of both square operands
pub const MATMUL_DIM: usize = 2000;

#[derive(Debug, Clone)]
pub struct MatMulWorkload {
    name: String,
    dim: usize,
}

impl MatMulWorkload {
    pub fn new(dim: usize) -> Self {
        MatMulWorkload {
            name: "simple task".to_string(),
            dim,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl Default for MatMulWorkload {
    fn default() -> Self {
        Self::new(MATMUL_DIM)
    }
}

impl Workload for MatMulWorkload {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self) -> Result<f64, BenchError> {
        if self.dim == 0 {
            return Ok(0.0);
        }
        let a = deterministic_matrix(self.dim, self.dim);
        let b = deterministic_matrix(self.dim, self.dim);
        let d = &a * &b;
        Ok(d[(0, 0)])
    }
}

/// Closed form of the product's top-left element.
///
/// Row 0 of `A` is `0, 1, .., dim-1`; column 0 of `B` is `0, dim, .., dim*(dim-1)`.
/// Their dot product is `dim * sum(k^2)` for `k < dim`. Every partial sum is an
/// integer below 2^53 for the default size, so the f64 product is exact.
pub fn expected_top_left(dim: usize) -> f64 {
    if dim == 0 {
        return 0.0;
    }
    let n = (dim - 1) as u128;
    let squares = n * (n + 1) * (2 * n + 1) / 6;
    (dim as u128 * squares) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_form_default_size() {
        assert_eq!(expected_top_left(MATMUL_DIM), 5_329_334_000_000.0);
        assert_eq!(expected_top_left(1), 0.0);
        // dim 2: [0 1; 2 3]^2 -> (0,0) = 0*0 + 1*2
        assert_eq!(expected_top_left(2), 2.0);
    }

    #[test]
    fn test_product_matches_closed_form() {
        for dim in [1, 2, 7, 64, 200] {
            let w = MatMulWorkload::new(dim);
            assert_eq!(w.compute().unwrap(), expected_top_left(dim), "dim={}", dim);
        }
    }

    #[test]
    fn test_deterministic_across_calls() {
        let w = MatMulWorkload::new(33);
        assert_eq!(w.compute().unwrap(), w.compute().unwrap());
    }

    #[test]
    fn test_defaults() {
        let w = MatMulWorkload::default();
        assert_eq!(w.dim(), MATMUL_DIM);
        assert_eq!(w.name(), "simple task");
    }
}
