//! SVD projection workload: thin SVD of a tall matrix, then `U_kᵀ · A`.
//!
//! ```text
//!   A (rows × cols) ──svd──▶ U (rows × cols), Σ, Vᵀ
//!   P = U[:, 0..k]ᵀ · A      (k × cols)
//! ```

use nalgebra::DMatrix;

use crate::error::BenchError;
use crate::workload::{Workload, deterministic_matrix};

pub const SVD_ROWS: usize = 10_000;
pub const SVD_COLS: usize = 200;
/// Number of leading left singular vectors to project onto
pub const SVD_TOP_K: usize = 10;

// Thin U of a tall matrix has SVD_COLS columns; the block must fit inside it
const _: () = assert!(SVD_COLS <= SVD_ROWS && SVD_TOP_K <= SVD_COLS);

#[derive(Debug, Clone)]
pub struct SvdProjectionWorkload {
    name: String,
    rows: usize,
    cols: usize,
    top_k: usize,
}

impl SvdProjectionWorkload {
    /// Dimensions are checked here, once, so `compute` never slices out of bounds.
    pub fn new(rows: usize, cols: usize, top_k: usize) -> Result<Self, BenchError> {
        let available = rows.min(cols);
        if top_k == 0 || top_k > available {
            return Err(BenchError::InvalidProjection {
                k: top_k,
                available,
            });
        }
        Ok(SvdProjectionWorkload {
            name: "svd".to_string(),
            rows,
            cols,
            top_k,
        })
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.top_k)
    }
}

impl Default for SvdProjectionWorkload {
    fn default() -> Self {
        // Checked at compile time by the assertion above
        SvdProjectionWorkload {
            name: "svd".to_string(),
            rows: SVD_ROWS,
            cols: SVD_COLS,
            top_k: SVD_TOP_K,
        }
    }
}

impl Workload for SvdProjectionWorkload {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self) -> Result<f64, BenchError> {
        let a = deterministic_matrix(self.rows, self.cols);
        let projection = project_top_k(&a, self.top_k)?;
        Ok(projection[(0, 0)])
    }
}

/// Project `a` onto its `k` leading left singular vectors.
pub fn project_top_k(a: &DMatrix<f64>, k: usize) -> Result<DMatrix<f64>, BenchError> {
    let available = a.nrows().min(a.ncols());
    if k > available {
        return Err(BenchError::InvalidProjection { k, available });
    }
    let svd = a.clone().svd(true, true);
    let u = svd.u.ok_or(BenchError::MissingFactor("U"))?;
    Ok(u.columns(0, k).transpose() * a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_oversized_block() {
        assert!(matches!(
            SvdProjectionWorkload::new(100, 20, 21),
            Err(BenchError::InvalidProjection { k: 21, available: 20 })
        ));
        assert!(SvdProjectionWorkload::new(100, 20, 0).is_err());
        assert!(SvdProjectionWorkload::new(100, 20, 20).is_ok());
    }

    #[test]
    fn test_projection_shape() {
        let a = deterministic_matrix(50, 8);
        let p = project_top_k(&a, 3).unwrap();
        assert_eq!(p.nrows(), 3);
        assert_eq!(p.ncols(), 8);
    }

    #[test]
    fn test_projection_rows_scale_with_singular_values() {
        // U_kᵀ A = Σ_k V_kᵀ, so row i has norm sigma_i
        let a = DMatrix::from_fn(40, 6, |i, j| ((i * 7 + j * 3) % 11) as f64 + (i == j) as u8 as f64);
        let sigma = a.clone().svd(false, false).singular_values;
        let largest = sigma.max();

        let p = project_top_k(&a, 2).unwrap();
        let row0 = p.row(0).norm();
        assert!((row0 - largest).abs() < 1e-8 * largest.max(1.0), "row0={} sigma0={}", row0, largest);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let w = SvdProjectionWorkload::new(300, 12, 4).unwrap();
        let first = w.compute().unwrap();
        let second = w.compute().unwrap();
        assert_eq!(first, second);
        assert!(first.is_finite());
    }

    #[test]
    fn test_defaults() {
        let w = SvdProjectionWorkload::default();
        assert_eq!(w.dims(), (SVD_ROWS, SVD_COLS, SVD_TOP_K));
        assert_eq!(w.name(), "svd");
    }
}
