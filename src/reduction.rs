//! Reduction Verifier - checks the runtime's thread count and atomic reduction
//!
//! One parallel region sums `start..=end` into a shared `AtomicI64`. The
//! elected reporter records how many workers actually took part. Both the
//! observed worker count and the sum are compared against what was asked for.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use crate::console::Console;
use crate::error::BenchError;
use crate::runtime::{ParallelRuntime, RegionContext, ThreadConfig};

// ============================================================
// RANGE
// ============================================================

/// Inclusive summation domain. `start <= end` is enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: i64,
    end: i64,
}

impl Range {
    pub fn new(start: i64, end: i64) -> Result<Self, BenchError> {
        if start > end {
            return Err(BenchError::InvalidRange { start, end });
        }
        Ok(Range { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Arithmetic series `start + ... + end`.
    ///
    /// Computed as `count * |start + end| / 2`, then negated when the
    /// endpoints sum to a negative number. One of `count` and `start + end`
    /// is always even, so the division is exact.
    pub fn closed_form_sum(&self) -> Result<i64, BenchError> {
        let overflow = || BenchError::SumOverflow {
            start: self.start,
            end: self.end,
        };
        let count = self
            .end
            .checked_sub(self.start)
            .and_then(|d| d.checked_add(1))
            .ok_or_else(overflow)?;
        let endpoints = self.start.checked_add(self.end).ok_or_else(overflow)?;
        let magnitude = (count as i128 * endpoints.unsigned_abs() as i128) / 2;
        let signed = if endpoints < 0 { -magnitude } else { magnitude };
        i64::try_from(signed).map_err(|_| overflow())
    }
}

// ============================================================
// VERIFICATION RESULT
// ============================================================

/// Outcome of one verification run. Both checks are always evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationResult {
    pub expected_threads: usize,
    pub observed_threads: usize,
    pub expected_sum: i64,
    pub actual_sum: i64,
}

impl VerificationResult {
    pub fn evaluate(
        expected_threads: usize,
        observed_threads: usize,
        expected_sum: i64,
        actual_sum: i64,
    ) -> Self {
        VerificationResult {
            expected_threads,
            observed_threads,
            expected_sum,
            actual_sum,
        }
    }

    #[inline]
    pub fn threads_match(&self) -> bool {
        self.expected_threads == self.observed_threads
    }

    #[inline]
    pub fn sum_match(&self) -> bool {
        self.expected_sum == self.actual_sum
    }

    pub fn passed(&self) -> bool {
        self.threads_match() && self.sum_match()
    }

    /// Process exit status: 0 when both checks pass, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.passed() { 0 } else { 1 }
    }

    /// Print both check outcomes; neither depends on the other.
    pub fn report(&self, range: &Range, console: &dyn Console) {
        if self.threads_match() {
            console.print(&format!("{} threads were used.", self.expected_threads));
        } else {
            console.print(&format!(
                "Expected {} threads, but {} were used.",
                self.expected_threads, self.observed_threads
            ));
        }

        if self.sum_match() {
            console.print(&format!(
                "The sum of {} through {} is {}",
                range.start(),
                range.end(),
                self.actual_sum
            ));
        } else {
            console.print(&format!(
                "The sum of {} through {} should be {}, but {} was reported!",
                range.start(),
                range.end(),
                self.expected_sum,
                self.actual_sum
            ));
        }
    }
}

// ============================================================
// VERIFIER
// ============================================================

pub struct ReductionVerifier {
    range: Range,
    target: ThreadConfig,
}

impl ReductionVerifier {
    pub fn new(range: Range, target: ThreadConfig) -> Self {
        Self { range, target }
    }

    /// Run the verification region and print its report.
    pub fn run(
        &self,
        runtime: &mut dyn ParallelRuntime,
        console: &dyn Console,
    ) -> Result<VerificationResult, BenchError> {
        if runtime.is_parallel() {
            console.print(&format!(
                "Parallel runtime is enabled ({}).",
                runtime.name()
            ));
        } else {
            console.print("Parallel runtime is not available; running with a single implicit worker.");
        }

        let expected_sum = self.range.closed_form_sum()?;
        runtime.request_threads(self.target);
        let (observed_threads, actual_sum) = parallel_sum(&*runtime, &self.range);

        tracing::info!(
            "Reduction over {}..={}: threads {}/{}, sum {}/{}",
            self.range.start(),
            self.range.end(),
            observed_threads,
            self.target.get(),
            actual_sum,
            expected_sum
        );

        let result = VerificationResult::evaluate(
            self.target.get(),
            observed_threads,
            expected_sum,
            actual_sum,
        );
        result.report(&self.range, console);
        Ok(result)
    }
}

/// Sum `range` in one region with atomic increments.
///
/// Returns `(observed worker count, accumulated sum)`. The accumulator
/// wraps on overflow, as a hardware atomic add does.
pub fn parallel_sum(runtime: &dyn ParallelRuntime, range: &Range) -> (usize, i64) {
    let observed = AtomicUsize::new(0);
    let sum = AtomicI64::new(0);

    runtime.parallel_region(&|ctx: &RegionContext| {
        if ctx.is_leader() {
            observed.store(ctx.num_threads(), Ordering::Relaxed);
        }
        if let Some(chunk) = ctx.partition(range.start(), range.end()) {
            for i in chunk {
                sum.fetch_add(i, Ordering::Relaxed);
            }
        }
    });

    // Region joined: every worker's increments are visible here
    (observed.into_inner(), sum.into_inner())
}
