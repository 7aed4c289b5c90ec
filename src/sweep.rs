//! Scaling Benchmark Driver - power-of-two thread sweep over a workload
//!
//! ```text
//! for threads in 1, 2, 4, .. < bound:
//!     ┌ ScopeTimer("<name>, N tasks, N threads")
//!     │   request N workers (a refusal is logged, the trial still runs)
//!     │   parallel_region: every worker runs the workload,
//!     │                    leader records N and prints "Output .."
//!     └ timer dropped → "<label>: x ms."
//!     "N threads are used."
//! ```
//!
//! Purely observational: each trial prints its own lines and nothing is
//! aggregated across trials.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::console::Console;
use crate::error::BenchError;
use crate::runtime::{ParallelRuntime, RegionContext, ThreadConfig};
use crate::timer::ScopeTimer;
use crate::workload::Workload;

/// Default sweep bound: trials at 1, 2, .., 256 threads
pub const DEFAULT_MAX_THREADS: usize = 512;

/// Thread counts 1, 2, 4, .. strictly below `bound`.
pub fn thread_counts(bound: usize) -> impl Iterator<Item = usize> {
    std::iter::successors(Some(1usize), |&n| n.checked_mul(2)).take_while(move |&n| n < bound)
}

/// Label for one trial, e.g. `"svd, 4 tasks, 4 threads"`.
pub fn trial_label(name: &str, threads: usize) -> String {
    format!("{}, {} tasks, {} threads", name, threads, threads)
}

/// Observations from a single trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialReport {
    pub label: String,
    pub threads_requested: usize,
    pub threads_observed: usize,
    pub elapsed: Duration,
    /// Output element seen by the elected reporter
    pub output: f64,
}

pub struct ScalingBenchmark {
    bound: usize,
}

impl ScalingBenchmark {
    pub fn new(bound: usize) -> Self {
        Self { bound }
    }

    /// Run every trial of the sweep in order.
    pub fn run(
        &self,
        runtime: &mut dyn ParallelRuntime,
        workload: &dyn Workload,
        console: &dyn Console,
    ) -> Result<Vec<TrialReport>, BenchError> {
        tracing::info!(
            "Sweep '{}' on {} runtime, bound {}",
            workload.name(),
            runtime.name(),
            self.bound
        );
        let mut reports = Vec::new();
        for n in thread_counts(self.bound) {
            reports.push(run_trial(runtime, ThreadConfig::new(n)?, workload, console)?);
        }
        Ok(reports)
    }
}

/// One timed trial at a fixed worker count.
///
/// The timer reports exactly once, including when a worker's computation
/// fails and the error is returned.
pub fn run_trial(
    runtime: &mut dyn ParallelRuntime,
    threads: ThreadConfig,
    workload: &dyn Workload,
    console: &dyn Console,
) -> Result<TrialReport, BenchError> {
    let label = trial_label(workload.name(), threads.get());
    let timer = ScopeTimer::start(label.clone(), console);

    runtime.request_threads(threads);

    let observed = AtomicUsize::new(0);
    let output = AtomicU64::new(f64::NAN.to_bits());
    let failure: OnceLock<BenchError> = OnceLock::new();

    runtime.parallel_region(&|ctx: &RegionContext| {
        if ctx.is_leader() {
            observed.store(ctx.num_threads(), Ordering::Relaxed);
        }
        match workload.compute() {
            Ok(value) if ctx.is_leader() => {
                output.store(value.to_bits(), Ordering::Relaxed);
                console.print(&format!("Output {:.6}", value));
            }
            Ok(_) => {}
            Err(e) => {
                // First failure wins; later ones are only logged
                if let Err(e) = failure.set(e) {
                    tracing::warn!("Worker {} also failed: {}", ctx.index(), e);
                }
            }
        }
    });

    let elapsed = timer.elapsed();
    drop(timer);

    if let Some(e) = failure.into_inner() {
        return Err(e);
    }

    let threads_observed = observed.into_inner();
    console.print(&format!("{} threads are used.", threads_observed));
    tracing::info!(
        target: "TRIAL",
        label = %label,
        requested = threads.get(),
        observed = threads_observed,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "trial finished"
    );

    Ok(TrialReport {
        label,
        threads_requested: threads.get(),
        threads_observed,
        elapsed,
        output: f64::from_bits(output.into_inner()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureConsole;
    use crate::runtime::SerialRuntime;

    struct Constant(f64);

    impl Workload for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn compute(&self) -> Result<f64, BenchError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Workload for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn compute(&self) -> Result<f64, BenchError> {
            Err(BenchError::MissingFactor("U"))
        }
    }

    #[test]
    fn test_thread_counts_default_bound() {
        let counts: Vec<usize> = thread_counts(DEFAULT_MAX_THREADS).collect();
        assert_eq!(counts, vec![1, 2, 4, 8, 16, 32, 64, 128, 256]);
    }

    #[test]
    fn test_thread_counts_edge_bounds() {
        assert_eq!(thread_counts(0).count(), 0);
        assert_eq!(thread_counts(1).count(), 0);
        assert_eq!(thread_counts(2).collect::<Vec<_>>(), vec![1]);
        // Non power-of-two bound: ceil(log2(100)) = 7
        assert_eq!(thread_counts(100).count(), 7);
        // Doubling stops before overflow
        assert_eq!(thread_counts(usize::MAX).count(), usize::BITS as usize);
    }

    #[test]
    fn test_trial_label() {
        assert_eq!(trial_label("svd", 4), "svd, 4 tasks, 4 threads");
    }

    #[test]
    fn test_sweep_serial_prints_per_trial() {
        let console = CaptureConsole::new();
        let mut rt = SerialRuntime::new();
        let reports = ScalingBenchmark::new(8)
            .run(&mut rt, &Constant(2.5), &console)
            .unwrap();

        assert_eq!(reports.len(), 3);
        for (report, requested) in reports.iter().zip([1, 2, 4]) {
            assert_eq!(report.threads_requested, requested);
            assert_eq!(report.threads_observed, 1);
            assert_eq!(report.output, 2.5);
            assert_eq!(report.label, trial_label("constant", requested));
        }

        let lines = console.lines();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "Output 2.500000");
        assert!(lines[1].starts_with("constant, 1 tasks, 1 threads: "));
        assert_eq!(lines[2], "1 threads are used.");
        assert_eq!(rt.requested().map(|t| t.get()), Some(4));
    }

    #[test]
    fn test_timer_reports_once_when_workload_fails() {
        let console = CaptureConsole::new();
        let mut rt = SerialRuntime::new();
        let result = run_trial(
            &mut rt,
            ThreadConfig::new(2).unwrap(),
            &Failing,
            &console,
        );

        assert!(matches!(result, Err(BenchError::MissingFactor("U"))));
        assert_eq!(console.count_prefix("failing, 2 tasks, 2 threads: "), 1);
        assert_eq!(console.count_prefix("Output"), 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_sweep_rayon_observes_requested_threads() {
        use crate::runtime::RayonRuntime;

        let console = CaptureConsole::new();
        let mut rt = RayonRuntime::new();
        let reports = ScalingBenchmark::new(16)
            .run(&mut rt, &Constant(1.0), &console)
            .unwrap();

        assert_eq!(reports.len(), 4);
        for report in &reports {
            assert_eq!(report.threads_observed, report.threads_requested);
        }
        // One leader print and one timer report per trial
        assert_eq!(console.count_prefix("Output"), 4);
        assert_eq!(console.count_prefix("constant, "), 4);
    }
}
