//! Parallel Runtime - fork-join regions over a configurable worker count
//!
//! The harness only needs two primitives from a parallel runtime:
//!
//! - **configure**: request N workers for the next region
//! - **parallel_region**: run a body once on every worker, join at the end
//!
//! ```text
//!            configure(N)          parallel_region(body)
//! caller ──────────────────▶ ┌──────────────────────────────┐
//!                            │ worker 0 (leader) ─ body(ctx) │
//!                            │ worker 1          ─ body(ctx) │ ──▶ join, caller resumes
//!                            │ ...                           │
//!                            │ worker N-1        ─ body(ctx) │
//!                            └──────────────────────────────┘
//! ```
//!
//! `configure` takes `&mut self` and `parallel_region` takes `&self`, so the
//! worker count can never change while a region is running.

use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

use crate::error::BenchError;

/// True when the crate was built with the `parallel` feature.
pub const PARALLEL_SUPPORTED: bool = cfg!(feature = "parallel");

// ============================================================
// THREAD CONFIG
// ============================================================

/// Requested worker count for a single region activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadConfig(NonZeroUsize);

impl ThreadConfig {
    pub fn new(threads: usize) -> Result<Self, BenchError> {
        NonZeroUsize::new(threads)
            .map(ThreadConfig)
            .ok_or(BenchError::InvalidThreadCount)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

// ============================================================
// REGION CONTEXT
// ============================================================

/// What a worker knows about itself inside a parallel region.
#[derive(Debug, Clone, Copy)]
pub struct RegionContext {
    index: usize,
    num_threads: usize,
}

impl RegionContext {
    pub fn new(index: usize, num_threads: usize) -> Self {
        Self { index, num_threads }
    }

    /// Worker rank, `0..num_threads`
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of workers participating in this region
    #[inline]
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// The elected reporter: exactly one worker per region (rank 0).
    #[inline]
    pub fn is_leader(&self) -> bool {
        self.index == 0
    }

    /// Static block partition of `start..=end` for this worker.
    ///
    /// Chunks are contiguous, cover the range exactly once, and differ in
    /// length by at most one chunk tail. Returns `None` when the worker has
    /// nothing to do (more workers than elements).
    pub fn partition(&self, start: i64, end: i64) -> Option<RangeInclusive<i64>> {
        if start > end || self.num_threads == 0 {
            return None;
        }
        let len = end as i128 - start as i128 + 1;
        let workers = self.num_threads as i128;
        let chunk = (len + workers - 1) / workers;
        let lo = start as i128 + self.index as i128 * chunk;
        if lo > end as i128 {
            return None;
        }
        let hi = (lo + chunk - 1).min(end as i128);
        // lo and hi both lie inside start..=end, so they fit back into i64
        Some(lo as i64..=hi as i64)
    }
}

// ============================================================
// RUNTIME TRAIT
// ============================================================

/// Fork-join runtime used by the verifier and the scaling driver.
pub trait ParallelRuntime {
    /// Human-readable backend name
    fn name(&self) -> &'static str;

    /// False when regions always run on a single implicit worker
    fn is_parallel(&self) -> bool;

    /// Request the worker count for subsequent regions.
    ///
    /// On error the runtime keeps whatever workers it already had.
    fn configure(&mut self, threads: ThreadConfig) -> Result<(), BenchError>;

    /// Request a worker count, tolerating a runtime that cannot provide it.
    ///
    /// A refused request is logged and the next region runs on the workers the
    /// runtime still has; the shortfall shows up as the observed thread count.
    fn request_threads(&mut self, threads: ThreadConfig) {
        if let Err(e) = self.configure(threads) {
            tracing::warn!(
                "{} runtime could not provide {} threads: {}",
                self.name(),
                threads.get(),
                e
            );
        }
    }

    /// Run `body` once per worker; returns after every worker has finished.
    fn parallel_region(&self, body: &(dyn Fn(&RegionContext) + Sync));
}

/// Pick the backend: rayon when compiled in and enabled, serial otherwise.
pub fn select_runtime(parallel: bool) -> Box<dyn ParallelRuntime> {
    if parallel {
        if let Some(rt) = parallel_runtime() {
            return rt;
        }
        tracing::warn!("Parallel runtime requested but not compiled in; using serial runtime");
    }
    Box::new(SerialRuntime::new())
}

#[cfg(feature = "parallel")]
fn parallel_runtime() -> Option<Box<dyn ParallelRuntime>> {
    Some(Box::new(RayonRuntime::new()))
}

#[cfg(not(feature = "parallel"))]
fn parallel_runtime() -> Option<Box<dyn ParallelRuntime>> {
    None
}

// ============================================================
// SERIAL RUNTIME
// ============================================================

/// Runtime used when parallelism is unavailable or disabled.
///
/// Configuration requests are accepted and remembered, but every region
/// runs on the calling thread as a single worker.
#[derive(Debug, Default)]
pub struct SerialRuntime {
    requested: Option<ThreadConfig>,
}

impl SerialRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last requested worker count (never honoured)
    pub fn requested(&self) -> Option<ThreadConfig> {
        self.requested
    }
}

impl ParallelRuntime for SerialRuntime {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn is_parallel(&self) -> bool {
        false
    }

    fn configure(&mut self, threads: ThreadConfig) -> Result<(), BenchError> {
        self.requested = Some(threads);
        Ok(())
    }

    fn parallel_region(&self, body: &(dyn Fn(&RegionContext) + Sync)) {
        if let Some(requested) = self.requested() {
            tracing::debug!("Serial region: {} threads requested, running 1", requested.get());
        }
        body(&RegionContext::new(0, 1));
    }
}

// ============================================================
// RAYON RUNTIME
// ============================================================

/// Runtime backed by a dedicated rayon pool per worker count.
///
/// Regions use `ThreadPool::broadcast`, which runs the body exactly once on
/// every pool thread and blocks until all of them return. If no pool could be
/// built yet, regions run on the calling thread as a single worker.
#[cfg(feature = "parallel")]
#[derive(Default)]
pub struct RayonRuntime {
    pool: Option<rayon::ThreadPool>,
}

#[cfg(feature = "parallel")]
impl RayonRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker count of the current pool, if one has been configured
    pub fn current_threads(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.current_num_threads())
    }
}

#[cfg(feature = "parallel")]
impl ParallelRuntime for RayonRuntime {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn is_parallel(&self) -> bool {
        true
    }

    fn configure(&mut self, threads: ThreadConfig) -> Result<(), BenchError> {
        if self.current_threads() == Some(threads.get()) {
            return Ok(());
        }
        // Previous pool stays in place when the new one cannot be built
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("parscale-worker-{}", i))
            .build()
            .map_err(|e| BenchError::ThreadPool(e.to_string()))?;
        tracing::debug!("Built rayon pool with {} threads", threads.get());
        self.pool = Some(pool);
        Ok(())
    }

    fn parallel_region(&self, body: &(dyn Fn(&RegionContext) + Sync)) {
        let run = |ctx: rayon::BroadcastContext<'_>| {
            body(&RegionContext::new(ctx.index(), ctx.num_threads()))
        };
        match &self.pool {
            Some(pool) => {
                pool.broadcast(run);
            }
            None => body(&RegionContext::new(0, 1)),
        }
    }
}
