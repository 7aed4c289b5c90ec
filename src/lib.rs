//! parscale - Parallel Runtime Verifier & Scaling Benchmark
//!
//! Checks that a fork-join runtime honours a requested worker count and
//! reduces atomically, then times two linear-algebra kernels at 1, 2, 4, ..
//! worker threads.
//!
//! # Modules
//!
//! - [`runtime`] - Fork-join runtime abstraction (rayon / serial)
//! - [`reduction`] - Reduction Verifier (thread count + atomic sum check)
//! - [`sweep`] - Scaling Benchmark Driver (power-of-two thread sweep)
//! - [`workload`] - Matrix multiply and SVD projection workloads
//! - [`timer`] - RAII scope timer
//! - [`console`] - Report output sink
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod reduction;
pub mod runtime;
pub mod sweep;
pub mod timer;
pub mod workload;

// Convenient re-exports at crate root
pub use console::{CaptureConsole, Console, StdoutConsole};
pub use error::BenchError;
pub use reduction::{Range, ReductionVerifier, VerificationResult};
pub use runtime::{ParallelRuntime, RegionContext, SerialRuntime, ThreadConfig, select_runtime};
pub use sweep::{ScalingBenchmark, TrialReport, thread_counts};
pub use timer::ScopeTimer;
pub use workload::{MatMulWorkload, SvdProjectionWorkload, Workload};

#[cfg(feature = "parallel")]
pub use runtime::RayonRuntime;
