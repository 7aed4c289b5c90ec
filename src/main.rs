//! parscale - Parallel Runtime Verifier & Scaling Benchmark
//!
//! ```text
//! ┌──────────┐    ┌────────────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Config  │───▶│   Reduction    │───▶│ matmul sweep │───▶│  svd sweep   │
//! │  (YAML)  │    │   Verifier     │    │ 1,2,4..<max  │    │ 1,2,4..<max  │
//! └──────────┘    └───────┬────────┘    └──────────────┘    └──────────────┘
//!                         │
//!                         ▼
//!                 exit code 0 / 1
//! ```
//!
//! Exit code 2 means the harness itself could not run (bad config). A
//! runtime that cannot provide the requested threads only shows up as a
//! thread-count mismatch.

use std::process::ExitCode;

use anyhow::Context;
use parscale::config::AppConfig;
use parscale::logging::init_logging;
use parscale::runtime::PARALLEL_SUPPORTED;
use parscale::{
    MatMulWorkload, Range, ReductionVerifier, ScalingBenchmark, StdoutConsole,
    SvdProjectionWorkload, ThreadConfig, select_runtime,
};

const EXIT_HARNESS_FAILURE: u8 = 2;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn run(config: &AppConfig) -> anyhow::Result<u8> {
    let console = StdoutConsole;
    let mut runtime = select_runtime(config.runtime.parallel);

    // ============================================================
    // REDUCTION VERIFIER
    // ============================================================
    let range = Range::new(config.verifier.start, config.verifier.end)?;
    let target = ThreadConfig::new(config.verifier.threads)?;
    let verification = ReductionVerifier::new(range, target)
        .run(runtime.as_mut(), &console)
        .context("Reduction verifier failed to run")?;

    // ============================================================
    // SCALING SWEEPS
    // ============================================================
    let sweep = ScalingBenchmark::new(config.sweep.max_threads);
    if config.sweep.matmul {
        sweep
            .run(runtime.as_mut(), &MatMulWorkload::default(), &console)
            .context("Matrix multiply sweep failed")?;
    }
    if config.sweep.svd {
        sweep
            .run(runtime.as_mut(), &SvdProjectionWorkload::default(), &console)
            .context("SVD projection sweep failed")?;
    }

    Ok(verification.exit_code())
}

fn main() -> ExitCode {
    let env = get_env();
    let app_config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            return ExitCode::from(EXIT_HARNESS_FAILURE);
        }
    };
    let _log_guard = init_logging(&app_config);

    tracing::info!(
        "Starting parscale {} ({}) in {} mode at {}, parallel feature: {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        PARALLEL_SUPPORTED
    );

    match run(&app_config) {
        Ok(code) => {
            tracing::info!("Finished with exit code {}", code);
            ExitCode::from(code)
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::from(EXIT_HARNESS_FAILURE)
        }
    }
}
