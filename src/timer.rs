//! Scope Timer - wall-clock timing reported on scope exit
//!
//! ```ignore
//! {
//!     let _t = ScopeTimer::start("svd, 4 tasks, 4 threads", &console);
//!     run_trial()?;          // early return still reports
//! }                          // prints "svd, 4 tasks, 4 threads: 12.345 ms."
//! ```

use std::time::{Duration, Instant};

use crate::console::Console;

/// RAII timer: prints `"{label}: {ms} ms."` exactly once, when dropped.
pub struct ScopeTimer<'a> {
    label: String,
    start: Instant,
    console: &'a dyn Console,
}

impl<'a> ScopeTimer<'a> {
    pub fn start(label: impl Into<String>, console: &'a dyn Console) -> Self {
        ScopeTimer {
            label: label.into(),
            start: Instant::now(),
            console,
        }
    }

    /// Time since acquisition, without releasing the timer
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopeTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        tracing::debug!(target: "TRIAL", label = %self.label, elapsed_us = elapsed.as_micros() as u64, "timer released");
        self.console.print(&format_elapsed(&self.label, elapsed));
    }
}

/// Render a timer report line.
pub fn format_elapsed(label: &str, elapsed: Duration) -> String {
    format!("{}: {:.3} ms.", label, elapsed.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureConsole;

    #[test]
    fn test_reports_once_on_drop() {
        let console = CaptureConsole::new();
        {
            let _t = ScopeTimer::start("simple", &console);
            assert!(console.lines().is_empty());
        }
        assert_eq!(console.count_prefix("simple: "), 1);
        assert!(console.lines()[0].ends_with(" ms."));
    }

    #[test]
    fn test_reports_on_early_return() {
        fn failing(console: &CaptureConsole) -> Result<(), &'static str> {
            let _t = ScopeTimer::start("early", console);
            let step: Result<(), &'static str> = Err("boom");
            step?;
            Ok(())
        }

        let console = CaptureConsole::new();
        assert!(failing(&console).is_err());
        assert_eq!(console.count_prefix("early: "), 1);
    }

    #[test]
    fn test_reports_on_unwind() {
        let console = CaptureConsole::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _t = ScopeTimer::start("unwind", &console);
            panic!("workload fault");
        }));
        assert!(result.is_err());
        assert_eq!(console.count_prefix("unwind: "), 1);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(
            format_elapsed("x", Duration::from_micros(1500)),
            "x: 1.500 ms."
        );
    }
}
