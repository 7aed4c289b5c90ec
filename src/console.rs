//! Console - formatted output sink for benchmark reports
//!
//! Report lines are user-facing output, not logs: they always go to stdout
//! regardless of the tracing filter. Tests swap in [`CaptureConsole`].

use std::sync::Mutex;

/// Line-oriented print service, shared across region workers.
pub trait Console: Sync {
    fn print(&self, line: &str);
}

/// Writes each line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, line: &str) {
        println!("{}", line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct CaptureConsole {
    lines: Mutex<Vec<String>>,
}

impl CaptureConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything printed so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of printed lines that start with `prefix`
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl Console for CaptureConsole {
    fn print(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_console_keeps_order() {
        let console = CaptureConsole::new();
        console.print("first");
        console.print("second");
        assert_eq!(console.lines(), vec!["first", "second"]);
        assert_eq!(console.count_prefix("sec"), 1);
    }
}
