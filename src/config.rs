use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::sweep::DEFAULT_MAX_THREADS;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Emit per-trial `TRIAL` events to the log
    pub enable_tracing: bool,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Use the rayon runtime when compiled in; false forces the serial runtime
    pub parallel: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Reduction check: sum `start..=end` on `threads` workers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerifierConfig {
    pub start: i64,
    pub end: i64,
    pub threads: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            start: 1,
            end: 10,
            threads: 4,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SweepConfig {
    /// Exclusive upper bound on the doubling thread count
    pub max_threads: usize,
    pub matmul: bool,
    pub svd: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_threads: DEFAULT_MAX_THREADS,
            matmul: true,
            svd: true,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid config: {}", config_path))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context("Failed to parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.verifier.start <= self.verifier.end,
            "verifier.start ({}) must not exceed verifier.end ({})",
            self.verifier.start,
            self.verifier.end
        );
        ensure!(self.verifier.threads >= 1, "verifier.threads must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
log_level: info
log_dir: ./logs
log_file: parscale.log
use_json: false
rotation: never
enable_tracing: false
"#;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AppConfig::from_yaml_str(BASE).unwrap();
        assert!(config.runtime.parallel);
        assert_eq!(config.verifier.start, 1);
        assert_eq!(config.verifier.end, 10);
        assert_eq!(config.verifier.threads, 4);
        assert_eq!(config.sweep.max_threads, 512);
        assert!(config.sweep.matmul && config.sweep.svd);
    }

    #[test]
    fn test_overrides() {
        let yaml = format!(
            "{}runtime:\n  parallel: false\nsweep:\n  max_threads: 8\n  matmul: true\n  svd: false\n",
            BASE
        );
        let config = AppConfig::from_yaml_str(&yaml).unwrap();
        assert!(!config.runtime.parallel);
        assert_eq!(config.sweep.max_threads, 8);
        assert!(!config.sweep.svd);
    }

    #[test]
    fn test_rejects_reversed_range() {
        let yaml = format!("{}verifier:\n  start: 10\n  end: 1\n  threads: 4\n", BASE);
        assert!(AppConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_rejects_zero_threads() {
        let yaml = format!("{}verifier:\n  start: 1\n  end: 10\n  threads: 0\n", BASE);
        assert!(AppConfig::from_yaml_str(&yaml).is_err());
    }
}
