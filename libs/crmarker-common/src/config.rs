// Per-invocation marking configuration
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::SENTINEL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkingConfig {
    /// Interpreter launched on the composed program
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
    /// File name of the composed program inside the working directory
    pub program_file: String,
    pub timeout_ms: u64,
    pub sentinel: String,
    /// Image the program may leave behind for embedding, if any
    pub plot_file: Option<String>,
    /// Parent of the per-invocation working directories; system temp dir when unset
    pub work_root: Option<PathBuf>,
    /// Writable config directory handed to the plotting library
    pub plot_config_dir: Option<PathBuf>,
}

impl Default for MarkingConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            interpreter_args: Vec::new(),
            program_file: "testcode.py".to_string(),
            timeout_ms: 2000,
            sentinel: SENTINEL.to_string(),
            plot_file: Some("plot.png".to_string()),
            work_root: None,
            plot_config_dir: None,
        }
    }
}

impl MarkingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarkingConfig::default();
        assert_eq!(config.interpreter, "python3");
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.sentinel, "All good!");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: MarkingConfig = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.program_file, "testcode.py");
        assert_eq!(config.plot_file.as_deref(), Some("plot.png"));
    }
}
