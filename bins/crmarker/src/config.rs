// Marking configuration loading for crmarker
use anyhow::{bail, Context, Result};
use crmarker_common::MarkingConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the plotting library's config directory
pub const PLOT_CONFIG_ENV: &str = "MPLCONFIGDIR";

const DEFAULT_CONFIG_PATH: &str = "config/marker.json";

/// Command line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub interpreter: Option<String>,
    pub timeout_ms: Option<u64>,
    pub work_root: Option<PathBuf>,
}

/// Marking configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: MarkingConfig,
}

impl ConfigManager {
    /// Load configuration from a JSON file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Marker config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: MarkingConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Self { config })
    }

    /// Load config/marker.json when present, built-in defaults otherwise
    pub fn load_default() -> Result<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            Ok(Self::from_config(MarkingConfig::default()))
        }
    }

    pub fn from_config(config: MarkingConfig) -> Self {
        Self { config }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(interpreter) = overrides.interpreter {
            self.config.interpreter = interpreter;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.config.timeout_ms = timeout_ms;
        }
        if let Some(work_root) = overrides.work_root {
            self.config.work_root = Some(work_root);
        }
        self
    }

    /// Take the plotting config directory from `MPLCONFIGDIR` when it is usable
    pub fn with_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(PLOT_CONFIG_ENV).map(PathBuf::from) {
            if is_writable_dir(&dir) {
                self.config.plot_config_dir = Some(dir);
            } else {
                warn!(dir = %dir.display(), "{} is not a writable directory, using a private one", PLOT_CONFIG_ENV);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let config = &self.config;
        if config.interpreter.trim().is_empty() {
            bail!("Interpreter must not be empty");
        }
        if config.program_file.trim().is_empty() {
            bail!("Program file name must not be empty");
        }
        if config.timeout_ms == 0 {
            bail!("Timeout must be greater than zero");
        }
        if let Some(plot_file) = &config.plot_file {
            if crate::artifact::image_mime_type(Path::new(plot_file)).is_none() {
                bail!("Plot file must end in .png, .jpg or .jpeg: {}", plot_file);
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &MarkingConfig {
        &self.config
    }
}

/// A directory we can create files in
pub fn is_writable_dir(dir: &Path) -> bool {
    dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("marker.json");
        fs::write(&path, r#"{"interpreter": "python3.12", "timeout_ms": 5000}"#).unwrap();

        let manager = ConfigManager::load(&path).unwrap();
        assert_eq!(manager.config().interpreter, "python3.12");
        assert_eq!(manager.config().timeout_ms, 5000);
        assert_eq!(manager.config().sentinel, "All good!");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigManager::load(Path::new("/nonexistent/marker.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("marker.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ConfigManager::load(&path).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let manager = ConfigManager::from_config(MarkingConfig::default()).with_overrides(Overrides {
            interpreter: Some("sh".to_string()),
            timeout_ms: Some(100),
            work_root: None,
        });
        assert_eq!(manager.config().interpreter, "sh");
        assert_eq!(manager.config().timeout_ms, 100);
        assert!(manager.config().work_root.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(ConfigManager::from_config(MarkingConfig::default()).validate().is_ok());

        let zero = MarkingConfig { timeout_ms: 0, ..Default::default() };
        assert!(ConfigManager::from_config(zero).validate().is_err());

        let gif = MarkingConfig { plot_file: Some("plot.gif".to_string()), ..Default::default() };
        assert!(ConfigManager::from_config(gif).validate().is_err());

        let no_plot = MarkingConfig { plot_file: None, ..Default::default() };
        assert!(ConfigManager::from_config(no_plot).validate().is_ok());
    }

    #[test]
    fn test_writable_dir() {
        let dir = tempdir().unwrap();
        assert!(is_writable_dir(dir.path()));
        assert!(!is_writable_dir(&dir.path().join("missing")));
    }
}
