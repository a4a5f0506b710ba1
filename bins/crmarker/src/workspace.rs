// Private working directory for one marking run
use anyhow::{Context, Result};
use crmarker_common::MarkingConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Holds the composed program and any artifacts it produces
///
/// The directory and everything in it is removed when the workspace is dropped.
pub struct Workspace {
    dir: TempDir,
    program_path: PathBuf,
    plot_path: Option<PathBuf>,
}

impl Workspace {
    pub fn create(config: &MarkingConfig) -> Result<Self> {
        let root = config.work_root.clone().unwrap_or_else(std::env::temp_dir);
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create work root {}", root.display()))?;

        let dir = tempfile::Builder::new()
            .prefix("crmarker-")
            .tempdir_in(&root)
            .with_context(|| format!("Failed to create working directory in {}", root.display()))?;

        let program_path = dir.path().join(&config.program_file);
        let plot_path = config.plot_file.as_ref().map(|name| dir.path().join(name));

        Ok(Self { dir, program_path, plot_path })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn program_path(&self) -> &Path {
        &self.program_path
    }

    pub fn write_program(&self, program: &str) -> Result<()> {
        fs::write(&self.program_path, program)
            .with_context(|| format!("Failed to write {}", self.program_path.display()))
    }

    /// The plot artifact, if one is configured and the program created it
    pub fn plot_artifact(&self) -> Option<&Path> {
        self.plot_path.as_deref().filter(|path| path.is_file())
    }

    /// Config directory for the plotting library, created inside the workspace when needed
    pub fn plot_config_dir(&self, configured: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = configured {
            return Ok(dir.to_path_buf());
        }
        let dir = self.dir.path().join("mplconfig");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(dir)
    }
}
