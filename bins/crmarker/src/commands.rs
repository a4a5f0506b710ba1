// Command implementations for the crmarker binary
use crate::config::{ConfigManager, Overrides};
use crate::executor;
use crate::guard;
use anyhow::{bail, Context, Result};
use crmarker_common::{MarkingRequest, Verdict};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Where the submission comes from
pub enum Source {
    /// A JSON `MarkingRequest`
    Request(PathBuf),
    Files {
        prefix: Option<PathBuf>,
        student: PathBuf,
        suffix: Option<PathBuf>,
    },
}

/// Read a file argument; `-` means standard input
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read standard input")?;
        return Ok(content);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_optional(path: Option<&Path>) -> Result<String> {
    path.map(read_input).transpose().map(Option::unwrap_or_default)
}

pub fn load_request(source: &Source) -> Result<MarkingRequest> {
    match source {
        Source::Request(path) => {
            let content = read_input(path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse marking request {}", path.display()))
        }
        Source::Files { prefix, student, suffix } => {
            let stdin_uses = [prefix.as_deref(), Some(student.as_path()), suffix.as_deref()]
                .iter()
                .filter(|path| *path == &Some(Path::new("-")))
                .count();
            if stdin_uses > 1 {
                bail!("Only one of --prefix, --student and --suffix may read standard input");
            }
            Ok(MarkingRequest::new(
                read_optional(prefix.as_deref())?,
                read_input(student)?,
                read_optional(suffix.as_deref())?,
            ))
        }
    }
}

fn load_config(config_path: Option<&Path>, overrides: Overrides) -> Result<ConfigManager> {
    let manager = match config_path {
        Some(path) => ConfigManager::load(path)?,
        None => ConfigManager::load_default()?,
    }
    .with_overrides(overrides)
    .with_env();
    manager.validate()?;
    Ok(manager)
}

/// `crmarker mark`
pub async fn mark(
    source: Source,
    config_path: Option<&Path>,
    overrides: Overrides,
    ban_imports: bool,
) -> Result<Verdict> {
    let manager = load_config(config_path, overrides)?;
    let request = load_request(&source)?;
    let mut stdout = io::stdout().lock();

    if ban_imports {
        if let Some(verdict) = guard::import_verdict(&request.student_code) {
            tracing::info!(run_id = %request.id, "Submission rejected by import guard");
            executor::emit(&verdict, &mut stdout)?;
            return Ok(verdict);
        }
    }

    executor::do_marking(&request, manager.config(), &mut stdout).await
}

/// `crmarker ban-imports`
pub fn ban_imports(student: &Path, exit_on_error: bool) -> Result<bool> {
    let code = read_input(student)?;
    let mut stdout = io::stdout().lock();
    let clean = guard::ban_imports(&code, exit_on_error, &mut stdout)?;
    stdout.flush()?;
    Ok(clean)
}
