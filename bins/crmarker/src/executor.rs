/// Marking Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Coordinate workspace, engine and evaluator to produce the verdict.
///
/// **Architecture:**
/// 1. Compose prefix + student code + suffix and write it to a private workspace
/// 2. Run it with the SubprocessEngine (engine.rs)
/// 3. Build transcript and verdict with the evaluator (evaluator.rs)
/// 4. Embed the plot artifact when the run succeeded (artifact.rs)
/// 5. Emit the verdict as one JSON line
///
/// Student-caused faults end up in the verdict; only environment faults
/// (unwritable work root, broken output stream) are returned as errors.

use crate::artifact;
use crate::engine::SubprocessEngine;
use crate::evaluator;
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use crmarker_common::{MarkingConfig, MarkingRequest, Verdict};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Mark one submission and write the verdict line to `out`
#[tracing::instrument(skip_all, fields(run_id = %request.id))]
pub async fn do_marking(
    request: &MarkingRequest,
    config: &MarkingConfig,
    out: &mut dyn Write,
) -> Result<Verdict> {
    let start = Instant::now();
    let program = request.compose();
    let prefix_length = request.prefix_length();

    info!(
        program_bytes = program.len(),
        prefix_length,
        interpreter = %config.interpreter,
        timeout_ms = config.timeout_ms,
        "Starting marking"
    );

    let workspace = Workspace::create(config)?;
    workspace.write_program(&program)?;
    debug!(program = %workspace.program_path().display(), "Program written");

    let outcome = SubprocessEngine::new(config).run(&workspace).await?;

    let transcript = evaluator::build_transcript(&outcome, prefix_length, config.timeout());
    debug!(segments = transcript.segments().len(), "Transcript built");
    let mut verdict = evaluator::evaluate(&outcome, &transcript, &config.sentinel);

    if outcome.is_success() {
        if let Some(plot) = workspace.plot_artifact() {
            let image = artifact::image_html(plot)
                .with_context(|| format!("Failed to embed plot {}", plot.display()))?;
            verdict.feedback_html.push_str(&image);
        }
    } else if workspace.plot_artifact().is_some() {
        warn!("Run failed; plot artifact not embedded");
    }

    emit(&verdict, out)?;

    info!(
        fraction = verdict.fraction,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Marking completed"
    );

    Ok(verdict)
}

/// Write the verdict as a single JSON line
pub fn emit(verdict: &Verdict, out: &mut dyn Write) -> Result<()> {
    let line = verdict.to_line().context("Failed to serialize verdict")?;
    writeln!(out, "{}", line).context("Failed to write verdict")?;
    out.flush().context("Failed to flush verdict")?;
    Ok(())
}
