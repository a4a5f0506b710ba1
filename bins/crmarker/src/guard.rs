// Import guard: reject submissions mentioning "import" before anything runs
use anyhow::Result;
use crmarker_common::Verdict;
use std::io::Write;
use tracing::info;

pub const BANNED_WORD: &str = "import";

pub const IMPORT_MESSAGE: &str =
    "The word \"import\" was found in your code.  Imports are not allowed in this question.";

/// Zero verdict for a submission containing the banned word
///
/// Plain substring search; identifiers such as `important` are caught too.
pub fn import_verdict(code: &str) -> Option<Verdict> {
    code.contains(BANNED_WORD).then(|| Verdict::fail(IMPORT_MESSAGE))
}

/// Emit a zero verdict on `out` if `code` contains "import"
///
/// Returns `true` when the code is clean. With `die_on_error` a rejected
/// submission ends the process after the verdict is written.
pub fn ban_imports(code: &str, die_on_error: bool, out: &mut dyn Write) -> Result<bool> {
    let Some(verdict) = import_verdict(code) else {
        return Ok(true);
    };

    info!("Submission rejected: contains \"{}\"", BANNED_WORD);
    writeln!(out, "{}", verdict.to_line()?)?;
    out.flush()?;

    if die_on_error {
        std::process::exit(0);
    }
    Ok(false)
}
