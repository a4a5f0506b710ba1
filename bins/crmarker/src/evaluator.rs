/// Verdict Evaluator - turn an execution outcome into feedback and a mark
///
/// **Core Responsibility:**
/// Build the transcript the student sees and decide pass/fail.
///
/// **Critical Properties:**
/// - Knows nothing about processes or the filesystem
/// - Pure function: (outcome, prefix length, sentinel) → transcript → verdict
///
/// **Scoring Rules:**
/// - fraction is 1 iff the program exited 0 within the timeout AND the
///   combined stdout+stderr text, trimmed, equals the sentinel exactly
/// - everything else scores 0
///
/// **Rendering Rules:**
/// - program stdout is passed through as HTML, since checking code reports
///   with `<code>` markup
/// - stderr is line-rebased, escaped and shown as error text
/// - notices from the harness (exit code, timeout) are escaped paragraphs

use crate::remap::remap_line_numbers;
use crmarker_common::{ExecutionOutcome, Verdict};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Notice produced by the harness itself
    Notice(String),
    Output(String),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    segments: Vec<Segment>,
}

impl Transcript {
    pub fn push(&mut self, segment: Segment) {
        let empty = match &segment {
            Segment::Notice(text) | Segment::Output(text) | Segment::Error(text) => text.is_empty(),
        };
        if !empty {
            self.segments.push(segment);
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Everything captured, as plain text
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Notice(text) => format!("{}\n", text),
                Segment::Output(text) | Segment::Error(text) => text.clone(),
            })
            .collect()
    }

    pub fn to_html(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Notice(text) => format!("<p class=\"notice\">{}</p>", escape_html(text)),
                Segment::Output(text) => text.clone(),
                Segment::Error(text) => {
                    format!("<pre class=\"error\" style=\"color:red\">{}</pre>", escape_html(text))
                }
            })
            .collect()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Compare output against the sentinel after trimming surrounding whitespace
fn matches_sentinel(output: &str, sentinel: &str) -> bool {
    output.trim() == sentinel
}

/// Build the transcript for an outcome, rebasing stderr by `prefix_length`
pub fn build_transcript(outcome: &ExecutionOutcome, prefix_length: i64, timeout: Duration) -> Transcript {
    let mut transcript = Transcript::default();
    match outcome {
        ExecutionOutcome::Success { stdout, stderr } => {
            transcript.push(Segment::Output(stdout.clone()));
            transcript.push(Segment::Error(remap_line_numbers(stderr, prefix_length)));
        }
        ExecutionOutcome::NonZeroExit { code, stdout, stderr } => {
            let notice = match code {
                Some(code) => format!("Your program exited with code {}.", code),
                None => "Your program was terminated by a signal.".to_string(),
            };
            transcript.push(Segment::Notice(notice));
            transcript.push(Segment::Output(stdout.clone()));
            transcript.push(Segment::Error(remap_line_numbers(stderr, prefix_length)));
        }
        ExecutionOutcome::Timeout => {
            transcript.push(Segment::Notice(format!(
                "Task timed out after {} seconds.",
                timeout.as_secs_f64()
            )));
        }
        ExecutionOutcome::LaunchFailed { message } => {
            transcript.push(Segment::Notice(format!("Unable to run your program: {}", message)));
        }
    }
    transcript
}

/// Decide pass/fail and produce the verdict
pub fn evaluate(outcome: &ExecutionOutcome, transcript: &Transcript, sentinel: &str) -> Verdict {
    let passed = outcome.is_success() && matches_sentinel(&transcript.text(), sentinel);
    let html = transcript.to_html();
    if passed {
        Verdict::pass(html)
    } else {
        Verdict::fail(html)
    }
}
