use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Success marker the composed program prints to signal a passing run
pub const SENTINEL: &str = "All good!";

/// One grading attempt: instructor prefix, the student's fragment, instructor suffix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkingRequest {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub prefix: String,
    pub student_code: String,
    #[serde(default)]
    pub suffix: String,
}

impl MarkingRequest {
    pub fn new(prefix: impl Into<String>, student_code: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            prefix: prefix.into(),
            student_code: student_code.into(),
            suffix: suffix.into(),
        }
    }

    /// Prefix, newline, student code, newline, suffix
    pub fn compose(&self) -> String {
        format!("{}\n{}\n{}", self.prefix, self.student_code, self.suffix)
    }

    /// Number of program lines that precede the student's first line
    ///
    /// Newlines in the prefix plus one, deliberately not "lines in prefix + 1".
    /// The two differ only for a prefix without a trailing newline, where the
    /// line count would place the student's code one line too late.
    pub fn prefix_length(&self) -> i64 {
        self.prefix.matches('\n').count() as i64 + 1
    }
}

/// Result handed back to the grading platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "prologuehtml")]
    pub feedback_html: String,
    pub fraction: u8,
}

impl Verdict {
    pub fn pass(feedback_html: impl Into<String>) -> Self {
        Self { feedback_html: feedback_html.into(), fraction: 1 }
    }

    pub fn fail(feedback_html: impl Into<String>) -> Self {
        Self { feedback_html: feedback_html.into(), fraction: 0 }
    }

    pub fn passed(&self) -> bool {
        self.fraction == 1
    }

    /// Single-line JSON, the wire format expected on stdout
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// What happened to the child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success {
        stdout: String,
        stderr: String,
    },
    /// `code` is `None` when the child was terminated by a signal
    NonZeroExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    Timeout,
    LaunchFailed {
        message: String,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn stdout(&self) -> &str {
        match self {
            ExecutionOutcome::Success { stdout, .. } | ExecutionOutcome::NonZeroExit { stdout, .. } => stdout,
            _ => "",
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            ExecutionOutcome::Success { stderr, .. } | ExecutionOutcome::NonZeroExit { stderr, .. } => stderr,
            _ => "",
        }
    }
}

/// Outcome of one introspection or plot check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub success: bool,
    pub message: Option<String>,
    pub value: Option<serde_json::Value>,
}

impl CheckResult {
    pub fn ok() -> Self {
        Self { success: true, message: None, value: None }
    }

    pub fn ok_with(value: serde_json::Value) -> Self {
        Self { success: true, message: None, value: Some(value) }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), value: None }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}
