//! Three-way verdict reported for every executed test unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of a single test execution.
///
/// `Fail` means the test demonstrated a genuine violation. `Error` means the
/// test could not reach a conclusion (for example, too many generated inputs
/// were discarded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "message", rename_all = "lowercase")]
pub enum Outcome {
    /// The test passed.
    Pass,
    /// The test failed, with a diagnostic message.
    Fail(String),
    /// The test errored, with a diagnostic message.
    Error(String),
}

impl Outcome {
    /// Create a failing outcome.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Create an erroring outcome.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Did the test pass?
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Diagnostic message, absent for passing tests.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail(message) | Self::Error(message) => Some(message),
        }
    }

    /// Short lowercase label (`pass`, `fail`, `error`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail(_) => "fail",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            None => f.write_str("OK"),
            Some(message) => write!(f, "{}: {}", self.label().to_uppercase(), message),
        }
    }
}
