//! The four ways a property run can end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of checking one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EngineResult {
    /// Every case passed (or an expected failure occurred).
    Success {
        num_tests: u32,
        num_discarded: u32,
        /// Failure reason when the property was expected to fail and did.
        expected_failure: Option<String>,
        transcript: Vec<String>,
    },
    /// Too many cases were discarded to reach a conclusion.
    GaveUp {
        num_tests: u32,
        num_discarded: u32,
        reason: String,
        transcript: Vec<String>,
    },
    /// A counterexample was found.
    Failure {
        num_tests: u32,
        num_discarded: u32,
        /// Successful shrink steps taken from the first failing input.
        num_shrinks: u32,
        reason: String,
        /// Debug rendering of the smallest failing input found.
        counterexample: String,
        transcript: Vec<String>,
    },
    /// The property was expected to fail but every case passed.
    NoExpectedFailure {
        num_tests: u32,
        num_discarded: u32,
        transcript: Vec<String>,
    },
}

impl EngineResult {
    /// Cases executed, including the failing one.
    pub fn num_tests(&self) -> u32 {
        match self {
            Self::Success { num_tests, .. }
            | Self::GaveUp { num_tests, .. }
            | Self::Failure { num_tests, .. }
            | Self::NoExpectedFailure { num_tests, .. } => *num_tests,
        }
    }

    /// Cases rejected by a precondition.
    pub fn num_discarded(&self) -> u32 {
        match self {
            Self::Success { num_discarded, .. }
            | Self::GaveUp { num_discarded, .. }
            | Self::Failure { num_discarded, .. }
            | Self::NoExpectedFailure { num_discarded, .. } => *num_discarded,
        }
    }

    /// Per-case lines recorded by the verbose modifiers.
    pub fn transcript(&self) -> &[String] {
        match self {
            Self::Success { transcript, .. }
            | Self::GaveUp { transcript, .. }
            | Self::Failure { transcript, .. }
            | Self::NoExpectedFailure { transcript, .. } => transcript,
        }
    }

    /// Did the run succeed?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Summary of the run, one line except for failures, which append the
    /// counterexample.
    pub fn summary(&self) -> String {
        match self {
            Self::Success {
                num_tests,
                num_discarded,
                expected_failure: None,
                ..
            } => format!(
                "+++ OK, passed {}{}.",
                plural(*num_tests, "test"),
                discards(*num_discarded)
            ),
            Self::Success {
                num_tests,
                expected_failure: Some(reason),
                ..
            } => format!(
                "+++ OK, failed as expected after {}: {}",
                plural(*num_tests, "test"),
                reason
            ),
            Self::GaveUp {
                num_tests,
                num_discarded,
                reason,
                ..
            } => format!(
                "*** Gave up! Passed only {}; {} discarded ({}).",
                plural(*num_tests, "test"),
                num_discarded,
                reason
            ),
            Self::Failure {
                num_tests,
                num_discarded,
                num_shrinks,
                reason,
                counterexample,
                ..
            } => format!(
                "*** Failed! {} (after {} and {}{}):\n{}",
                reason,
                plural(*num_tests, "test"),
                plural(*num_shrinks, "shrink"),
                discards(*num_discarded),
                counterexample
            ),
            Self::NoExpectedFailure {
                num_tests,
                num_discarded,
                ..
            } => format!(
                "*** Failed! Passed {}{} (expected failure).",
                plural(*num_tests, "test"),
                discards(*num_discarded)
            ),
        }
    }
}

fn plural(n: u32, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn discards(n: u32) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("; {} discarded", n)
    }
}

/// Transcript lines followed by the summary.
impl fmt::Display for EngineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.transcript() {
            writeln!(f, "{}", line)?;
        }
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_summary() {
        let result = EngineResult::Success {
            num_tests: 100,
            num_discarded: 0,
            expected_failure: None,
            transcript: vec![],
        };
        assert_eq!(result.to_string(), "+++ OK, passed 100 tests.");
        assert!(result.is_success());
    }

    #[test]
    fn test_failure_display_includes_transcript_and_counterexample() {
        let result = EngineResult::Failure {
            num_tests: 7,
            num_discarded: 2,
            num_shrinks: 1,
            reason: "assertion failed: x < 10".to_string(),
            counterexample: "12".to_string(),
            transcript: vec!["Passed:\n3".to_string()],
        };
        assert_eq!(
            result.to_string(),
            "Passed:\n3\n*** Failed! assertion failed: x < 10 (after 7 tests and 1 shrink; 2 discarded):\n12"
        );
        assert_eq!(result.num_tests(), 7);
        assert_eq!(result.num_discarded(), 2);
    }

    #[test]
    fn test_gave_up_and_no_expected_failure_summaries() {
        let gave_up = EngineResult::GaveUp {
            num_tests: 1,
            num_discarded: 1000,
            reason: "Too many global rejects".to_string(),
            transcript: vec![],
        };
        assert_eq!(
            gave_up.summary(),
            "*** Gave up! Passed only 1 test; 1000 discarded (Too many global rejects)."
        );

        let unexpected = EngineResult::NoExpectedFailure {
            num_tests: 100,
            num_discarded: 0,
            transcript: vec![],
        };
        assert_eq!(
            unexpected.summary(),
            "*** Failed! Passed 100 tests (expected failure)."
        );
    }

    #[test]
    fn test_result_serializes_with_tag() {
        let result = EngineResult::NoExpectedFailure {
            num_tests: 3,
            num_discarded: 0,
            transcript: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result"], "no_expected_failure");
        assert_eq!(json["num_tests"], 3);
    }
}
