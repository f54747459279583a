//! Test reporting utilities.

use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Errored,
}

impl From<&Outcome> for TestStatus {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Pass => TestStatus::Passed,
            Outcome::Fail(_) => TestStatus::Failed,
            Outcome::Error(_) => TestStatus::Errored,
        }
    }
}

/// Individual test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub classname: String,
    pub tags: Vec<String>,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
}

impl TestResult {
    /// Build a result from a unit's verdict.
    pub fn from_outcome(
        name: impl Into<String>,
        classname: impl Into<String>,
        tags: Vec<String>,
        outcome: &Outcome,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            classname: classname.into(),
            tags,
            status: TestStatus::from(outcome),
            duration_ms,
            message: outcome.message().map(str::to_string),
        }
    }
}

/// Test suite results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    pub tests: u32,
    pub failures: u32,
    pub errors: u32,
    pub time_ms: u64,
    pub timestamp: String,
    pub test_cases: Vec<TestResult>,
}

impl TestSuite {
    /// Create an empty suite stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: 0,
            failures: 0,
            errors: 0,
            time_ms: 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            test_cases: Vec::new(),
        }
    }

    /// Record a test result.
    pub fn add_result(&mut self, result: TestResult) {
        self.tests += 1;
        match result.status {
            TestStatus::Failed => self.failures += 1,
            TestStatus::Errored => self.errors += 1,
            TestStatus::Passed => {}
        }
        self.time_ms += result.duration_ms;
        self.test_cases.push(result);
    }
}

/// Full test report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub name: String,
    pub tests: u32,
    pub failures: u32,
    pub errors: u32,
    pub time_ms: u64,
    pub suites: Vec<TestSuite>,
}

impl TestReport {
    /// Create a new empty report
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: 0,
            failures: 0,
            errors: 0,
            time_ms: 0,
            suites: Vec::new(),
        }
    }

    /// Add a test suite
    pub fn add_suite(&mut self, suite: TestSuite) {
        self.tests += suite.tests;
        self.failures += suite.failures;
        self.errors += suite.errors;
        self.time_ms += suite.time_ms;
        self.suites.push(suite);
    }

    /// Number of passing tests.
    pub fn passed(&self) -> u32 {
        self.tests - self.failures - self.errors
    }

    /// Did every test pass?
    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }

    /// Export to JUnit XML format
    pub fn to_junit_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuites name="{}" tests="{}" failures="{}" errors="{}" time="{:.3}">"#,
            escape_xml(&self.name),
            self.tests,
            self.failures,
            self.errors,
            self.time_ms as f64 / 1000.0
        ));
        xml.push('\n');

        for suite in &self.suites {
            xml.push_str(&format!(
                r#"  <testsuite name="{}" tests="{}" failures="{}" errors="{}" time="{:.3}" timestamp="{}">"#,
                escape_xml(&suite.name),
                suite.tests,
                suite.failures,
                suite.errors,
                suite.time_ms as f64 / 1000.0,
                suite.timestamp
            ));
            xml.push('\n');

            for test in &suite.test_cases {
                xml.push_str(&format!(
                    r#"    <testcase name="{}" classname="{}" time="{:.3}">"#,
                    escape_xml(&test.name),
                    escape_xml(&test.classname),
                    test.duration_ms as f64 / 1000.0
                ));
                xml.push('\n');

                let element = match test.status {
                    TestStatus::Failed => Some("failure"),
                    TestStatus::Errored => Some("error"),
                    TestStatus::Passed => None,
                };
                if let Some(element) = element {
                    let message = test.message.as_deref().unwrap_or("");
                    xml.push_str(&format!(
                        r#"      <{element} message="{}">{}</{element}>"#,
                        escape_xml(first_line(message)),
                        escape_xml(message),
                    ));
                    xml.push('\n');
                }

                xml.push_str("    </testcase>\n");
            }

            xml.push_str("  </testsuite>\n");
        }

        xml.push_str("</testsuites>\n");
        xml
    }

    /// Export to JSON format
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Export to a plain-text tree with a summary line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();

        for suite in &self.suites {
            if !suite.name.is_empty() {
                text.push_str(&suite.name);
                text.push('\n');
            }
            for test in &suite.test_cases {
                let label = match test.status {
                    TestStatus::Passed => "OK",
                    TestStatus::Failed => "FAIL",
                    TestStatus::Errored => "ERROR",
                };
                text.push_str(&format!(
                    "  {}: {} ({}ms)\n",
                    test.name, label, test.duration_ms
                ));
                if let Some(message) = &test.message {
                    for line in message.lines() {
                        text.push_str("    ");
                        text.push_str(line);
                        text.push('\n');
                    }
                }
            }
        }

        if self.is_success() {
            text.push_str(&format!(
                "\nAll {} tests passed ({:.2}s)\n",
                self.tests,
                self.time_ms as f64 / 1000.0
            ));
        } else {
            text.push_str(&format!(
                "\n{} out of {} tests failed, {} errored ({:.2}s)\n",
                self.failures,
                self.tests,
                self.errors,
                self.time_ms as f64 / 1000.0
            ));
        }
        text
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
