//! Command-line harness that configures, runs and reports a [`TestTree`].

use crate::options::SetOptionError;
use crate::reporters::{TestReport, TestResult, TestSuite};
use crate::unit::TestTree;
use clap::{Parser, ValueEnum};
use propbridge_common_log::LogConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use thiserror::Error;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Indented plain text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// JUnit XML.
    Junit,
}

/// Harness command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "propbridge", about = "Run a tree of property tests")]
pub struct HarnessArgs {
    /// Set a test option (repeatable), e.g. `-o maxSuccess=500`.
    /// `PROPBRIDGE_OPTIONS` supplies a comma-separated list.
    #[arg(
        short = 'o',
        long = "option",
        value_name = "NAME=VALUE",
        env = "PROPBRIDGE_OPTIONS",
        value_delimiter = ',',
        value_parser = parse_option_assignment
    )]
    pub options: Vec<(String, String)>,

    /// YAML file mapping option names to values, applied before `--option`.
    #[arg(long, value_name = "PATH")]
    pub options_file: Option<PathBuf>,

    /// Only run tests whose slash-joined path contains this substring.
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Print the option schema instead of running tests.
    #[arg(long)]
    pub list_options: bool,
}

/// Parse a `NAME=VALUE` option assignment.
pub fn parse_option_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid NAME=VALUE pair: {s}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Missing option name in: {s}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Harness errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read options file {path}: {source}")]
    OptionsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options file {path}: {message}")]
    OptionsYaml { path: PathBuf, message: String },

    #[error(transparent)]
    SetOption(#[from] SetOptionError),

    #[error("failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

/// Runs a test tree according to [`HarnessArgs`].
#[derive(Debug, Clone, Default)]
pub struct Harness {
    args: HarnessArgs,
}

impl Harness {
    /// Create a harness from parsed arguments.
    pub fn new(args: HarnessArgs) -> Self {
        Self { args }
    }

    /// Parse arguments from the process command line.
    pub fn from_env_args() -> Self {
        Self::new(HarnessArgs::parse())
    }

    /// Arguments in effect.
    pub fn args(&self) -> &HarnessArgs {
        &self.args
    }

    /// Option overrides in application order: options file, then `--option`.
    pub fn overrides(&self) -> Result<Vec<(String, String)>, HarnessError> {
        let mut overrides = match &self.args.options_file {
            Some(path) => read_options_file(path)?,
            None => Vec::new(),
        };

        overrides.extend(self.args.options.iter().cloned());

        Ok(overrides)
    }

    /// Apply every override to the tree.
    pub fn configure(&self, tree: TestTree) -> Result<TestTree, HarnessError> {
        self.overrides()?
            .into_iter()
            .try_fold(tree, |tree, (name, value)| {
                tracing::debug!(option = %name, value = %value, "applying option override");
                tree.set_option(&name, &value).map_err(HarnessError::from)
            })
    }

    /// Configure the tree, then run every selected unit sequentially.
    pub fn run(&self, tree: TestTree) -> Result<TestReport, HarnessError> {
        let tree = self.configure(tree)?;
        let mut report = TestReport::new(tree.name());
        let mut suites: Vec<TestSuite> = Vec::new();

        for entry in tree.units() {
            let path = entry.path();
            if let Some(pattern) = &self.args.pattern {
                if !path.contains(pattern.as_str()) {
                    continue;
                }
            }

            let span = tracing::info_span!("test", path = %path);
            let _guard = span.enter();
            let started = Instant::now();
            let outcome = entry.unit.run();
            let duration_ms = started.elapsed().as_millis() as u64;
            tracing::info!(verdict = outcome.label(), duration_ms, "test finished");

            let suite_name = entry.suite();
            let result = TestResult::from_outcome(
                entry.unit.name(),
                suite_name.clone(),
                entry.unit.tags().to_vec(),
                &outcome,
                duration_ms,
            );
            match suites.iter_mut().find(|suite| suite.name == suite_name) {
                Some(suite) => suite.add_result(result),
                None => {
                    let mut suite = TestSuite::new(suite_name);
                    suite.add_result(result);
                    suites.push(suite);
                }
            }
        }

        for suite in suites {
            report.add_suite(suite);
        }
        Ok(report)
    }

    /// Render a report in the configured format.
    pub fn render(&self, report: &TestReport) -> Result<String, HarnessError> {
        Ok(match self.args.format {
            ReportFormat::Text => report.to_text(),
            ReportFormat::Json => report.to_json()?,
            ReportFormat::Junit => report.to_junit_xml(),
        })
    }
}

fn read_options_file(path: &Path) -> Result<Vec<(String, String)>, HarnessError> {
    let contents = std::fs::read_to_string(path).map_err(|source| HarnessError::OptionsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let yaml_error = |message: String| HarnessError::OptionsYaml {
        path: path.to_path_buf(),
        message,
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mapping: serde_yaml::Mapping =
        serde_yaml::from_str(&contents).map_err(|e| yaml_error(e.to_string()))?;

    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = key
                .as_str()
                .ok_or_else(|| yaml_error(format!("option names must be strings, got {:?}", key)))?
                .to_string();
            let value = match value {
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::String(s) => s,
                other => {
                    return Err(yaml_error(format!(
                        "option {} must be a scalar, got {:?}",
                        name, other
                    )))
                }
            };
            Ok((name, value))
        })
        .collect()
}

/// Render the tree's option schema as an aligned table.
pub fn describe_tree_options(tree: &TestTree) -> String {
    let options = tree.options();
    let width = options.iter().map(|o| o.name.len()).max().unwrap_or(0);
    options
        .iter()
        .map(|o| {
            format!(
                "{:width$}  {} (default: {}) [{}]\n",
                o.name,
                o.description,
                o.default,
                o.ty,
                width = width
            )
        })
        .collect()
}

/// Entry point for test binaries: parse arguments, run, print, exit.
pub fn default_main(tree: TestTree) -> ExitCode {
    if let Err(err) = propbridge_common_log::init(LogConfig::from_env()) {
        eprintln!("{}", err);
    }

    let harness = Harness::from_env_args();
    if harness.args().list_options {
        print!("{}", describe_tree_options(&tree));
        return ExitCode::SUCCESS;
    }

    let report = match harness.run(tree) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };

    match harness.render(&report) {
        Ok(rendered) => print!("{}", rendered),
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
