//! Harness behaviour against a hand-written test unit.

use clap::Parser;
use pretty_assertions::assert_eq;
use propbridge_runner::{
    describe_tree_options, group, parse_value, Harness, HarnessArgs, HarnessError,
    OptionDescriptor, OptionType, OptionValue, Outcome, ReportFormat, SetOptionError, TestStatus,
    TestTree, TestUnit,
};
use std::num::NonZeroU32;

/// Passes when `limit` is at least `needed`.
#[derive(Clone)]
struct ThresholdUnit {
    name: String,
    tags: Vec<String>,
    needed: u32,
    limit: NonZeroU32,
    give_up: bool,
}

impl ThresholdUnit {
    fn new(name: &str, needed: u32) -> Self {
        Self {
            name: name.to_string(),
            tags: vec!["threshold".to_string()],
            needed,
            limit: NonZeroU32::MIN,
            give_up: false,
        }
    }
}

impl TestUnit for ThresholdUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new(
                "limit",
                "Upper limit",
                NonZeroU32::option_type(),
                self.limit.render_option(),
            ),
            OptionDescriptor::new(
                "giveUp",
                "Report an error instead of running",
                OptionType::Bool,
                self.give_up.render_option(),
            ),
        ]
    }

    fn set_option(&self, name: &str, value: &str) -> Result<Box<dyn TestUnit>, SetOptionError> {
        let mut next = self.clone();
        match name {
            "limit" => {
                next.limit = parse_value(value)
                    .ok_or_else(|| SetOptionError::parse::<NonZeroU32>(name, value))?
            }
            "giveUp" => {
                next.give_up = parse_value(value)
                    .ok_or_else(|| SetOptionError::parse::<bool>(name, value))?
            }
            _ => return Err(SetOptionError::unknown(name)),
        }
        Ok(Box::new(next))
    }

    fn run(&self) -> Outcome {
        if self.give_up {
            Outcome::error("gave up")
        } else if self.limit.get() >= self.needed {
            Outcome::Pass
        } else {
            Outcome::fail(format!("limit {} below {}", self.limit, self.needed))
        }
    }
}

fn tree() -> TestTree {
    group(
        "suite",
        vec![
            TestTree::single(ThresholdUnit::new("small", 1)),
            group(
                "large",
                vec![
                    TestTree::single(ThresholdUnit::new("ten", 10)),
                    TestTree::single(ThresholdUnit::new("hundred", 100)),
                ],
            ),
        ],
    )
}

fn harness(args: &[&str]) -> Harness {
    let argv = std::iter::once("propbridge").chain(args.iter().copied());
    Harness::new(HarnessArgs::try_parse_from(argv).unwrap())
}

#[test]
fn test_defaults_run_every_unit() {
    let report = harness(&[]).run(tree()).unwrap();
    assert_eq!(report.name, "suite");
    assert_eq!(report.tests, 3);
    assert_eq!(report.failures, 2);
    assert_eq!(report.errors, 0);

    let suite_names: Vec<_> = report.suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(suite_names, vec!["suite", "suite/large"]);
    assert_eq!(report.suites[0].test_cases[0].tags, vec!["threshold"]);
}

#[test]
fn test_option_overrides_reach_units() {
    let report = harness(&["-o", "limit=50"]).run(tree()).unwrap();
    assert_eq!(report.failures, 1);

    let report = harness(&["--option", "limit=50,limit=100"]).run(tree()).unwrap();
    assert!(report.is_success());
}

#[test]
fn test_error_verdicts_are_counted_separately() {
    let report = harness(&["-o", "giveUp=true"]).run(tree()).unwrap();
    assert_eq!(report.errors, 3);
    assert_eq!(report.failures, 0);
    assert!(report
        .suites
        .iter()
        .flat_map(|s| &s.test_cases)
        .all(|t| t.status == TestStatus::Errored));
}

#[test]
fn test_pattern_filters_paths() {
    let report = harness(&["-p", "large/ten", "-o", "limit=10"]).run(tree()).unwrap();
    assert_eq!(report.tests, 1);
    assert!(report.is_success());
}

#[test]
fn test_bad_overrides_are_reported() {
    assert!(HarnessArgs::try_parse_from(["propbridge", "-o", "limit"]).is_err());

    let err = harness(&["-o", "limit=0"]).run(tree()).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::SetOption(SetOptionError::ParseError { .. })
    ));

    let err = harness(&["-o", "colour=blue"]).run(tree()).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::SetOption(SetOptionError::UnknownOption { .. })
    ));
}

#[test]
fn test_options_file_applies_before_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.yaml");
    std::fs::write(&path, "limit: 100\ngiveUp: false\n").unwrap();
    let path = path.to_string_lossy().to_string();

    let report = harness(&["--options-file", &path]).run(tree()).unwrap();
    assert!(report.is_success());

    let report = harness(&["--options-file", &path, "-o", "limit=1"])
        .run(tree())
        .unwrap();
    assert_eq!(report.failures, 2);
}

#[test]
fn test_options_file_rejects_nested_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.yaml");
    std::fs::write(&path, "limit:\n  - 1\n  - 2\n").unwrap();
    let path = path.to_string_lossy().to_string();

    let err = harness(&["--options-file", &path]).run(tree()).unwrap_err();
    assert!(matches!(err, HarnessError::OptionsYaml { .. }));
}

#[test]
fn test_render_formats() {
    let h = harness(&["--format", "junit"]);
    assert_eq!(h.args().format, ReportFormat::Junit);
    let report = h.run(tree()).unwrap();
    assert!(h.render(&report).unwrap().starts_with("<?xml"));

    let h = harness(&["--format", "json"]);
    let report = h.run(tree()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&h.render(&report).unwrap()).unwrap();
    assert_eq!(json["tests"], 3);
}

#[test]
fn test_describe_tree_options_lists_each_name_once() {
    let listing = describe_tree_options(&tree());
    assert_eq!(listing.lines().count(), 2);
    assert!(listing.contains("limit   Upper limit (default: 1) [integer in 1..=4294967295]"));
    assert!(listing.contains("giveUp  Report an error instead of running (default: false) [bool]"));
}
