//! Structured test-runner protocol.
//!
//! A runner sees every test as a [`TestUnit`]: a name, tags, a
//! self-describing option schema, a string-keyed option setter that
//! returns a replacement unit, and a blocking `run` yielding an
//! [`Outcome`]. Units are assembled into a [`TestTree`] with [`group`]
//! and executed by the [`Harness`].

pub mod harness;
pub mod options;
pub mod outcome;
pub mod reporters;
pub mod unit;

pub use harness::{
    default_main, describe_tree_options, parse_option_assignment, Harness, HarnessArgs,
    HarnessError, ReportFormat,
};
pub use options::{parse_value, OptionDescriptor, OptionType, OptionValue, SetOptionError};
pub use outcome::Outcome;
pub use reporters::{TestReport, TestResult, TestStatus, TestSuite};
pub use unit::{group, TestTree, TestUnit, UnitEntry};
