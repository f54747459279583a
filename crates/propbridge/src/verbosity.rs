//! Verbosity levels and the rule that reconciles the boolean verbosity
//! flags into a single level.

use propbridge_runner::{OptionType, OptionValue};
use serde::{Deserialize, Serialize};

/// How much diagnostic output a run produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Verbosity {
    /// No output.
    Quiet,
    /// A summary line per property.
    #[default]
    Normal,
    /// Every tested case.
    Detailed,
}

impl Verbosity {
    /// All levels, lowest first.
    pub const ALL: [Verbosity; 3] = [Verbosity::Quiet, Verbosity::Normal, Verbosity::Detailed];

    /// The level one step below, saturating at `Quiet`.
    pub fn predecessor(self) -> Self {
        match self {
            Verbosity::Quiet | Verbosity::Normal => Verbosity::Quiet,
            Verbosity::Detailed => Verbosity::Normal,
        }
    }

    /// Apply a boolean flag that controls `level`.
    ///
    /// Enabling raises `self` to at least `level`. Disabling lowers `self`
    /// strictly below `level` (or to `Quiet` when `level` is `Quiet`).
    pub fn merge(self, level: Verbosity, enabled: bool) -> Self {
        if enabled {
            self.max(level)
        } else {
            self.min(level.predecessor())
        }
    }
}

/// Values accepted by the `verbosity` option.
///
/// `VerboseShrinking` is `Verbose` plus a transcript of every shrink step.
/// The other values select a level and leave shrink tracing as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerbosityOption {
    Silent,
    Chatty,
    Verbose,
    VerboseShrinking,
}

impl VerbosityOption {
    /// Option names, in display order.
    pub const NAMES: [&'static str; 4] = ["Silent", "Chatty", "Verbose", "VerboseShrinking"];

    /// Option value describing a level and shrink-tracing flag.
    ///
    /// Shrink tracing shows only at the detailed level.
    pub fn describe(verbosity: Verbosity, verbose_shrinking: bool) -> Self {
        match (verbosity, verbose_shrinking) {
            (Verbosity::Quiet, _) => VerbosityOption::Silent,
            (Verbosity::Normal, _) => VerbosityOption::Chatty,
            (Verbosity::Detailed, false) => VerbosityOption::Verbose,
            (Verbosity::Detailed, true) => VerbosityOption::VerboseShrinking,
        }
    }

    /// Level this value selects.
    pub fn verbosity(self) -> Verbosity {
        match self {
            VerbosityOption::Silent => Verbosity::Quiet,
            VerbosityOption::Chatty => Verbosity::Normal,
            VerbosityOption::Verbose | VerbosityOption::VerboseShrinking => Verbosity::Detailed,
        }
    }

    /// Does this value trace shrink steps?
    pub fn verbose_shrinking(self) -> bool {
        matches!(self, VerbosityOption::VerboseShrinking)
    }

    fn name(self) -> &'static str {
        match self {
            VerbosityOption::Silent => Self::NAMES[0],
            VerbosityOption::Chatty => Self::NAMES[1],
            VerbosityOption::Verbose => Self::NAMES[2],
            VerbosityOption::VerboseShrinking => Self::NAMES[3],
        }
    }
}

impl OptionValue for VerbosityOption {
    /// Accepts the option names and the level names, case-insensitively.
    fn parse_option(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "silent" | "quiet" => Some(VerbosityOption::Silent),
            "chatty" | "normal" => Some(VerbosityOption::Chatty),
            "verbose" | "detailed" => Some(VerbosityOption::Verbose),
            "verboseshrinking" => Some(VerbosityOption::VerboseShrinking),
            _ => None,
        }
    }

    fn render_option(&self) -> String {
        self.name().to_string()
    }

    fn option_type() -> OptionType {
        OptionType::enumeration(&Self::NAMES)
    }
}
